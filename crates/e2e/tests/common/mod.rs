//! Scripted in-memory page shared by the integration tests
#![allow(dead_code)]

use std::collections::{HashMap, VecDeque};
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;
use regex::Regex;

use storefront_e2e::{
    E2eError, E2eResult, LoadState, Locator, PaginationLocators, PageDriver, StorefrontConfig,
    WaitState,
};

pub const BASE_URL: &str = "https://shop.example.com";

/// Storefront config with pacing disabled
pub fn config() -> StorefrontConfig {
    StorefrontConfig::new(BASE_URL)
        .unwrap()
        .with_action_delay(Duration::ZERO)
}

/// Every side effect the page saw, in order
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Call {
    Goto(String),
    Reload,
    Fill(String, String),
    Click(String),
    ForceClick(String),
    Hover(String),
    ScrollIntoView(String),
    WaitForUrl(String),
    WaitForLoadState(LoadState),
    Screenshot(PathBuf),
}

/// What the page shows after a form submit
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Banner {
    Success(String),
    Error(String),
    Nothing,
}

/// A paged result listing
#[derive(Debug, Clone)]
pub struct Listing {
    pub items_per_page: Vec<usize>,
    /// Page-number labels rendered while each page is current
    pub labels: Vec<Vec<String>>,
    /// 1-based page on which the "next" link is missing
    pub hide_next_on: Option<u32>,
    pub visible: bool,
}

impl Listing {
    /// `pages` pages of `items` each, with storefront-style labels
    pub fn uniform(pages: usize, items: usize) -> Self {
        Self::with_items(vec![items; pages])
    }

    pub fn with_items(items_per_page: Vec<usize>) -> Self {
        let total = items_per_page.len();
        let labels = (1..=total)
            .map(|current| {
                let mut labels = Vec::new();
                if current > 1 {
                    labels.push("Page Previous".to_string());
                }
                for page in 1..=total {
                    if page == current {
                        labels.push(format!("You're currently reading page {}", page));
                    } else {
                        labels.push(format!("Page {}", page));
                    }
                }
                labels
            })
            .collect();
        Self {
            items_per_page,
            labels,
            hide_next_on: None,
            visible: true,
        }
    }

    pub fn total(&self) -> usize {
        self.items_per_page.len()
    }
}

#[derive(Debug, Clone)]
enum Role {
    Container,
    PageNumbers,
    Next,
    Items,
    Grid,
    SuccessBanner,
    ErrorBanner,
    Submit,
    /// `count` matching elements, visible when there is at least one
    Element { text: Option<String>, count: usize },
}

#[derive(Default)]
struct State {
    url: String,
    listing: Option<Listing>,
    current: usize,
    outcomes: VecDeque<Banner>,
    banner: Option<Banner>,
    navigations: HashMap<String, String>,
    calls: Vec<Call>,
}

#[derive(Default)]
pub struct FakePage {
    roles: HashMap<String, Role>,
    state: Mutex<State>,
}

impl FakePage {
    pub fn new() -> Self {
        Self::default()
    }

    fn role(mut self, locator: &Locator, role: Role) -> Self {
        self.roles.insert(locator.to_string(), role);
        self
    }

    pub fn with_listing(self, locators: &PaginationLocators, listing: Listing) -> Self {
        self.state.lock().unwrap().listing = Some(listing);
        self.role(&locators.container, Role::Container)
            .role(&locators.page_numbers, Role::PageNumbers)
            .role(&locators.next, Role::Next)
            .role(&locators.items, Role::Items)
            .role(&locators.grid, Role::Grid)
    }

    /// Register a form whose submits produce `outcomes` in order
    pub fn with_form(
        self,
        submit: &Locator,
        success: &Locator,
        error: &Locator,
        outcomes: Vec<Banner>,
    ) -> Self {
        self.state.lock().unwrap().outcomes = outcomes.into();
        self.role(submit, Role::Submit)
            .role(success, Role::SuccessBanner)
            .role(error, Role::ErrorBanner)
    }

    pub fn with_element(self, locator: &Locator) -> Self {
        self.with_elements(locator, 1)
    }

    /// `count` elements matching `locator`
    pub fn with_elements(self, locator: &Locator, count: usize) -> Self {
        self.role(locator, Role::Element { text: None, count })
    }

    pub fn with_text(self, locator: &Locator, text: &str) -> Self {
        self.with_texts(locator, text, 1)
    }

    /// `count` elements matching `locator`, the first reading `text`
    pub fn with_texts(self, locator: &Locator, text: &str, count: usize) -> Self {
        self.role(
            locator,
            Role::Element {
                text: Some(text.to_string()),
                count,
            },
        )
    }

    /// Clicking `locator` moves the page to `url`
    pub fn navigates(self, locator: &Locator, url: &str) -> Self {
        self.state
            .lock()
            .unwrap()
            .navigations
            .insert(locator.to_string(), url.to_string());
        self.with_element(locator)
    }

    pub fn calls(&self) -> Vec<Call> {
        self.state.lock().unwrap().calls.clone()
    }

    pub fn clicks_on(&self, locator: &Locator) -> usize {
        let key = locator.to_string();
        self.calls()
            .iter()
            .filter(|c| matches!(c, Call::Click(l) if *l == key))
            .count()
    }

    /// Every clicked locator, in order
    pub fn clicks(&self) -> Vec<String> {
        self.calls()
            .into_iter()
            .filter_map(|c| match c {
                Call::Click(locator) | Call::ForceClick(locator) => Some(locator),
                _ => None,
            })
            .collect()
    }

    pub fn reloads(&self) -> usize {
        self.calls().iter().filter(|c| **c == Call::Reload).count()
    }

    /// Values filled between consecutive clicks on `submit`
    pub fn fills_per_submit(&self, submit: &Locator) -> Vec<Vec<(String, String)>> {
        let key = submit.to_string();
        let mut rounds = vec![Vec::new()];
        for call in self.calls() {
            match call {
                Call::Fill(locator, value) => rounds.last_mut().unwrap().push((locator, value)),
                Call::Click(locator) if locator == key => rounds.push(Vec::new()),
                _ => {}
            }
        }
        rounds.pop();
        rounds
    }

    fn record(&self, call: Call) {
        self.state.lock().unwrap().calls.push(call);
    }

    fn lookup(&self, locator: &Locator) -> Option<&Role> {
        self.roles.get(&locator.to_string())
    }

    fn visible(&self, locator: &Locator) -> bool {
        let state = self.state.lock().unwrap();
        match self.lookup(locator) {
            None => false,
            Some(Role::Container) => state.listing.as_ref().map_or(false, |l| l.visible),
            Some(Role::Next) => state.listing.as_ref().map_or(false, |l| {
                let page = state.current as u32 + 1;
                state.current + 1 < l.total() && l.hide_next_on != Some(page)
            }),
            Some(Role::SuccessBanner) => matches!(state.banner, Some(Banner::Success(_))),
            Some(Role::ErrorBanner) => matches!(state.banner, Some(Banner::Error(_))),
            Some(Role::Element { count, .. }) => *count > 0,
            Some(_) => true,
        }
    }
}

#[async_trait]
impl PageDriver for FakePage {
    async fn goto(&self, url: &str) -> E2eResult<()> {
        let mut state = self.state.lock().unwrap();
        state.url = url.to_string();
        state.calls.push(Call::Goto(url.to_string()));
        Ok(())
    }

    async fn reload(&self) -> E2eResult<()> {
        let mut state = self.state.lock().unwrap();
        state.banner = None;
        state.calls.push(Call::Reload);
        Ok(())
    }

    async fn current_url(&self) -> E2eResult<String> {
        Ok(self.state.lock().unwrap().url.clone())
    }

    async fn fill(&self, locator: &Locator, value: &str) -> E2eResult<()> {
        self.record(Call::Fill(locator.to_string(), value.to_string()));
        Ok(())
    }

    async fn click(&self, locator: &Locator) -> E2eResult<()> {
        let key = locator.to_string();
        let role = self.lookup(locator).cloned();
        let mut state = self.state.lock().unwrap();
        state.calls.push(Call::Click(key.clone()));
        match role {
            Some(Role::Next) => state.current += 1,
            Some(Role::Submit) => {
                let next = state.outcomes.pop_front().unwrap_or(Banner::Nothing);
                state.banner = Some(next);
            }
            None => return Err(E2eError::Driver(format!("no element matches {}", key))),
            _ => {}
        }
        if let Some(url) = state.navigations.get(&key).cloned() {
            state.url = url;
        }
        Ok(())
    }

    async fn force_click(&self, locator: &Locator) -> E2eResult<()> {
        self.record(Call::ForceClick(locator.to_string()));
        Ok(())
    }

    async fn hover(&self, locator: &Locator) -> E2eResult<()> {
        self.record(Call::Hover(locator.to_string()));
        Ok(())
    }

    async fn text_content(&self, locator: &Locator) -> E2eResult<Option<String>> {
        let state = self.state.lock().unwrap();
        Ok(match (self.lookup(locator), &state.banner) {
            (Some(Role::SuccessBanner), Some(Banner::Success(text))) => Some(text.clone()),
            (Some(Role::ErrorBanner), Some(Banner::Error(text))) => Some(text.clone()),
            (Some(Role::Element { text, count }), _) if *count > 0 => {
                Some(text.clone().unwrap_or_default())
            }
            _ => None,
        })
    }

    async fn all_text_contents(&self, locator: &Locator) -> E2eResult<Vec<String>> {
        let state = self.state.lock().unwrap();
        Ok(match (self.lookup(locator), &state.listing) {
            (Some(Role::PageNumbers), Some(listing)) => listing.labels[state.current].clone(),
            _ => Vec::new(),
        })
    }

    async fn count(&self, locator: &Locator) -> E2eResult<usize> {
        let role = self.lookup(locator).cloned();
        let visible = self.visible(locator);
        let state = self.state.lock().unwrap();
        Ok(match (role, &state.listing) {
            (None, _) => 0,
            (Some(Role::Container), listing) => usize::from(listing.is_some()),
            (Some(Role::PageNumbers), Some(listing)) => listing.labels[state.current].len(),
            (Some(Role::Items), Some(listing)) => listing.items_per_page[state.current],
            (Some(Role::SuccessBanner), _) | (Some(Role::ErrorBanner), _) => usize::from(visible),
            (Some(Role::Element { count, .. }), _) => count,
            (Some(_), _) => 1,
        })
    }

    async fn is_visible(&self, locator: &Locator, _timeout: Option<Duration>) -> E2eResult<bool> {
        Ok(self.visible(locator))
    }

    async fn wait_for(
        &self,
        locator: &Locator,
        state: WaitState,
        _timeout: Option<Duration>,
    ) -> E2eResult<bool> {
        let visible = self.visible(locator);
        Ok(match state {
            WaitState::Visible | WaitState::Attached => visible,
            WaitState::Hidden | WaitState::Detached => !visible,
        })
    }

    async fn scroll_into_view(&self, locator: &Locator) -> E2eResult<()> {
        self.record(Call::ScrollIntoView(locator.to_string()));
        Ok(())
    }

    async fn wait_for_url(&self, pattern: &str) -> E2eResult<()> {
        let mut state = self.state.lock().unwrap();
        state.calls.push(Call::WaitForUrl(pattern.to_string()));
        let re = Regex::new(pattern).map_err(|e| E2eError::Driver(e.to_string()))?;
        if re.is_match(&state.url) {
            Ok(())
        } else {
            Err(E2eError::Timeout(format!("URL {} to match {}", state.url, pattern)))
        }
    }

    async fn wait_for_load_state(&self, load: LoadState) -> E2eResult<()> {
        self.record(Call::WaitForLoadState(load));
        Ok(())
    }

    async fn screenshot(&self, path: &Path) -> E2eResult<()> {
        self.record(Call::Screenshot(path.to_path_buf()));
        Ok(())
    }
}

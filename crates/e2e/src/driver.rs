//! The page driver capability
//!
//! Everything the suite does to a browser goes through [`PageDriver`]. The
//! live implementation is [`crate::playwright::BrowserSession`]; tests use a
//! scripted in-memory page.

use std::path::Path;
use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::{E2eError, E2eResult};
use crate::locator::Locator;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WaitState {
    #[default]
    Visible,
    Hidden,
    Attached,
    Detached,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LoadState {
    #[default]
    Load,
    DomContentLoaded,
    NetworkIdle,
}

#[async_trait]
pub trait PageDriver: Send + Sync {
    async fn goto(&self, url: &str) -> E2eResult<()>;

    async fn reload(&self) -> E2eResult<()>;

    async fn current_url(&self) -> E2eResult<String>;

    async fn fill(&self, locator: &Locator, value: &str) -> E2eResult<()>;

    async fn click(&self, locator: &Locator) -> E2eResult<()>;

    /// Click without actionability checks (for styled radio labels and the like)
    async fn force_click(&self, locator: &Locator) -> E2eResult<()>;

    async fn hover(&self, locator: &Locator) -> E2eResult<()>;

    /// Text of the first match, `None` when nothing matches
    async fn text_content(&self, locator: &Locator) -> E2eResult<Option<String>>;

    async fn all_text_contents(&self, locator: &Locator) -> E2eResult<Vec<String>>;

    async fn count(&self, locator: &Locator) -> E2eResult<usize>;

    /// Visibility check; with a timeout it polls until visible or expired
    async fn is_visible(&self, locator: &Locator, timeout: Option<Duration>) -> E2eResult<bool>;

    /// Wait for `state`; `Ok(false)` means the wait timed out
    async fn wait_for(
        &self,
        locator: &Locator,
        state: WaitState,
        timeout: Option<Duration>,
    ) -> E2eResult<bool>;

    async fn scroll_into_view(&self, locator: &Locator) -> E2eResult<()>;

    /// Wait until the page URL matches the regex `pattern`
    async fn wait_for_url(&self, pattern: &str) -> E2eResult<()>;

    async fn wait_for_load_state(&self, state: LoadState) -> E2eResult<()>;

    async fn screenshot(&self, path: &Path) -> E2eResult<()>;
}

/// Wait for `locator` to become visible, turning a timeout into an error
pub async fn expect_visible<D: PageDriver + ?Sized>(
    driver: &D,
    locator: &Locator,
    timeout: Option<Duration>,
) -> E2eResult<()> {
    if driver.wait_for(locator, WaitState::Visible, timeout).await? {
        Ok(())
    } else {
        Err(E2eError::Timeout(format!("{} to be visible", locator)))
    }
}

/// Assert the trimmed text of `locator` equals `expected`
pub async fn expect_text<D: PageDriver + ?Sized>(
    driver: &D,
    locator: &Locator,
    expected: &str,
) -> E2eResult<()> {
    expect_visible(driver, locator, None).await?;
    let actual = driver.text_content(locator).await?.unwrap_or_default();
    if actual.trim() == expected.trim() {
        Ok(())
    } else {
        Err(E2eError::assertion(
            locator.to_string(),
            expected,
            actual.trim(),
        ))
    }
}

/// Assert the text of `locator` contains `expected`
pub async fn expect_contains_text<D: PageDriver + ?Sized>(
    driver: &D,
    locator: &Locator,
    expected: &str,
) -> E2eResult<()> {
    expect_visible(driver, locator, None).await?;
    let actual = driver.text_content(locator).await?.unwrap_or_default();
    if actual.contains(expected) {
        Ok(())
    } else {
        Err(E2eError::assertion(
            locator.to_string(),
            format!("text containing {:?}", expected),
            actual.trim(),
        ))
    }
}

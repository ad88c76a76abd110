//! Pagination traversal and verification
//!
//! [`PaginationWalker`] walks a paged result listing through its "next"
//! control. Every page must show at least one item. On the terminal page of
//! a listing with more than two pages, the trailing page-number labels must
//! read `N-1, N`.

use serde::Serialize;
use tracing::{debug, info};

use crate::driver::{PageDriver, WaitState};
use crate::error::{E2eError, E2eResult};
use crate::locator::Locator;

/// Where the walker finds the pieces of a paged listing
#[derive(Debug, Clone)]
pub struct PaginationLocators {
    /// The pagination list itself
    pub container: Locator,
    /// Page-number entries, excluding the "next" entry
    pub page_numbers: Locator,
    /// The "next" link
    pub next: Locator,
    /// Individual result items
    pub items: Locator,
    /// Result grid wrapper, awaited after each navigation
    pub grid: Locator,
}

/// What a successful walk observed
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct PaginationReport {
    pub total_pages: u32,
    pub visited: Vec<u32>,
    pub next_clicks: u32,
    /// Normalised trailing labels on the terminal page, when checked
    pub terminal_window: Option<Vec<String>>,
}

pub struct PaginationWalker<'a, D: PageDriver + ?Sized> {
    driver: &'a D,
    locators: PaginationLocators,
}

impl<'a, D: PageDriver + ?Sized> PaginationWalker<'a, D> {
    pub fn new(driver: &'a D, locators: PaginationLocators) -> Self {
        Self { driver, locators }
    }

    pub async fn verify_pagination(&self) -> E2eResult<PaginationReport> {
        info!("Verifying pagination");

        if self.driver.count(&self.locators.container).await? == 0 {
            return Err(E2eError::MissingPaginationControl);
        }
        self.driver.scroll_into_view(&self.locators.container).await?;
        if !self.driver.is_visible(&self.locators.container, None).await? {
            return Err(E2eError::MissingPaginationControl);
        }

        let total = self.driver.count(&self.locators.page_numbers).await? as u32;
        info!("Total pages (excluding \"next\"): {}", total);

        let mut report = PaginationReport {
            total_pages: total,
            ..Default::default()
        };

        if total == 0 {
            return Err(E2eError::MissingPaginationControl);
        }
        if total == 1 {
            info!("Only 1 page available, nothing to traverse");
            report.visited.push(1);
            return Ok(report);
        }

        for current in 1..=total {
            let items = self.driver.count(&self.locators.items).await?;
            if items == 0 {
                return Err(E2eError::EmptyPage(current));
            }
            debug!("Page {} shows {} items", current, items);
            report.visited.push(current);

            if current == total {
                if total > 2 {
                    report.terminal_window = Some(self.verify_terminal_window(total).await?);
                }
                info!("Reached the last page ({})", total);
                break;
            }

            if !self.driver.is_visible(&self.locators.next, None).await? {
                return Err(E2eError::MissingNextControl(current));
            }
            self.driver.scroll_into_view(&self.locators.next).await?;
            self.driver.click(&self.locators.next).await?;
            report.next_clicks += 1;

            if !self
                .driver
                .wait_for(&self.locators.grid, WaitState::Visible, None)
                .await?
            {
                return Err(E2eError::Timeout(format!(
                    "result grid after leaving page {}",
                    current
                )));
            }
        }

        Ok(report)
    }

    async fn verify_terminal_window(&self, total: u32) -> E2eResult<Vec<String>> {
        let labels = self
            .driver
            .all_text_contents(&self.locators.page_numbers)
            .await?;
        let normalized = normalize_page_labels(&labels);
        debug!("Normalised page labels: {:?}", normalized);

        let expected = vec![(total - 1).to_string(), total.to_string()];
        let actual = last_two(&normalized);
        if actual != expected {
            return Err(E2eError::TruncationMismatch { expected, actual });
        }
        Ok(actual)
    }
}

/// Strip every non-digit from each label and drop labels left empty
pub fn normalize_page_labels<S: AsRef<str>>(labels: &[S]) -> Vec<String> {
    labels
        .iter()
        .map(|label| {
            label
                .as_ref()
                .chars()
                .filter(char::is_ascii_digit)
                .collect::<String>()
        })
        .filter(|digits| !digits.is_empty())
        .map(|digits| {
            // "03" and "3" name the same page
            let trimmed = digits.trim_start_matches('0');
            if trimmed.is_empty() {
                "0".to_string()
            } else {
                trimmed.to_string()
            }
        })
        .collect()
}

fn last_two(labels: &[String]) -> Vec<String> {
    labels[labels.len().saturating_sub(2)..].to_vec()
}

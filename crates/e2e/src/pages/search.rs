//! Catalog search and the paged search results

use tracing::info;

use crate::driver::{expect_contains_text, PageDriver};
use crate::error::E2eResult;
use crate::locator::Locator;
use crate::pagination::{PaginationLocators, PaginationWalker};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SearchOutcome {
    Results,
    NoResults,
}

pub struct SearchPage<'a> {
    driver: &'a dyn PageDriver,
    search_field: Locator,
    search_button: Locator,
    results_title: Locator,
    no_results: Locator,
}

impl<'a> SearchPage<'a> {
    pub fn new(driver: &'a dyn PageDriver) -> Self {
        Self {
            driver,
            search_field: Locator::css("#search"),
            search_button: Locator::css("button[title=\"Search\"]"),
            results_title: Locator::css("[data-ui-id=\"page-title-wrapper\"]"),
            no_results: Locator::css(".message.notice"),
        }
    }

    /// Search the catalog for `term`
    pub async fn search(&self, term: &str) -> E2eResult<SearchOutcome> {
        info!("Searching for {:?}", term);
        self.driver.fill(&self.search_field, "").await?;
        self.driver.fill(&self.search_field, term).await?;
        self.driver.click(&self.search_button).await?;

        if self.driver.is_visible(&self.no_results, None).await? {
            info!("No results for {:?}", term);
            return Ok(SearchOutcome::NoResults);
        }

        expect_contains_text(
            self.driver,
            &self.results_title,
            &format!("Search results for: '{}'", term),
        )
        .await?;
        Ok(SearchOutcome::Results)
    }

    /// Walker over the bottom pager of the results grid
    pub fn pagination(&self) -> PaginationWalker<'a, dyn PageDriver + 'a> {
        PaginationWalker::new(self.driver, results_pagination())
    }
}

/// Locators for the storefront's product listing pager
pub fn results_pagination() -> PaginationLocators {
    // The listing renders a pager above and below the grid; walk the bottom one
    let container = Locator::css(".pages-items").nth(1);
    PaginationLocators {
        page_numbers: container.locator("li:not(.pages-item-next)"),
        next: container.locator(".pages-item-next a.action.next"),
        items: Locator::css(".products.wrapper.grid.products-grid .product-item"),
        grid: Locator::css(".products.wrapper.grid.products-grid"),
        container,
    }
}

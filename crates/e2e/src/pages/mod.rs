//! Page objects for the storefront
//!
//! Each page type knows how to reach itself and which URL proves it got
//! there. Pages borrow the driver and the configuration; they hold no state
//! of their own beyond locators.

pub mod create_account;
pub mod journey;
pub mod search;
pub mod sign_in;

use async_trait::async_trait;
use tracing::debug;

use crate::config::StorefrontConfig;
use crate::driver::{LoadState, PageDriver, WaitState};
use crate::error::{E2eError, E2eResult};
use crate::locator::Locator;

pub use create_account::CreateAccountPage;
pub use journey::UserJourney;
pub use search::{SearchOutcome, SearchPage};
pub use sign_in::SignInPage;

/// Shared success banner across storefront actions
pub const SUCCESS_BANNER: &str = ".message-success.success.message";

/// Page heading used by account, wishlist and cart pages
pub const PAGE_HEADING: &str = ".base";

#[async_trait]
pub trait StorefrontPage: Send + Sync {
    fn driver(&self) -> &dyn PageDriver;

    /// Regex the page URL matches once this page is shown
    fn page_url_pattern(&self) -> &'static str;

    async fn navigate(&self) -> E2eResult<()>;

    async fn verify_page_url(&self) -> E2eResult<()> {
        self.driver().wait_for_url(self.page_url_pattern()).await
    }

    async fn wait_for_page_load(&self) -> E2eResult<()> {
        self.driver().wait_for_load_state(LoadState::Load).await
    }
}

/// Where an expected message turned up
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TextMatch {
    SuccessBanner,
    WishlistItem,
    NotFound,
}

/// Look for `expected` in the success banner, then in the wishlist item
/// names. Each indicator counts only when exactly one element carries it.
pub async fn find_text(
    driver: &dyn PageDriver,
    config: &StorefrontConfig,
    expected: &str,
) -> E2eResult<TextMatch> {
    let banner = Locator::css(SUCCESS_BANNER).has_text(expected);
    let wishlist_item = Locator::css("#wishlist-view-form div.product-item-info [class=\"product-item-name\"]")
        .has_text(expected);

    if driver
        .wait_for(&banner, WaitState::Visible, Some(config.success_timeout))
        .await?
        && driver.count(&banner).await? == 1
    {
        return Ok(TextMatch::SuccessBanner);
    }

    if driver.is_visible(&wishlist_item, None).await? && driver.count(&wishlist_item).await? == 1 {
        return Ok(TextMatch::WishlistItem);
    }

    Ok(TextMatch::NotFound)
}

/// [`find_text`], failing when neither indicator carries `expected`
pub async fn verify_text(
    driver: &dyn PageDriver,
    config: &StorefrontConfig,
    expected: &str,
) -> E2eResult<TextMatch> {
    match find_text(driver, config, expected).await? {
        TextMatch::NotFound => Err(E2eError::assertion(
            "success message or wishlist item",
            expected,
            "no matching element",
        )),
        found => {
            debug!("Found {:?} in {:?}", expected, found);
            Ok(found)
        }
    }
}

/// Sleep for the configured action delay
pub async fn pause(config: &StorefrontConfig) {
    if !config.action_delay.is_zero() {
        tokio::time::sleep(config.action_delay).await;
    }
}

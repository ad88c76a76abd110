//! The storefront user-flow scenarios

use std::fmt;
use std::str::FromStr;

use tracing::info;

use crate::config::StorefrontConfig;
use crate::driver::PageDriver;
use crate::error::{E2eError, E2eResult};
use crate::fixtures::TestData;
use crate::pages::journey::Review;
use crate::pages::{CreateAccountPage, SearchPage, SignInPage, StorefrontPage, UserJourney};

pub const PAGINATION_SEARCH_TERM: &str = "Jacket, T-shirt, pants";
pub const SEARCH_PRODUCT: &str = "Beaumont Summit Kit";
pub const CART_PRODUCT: &str = "Beaumont Summit Kit";
pub const COMPARE_PRODUCT: &str = "Push It Messenger Bag";
pub const WISHLIST_PRODUCT: &str = "Atlas Fitness Tank";
pub const REVIEW_PRODUCT: &str = "Pierce Gym Short";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Scenario {
    SignUp,
    SignIn,
    SignOut,
    Pagination,
    SearchProduct,
    AddToCart,
    CompareList,
    Wishlist,
    SubmitReview,
    ClearCart,
}

/// What a scenario needs besides the driver
pub struct ScenarioContext<'a> {
    pub config: &'a StorefrontConfig,
    pub data: &'a TestData,
}

impl Scenario {
    pub const ALL: [Scenario; 10] = [
        Scenario::SignUp,
        Scenario::SignIn,
        Scenario::SignOut,
        Scenario::Pagination,
        Scenario::SearchProduct,
        Scenario::AddToCart,
        Scenario::CompareList,
        Scenario::Wishlist,
        Scenario::SubmitReview,
        Scenario::ClearCart,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            Scenario::SignUp => "sign-up",
            Scenario::SignIn => "sign-in",
            Scenario::SignOut => "sign-out",
            Scenario::Pagination => "pagination",
            Scenario::SearchProduct => "search-product",
            Scenario::AddToCart => "add-to-cart",
            Scenario::CompareList => "compare-list",
            Scenario::Wishlist => "wishlist",
            Scenario::SubmitReview => "submit-review",
            Scenario::ClearCart => "clear-cart",
        }
    }

    pub fn tags(&self) -> &'static [&'static str] {
        match self {
            Scenario::SignUp | Scenario::SignIn | Scenario::SignOut => &["account"],
            Scenario::Pagination | Scenario::SearchProduct => &["search"],
            Scenario::AddToCart | Scenario::ClearCart => &["journey", "cart"],
            Scenario::CompareList | Scenario::Wishlist | Scenario::SubmitReview => &["journey"],
        }
    }

    pub fn has_tag(&self, tag: &str) -> bool {
        self.tags().iter().any(|t| *t == tag)
    }

    pub async fn run(&self, driver: &dyn PageDriver, ctx: &ScenarioContext<'_>) -> E2eResult<()> {
        let sign_in = SignInPage::new(driver, ctx.config);
        let journey = UserJourney::new(driver, ctx.config);

        match self {
            Scenario::SignUp => {
                let page = CreateAccountPage::new(driver, ctx.config);
                page.navigate().await?;
                let details = ctx.data.new_account.fresh_account();
                let report = page.create_account(&details).await?;
                if report.retried() {
                    info!(
                        "Account {} created after {} attempts",
                        details.email,
                        report.attempts.len()
                    );
                }
                Ok(())
            }
            Scenario::SignIn => signed_in(&sign_in, ctx).await,
            Scenario::SignOut => {
                signed_in(&sign_in, ctx).await?;
                sign_in.sign_out().await?;
                sign_in.verify_successful_logout().await
            }
            Scenario::Pagination => {
                sign_in.navigate().await?;
                let search = SearchPage::new(driver);
                search.search(PAGINATION_SEARCH_TERM).await?;
                let report = search.pagination().verify_pagination().await?;
                info!(
                    "Walked {} of {} pages",
                    report.visited.len(),
                    report.total_pages
                );
                Ok(())
            }
            Scenario::SearchProduct => {
                sign_in.navigate().await?;
                journey.search_and_verify_product(SEARCH_PRODUCT).await
            }
            Scenario::AddToCart => {
                signed_in(&sign_in, ctx).await?;
                journey.add_product_to_cart(CART_PRODUCT).await
            }
            Scenario::CompareList => {
                sign_in.navigate().await?;
                journey.add_to_comparison_list(COMPARE_PRODUCT).await?;
                journey.remove_from_comparison_list().await
            }
            Scenario::Wishlist => {
                signed_in(&sign_in, ctx).await?;
                journey.add_to_wishlist(WISHLIST_PRODUCT).await?;
                journey.remove_from_wishlist(WISHLIST_PRODUCT).await
            }
            Scenario::SubmitReview => {
                signed_in(&sign_in, ctx).await?;
                let stamp = chrono::Utc::now().to_rfc3339();
                let text = format!("Test Review for Automation Practice - {}", stamp);
                let review = Review {
                    rating: 4,
                    nickname: text.clone(),
                    summary: text.clone(),
                    text,
                };
                journey.submit_review(REVIEW_PRODUCT, &review).await
            }
            Scenario::ClearCart => {
                signed_in(&sign_in, ctx).await?;
                if !journey.clear_cart().await? {
                    info!("The cart was already empty");
                }
                Ok(())
            }
        }
    }
}

async fn signed_in(sign_in: &SignInPage<'_>, ctx: &ScenarioContext<'_>) -> E2eResult<()> {
    sign_in.navigate().await?;
    sign_in.sign_in(ctx.data.primary_user()?).await?;
    sign_in.verify_successful_login().await
}

impl fmt::Display for Scenario {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Scenario {
    type Err = E2eError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Scenario::ALL
            .into_iter()
            .find(|scenario| scenario.name() == s)
            .ok_or_else(|| E2eError::UnknownScenario(s.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_names_round_trip() {
        for scenario in Scenario::ALL {
            assert_eq!(scenario.name().parse::<Scenario>().unwrap(), scenario);
        }
        assert!(matches!(
            "checkout".parse::<Scenario>(),
            Err(E2eError::UnknownScenario(_))
        ));
    }

    #[test]
    fn test_tags() {
        let account: Vec<_> = Scenario::ALL
            .into_iter()
            .filter(|s| s.has_tag("account"))
            .collect();
        assert_eq!(
            account,
            vec![Scenario::SignUp, Scenario::SignIn, Scenario::SignOut]
        );
        assert!(Scenario::ClearCart.has_tag("cart"));
        assert!(!Scenario::Pagination.has_tag("journey"));
    }
}

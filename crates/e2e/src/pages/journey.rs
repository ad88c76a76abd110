//! Shopper journeys: product search, cart, comparison list, wishlist, reviews

use std::time::Duration;

use async_trait::async_trait;
use tracing::info;

use crate::config::StorefrontConfig;
use crate::driver::{expect_contains_text, expect_text, LoadState, PageDriver};
use crate::error::{E2eError, E2eResult};
use crate::locator::Locator;
use crate::pages::search::SearchPage;
use crate::pages::{pause, verify_text, StorefrontPage, PAGE_HEADING, SUCCESS_BANNER};

/// A product review as entered on the reviews tab
#[derive(Debug, Clone)]
pub struct Review {
    /// Star rating, 1 to 5
    pub rating: u8,
    pub nickname: String,
    pub summary: String,
    pub text: String,
}

pub struct UserJourney<'a> {
    driver: &'a dyn PageDriver,
    config: &'a StorefrontConfig,
    search: SearchPage<'a>,
    product_links: Locator,
    product_title: Locator,
    size_swatch: Locator,
    color_swatch: Locator,
    add_to_cart: Locator,
    add_to_compare: Locator,
    comparison_link: Locator,
    remove_from_compare: Locator,
    confirm_remove: Locator,
    add_to_wishlist: Locator,
    wishlist_items: Locator,
    reviews_tab: Locator,
    review_nickname: Locator,
    review_summary: Locator,
    review_text: Locator,
    review_submit: Locator,
    minicart_toggle: Locator,
    view_cart: Locator,
    cart_delete: Locator,
    empty_cart: Locator,
}

impl<'a> UserJourney<'a> {
    pub fn new(driver: &'a dyn PageDriver, config: &'a StorefrontConfig) -> Self {
        Self {
            driver,
            config,
            search: SearchPage::new(driver),
            product_links: Locator::css(
                ".products.wrapper.grid.products-grid [class=\"product-item-link\"]",
            ),
            product_title: Locator::css(".page-title"),
            size_swatch: Locator::css(".swatch-attribute.size [option-id=\"168\"]"),
            color_swatch: Locator::css(".swatch-attribute.color [option-id=\"58\"]"),
            add_to_cart: Locator::css("#product-addtocart-button"),
            add_to_compare: Locator::css("a.action.tocompare"),
            comparison_link: Locator::css(SUCCESS_BANNER).locator("a"),
            remove_from_compare: Locator::css("[title=\"Remove Product\"]"),
            confirm_remove: Locator::css("button.action-primary.action-accept"),
            add_to_wishlist: Locator::css(".product-info-main a.action.towishlist"),
            wishlist_items: Locator::css("#wishlist-view-form div.product-item-info"),
            reviews_tab: Locator::css("#tab-label-reviews-title"),
            review_nickname: Locator::css("#nickname_field"),
            review_summary: Locator::css("#summary_field"),
            review_text: Locator::css("#review_field"),
            review_submit: Locator::css("button[class=\"action submit primary\"]"),
            minicart_toggle: Locator::css(".action.showcart"),
            view_cart: Locator::css("#minicart-content-wrapper .action.viewcart"),
            cart_delete: Locator::css("a.action.action-delete"),
            empty_cart: Locator::css(".cart-empty"),
        }
    }

    async fn paced_click(&self, locator: &Locator) -> E2eResult<()> {
        pause(self.config).await;
        self.driver.click(locator).await
    }

    async fn paced_fill(&self, locator: &Locator, value: &str) -> E2eResult<()> {
        pause(self.config).await;
        self.driver.fill(locator, value).await
    }

    /// Search for `product` and require it among the results
    pub async fn search_and_verify_product(&self, product: &str) -> E2eResult<()> {
        self.search.search(product).await?;
        let link = self.product_links.has_text(product);
        expect_text(self.driver, &link, product).await
    }

    /// Open `product` from the results grid
    pub async fn visit_product_page(&self, product: &str) -> E2eResult<()> {
        let link = self.product_links.has_text(product);
        expect_text(self.driver, &link, product).await?;
        self.driver.click(&link).await?;
        expect_text(self.driver, &self.product_title, product).await
    }

    pub async fn add_product_to_cart(&self, product: &str) -> E2eResult<()> {
        info!("Adding {} to the cart", product);
        self.search_and_verify_product(product).await?;
        self.visit_product_page(product).await?;

        self.paced_click(&self.size_swatch).await?;
        self.paced_click(&self.color_swatch).await?;
        self.paced_click(&self.add_to_cart).await?;

        verify_text(
            self.driver,
            self.config,
            &format!("You added {} to your shopping cart.", product),
        )
        .await
        .map(drop)
    }

    pub async fn add_to_comparison_list(&self, product: &str) -> E2eResult<()> {
        info!("Adding {} to the comparison list", product);
        self.search_and_verify_product(product).await?;
        self.visit_product_page(product).await?;
        self.paced_click(&self.add_to_compare).await?;
        verify_text(
            self.driver,
            self.config,
            &format!("You added product {} to the comparison list.", product),
        )
        .await
        .map(drop)
    }

    /// Remove the product just added, starting from its confirmation banner
    pub async fn remove_from_comparison_list(&self) -> E2eResult<()> {
        self.paced_click(&self.comparison_link).await?;
        self.paced_click(&self.remove_from_compare).await?;
        self.paced_click(&self.confirm_remove).await?;
        verify_text(self.driver, self.config, "You removed product")
            .await
            .map(drop)
    }

    pub async fn add_to_wishlist(&self, product: &str) -> E2eResult<()> {
        info!("Adding {} to the wishlist", product);
        self.search_and_verify_product(product).await?;
        self.visit_product_page(product).await?;
        self.paced_click(&self.add_to_wishlist).await?;
        verify_text(
            self.driver,
            self.config,
            &format!("{} has been added to your Wish List.", product),
        )
        .await
        .map(drop)
    }

    /// Remove `product` while on the wishlist page
    pub async fn remove_from_wishlist(&self, product: &str) -> E2eResult<()> {
        expect_text(self.driver, &Locator::css(PAGE_HEADING), "My Wish List").await?;

        let item = self.wishlist_items.has_text(product);
        self.driver.hover(&item).await?;
        self.paced_click(&item.locator("[title=\"Remove Item\"]"))
            .await?;
        verify_text(
            self.driver,
            self.config,
            &format!("{} has been removed from your Wish List.", product),
        )
        .await
        .map(drop)
    }

    pub async fn submit_review(&self, product: &str, review: &Review) -> E2eResult<()> {
        if !(1..=5).contains(&review.rating) {
            return Err(E2eError::InvalidConfig(format!(
                "review rating must be 1-5, got {}",
                review.rating
            )));
        }

        info!("Reviewing {} ({} stars)", product, review.rating);
        self.search_and_verify_product(product).await?;
        self.visit_product_page(product).await?;
        self.paced_click(&self.reviews_tab).await?;

        // The star inputs are hidden behind styled labels
        let rating = Locator::css(format!("#Rating_{}_label", review.rating));
        self.driver.scroll_into_view(&rating).await?;
        pause(self.config).await;
        self.driver.force_click(&rating).await?;

        self.paced_fill(&self.review_nickname, &review.nickname).await?;
        self.paced_fill(&self.review_summary, &review.summary).await?;
        self.paced_fill(&self.review_text, &review.text).await?;
        self.paced_click(&self.review_submit).await?;

        verify_text(
            self.driver,
            self.config,
            "You submitted your review for moderation.",
        )
        .await
        .map(drop)
    }

    /// Empty the cart; `Ok(false)` when it was already empty
    pub async fn clear_cart(&self) -> E2eResult<bool> {
        // The mini-cart hydrates late after sign-in
        tokio::time::sleep(self.config.action_delay * 6).await;
        self.driver.click(&self.minicart_toggle).await?;

        if !self
            .driver
            .is_visible(&self.view_cart, Some(Duration::from_secs(5)))
            .await?
        {
            info!("Cart is already empty, no \"View and Edit Cart\" link");
            return Ok(false);
        }

        self.paced_click(&self.view_cart).await?;
        expect_text(self.driver, &Locator::css(PAGE_HEADING), "Shopping Cart").await?;

        let items = self.driver.count(&self.cart_delete).await?;
        if items == 0 {
            info!("Cart is already empty, nothing to remove");
            return Ok(false);
        }

        for _ in 0..items {
            self.paced_click(&self.cart_delete.first()).await?;
            self.driver.wait_for_load_state(LoadState::Load).await?;
        }

        expect_contains_text(
            self.driver,
            &self.empty_cart,
            "You have no items in your shopping cart.",
        )
        .await?;
        Ok(true)
    }
}

#[async_trait]
impl StorefrontPage for UserJourney<'_> {
    fn driver(&self) -> &dyn PageDriver {
        self.driver
    }

    fn page_url_pattern(&self) -> &'static str {
        r"/$"
    }

    async fn navigate(&self) -> E2eResult<()> {
        self.driver.goto(&self.config.url("/")).await?;
        self.verify_page_url().await
    }
}

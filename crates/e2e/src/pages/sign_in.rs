//! Customer sign-in and sign-out

use async_trait::async_trait;
use tracing::info;

use crate::config::StorefrontConfig;
use crate::driver::{expect_text, expect_visible, PageDriver};
use crate::error::E2eResult;
use crate::fixtures::Credentials;
use crate::locator::Locator;
use crate::pages::{StorefrontPage, PAGE_HEADING};

pub struct SignInPage<'a> {
    driver: &'a dyn PageDriver,
    config: &'a StorefrontConfig,
    email: Locator,
    password: Locator,
    sign_in_button: Locator,
    page_title: Locator,
    customer_menu: Locator,
    authorization_link: Locator,
}

impl<'a> SignInPage<'a> {
    pub fn new(driver: &'a dyn PageDriver, config: &'a StorefrontConfig) -> Self {
        Self {
            driver,
            config,
            email: Locator::title("Email"),
            password: Locator::label("Password"),
            sign_in_button: Locator::role("button", "Sign In"),
            page_title: Locator::css("[data-ui-id=\"page-title-wrapper\"]"),
            customer_menu: Locator::css("div[class='panel header'] button[type='button']"),
            authorization_link: Locator::css(
                "div[aria-hidden='false'] ul[class='header links'] li.authorization-link",
            ),
        }
    }

    pub async fn sign_in(&self, credentials: &Credentials) -> E2eResult<()> {
        info!("Signing in as {}", credentials.username);
        expect_visible(self.driver, &self.email, None).await?;

        self.driver.fill(&self.email, &credentials.username).await?;
        self.driver.fill(&self.password, &credentials.password).await?;
        self.driver.click(&self.sign_in_button).await?;

        self.wait_for_page_load().await
    }

    pub async fn verify_successful_login(&self) -> E2eResult<()> {
        self.driver
            .wait_for_url(r"/customer/account(/index)?/?$")
            .await?;
        expect_text(self.driver, &self.page_title, "My Account").await
    }

    pub async fn sign_out(&self) -> E2eResult<()> {
        info!("Signing out");
        self.driver.click(&self.customer_menu).await?;
        self.driver.click(&self.authorization_link).await
    }

    pub async fn verify_successful_logout(&self) -> E2eResult<()> {
        self.driver
            .wait_for_url(r"customer/account/logoutSuccess")
            .await?;
        expect_text(self.driver, &Locator::css(PAGE_HEADING), "You are signed out").await
    }
}

#[async_trait]
impl StorefrontPage for SignInPage<'_> {
    fn driver(&self) -> &dyn PageDriver {
        self.driver
    }

    fn page_url_pattern(&self) -> &'static str {
        r"customer/account/login"
    }

    async fn navigate(&self) -> E2eResult<()> {
        self.driver
            .goto(&self.config.url("/customer/account/login"))
            .await?;
        expect_visible(self.driver, &self.email, None).await?;
        self.verify_page_url().await
    }
}

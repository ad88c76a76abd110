//! Customer registration

use async_trait::async_trait;
use regex::Regex;
use tracing::info;

use crate::config::StorefrontConfig;
use crate::driver::{LoadState, PageDriver};
use crate::error::{E2eError, E2eResult};
use crate::fixtures::AccountDetails;
use crate::locator::Locator;
use crate::pages::StorefrontPage;
use crate::submit::{
    FormData, FormField, FormIndicators, RetryingFormSubmitter, SubmissionReport,
    DEFAULT_RETRY_BUDGET,
};

pub const REGISTRATION_CONFIRMATION: &str = "Thank you for registering";

/// Error banner text shown when the form key went stale
pub const INVALID_FORM_KEY: &str = r"Invalid Form Key";

pub struct CreateAccountPage<'a> {
    driver: &'a dyn PageDriver,
    config: &'a StorefrontConfig,
    first_name: Locator,
    last_name: Locator,
    email: Locator,
    password: Locator,
    confirm_password: Locator,
    submit: Locator,
    success_banner: Locator,
    error_banner: Locator,
}

impl<'a> CreateAccountPage<'a> {
    pub fn new(driver: &'a dyn PageDriver, config: &'a StorefrontConfig) -> Self {
        Self {
            driver,
            config,
            first_name: Locator::title("First Name"),
            last_name: Locator::title("Last Name"),
            email: Locator::title("Email"),
            password: Locator::css("input#password"),
            confirm_password: Locator::css("input#password-confirmation"),
            submit: Locator::title("Create an Account"),
            success_banner: Locator::css(".message-success"),
            error_banner: Locator::css("div.message-error.error.message"),
        }
    }

    /// The registration form filled with `details`
    pub fn form_for(&self, details: &AccountDetails) -> FormData {
        FormData {
            fields: vec![
                FormField::new(self.first_name.clone(), &details.first_name),
                FormField::new(self.last_name.clone(), &details.last_name),
                FormField::new(self.email.clone(), &details.email),
                FormField::new(self.password.clone(), &details.password),
                FormField::new(self.confirm_password.clone(), &details.password),
            ],
            submit: self.submit.clone(),
        }
    }

    fn indicators(&self) -> E2eResult<FormIndicators> {
        let transient = Regex::new(INVALID_FORM_KEY)
            .map_err(|e| E2eError::InvalidConfig(format!("transient pattern: {}", e)))?;
        Ok(FormIndicators {
            success: self.success_banner.clone(),
            confirmation: REGISTRATION_CONFIRMATION.to_string(),
            error: self.error_banner.clone(),
            transient,
        })
    }

    /// Submit the registration form and confirm the account was created
    pub async fn create_account(&self, details: &AccountDetails) -> E2eResult<SubmissionReport> {
        self.create_account_with_retry(details, DEFAULT_RETRY_BUDGET)
            .await
    }

    pub async fn create_account_with_retry(
        &self,
        details: &AccountDetails,
        retry_budget: u32,
    ) -> E2eResult<SubmissionReport> {
        info!("Creating account for {}", details.email);
        let submitter = RetryingFormSubmitter::new(self.driver, self.indicators()?)
            .with_success_timeout(self.config.success_timeout);
        submitter
            .submit_with_retry(&self.form_for(details), retry_budget)
            .await
    }
}

#[async_trait]
impl StorefrontPage for CreateAccountPage<'_> {
    fn driver(&self) -> &dyn PageDriver {
        self.driver
    }

    fn page_url_pattern(&self) -> &'static str {
        r"customer/account/create"
    }

    async fn navigate(&self) -> E2eResult<()> {
        self.driver
            .goto(&self.config.url("/customer/account/create"))
            .await?;
        self.driver.wait_for_load_state(LoadState::Load).await
    }
}

//! Form submission with a bounded retry on transient form-token errors
//!
//! Storefront forms carry an anti-forgery form key. A stale key is rejected
//! with a recognisable error banner, and reloading the page issues a fresh
//! one. [`RetryingFormSubmitter`] fills and submits a form, classifies what
//! the page shows, and reloads and resubmits the same values while retry
//! budget remains. Every other outcome is surfaced as an error carrying the
//! text the page showed.

use std::time::Duration;

use regex::Regex;
use serde::Serialize;
use tracing::{info, warn};

use crate::driver::{LoadState, PageDriver, WaitState};
use crate::error::{E2eError, E2eResult};
use crate::locator::Locator;

pub const DEFAULT_RETRY_BUDGET: u32 = 1;

/// One input and the value typed into it
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FormField {
    pub locator: Locator,
    pub value: String,
}

impl FormField {
    pub fn new(locator: Locator, value: impl Into<String>) -> Self {
        Self {
            locator,
            value: value.into(),
        }
    }
}

/// Filled values plus the control that submits them
#[derive(Debug, Clone)]
pub struct FormData {
    pub fields: Vec<FormField>,
    pub submit: Locator,
}

/// How the page reports the result of a submission
#[derive(Debug, Clone)]
pub struct FormIndicators {
    pub success: Locator,
    /// Substring the success banner must contain
    pub confirmation: String,
    pub error: Locator,
    /// Error banner text that marks a retryable failure
    pub transient: Regex,
}

/// Classified page state after a submit
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Classification {
    Success,
    Transient(String),
    Fatal {
        reason: String,
        observed: Option<String>,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum AttemptOutcome {
    Success,
    TransientError,
    FatalError,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SubmissionAttempt {
    pub index: u32,
    pub outcome: AttemptOutcome,
    pub retries_left: u32,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct SubmissionReport {
    pub attempts: Vec<SubmissionAttempt>,
}

impl SubmissionReport {
    pub fn retried(&self) -> bool {
        self.attempts.len() > 1
    }
}

pub struct RetryingFormSubmitter<'a, D: PageDriver + ?Sized> {
    driver: &'a D,
    indicators: FormIndicators,
    success_timeout: Duration,
}

impl<'a, D: PageDriver + ?Sized> RetryingFormSubmitter<'a, D> {
    pub fn new(driver: &'a D, indicators: FormIndicators) -> Self {
        Self {
            driver,
            indicators,
            success_timeout: Duration::from_secs(5),
        }
    }

    pub fn with_success_timeout(mut self, timeout: Duration) -> Self {
        self.success_timeout = timeout;
        self
    }

    pub async fn submit(&self, form: &FormData) -> E2eResult<SubmissionReport> {
        self.submit_with_retry(form, DEFAULT_RETRY_BUDGET).await
    }

    pub async fn submit_with_retry(
        &self,
        form: &FormData,
        retry_budget: u32,
    ) -> E2eResult<SubmissionReport> {
        let mut report = SubmissionReport::default();
        let mut retries_left = retry_budget;
        let mut index = 0;

        loop {
            self.fill_and_submit(form).await?;

            match self.classify().await? {
                Classification::Success => {
                    report.attempts.push(SubmissionAttempt {
                        index,
                        outcome: AttemptOutcome::Success,
                        retries_left,
                    });
                    info!("Form submitted on attempt {}", index);
                    return Ok(report);
                }
                Classification::Transient(text) if retries_left > 0 => {
                    warn!(
                        "Transient form error on attempt {}: {}; reloading and retrying",
                        index,
                        text.trim()
                    );
                    report.attempts.push(SubmissionAttempt {
                        index,
                        outcome: AttemptOutcome::TransientError,
                        retries_left,
                    });
                    retries_left -= 1;
                    index += 1;

                    self.driver.reload().await?;
                    self.driver.wait_for_load_state(LoadState::Load).await?;
                }
                Classification::Transient(text) => {
                    return Err(E2eError::Submission {
                        reason: format!(
                            "transient error persisted after {} retr{}",
                            retry_budget,
                            if retry_budget == 1 { "y" } else { "ies" }
                        ),
                        last_observed: Some(text.trim().to_string()),
                    });
                }
                Classification::Fatal { reason, observed } => {
                    return Err(E2eError::Submission {
                        reason,
                        last_observed: observed.map(|t| t.trim().to_string()),
                    });
                }
            }
        }
    }

    async fn fill_and_submit(&self, form: &FormData) -> E2eResult<()> {
        for field in &form.fields {
            self.driver.fill(&field.locator, &field.value).await?;
        }
        self.driver.click(&form.submit).await
    }

    /// Look at the success banner first, then the error banner
    pub async fn classify(&self) -> E2eResult<Classification> {
        let mut observed = None;

        let appeared = self
            .driver
            .wait_for(
                &self.indicators.success,
                WaitState::Visible,
                Some(self.success_timeout),
            )
            .await?;
        if appeared {
            let text = self
                .driver
                .text_content(&self.indicators.success)
                .await?
                .unwrap_or_default();
            if text.contains(&self.indicators.confirmation) {
                return Ok(Classification::Success);
            }
            warn!(
                "Success banner lacks {:?}: {:?}",
                self.indicators.confirmation,
                text.trim()
            );
            observed = Some(text);
        }

        if self.driver.is_visible(&self.indicators.error, None).await? {
            let text = self
                .driver
                .text_content(&self.indicators.error)
                .await?
                .unwrap_or_default();
            if self.indicators.transient.is_match(&text) {
                return Ok(Classification::Transient(text));
            }
            return Ok(Classification::Fatal {
                reason: "form rejected".to_string(),
                observed: Some(text),
            });
        }

        let reason = if observed.is_some() {
            format!(
                "success banner did not contain {:?}",
                self.indicators.confirmation
            )
        } else {
            format!(
                "no success or error banner within {:?}",
                self.success_timeout
            )
        };
        Ok(Classification::Fatal { reason, observed })
    }
}

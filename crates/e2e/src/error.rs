//! Error types for E2E testing

use thiserror::Error;

#[derive(Error, Debug)]
pub enum E2eError {
    #[error("BASE_URL is not defined in the environment or env file")]
    MissingBaseUrl,

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("Storefront unreachable at {url} after {attempts} attempts")]
    Preflight { url: String, attempts: usize },

    #[error("Playwright not found. Install with: npx playwright install")]
    PlaywrightNotFound,

    #[error("Playwright bridge error: {0}")]
    Bridge(String),

    #[error("Driver error: {0}")]
    Driver(String),

    #[error("Pagination control is not present on the page")]
    MissingPaginationControl,

    #[error("Page {0} shows no products")]
    EmptyPage(u32),

    #[error("Next control not visible on page {0}, but more pages are expected")]
    MissingNextControl(u32),

    #[error("Terminal page numbers mismatch: expected {expected:?}, got {actual:?}")]
    TruncationMismatch {
        expected: Vec<String>,
        actual: Vec<String>,
    },

    #[error("Assertion failed for {what}: expected {expected:?}, got {actual:?}")]
    AssertionFailed {
        what: String,
        expected: String,
        actual: String,
    },

    #[error("Form submission failed: {reason} (last observed: {last_observed:?})")]
    Submission {
        reason: String,
        last_observed: Option<String>,
    },

    #[error("Timeout waiting for: {0}")]
    Timeout(String),

    #[error("Unknown scenario: {0}")]
    UnknownScenario(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),
}

impl E2eError {
    pub fn assertion(
        what: impl Into<String>,
        expected: impl Into<String>,
        actual: impl Into<String>,
    ) -> Self {
        E2eError::AssertionFailed {
            what: what.into(),
            expected: expected.into(),
            actual: actual.into(),
        }
    }

    /// Whether this error should abort the whole run rather than one scenario.
    pub fn is_environment(&self) -> bool {
        matches!(
            self,
            E2eError::MissingBaseUrl
                | E2eError::InvalidConfig(_)
                | E2eError::MissingPaginationControl
                | E2eError::Preflight { .. }
                | E2eError::PlaywrightNotFound
        )
    }
}

pub type E2eResult<T> = Result<T, E2eError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_truncation_mismatch_reports_both_sides() {
        let err = E2eError::TruncationMismatch {
            expected: vec!["4".into(), "5".into()],
            actual: vec!["3".into(), "4".into()],
        };
        let msg = err.to_string();
        assert!(msg.contains("[\"4\", \"5\"]"));
        assert!(msg.contains("[\"3\", \"4\"]"));
    }

    #[test]
    fn test_environment_classification() {
        assert!(E2eError::MissingBaseUrl.is_environment());
        assert!(E2eError::PlaywrightNotFound.is_environment());
        assert!(E2eError::MissingPaginationControl.is_environment());
        assert!(!E2eError::EmptyPage(2).is_environment());
        assert!(!E2eError::MissingNextControl(3).is_environment());
    }
}

//! Test data fixtures loaded from `tests/data/testData.json`

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{E2eError, E2eResult};

/// Default fixture location, relative to the crate root
pub const DEFAULT_DATA_FILE: &str = "tests/data/testData.json";

/// The whole fixture document
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TestData {
    pub users: Vec<Credentials>,
    pub new_account: NewAccountTemplate,
}

/// An existing storefront customer
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Credentials {
    pub username: String,
    pub password: String,
}

/// Template for sign-up; the email is made unique per run
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewAccountTemplate {
    pub first_name: String,
    pub last_name: String,
    pub email_prefix: String,
    pub password: String,
}

/// Concrete values submitted on the create-account form
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AccountDetails {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub password: String,
}

impl TestData {
    pub fn from_json(json: &str) -> E2eResult<Self> {
        let data: TestData = serde_json::from_str(json)?;
        if data.users.is_empty() {
            return Err(E2eError::InvalidConfig(
                "test data must list at least one user".to_string(),
            ));
        }
        Ok(data)
    }

    pub fn from_file(path: &Path) -> E2eResult<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_json(&content)
    }

    /// The first listed user, used by every signed-in scenario
    pub fn primary_user(&self) -> E2eResult<&Credentials> {
        self.users
            .first()
            .ok_or_else(|| E2eError::InvalidConfig("test data lists no users".to_string()))
    }
}

impl NewAccountTemplate {
    /// Account details with `<prefix>+<stamp>@example.com` as the email
    pub fn account_with_stamp(&self, stamp: i64) -> AccountDetails {
        AccountDetails {
            first_name: self.first_name.clone(),
            last_name: self.last_name.clone(),
            email: format!("{}+{}@example.com", self.email_prefix, stamp),
            password: self.password.clone(),
        }
    }

    /// Account details stamped with the current time in milliseconds
    pub fn fresh_account(&self) -> AccountDetails {
        self.account_with_stamp(chrono::Utc::now().timestamp_millis())
    }
}

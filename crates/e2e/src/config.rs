//! Storefront configuration
//!
//! The only required setting is `BASE_URL`. It is read from an env file
//! (`urls.env` by default) and then from the process environment, which wins.
//! Nothing downstream reads the environment; pages receive a
//! [`StorefrontConfig`] at construction.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::time::Duration;

use tracing::debug;
use url::Url;

use crate::error::{E2eError, E2eResult};

pub const BASE_URL_VAR: &str = "BASE_URL";

/// Default env file, relative to the working directory
pub const DEFAULT_ENV_FILE: &str = "urls.env";

#[derive(Debug, Clone)]
pub struct StorefrontConfig {
    /// Storefront root, without a trailing slash
    pub base_url: String,

    /// Pause between paced user actions
    pub action_delay: Duration,

    /// How long a form waits for its success banner
    pub success_timeout: Duration,

    /// Directory for failure screenshots
    pub artifacts_dir: PathBuf,
}

impl StorefrontConfig {
    /// Build a config from an explicit base URL
    pub fn new(base_url: &str) -> E2eResult<Self> {
        Ok(Self {
            base_url: normalize_base_url(base_url)?,
            action_delay: Duration::from_millis(500),
            success_timeout: Duration::from_secs(5),
            artifacts_dir: PathBuf::from("test-results/artifacts"),
        })
    }

    /// Resolve `BASE_URL` from an env file and the process environment
    pub fn load(env_file: Option<&Path>) -> E2eResult<Self> {
        let path = env_file.unwrap_or_else(|| Path::new(DEFAULT_ENV_FILE));
        let from_file = if path.exists() {
            debug!("Loading env file {}", path.display());
            parse_env_file(&std::fs::read_to_string(path)?)
        } else if env_file.is_some() {
            return Err(E2eError::InvalidConfig(format!(
                "env file not found: {}",
                path.display()
            )));
        } else {
            HashMap::new()
        };

        let base_url = std::env::var(BASE_URL_VAR)
            .ok()
            .filter(|v| !v.trim().is_empty())
            .or_else(|| from_file.get(BASE_URL_VAR).cloned())
            .ok_or(E2eError::MissingBaseUrl)?;

        Self::new(&base_url)
    }

    /// Absolute URL for a storefront path such as `/customer/account/login`
    pub fn url(&self, path: &str) -> String {
        if path.starts_with('/') {
            format!("{}{}", self.base_url, path)
        } else {
            format!("{}/{}", self.base_url, path)
        }
    }

    pub fn with_action_delay(mut self, delay: Duration) -> Self {
        self.action_delay = delay;
        self
    }

    pub fn with_artifacts_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.artifacts_dir = dir.into();
        self
    }
}

fn normalize_base_url(raw: &str) -> E2eResult<String> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err(E2eError::MissingBaseUrl);
    }

    let parsed = Url::parse(trimmed)
        .map_err(|e| E2eError::InvalidConfig(format!("BASE_URL {:?}: {}", trimmed, e)))?;
    if !matches!(parsed.scheme(), "http" | "https") {
        return Err(E2eError::InvalidConfig(format!(
            "BASE_URL must be http(s), got {}",
            parsed.scheme()
        )));
    }

    Ok(trimmed.trim_end_matches('/').to_string())
}

/// Parse `KEY=VALUE` lines; blank lines and `#` comments are skipped and
/// surrounding quotes are removed from values.
fn parse_env_file(content: &str) -> HashMap<String, String> {
    content
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty() && !line.starts_with('#'))
        .filter_map(|line| {
            let line = line.strip_prefix("export ").unwrap_or(line);
            let (key, value) = line.split_once('=')?;
            let value = value.trim();
            let value = value
                .strip_prefix('"')
                .and_then(|v| v.strip_suffix('"'))
                .or_else(|| value.strip_prefix('\'').and_then(|v| v.strip_suffix('\'')))
                .unwrap_or(value);
            Some((key.trim().to_string(), value.to_string()))
        })
        .collect()
}

//! Storefront reachability check run before any browser starts

use std::time::{Duration, Instant};

use tokio::time::sleep;
use tracing::{info, warn};

use crate::error::{E2eError, E2eResult};

#[derive(Debug, Clone)]
pub struct PreflightConfig {
    /// Give up after this long
    pub timeout: Duration,
    /// Per-request timeout
    pub request_timeout: Duration,
    /// Pause between attempts
    pub interval: Duration,
}

impl Default for PreflightConfig {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(30),
            request_timeout: Duration::from_secs(10),
            interval: Duration::from_millis(500),
        }
    }
}

/// Poll `base_url` until it answers with a non-server-error status
pub async fn wait_for_storefront(base_url: &str, config: &PreflightConfig) -> E2eResult<()> {
    let client = reqwest::Client::builder()
        .timeout(config.request_timeout)
        .build()?;

    let start = Instant::now();
    let mut attempts = 0;

    while start.elapsed() < config.timeout {
        attempts += 1;

        match client.get(base_url).send().await {
            // 4xx still means a storefront is answering; bot walls often 403 plain clients
            Ok(resp) if !resp.status().is_server_error() => {
                info!("Storefront reachable at {} ({})", base_url, resp.status());
                return Ok(());
            }
            Ok(resp) => {
                warn!("Preflight returned {}", resp.status());
            }
            Err(e) => {
                if attempts == 1 {
                    info!("Waiting for storefront at {}...", base_url);
                }
                if !e.is_connect() && !e.is_timeout() {
                    warn!("Preflight error: {}", e);
                }
            }
        }

        sleep(config.interval).await;
    }

    Err(E2eError::Preflight {
        url: base_url.to_string(),
        attempts,
    })
}

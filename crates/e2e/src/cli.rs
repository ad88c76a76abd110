//! Command line of the live storefront harness
//!
//! The harness is a `harness = false` test target, so `cargo test` hands it
//! libtest's arguments (a name filter, `--test-threads`, `--nocapture` and
//! so on). Those are accepted and ignored.

use std::path::PathBuf;
use std::time::Duration;

use clap::builder::BoolishValueParser;
use clap::Parser;

use crate::config::{StorefrontConfig, BASE_URL_VAR};
use crate::error::E2eResult;
use crate::fixtures::DEFAULT_DATA_FILE;
use crate::playwright::{Browser, PlaywrightConfig};
use crate::preflight::PreflightConfig;
use crate::scenario::Scenario;

/// Opt-in switch for driving a real browser
pub const LIVE_VAR: &str = "STOREFRONT_E2E";

#[derive(Parser, Debug)]
#[command(name = "storefront-e2e")]
#[command(about = "E2E test runner for the storefront")]
pub struct HarnessArgs {
    /// Actually drive the browser against the storefront (1/true/yes/on)
    #[arg(long, env = LIVE_VAR, value_parser = BoolishValueParser::new())]
    pub live: bool,

    /// Path to the test data fixture
    #[arg(long, default_value = DEFAULT_DATA_FILE)]
    pub data: PathBuf,

    /// Env file providing BASE_URL
    #[arg(long)]
    pub env_file: Option<PathBuf>,

    /// Storefront base URL (overrides the env file)
    #[arg(long, env = BASE_URL_VAR)]
    pub base_url: Option<String>,

    /// Run only these scenarios (repeatable)
    #[arg(short, long)]
    pub scenario: Vec<String>,

    /// Run only scenarios carrying this tag
    #[arg(short, long)]
    pub tag: Option<String>,

    /// Browser to use (chromium, firefox, webkit)
    #[arg(long, default_value = "chromium")]
    pub browser: String,

    /// Show the browser window
    #[arg(long)]
    pub headed: bool,

    /// Pause between paced user actions
    #[arg(long, default_value = "500")]
    pub action_delay_ms: u64,

    /// Skip the storefront reachability probe
    #[arg(long)]
    pub skip_preflight: bool,

    /// Output directory for results
    #[arg(short, long, default_value = "test-results")]
    pub output: PathBuf,

    #[command(flatten)]
    pub libtest: LibtestArgs,
}

/// Arguments cargo forwards to every test binary
#[derive(clap::Args, Debug, Default)]
pub struct LibtestArgs {
    #[arg(hide = true)]
    pub filters: Vec<String>,
    #[arg(long, hide = true)]
    pub nocapture: bool,
    #[arg(short, long, hide = true)]
    pub quiet: bool,
    #[arg(long, hide = true)]
    pub exact: bool,
    #[arg(long, hide = true)]
    pub ignored: bool,
    #[arg(long, hide = true)]
    pub include_ignored: bool,
    #[arg(long, hide = true)]
    pub show_output: bool,
    #[arg(long, hide = true)]
    pub list: bool,
    #[arg(long, hide = true)]
    pub test_threads: Option<usize>,
    #[arg(long, hide = true)]
    pub color: Option<String>,
    #[arg(long, hide = true)]
    pub format: Option<String>,
    #[arg(long, hide = true)]
    pub skip: Vec<String>,
    #[arg(short = 'Z', hide = true)]
    pub unstable: Vec<String>,
}

/// Which scenarios a run covers
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Selection {
    All,
    Tagged(String),
    Named(Vec<Scenario>),
}

impl HarnessArgs {
    /// Explicit `--scenario` names win over `--tag`
    pub fn selection(&self) -> E2eResult<Selection> {
        if !self.scenario.is_empty() {
            let named = self
                .scenario
                .iter()
                .map(|s| s.parse())
                .collect::<E2eResult<Vec<_>>>()?;
            return Ok(Selection::Named(named));
        }
        Ok(match &self.tag {
            Some(tag) => Selection::Tagged(tag.clone()),
            None => Selection::All,
        })
    }

    pub fn storefront_config(&self) -> E2eResult<StorefrontConfig> {
        let config = match &self.base_url {
            Some(url) => StorefrontConfig::new(url)?,
            None => StorefrontConfig::load(self.env_file.as_deref())?,
        };
        Ok(config
            .with_action_delay(Duration::from_millis(self.action_delay_ms))
            .with_artifacts_dir(self.output.join("artifacts")))
    }

    pub fn playwright_config(&self) -> E2eResult<PlaywrightConfig> {
        let browser: Browser = self.browser.parse()?;
        Ok(PlaywrightConfig {
            browser,
            headless: !self.headed,
            ..Default::default()
        })
    }

    pub fn preflight_config(&self) -> Option<PreflightConfig> {
        (!self.skip_preflight).then(PreflightConfig::default)
    }
}

//! Main test runner: one browser session per scenario, then a JSON report

use std::future::Future;
use std::path::PathBuf;
use std::time::Instant;

use serde::{Deserialize, Serialize};
use tracing::{debug, error, info, warn};

use crate::config::StorefrontConfig;
use crate::driver::PageDriver;
use crate::error::E2eResult;
use crate::fixtures::TestData;
use crate::playwright::{BrowserSession, PlaywrightConfig};
use crate::preflight::{wait_for_storefront, PreflightConfig};
use crate::scenario::{Scenario, ScenarioContext};

/// Result of running a single scenario
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScenarioResult {
    pub name: String,
    pub success: bool,
    pub duration_ms: u64,
    pub error: Option<String>,
    /// The failure came from the environment, not the storefront's behaviour
    #[serde(default)]
    pub environment: bool,
    pub screenshot: Option<PathBuf>,
}

/// Result of running a set of scenarios
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SuiteResult {
    pub total: usize,
    pub passed: usize,
    pub failed: usize,
    pub duration_ms: u64,
    /// Set when an environment failure stopped the run early
    #[serde(default)]
    pub aborted: bool,
    pub results: Vec<ScenarioResult>,
}

impl SuiteResult {
    pub fn from_results(results: Vec<ScenarioResult>, duration_ms: u64) -> Self {
        let passed = results.iter().filter(|r| r.success).count();
        Self {
            total: results.len(),
            passed,
            failed: results.len() - passed,
            duration_ms,
            aborted: false,
            results,
        }
    }
}

/// Configuration for the test runner
#[derive(Debug, Clone)]
pub struct RunnerConfig {
    pub storefront: StorefrontConfig,
    pub playwright: PlaywrightConfig,
    pub data: TestData,
    /// `None` skips the reachability probe
    pub preflight: Option<PreflightConfig>,
    pub output_dir: PathBuf,
}

pub struct TestRunner {
    config: RunnerConfig,
    preflight_done: bool,
}

impl TestRunner {
    pub fn new(config: RunnerConfig) -> Self {
        Self {
            config,
            preflight_done: false,
        }
    }

    /// Make sure the storefront answers before launching any browser
    pub async fn preflight(&mut self) -> E2eResult<()> {
        if self.preflight_done {
            return Ok(());
        }
        if let Some(preflight) = &self.config.preflight {
            wait_for_storefront(&self.config.storefront.base_url, preflight).await?;
        }
        self.preflight_done = true;
        Ok(())
    }

    pub async fn run_all(&mut self) -> E2eResult<SuiteResult> {
        self.run_scenarios(&Scenario::ALL).await
    }

    pub async fn run_tagged(&mut self, tag: &str) -> E2eResult<SuiteResult> {
        let selected: Vec<Scenario> = Scenario::ALL
            .into_iter()
            .filter(|s| s.has_tag(tag))
            .collect();
        self.run_scenarios(&selected).await
    }

    pub async fn run_scenarios(&mut self, scenarios: &[Scenario]) -> E2eResult<SuiteResult> {
        self.preflight().await?;
        let this = &*self;
        run_suite(scenarios, move |scenario| this.run_scenario(scenario)).await
    }

    /// Run one scenario in a fresh browser session
    ///
    /// Failures inside the scenario become a failed result; failing to start
    /// the browser at all is returned as an error.
    pub async fn run_scenario(&self, scenario: Scenario) -> E2eResult<ScenarioResult> {
        let session = BrowserSession::launch(&self.config.playwright).await?;
        let ctx = ScenarioContext {
            config: &self.config.storefront,
            data: &self.config.data,
        };

        let result = execute(scenario, &session, &ctx).await;

        if let Err(e) = session.close().await {
            warn!("Failed to close browser after {}: {}", scenario, e);
        }
        Ok(result)
    }

    /// Write suite results to JSON
    pub fn write_results(&self, results: &SuiteResult) -> E2eResult<PathBuf> {
        std::fs::create_dir_all(&self.config.output_dir)?;

        let path = self.config.output_dir.join("storefront-results.json");
        let json = serde_json::to_string_pretty(results)?;
        std::fs::write(&path, json)?;

        info!("Results written to: {}", path.display());
        Ok(path)
    }
}

/// Run `scenarios` in order through `run_one`
///
/// A scenario that fails on an environment error stops the suite; the
/// remaining scenarios are not started.
pub async fn run_suite<F, Fut>(scenarios: &[Scenario], mut run_one: F) -> E2eResult<SuiteResult>
where
    F: FnMut(Scenario) -> Fut,
    Fut: Future<Output = E2eResult<ScenarioResult>>,
{
    let start = Instant::now();
    info!("Running {} scenario(s)...", scenarios.len());

    let mut results = Vec::new();
    let mut aborted = false;
    for (i, scenario) in scenarios.iter().enumerate() {
        let result = run_one(*scenario).await?;
        if result.success {
            info!("✓ {} ({} ms)", result.name, result.duration_ms);
        } else {
            error!(
                "✗ {} - {}",
                result.name,
                result.error.as_deref().unwrap_or("unknown error")
            );
        }
        let environment = result.environment;
        results.push(result);

        if environment {
            let skipped = scenarios.len() - i - 1;
            if skipped > 0 {
                error!(
                    "Environment failure, skipping the remaining {} scenario(s)",
                    skipped
                );
            }
            aborted = true;
            break;
        }
    }

    let mut suite = SuiteResult::from_results(results, start.elapsed().as_millis() as u64);
    suite.aborted = aborted;
    info!(
        "Scenario results: {} passed, {} failed ({} ms)",
        suite.passed, suite.failed, suite.duration_ms
    );
    Ok(suite)
}

/// Run `scenario` against `driver`, capturing a screenshot when it fails
pub async fn execute(
    scenario: Scenario,
    driver: &dyn PageDriver,
    ctx: &ScenarioContext<'_>,
) -> ScenarioResult {
    let start = Instant::now();
    debug!("Running scenario: {}", scenario);

    let outcome = scenario.run(driver, ctx).await;

    let mut screenshot = None;
    let mut environment = false;
    let error = match outcome {
        Ok(()) => None,
        Err(e) => {
            environment = e.is_environment();
            let path = ctx.config.artifacts_dir.join(format!(
                "{}-{}.png",
                scenario.name(),
                chrono::Utc::now().format("%Y%m%dT%H%M%S")
            ));
            match driver.screenshot(&path).await {
                Ok(()) => screenshot = Some(path),
                Err(shot) => warn!("Could not capture failure screenshot: {}", shot),
            }
            Some(e.to_string())
        }
    };

    ScenarioResult {
        name: scenario.name().to_string(),
        success: error.is_none(),
        duration_ms: start.elapsed().as_millis() as u64,
        error,
        environment,
        screenshot,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn result(name: &str, success: bool) -> ScenarioResult {
        ScenarioResult {
            name: name.to_string(),
            success,
            duration_ms: 10,
            error: (!success).then(|| "boom".to_string()),
            environment: false,
            screenshot: None,
        }
    }

    #[test]
    fn test_suite_counts() {
        let suite = SuiteResult::from_results(
            vec![result("sign-in", true), result("pagination", false)],
            20,
        );
        assert_eq!(suite.total, 2);
        assert_eq!(suite.passed, 1);
        assert_eq!(suite.failed, 1);
    }

    #[tokio::test]
    async fn test_run_suite_stops_on_environment_failure() {
        let mut started = Vec::new();
        let suite = run_suite(&Scenario::ALL, |scenario| {
            started.push(scenario);
            let mut outcome = result(scenario.name(), scenario != Scenario::SignIn);
            outcome.environment = scenario == Scenario::SignIn;
            async move { Ok(outcome) }
        })
        .await
        .unwrap();

        assert_eq!(started, vec![Scenario::SignUp, Scenario::SignIn]);
        assert!(suite.aborted);
        assert_eq!((suite.passed, suite.failed), (1, 1));
    }

    #[tokio::test]
    async fn test_run_suite_runs_past_ordinary_failures() {
        let suite = run_suite(&Scenario::ALL, |scenario| {
            let outcome = result(scenario.name(), scenario != Scenario::Wishlist);
            async move { Ok(outcome) }
        })
        .await
        .unwrap();

        assert!(!suite.aborted);
        assert_eq!(suite.total, Scenario::ALL.len());
        assert_eq!(suite.failed, 1);
    }

    #[test]
    fn test_write_results() {
        let dir = tempfile::tempdir().unwrap();
        let runner = TestRunner::new(RunnerConfig {
            storefront: StorefrontConfig::new("https://shop.example.com").unwrap(),
            playwright: PlaywrightConfig::default(),
            data: TestData::from_json(
                r#"{"users":[{"username":"u","password":"p"}],
                    "newAccount":{"firstName":"a","lastName":"b","emailPrefix":"c","password":"d"}}"#,
            )
            .unwrap(),
            preflight: None,
            output_dir: dir.path().to_path_buf(),
        });

        let path = runner
            .write_results(&SuiteResult::from_results(vec![result("sign-up", true)], 5))
            .unwrap();
        let written: SuiteResult =
            serde_json::from_str(&std::fs::read_to_string(path).unwrap()).unwrap();
        assert_eq!(written.passed, 1);
        assert_eq!(written.results[0].name, "sign-up");
    }
}

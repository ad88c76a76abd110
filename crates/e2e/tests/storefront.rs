//! Storefront E2E harness entry point
//!
//! Runs the user-flow scenarios against a live storefront. Without `--live`
//! (or `STOREFRONT_E2E=1`) it exits successfully without touching the
//! network, so plain `cargo test` stays hermetic.
//!
//! Run with: STOREFRONT_E2E=1 cargo test --package storefront-e2e --test storefront -- --tag account

use clap::Parser;
use tracing_subscriber::EnvFilter;

use storefront_e2e::cli::{HarnessArgs, Selection, LIVE_VAR};
use storefront_e2e::fixtures::TestData;
use storefront_e2e::runner::{RunnerConfig, SuiteResult};
use storefront_e2e::{E2eResult, TestRunner};

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let args = HarnessArgs::parse();
    if args.libtest.list {
        return;
    }
    if !args.live {
        println!(
            "storefront-e2e: live run not requested (set {}=1), skipping",
            LIVE_VAR
        );
        return;
    }

    let rt = match tokio::runtime::Runtime::new() {
        Ok(rt) => rt,
        Err(e) => {
            eprintln!("Error: failed to create tokio runtime: {}", e);
            std::process::exit(2);
        }
    };

    match rt.block_on(async_main(args)) {
        Ok(suite) if suite.aborted => std::process::exit(2),
        Ok(suite) if suite.failed == 0 => std::process::exit(0),
        Ok(_) => std::process::exit(1),
        Err(e) => {
            eprintln!("Error: {}", e);
            std::process::exit(2);
        }
    }
}

async fn async_main(args: HarnessArgs) -> E2eResult<SuiteResult> {
    let selection = args.selection()?;
    let config = RunnerConfig {
        storefront: args.storefront_config()?,
        playwright: args.playwright_config()?,
        data: TestData::from_file(&args.data)?,
        preflight: args.preflight_config(),
        output_dir: args.output.clone(),
    };

    let mut runner = TestRunner::new(config);
    let results = match &selection {
        Selection::All => runner.run_all().await?,
        Selection::Tagged(tag) => runner.run_tagged(tag).await?,
        Selection::Named(scenarios) => runner.run_scenarios(scenarios).await?,
    };
    runner.write_results(&results)?;

    Ok(results)
}

//! Storefront E2E Test Suite
//!
//! Drives a real browser through the storefront's user flows: sign-up,
//! sign-in and sign-out, search, pagination, cart, wishlist, comparison list
//! and reviews.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                  Storefront E2E Runner (Rust)               │
//! ├─────────────────────────────────────────────────────────────┤
//! │  TestRunner                                                 │
//! │    ├── preflight() -> storefront reachable?                 │
//! │    ├── run_scenario(Scenario) -> ScenarioResult             │
//! │    │     └── BrowserSession (Node + Playwright, JSON lines) │
//! │    └── write_results(SuiteResult)                           │
//! ├─────────────────────────────────────────────────────────────┤
//! │  Page objects (over dyn PageDriver)                         │
//! │    ├── SignInPage, CreateAccountPage, SearchPage            │
//! │    └── UserJourney                                          │
//! ├─────────────────────────────────────────────────────────────┤
//! │  Flow logic                                                 │
//! │    ├── PaginationWalker      (pagination)                   │
//! │    └── RetryingFormSubmitter (submit)                       │
//! └─────────────────────────────────────────────────────────────┘
//! ```

pub mod cli;
pub mod config;
pub mod driver;
pub mod error;
pub mod fixtures;
pub mod locator;
pub mod pages;
pub mod pagination;
pub mod playwright;
pub mod preflight;
pub mod runner;
pub mod scenario;
pub mod submit;

pub use config::StorefrontConfig;
pub use driver::{LoadState, PageDriver, WaitState};
pub use error::{E2eError, E2eResult};
pub use locator::Locator;
pub use pagination::{PaginationLocators, PaginationReport, PaginationWalker};
pub use runner::TestRunner;
pub use scenario::Scenario;
pub use submit::{FormData, FormIndicators, RetryingFormSubmitter, SubmissionReport};

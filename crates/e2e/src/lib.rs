//! Taskboard E2E Test Framework
//!
//! A Rust-controlled end-to-end harness for the Taskboard demo that:
//! - Spawns the web server as a subprocess
//! - Drives Playwright through generated scripts run under `node`
//! - Parses declarative YAML test specs
//! - Layers page objects over the SPA's `data-testid` hooks
//! - Exercises the HTTP surface directly through an API helper client
//! - Performs visual regression testing with baseline screenshots
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                    E2E Test Runner (Rust)                   │
//! ├─────────────────────────────────────────────────────────────┤
//! │  TestRunner                                                 │
//! │    ├── spawn_server() -> ServerHandle                       │
//! │    ├── execute_spec(spec) -> Vec<StepResult>                │
//! │    └── compare_screenshot(actual, baseline) -> VisualDiff   │
//! ├─────────────────────────────────────────────────────────────┤
//! │  TestSpec (YAML)          PageObjects          ApiClient    │
//! │    steps: [navigate,        LoginPage            login      │
//! │      click, fill, wait,     TaskBoardPage        tasks      │
//! │      assert, screenshot]    (selectors + flows)  search ... │
//! └─────────────────────────────────────────────────────────────┘
//! ```

pub mod api;
pub mod error;
pub mod pages;
pub mod playwright;
pub mod runner;
pub mod server;
pub mod spec;
pub mod visual;

pub use api::ApiClient;
pub use error::{E2eError, E2eResult};
pub use pages::{LoginPage, TaskBoardPage};
pub use runner::TestRunner;
pub use spec::{TestSpec, TestStep};

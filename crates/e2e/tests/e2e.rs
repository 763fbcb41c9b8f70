//! E2E test harness entry point
//!
//! This binary runs the browser scenarios from YAML specs against a freshly
//! spawned server. Run with: cargo test --package taskboard-e2e --test e2e
//!
//! When the server binary or Playwright is unavailable the run is skipped
//! rather than failed, so a plain `cargo test` stays green on machines
//! without node.

use std::path::PathBuf;
use std::time::Duration;
use clap::Parser;
use tracing_subscriber::EnvFilter;

use taskboard_e2e::playwright::{Browser, PlaywrightConfig, PlaywrightHandle};
use taskboard_e2e::runner::{RunnerConfig, TestRunner};
use taskboard_e2e::server::{default_server_binary, ServerConfig};
use taskboard_e2e::visual::VisualConfig;
use taskboard_e2e::E2eResult;

#[derive(Parser, Debug)]
#[command(name = "taskboard-e2e")]
#[command(about = "E2E test runner for Taskboard")]
struct Args {
    /// Path to test specs directory
    #[arg(short, long)]
    specs: Option<PathBuf>,

    /// Run only tests matching this tag
    #[arg(short, long)]
    tag: Option<String>,

    /// Run only a specific test by name
    #[arg(short, long)]
    name: Option<String>,

    /// Update visual baselines instead of comparing
    #[arg(long)]
    update_baselines: bool,

    /// Path to the web server binary
    #[arg(long)]
    server_binary: Option<PathBuf>,

    /// Port to run the server on (0 = auto)
    #[arg(long, default_value = "0")]
    port: u16,

    /// Browser to use (chromium, firefox, webkit)
    #[arg(long, default_value = "chromium")]
    browser: String,

    /// Run in headless mode
    #[arg(long, default_value = "true")]
    headless: bool,

    /// Viewport width
    #[arg(long, default_value = "1280")]
    viewport_width: u32,

    /// Viewport height
    #[arg(long, default_value = "720")]
    viewport_height: u32,

    /// Visual diff threshold (percentage)
    #[arg(long, default_value = "0.5")]
    visual_threshold: f64,

    /// Output directory for results
    #[arg(short, long, default_value = "test-results")]
    output: PathBuf,
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let args = Args::parse();

    // Browser scenarios need node, Playwright, and installed browsers, so
    // they are opt-in: TASKBOARD_E2E=1 cargo test -p taskboard-e2e --test e2e
    let enabled = std::env::var("TASKBOARD_E2E")
        .map(|v| v == "1")
        .unwrap_or(false);
    if !enabled {
        eprintln!("skipping e2e scenarios: set TASKBOARD_E2E=1 to run them");
        return;
    }

    let server_binary = args
        .server_binary
        .clone()
        .unwrap_or_else(default_server_binary);

    // Skip, not fail, when the environment cannot run browser scenarios.
    if !server_binary.exists() {
        eprintln!(
            "skipping e2e scenarios: server binary not found at {} (build with: cargo build -p taskboard-web)",
            server_binary.display()
        );
        return;
    }
    if PlaywrightHandle::check_installed().is_err() {
        eprintln!("skipping e2e scenarios: Playwright not available (install with: npx playwright install)");
        return;
    }

    let rt = tokio::runtime::Runtime::new().expect("Failed to create tokio runtime");
    let result = rt.block_on(async_main(args, server_binary));

    match result {
        Ok(true) => std::process::exit(0),
        Ok(false) => std::process::exit(1),
        Err(e) => {
            eprintln!("Error: {}", e);
            std::process::exit(2);
        }
    }
}

async fn async_main(args: Args, server_binary: PathBuf) -> E2eResult<bool> {
    let browser = match args.browser.as_str() {
        "firefox" => Browser::Firefox,
        "webkit" => Browser::Webkit,
        _ => Browser::Chromium,
    };

    let config = RunnerConfig {
        server: ServerConfig {
            binary_path: server_binary,
            static_dir: None,
            port: if args.port == 0 { None } else { Some(args.port) },
            startup_timeout: Duration::from_secs(30),
        },
        playwright: PlaywrightConfig {
            viewport_width: args.viewport_width,
            viewport_height: args.viewport_height,
            browser,
            headless: args.headless,
            screenshot_dir: args.output.join("screenshots"),
            ..Default::default()
        },
        visual: VisualConfig {
            threshold: args.visual_threshold,
            auto_update: args.update_baselines,
            actual_dir: args.output.join("screenshots"),
            baseline_dir: args.output.join("baselines"),
            diff_dir: args.output.join("diffs"),
        },
        specs_dir: args
            .specs
            .unwrap_or_else(taskboard_e2e::runner::default_specs_dir),
        output_dir: args.output,
    };

    let mut runner = TestRunner::with_config(config);

    runner.start_server().await?;

    let results = if let Some(name) = args.name {
        let result = runner.run_test(&name).await?;
        taskboard_e2e::runner::TestSuiteResult {
            total: 1,
            passed: if result.success { 1 } else { 0 },
            failed: if result.success { 0 } else { 1 },
            duration_ms: result.duration_ms,
            results: vec![result],
        }
    } else if let Some(tag) = args.tag {
        runner.run_tagged(&tag).await?
    } else {
        runner.run_all().await?
    };

    if args.update_baselines {
        runner.update_baselines()?;
    }

    runner.write_results(&results)?;

    Ok(results.failed == 0)
}

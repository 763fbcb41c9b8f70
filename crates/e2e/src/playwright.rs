//! Playwright browser automation
//!
//! Steps are translated into one generated Playwright script per scenario and
//! run under `node`; the script reports one JSON line per executed step, which
//! is parsed back into [`StepResult`]s. Playwright itself is an external
//! collaborator; nothing of the browser automation layer is reimplemented
//! here.

use std::path::PathBuf;
use std::process::{Command, Stdio};
use serde::{Deserialize, Serialize};
use tokio::process::Command as TokioCommand;
use tracing::debug;

use crate::error::{E2eError, E2eResult};
use crate::spec::{TestStep, WaitState};

/// Marker prefix for per-step report lines on the script's stdout.
const REPORT_PREFIX: &str = "TBSTEP ";

/// Playwright browser handle
pub struct PlaywrightHandle {
    /// Base URL of the server
    base_url: String,

    /// Directory for screenshots
    screenshot_dir: PathBuf,

    /// Viewport dimensions
    viewport_width: u32,
    viewport_height: u32,

    /// Browser type
    browser: Browser,

    /// Headless mode
    headless: bool,
}

#[derive(Debug, Clone, Copy, Default)]
pub enum Browser {
    #[default]
    Chromium,
    Firefox,
    Webkit,
}

impl Browser {
    fn as_str(&self) -> &'static str {
        match self {
            Browser::Chromium => "chromium",
            Browser::Firefox => "firefox",
            Browser::Webkit => "webkit",
        }
    }
}

/// Result of executing a test step
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StepResult {
    pub success: bool,
    pub step_name: String,
    pub duration_ms: u64,
    pub error: Option<String>,
    pub screenshot_path: Option<PathBuf>,
}

/// One report line emitted by the generated script.
#[derive(Debug, Clone, Deserialize)]
struct ReportLine {
    index: usize,
    name: String,
    ok: bool,
    duration_ms: u64,
    #[serde(default)]
    error: Option<String>,
}

impl PlaywrightHandle {
    /// Create a new Playwright handle
    pub fn new(config: PlaywrightConfig) -> E2eResult<Self> {
        Self::check_installed()?;

        std::fs::create_dir_all(&config.screenshot_dir)?;

        Ok(Self {
            base_url: config.base_url,
            screenshot_dir: config.screenshot_dir,
            viewport_width: config.viewport_width,
            viewport_height: config.viewport_height,
            browser: config.browser,
            headless: config.headless,
        })
    }

    /// Check if Playwright is installed
    pub fn check_installed() -> E2eResult<()> {
        let output = Command::new("npx")
            .args(["playwright", "--version"])
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .status();

        match output {
            Ok(status) if status.success() => Ok(()),
            _ => Err(E2eError::PlaywrightNotFound),
        }
    }

    /// Execute a full scenario in one browser session.
    pub async fn execute_steps(&self, steps: &[TestStep]) -> E2eResult<Vec<StepResult>> {
        let script = self.build_script(steps);

        let temp_dir = tempfile::tempdir()?;
        let script_path = temp_dir.path().join("scenario.js");
        std::fs::write(&script_path, &script)?;

        debug!("Running Playwright scenario: {}", script_path.display());

        let output = TokioCommand::new("node")
            .arg(&script_path)
            .current_dir(temp_dir.path())
            .output()
            .await?;

        let stdout = String::from_utf8_lossy(&output.stdout);
        let reports = parse_report(&stdout)?;

        if reports.is_empty() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(E2eError::Playwright(format!(
                "Scenario produced no step reports:\nstdout: {}\nstderr: {}",
                stdout, stderr
            )));
        }

        let mut results = Vec::with_capacity(reports.len());
        for report in reports {
            let screenshot_path = match (report.ok, steps.get(report.index)) {
                (true, Some(TestStep::Screenshot { name, .. })) => {
                    Some(self.screenshot_dir.join(format!("{}.png", name)))
                }
                _ => None,
            };
            results.push(StepResult {
                success: report.ok,
                step_name: report.name,
                duration_ms: report.duration_ms,
                error: report.error,
                screenshot_path,
            });
        }

        Ok(results)
    }

    /// Build the Playwright script for a scenario.
    pub fn build_script(&self, steps: &[TestStep]) -> String {
        let mut script = String::new();

        script.push_str(&format!(
            r#"const {{ chromium, firefox, webkit }} = require('playwright');

const report = (entry) => console.log('{prefix}' + JSON.stringify(entry));

async function assertVisible(page, selector) {{
  if (!(await page.locator(selector).first().isVisible())) {{
    throw new Error('expected visible: ' + selector);
  }}
}}

async function assertHidden(page, selector) {{
  if (await page.locator(selector).first().isVisible()) {{
    throw new Error('expected hidden: ' + selector);
  }}
}}

async function assertText(page, selector, expected) {{
  const actual = (await page.locator(selector).first().innerText()).trim();
  if (actual !== expected) {{
    throw new Error('expected text ' + JSON.stringify(expected) + ' in ' + selector + ', got ' + JSON.stringify(actual));
  }}
}}

async function assertTextContains(page, selector, expected) {{
  const actual = await page.locator(selector).first().innerText();
  if (!actual.includes(expected)) {{
    throw new Error('expected ' + selector + ' to contain ' + JSON.stringify(expected) + ', got ' + JSON.stringify(actual));
  }}
}}

async function assertCount(page, selector, expected) {{
  const actual = await page.locator(selector).count();
  if (actual !== expected) {{
    throw new Error('expected ' + expected + ' matches for ' + selector + ', got ' + actual);
  }}
}}

(async () => {{
  const browser = await {browser}.launch({{ headless: {headless} }});
  const context = await browser.newContext({{
    viewport: {{ width: {width}, height: {height} }}
  }});
  const page = await context.newPage();
  const baseUrl = {base_url};

  const steps = [
"#,
            prefix = REPORT_PREFIX,
            browser = self.browser.as_str(),
            headless = self.headless,
            width = self.viewport_width,
            height = self.viewport_height,
            base_url = js_str(&self.base_url),
        ));

        for step in steps {
            script.push_str(&format!(
                "    [{name}, async () => {{\n{body}\n    }}],\n",
                name = js_str(&step.name()),
                body = self.step_to_js(step),
            ));
        }

        script.push_str(
            r#"  ];

  let failed = false;
  for (let i = 0; i < steps.length; i++) {
    const [name, fn] = steps[i];
    const started = Date.now();
    try {
      await fn();
      report({ index: i, name, ok: true, duration_ms: Date.now() - started });
    } catch (error) {
      report({ index: i, name, ok: false, duration_ms: Date.now() - started, error: error.message });
      failed = true;
      break;
    }
  }

  await browser.close();
  process.exit(failed ? 1 : 0);
})();
"#,
        );

        script
    }

    /// Convert a step to the body of its scenario entry.
    fn step_to_js(&self, step: &TestStep) -> String {
        match step {
            TestStep::Navigate {
                url,
                wait_for_selector,
            } => {
                let mut body = format!("      await page.goto(baseUrl + {});", js_str(url));
                if let Some(selector) = wait_for_selector {
                    body.push_str(&format!(
                        "\n      await page.waitForSelector({});",
                        js_str(selector)
                    ));
                }
                body
            }
            TestStep::Click {
                selector,
                timeout_ms,
            } => {
                let timeout = timeout_ms.unwrap_or(5000);
                format!(
                    "      await page.click({}, {{ timeout: {} }});",
                    js_str(selector),
                    timeout
                )
            }
            TestStep::Fill { selector, value } => {
                format!(
                    "      await page.fill({}, {});",
                    js_str(selector),
                    js_str(value)
                )
            }
            TestStep::Press { selector, key } => match selector {
                Some(selector) => format!(
                    "      await page.locator({}).press({});",
                    js_str(selector),
                    js_str(key)
                ),
                None => format!("      await page.keyboard.press({});", js_str(key)),
            },
            TestStep::Select { selector, value } => {
                format!(
                    "      await page.selectOption({}, {});",
                    js_str(selector),
                    js_str(value)
                )
            }
            TestStep::Wait {
                selector,
                timeout_ms,
                state,
            } => {
                let state = match state {
                    WaitState::Visible => "visible",
                    WaitState::Hidden => "hidden",
                    WaitState::Attached => "attached",
                    WaitState::Detached => "detached",
                };
                format!(
                    "      await page.waitForSelector({}, {{ state: '{}', timeout: {} }});",
                    js_str(selector),
                    state,
                    timeout_ms
                )
            }
            TestStep::Sleep { ms } => format!("      await page.waitForTimeout({});", ms),
            TestStep::Assert {
                selector,
                visible,
                text,
                text_contains,
                count,
            } => {
                let mut assertions = Vec::new();
                if let Some(visible) = visible {
                    let helper = if *visible { "assertVisible" } else { "assertHidden" };
                    assertions.push(format!("      await {}(page, {});", helper, js_str(selector)));
                }
                if let Some(text) = text {
                    assertions.push(format!(
                        "      await assertText(page, {}, {});",
                        js_str(selector),
                        js_str(text)
                    ));
                }
                if let Some(text) = text_contains {
                    assertions.push(format!(
                        "      await assertTextContains(page, {}, {});",
                        js_str(selector),
                        js_str(text)
                    ));
                }
                if let Some(count) = count {
                    assertions.push(format!(
                        "      await assertCount(page, {}, {});",
                        js_str(selector),
                        count
                    ));
                }
                assertions.join("\n")
            }
            TestStep::Screenshot {
                name,
                selector,
                full_page,
            } => {
                let path = self.screenshot_dir.join(format!("{}.png", name));
                let path = js_str(&path.to_string_lossy());
                match selector {
                    Some(selector) => format!(
                        "      await page.locator({}).screenshot({{ path: {} }});",
                        js_str(selector),
                        path
                    ),
                    None => format!(
                        "      await page.screenshot({{ path: {}, fullPage: {} }});",
                        path, full_page
                    ),
                }
            }
        }
    }
}

/// Quote a Rust string as a JS string literal.
fn js_str(s: &str) -> String {
    serde_json::to_string(s).unwrap_or_else(|_| "\"\"".to_string())
}

/// Parse the per-step report lines from a scenario's stdout.
fn parse_report(stdout: &str) -> E2eResult<Vec<ReportLine>> {
    let mut reports = Vec::new();
    for line in stdout.lines() {
        if let Some(json) = line.strip_prefix(REPORT_PREFIX) {
            reports.push(serde_json::from_str(json)?);
        }
    }
    Ok(reports)
}

/// Configuration for Playwright
#[derive(Debug, Clone)]
pub struct PlaywrightConfig {
    pub base_url: String,
    pub screenshot_dir: PathBuf,
    pub viewport_width: u32,
    pub viewport_height: u32,
    pub browser: Browser,
    pub headless: bool,
}

impl Default for PlaywrightConfig {
    fn default() -> Self {
        Self {
            base_url: "http://127.0.0.1:3000".to_string(),
            screenshot_dir: PathBuf::from("test-results/screenshots"),
            viewport_width: 1280,
            viewport_height: 720,
            browser: Browser::Chromium,
            headless: true,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pages::{LoginPage, TaskBoardPage};

    fn handle() -> PlaywrightHandle {
        // Bypasses the npx probe: script generation needs no Playwright.
        PlaywrightHandle {
            base_url: "http://127.0.0.1:3000".to_string(),
            screenshot_dir: PathBuf::from("test-results/screenshots"),
            viewport_width: 1280,
            viewport_height: 720,
            browser: Browser::Chromium,
            headless: true,
        }
    }

    #[test]
    fn script_wraps_steps_with_reporting_harness() {
        let mut steps = LoginPage::open();
        steps.extend(LoginPage::login("admin@test.com", "admin123"));

        let script = handle().build_script(&steps);
        assert!(script.contains("require('playwright')"));
        assert!(script.contains("const baseUrl = \"http://127.0.0.1:3000\";"));
        assert!(script.contains("page.goto(baseUrl + \"/\")"));
        assert!(script.contains("page.fill(\"[data-testid=\\\"login-email\\\"]\", \"admin@test.com\")"));
        assert!(script.contains("process.exit(failed ? 1 : 0);"));
    }

    #[test]
    fn assert_steps_use_the_helper_functions() {
        let steps = vec![TaskBoardPage::expect_task_count(3)];
        let script = handle().build_script(&steps);
        assert!(script.contains("await assertCount(page, \"[data-testid=\\\"task-list\\\"] li\", 3);"));
    }

    #[test]
    fn js_str_escapes_quotes() {
        assert_eq!(js_str("a\"b"), "\"a\\\"b\"");
    }

    #[test]
    fn report_lines_round_trip() {
        let stdout = "noise\nTBSTEP {\"index\":0,\"name\":\"navigate:/\",\"ok\":true,\"duration_ms\":12}\nTBSTEP {\"index\":1,\"name\":\"click:x\",\"ok\":false,\"duration_ms\":3,\"error\":\"boom\"}\n";
        let reports = parse_report(stdout).unwrap();
        assert_eq!(reports.len(), 2);
        assert!(reports[0].ok);
        assert_eq!(reports[1].error.as_deref(), Some("boom"));
    }
}

//! Declarative YAML test specification

use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::error::{E2eError, E2eResult};

/// A complete test specification parsed from YAML
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TestSpec {
    /// Unique name for this test
    pub name: String,

    /// Human-readable description
    #[serde(default)]
    pub description: String,

    /// Tags for filtering tests
    #[serde(default)]
    pub tags: Vec<String>,

    /// Viewport size for the browser
    #[serde(default = "default_viewport")]
    pub viewport: Viewport,

    /// Steps to execute in order
    pub steps: Vec<TestStep>,

    /// Whether this test includes visual regression
    #[serde(default)]
    pub visual_regression: bool,

    /// Threshold for visual diff (0.0 - 100.0 percent)
    #[serde(default = "default_threshold")]
    pub visual_threshold: f64,
}

fn default_viewport() -> Viewport {
    Viewport {
        width: 1280,
        height: 720,
    }
}

fn default_threshold() -> f64 {
    0.5 // 0.5% pixel difference allowed by default
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Viewport {
    pub width: u32,
    pub height: u32,
}

/// A single step in a test
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum TestStep {
    /// Navigate to a URL (relative to base)
    Navigate {
        url: String,
        #[serde(default)]
        wait_for_selector: Option<String>,
    },

    /// Click an element
    Click {
        selector: String,
        #[serde(default)]
        timeout_ms: Option<u64>,
    },

    /// Fill an input field
    Fill { selector: String, value: String },

    /// Press a key, optionally scoped to an element
    Press {
        #[serde(default)]
        selector: Option<String>,
        key: String,
    },

    /// Select an option from a dropdown
    Select { selector: String, value: String },

    /// Wait for an element to reach a state
    Wait {
        selector: String,
        #[serde(default = "default_wait_timeout")]
        timeout_ms: u64,
        #[serde(default)]
        state: WaitState,
    },

    /// Wait for a fixed amount of time (use sparingly)
    Sleep { ms: u64 },

    /// Assert something about an element
    Assert {
        selector: String,
        #[serde(default)]
        visible: Option<bool>,
        #[serde(default)]
        text: Option<String>,
        #[serde(default)]
        text_contains: Option<String>,
        #[serde(default)]
        count: Option<usize>,
    },

    /// Take a screenshot
    Screenshot {
        name: String,
        #[serde(default)]
        selector: Option<String>,
        #[serde(default)]
        full_page: bool,
    },
}

fn default_wait_timeout() -> u64 {
    5000 // 5 seconds default
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WaitState {
    #[default]
    Visible,
    Hidden,
    Attached,
    Detached,
}

impl TestStep {
    /// Short display name used in step results and logs.
    pub fn name(&self) -> String {
        match self {
            TestStep::Navigate { url, .. } => format!("navigate:{}", url),
            TestStep::Click { selector, .. } => format!("click:{}", selector),
            TestStep::Fill { selector, .. } => format!("fill:{}", selector),
            TestStep::Press { key, .. } => format!("press:{}", key),
            TestStep::Select { selector, .. } => format!("select:{}", selector),
            TestStep::Wait { selector, .. } => format!("wait:{}", selector),
            TestStep::Sleep { ms } => format!("sleep:{}ms", ms),
            TestStep::Assert { selector, .. } => format!("assert:{}", selector),
            TestStep::Screenshot { name, .. } => format!("screenshot:{}", name),
        }
    }
}

impl TestSpec {
    /// Parse a test spec from YAML string
    pub fn from_yaml(yaml: &str) -> E2eResult<Self> {
        serde_yaml::from_str(yaml).map_err(E2eError::from)
    }

    /// Parse a test spec from a YAML file
    pub fn from_file(path: &Path) -> E2eResult<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_yaml(&content)
    }

    /// Load all test specs from a directory
    pub fn load_all(dir: &Path) -> E2eResult<Vec<Self>> {
        let mut specs = Vec::new();

        for entry in walkdir::WalkDir::new(dir)
            .into_iter()
            .filter_map(|e| e.ok())
            .filter(|e| {
                e.path()
                    .extension()
                    .map(|ext| ext == "yaml" || ext == "yml")
                    .unwrap_or(false)
            })
        {
            let spec = Self::from_file(entry.path())?;
            specs.push(spec);
        }

        // Deterministic order regardless of directory iteration
        specs.sort_by(|a, b| a.name.cmp(&b.name));

        Ok(specs)
    }

    /// Filter specs by tag
    pub fn filter_by_tag<'a>(specs: &'a [Self], tag: &str) -> Vec<&'a Self> {
        specs
            .iter()
            .filter(|s| s.tags.iter().any(|t| t == tag))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_login_spec() {
        let yaml = r#"
name: login-flow
description: Log in with the seeded admin account
tags:
  - auth
  - smoke
steps:
  - action: navigate
    url: /
    wait_for_selector: '[data-testid="login-view"]'
  - action: fill
    selector: '[data-testid="login-email"]'
    value: admin@test.com
  - action: fill
    selector: '[data-testid="login-password"]'
    value: admin123
  - action: click
    selector: '[data-testid="login-submit"]'
  - action: wait
    selector: '[data-testid="board-view"]'
"#;
        let spec = TestSpec::from_yaml(yaml).unwrap();
        assert_eq!(spec.name, "login-flow");
        assert_eq!(spec.steps.len(), 5);
        assert_eq!(spec.tags, vec!["auth", "smoke"]);
        assert!(!spec.visual_regression);
    }

    #[test]
    fn test_parse_visual_regression_spec() {
        let yaml = r#"
name: board-visual
description: Visual regression for the task board
visual_regression: true
visual_threshold: 1.0
viewport:
  width: 1920
  height: 1080
steps:
  - action: navigate
    url: /
  - action: screenshot
    name: board-full
    full_page: true
"#;
        let spec = TestSpec::from_yaml(yaml).unwrap();
        assert!(spec.visual_regression);
        assert_eq!(spec.visual_threshold, 1.0);
        assert_eq!(spec.viewport.width, 1920);
    }

    #[test]
    fn step_names_identify_the_target() {
        let step = TestStep::Click {
            selector: "[data-testid=\"add-task-button\"]".to_string(),
            timeout_ms: None,
        };
        assert_eq!(step.name(), "click:[data-testid=\"add-task-button\"]");

        let step = TestStep::Sleep { ms: 250 };
        assert_eq!(step.name(), "sleep:250ms");
    }

    #[test]
    fn filter_by_tag_matches_exactly() {
        let yaml = r#"
name: tagged
tags: [smoke]
steps:
  - action: sleep
    ms: 1
"#;
        let specs = vec![TestSpec::from_yaml(yaml).unwrap()];
        assert_eq!(TestSpec::filter_by_tag(&specs, "smoke").len(), 1);
        assert_eq!(TestSpec::filter_by_tag(&specs, "smok").len(), 0);
    }
}

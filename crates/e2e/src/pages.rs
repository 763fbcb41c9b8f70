//! Page objects for the Taskboard SPA.
//!
//! Each page owns its selectors and composes the multi-step flows the
//! scenarios reuse. Selectors key on the `data-testid` hooks the bundle
//! renders, so UI styling changes do not break the suite.

use crate::spec::{TestStep, WaitState};

fn testid(id: &str) -> String {
    format!("[data-testid=\"{id}\"]")
}

/// The login / registration card.
pub struct LoginPage;

impl LoginPage {
    pub const ROOT: &'static str = "[data-testid=\"login-view\"]";
    pub const EMAIL: &'static str = "[data-testid=\"login-email\"]";
    pub const PASSWORD: &'static str = "[data-testid=\"login-password\"]";
    pub const SUBMIT: &'static str = "[data-testid=\"login-submit\"]";
    pub const ERROR: &'static str = "[data-testid=\"login-error\"]";
    pub const SHOW_REGISTER: &'static str = "[data-testid=\"show-register\"]";

    /// Open the app and wait for the login card.
    pub fn open() -> Vec<TestStep> {
        vec![TestStep::Navigate {
            url: "/".to_string(),
            wait_for_selector: Some(Self::ROOT.to_string()),
        }]
    }

    /// Fill credentials and submit, waiting for the board to appear.
    pub fn login(email: &str, password: &str) -> Vec<TestStep> {
        vec![
            TestStep::Fill {
                selector: Self::EMAIL.to_string(),
                value: email.to_string(),
            },
            TestStep::Fill {
                selector: Self::PASSWORD.to_string(),
                value: password.to_string(),
            },
            TestStep::Click {
                selector: Self::SUBMIT.to_string(),
                timeout_ms: None,
            },
            TestStep::Wait {
                selector: TaskBoardPage::ROOT.to_string(),
                timeout_ms: 5000,
                state: WaitState::Visible,
            },
        ]
    }

    /// Submit credentials that should be rejected and assert the error line.
    pub fn login_expecting_error(email: &str, password: &str, message: &str) -> Vec<TestStep> {
        vec![
            TestStep::Fill {
                selector: Self::EMAIL.to_string(),
                value: email.to_string(),
            },
            TestStep::Fill {
                selector: Self::PASSWORD.to_string(),
                value: password.to_string(),
            },
            TestStep::Click {
                selector: Self::SUBMIT.to_string(),
                timeout_ms: None,
            },
            TestStep::Assert {
                selector: Self::ERROR.to_string(),
                visible: Some(true),
                text: None,
                text_contains: Some(message.to_string()),
                count: None,
            },
        ]
    }
}

/// The task board behind login.
pub struct TaskBoardPage;

impl TaskBoardPage {
    pub const ROOT: &'static str = "[data-testid=\"board-view\"]";
    pub const TASK_LIST: &'static str = "[data-testid=\"task-list\"]";
    pub const TASK_ROWS: &'static str = "[data-testid=\"task-list\"] li";
    pub const NEW_TASK_INPUT: &'static str = "[data-testid=\"new-task-input\"]";
    pub const PRIORITY_SELECT: &'static str = "[data-testid=\"new-task-priority\"]";
    pub const ADD_BUTTON: &'static str = "[data-testid=\"add-task-button\"]";
    pub const SEARCH_INPUT: &'static str = "[data-testid=\"search-input\"]";
    pub const LOGOUT_BUTTON: &'static str = "[data-testid=\"logout-button\"]";
    pub const USER_NAME: &'static str = "[data-testid=\"user-name\"]";
    pub const EMPTY_STATE: &'static str = "[data-testid=\"empty-state\"]";

    /// Selector for one task row by id.
    pub fn task_row(id: i64) -> String {
        testid(&format!("task-{id}"))
    }

    /// Selector for a task's completion checkbox.
    pub fn task_toggle(id: i64) -> String {
        testid(&format!("task-toggle-{id}"))
    }

    /// Selector for a task's title span.
    pub fn task_title(id: i64) -> String {
        testid(&format!("task-title-{id}"))
    }

    /// Selector for a task's delete button.
    pub fn task_delete(id: i64) -> String {
        testid(&format!("task-delete-{id}"))
    }

    /// Type a title, pick a priority, and add the task.
    pub fn add_task(title: &str, priority: &str) -> Vec<TestStep> {
        vec![
            TestStep::Fill {
                selector: Self::NEW_TASK_INPUT.to_string(),
                value: title.to_string(),
            },
            TestStep::Select {
                selector: Self::PRIORITY_SELECT.to_string(),
                value: priority.to_string(),
            },
            TestStep::Click {
                selector: Self::ADD_BUTTON.to_string(),
                timeout_ms: None,
            },
        ]
    }

    /// Filter the board through the live search box.
    pub fn search(query: &str) -> Vec<TestStep> {
        vec![TestStep::Fill {
            selector: Self::SEARCH_INPUT.to_string(),
            value: query.to_string(),
        }]
    }

    /// Toggle a task's completion checkbox.
    pub fn toggle(id: i64) -> Vec<TestStep> {
        vec![TestStep::Click {
            selector: Self::task_toggle(id),
            timeout_ms: None,
        }]
    }

    /// Delete a task and wait for its row to disappear.
    pub fn delete(id: i64) -> Vec<TestStep> {
        vec![
            TestStep::Click {
                selector: Self::task_delete(id),
                timeout_ms: None,
            },
            TestStep::Wait {
                selector: Self::task_row(id),
                timeout_ms: 5000,
                state: WaitState::Detached,
            },
        ]
    }

    /// Assert the number of rendered task rows.
    pub fn expect_task_count(count: usize) -> TestStep {
        TestStep::Assert {
            selector: Self::TASK_ROWS.to_string(),
            visible: None,
            text: None,
            text_contains: None,
            count: Some(count),
        }
    }

    /// Assert that the list mentions a title.
    pub fn expect_task_titled(title: &str) -> TestStep {
        TestStep::Assert {
            selector: Self::TASK_LIST.to_string(),
            visible: None,
            text: None,
            text_contains: Some(title.to_string()),
            count: None,
        }
    }

    /// Log out and wait for the login card to come back.
    pub fn logout() -> Vec<TestStep> {
        vec![
            TestStep::Click {
                selector: Self::LOGOUT_BUTTON.to_string(),
                timeout_ms: None,
            },
            TestStep::Wait {
                selector: LoginPage::ROOT.to_string(),
                timeout_ms: 5000,
                state: WaitState::Visible,
            },
        ]
    }
}

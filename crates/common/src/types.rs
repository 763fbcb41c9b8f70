//! Core records for the task and user stores.

use serde::{Deserialize, Serialize};

/// Priority assigned to a task when the client does not supply one.
///
/// Priorities are free text on the wire; `high`/`medium`/`low` is a UI
/// convention, not a server-side enum.
pub const DEFAULT_PRIORITY: &str = "medium";

/// A unit of work tracked by the demo application.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Task {
    pub id: i64,
    pub title: String,
    pub completed: bool,
    pub priority: String,
}

/// Partial task update: a shallow, field-by-field merge over an existing
/// record. Every field is optional, including `id`: a supplied `id` is
/// merged like any other field.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TaskPatch {
    #[serde(default)]
    pub id: Option<i64>,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub completed: Option<bool>,
    #[serde(default)]
    pub priority: Option<String>,
}

impl Task {
    /// Apply a shallow merge of the supplied fields over this record.
    pub fn apply(&mut self, patch: TaskPatch) {
        if let Some(id) = patch.id {
            self.id = id;
        }
        if let Some(title) = patch.title {
            self.title = title;
        }
        if let Some(completed) = patch.completed {
            self.completed = completed;
        }
        if let Some(priority) = patch.priority {
            self.priority = priority;
        }
    }
}

/// A registered account.
///
/// Passwords are stored and compared in plaintext; this is a demo fixture,
/// not a credential store. The full record never leaves the server; clients
/// only ever see a [`PublicUser`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub id: i64,
    pub email: String,
    pub password: String,
    pub name: String,
}

/// The subset of a user record returned to clients.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PublicUser {
    pub id: i64,
    pub email: String,
    pub name: String,
}

impl From<&User> for PublicUser {
    fn from(user: &User) -> Self {
        Self {
            id: user.id,
            email: user.email.clone(),
            name: user.name.clone(),
        }
    }
}

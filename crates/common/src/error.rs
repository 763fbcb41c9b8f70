//! Error taxonomy for the Taskboard API.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use thiserror::Error;

/// Result type alias using the Taskboard Error
pub type Result<T> = std::result::Result<T, Error>;

/// Taskboard error taxonomy
///
/// Every variant surfaces synchronously as an HTTP status with a JSON
/// `{"error": message}` body. None are retried and none are fatal to the
/// process.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum Error {
    /// A required field was missing or empty.
    #[error("{0}")]
    Validation(String),

    /// Credential mismatch on login.
    #[error("invalid email or password")]
    Unauthorized,

    /// No record with the given id. Malformed ids degrade to this outcome
    /// rather than a distinct bad-request signal.
    #[error("{kind} {id} not found")]
    NotFound { kind: String, id: String },

    /// A unique key is already taken.
    #[error("{kind} {key} already exists")]
    AlreadyExists { kind: String, key: String },
}

impl Error {
    pub fn not_found(kind: &str, id: impl ToString) -> Self {
        Self::NotFound {
            kind: kind.to_string(),
            id: id.to_string(),
        }
    }

    pub fn already_exists(kind: &str, key: impl ToString) -> Self {
        Self::AlreadyExists {
            kind: kind.to_string(),
            key: key.to_string(),
        }
    }

    /// HTTP status this error surfaces as.
    pub fn status(&self) -> StatusCode {
        match self {
            Error::Validation(_) => StatusCode::BAD_REQUEST,
            Error::Unauthorized => StatusCode::UNAUTHORIZED,
            Error::NotFound { .. } => StatusCode::NOT_FOUND,
            Error::AlreadyExists { .. } => StatusCode::CONFLICT,
        }
    }
}

impl IntoResponse for Error {
    fn into_response(self) -> Response {
        (
            self.status(),
            Json(serde_json::json!({"error": self.to_string()})),
        )
            .into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn statuses_follow_the_taxonomy() {
        assert_eq!(
            Error::Validation("title is required".into()).status(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(Error::Unauthorized.status(), StatusCode::UNAUTHORIZED);
        assert_eq!(Error::not_found("task", 4).status(), StatusCode::NOT_FOUND);
        assert_eq!(
            Error::already_exists("user", "admin@test.com").status(),
            StatusCode::CONFLICT
        );
    }

    #[test]
    fn messages_name_the_record() {
        assert_eq!(Error::not_found("task", 4).to_string(), "task 4 not found");
        assert_eq!(
            Error::already_exists("user", "admin@test.com").to_string(),
            "user admin@test.com already exists"
        );
    }
}

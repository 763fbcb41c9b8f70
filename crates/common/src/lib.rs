//! Taskboard Common Library
//!
//! Shared types and error taxonomy for the Taskboard demo platform.

pub mod error;
pub mod types;

pub use error::{Error, Result};
pub use types::{PublicUser, Task, TaskPatch, User, DEFAULT_PRIORITY};

/// Taskboard version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

//! Taskboard Web
//!
//! The demo's HTTP surface: an in-memory task CRUD API, a user/auth API, and
//! the embedded single-page UI that consumes both.

pub mod server;
pub mod static_files;
pub mod store;

pub use server::{serve, WebServer, WebServerConfig};
pub use store::{TaskStore, UserStore};

//! Web server implementation
//!
//! Router construction and the request handlers behind the HTTP surface.
//! Stores are injected at construction time and shared behind the router
//! state; there are no module-level globals.

use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use tokio::sync::RwLock;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::info;

use taskboard_common::{Error, PublicUser, TaskPatch};

use crate::static_files::StaticAssets;
use crate::store::{TaskStore, UserStore};

/// Web server configuration
#[derive(Clone, Debug, Default)]
pub struct WebServerConfig {
    /// Optional on-disk SPA bundle directory. The embedded bundle is served
    /// when unset.
    pub static_dir: Option<PathBuf>,
}

/// Web server state
#[derive(Clone)]
pub struct WebServer {
    state: Arc<AppState>,
}

struct AppState {
    /// Task records, insertion order preserved
    tasks: RwLock<TaskStore>,
    /// User accounts, append-only
    users: RwLock<UserStore>,
    /// SPA bundle handler
    assets: StaticAssets,
}

pub async fn serve(addr: SocketAddr, cfg: WebServerConfig) -> anyhow::Result<()> {
    let server = WebServer::new(cfg);
    server.serve(addr).await
}

impl WebServer {
    /// Create a server over freshly seeded stores.
    pub fn new(cfg: WebServerConfig) -> Self {
        Self::with_stores(cfg, TaskStore::seeded(), UserStore::seeded())
    }

    /// Create a server over caller-supplied stores. Tests use this to run
    /// against isolated fixtures.
    pub fn with_stores(cfg: WebServerConfig, tasks: TaskStore, users: UserStore) -> Self {
        Self {
            state: Arc::new(AppState {
                tasks: RwLock::new(tasks),
                users: RwLock::new(users),
                assets: StaticAssets::new(cfg.static_dir),
            }),
        }
    }

    /// Create router
    pub fn router(&self) -> Router {
        Router::new()
            // Auth
            .route("/api/login", post(login_handler))
            .route("/api/register", post(register_handler))
            // Task CRUD
            .route(
                "/api/tasks",
                get(list_tasks_handler).post(create_task_handler),
            )
            .route(
                "/api/tasks/:task_id",
                get(get_task_handler)
                    .put(update_task_handler)
                    .delete(delete_task_handler),
            )
            .route("/api/search", get(search_tasks_handler))
            // Public health check
            .route("/api/health", get(health_handler))
            // SPA bundle assets
            .route("/assets/*path", get(asset_handler))
            // Everything else is a client-side route: hand back the SPA
            // entry document so full-page reloads keep working.
            .fallback(spa_fallback_handler)
            .layer(
                CorsLayer::new()
                    .allow_origin(Any)
                    .allow_methods(Any)
                    .allow_headers(Any),
            )
            .layer(TraceLayer::new_for_http())
            .with_state(self.state.clone())
    }

    /// Start the web server
    pub async fn serve(self, addr: SocketAddr) -> anyhow::Result<()> {
        info!("Task API listening on http://{}", addr);

        let listener = tokio::net::TcpListener::bind(addr).await?;
        axum::serve(listener, self.router()).await?;

        Ok(())
    }
}

impl Default for WebServer {
    fn default() -> Self {
        Self::new(WebServerConfig::default())
    }
}

// ============================================================================
// Request/response bodies
// ============================================================================

// Required fields are modeled as `Option` so a missing field surfaces as the
// API's own validation failure instead of a framework rejection.

#[derive(Debug, Clone, Deserialize)]
struct LoginRequest {
    #[serde(default)]
    email: Option<String>,
    #[serde(default)]
    password: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
struct LoginResponse {
    success: bool,
    user: PublicUser,
    token: String,
}

#[derive(Debug, Clone, Deserialize)]
struct RegisterRequest {
    #[serde(default)]
    email: Option<String>,
    #[serde(default)]
    password: Option<String>,
    #[serde(default)]
    name: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
struct RegisterResponse {
    success: bool,
    user: PublicUser,
}

#[derive(Debug, Clone, Deserialize)]
struct CreateTaskRequest {
    #[serde(default)]
    title: Option<String>,
    #[serde(default)]
    priority: Option<String>,
}

#[derive(Debug, Deserialize)]
struct SearchParams {
    #[serde(default)]
    q: Option<String>,
}

/// Opaque placeholder token derived from the user id.
///
/// No endpoint ever verifies it; the demo issues tokens but has no session
/// layer on the server.
fn mock_token(user_id: i64) -> String {
    format!("mock-token-{user_id}")
}

// ============================================================================
// Handlers
// ============================================================================

async fn health_handler() -> impl IntoResponse {
    Json(serde_json::json!({
        "status": "ok",
        "timestamp": Utc::now().to_rfc3339(),
    }))
}

async fn login_handler(
    State(state): State<Arc<AppState>>,
    Json(req): Json<LoginRequest>,
) -> Response {
    let email = req.email.unwrap_or_default();
    let password = req.password.unwrap_or_default();
    if email.is_empty() || password.is_empty() {
        return Error::Validation("email and password are required".to_string()).into_response();
    }

    let users = state.users.read().await;
    match users.authenticate(&email, &password) {
        Ok(user) => Json(LoginResponse {
            success: true,
            user: PublicUser::from(user),
            token: mock_token(user.id),
        })
        .into_response(),
        Err(e) => e.into_response(),
    }
}

async fn register_handler(
    State(state): State<Arc<AppState>>,
    Json(req): Json<RegisterRequest>,
) -> Response {
    let email = req.email.unwrap_or_default();
    let password = req.password.unwrap_or_default();
    let name = req.name.unwrap_or_default();
    if email.is_empty() || password.is_empty() || name.is_empty() {
        return Error::Validation("email, password and name are required".to_string())
            .into_response();
    }

    let mut users = state.users.write().await;
    match users.register(email, password, name) {
        Ok(user) => (
            StatusCode::CREATED,
            Json(RegisterResponse {
                success: true,
                user: PublicUser::from(&user),
            }),
        )
            .into_response(),
        Err(e) => e.into_response(),
    }
}

async fn list_tasks_handler(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    let tasks = state.tasks.read().await;
    Json(tasks.list().to_vec())
}

async fn get_task_handler(
    State(state): State<Arc<AppState>>,
    Path(task_id): Path<String>,
) -> Response {
    let Some(id) = parse_task_id(&task_id) else {
        return Error::not_found("task", &task_id).into_response();
    };

    let tasks = state.tasks.read().await;
    match tasks.get(id) {
        Ok(task) => Json(task.clone()).into_response(),
        Err(e) => e.into_response(),
    }
}

async fn create_task_handler(
    State(state): State<Arc<AppState>>,
    Json(req): Json<CreateTaskRequest>,
) -> Response {
    let title = req.title.unwrap_or_default();
    if title.is_empty() {
        return Error::Validation("title is required".to_string()).into_response();
    }

    let mut tasks = state.tasks.write().await;
    let task = tasks.create(title, req.priority);
    (StatusCode::CREATED, Json(task)).into_response()
}

async fn update_task_handler(
    State(state): State<Arc<AppState>>,
    Path(task_id): Path<String>,
    Json(patch): Json<TaskPatch>,
) -> Response {
    let Some(id) = parse_task_id(&task_id) else {
        return Error::not_found("task", &task_id).into_response();
    };

    let mut tasks = state.tasks.write().await;
    match tasks.update(id, patch) {
        Ok(task) => Json(task).into_response(),
        Err(e) => e.into_response(),
    }
}

async fn delete_task_handler(
    State(state): State<Arc<AppState>>,
    Path(task_id): Path<String>,
) -> Response {
    let Some(id) = parse_task_id(&task_id) else {
        return Error::not_found("task", &task_id).into_response();
    };

    let mut tasks = state.tasks.write().await;
    match tasks.delete(id) {
        Ok(()) => StatusCode::NO_CONTENT.into_response(),
        Err(e) => e.into_response(),
    }
}

async fn search_tasks_handler(
    State(state): State<Arc<AppState>>,
    Query(params): Query<SearchParams>,
) -> impl IntoResponse {
    let tasks = state.tasks.read().await;
    Json(tasks.search(params.q.as_deref().unwrap_or("")))
}

async fn asset_handler(
    State(state): State<Arc<AppState>>,
    Path(path): Path<String>,
) -> Response {
    let res = state.assets.serve(&path).await;
    if res.status() != StatusCode::NOT_FOUND {
        return res;
    }
    // SPA fallback: unknown assets map to the entry document
    state.assets.index().await
}

async fn spa_fallback_handler(State(state): State<Arc<AppState>>) -> Response {
    state.assets.index().await
}

/// A non-numeric id segment behaves like an id that matches nothing, not a
/// distinct bad-request outcome.
fn parse_task_id(segment: &str) -> Option<i64> {
    segment.parse().ok()
}

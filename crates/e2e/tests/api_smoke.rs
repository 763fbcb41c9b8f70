//! API smoke tests
//!
//! Spawns the real server binary and drives the HTTP surface through the
//! ApiClient helper, covering the seeded-fixture scenario end to end. Tests
//! skip when the binary has not been built yet.

use serde_json::json;

use taskboard_e2e::api::ApiClient;
use taskboard_e2e::error::E2eError;
use taskboard_e2e::server::{ServerConfig, ServerHandle};

/// Spawn an isolated server, or skip the test when the binary is absent.
async fn spawn_server() -> Option<ServerHandle> {
    let config = ServerConfig::default();
    if !config.binary_path.exists() {
        eprintln!(
            "skipping: {} not built (run: cargo build -p taskboard-web)",
            config.binary_path.display()
        );
        return None;
    }
    Some(
        ServerHandle::spawn(config)
            .await
            .expect("server should start"),
    )
}

#[tokio::test]
async fn health_endpoint_reports_ok() {
    let Some(server) = spawn_server().await else {
        return;
    };
    let api = ApiClient::new(server.base_url());

    let health = api.health().await.unwrap();
    assert_eq!(health["status"], "ok");
    assert!(health["timestamp"].is_string());
}

#[tokio::test]
async fn seeded_crud_and_search_flow() {
    let Some(server) = spawn_server().await else {
        return;
    };
    let api = ApiClient::new(server.base_url());

    // Seed fixture, insertion order preserved
    let tasks = api.tasks().await.unwrap();
    assert_eq!(tasks.len(), 3);
    assert_eq!(tasks[0].title, "Learn Playwright");
    assert!(tasks[2].completed);

    // Case-insensitive substring search
    let hits = api.search("playwright").await.unwrap();
    assert_eq!(hits.len(), 1);
    assert_eq!(hits[0].id, 1);

    // Empty query matches nothing
    assert!(api.search("").await.unwrap().is_empty());

    // Create defaults priority and completed
    let created = api.create_task("X", None).await.unwrap();
    assert_eq!(created.id, 4);
    assert!(!created.completed);
    assert_eq!(created.priority, "medium");

    // Partial update merges the supplied field only
    let updated = api.update_task(1, json!({"completed": true})).await.unwrap();
    assert!(updated.completed);
    assert_eq!(updated.title, "Learn Playwright");
    assert_eq!(updated.priority, "high");

    // Delete, then the id is gone
    api.delete_task(4).await.unwrap();
    match api.task(4).await {
        Err(E2eError::Api { status: 404, .. }) => {}
        other => panic!("expected 404 after delete, got {:?}", other.map(|t| t.id)),
    }
}

#[tokio::test]
async fn create_without_title_is_rejected_and_store_unchanged() {
    let Some(server) = spawn_server().await else {
        return;
    };
    let api = ApiClient::new(server.base_url());

    match api.create_task("", None).await {
        Err(E2eError::Api { status: 400, body }) => {
            assert!(body.contains("title"));
        }
        other => panic!("expected 400, got {:?}", other.map(|t| t.id)),
    }

    assert_eq!(api.tasks().await.unwrap().len(), 3);
}

#[tokio::test]
async fn login_issues_deterministic_token_and_rejects_bad_password() {
    let Some(server) = spawn_server().await else {
        return;
    };
    let api = ApiClient::new(server.base_url());

    let session = api.login("admin@test.com", "admin123").await.unwrap();
    assert!(session.success);
    assert_eq!(session.user.id, 1);
    assert_eq!(session.user.name, "Admin User");
    assert_eq!(session.token, "mock-token-1");

    match api.login("admin@test.com", "bad").await {
        Err(E2eError::Api { status: 401, .. }) => {}
        other => panic!("expected 401, got {:?}", other.map(|s| s.token)),
    }
}

#[tokio::test]
async fn register_conflicts_on_duplicate_email() {
    let Some(server) = spawn_server().await else {
        return;
    };
    let api = ApiClient::new(server.base_url());

    let user = api
        .register("new@test.com", "pw123", "New User")
        .await
        .unwrap();
    assert_eq!(user.id, 3);

    match api.register("new@test.com", "pw123", "Clone").await {
        Err(E2eError::Api { status: 409, .. }) => {}
        other => panic!("expected 409, got {:?}", other.map(|u| u.id)),
    }

    // The rejected registration still logs in with the original account
    let session = api.login("new@test.com", "pw123").await.unwrap();
    assert_eq!(session.token, "mock-token-3");
}

#[tokio::test]
async fn unknown_routes_serve_the_spa_document() {
    let Some(server) = spawn_server().await else {
        return;
    };

    let client = reqwest::Client::new();
    let resp = client
        .get(format!("{}/some/client/route", server.base_url()))
        .send()
        .await
        .unwrap();

    assert_eq!(resp.status().as_u16(), 200);
    let content_type = resp
        .headers()
        .get("content-type")
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default()
        .to_string();
    assert!(content_type.starts_with("text/html"));

    let html = resp.text().await.unwrap();
    assert!(html.contains("data-testid=\"login-view\""));
}

//! API helper client
//!
//! Typed wrapper over the Taskboard HTTP surface. The e2e suite uses it to
//! arrange state and to assert server-side effects without going through the
//! browser; API-level smoke tests use it directly.

use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::json;

use taskboard_common::Task;

use crate::error::{E2eError, E2eResult};

/// Client for the task and auth APIs of one running server.
pub struct ApiClient {
    base_url: String,
    http: reqwest::Client,
}

/// Public user view returned by login and register.
#[derive(Debug, Clone, Deserialize)]
pub struct SessionUser {
    pub id: i64,
    pub email: String,
    pub name: String,
}

/// Successful login payload.
#[derive(Debug, Clone, Deserialize)]
pub struct Session {
    pub success: bool,
    pub user: SessionUser,
    pub token: String,
}

impl ApiClient {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            http: reqwest::Client::new(),
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    pub async fn health(&self) -> E2eResult<serde_json::Value> {
        let resp = self.http.get(self.url("/api/health")).send().await?;
        expect_json(resp).await
    }

    pub async fn login(&self, email: &str, password: &str) -> E2eResult<Session> {
        let resp = self
            .http
            .post(self.url("/api/login"))
            .json(&json!({"email": email, "password": password}))
            .send()
            .await?;
        expect_json(resp).await
    }

    pub async fn register(&self, email: &str, password: &str, name: &str) -> E2eResult<SessionUser> {
        #[derive(Deserialize)]
        struct Registered {
            user: SessionUser,
        }

        let resp = self
            .http
            .post(self.url("/api/register"))
            .json(&json!({"email": email, "password": password, "name": name}))
            .send()
            .await?;
        let registered: Registered = expect_json(resp).await?;
        Ok(registered.user)
    }

    pub async fn tasks(&self) -> E2eResult<Vec<Task>> {
        let resp = self.http.get(self.url("/api/tasks")).send().await?;
        expect_json(resp).await
    }

    pub async fn task(&self, id: i64) -> E2eResult<Task> {
        let resp = self
            .http
            .get(self.url(&format!("/api/tasks/{id}")))
            .send()
            .await?;
        expect_json(resp).await
    }

    pub async fn create_task(&self, title: &str, priority: Option<&str>) -> E2eResult<Task> {
        let mut body = json!({"title": title});
        if let Some(priority) = priority {
            body["priority"] = json!(priority);
        }
        let resp = self
            .http
            .post(self.url("/api/tasks"))
            .json(&body)
            .send()
            .await?;
        expect_json(resp).await
    }

    /// Send a partial update; the server merges the supplied fields.
    pub async fn update_task(&self, id: i64, patch: serde_json::Value) -> E2eResult<Task> {
        let resp = self
            .http
            .put(self.url(&format!("/api/tasks/{id}")))
            .json(&patch)
            .send()
            .await?;
        expect_json(resp).await
    }

    /// Delete a task; the server answers 204 with an empty body.
    pub async fn delete_task(&self, id: i64) -> E2eResult<()> {
        let resp = self
            .http
            .delete(self.url(&format!("/api/tasks/{id}")))
            .send()
            .await?;
        let status = resp.status();
        if !status.is_success() {
            return Err(E2eError::Api {
                status: status.as_u16(),
                body: resp.text().await.unwrap_or_default(),
            });
        }
        Ok(())
    }

    pub async fn search(&self, query: &str) -> E2eResult<Vec<Task>> {
        let resp = self
            .http
            .get(self.url("/api/search"))
            .query(&[("q", query)])
            .send()
            .await?;
        expect_json(resp).await
    }
}

/// Decode a success body, or surface the status and error body.
async fn expect_json<T: DeserializeOwned>(resp: reqwest::Response) -> E2eResult<T> {
    let status = resp.status();
    if !status.is_success() {
        return Err(E2eError::Api {
            status: status.as_u16(),
            body: resp.text().await.unwrap_or_default(),
        });
    }
    Ok(resp.json().await?)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn urls_join_base_and_path() {
        let api = ApiClient::new("http://127.0.0.1:3000");
        assert_eq!(api.url("/api/tasks"), "http://127.0.0.1:3000/api/tasks");
    }
}

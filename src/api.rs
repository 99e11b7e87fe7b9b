//! Thin client for the task-tracker REST backend.
//!
//! One request/response round trip per operation: no retry, no caching.
//! Failures come back as `Error::Http` (transport, including the request
//! timeout) or `Error::Api` (non-success status).

use reqwest::Client;
use serde_json::json;

use crate::config::AppConfig;
use crate::error::{Error, Result};
use crate::profile::Profile;
use crate::task::{Task, TaskStatus};

#[derive(Debug, Clone)]
pub struct ApiClient {
    http: Client,
    base_url: String,
}

impl ApiClient {
    pub fn new(config: &AppConfig) -> Result<Self> {
        let http = Client::builder().timeout(config.timeout).build()?;
        Ok(Self {
            http,
            base_url: config.base_url.clone(),
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    async fn check(response: reqwest::Response) -> Result<reqwest::Response> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }
        // Failure bodies look like {"error": "..."} when the server had a
        // say in the matter; fall back to raw text, then the status line.
        let body = response.text().await.unwrap_or_default();
        let message = serde_json::from_str::<serde_json::Value>(&body)
            .ok()
            .and_then(|value| {
                value
                    .get("error")
                    .or_else(|| value.get("message"))
                    .and_then(|m| m.as_str())
                    .map(str::to_string)
            })
            .unwrap_or(body);
        let message = if message.trim().is_empty() {
            status
                .canonical_reason()
                .unwrap_or("unexpected status")
                .to_string()
        } else {
            message
        };
        Err(Error::Api {
            status: status.as_u16(),
            message,
        })
    }

    /// `GET /api/tasks`
    pub async fn list_tasks(&self) -> Result<Vec<Task>> {
        tracing::debug!(url = %self.url("/api/tasks"), "listing tasks");
        let response = self.http.get(self.url("/api/tasks")).send().await?;
        Ok(Self::check(response).await?.json().await?)
    }

    /// `POST /api/tasks` with `{description}`; the server assigns the id.
    pub async fn create_task(&self, description: &str) -> Result<Task> {
        let response = self
            .http
            .post(self.url("/api/tasks"))
            .json(&json!({ "description": description }))
            .send()
            .await?;
        Ok(Self::check(response).await?.json().await?)
    }

    /// `PUT /api/tasks/{id}` with `{status}`. The only status write the
    /// client ever issues is an explicit transition.
    pub async fn update_status(&self, id: u64, status: TaskStatus) -> Result<Task> {
        let response = self
            .http
            .put(self.url(&format!("/api/tasks/{id}")))
            .json(&json!({ "status": status }))
            .send()
            .await?;
        Ok(Self::check(response).await?.json().await?)
    }

    /// `DELETE /api/tasks/{id}`, expecting 204.
    pub async fn delete_task(&self, id: u64) -> Result<()> {
        let response = self
            .http
            .delete(self.url(&format!("/api/tasks/{id}")))
            .send()
            .await?;
        Self::check(response).await?;
        Ok(())
    }

    /// `GET /api/profile`
    pub async fn get_profile(&self) -> Result<Profile> {
        let response = self.http.get(self.url("/api/profile")).send().await?;
        Ok(Self::check(response).await?.json().await?)
    }

    /// `POST /api/profile` with the validated `{name, phone}` pair.
    pub async fn save_profile(&self, profile: &Profile) -> Result<Profile> {
        let response = self
            .http
            .post(self.url("/api/profile"))
            .json(profile)
            .send()
            .await?;
        Ok(Self::check(response).await?.json().await?)
    }
}

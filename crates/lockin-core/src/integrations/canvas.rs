//! Canvas LMS client.
//!
//! Fetches the user's courses, assignments, and announcements over the
//! Canvas REST API with a Bearer token stored in the OS keyring. The
//! selected course titles calendar exports; assignments and
//! announcements give the CLI something concrete to show next to the
//! schedule.

use std::time::Duration;

use reqwest::Client;
use serde::{Deserialize, Serialize};
use url::Url;

use super::keyring_store;
use crate::error::CoreError;

/// Keyring key for the Canvas API token.
pub const TOKEN_KEY: &str = "canvas_token";

const REQUEST_TIMEOUT: Duration = Duration::from_secs(15);

/// A Canvas course.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Course {
    pub id: i64,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub course_code: Option<String>,
}

impl Course {
    /// Display name, tolerating unnamed courses.
    pub fn display_name(&self) -> &str {
        self.name.as_deref().unwrap_or("Unnamed Course")
    }
}

/// A Canvas assignment.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Assignment {
    pub id: i64,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub due_at: Option<String>,
    #[serde(default)]
    pub points_possible: Option<f64>,
}

/// A Canvas announcement.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Announcement {
    pub id: i64,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub posted_at: Option<String>,
}

/// Bearer-authenticated Canvas API client.
pub struct CanvasClient {
    client: Client,
    base_url: Url,
    token: String,
}

impl CanvasClient {
    pub fn new(base_url: &str, token: impl Into<String>) -> Result<Self, CoreError> {
        let base_url: Url = base_url.parse().map_err(|e| CoreError::Integration {
            service: "canvas".into(),
            message: format!("invalid base url: {e}"),
        })?;
        let client = Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .map_err(|e| CoreError::Integration {
                service: "canvas".into(),
                message: e.to_string(),
            })?;
        Ok(Self {
            client,
            base_url,
            token: token.into(),
        })
    }

    /// Build a client with the token stored in the OS keyring.
    pub fn from_keyring(base_url: &str) -> Result<Self, CoreError> {
        let token = keyring_store::get(TOKEN_KEY)
            .map_err(|e| CoreError::Integration {
                service: "canvas".into(),
                message: format!("keyring error: {e}"),
            })?
            .ok_or_else(|| CoreError::Integration {
                service: "canvas".into(),
                message: "no Canvas token stored; run `lockin auth canvas <token>`".into(),
            })?;
        Self::new(base_url, token)
    }

    async fn get_json<T: for<'de> Deserialize<'de>>(
        &self,
        path: &str,
        query: &[(&str, String)],
    ) -> Result<T, CoreError> {
        let url = self
            .base_url
            .join(path)
            .map_err(|e| CoreError::Integration {
                service: "canvas".into(),
                message: format!("invalid path {path}: {e}"),
            })?;

        let resp = self
            .client
            .get(url)
            .query(query)
            .header("Authorization", format!("Bearer {}", self.token))
            .header("Accept", "application/json")
            .send()
            .await
            .map_err(|e| CoreError::Integration {
                service: "canvas".into(),
                message: e.to_string(),
            })?;

        let status = resp.status();
        if !status.is_success() {
            return Err(CoreError::Integration {
                service: "canvas".into(),
                message: format!("HTTP {status} for {path}"),
            });
        }

        resp.json().await.map_err(|e| CoreError::Integration {
            service: "canvas".into(),
            message: format!("invalid JSON response: {e}"),
        })
    }

    /// List the authenticated user's courses.
    pub async fn courses(&self) -> Result<Vec<Course>, CoreError> {
        self.get_json("/api/v1/courses", &[]).await
    }

    /// List assignments for a course.
    pub async fn assignments(&self, course_id: i64) -> Result<Vec<Assignment>, CoreError> {
        self.get_json(&format!("/api/v1/courses/{course_id}/assignments"), &[])
            .await
    }

    /// List announcements for a course.
    pub async fn announcements(&self, course_id: i64) -> Result<Vec<Announcement>, CoreError> {
        self.get_json(
            "/api/v1/announcements",
            &[("context_codes[]", format!("course_{course_id}"))],
        )
        .await
    }
}

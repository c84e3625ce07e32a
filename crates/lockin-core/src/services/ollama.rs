//! Ollama adapters for the description and text generation contracts.
//!
//! Both adapters speak the `/api/generate` endpoint: the generator
//! sends a plain prompt, the vision adapter attaches the screenshot as
//! a base64 image for a multimodal model (e.g. llava). Timeouts are
//! set on the client; connect failures and timeouts surface as
//! [`ServiceError::Unavailable`] so the pipeline's failure path
//! handles them like any other outage.

use std::path::Path;
use std::time::Duration;

use base64::Engine;
use reqwest::Client;
use serde_json::json;
use url::Url;

use super::{DescriptionService, TextGenerator};
use crate::error::ServiceError;

const GENERATE_PATH: &str = "/api/generate";

fn endpoint(base_url: &str) -> Result<Url, ServiceError> {
    let base: Url = base_url
        .parse()
        .map_err(|e| ServiceError::Unavailable(format!("invalid Ollama base url: {e}")))?;
    base.join(GENERATE_PATH)
        .map_err(|e| ServiceError::Unavailable(format!("invalid Ollama base url: {e}")))
}

fn build_client(timeout: Duration) -> Result<Client, ServiceError> {
    Client::builder()
        .timeout(timeout)
        .build()
        .map_err(ServiceError::from)
}

async fn generate_request(
    client: &Client,
    endpoint: &Url,
    body: serde_json::Value,
) -> Result<String, ServiceError> {
    let resp = client.post(endpoint.clone()).json(&body).send().await?;

    let status = resp.status();
    if !status.is_success() {
        return Err(ServiceError::Unavailable(format!(
            "Ollama returned HTTP {status}"
        )));
    }

    let value: serde_json::Value = resp.json().await?;
    match value.get("response").and_then(|v| v.as_str()) {
        Some(text) if !text.trim().is_empty() => Ok(text.to_string()),
        Some(_) => Err(ServiceError::MalformedOutput(
            "Ollama returned an empty response field".into(),
        )),
        None => Err(ServiceError::MalformedOutput(
            "Ollama response is missing the response field".into(),
        )),
    }
}

/// Text generation over Ollama's `/api/generate`.
#[derive(Debug, Clone)]
pub struct OllamaGenerator {
    client: Client,
    endpoint: Url,
    model: String,
    temperature: f64,
}

impl OllamaGenerator {
    pub fn new(
        base_url: &str,
        model: impl Into<String>,
        temperature: f64,
        timeout: Duration,
    ) -> Result<Self, ServiceError> {
        Ok(Self {
            client: build_client(timeout)?,
            endpoint: endpoint(base_url)?,
            model: model.into(),
            temperature,
        })
    }
}

impl TextGenerator for OllamaGenerator {
    async fn generate(&self, prompt: &str) -> Result<String, ServiceError> {
        let body = json!({
            "model": self.model,
            "prompt": prompt,
            "stream": false,
            "options": { "temperature": self.temperature },
        });
        generate_request(&self.client, &self.endpoint, body).await
    }
}

/// Screen description over Ollama's `/api/generate` with a vision
/// model.
#[derive(Debug, Clone)]
pub struct OllamaVision {
    client: Client,
    endpoint: Url,
    model: String,
}

impl OllamaVision {
    pub fn new(
        base_url: &str,
        model: impl Into<String>,
        timeout: Duration,
    ) -> Result<Self, ServiceError> {
        Ok(Self {
            client: build_client(timeout)?,
            endpoint: endpoint(base_url)?,
            model: model.into(),
        })
    }
}

impl DescriptionService for OllamaVision {
    async fn describe(&self, image: &Path) -> Result<String, ServiceError> {
        let bytes = std::fs::read(image).map_err(|e| {
            ServiceError::Unavailable(format!("cannot read screenshot {}: {e}", image.display()))
        })?;
        let encoded = base64::engine::general_purpose::STANDARD.encode(bytes);

        let body = json!({
            "model": self.model,
            "prompt": "Describe what you see on this screen, focusing on the application \
                       in use, visible text content, and what the user appears to be doing.",
            "images": [encoded],
            "stream": false,
        });
        generate_request(&self.client, &self.endpoint, body).await
    }
}

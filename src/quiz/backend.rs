use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::json;
use thiserror::Error;
use tracing::{debug, warn};

use super::LOGGED_ERROR_CHARS;

#[derive(Debug, Error)]
pub enum BackendError {
    #[error("backend rejected credential (HTTP {0})")]
    Unauthorized(u16),
    #[error("backend returned HTTP {0}")]
    Status(u16),
    #[error("backend request failed: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("backend response had no text candidate")]
    NoCandidate,
}

/// A generative model that turns a prompt into text.
#[async_trait]
pub trait GenerativeBackend: Send + Sync {
    /// Short label for logs, e.g. the model id.
    fn name(&self) -> &str;

    /// One non-streaming call asking for a JSON-formatted reply.
    async fn generate_json(&self, prompt: &str, credential: &str) -> Result<String, BackendError>;
}

/// Gemini `generateContent` over REST.
pub struct GeminiBackend {
    client: reqwest::Client,
    endpoint: String,
    model: String,
}

impl GeminiBackend {
    pub fn new(endpoint: &str, model: &str, timeout: Duration) -> Result<Self, BackendError> {
        let client = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            endpoint: endpoint.trim_end_matches('/').to_string(),
            model: model.to_string(),
        })
    }

    fn url(&self) -> String {
        format!("{}/models/{}:generateContent", self.endpoint, self.model)
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerateRequest {
    contents: Vec<serde_json::Value>,
    generation_config: GenerationConfig,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerationConfig {
    response_mime_type: &'static str,
}

#[derive(Debug, Deserialize)]
struct GenerateResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    content: Option<Content>,
}

#[derive(Debug, Deserialize)]
struct Content {
    #[serde(default)]
    parts: Vec<Part>,
}

#[derive(Debug, Deserialize)]
struct Part {
    text: Option<String>,
}

impl GenerateResponse {
    /// Concatenated text parts of the first candidate.
    fn into_text(self) -> Option<String> {
        let content = self.candidates.into_iter().next()?.content?;
        let text: String = content.parts.into_iter().filter_map(|p| p.text).collect();
        Some(text)
    }
}

#[async_trait]
impl GenerativeBackend for GeminiBackend {
    fn name(&self) -> &str {
        &self.model
    }

    async fn generate_json(&self, prompt: &str, credential: &str) -> Result<String, BackendError> {
        let request = GenerateRequest {
            contents: vec![json!({ "role": "user", "parts": [{ "text": prompt }] })],
            generation_config: GenerationConfig {
                response_mime_type: "application/json",
            },
        };

        debug!(model = %self.model, prompt_chars = prompt.len(), "Calling Gemini");

        let response = self
            .client
            .post(self.url())
            .header("x-goog-api-key", credential)
            .json(&request)
            .send()
            .await?;

        let status = response.status();
        if status == reqwest::StatusCode::UNAUTHORIZED || status == reqwest::StatusCode::FORBIDDEN {
            return Err(BackendError::Unauthorized(status.as_u16()));
        }
        if !status.is_success() {
            // The body stays in the log; callers only see the status.
            let body = response.text().await.unwrap_or_default();
            warn!(
                model = %self.model,
                status = status.as_u16(),
                body = %crate::truncate(&body, LOGGED_ERROR_CHARS),
                "Gemini returned an error"
            );
            return Err(BackendError::Status(status.as_u16()));
        }

        let parsed: GenerateResponse = response.json().await?;
        parsed.into_text().ok_or(BackendError::NoCandidate)
    }
}

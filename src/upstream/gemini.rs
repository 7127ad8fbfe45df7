//! Google Gemini `generateContent` client
//!
//! The credential is held server-side and passed as a query parameter; it
//! never appears in a response body or log line.

use secrecy::{ExposeSecret, SecretString};
use serde::Serialize;
use thiserror::Error;

/// Default upstream endpoint
pub const DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com";

/// Default API version path segment
pub const DEFAULT_API_VERSION: &str = "v1beta";

/// Default model identifier
pub const DEFAULT_MODEL: &str = "gemini-1.5-flash";

/// Errors from the upstream API, kept distinct so the relay handler can map
/// each class to its own HTTP response
#[derive(Debug, Error)]
pub enum UpstreamError {
    /// Upstream returned a non-success HTTP status; the status is passed
    /// through to the relay caller with the error body attached
    #[error("Gemini API error: {status}")]
    Status { status: u16, body: String },

    /// Upstream returned 2xx but the documented reply-text location
    /// (`candidates[0].content.parts[0].text`) is missing
    #[error("Unexpected API response structure")]
    UnexpectedShape { payload: serde_json::Value },

    /// Network or body-decoding failure
    #[error("upstream request failed: {0}")]
    Transport(#[from] reqwest::Error),
}

#[derive(Serialize)]
struct GenerateRequest {
    contents: Vec<Content>,
}

#[derive(Serialize)]
struct Content {
    parts: Vec<Part>,
}

#[derive(Serialize)]
struct Part {
    text: String,
}

/// Client for the Gemini `generateContent` endpoint
#[derive(Clone)]
pub struct GeminiClient {
    client: reqwest::Client,
    api_key: SecretString,
    model: String,
    api_version: String,
    base_url: String,
}

impl GeminiClient {
    /// Create a new client against the production endpoint
    #[must_use]
    pub fn new(api_key: SecretString, model: String, api_version: String) -> Self {
        Self::with_base_url(api_key, model, api_version, DEFAULT_BASE_URL.to_string())
    }

    /// Create a new client against an explicit base URL (tests point this at
    /// a local mock server)
    #[must_use]
    pub fn with_base_url(
        api_key: SecretString,
        model: String,
        api_version: String,
        base_url: String,
    ) -> Self {
        Self {
            client: reqwest::Client::new(),
            api_key,
            model,
            api_version,
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    /// The configured model identifier
    #[must_use]
    pub fn model(&self) -> &str {
        &self.model
    }

    /// Send a prompt and return the reply text
    ///
    /// # Errors
    ///
    /// Returns [`UpstreamError::Status`] on non-2xx responses,
    /// [`UpstreamError::UnexpectedShape`] when the reply text is missing from
    /// the payload, and [`UpstreamError::Transport`] on network failures.
    pub async fn generate(&self, prompt: &str) -> Result<String, UpstreamError> {
        let url = format!(
            "{}/{}/models/{}:generateContent",
            self.base_url, self.api_version, self.model
        );

        let request = GenerateRequest {
            contents: vec![Content {
                parts: vec![Part {
                    text: prompt.to_string(),
                }],
            }],
        };

        tracing::debug!(model = %self.model, "sending generateContent request");

        let response = self
            .client
            .post(&url)
            .query(&[("key", self.api_key.expose_secret())])
            .json(&request)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            tracing::error!(status = %status, body = %body, "Gemini API error");
            return Err(UpstreamError::Status {
                status: status.as_u16(),
                body,
            });
        }

        let payload: serde_json::Value = response.json().await?;
        extract_reply_text(&payload).ok_or_else(|| {
            tracing::error!(payload = %payload, "unexpected Gemini response structure");
            UpstreamError::UnexpectedShape { payload }
        })
    }
}

/// Read the reply text from its documented nested location; `None` when the
/// shape doesn't match. There is deliberately no fallback value.
fn extract_reply_text(payload: &serde_json::Value) -> Option<String> {
    payload
        .pointer("/candidates/0/content/parts/0/text")
        .and_then(serde_json::Value::as_str)
        .map(ToString::to_string)
}

//! Relay HTTP client
//!
//! The client-side half of the `/api/chat` contract: posts a prompt, unwraps
//! the `{success, response}` / `{error}` envelope.

use async_trait::async_trait;
use serde::Deserialize;

use crate::{Error, Result};

/// Source of chat replies for the controller; the relay client is the real
/// implementation, tests substitute their own
#[async_trait]
pub trait ChatBackend: Send + Sync {
    /// Send a prompt and return the reply text
    async fn reply(&self, prompt: &str) -> Result<String>;
}

/// Response envelope from the relay endpoint
#[derive(Debug, Deserialize)]
struct RelayEnvelope {
    #[serde(default)]
    success: bool,
    response: Option<String>,
    error: Option<String>,
}

/// HTTP client for a running relay server
#[derive(Clone)]
pub struct RelayClient {
    client: reqwest::Client,
    base_url: String,
}

impl RelayClient {
    /// Create a client for a relay at `base_url` (e.g. `http://localhost:3000`)
    #[must_use]
    pub fn new(base_url: &str) -> Self {
        Self {
            client: reqwest::Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    /// Send a prompt through the relay and return the reply text
    ///
    /// # Errors
    ///
    /// Returns [`Error::Relay`] on non-success statuses or envelopes without
    /// a reply, [`Error::Http`] on network failures.
    pub async fn chat(&self, prompt: &str) -> Result<String> {
        let response = self
            .client
            .post(format!("{}/api/chat", self.base_url))
            .json(&serde_json::json!({ "prompt": prompt }))
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(Error::Relay(format!("backend error {status}: {body}")));
        }

        let envelope: RelayEnvelope = response.json().await?;
        match envelope {
            RelayEnvelope {
                success: true,
                response: Some(text),
                ..
            } => Ok(text),
            RelayEnvelope {
                error: Some(message),
                ..
            } => Err(Error::Relay(message)),
            _ => Err(Error::Relay("unexpected response format".to_string())),
        }
    }
}

#[async_trait]
impl ChatBackend for RelayClient {
    async fn reply(&self, prompt: &str) -> Result<String> {
        self.chat(prompt).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn envelope_with_reply_parses() {
        let envelope: RelayEnvelope =
            serde_json::from_str(r#"{"success":true,"response":"Hi there!"}"#).unwrap();
        assert!(envelope.success);
        assert_eq!(envelope.response.as_deref(), Some("Hi there!"));
    }

    #[test]
    fn error_envelope_parses_without_success_field() {
        let envelope: RelayEnvelope =
            serde_json::from_str(r#"{"error":"Prompt is required"}"#).unwrap();
        assert!(!envelope.success);
        assert_eq!(envelope.error.as_deref(), Some("Prompt is required"));
    }
}

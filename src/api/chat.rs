//! The relay handler: `POST /api/chat`
//!
//! Shields the upstream credential from the caller and normalizes the
//! upstream response into the `{success, response}` / `{error, details?}`
//! envelope. Validation failures never reach the upstream; upstream HTTP
//! failures pass their status code through.

use std::sync::Arc;

use axum::{
    body::Bytes,
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::post,
    Json, Router,
};
use serde::{Deserialize, Serialize};

use super::ApiState;
use crate::upstream::UpstreamError;

/// Build the chat router
pub fn router(state: Arc<ApiState>) -> Router {
    Router::new()
        .route("/chat", post(chat))
        .method_not_allowed_fallback(method_not_allowed)
        .with_state(state)
}

/// Request body for the relay endpoint
#[derive(Debug, Deserialize)]
struct ChatRequest {
    #[serde(default)]
    prompt: Option<String>,
}

/// Success envelope: `response` is present iff `success` is true
#[derive(Debug, Serialize)]
pub struct ChatSuccess {
    pub success: bool,
    pub response: String,
}

/// Relay a prompt to the upstream API and return the normalized reply
async fn chat(
    State(state): State<Arc<ApiState>>,
    body: Bytes,
) -> Result<Json<ChatSuccess>, ChatError> {
    // A body that isn't a JSON object is treated the same as one without a
    // prompt: the caller gets a client error and the upstream is never hit.
    let request: ChatRequest =
        serde_json::from_slice(&body).map_err(|_| ChatError::BadRequest("Prompt is required"))?;

    let prompt = request.prompt.unwrap_or_default();
    if prompt.is_empty() {
        return Err(ChatError::BadRequest("Prompt is required"));
    }

    let upstream = state.upstream.as_ref().ok_or_else(|| {
        tracing::error!("GEMINI_API_KEY environment variable is not set");
        ChatError::NotConfigured
    })?;

    let framed = crate::prompt::conversation_prompt(&prompt);
    let reply = upstream.generate(&framed).await?;

    tracing::info!(chars = reply.len(), "relayed upstream reply");
    Ok(Json(ChatSuccess {
        success: true,
        response: reply,
    }))
}

/// Reject non-POST methods with a descriptive envelope
///
/// Installed as the router's method-not-allowed fallback.
pub async fn method_not_allowed() -> Response {
    (
        StatusCode::METHOD_NOT_ALLOWED,
        Json(ErrorEnvelope {
            error: "Method not allowed. Use POST.".to_string(),
            details: None,
        }),
    )
        .into_response()
}

/// Failure envelope: `details` carries diagnostics, never a reply value
#[derive(Debug, Serialize)]
pub struct ErrorEnvelope {
    pub error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
}

/// Relay handler errors, each mapped to its own HTTP response
#[derive(Debug)]
pub enum ChatError {
    /// Client-input error; no upstream call was attempted
    BadRequest(&'static str),
    /// Server credential is unset; deliberately indistinguishable from other
    /// server errors beyond the generic message
    NotConfigured,
    /// Upstream returned a non-success status, passed through verbatim
    Upstream { status: u16, body: String },
    /// Upstream 2xx with a payload missing the reply text
    UnexpectedShape { payload: serde_json::Value },
    /// Network or decoding failure talking to the upstream
    Internal(String),
}

impl From<UpstreamError> for ChatError {
    fn from(err: UpstreamError) -> Self {
        match err {
            UpstreamError::Status { status, body } => Self::Upstream { status, body },
            UpstreamError::UnexpectedShape { payload } => Self::UnexpectedShape { payload },
            UpstreamError::Transport(e) => Self::Internal(e.to_string()),
        }
    }
}

impl IntoResponse for ChatError {
    fn into_response(self) -> Response {
        let (status, error, details) = match self {
            Self::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg.to_string(), None),
            Self::NotConfigured => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "Server configuration error".to_string(),
                None,
            ),
            Self::Upstream {
                status: upstream_status,
                body,
            } => (
                StatusCode::from_u16(upstream_status)
                    .unwrap_or(StatusCode::INTERNAL_SERVER_ERROR),
                format!("Gemini API error: {upstream_status}"),
                Some(body),
            ),
            Self::UnexpectedShape { payload } => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "Unexpected API response structure".to_string(),
                Some(payload.to_string()),
            ),
            Self::Internal(msg) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "Internal server error".to_string(),
                Some(msg),
            ),
        };

        (status, Json(ErrorEnvelope { error, details })).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn upstream_status_passes_through() {
        let response = ChatError::Upstream {
            status: 429,
            body: "quota exceeded".to_string(),
        }
        .into_response();
        assert_eq!(response.status(), StatusCode::TOO_MANY_REQUESTS);
    }

    #[test]
    fn unparsable_upstream_status_falls_back_to_500() {
        let response = ChatError::Upstream {
            status: 0,
            body: String::new(),
        }
        .into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[test]
    fn error_envelope_omits_absent_details() {
        let encoded = serde_json::to_string(&ErrorEnvelope {
            error: "Prompt is required".to_string(),
            details: None,
        })
        .unwrap();
        assert_eq!(encoded, r#"{"error":"Prompt is required"}"#);
    }
}

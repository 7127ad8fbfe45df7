//! Shared test utilities

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use axum::{http::StatusCode, routing::post, Json, Router};
use secrecy::SecretString;
use tokio::sync::Mutex;

use parley::api::{chat, health, ApiState};
use parley::GeminiClient;

/// Model identifier the test upstream client is configured with
pub const TEST_MODEL: &str = "test-model";

/// A mock generative-language upstream bound to an ephemeral local port
///
/// Counts hits so tests can assert that validation failures never reach the
/// network, and records the last request body for wire-format assertions.
pub struct MockUpstream {
    pub base_url: String,
    hits: Arc<AtomicUsize>,
    last_request: Arc<Mutex<Option<serde_json::Value>>>,
}

impl MockUpstream {
    /// Spawn a mock upstream that answers every generateContent call with
    /// `status` and `body`
    pub async fn spawn(status: StatusCode, body: serde_json::Value) -> Self {
        let hits = Arc::new(AtomicUsize::new(0));
        let last_request = Arc::new(Mutex::new(None));

        let handler_hits = hits.clone();
        let handler_last = last_request.clone();
        let app = Router::new().route(
            &format!("/v1beta/models/{TEST_MODEL}:generateContent"),
            post(move |Json(request): Json<serde_json::Value>| {
                let hits = handler_hits.clone();
                let last = handler_last.clone();
                let body = body.clone();
                async move {
                    hits.fetch_add(1, Ordering::SeqCst);
                    *last.lock().await = Some(request);
                    (status, Json(body))
                }
            }),
        );

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("failed to bind mock upstream");
        let addr = listener.local_addr().expect("mock upstream has no addr");
        tokio::spawn(async move {
            axum::serve(listener, app).await.expect("mock upstream died");
        });

        Self {
            base_url: format!("http://{addr}"),
            hits,
            last_request,
        }
    }

    /// How many generateContent calls the mock has received
    pub fn hits(&self) -> usize {
        self.hits.load(Ordering::SeqCst)
    }

    /// The most recent request body, if any call arrived
    pub async fn last_request(&self) -> Option<serde_json::Value> {
        self.last_request.lock().await.clone()
    }

    /// An upstream client pointed at this mock
    pub fn client(&self) -> GeminiClient {
        GeminiClient::with_base_url(
            SecretString::from("test-key"),
            TEST_MODEL.to_string(),
            "v1beta".to_string(),
            self.base_url.clone(),
        )
    }
}

/// Build the relay router the same way the server wires it
pub fn relay_router(upstream: Option<GeminiClient>) -> Router {
    let state = Arc::new(ApiState { upstream });
    Router::new()
        .nest("/api", chat::router(state.clone()))
        .merge(health::router())
        .merge(health::ready_router(state))
        .method_not_allowed_fallback(chat::method_not_allowed)
}

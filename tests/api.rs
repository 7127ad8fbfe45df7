//! Relay endpoint integration tests
//!
//! Exercises the real router against a mock upstream on a local port.

use axum::{
    body::Body,
    http::{header, Method, Request, StatusCode},
};
use serde_json::json;
use tower::ServiceExt;

mod common;
use common::{relay_router, MockUpstream};

/// A canned upstream success payload carrying `text` at the documented
/// nested location
fn upstream_reply(text: &str) -> serde_json::Value {
    json!({
        "candidates": [{
            "content": { "parts": [{ "text": text }] }
        }]
    })
}

fn chat_request(body: &str) -> Request<Body> {
    Request::builder()
        .method(Method::POST)
        .uri("/api/chat")
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

async fn response_json(response: axum::response::Response) -> serde_json::Value {
    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    serde_json::from_slice(&body).unwrap()
}

#[tokio::test]
async fn health_endpoint_reports_ok() {
    let app = relay_router(None);

    let response = app
        .oneshot(
            Request::builder()
                .uri("/health")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let json = response_json(response).await;
    assert_eq!(json["status"], "ok");
    assert!(json["version"].is_string());
}

#[tokio::test]
async fn ready_degraded_without_credential() {
    let app = relay_router(None);

    let response = app
        .oneshot(Request::builder().uri("/ready").body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
    let json = response_json(response).await;
    assert_eq!(json["status"], "degraded");
    assert_eq!(json["checks"]["upstream"]["status"], "fail");
}

#[tokio::test]
async fn ready_ok_with_credential() {
    let upstream = MockUpstream::spawn(StatusCode::OK, upstream_reply("hi")).await;
    let app = relay_router(Some(upstream.client()));

    let response = app
        .oneshot(Request::builder().uri("/ready").body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let json = response_json(response).await;
    assert_eq!(json["checks"]["upstream"]["status"], "ok");
}

#[tokio::test]
async fn non_post_method_rejected_without_upstream_call() {
    let upstream = MockUpstream::spawn(StatusCode::OK, upstream_reply("hi")).await;
    let app = relay_router(Some(upstream.client()));

    let response = app
        .oneshot(
            Request::builder()
                .method(Method::GET)
                .uri("/api/chat")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::METHOD_NOT_ALLOWED);
    let json = response_json(response).await;
    assert_eq!(json["error"], "Method not allowed. Use POST.");
    assert_eq!(upstream.hits(), 0);
}

#[tokio::test]
async fn missing_prompt_rejected_without_upstream_call() {
    let upstream = MockUpstream::spawn(StatusCode::OK, upstream_reply("hi")).await;
    let app = relay_router(Some(upstream.client()));

    let response = app.oneshot(chat_request("{}")).await.unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let json = response_json(response).await;
    assert_eq!(json["error"], "Prompt is required");
    assert_eq!(upstream.hits(), 0);
}

#[tokio::test]
async fn empty_prompt_rejected() {
    let upstream = MockUpstream::spawn(StatusCode::OK, upstream_reply("hi")).await;
    let app = relay_router(Some(upstream.client()));

    let response = app
        .oneshot(chat_request(r#"{"prompt":""}"#))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(upstream.hits(), 0);
}

#[tokio::test]
async fn unparsable_body_rejected_without_upstream_call() {
    let upstream = MockUpstream::spawn(StatusCode::OK, upstream_reply("hi")).await;
    let app = relay_router(Some(upstream.client()));

    let response = app.oneshot(chat_request("not json")).await.unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let json = response_json(response).await;
    assert_eq!(json["error"], "Prompt is required");
    assert_eq!(upstream.hits(), 0);
}

#[tokio::test]
async fn missing_credential_is_generic_server_error() {
    let app = relay_router(None);

    let response = app
        .oneshot(chat_request(r#"{"prompt":"Hello"}"#))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    let json = response_json(response).await;
    assert_eq!(json["error"], "Server configuration error");
    // Never leaks which configuration value is missing
    assert!(json.get("details").is_none());
}

#[tokio::test]
async fn valid_reply_is_relayed_exactly() {
    let upstream =
        MockUpstream::spawn(StatusCode::OK, upstream_reply("I'm doing well, thanks!")).await;
    let app = relay_router(Some(upstream.client()));

    let response = app
        .oneshot(chat_request(r#"{"prompt":"Hello, how are you?"}"#))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let json = response_json(response).await;
    assert_eq!(
        json,
        json!({ "success": true, "response": "I'm doing well, thanks!" })
    );
    assert_eq!(upstream.hits(), 1);

    // The prompt reaches the upstream verbatim inside the instruction
    // template, at the documented wire location
    let sent = upstream.last_request().await.unwrap();
    let templated = sent["contents"][0]["parts"][0]["text"].as_str().unwrap();
    assert!(templated.contains("\"Hello, how are you?\""));
    assert!(templated.starts_with("You are a helpful English conversation partner."));
}

#[tokio::test]
async fn unexpected_shape_is_server_error_with_payload() {
    let upstream = MockUpstream::spawn(StatusCode::OK, json!({ "candidates": [] })).await;
    let app = relay_router(Some(upstream.client()));

    let response = app
        .oneshot(chat_request(r#"{"prompt":"Hello"}"#))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    let json = response_json(response).await;
    assert_eq!(json["error"], "Unexpected API response structure");
    // Raw payload attached for diagnosis, never a default reply value
    assert!(json["details"].as_str().unwrap().contains("candidates"));
}

#[tokio::test]
async fn upstream_status_passes_through_with_error_text() {
    let upstream = MockUpstream::spawn(
        StatusCode::SERVICE_UNAVAILABLE,
        json!({ "error": { "message": "model overloaded" } }),
    )
    .await;
    let app = relay_router(Some(upstream.client()));

    let response = app
        .oneshot(chat_request(r#"{"prompt":"Hello"}"#))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
    let json = response_json(response).await;
    assert_eq!(json["error"], "Gemini API error: 503");
    assert!(json["details"].as_str().unwrap().contains("model overloaded"));
}

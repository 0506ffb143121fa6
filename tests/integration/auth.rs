//! Integration tests for the API-key gate

use axum::http::{header, StatusCode};
use pretty_assertions::assert_eq;
use serde_json::Value;

use crate::common::{constants::*, test_data, GatewayTestHarness};

fn bearer(key: &str) -> axum::http::HeaderValue {
    format!("Bearer {}", key).parse().unwrap()
}

#[tokio::test]
async fn test_missing_key_rejected_without_upstream_call() {
    let harness = GatewayTestHarness::with_api_keys(&[TEST_API_KEY]).await;

    let response = harness
        .server
        .post("/v1/chat/completions")
        .json(&test_data::chat_request(false))
        .await;

    response.assert_status(StatusCode::UNAUTHORIZED);
    let body: Value = response.json();
    assert_eq!(body["error"]["message"], "Invalid API key");
    assert_eq!(body["error"]["type"], "auth_error");
    assert_eq!(body["error"]["code"], 401);

    assert_eq!(harness.upstream.request_count().await, 0);
}

#[tokio::test]
async fn test_wrong_key_rejected() {
    let harness = GatewayTestHarness::with_api_keys(&[TEST_API_KEY]).await;

    let response = harness
        .server
        .get("/v1/models")
        .add_header(header::AUTHORIZATION, bearer("sk-wrong"))
        .await;

    response.assert_status(StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_non_bearer_scheme_rejected() {
    let harness = GatewayTestHarness::with_api_keys(&[TEST_API_KEY]).await;

    let response = harness
        .server
        .get("/v1/models")
        .add_header(header::AUTHORIZATION, TEST_API_KEY.parse().unwrap())
        .await;

    response.assert_status(StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_valid_key_accepted() {
    let harness = GatewayTestHarness::with_api_keys(&[TEST_API_KEY, "sk-other"]).await;
    harness
        .mock_upstream_stream(&[r#"{"message":"Hi"}"#, "[DONE]"])
        .await;

    harness
        .server
        .get("/v1/models")
        .add_header(header::AUTHORIZATION, bearer("sk-other"))
        .await
        .assert_status_ok();

    let response = harness
        .server
        .post("/v1/chat/completions")
        .add_header(header::AUTHORIZATION, bearer(TEST_API_KEY))
        .json(&test_data::chat_request(false))
        .await;

    response.assert_status_ok();
    let body: Value = response.json();
    assert_eq!(body["choices"][0]["message"]["content"], "Hi");
}

#[tokio::test]
async fn test_open_mode_needs_no_key() {
    let harness = GatewayTestHarness::new().await;

    harness.server.get("/v1/models").await.assert_status_ok();
}

#[tokio::test]
async fn test_health_and_metrics_are_gated() {
    let harness = GatewayTestHarness::with_api_keys(&[TEST_API_KEY]).await;

    harness
        .server
        .get("/health")
        .await
        .assert_status(StatusCode::UNAUTHORIZED);

    let response = harness
        .server
        .get("/health")
        .add_header(header::AUTHORIZATION, bearer(TEST_API_KEY))
        .await;
    response.assert_status_ok();
    let body: Value = response.json();
    assert_eq!(body["status"], "healthy");
}

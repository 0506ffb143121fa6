//! Integration tests for CORS handling and unknown routes

use axum::http::{header, Method, StatusCode};
use pretty_assertions::assert_eq;
use serde_json::Value;

use crate::common::{constants::*, GatewayTestHarness};

fn assert_cors_headers(response: &axum_test::TestResponse) {
    let headers = response.headers();
    assert_eq!(headers.get(header::ACCESS_CONTROL_ALLOW_ORIGIN).unwrap(), "*");
    assert_eq!(
        headers.get(header::ACCESS_CONTROL_ALLOW_METHODS).unwrap(),
        "GET, POST, OPTIONS"
    );
    assert_eq!(headers.get(header::ACCESS_CONTROL_ALLOW_HEADERS).unwrap(), "*");
    assert_eq!(
        headers.get(header::ACCESS_CONTROL_EXPOSE_HEADERS).unwrap(),
        "Content-Type, Authorization"
    );
    assert_eq!(
        headers
            .get(header::ACCESS_CONTROL_ALLOW_CREDENTIALS)
            .unwrap(),
        "true"
    );
}

#[tokio::test]
async fn test_preflight_answered_without_key() {
    let harness = GatewayTestHarness::with_api_keys(&[TEST_API_KEY]).await;

    let response = harness
        .server
        .method(Method::OPTIONS, "/v1/chat/completions")
        .await;

    response.assert_status(StatusCode::NO_CONTENT);
    assert_cors_headers(&response);
    assert_eq!(
        response.headers().get(header::ACCESS_CONTROL_MAX_AGE).unwrap(),
        "86400"
    );
    assert!(response.text().is_empty());
    assert_eq!(harness.upstream.request_count().await, 0);
}

#[tokio::test]
async fn test_preflight_on_unknown_path() {
    let harness = GatewayTestHarness::new().await;

    let response = harness.server.method(Method::OPTIONS, "/anything").await;

    response.assert_status(StatusCode::NO_CONTENT);
}

#[tokio::test]
async fn test_cors_headers_on_success() {
    let harness = GatewayTestHarness::new().await;

    let response = harness.server.get("/v1/models").await;

    response.assert_status_ok();
    assert_cors_headers(&response);
}

#[tokio::test]
async fn test_cors_headers_on_auth_failure() {
    let harness = GatewayTestHarness::with_api_keys(&[TEST_API_KEY]).await;

    let response = harness.server.get("/v1/models").await;

    response.assert_status(StatusCode::UNAUTHORIZED);
    assert_cors_headers(&response);
}

#[tokio::test]
async fn test_unknown_path_returns_404_envelope() {
    let harness = GatewayTestHarness::new().await;

    let response = harness.server.get("/v2/unknown").await;

    response.assert_status(StatusCode::NOT_FOUND);
    assert_cors_headers(&response);
    let body: Value = response.json();
    assert_eq!(body["error"]["message"], "Not Found");
    assert_eq!(body["error"]["type"], "not_found_error");
    assert_eq!(body["error"]["code"], 404);
}

#[tokio::test]
async fn test_wrong_method_on_known_path_returns_404() {
    let harness = GatewayTestHarness::new().await;

    let response = harness.server.get("/v1/chat/completions").await;

    response.assert_status(StatusCode::NOT_FOUND);
    assert_eq!(harness.upstream.request_count().await, 0);
}

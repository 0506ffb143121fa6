//! Integration tests for buffered POST /v1/chat/completions and request validation

use axum::http::{header, StatusCode};
use pretty_assertions::assert_eq;
use serde_json::{json, Value};

use crate::common::{constants::*, test_data, GatewayTestHarness};

// ============================================================================
// Validation
// ============================================================================

#[tokio::test]
async fn test_empty_messages_rejected_without_upstream_call() {
    let harness = GatewayTestHarness::new().await;

    let response = harness
        .server
        .post("/v1/chat/completions")
        .json(&json!({"model": TEST_MODEL, "messages": []}))
        .await;

    response.assert_status(StatusCode::BAD_REQUEST);
    let body: Value = response.json();
    assert_eq!(body["error"]["type"], "invalid_request_error");
    assert_eq!(body["error"]["code"], 400);
    assert_eq!(body["error"]["param"], Value::Null);
    assert_eq!(
        body["error"]["message"],
        "Messages is required and must be a non-empty array"
    );

    assert_eq!(harness.upstream.request_count().await, 0);
}

#[tokio::test]
async fn test_missing_messages_rejected() {
    let harness = GatewayTestHarness::new().await;

    let response = harness
        .server
        .post("/v1/chat/completions")
        .json(&json!({"model": TEST_MODEL}))
        .await;

    response.assert_status(StatusCode::BAD_REQUEST);
    assert_eq!(harness.upstream.request_count().await, 0);
}

#[tokio::test]
async fn test_unknown_model_rejected() {
    let harness = GatewayTestHarness::new().await;

    let response = harness
        .server
        .post("/v1/chat/completions")
        .json(&json!({
            "model": "gpt-5-ultra",
            "messages": [{"role": "user", "content": "Hello"}]
        }))
        .await;

    response.assert_status(StatusCode::BAD_REQUEST);
    let body: Value = response.json();
    assert_eq!(body["error"]["type"], "invalid_request_error");
    let message = body["error"]["message"].as_str().unwrap();
    assert!(message.starts_with("Please select the correct model:"));
    assert!(message.contains("gpt-4o-mini"));

    assert_eq!(harness.upstream.request_count().await, 0);
}

#[tokio::test]
async fn test_non_json_content_type_rejected() {
    let harness = GatewayTestHarness::new().await;

    let response = harness
        .server
        .post("/v1/chat/completions")
        .text(test_data::chat_request(false).to_string())
        .await;

    response.assert_status(StatusCode::BAD_REQUEST);
    let body: Value = response.json();
    assert_eq!(body["error"]["type"], "invalid_request_error");
    assert_eq!(harness.upstream.request_count().await, 0);
}

#[tokio::test]
async fn test_malformed_json_rejected() {
    let harness = GatewayTestHarness::new().await;

    let response = harness
        .server
        .post("/v1/chat/completions")
        .content_type("application/json")
        .bytes("{not json".into())
        .await;

    response.assert_status(StatusCode::BAD_REQUEST);
    let body: Value = response.json();
    assert!(body["error"]["message"]
        .as_str()
        .unwrap()
        .starts_with("Invalid request body"));
}

// ============================================================================
// Buffered completions
// ============================================================================

#[tokio::test]
async fn test_buffered_completion_concatenates_fragments() {
    let harness = GatewayTestHarness::new().await;
    harness
        .mock_upstream_stream(&[
            r#"{"message":"Hi"}"#,
            r#"{"message":" there"}"#,
            "[DONE]",
        ])
        .await;

    let response = harness
        .server
        .post("/v1/chat/completions")
        .json(&test_data::chat_request(false))
        .await;

    response.assert_status_ok();
    let body: Value = response.json();
    assert_eq!(body["object"], "chat.completion");
    assert_eq!(body["model"], TEST_MODEL);
    assert!(body["id"].as_str().unwrap().starts_with("chatcmpl-"));
    assert_eq!(body["choices"][0]["index"], 0);
    assert_eq!(body["choices"][0]["message"]["role"], "assistant");
    assert_eq!(body["choices"][0]["message"]["content"], "Hi there");
    assert_eq!(body["choices"][0]["finish_reason"], "stop");
}

#[tokio::test]
async fn test_stream_flag_defaults_to_buffered() {
    let harness = GatewayTestHarness::new().await;
    harness
        .mock_upstream_stream(&[r#"{"message":"ok"}"#, "[DONE]"])
        .await;

    let response = harness
        .server
        .post("/v1/chat/completions")
        .json(&json!({
            "model": TEST_MODEL,
            "messages": [{"role": "user", "content": "Hello"}]
        }))
        .await;

    response.assert_status_ok();
    assert!(response
        .headers()
        .get(header::CONTENT_TYPE)
        .unwrap()
        .to_str()
        .unwrap()
        .starts_with("application/json"));
    let body: Value = response.json();
    assert_eq!(body["choices"][0]["message"]["content"], "ok");
}

#[tokio::test]
async fn test_buffered_in_band_error_surfaces() {
    let harness = GatewayTestHarness::new().await;
    harness
        .mock_upstream_stream(&[
            r#"{"action":"error","status":429,"type":"ERR_CONVERSATION_LIMIT"}"#,
        ])
        .await;

    let response = harness
        .server
        .post("/v1/chat/completions")
        .json(&test_data::chat_request(false))
        .await;

    response.assert_status(StatusCode::TOO_MANY_REQUESTS);
    let body: Value = response.json();
    assert_eq!(body["error"]["type"], "duck_error");
    assert_eq!(body["error"]["code"], 429);
    assert_eq!(
        body["error"]["message"],
        "DuckDuckGo Error: ERR_CONVERSATION_LIMIT"
    );
}

#[tokio::test]
async fn test_buffered_non_event_body_returned_raw() {
    let harness = GatewayTestHarness::new().await;
    harness
        .upstream
        .mock_status_success(TEST_VQD_TOKEN)
        .await;
    harness.upstream.mock_chat_raw(200, "plain answer").await;

    let response = harness
        .server
        .post("/v1/chat/completions")
        .json(&test_data::chat_request(false))
        .await;

    response.assert_status_ok();
    let body: Value = response.json();
    assert_eq!(body["choices"][0]["message"]["content"], "plain answer");
}

// ============================================================================
// Upstream handshake failures
// ============================================================================

#[tokio::test]
async fn test_status_failure_returns_500_without_chat_call() {
    let harness = GatewayTestHarness::new().await;
    harness.upstream.mock_status_failure(503).await;

    let response = harness
        .server
        .post("/v1/chat/completions")
        .json(&test_data::chat_request(false))
        .await;

    response.assert_status(StatusCode::INTERNAL_SERVER_ERROR);
    let body: Value = response.json();
    assert_eq!(body["error"]["type"], "api_error");
    assert_eq!(body["error"]["code"], 500);

    assert!(harness.upstream.chat_bodies().await.is_empty());
}

#[tokio::test]
async fn test_missing_token_returns_500() {
    let harness = GatewayTestHarness::new().await;
    harness.upstream.mock_status_without_token().await;

    let response = harness
        .server
        .post("/v1/chat/completions")
        .json(&test_data::chat_request(true))
        .await;

    response.assert_status(StatusCode::INTERNAL_SERVER_ERROR);
    assert!(harness.upstream.chat_bodies().await.is_empty());
}

// ============================================================================
// Upstream request shape
// ============================================================================

#[tokio::test]
async fn test_upstream_receives_normalized_prompt() {
    let harness = GatewayTestHarness::new().await;
    harness
        .mock_upstream_stream(&[r#"{"message":"ok"}"#, "[DONE]"])
        .await;

    harness
        .server
        .post("/v1/chat/completions")
        .json(&json!({
            "model": "claude-3-haiku-20240307",
            "messages": [
                {"role": "system", "content": "  Be brief.  "},
                {"role": "user", "content": [
                    {"type": "text", "text": "What is "},
                    {"type": "image_url", "image_url": {"url": "http://x"}},
                    {"type": "text", "text": "Rust?"}
                ]},
                {"role": "assistant", "content": "   "},
                {"role": "tool", "content": "ignored"}
            ]
        }))
        .await
        .assert_status_ok();

    let bodies = harness.upstream.chat_bodies().await;
    assert_eq!(bodies.len(), 1);
    assert_eq!(
        bodies[0],
        json!({
            "model": "claude-3-haiku-20240307",
            "messages": [
                {"role": "user", "content": "user: Be brief.\nuser: What is Rust?"}
            ]
        })
    );
}

#[tokio::test]
async fn test_malformed_turns_are_skipped_not_rejected() {
    let harness = GatewayTestHarness::new().await;
    harness
        .mock_upstream_stream(&[r#"{"message":"ok"}"#, "[DONE]"])
        .await;

    let response = harness
        .server
        .post("/v1/chat/completions")
        .json(&json!({
            "model": TEST_MODEL,
            "messages": [
                {"role": 5, "content": "x"},
                null,
                {"role": "user", "content": "hi"}
            ]
        }))
        .await;

    response.assert_status_ok();
    let bodies = harness.upstream.chat_bodies().await;
    assert_eq!(bodies.len(), 1);
    assert_eq!(bodies[0]["messages"][0]["content"], "user: hi");
}

//! Integration tests for GET /v1/models

use pretty_assertions::assert_eq;
use serde_json::Value;

use crate::common::GatewayTestHarness;

#[tokio::test]
async fn test_list_models_returns_registry() {
    let harness = GatewayTestHarness::new().await;

    let response = harness.server.get("/v1/models").await;

    response.assert_status_ok();
    let body: Value = response.json();
    assert_eq!(body["object"], "list");

    let ids: Vec<&str> = body["data"]
        .as_array()
        .expect("data should be an array")
        .iter()
        .map(|model| model["id"].as_str().expect("id should be a string"))
        .collect();
    assert_eq!(
        ids,
        vec![
            "gpt-4o-mini",
            "claude-3-haiku-20240307",
            "meta-llama/Meta-Llama-3.1-70B-Instruct-Turbo",
            "mistralai/Mixtral-8x7B-Instruct-v0.1",
        ]
    );

    for model in body["data"].as_array().unwrap() {
        assert_eq!(model["object"], "model");
        assert_eq!(model["owned_by"], "duckduckgo");
    }
}

#[tokio::test]
async fn test_list_models_does_not_contact_upstream() {
    let harness = GatewayTestHarness::new().await;

    harness.server.get("/v1/models").await.assert_status_ok();

    assert_eq!(harness.upstream.request_count().await, 0);
}

//! Models endpoint
//!
//! Lists the models advertised by the gateway. Served from the registry
//! alone; DuckDuckGo is never contacted.

use std::sync::Arc;

use axum::{extract::State, Json};

use crate::{
    types::{Model, ModelsResponse, MODEL_OWNER},
    AppState,
};

/// List available models
pub async fn list_models(State(state): State<Arc<AppState>>) -> Json<ModelsResponse> {
    let data = state
        .models
        .ids()
        .map(|id| Model {
            id: id.to_string(),
            object: "model".to_string(),
            owned_by: MODEL_OWNER.to_string(),
        })
        .collect();

    Json(ModelsResponse {
        object: "list".to_string(),
        data,
    })
}

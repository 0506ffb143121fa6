//! HTTP routes for Duckgate
//!
//! This module defines all HTTP endpoints exposed by the gateway.

pub mod chat;
pub mod health;
pub mod metrics;
pub mod models;

use std::sync::Arc;

use axum::{
    middleware,
    routing::{get, post},
    Router,
};
use tower_http::trace::TraceLayer;

use crate::{
    error::AppError,
    middleware::{auth::api_key_middleware, cors::cors_middleware},
    AppState,
};

/// Fallback for unmatched paths and methods
async fn not_found() -> AppError {
    AppError::NotFound
}

/// Create the main application router
pub fn create_router(state: Arc<AppState>) -> Router {
    // Wrong methods on known paths are reported as 404 like unknown paths.
    // Middleware is applied in reverse order (last applied runs first):
    // CORS runs first, then the API-key check.
    Router::new()
        .route(
            "/v1/chat/completions",
            post(chat::chat_completions).fallback(not_found),
        )
        .route("/v1/models", get(models::list_models).fallback(not_found))
        .route("/health", get(health::health_check).fallback(not_found))
        .route("/metrics", get(metrics::prometheus_metrics).fallback(not_found))
        .fallback(not_found)
        .layer(middleware::from_fn_with_state(
            state.clone(),
            api_key_middleware,
        ))
        .layer(middleware::from_fn(cors_middleware))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

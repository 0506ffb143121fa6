//! API-key middleware
//!
//! When `API_KEYS` is configured, every request must present one of the keys
//! as `Authorization: Bearer <key>`. With no keys configured the gateway runs
//! open.

use std::collections::HashSet;
use std::sync::Arc;

use axum::{
    extract::{Request, State},
    http::header,
    middleware::Next,
    response::Response,
};
use tracing::{debug, instrument, warn};

use crate::{error::AppError, AppState};

/// Extract the Authorization header and return the bearer token
pub fn extract_bearer_token(auth_header: &str) -> Option<&str> {
    auth_header
        .strip_prefix("Bearer ")
        .map(str::trim)
        .filter(|token| !token.is_empty())
}

/// Check an optional Authorization header against the configured keys
pub fn is_authorized(api_keys: &HashSet<String>, auth_header: Option<&str>) -> bool {
    if api_keys.is_empty() {
        return true;
    }

    auth_header
        .and_then(extract_bearer_token)
        .is_some_and(|token| api_keys.contains(token))
}

/// API-key middleware. Runs before validation and before any upstream call.
#[instrument(skip_all, fields(path = %request.uri().path()))]
pub async fn api_key_middleware(
    State(state): State<Arc<AppState>>,
    request: Request,
    next: Next,
) -> Result<Response, AppError> {
    let auth_header = request
        .headers()
        .get(header::AUTHORIZATION)
        .and_then(|h| h.to_str().ok());

    if !is_authorized(&state.config.api_keys, auth_header) {
        warn!(has_header = auth_header.is_some(), "Rejected request with invalid API key");
        return Err(AppError::Unauthorized);
    }

    debug!("API key accepted");
    Ok(next.run(request).await)
}

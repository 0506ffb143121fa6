//! Header utilities for DuckDuckGo requests
//!
//! DuckDuckGo only answers requests that look like they come from its own web
//! client, so every outbound call carries a fixed browser header set.
//! `Accept-Encoding` is left to reqwest, which then decodes compressed bodies
//! itself. Hop-by-hop headers (`Connection`, `TE`) are never set.

use reqwest::header::{HeaderMap, HeaderName, HeaderValue, ACCEPT, CONTENT_TYPE};

use crate::error::{AppError, AppResult};

/// Header carrying the session token on both the status response and the
/// chat request
pub const VQD_HEADER: &str = "x-vqd-4";

/// Browser-impersonating headers sent on every upstream call
const BROWSER_HEADERS: &[(&str, &str)] = &[
    (
        "user-agent",
        "Mozilla/5.0 (Windows NT 10.0; Win64; x64; rv:129.0) Gecko/20100101 Firefox/129.0",
    ),
    ("accept", "*/*"),
    ("accept-language", "en-US,en;q=0.5"),
    ("referer", "https://duckduckgo.com/"),
    ("cache-control", "no-store"),
    ("x-vqd-accept", "1"),
    ("cookie", "dcm=3"),
    ("sec-fetch-dest", "empty"),
    ("sec-fetch-mode", "cors"),
    ("sec-fetch-site", "same-origin"),
    ("priority", "u=4"),
    ("pragma", "no-cache"),
];

/// Build the header set for the status (token) call
pub fn build_browser_headers() -> HeaderMap {
    let mut headers = HeaderMap::with_capacity(BROWSER_HEADERS.len() + 3);
    for &(name, value) in BROWSER_HEADERS {
        headers.insert(HeaderName::from_static(name), HeaderValue::from_static(value));
    }
    headers
}

/// Build the header set for the chat call, carrying the session token
pub fn build_chat_headers(token: &str) -> AppResult<HeaderMap> {
    let token = HeaderValue::from_str(token).map_err(|_| {
        AppError::UpstreamUnavailable(
            "DuckDuckGo status API returned an unusable session token".to_string(),
        )
    })?;

    let mut headers = build_browser_headers();
    headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
    headers.insert(ACCEPT, HeaderValue::from_static("text/event-stream"));
    headers.insert(HeaderName::from_static(VQD_HEADER), token);

    Ok(headers)
}

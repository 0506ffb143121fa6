//! Configuration management for Duckgate
//!
//! Configuration is loaded from environment variables.

use std::collections::HashSet;
use std::env;

use anyhow::{Context, Result};

/// Default DuckDuckGo endpoint used to obtain a session token
pub const DEFAULT_STATUS_URL: &str = "https://duckduckgo.com/duckchat/v1/status";
/// Default DuckDuckGo chat endpoint
pub const DEFAULT_CHAT_URL: &str = "https://duckduckgo.com/duckchat/v1/chat";

/// Log output format
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    Pretty,
    Json,
}

/// Application configuration
#[derive(Debug, Clone)]
pub struct Config {
    /// Host to bind to
    pub host: String,
    /// Port to listen on
    pub port: u16,

    /// Accepted bearer keys. Empty means every request is let through.
    pub api_keys: HashSet<String>,

    /// DuckDuckGo status endpoint (session token)
    pub ddg_status_url: String,
    /// DuckDuckGo chat endpoint
    pub ddg_chat_url: String,

    pub log_format: LogFormat,
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self> {
        Ok(Self {
            host: env::var("GATEWAY_HOST").unwrap_or_else(|_| "0.0.0.0".to_string()),
            port: env::var("GATEWAY_PORT")
                .unwrap_or_else(|_| "8080".to_string())
                .parse()
                .context("Invalid GATEWAY_PORT")?,

            api_keys: parse_api_keys(&env::var("API_KEYS").unwrap_or_default()),

            ddg_status_url: env::var("DDG_STATUS_URL")
                .unwrap_or_else(|_| DEFAULT_STATUS_URL.to_string()),
            ddg_chat_url: env::var("DDG_CHAT_URL").unwrap_or_else(|_| DEFAULT_CHAT_URL.to_string()),

            log_format: match env::var("LOG_FORMAT") {
                Ok(v) if v.eq_ignore_ascii_case("json") => LogFormat::Json,
                _ => LogFormat::Pretty,
            },
        })
    }

    /// Whether the API-key gate is active
    pub fn auth_enabled(&self) -> bool {
        !self.api_keys.is_empty()
    }
}

/// Parse a comma-separated key list, dropping blank entries
pub fn parse_api_keys(raw: &str) -> HashSet<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|key| !key.is_empty())
        .map(str::to_string)
        .collect()
}

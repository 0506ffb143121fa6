//! Duckgate - OpenAI-compatible gateway for DuckDuckGo AI chat
//!
//! This library provides the core functionality for the Duckgate server.
//! It accepts OpenAI chat-completion requests, relays them to DuckDuckGo's
//! chat backend, and translates the upstream event stream back into
//! OpenAI streaming chunks or a single buffered completion.

pub mod config;
pub mod error;
pub mod middleware;
pub mod normalize;
pub mod proxy;
pub mod registry;
pub mod routes;
pub mod streaming;
pub mod types;

use std::sync::Arc;
use std::time::Instant;

use anyhow::Result;

pub use crate::config::Config;
pub use crate::proxy::{ChatProvider, DuckDuckGoClient};
pub use crate::registry::ModelRegistry;

/// Application state shared across all request handlers
pub struct AppState {
    pub config: Config,
    pub start_time: Instant,
    /// Advertised model ids and their upstream names
    pub models: Arc<ModelRegistry>,
    /// Upstream chat backend
    pub chat_provider: Arc<dyn ChatProvider>,
}

impl AppState {
    /// Create a new application state
    pub fn new(config: Config) -> Result<Self> {
        // No request timeout: a stream lasts as long as DuckDuckGo keeps talking
        let http_client = reqwest::Client::builder()
            .pool_max_idle_per_host(100)
            .build()?;

        let models = Arc::new(ModelRegistry::default());

        let chat_provider: Arc<dyn ChatProvider> = Arc::new(DuckDuckGoClient::new(
            http_client,
            &config,
            models.clone(),
        ));

        Ok(Self::with_provider(config, models, chat_provider))
    }

    /// Create an application state around an existing provider
    pub fn with_provider(
        config: Config,
        models: Arc<ModelRegistry>,
        chat_provider: Arc<dyn ChatProvider>,
    ) -> Self {
        Self {
            config,
            start_time: Instant::now(),
            models,
            chat_provider,
        }
    }
}

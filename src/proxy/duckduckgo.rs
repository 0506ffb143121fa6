//! DuckDuckGo AI chat client
//!
//! Two-step handshake: a GET on the status endpoint yields a short-lived
//! `x-vqd-4` token, which must accompany the POST to the chat endpoint. The
//! token is used for exactly one chat call and never cached.

use std::sync::Arc;

use async_trait::async_trait;
use serde::Serialize;
use tracing::instrument;

use super::headers::{build_browser_headers, build_chat_headers, VQD_HEADER};
use super::logging::RequestContext;
use super::provider::{ByteStream, ChatProvider};
use crate::{
    config::Config,
    error::{AppError, AppResult},
    registry::ModelRegistry,
    routes::metrics::record_upstream_error,
};

/// Chat request body understood by DuckDuckGo
#[derive(Debug, Serialize)]
struct UpstreamChatRequest<'a> {
    model: &'a str,
    messages: [UpstreamMessage<'a>; 1],
}

#[derive(Debug, Serialize)]
struct UpstreamMessage<'a> {
    role: &'static str,
    content: &'a str,
}

/// DuckDuckGo chat client
pub struct DuckDuckGoClient {
    client: reqwest::Client,
    status_url: String,
    chat_url: String,
    models: Arc<ModelRegistry>,
}

impl DuckDuckGoClient {
    /// Create a new DuckDuckGo client
    pub fn new(client: reqwest::Client, config: &Config, models: Arc<ModelRegistry>) -> Self {
        Self {
            client,
            status_url: config.ddg_status_url.clone(),
            chat_url: config.ddg_chat_url.clone(),
            models,
        }
    }

    /// Fetch a fresh session token from the status endpoint
    #[instrument(skip_all, fields(trace_id = %ctx.trace_id))]
    pub async fn fetch_session_token(&self, ctx: &RequestContext) -> AppResult<String> {
        ctx.log_upstream_request(&self.status_url);

        let response = self
            .client
            .get(&self.status_url)
            .headers(build_browser_headers())
            .send()
            .await
            .map_err(|e| {
                ctx.log_connection_error(&e.to_string(), &self.status_url);
                record_upstream_error("status_unreachable");
                AppError::UpstreamUnavailable(format!("DuckDuckGo status API request failed: {}", e))
            })?;

        let status = response.status();
        ctx.log_upstream_response(&self.status_url, status.as_u16());

        if !status.is_success() {
            record_upstream_error("status_failed");
            return Err(AppError::UpstreamUnavailable(format!(
                "DuckDuckGo status API failed with {}",
                status.as_u16()
            )));
        }

        response
            .headers()
            .get(VQD_HEADER)
            .and_then(|value| value.to_str().ok())
            .filter(|token| !token.is_empty())
            .map(str::to_string)
            .ok_or_else(|| {
                record_upstream_error("token_missing");
                AppError::UpstreamUnavailable(
                    "DuckDuckGo status API did not return a session token".to_string(),
                )
            })
    }
}

#[async_trait]
impl ChatProvider for DuckDuckGoClient {
    fn name(&self) -> &'static str {
        "duckduckgo"
    }

    #[instrument(skip_all, fields(trace_id = %ctx.trace_id, model = %model))]
    async fn open_chat(
        &self,
        prompt: &str,
        model: &str,
        ctx: &RequestContext,
    ) -> AppResult<ByteStream> {
        let upstream_model = self
            .models
            .resolve(model)
            .ok_or_else(|| AppError::InvalidModel(self.models.id_list()))?;

        let token = self.fetch_session_token(ctx).await?;
        let headers = build_chat_headers(&token)?;

        let body = UpstreamChatRequest {
            model: upstream_model,
            messages: [UpstreamMessage {
                role: "user",
                content: prompt,
            }],
        };

        ctx.log_upstream_request(&self.chat_url);

        let response = self
            .client
            .post(&self.chat_url)
            .headers(headers)
            .json(&body)
            .send()
            .await
            .map_err(|e| {
                ctx.log_connection_error(&e.to_string(), &self.chat_url);
                record_upstream_error("chat_failed");
                AppError::from(e)
            })?;

        let status = response.status();
        ctx.log_upstream_response(&self.chat_url, status.as_u16());

        // Body is decoded regardless of status
        if !status.is_success() {
            ctx.log_warning(&format!("DuckDuckGo chat API answered {}", status.as_u16()));
        }

        Ok(Box::pin(response.bytes_stream()))
    }
}

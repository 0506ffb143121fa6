//! Chat provider abstraction layer
//!
//! Defines the seam between the router and the upstream chat backend so the
//! handlers never depend on a concrete client.

use async_trait::async_trait;
use bytes::Bytes;
use futures::Stream;
use std::pin::Pin;

use super::logging::RequestContext;
use crate::error::AppResult;

/// Stream type for raw upstream response bodies
pub type ByteStream = Pin<Box<dyn Stream<Item = Result<Bytes, reqwest::Error>> + Send>>;

/// Trait defining the interface for chat backends
///
/// Implementations resolve the advertised model name, perform whatever
/// handshake the backend needs, and hand back the raw response body without
/// reading it. Decoding is left to [`crate::streaming`].
#[async_trait]
pub trait ChatProvider: Send + Sync {
    /// Get the provider name for logging and metrics
    fn name(&self) -> &'static str;

    /// Open a chat call for a normalized prompt.
    ///
    /// `model` is the advertised model id; unknown ids fail with
    /// [`AppError::InvalidModel`](crate::error::AppError::InvalidModel).
    async fn open_chat(
        &self,
        prompt: &str,
        model: &str,
        ctx: &RequestContext,
    ) -> AppResult<ByteStream>;
}

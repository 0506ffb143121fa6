//! Re-framing of the upstream feed into OpenAI responses
//!
//! [`translate_stream`] forwards every decoded event as its own SSE record the
//! moment it is decoded. [`aggregate`] runs the same decoder to completion and
//! returns one `chat.completion` object.

use bytes::Bytes;
use futures::{Stream, StreamExt};
use tracing::{debug, warn};

use super::decoder::{StreamDecoder, UpstreamEvent};
use crate::error::{AppError, AppResult};
use crate::proxy::logging::RequestContext;
use crate::routes::metrics::record_stream_fragments;
use crate::types::{completion_id, unix_now, ChatCompletion, ChatCompletionChunk, Delta, StreamChoice};

/// Identity shared by every chunk of one stream
#[derive(Debug, Clone)]
pub struct StreamMetadata {
    pub id: String,
    pub model: String,
    pub created: i64,
}

impl StreamMetadata {
    pub fn new(model: impl Into<String>) -> Self {
        Self {
            id: completion_id(),
            model: model.into(),
            created: unix_now(),
        }
    }

    /// Chunk carrying one fragment of assistant text
    pub fn fragment_chunk(&self, text: String) -> ChatCompletionChunk {
        self.chunk(Delta { content: Some(text) }, None)
    }

    /// Final chunk: empty delta, `finish_reason: "stop"`
    pub fn terminal_chunk(&self) -> ChatCompletionChunk {
        self.chunk(Delta::default(), Some("stop".to_string()))
    }

    fn chunk(&self, delta: Delta, finish_reason: Option<String>) -> ChatCompletionChunk {
        ChatCompletionChunk {
            id: self.id.clone(),
            object: "chat.completion.chunk".to_string(),
            created: self.created,
            model: self.model.clone(),
            choices: vec![StreamChoice {
                index: 0,
                delta,
                finish_reason,
            }],
        }
    }
}

/// Format a stream chunk as an SSE data event: `data: {json}\n\n`
pub fn format_sse_chunk(chunk: &ChatCompletionChunk) -> Bytes {
    let json = serde_json::to_string(chunk).expect("ChatCompletionChunk should always serialize");
    Bytes::from(format!("data: {}\n\n", json))
}

/// Format an error as an SSE event carrying the standard error envelope
pub fn format_error_event(error: &AppError) -> Bytes {
    let json = serde_json::to_string(&error.to_body()).expect("ErrorResponse should always serialize");
    Bytes::from(format!("data: {}\n\n", json))
}

fn render_event(metadata: &StreamMetadata, event: UpstreamEvent) -> Bytes {
    match event {
        UpstreamEvent::Fragment(text) => format_sse_chunk(&metadata.fragment_chunk(text)),
        UpstreamEvent::Done => format_sse_chunk(&metadata.terminal_chunk()),
        UpstreamEvent::Error { status, error_type } => {
            format_error_event(&AppError::UpstreamInBand { status, error_type })
        }
    }
}

/// Translate the upstream byte stream into OpenAI SSE records.
///
/// The upstream is pulled one read at a time and each decoded event is
/// yielded immediately. The upstream is dropped as soon as `[DONE]` or an
/// in-band error is seen, or when the returned stream itself is dropped
/// (client went away). A read error is passed through and ends the stream
/// without a terminal frame.
pub fn translate_stream<S, E>(
    upstream: S,
    model: String,
    ctx: RequestContext,
) -> impl Stream<Item = Result<Bytes, E>> + Send
where
    S: Stream<Item = Result<Bytes, E>> + Send + 'static,
    E: std::fmt::Display + Send + 'static,
{
    async_stream::stream! {
        let metadata = StreamMetadata::new(model);
        let mut decoder = StreamDecoder::new();
        let mut fragments = 0usize;
        let mut upstream = Box::pin(upstream);

        ctx.log_stream_started();

        while let Some(chunk) = upstream.next().await {
            let bytes = match chunk {
                Ok(bytes) => bytes,
                Err(e) => {
                    ctx.log_error(&format!("upstream stream failed: {}", e));
                    yield Err(e);
                    return;
                }
            };

            for event in decoder.feed(&bytes) {
                if let UpstreamEvent::Error { status, error_type } = &event {
                    warn!(trace_id = %ctx.trace_id, status = %status, error_type = %error_type, "Upstream reported an in-band error");
                }
                if matches!(event, UpstreamEvent::Fragment(_)) {
                    fragments += 1;
                }
                yield Ok(render_event(&metadata, event));
            }

            if decoder.is_terminated() {
                break;
            }
        }

        drop(upstream);

        for event in decoder.finish() {
            if matches!(event, UpstreamEvent::Fragment(_)) {
                fragments += 1;
            }
            yield Ok(render_event(&metadata, event));
        }

        record_stream_fragments(&metadata.model, fragments as u64);
        ctx.log_stream_ended(fragments, decoder.state());
    }
}

/// Run the decoder over the whole upstream body and build one completion.
///
/// An in-band error aborts aggregation. If no fragment was ever seen the raw
/// upstream text is returned as the message instead.
pub async fn aggregate<S, E>(upstream: S, model: &str) -> AppResult<ChatCompletion>
where
    S: Stream<Item = Result<Bytes, E>>,
    E: std::fmt::Display,
{
    let mut decoder = StreamDecoder::new();
    let mut upstream = Box::pin(upstream);
    let mut raw = Vec::new();
    let mut content = String::new();
    let mut fragments = 0usize;

    while let Some(chunk) = upstream.next().await {
        let bytes = chunk.map_err(|e| {
            AppError::ChatRequestFailed(format!("failed to read upstream response: {}", e))
        })?;
        raw.extend_from_slice(&bytes);

        for event in decoder.feed(&bytes) {
            absorb(event, &mut content, &mut fragments)?;
        }

        if decoder.is_terminated() {
            break;
        }
    }

    for event in decoder.finish() {
        absorb(event, &mut content, &mut fragments)?;
    }

    if fragments == 0 {
        debug!(raw_len = raw.len(), "No fragments decoded, returning raw upstream body");
        content = String::from_utf8_lossy(&raw).into_owned();
    }

    record_stream_fragments(model, fragments as u64);
    Ok(ChatCompletion::new(model, content))
}

fn absorb(event: UpstreamEvent, content: &mut String, fragments: &mut usize) -> AppResult<()> {
    match event {
        UpstreamEvent::Fragment(text) => {
            content.push_str(&text);
            *fragments += 1;
            Ok(())
        }
        UpstreamEvent::Done => Ok(()),
        UpstreamEvent::Error { status, error_type } => {
            Err(AppError::UpstreamInBand { status, error_type })
        }
    }
}

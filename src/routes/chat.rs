//! Chat completions endpoint
//!
//! OpenAI-compatible chat completions API endpoint.
//! Handles both streaming and non-streaming responses.

use std::sync::Arc;

use axum::{
    body::{Body, Bytes},
    extract::State,
    http::{header, HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    Json,
};

use crate::{
    error::AppError,
    normalize::normalize_messages,
    proxy::{ByteStream, RequestContext},
    routes::metrics::record_request,
    streaming::{aggregate, translate_stream},
    types::{ChatCompletionRequest, ChatMessage},
    AppState,
};

const ENDPOINT: &str = "/v1/chat/completions";

/// Reject anything that does not declare a JSON body
fn ensure_json_content_type(headers: &HeaderMap) -> Result<(), AppError> {
    let content_type = headers
        .get(header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default();

    if content_type.contains("application/json") {
        Ok(())
    } else {
        Err(AppError::InvalidRequest(
            "Content-Type must be application/json".to_string(),
        ))
    }
}

/// Validated chat request
struct ValidatedChat {
    model: String,
    messages: Vec<ChatMessage>,
    stream: bool,
}

fn validate(state: &AppState, request: ChatCompletionRequest) -> Result<ValidatedChat, AppError> {
    let messages = request
        .messages
        .filter(|messages| !messages.is_empty())
        .ok_or_else(|| {
            AppError::InvalidRequest(
                "Messages is required and must be a non-empty array".to_string(),
            )
        })?;

    let model = match request.model {
        Some(model) if state.models.contains(&model) => model,
        _ => return Err(AppError::InvalidModel(state.models.id_list())),
    };

    Ok(ValidatedChat {
        model,
        messages,
        stream: request.stream.unwrap_or(false),
    })
}

/// Handle chat completion requests
///
/// Validation errors are returned before DuckDuckGo is contacted.
pub async fn chat_completions(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<Response, AppError> {
    ensure_json_content_type(&headers)?;

    let request: ChatCompletionRequest = serde_json::from_slice(&body)
        .map_err(|e| AppError::InvalidRequest(format!("Invalid request body: {}", e)))?;

    let ValidatedChat {
        model,
        messages,
        stream,
    } = validate(&state, request)?;

    let ctx = RequestContext::new(state.chat_provider.name(), ENDPOINT)
        .with_model(&model)
        .with_streaming(stream);

    let prompt = normalize_messages(&messages);
    ctx.log_request_start(prompt.len());

    let upstream = match state.chat_provider.open_chat(&prompt, &model, &ctx).await {
        Ok(upstream) => upstream,
        Err(e) => {
            ctx.log_error(&e.to_string());
            record_request("error", &model, ctx.elapsed_secs());
            return Err(e);
        }
    };

    if stream {
        handle_streaming_chat(upstream, model, ctx)
    } else {
        handle_non_streaming_chat(upstream, model, ctx).await
    }
}

/// Handle non-streaming chat completion
async fn handle_non_streaming_chat(
    upstream: ByteStream,
    model: String,
    ctx: RequestContext,
) -> Result<Response, AppError> {
    let completion = match aggregate(upstream, &model).await {
        Ok(completion) => completion,
        Err(e) => {
            ctx.log_error(&e.to_string());
            record_request("error", &model, ctx.elapsed_secs());
            return Err(e);
        }
    };

    record_request("success", &model, ctx.elapsed_secs());
    ctx.log_request_complete(
        completion
            .choices
            .first()
            .map(|choice| choice.message.content.len())
            .unwrap_or(0),
    );

    Ok((StatusCode::OK, Json(completion)).into_response())
}

/// Handle streaming chat completion
fn handle_streaming_chat(
    upstream: ByteStream,
    model: String,
    ctx: RequestContext,
) -> Result<Response, AppError> {
    // Final outcome is logged by the translator when the stream ends
    record_request("streaming", &model, ctx.elapsed_secs());

    let body = Body::from_stream(translate_stream(upstream, model, ctx));

    Response::builder()
        .status(StatusCode::OK)
        .header(header::CONTENT_TYPE, "text/event-stream")
        .header(header::CACHE_CONTROL, "no-cache")
        .header(header::CONNECTION, "keep-alive")
        .header("X-Accel-Buffering", "no")
        .body(body)
        .map_err(|e| AppError::Internal(anyhow::anyhow!("Failed to build response: {}", e)))
}

//! Error types for Duckgate
//!
//! Every failure is rendered in the OpenAI error envelope:
//! `{"error": {"message", "type", "code", "param"}}`.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use thiserror::Error;

/// Application-level errors
#[derive(Debug, Error)]
pub enum AppError {
    #[error("{0}")]
    InvalidRequest(String),

    /// Unknown model; carries the comma-separated list of valid ids
    #[error("Please select the correct model: {0}")]
    InvalidModel(String),

    #[error("Invalid API key")]
    Unauthorized,

    #[error("Not Found")]
    NotFound,

    /// The session token could not be obtained
    #[error("{0}")]
    UpstreamUnavailable(String),

    #[error("Chat request failed: {0}")]
    ChatRequestFailed(String),

    /// Error object reported inside the upstream event stream
    #[error("DuckDuckGo Error: {error_type}")]
    UpstreamInBand { status: u16, error_type: String },

    #[error("Chat request failed: {0}")]
    HttpError(#[from] reqwest::Error),

    #[error("Internal error: {0}")]
    Internal(#[from] anyhow::Error),
}

/// Error response body
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: ErrorBody,
}

/// Error details
#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub message: String,
    #[serde(rename = "type")]
    pub error_type: String,
    pub code: u16,
    pub param: Option<String>,
}

impl AppError {
    /// HTTP status this error is reported with
    pub fn status_code(&self) -> StatusCode {
        match self {
            AppError::InvalidRequest(_) | AppError::InvalidModel(_) => StatusCode::BAD_REQUEST,
            AppError::Unauthorized => StatusCode::UNAUTHORIZED,
            AppError::NotFound => StatusCode::NOT_FOUND,
            AppError::UpstreamInBand { status, .. } => {
                StatusCode::from_u16(*status).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR)
            }
            AppError::UpstreamUnavailable(_)
            | AppError::ChatRequestFailed(_)
            | AppError::HttpError(_)
            | AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Value of the `type` field in the error body
    pub fn error_type(&self) -> &'static str {
        match self {
            AppError::InvalidRequest(_) | AppError::InvalidModel(_) => "invalid_request_error",
            AppError::Unauthorized => "auth_error",
            AppError::NotFound => "not_found_error",
            AppError::UpstreamInBand { .. } => "duck_error",
            AppError::UpstreamUnavailable(_)
            | AppError::ChatRequestFailed(_)
            | AppError::HttpError(_)
            | AppError::Internal(_) => "api_error",
        }
    }

    /// Build the serializable error envelope
    pub fn to_body(&self) -> ErrorResponse {
        // In-band errors keep the upstream's own status as the code, even when
        // it is not a usable HTTP status.
        let code = match self {
            AppError::UpstreamInBand { status, .. } => *status,
            _ => self.status_code().as_u16(),
        };
        let message = match self {
            AppError::Internal(_) => "Internal Server Error".to_string(),
            _ => self.to_string(),
        };

        ErrorResponse {
            error: ErrorBody {
                message,
                error_type: self.error_type().to_string(),
                code,
                param: None,
            },
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        (self.status_code(), Json(self.to_body())).into_response()
    }
}

/// Result type alias for convenience
pub type AppResult<T> = Result<T, AppError>;

//! Axum-specific error types and mappings.
//!
//! Maps the core's validation and generation errors onto HTTP status codes
//! and JSON response bodies.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::Serialize;
use thiserror::Error;
use voxgate_core::{GenerationError, SpeechError, ValidationError};

/// Axum-specific error type.
#[derive(Debug, Error)]
pub enum HttpError {
    /// Bad request (invalid input). Returned before any generation starts.
    #[error("Bad request: {0}")]
    BadRequest(String),

    /// Generation or server-side failure.
    #[error("Internal error: {0}")]
    Internal(String),
}

/// JSON error response body.
#[derive(Serialize)]
struct ErrorBody {
    error: String,
    status: u16,
}

impl IntoResponse for HttpError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            Self::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg),
            Self::Internal(msg) => (StatusCode::INTERNAL_SERVER_ERROR, msg),
        };

        let body = ErrorBody {
            error: message,
            status: status.as_u16(),
        };

        (status, axum::Json(body)).into_response()
    }
}

impl From<ValidationError> for HttpError {
    fn from(err: ValidationError) -> Self {
        Self::BadRequest(err.to_string())
    }
}

impl From<GenerationError> for HttpError {
    fn from(err: GenerationError) -> Self {
        Self::Internal(err.to_string())
    }
}

impl From<SpeechError> for HttpError {
    fn from(err: SpeechError) -> Self {
        match err {
            SpeechError::Validation(e) => e.into(),
            SpeechError::Generation(e) => e.into(),
        }
    }
}

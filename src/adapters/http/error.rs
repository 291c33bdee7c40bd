//! API Error - EngineError to HTTP Response Mapping

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::Serialize;
use tracing::error;

use crate::domain::EngineError;

/// JSON error body.
#[derive(Debug, Serialize)]
pub struct ErrorBody {
    /// Stable machine-readable code.
    pub error: &'static str,
    /// Human-readable detail.
    pub message: String,
    /// Whether the same request may succeed if retried.
    pub retryable: bool,
}

/// Error returned by every handler.
#[derive(Debug)]
pub enum ApiError {
    Engine(EngineError),
    RateLimited,
}

impl From<EngineError> for ApiError {
    fn from(e: EngineError) -> Self {
        Self::Engine(e)
    }
}

impl ApiError {
    fn parts(&self) -> (StatusCode, &'static str) {
        match self {
            Self::RateLimited => (StatusCode::TOO_MANY_REQUESTS, "rate_limited"),
            Self::Engine(e) => match e {
                EngineError::InvalidInput(_) => (StatusCode::BAD_REQUEST, "invalid_input"),
                EngineError::InvalidResult(_) => (StatusCode::BAD_REQUEST, "invalid_result"),
                EngineError::CommitConflict { .. } => (StatusCode::CONFLICT, "commit_conflict"),
                EngineError::RoundMismatch { .. } => (StatusCode::CONFLICT, "round_mismatch"),
                EngineError::InsufficientConfirmations { .. } => {
                    (StatusCode::FORBIDDEN, "insufficient_confirmations")
                }
                EngineError::RoundNotOpen { .. } => {
                    (StatusCode::SERVICE_UNAVAILABLE, "round_not_open")
                }
                EngineError::Config(_) => (StatusCode::INTERNAL_SERVER_ERROR, "config"),
                EngineError::Ledger(_) => (StatusCode::INTERNAL_SERVER_ERROR, "ledger"),
            },
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, code) = self.parts();
        let (message, retryable) = match &self {
            Self::RateLimited => ("bet rate limit exceeded".to_string(), true),
            Self::Engine(e) => (e.to_string(), e.is_transient()),
        };
        if status.is_server_error() && status != StatusCode::SERVICE_UNAVAILABLE {
            error!(code, %message, "Request failed");
        }
        let body = ErrorBody {
            error: code,
            message,
            retryable,
        };
        (status, Json(body)).into_response()
    }
}

//! Error types for wspm-pe

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;
use wspm_common::Error as CommonError;

/// API error type
#[derive(Debug, Error)]
pub enum ApiError {
    /// Resource not found (404)
    #[error("Resource not found: {0}")]
    NotFound(String),

    /// Invalid request (400)
    #[error("Invalid request: {0}")]
    BadRequest(String),

    /// Conflict (409) - e.g., batch processing already running
    #[error("Conflict: {0}")]
    Conflict(String),

    /// Feature exists in the UI but has no backend yet (501)
    #[error("Not implemented: {0}")]
    NotImplemented(String),

    /// wspm-common error
    #[error("Common error: {0}")]
    Common(#[from] CommonError),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, error_code, message) = match self {
            ApiError::NotFound(msg) => (StatusCode::NOT_FOUND, "NOT_FOUND", msg),
            ApiError::BadRequest(msg) => (StatusCode::BAD_REQUEST, "BAD_REQUEST", msg),
            ApiError::Conflict(msg) => (StatusCode::CONFLICT, "CONFLICT", msg),
            ApiError::NotImplemented(msg) => {
                (StatusCode::NOT_IMPLEMENTED, "NOT_IMPLEMENTED", msg)
            }
            ApiError::Common(err) => {
                let (status, code) = common_status(&err);
                (status, code, err.to_string())
            }
        };

        let body = Json(json!({
            "error": {
                "code": error_code,
                "message": message,
            }
        }));

        (status, body).into_response()
    }
}

fn common_status(err: &CommonError) -> (StatusCode, &'static str) {
    match err {
        CommonError::InvalidInput(_) => (StatusCode::BAD_REQUEST, "INVALID_INPUT"),
        CommonError::NotFound(_) => (StatusCode::NOT_FOUND, "NOT_FOUND"),
        CommonError::Deserialization(_) | CommonError::InvalidPayload(_) => {
            (StatusCode::UNPROCESSABLE_ENTITY, "UNREADABLE_PLAN")
        }
        CommonError::PersistenceWrite(_) => (StatusCode::INSUFFICIENT_STORAGE, "SAVE_FAILED"),
        _ => (StatusCode::INTERNAL_SERVER_ERROR, "COMMON_ERROR"),
    }
}

/// Result type for API handlers
pub type ApiResult<T> = Result<T, ApiError>;

use crate::utils::error::LearnPathError;
use axum::{
    extract::rejection::{BytesRejection, JsonRejection, QueryRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

/// API error type. The detail is logged, never sent to the caller.
#[derive(Debug, Error)]
pub enum ApiError {
    /// Malformed caller input
    #[error("Invalid request: {0}")]
    InvalidInput(String),

    /// Anything else
    #[error("Internal server error: {0}")]
    Internal(String),
}

impl From<LearnPathError> for ApiError {
    fn from(err: LearnPathError) -> Self {
        if err.is_caller_error() {
            ApiError::InvalidInput(err.to_string())
        } else {
            ApiError::Internal(err.to_string())
        }
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        ApiError::InvalidInput(rejection.body_text())
    }
}

impl From<QueryRejection> for ApiError {
    fn from(rejection: QueryRejection) -> Self {
        ApiError::InvalidInput(rejection.body_text())
    }
}

impl From<BytesRejection> for ApiError {
    fn from(rejection: BytesRejection) -> Self {
        ApiError::InvalidInput(rejection.body_text())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        // 兩種錯誤對外都是同一個回應，差別只在 log 等級
        match &self {
            ApiError::InvalidInput(message) => tracing::warn!("⚠️ Rejected request: {}", message),
            ApiError::Internal(message) => tracing::error!("❌ Request failed: {}", message),
        }

        (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(json!({ "error": "Internal server error", "message": "Something went wrong" })),
        )
            .into_response()
    }
}

/// Result type for API handlers
pub type ApiResult<T> = Result<T, ApiError>;

//! JSON error responses for the web API.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Json, Response};
use serde::Serialize;
use tracing::error;

use crate::stories::StoryCacheError;

/// Machine-readable error code included in every error body.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ApiErrorCode {
    InvalidCount,
    InternalError,
}

impl ApiErrorCode {
    fn status(self) -> StatusCode {
        match self {
            Self::InvalidCount => StatusCode::BAD_REQUEST,
            Self::InternalError => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct ApiError {
    pub code: ApiErrorCode,
    pub message: String,
}

impl ApiError {
    pub fn new(code: ApiErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
        }
    }

    /// A 500 that says nothing about the cause.
    pub fn internal() -> Self {
        Self::new(ApiErrorCode::InternalError, "Internal server error")
    }

    pub fn invalid_count(raw: &str) -> Self {
        Self::new(
            ApiErrorCode::InvalidCount,
            format!("Invalid story count '{raw}', expected a non-negative integer"),
        )
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.code.status(), Json(self)).into_response()
    }
}

/// Log a cache failure with its full source chain and hide it behind a generic 500.
pub fn cache_error(context: &str, err: StoryCacheError) -> ApiError {
    error!(error = ?anyhow::Error::new(err), "{context} failed");
    ApiError::internal()
}

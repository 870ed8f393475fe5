//! API error types and responses

use axum::{
    extract::rejection::JsonRejection,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use thiserror::Error;
use tracing::warn;

/// API error type
#[derive(Error, Debug)]
pub enum ApiError {
    #[error("Invalid request: {0}")]
    BadRequest(String),

    /// Missing or rejected credential; the reason is only logged
    #[error("Unauthorized")]
    Unauthorized,

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("{error}: {details}")]
    Internal { error: String, details: String },
}

impl ApiError {
    /// Internal error with the underlying message as details
    pub fn internal(error: impl Into<String>, source: impl std::fmt::Display) -> Self {
        ApiError::Internal {
            error: error.into(),
            details: source.to_string(),
        }
    }
}

/// API error response body
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, error, details) = match self {
            ApiError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg, None),
            ApiError::Unauthorized => (StatusCode::UNAUTHORIZED, "Unauthorized".to_string(), None),
            ApiError::NotFound(msg) => (StatusCode::NOT_FOUND, msg, None),
            ApiError::Internal { error, details } => {
                (StatusCode::INTERNAL_SERVER_ERROR, error, Some(details))
            }
        };

        (status, Json(ErrorResponse { error, details })).into_response()
    }
}

/// Message for any body that cannot be used; the cause is only logged
pub const INVALID_BODY: &str = "Invalid request body";

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        warn!(status = %rejection.status(), reason = %rejection.body_text(), "Rejected request body");
        ApiError::BadRequest(INVALID_BODY.into())
    }
}

impl From<profile_core::CoreError> for ApiError {
    fn from(err: profile_core::CoreError) -> Self {
        warn!(reason = %err, "Rejected request body");
        ApiError::BadRequest(INVALID_BODY.into())
    }
}

//! HTTP error responses for stretto-sync
//!
//! Maps the shared error taxonomy onto status codes:
//! validation 400, not found 404, conflict 409, store and remote API 500.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use std::fmt::Display;
use stretto_common::{Error as CommonError, FieldError};
use thiserror::Error;
use tracing::error;

/// Handler result type
pub type ApiResult<T> = Result<T, ApiError>;

/// API error type
#[derive(Debug, Error)]
pub enum ApiError {
    /// Payload failed schema validation (400)
    #[error("Validation failed")]
    Validation(Vec<FieldError>),

    /// Request could not be interpreted (400)
    #[error("Bad request: {0}")]
    BadRequest(String),

    /// Referenced page or record absent (404)
    #[error("Not found: {0}")]
    NotFound(String),

    /// Unique key already taken (409)
    #[error("Conflict: {0}")]
    Conflict(String),

    /// Store or remote API failure (500)
    #[error("{error}: {detail}")]
    Internal { error: String, detail: String },
}

impl ApiError {
    /// 500 with a route-specific message and the underlying cause
    pub fn internal(error: impl Into<String>, cause: impl Display) -> Self {
        ApiError::Internal {
            error: error.into(),
            detail: cause.to_string(),
        }
    }

    /// Map a shared error, using `context` as the message of a 500
    pub fn from_common(err: CommonError, context: &str) -> Self {
        match err {
            CommonError::Validation(details) => ApiError::Validation(details),
            CommonError::InvalidPayload(message) => ApiError::BadRequest(message),
            CommonError::NotFound(message) => ApiError::NotFound(message),
            CommonError::Conflict(message) => ApiError::Conflict(message),
            other => ApiError::internal(context, other),
        }
    }

    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::Validation(_) | ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::Conflict(_) => StatusCode::CONFLICT,
            ApiError::Internal { .. } => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl From<CommonError> for ApiError {
    fn from(err: CommonError) -> Self {
        ApiError::from_common(err, "Internal server error")
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        let body = match self {
            ApiError::Validation(details) => json!({
                "ok": false,
                "error": "Validation failed",
                "details": details,
            }),
            ApiError::BadRequest(message) | ApiError::NotFound(message) => json!({
                "error": message,
            }),
            ApiError::Conflict(message) => json!({
                "ok": false,
                "error": message,
            }),
            ApiError::Internal { error: message, detail } => {
                error!("{}: {}", message, detail);
                json!({
                    "error": message,
                    "detail": detail,
                })
            }
        };

        (status, Json(body)).into_response()
    }
}

//! Error types for the form cache service
//!
//! Provides unified error handling using thiserror. `FormError` and
//! `BackingError` are internal taxonomies; `ApiError` is the only type
//! that crosses the HTTP boundary and carries the uniform error envelope.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

// == Form Error Enum ==
/// Failure modes of the draft-form store.
///
/// None of these escape the public `FormCache` API; they are logged and
/// degraded there. The inner `FormStore` returns them so callers can tell
/// the cases apart.
#[derive(Error, Debug)]
pub enum FormError {
    /// No record exists for the form id
    #[error("Form not found: {0}")]
    NotFound(String),

    /// Record exists but its age exceeds the expiration window
    #[error("Form expired: {0}")]
    Expired(String),

    /// Record exists but was already submitted
    #[error("Form already submitted: {0}")]
    AlreadySubmitted(String),

    /// Merged record would exceed the per-record byte budget
    #[error("Form record for '{form_id}' is {size} bytes, over the {limit} byte limit")]
    RecordTooLarge {
        form_id: String,
        size: usize,
        limit: usize,
    },

    /// Record could not be serialized for the size check or persistence
    #[error("Serialization failed: {0}")]
    Serialization(#[from] serde_json::Error),
}

// == Backing Error Enum ==
/// Failure modes of the counter/TTL backing store used by middleware.
#[derive(Error, Debug)]
pub enum BackingError {
    /// Backing store could not be reached or refused the operation
    #[error("Backing store unavailable: {0}")]
    Unavailable(String),

    /// INCR was issued against a key holding a non-integer value
    #[error("Value at key '{0}' is not an integer")]
    NotAnInteger(String),
}

// == Api Error Enum ==
/// Unified error type for the HTTP API.
#[derive(Error, Debug)]
pub enum ApiError {
    /// Request body failed validation
    #[error("Validation failed: {0}")]
    Validation(String),

    /// Missing or invalid credentials
    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    /// Request refused (e.g. CSRF token mismatch)
    #[error("Forbidden: {0}")]
    Forbidden(String),

    /// Requested resource does not exist
    #[error("Not found: {0}")]
    NotFound(String),

    /// Semantically invalid request content
    #[error("Unprocessable: {0}")]
    Unprocessable(String),

    /// Fixed-window rate limit exceeded
    #[error("Rate limit exceeded: {0}")]
    RateLimited(String),

    /// Internal server error
    #[error("Internal error: {0}")]
    Internal(String),
}

impl ApiError {
    /// Stable machine-readable code carried in the error envelope.
    pub fn code(&self) -> &'static str {
        match self {
            ApiError::Validation(_) => "VALIDATION_ERROR",
            ApiError::Unauthorized(_) => "UNAUTHORIZED",
            ApiError::Forbidden(_) => "FORBIDDEN",
            ApiError::NotFound(_) => "NOT_FOUND",
            ApiError::Unprocessable(_) => "UNPROCESSABLE",
            ApiError::RateLimited(_) => "RATE_LIMITED",
            ApiError::Internal(_) => "INTERNAL_ERROR",
        }
    }
}

// == IntoResponse Implementation ==
impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = match &self {
            ApiError::Validation(_) => StatusCode::BAD_REQUEST,
            ApiError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            ApiError::Forbidden(_) => StatusCode::FORBIDDEN,
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::Unprocessable(_) => StatusCode::UNPROCESSABLE_ENTITY,
            ApiError::RateLimited(_) => StatusCode::TOO_MANY_REQUESTS,
            ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };

        let body = Json(json!({
            "status": "error",
            "error": {
                "message": self.to_string(),
                "code": self.code(),
            }
        }));

        (status, body).into_response()
    }
}

// == Result Type Aliases ==
/// Convenience Result type for form store operations.
pub type FormResult<T> = std::result::Result<T, FormError>;

/// Convenience Result type for backing store operations.
pub type BackingResult<T> = std::result::Result<T, BackingError>;

/// Convenience Result type for API handlers.
pub type ApiResult<T> = std::result::Result<T, ApiError>;

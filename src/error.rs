//! Admin error types with HTTP status code mapping.
//!
//! [`AdminError`] is the central error type of the service. Each variant
//! maps to a specific HTTP status code and structured JSON error response.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::Serialize;
use utoipa::ToSchema;

use crate::domain::FieldErrors;

/// Structured JSON error response body.
///
/// All error responses follow this shape:
/// ```json
/// {
///   "error": {
///     "code": 1001,
///     "message": "validation failed: title: Title is required",
///     "details": { "title": "Title is required" }
///   }
/// }
/// ```
#[derive(Debug, Serialize, ToSchema)]
pub struct ErrorResponse {
    /// Structured error payload.
    pub error: ErrorBody,
}

/// Inner error body with numeric code and human-readable message.
#[derive(Debug, Serialize, ToSchema)]
pub struct ErrorBody {
    /// Numeric error code (see [`AdminError`] code ranges).
    pub code: u32,
    /// Human-readable error message.
    pub message: String,
    /// Optional machine-readable details, e.g. per-field validation errors.
    #[serde(skip_serializing_if = "Option::is_none")]
    #[schema(value_type = Option<Object>)]
    pub details: Option<serde_json::Value>,
}

/// Server-side error enum with HTTP status code mapping.
///
/// # Error Code Ranges
///
/// | Range     | Category        | HTTP Status                  |
/// |-----------|-----------------|------------------------------|
/// | 1000–1099 | Validation      | 400 Bad Request / 413        |
/// | 1100–1199 | Authentication  | 401 Unauthorized / 403       |
/// | 2000–2999 | Not Found       | 404 Not Found                |
/// | 3000–3999 | Server          | 500 / 502 / 503              |
#[derive(Debug, thiserror::Error)]
pub enum AdminError {
    /// One or more form fields failed validation.
    #[error("validation failed: {0}")]
    Validation(FieldErrors),

    /// Request could not be interpreted.
    #[error("invalid request: {0}")]
    InvalidRequest(String),

    /// Uploaded file is not an acceptable image.
    #[error("invalid image: {0}")]
    InvalidImage(String),

    /// Uploaded image exceeds the configured size cap.
    #[error("image too large: {size} bytes (max {max} bytes)")]
    ImageTooLarge {
        /// Size of the rejected upload.
        size: usize,
        /// Configured maximum.
        max: usize,
    },

    /// Unknown username or wrong password.
    #[error("invalid username or password")]
    InvalidCredentials,

    /// No admin session is attached to the request.
    #[error("not authenticated")]
    NotAuthenticated,

    /// The admin account exists but is not active.
    #[error("admin account is not active")]
    AccountInactive,

    /// Event with the given ID was not found.
    #[error("event not found: {0}")]
    EventNotFound(uuid::Uuid),

    /// Prize with the given ID was not found.
    #[error("prize not found: {0}")]
    PrizeNotFound(uuid::Uuid),

    /// Data store request failed.
    #[error("persistence error: {0}")]
    Persistence(String),

    /// Blob storage request failed.
    #[error("storage error: {0}")]
    Storage(String),

    /// Session store failure.
    #[error("session error: {0}")]
    Session(String),

    /// Realtime change feed is not available.
    #[error("change feed unavailable: {0}")]
    FeedUnavailable(String),

    /// Internal server error.
    #[error("internal error: {0}")]
    Internal(String),
}

impl AdminError {
    /// Returns the numeric error code for this variant.
    #[must_use]
    pub const fn error_code(&self) -> u32 {
        match self {
            Self::Validation(_) => 1001,
            Self::InvalidRequest(_) => 1002,
            Self::InvalidImage(_) => 1003,
            Self::ImageTooLarge { .. } => 1004,
            Self::InvalidCredentials => 1101,
            Self::NotAuthenticated => 1102,
            Self::AccountInactive => 1103,
            Self::EventNotFound(_) => 2001,
            Self::PrizeNotFound(_) => 2002,
            Self::Internal(_) => 3000,
            Self::Persistence(_) => 3001,
            Self::Storage(_) => 3002,
            Self::Session(_) => 3003,
            Self::FeedUnavailable(_) => 3004,
        }
    }

    /// Returns the HTTP status code for this variant.
    #[must_use]
    pub const fn status_code(&self) -> StatusCode {
        match self {
            Self::Validation(_) | Self::InvalidRequest(_) | Self::InvalidImage(_) => {
                StatusCode::BAD_REQUEST
            }
            Self::ImageTooLarge { .. } => StatusCode::PAYLOAD_TOO_LARGE,
            Self::InvalidCredentials | Self::NotAuthenticated => StatusCode::UNAUTHORIZED,
            Self::AccountInactive => StatusCode::FORBIDDEN,
            Self::EventNotFound(_) | Self::PrizeNotFound(_) => StatusCode::NOT_FOUND,
            Self::Persistence(_) | Self::Session(_) | Self::Internal(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
            Self::Storage(_) => StatusCode::BAD_GATEWAY,
            Self::FeedUnavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
        }
    }

    fn details(&self) -> Option<serde_json::Value> {
        match self {
            Self::Validation(errors) => serde_json::to_value(errors).ok(),
            _ => None,
        }
    }
}

impl From<FieldErrors> for AdminError {
    fn from(errors: FieldErrors) -> Self {
        Self::Validation(errors)
    }
}

impl IntoResponse for AdminError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        if status.is_server_error() {
            tracing::error!(code = self.error_code(), error = %self, "request failed");
        }
        let body = ErrorResponse {
            error: ErrorBody {
                code: self.error_code(),
                message: self.to_string(),
                details: self.details(),
            },
        };
        let mut response = axum::Json(body).into_response();
        *response.status_mut() = status;
        response
    }
}

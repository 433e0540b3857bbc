//! API error types with IntoResponse.
//!
//! Errors are converted to JSON responses with appropriate status
//! codes. Store failures are logged in full and returned as a
//! generic message.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;

use rolodex_core::{SheetError, ValidationError};

use crate::db::DbError;

/// API error type with automatic HTTP status mapping.
#[derive(Debug)]
pub enum ApiError {
    /// Malformed request shape or failed field validation (400)
    BadRequest(String),

    /// Resource not found (404)
    NotFound(String),

    /// Uniqueness collision (409)
    Conflict(String),

    /// Store failure (500, logged)
    Database(DbError),

    /// Anything else that went wrong server-side (500, logged)
    Internal(String),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, error, message) = match self {
            Self::BadRequest(msg) => (StatusCode::BAD_REQUEST, "bad_request", msg),
            Self::NotFound(msg) => (StatusCode::NOT_FOUND, "not_found", msg),
            Self::Conflict(msg) => (StatusCode::CONFLICT, "conflict", msg),
            Self::Database(err) => {
                tracing::error!("Database error: {}", err);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "internal_error",
                    "an internal error occurred".to_string(),
                )
            }
            Self::Internal(msg) => {
                tracing::error!("Internal error: {}", msg);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "internal_error",
                    "an internal error occurred".to_string(),
                )
            }
        };

        let body = Json(json!({
            "error": error,
            "message": message,
        }));

        (status, body).into_response()
    }
}

impl From<ValidationError> for ApiError {
    fn from(err: ValidationError) -> Self {
        Self::BadRequest(err.to_string())
    }
}

impl From<DbError> for ApiError {
    fn from(err: DbError) -> Self {
        match err {
            DbError::NotFound { resource, id } => {
                Self::NotFound(format!("{resource} '{id}' not found"))
            }
            DbError::Conflict(msg) => Self::Conflict(msg.to_string()),
            err => Self::Database(err),
        }
    }
}

impl From<SheetError> for ApiError {
    fn from(err: SheetError) -> Self {
        match err {
            SheetError::NoRecords => Self::NotFound("no contacts found".to_string()),
            err => Self::Internal(err.to_string()),
        }
    }
}

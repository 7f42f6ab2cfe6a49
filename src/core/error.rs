//! Error type system for linkshelf
//!
//! This module provides:
//! - Hierarchical error classification
//! - HTTP status code mapping
//! - Generic public messages that never leak internal detail
//! - Error responses carrying a trace ID

use crate::auth::error::AuthError;
use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use uuid::Uuid;

/// Field name -> human readable problem
pub type FieldErrors = BTreeMap<String, String>;

/// Main error type for the linkshelf service
#[derive(Debug, thiserror::Error)]
pub enum ShelfError {
    #[error("Database error: {0}")]
    DatabaseError(#[from] rusqlite::Error),

    #[error("Connection pool error: {0}")]
    PoolError(#[from] r2d2::Error),

    // API-related errors
    #[error("Validation failed")]
    ValidationError(FieldErrors),

    #[error("Authentication failed: {0}")]
    Auth(#[from] AuthError),

    /// Uniform rejection used by the auth middleware
    #[error("Unauthorized")]
    Unauthorized,

    #[error("Resource not found: {0}")]
    NotFound(String),

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Timeout: {0}")]
    Timeout(String),

    // I/O errors
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Task error: {0}")]
    TaskError(String),
}

impl ShelfError {
    /// Get the HTTP status code for this error
    pub fn status_code(&self) -> StatusCode {
        match self {
            ShelfError::ValidationError(_) => StatusCode::BAD_REQUEST,

            ShelfError::Auth(e) => e.status_code(),
            ShelfError::Unauthorized => StatusCode::UNAUTHORIZED,

            ShelfError::NotFound(_) => StatusCode::NOT_FOUND,
            ShelfError::Conflict(_) => StatusCode::CONFLICT,
            ShelfError::Timeout(_) => StatusCode::REQUEST_TIMEOUT,

            ShelfError::DatabaseError(_)
            | ShelfError::PoolError(_)
            | ShelfError::IoError(_)
            | ShelfError::TaskError(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Get the error type name for API responses
    pub fn error_type(&self) -> &'static str {
        match self {
            ShelfError::DatabaseError(_) | ShelfError::PoolError(_) => "DatabaseError",
            ShelfError::ValidationError(_) => "ValidationError",
            ShelfError::Auth(e) => e.error_type(),
            ShelfError::Unauthorized => "AuthenticationError",
            ShelfError::NotFound(_) => "NotFound",
            ShelfError::Conflict(_) => "Conflict",
            ShelfError::Timeout(_) => "Timeout",
            ShelfError::IoError(_) => "IoError",
            ShelfError::TaskError(_) => "TaskError",
        }
    }

    /// Message safe to show to the caller.
    ///
    /// Server-side failures collapse to a generic text; auth failures use the
    /// kind's public message so callers cannot tell which check failed.
    pub fn public_message(&self) -> String {
        match self {
            ShelfError::Auth(e) => e.public_message().to_string(),
            ShelfError::Unauthorized => AuthError::UNAUTHORIZED_MESSAGE.to_string(),
            e if e.status_code().is_server_error() => "Internal server error".to_string(),
            e => e.to_string(),
        }
    }

    fn details(&self) -> Option<serde_json::Value> {
        match self {
            ShelfError::ValidationError(fields) => serde_json::to_value(fields).ok(),
            _ => None,
        }
    }
}

/// Error response structure for API endpoints
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    /// Error type identifier
    pub error: String,
    /// Human-readable error message
    pub message: String,
    /// Optional additional details (field errors for validation failures)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<serde_json::Value>,
    /// Unique trace ID for this error
    pub trace_id: String,
}

impl ErrorResponse {
    /// Create a new error response with a generated trace ID
    pub fn new(error: String, message: String) -> Self {
        Self {
            error,
            message,
            details: None,
            trace_id: Uuid::new_v4().to_string(),
        }
    }

    /// Create an error response from a ShelfError
    pub fn from_error(error: &ShelfError) -> Self {
        Self {
            details: error.details(),
            ..Self::new(error.error_type().to_string(), error.public_message())
        }
    }
}

impl IntoResponse for ShelfError {
    fn into_response(self) -> Response {
        let status_code = self.status_code();
        let error_response = ErrorResponse::from_error(&self);

        if status_code.is_server_error() {
            tracing::error!(
                error_type = self.error_type(),
                trace_id = %error_response.trace_id,
                status_code = %status_code,
                "Request failed: {}",
                self
            );
        } else {
            tracing::warn!(
                error_type = self.error_type(),
                trace_id = %error_response.trace_id,
                status_code = %status_code,
                "Request rejected: {}",
                self
            );
        }

        (status_code, Json(error_response)).into_response()
    }
}

/// Result type alias for operations that can fail with ShelfError
pub type Result<T> = std::result::Result<T, ShelfError>;

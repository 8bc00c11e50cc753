//! Application error types for Cinescope.
//!
//! Provides a unified error type that implements `IntoResponse` for Axum.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use thiserror::Error;

use crate::db::DbError;

/// Application-wide error type
#[derive(Error, Debug)]
pub enum AppError {
    /// Database-related errors
    #[error("Database error: {0}")]
    Database(#[from] DbError),

    /// SQLite-specific errors (for direct rusqlite usage)
    #[error("Database error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    /// Configuration loading/parsing errors
    #[error("Configuration error: {0}")]
    Config(#[from] config::ConfigError),

    /// Resource not found
    #[error("Not found: {0}")]
    NotFound(String),

    /// Invalid request data
    #[error("Bad request: {0}")]
    BadRequest(String),

    /// The movie metadata provider failed or answered with an error
    #[error("Upstream error: {0}")]
    Upstream(String),

    /// Internal server error
    #[error("Internal error: {0}")]
    Internal(String),
}

impl AppError {
    pub fn status(&self) -> StatusCode {
        match self {
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::BadRequest(_) => StatusCode::BAD_REQUEST,
            AppError::Upstream(_) => StatusCode::BAD_GATEWAY,
            AppError::Database(_)
            | AppError::Sqlite(_)
            | AppError::Config(_)
            | AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

/// JSON error response body
#[derive(Serialize)]
struct ErrorResponse {
    error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    message: Option<String>,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();
        let (error, message) = match &self {
            AppError::Database(e) => {
                // Log full error details but don't expose to client
                tracing::error!("Database error: {:?}", e);
                ("database_error", None)
            }
            AppError::Sqlite(e) => {
                tracing::error!("SQLite error: {:?}", e);
                ("database_error", None)
            }
            AppError::Config(e) => {
                tracing::error!("Config error: {:?}", e);
                ("configuration_error", None)
            }
            AppError::NotFound(resource) => ("not_found", Some(resource.clone())),
            // Bad request messages are safe to expose (client-caused errors)
            AppError::BadRequest(msg) => ("bad_request", Some(msg.clone())),
            AppError::Upstream(msg) => {
                tracing::warn!("Upstream error: {}", msg);
                ("upstream_error", None)
            }
            AppError::Internal(msg) => {
                tracing::error!("Internal error: {}", msg);
                ("internal_error", None)
            }
        };

        let body = ErrorResponse {
            error: error.to_string(),
            message,
        };

        (status, Json(body)).into_response()
    }
}

/// Result type alias for handlers
pub type Result<T> = std::result::Result<T, AppError>;

//! Error handling utilities for route handlers

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::{Deserialize, Serialize};

use crate::services::json_store::StoreError;
use crate::services::media::MediaError;

/// `{"message": "..."}` body used for every error and for bare acknowledgements
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MessageBody {
    pub message: String,
}

impl MessageBody {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

/// Every failure a handler can surface.
///
/// Client errors carry the message shown to the caller; the remaining variants
/// are internal failures that render as 500.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("{0}")]
    BadRequest(String),
    #[error("{0}")]
    Forbidden(String),
    #[error("{0}")]
    NotFound(String),
    #[error("media backend error: {0}")]
    Media(#[from] MediaError),
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
    #[error("store error: {0}")]
    Store(#[from] StoreError),
    #[error("{0}")]
    Internal(String),
}

impl ApiError {
    pub fn video_not_found() -> Self {
        ApiError::NotFound("Video not found.".to_string())
    }

    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::Forbidden(_) => StatusCode::FORBIDDEN,
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::Media(_)
            | ApiError::Database(_)
            | ApiError::Store(_)
            | ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        let message = if status.is_server_error() {
            tracing::error!(error = %self, "request failed");
            format!("Server error: {}", self)
        } else {
            self.to_string()
        };

        (status, Json(MessageBody::new(message))).into_response()
    }
}

/// Extension trait for logging errors and converting to ApiError
pub trait LogErr<T> {
    /// Log error with context and return a 500
    fn log_500(self, context: &str) -> Result<T, ApiError>;

    /// Log error with context and return a 400 carrying the context as message
    fn log_400(self, context: &str) -> Result<T, ApiError>;
}

impl<T, E: std::fmt::Display> LogErr<T> for Result<T, E> {
    fn log_500(self, context: &str) -> Result<T, ApiError> {
        self.map_err(|e| {
            tracing::error!("{}: {}", context, e);
            ApiError::Internal(format!("{}: {}", context, e))
        })
    }

    fn log_400(self, context: &str) -> Result<T, ApiError> {
        self.map_err(|e| {
            tracing::warn!("{}: {}", context, e);
            ApiError::BadRequest(context.to_string())
        })
    }
}

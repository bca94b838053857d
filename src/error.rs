//! Application error type and HTTP mapping.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;

pub type Result<T> = std::result::Result<T, AppError>;

#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
    pub message: String,
    pub code: String,
}

#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Authentication error: {message}")]
    Authentication { message: String },

    #[error("Validation error: {message}")]
    Validation { message: String },
}

impl AppError {
    fn status_code(&self) -> StatusCode {
        match self {
            AppError::Database(_) => StatusCode::INTERNAL_SERVER_ERROR,
            AppError::Authentication { .. } => StatusCode::UNAUTHORIZED,
            AppError::Validation { .. } => StatusCode::UNPROCESSABLE_ENTITY,
        }
    }

    fn code(&self) -> &'static str {
        match self {
            AppError::Database(_) => "INTERNAL_ERROR",
            AppError::Authentication { .. } => "AUTHENTICATION_ERROR",
            AppError::Validation { .. } => "VALIDATION_ERROR",
        }
    }

    /// Message safe to expose to callers. Storage failures are collapsed to
    /// a generic message; the underlying error only reaches the logs.
    fn public_message(&self) -> String {
        match self {
            AppError::Database(_) => "internal server error".to_string(),
            AppError::Authentication { message } | AppError::Validation { message } => {
                message.clone()
            }
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status_code();

        if let AppError::Database(ref e) = self {
            tracing::error!("storage error: {}", e);
        }

        let body = ErrorResponse {
            error: status.canonical_reason().unwrap_or("error").to_string(),
            message: self.public_message(),
            code: self.code().to_string(),
        };

        (status, Json(body)).into_response()
    }
}

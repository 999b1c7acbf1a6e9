use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

/// Shown when the resume or the job description is missing at submission.
pub const MISSING_ASSETS_MESSAGE: &str =
    "Missing assets. Please upload a resume and paste the job description.";

/// Catch-all for a failed generative call.
pub const OPTIMIZATION_FAILED_MESSAGE: &str = "Optimization failed. Try a different file format.";

/// The generative provider answered without any text.
pub const EMPTY_RESPONSE_MESSAGE: &str = "The AI failed to generate a response. Please try again.";

/// Application-level error type.
/// Implements `IntoResponse` so Axum handlers can return `Result<T, AppError>`.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Not found: {0}")]
    NotFound(String),

    #[error("{0}")]
    Validation(String),

    #[error("Unauthorized")]
    Unauthorized,

    /// Credential or session rejection reported by the identity provider.
    #[error("{0}")]
    Auth(String),

    #[error("Conflict: {0}")]
    Conflict(String),

    /// The identity provider could not be reached or answered garbage.
    #[error("Identity provider error: {0}")]
    Identity(String),

    /// The generative call failed. Carries the user-facing message.
    #[error("{0}")]
    Optimization(String),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Internal server error: {0}")]
    Internal(#[from] anyhow::Error),
}

impl AppError {
    /// The string a user sees for this error.
    pub fn user_message(&self) -> String {
        match self {
            AppError::NotFound(msg)
            | AppError::Validation(msg)
            | AppError::Auth(msg)
            | AppError::Conflict(msg)
            | AppError::Optimization(msg) => msg.clone(),
            AppError::Unauthorized => "Authentication required".to_string(),
            AppError::Identity(_) => "The identity provider is unavailable".to_string(),
            AppError::Database(_) => "A database error occurred".to_string(),
            AppError::Internal(_) => "An internal server error occurred".to_string(),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code) = match &self {
            AppError::NotFound(_) => (StatusCode::NOT_FOUND, "NOT_FOUND"),
            AppError::Validation(_) => (StatusCode::BAD_REQUEST, "VALIDATION_ERROR"),
            AppError::Unauthorized => (StatusCode::UNAUTHORIZED, "UNAUTHORIZED"),
            AppError::Auth(_) => (StatusCode::UNAUTHORIZED, "AUTH_ERROR"),
            AppError::Conflict(_) => (StatusCode::CONFLICT, "CONFLICT"),
            AppError::Identity(msg) => {
                tracing::error!("Identity provider error: {msg}");
                (StatusCode::BAD_GATEWAY, "IDENTITY_ERROR")
            }
            AppError::Optimization(msg) => {
                tracing::error!("Optimization error: {msg}");
                (StatusCode::BAD_GATEWAY, "OPTIMIZATION_FAILED")
            }
            AppError::Database(e) => {
                tracing::error!("Database error: {e}");
                (StatusCode::INTERNAL_SERVER_ERROR, "DATABASE_ERROR")
            }
            AppError::Internal(e) => {
                tracing::error!("Internal error: {e:?}");
                (StatusCode::INTERNAL_SERVER_ERROR, "INTERNAL_ERROR")
            }
        };

        let body = Json(json!({
            "error": {
                "code": code,
                "message": self.user_message()
            }
        }));

        (status, body).into_response()
    }
}

//! Application error types.

use axum::{
    Json,
    extract::rejection::JsonRejection,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use hackr_core::audit::AuditError;
use hackr_core::auth::{AuthError, FieldErrors, TokenError};
use thiserror::Error;
use tracing::error;

use crate::models::ErrorResponse;

/// Convenience alias for handler return types.
pub type AppResult<T> = Result<T, AppError>;

/// Application-level errors with HTTP status mapping.
///
/// All three token failures map to 401 and are told apart by the `error`
/// field of the body. Server-side failures carry detail for the log only.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Validation error")]
    Validation(FieldErrors),

    #[error("Email already registered")]
    DuplicateEmail,

    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    #[error(transparent)]
    Token(TokenError),

    #[error("Forbidden: {0}")]
    Forbidden(String),

    #[error("User creation failed: {0}")]
    CreationFailed(String),

    #[error("Token issuance failed: {0}")]
    TokenIssuanceFailed(String),

    #[error("Upstream failure: {0}")]
    Upstream(String),

    #[error("Internal server error: {0}")]
    Internal(String),
}

impl AppError {
    pub fn status(&self) -> StatusCode {
        match self {
            AppError::Validation(_) | AppError::DuplicateEmail => StatusCode::UNPROCESSABLE_ENTITY,
            AppError::Unauthorized(_) | AppError::Token(_) => StatusCode::UNAUTHORIZED,
            AppError::Forbidden(_) => StatusCode::FORBIDDEN,
            AppError::Upstream(_) => StatusCode::SERVICE_UNAVAILABLE,
            AppError::CreationFailed(_)
            | AppError::TokenIssuanceFailed(_)
            | AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            error!(status = status.as_u16(), error = %self, "request failed");
        }

        let (error, message, messages) = match self {
            AppError::Validation(fields) => (
                "Validation failed",
                "The given data was invalid.".to_string(),
                Some(fields),
            ),
            AppError::DuplicateEmail => (
                "User already exists",
                "The email has already been taken.".to_string(),
                None,
            ),
            AppError::Unauthorized(m) => ("Unauthorized", m, None),
            AppError::Token(kind) => match kind {
                TokenError::Absent => ("Token absent", "A bearer token is required.".to_string(), None),
                TokenError::Invalid => ("Token invalid", "The bearer token is invalid.".to_string(), None),
                TokenError::Expired => ("Token expired", "The bearer token has expired.".to_string(), None),
            },
            AppError::Forbidden(_) => ("Access denied", "Admins only.".to_string(), None),
            AppError::CreationFailed(_) => (
                "User creation failed",
                "User creation failed. Please try again.".to_string(),
                None,
            ),
            AppError::TokenIssuanceFailed(_) => (
                "Could not create token",
                "Could not create token.".to_string(),
                None,
            ),
            AppError::Upstream(_) => (
                "Service unavailable",
                "A backing service is unavailable.".to_string(),
                None,
            ),
            AppError::Internal(_) => (
                "Internal server error",
                "Internal server error".to_string(),
                None,
            ),
        };

        let body = Json(ErrorResponse {
            error: error.to_string(),
            message,
            messages,
        });
        (status, body).into_response()
    }
}

impl From<TokenError> for AppError {
    fn from(e: TokenError) -> Self {
        AppError::Token(e)
    }
}

/// Malformed request bodies (bad JSON, wrong field types, missing
/// content type) are validation failures on `body`.
impl From<JsonRejection> for AppError {
    fn from(rejection: JsonRejection) -> Self {
        let mut fields = FieldErrors::new();
        fields.insert("body".to_string(), vec![rejection.body_text()]);
        AppError::Validation(fields)
    }
}

impl From<sqlx::Error> for AppError {
    fn from(e: sqlx::Error) -> Self {
        AppError::Upstream(e.to_string())
    }
}

impl From<AuthError> for AppError {
    fn from(e: AuthError) -> Self {
        match e {
            AuthError::CredentialError => AppError::Unauthorized("Invalid credentials".into()),
            AuthError::Token(kind) => AppError::Token(kind),
            AuthError::AccessDenied(denied) => AppError::Forbidden(denied.to_string()),
            AuthError::Validation(fields) => AppError::Validation(fields),
            AuthError::DuplicateEmail => AppError::DuplicateEmail,
            AuthError::TokenIssuance(msg) => AppError::TokenIssuanceFailed(msg),
            AuthError::DbError(e) => AppError::from(e),
            AuthError::Internal(msg) => AppError::Internal(msg),
        }
    }
}

impl From<AuditError> for AppError {
    fn from(e: AuditError) -> Self {
        match e {
            AuditError::AccessDenied(denied) => AppError::Forbidden(denied.to_string()),
            AuditError::DbError(e) => AppError::from(e),
            other => AppError::Internal(other.to_string()),
        }
    }
}

//! Authentication and authorization logic.
//!
//! Password hashing, registration validation, bearer token issuance and
//! verification, and the request-level gateway that turns an
//! `Authorization` header into an [`Identity`](crate::models::auth::Identity).

pub mod gateway;
pub mod jwt;
pub mod password;
pub mod validation;

use std::collections::BTreeMap;

use thiserror::Error;

/// Per-field validation messages, keyed by input field name.
pub type FieldErrors = BTreeMap<String, Vec<String>>;

/// Why a bearer token was not accepted.
///
/// The three kinds are kept apart so callers can report each one distinctly.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum TokenError {
    #[error("Token absent")]
    Absent,

    #[error("Token invalid")]
    Invalid,

    #[error("Token expired")]
    Expired,
}

/// Caller lacks a required role.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Access denied: requires role '{role}'")]
pub struct AccessDenied {
    pub role: String,
}

/// Authentication errors.
#[derive(Debug, Error)]
pub enum AuthError {
    #[error("Invalid credentials")]
    CredentialError,

    #[error(transparent)]
    Token(#[from] TokenError),

    #[error(transparent)]
    AccessDenied(#[from] AccessDenied),

    #[error("Validation failed")]
    Validation(FieldErrors),

    #[error("Email already registered")]
    DuplicateEmail,

    #[error("Token issuance failed: {0}")]
    TokenIssuance(String),

    #[error("Database error: {0}")]
    DbError(#[from] sqlx::Error),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl AuthError {
    /// Single-field validation failure.
    pub fn invalid_field(field: &str, message: impl Into<String>) -> Self {
        let mut errors = FieldErrors::new();
        errors.insert(field.to_string(), vec![message.into()]);
        AuthError::Validation(errors)
    }
}

//! Request-level guard: bearer extraction, token validation, identity
//! resolution, and role checks.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use tracing::debug;

use super::jwt::TokenService;
use super::{AccessDenied, AuthError, TokenError};
use crate::models::auth::Identity;
use crate::store::CredentialStore;

/// Resolves an `Authorization` header value into an [`Identity`].
#[derive(Clone)]
pub struct AuthGateway {
    tokens: TokenService,
    credentials: Arc<dyn CredentialStore>,
}

impl AuthGateway {
    pub fn new(tokens: TokenService, credentials: Arc<dyn CredentialStore>) -> Self {
        Self {
            tokens,
            credentials,
        }
    }

    pub fn tokens(&self) -> &TokenService {
        &self.tokens
    }

    /// Authenticate a request from its raw `Authorization` header.
    ///
    /// Token errors propagate unchanged. A token for a user that no longer
    /// exists is reported as [`TokenError::Invalid`].
    pub async fn authenticate(
        &self,
        authorization: Option<&str>,
        now: DateTime<Utc>,
    ) -> Result<Identity, AuthError> {
        let token = bearer_token(authorization)?;
        let user_id = self.tokens.validate(token, now)?;

        let Some(user) = self.credentials.find_by_id(user_id).await? else {
            debug!(user_id, "token subject not found");
            return Err(TokenError::Invalid.into());
        };
        let roles = self.credentials.roles_for(user_id).await?;

        Ok(Identity { user, roles })
    }
}

/// Extract the token from a `Bearer <token>` header value.
///
/// A missing header, a different scheme, or an empty token all count as no
/// token supplied. The scheme name is case-insensitive.
pub fn bearer_token(authorization: Option<&str>) -> Result<&str, TokenError> {
    let value = authorization.map(str::trim).unwrap_or_default();
    let (scheme, token) = value.split_once(' ').ok_or(TokenError::Absent)?;
    if !scheme.eq_ignore_ascii_case("bearer") {
        return Err(TokenError::Absent);
    }
    let token = token.trim();
    if token.is_empty() {
        return Err(TokenError::Absent);
    }
    Ok(token)
}

/// Exact-match role check.
pub fn require_role(identity: &Identity, role: &str) -> Result<(), AccessDenied> {
    if identity.has_role(role) {
        Ok(())
    } else {
        Err(AccessDenied {
            role: role.to_string(),
        })
    }
}

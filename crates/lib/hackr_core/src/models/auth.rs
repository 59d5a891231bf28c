//! Authentication domain models.
//!
//! These are internal domain models, distinct from the API response shapes in
//! `hackr_api::models`.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

/// Role granting access to the audit log viewer.
pub const ROLE_ADMIN: &str = "admin";

/// Role granted to every newly registered user.
pub const ROLE_USER: &str = "user";

/// Numeric user identifier, assigned by the credential store.
pub type UserId = i64;

/// Domain user. Never carries the password hash.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub id: UserId,
    pub name: String,
    pub email: String,
}

/// User with password hash (for internal auth flows).
#[derive(Debug, Clone)]
pub struct UserWithPassword {
    pub user: User,
    pub password_hash: String,
}

/// Input for the credential store's insert. The password is already hashed.
#[derive(Debug, Clone)]
pub struct NewUser {
    pub name: String,
    pub email: String,
    pub password_hash: String,
}

/// An authenticated caller: the resolved user plus the role names loaded for
/// this request.
#[derive(Debug, Clone)]
pub struct Identity {
    pub user: User,
    pub roles: HashSet<String>,
}

impl Identity {
    /// Exact-match role membership.
    pub fn has_role(&self, role: &str) -> bool {
        self.roles.contains(role)
    }
}

/// JWT claims embedded in access tokens.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TokenClaims {
    /// Subject: user ID (standard JWT `sub` claim), decimal string.
    pub sub: String,
    /// Issued at (unix timestamp).
    pub iat: i64,
    /// Expiry (unix timestamp).
    pub exp: i64,
}

/// A freshly signed access token.
#[derive(Debug, Clone)]
pub struct IssuedToken {
    pub access_token: String,
    /// Lifetime in seconds from issuance.
    pub expires_in: i64,
}

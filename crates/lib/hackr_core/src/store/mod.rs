//! Persistence seams: the credential store and the audit log.
//!
//! Both are trait objects so the API can run against PostgreSQL in
//! production and against [`MemoryStore`] in tests or local development.

pub mod memory;
pub mod postgres;

use std::collections::HashSet;

use async_trait::async_trait;

pub use memory::MemoryStore;
pub use postgres::PgStore;

use crate::audit::AuditError;
use crate::auth::AuthError;
use crate::models::audit::{ActionKind, AuditEntry, AuditRecord, NewAuditRecord};
use crate::models::auth::{NewUser, User, UserId, UserWithPassword};

/// User records and role assignments.
#[async_trait]
pub trait CredentialStore: Send + Sync {
    async fn find_by_email(&self, email: &str) -> Result<Option<UserWithPassword>, AuthError>;

    async fn find_by_id(&self, id: UserId) -> Result<Option<User>, AuthError>;

    /// Insert a user. Fails with [`AuthError::DuplicateEmail`] if the email
    /// is taken; no row is written in that case.
    async fn create(&self, new_user: &NewUser) -> Result<User, AuthError>;

    async fn roles_for(&self, id: UserId) -> Result<HashSet<String>, AuthError>;

    /// Assign a seeded role. Granting a role the user already has is a no-op.
    async fn grant_role(&self, id: UserId, role: &str) -> Result<(), AuthError>;
}

/// Append-only audit storage.
#[async_trait]
pub trait AuditLog: Send + Sync {
    async fn append(&self, record: &NewAuditRecord) -> Result<AuditRecord, AuditError>;

    /// Every record in insertion order.
    async fn list_all(&self) -> Result<Vec<AuditRecord>, AuditError>;

    async fn by_action(&self, kind: ActionKind) -> Result<Vec<AuditEntry>, AuditError>;

    async fn by_user(&self, id_user: UserId) -> Result<Vec<AuditEntry>, AuditError>;
}

//! In-memory store for tests and `--memory` development mode.
//!
//! Mirrors the PostgreSQL schema: seeded `admin`/`user` roles, unique emails,
//! and an append-only log. Contents are lost when the process exits.

use std::collections::{HashMap, HashSet};

use async_trait::async_trait;
use tokio::sync::RwLock;

use super::{AuditLog, CredentialStore};
use crate::audit::AuditError;
use crate::auth::AuthError;
use crate::models::audit::{ActionKind, AuditEntry, AuditRecord, NewAuditRecord};
use crate::models::auth::{NewUser, ROLE_ADMIN, ROLE_USER, User, UserId, UserWithPassword};

#[derive(Default)]
struct Tables {
    users: Vec<UserWithPassword>,
    user_roles: HashMap<UserId, HashSet<String>>,
    log: Vec<AuditRecord>,
}

impl Tables {
    fn user_name(&self, id: UserId) -> Option<&str> {
        self.users
            .iter()
            .find(|u| u.user.id == id)
            .map(|u| u.user.name.as_str())
    }

    fn joined(&self, record: &AuditRecord) -> Result<AuditEntry, AuditError> {
        let user_name = self
            .user_name(record.id_user)
            .ok_or(AuditError::UnknownActor(record.id_user))?;
        Ok(AuditEntry {
            id: record.id,
            action: record.action,
            date: record.date,
            user_name: user_name.to_string(),
        })
    }
}

/// Process-local credential store and audit log.
#[derive(Default)]
pub struct MemoryStore {
    tables: RwLock<Tables>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl CredentialStore for MemoryStore {
    async fn find_by_email(&self, email: &str) -> Result<Option<UserWithPassword>, AuthError> {
        let tables = self.tables.read().await;
        Ok(tables.users.iter().find(|u| u.user.email == email).cloned())
    }

    async fn find_by_id(&self, id: UserId) -> Result<Option<User>, AuthError> {
        let tables = self.tables.read().await;
        Ok(tables
            .users
            .iter()
            .find(|u| u.user.id == id)
            .map(|u| u.user.clone()))
    }

    async fn create(&self, new_user: &NewUser) -> Result<User, AuthError> {
        let mut tables = self.tables.write().await;
        if tables.users.iter().any(|u| u.user.email == new_user.email) {
            return Err(AuthError::DuplicateEmail);
        }
        let user = User {
            id: tables.users.len() as UserId + 1,
            name: new_user.name.clone(),
            email: new_user.email.clone(),
        };
        tables.users.push(UserWithPassword {
            user: user.clone(),
            password_hash: new_user.password_hash.clone(),
        });
        Ok(user)
    }

    async fn roles_for(&self, id: UserId) -> Result<HashSet<String>, AuthError> {
        let tables = self.tables.read().await;
        Ok(tables.user_roles.get(&id).cloned().unwrap_or_default())
    }

    async fn grant_role(&self, id: UserId, role: &str) -> Result<(), AuthError> {
        if role != ROLE_ADMIN && role != ROLE_USER {
            return Err(AuthError::invalid_field("role", format!("Unknown role '{role}'")));
        }
        let mut tables = self.tables.write().await;
        if !tables.users.iter().any(|u| u.user.id == id) {
            return Err(AuthError::invalid_field("user", format!("Unknown user {id}")));
        }
        tables
            .user_roles
            .entry(id)
            .or_default()
            .insert(role.to_string());
        Ok(())
    }
}

#[async_trait]
impl AuditLog for MemoryStore {
    async fn append(&self, record: &NewAuditRecord) -> Result<AuditRecord, AuditError> {
        let mut tables = self.tables.write().await;
        if tables.user_name(record.id_user).is_none() {
            return Err(AuditError::UnknownActor(record.id_user));
        }
        let row = AuditRecord {
            id: tables.log.len() as i64 + 1,
            id_user: record.id_user,
            action: record.action,
            id_action: record.action.id(),
            date: record.date,
            details: record.details.clone(),
        };
        tables.log.push(row.clone());
        Ok(row)
    }

    async fn list_all(&self) -> Result<Vec<AuditRecord>, AuditError> {
        Ok(self.tables.read().await.log.clone())
    }

    async fn by_action(&self, kind: ActionKind) -> Result<Vec<AuditEntry>, AuditError> {
        let tables = self.tables.read().await;
        tables
            .log
            .iter()
            .filter(|r| r.action == kind)
            .map(|r| tables.joined(r))
            .collect()
    }

    async fn by_user(&self, id_user: UserId) -> Result<Vec<AuditEntry>, AuditError> {
        let tables = self.tables.read().await;
        tables
            .log
            .iter()
            .filter(|r| r.id_user == id_user)
            .map(|r| tables.joined(r))
            .collect()
    }
}

//! PostgreSQL-backed credential store and audit log.

use std::collections::HashSet;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;

use super::{AuditLog, CredentialStore};
use crate::audit::AuditError;
use crate::auth::AuthError;
use crate::models::audit::{ActionKind, AuditEntry, AuditRecord, NewAuditRecord};
use crate::models::auth::{NewUser, User, UserId, UserWithPassword};

/// Store over a shared connection pool. Cheap to clone.
#[derive(Clone)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }
}

type LogRow = (i64, i64, String, i32, DateTime<Utc>, Option<String>);
type EntryRow = (i64, String, DateTime<Utc>, String);

fn parse_action(action: &str) -> Result<ActionKind, AuditError> {
    ActionKind::parse(action).ok_or_else(|| AuditError::UnknownAction(action.to_string()))
}

fn record_from_row(row: LogRow) -> Result<AuditRecord, AuditError> {
    let (id, id_user, action, id_action, date, details) = row;
    Ok(AuditRecord {
        id,
        id_user,
        action: parse_action(&action)?,
        id_action,
        date,
        details,
    })
}

fn entry_from_row(row: EntryRow) -> Result<AuditEntry, AuditError> {
    let (id, action, date, user_name) = row;
    Ok(AuditEntry {
        id,
        action: parse_action(&action)?,
        date,
        user_name,
    })
}

#[async_trait]
impl CredentialStore for PgStore {
    async fn find_by_email(&self, email: &str) -> Result<Option<UserWithPassword>, AuthError> {
        let row = sqlx::query_as::<_, (i64, String, String, String)>(
            "SELECT id, name, email, password_hash FROM users WHERE email = $1",
        )
        .bind(email)
        .fetch_optional(&self.pool)
        .await?;
        Ok(row.map(|(id, name, email, password_hash)| UserWithPassword {
            user: User { id, name, email },
            password_hash,
        }))
    }

    async fn find_by_id(&self, id: UserId) -> Result<Option<User>, AuthError> {
        let row = sqlx::query_as::<_, (i64, String, String)>(
            "SELECT id, name, email FROM users WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(row.map(|(id, name, email)| User { id, name, email }))
    }

    async fn create(&self, new_user: &NewUser) -> Result<User, AuthError> {
        let exists =
            sqlx::query_scalar::<_, bool>("SELECT EXISTS(SELECT 1 FROM users WHERE email = $1)")
                .bind(&new_user.email)
                .fetch_one(&self.pool)
                .await?;
        if exists {
            return Err(AuthError::DuplicateEmail);
        }

        // The unique constraint still catches a concurrent insert of the same email.
        let id = sqlx::query_scalar::<_, i64>(
            "INSERT INTO users (name, email, password_hash) VALUES ($1, $2, $3) RETURNING id",
        )
        .bind(&new_user.name)
        .bind(&new_user.email)
        .bind(&new_user.password_hash)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| match e {
            sqlx::Error::Database(ref db) if db.is_unique_violation() => AuthError::DuplicateEmail,
            other => AuthError::DbError(other),
        })?;

        Ok(User {
            id,
            name: new_user.name.clone(),
            email: new_user.email.clone(),
        })
    }

    async fn roles_for(&self, id: UserId) -> Result<HashSet<String>, AuthError> {
        let rows = sqlx::query_scalar::<_, String>(
            "SELECT r.name FROM roles r \
             JOIN role_user ru ON ru.role_id = r.id \
             WHERE ru.user_id = $1",
        )
        .bind(id)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows.into_iter().collect())
    }

    async fn grant_role(&self, id: UserId, role: &str) -> Result<(), AuthError> {
        let role_id = sqlx::query_scalar::<_, i64>("SELECT id FROM roles WHERE name = $1")
            .bind(role)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| AuthError::invalid_field("role", format!("Unknown role '{role}'")))?;

        sqlx::query(
            "INSERT INTO role_user (user_id, role_id) VALUES ($1, $2) \
             ON CONFLICT DO NOTHING",
        )
        .bind(id)
        .bind(role_id)
        .execute(&self.pool)
        .await
        .map_err(|e| match e {
            sqlx::Error::Database(ref db) if db.is_foreign_key_violation() => {
                AuthError::invalid_field("user", format!("Unknown user {id}"))
            }
            other => AuthError::DbError(other),
        })?;
        Ok(())
    }
}

#[async_trait]
impl AuditLog for PgStore {
    async fn append(&self, record: &NewAuditRecord) -> Result<AuditRecord, AuditError> {
        let id = sqlx::query_scalar::<_, i64>(
            r#"
            INSERT INTO log (id_user, action, id_action, date, details)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING id
            "#,
        )
        .bind(record.id_user)
        .bind(record.action.as_str())
        .bind(record.action.id())
        .bind(record.date)
        .bind(record.details.as_deref())
        .fetch_one(&self.pool)
        .await
        .map_err(|e| match e {
            sqlx::Error::Database(ref db) if db.is_foreign_key_violation() => {
                AuditError::UnknownActor(record.id_user)
            }
            other => AuditError::DbError(other),
        })?;

        Ok(AuditRecord {
            id,
            id_user: record.id_user,
            action: record.action,
            id_action: record.action.id(),
            date: record.date,
            details: record.details.clone(),
        })
    }

    async fn list_all(&self) -> Result<Vec<AuditRecord>, AuditError> {
        let rows = sqlx::query_as::<_, LogRow>(
            "SELECT id, id_user, action, id_action, date, details FROM log ORDER BY id",
        )
        .fetch_all(&self.pool)
        .await?;
        rows.into_iter().map(record_from_row).collect()
    }

    async fn by_action(&self, kind: ActionKind) -> Result<Vec<AuditEntry>, AuditError> {
        let rows = sqlx::query_as::<_, EntryRow>(
            "SELECT l.id, l.action, l.date, u.name \
             FROM log l JOIN users u ON u.id = l.id_user \
             WHERE l.id_action = $1 \
             ORDER BY l.id",
        )
        .bind(kind.id())
        .fetch_all(&self.pool)
        .await?;
        rows.into_iter().map(entry_from_row).collect()
    }

    async fn by_user(&self, id_user: UserId) -> Result<Vec<AuditEntry>, AuditError> {
        let rows = sqlx::query_as::<_, EntryRow>(
            "SELECT l.id, l.action, l.date, u.name \
             FROM log l JOIN users u ON u.id = l.id_user \
             WHERE l.id_user = $1 \
             ORDER BY l.id",
        )
        .bind(id_user)
        .fetch_all(&self.pool)
        .await?;
        rows.into_iter().map(entry_from_row).collect()
    }
}

//! Audit recording and admin-only reporting.
//!
//! Every privileged action that succeeds appends exactly one row through
//! [`AuditRecorder`]. A failed append is an error for the caller: the action is
//! reported as failed rather than completing without a trace.

use std::sync::Arc;

use chrono::Utc;
use thiserror::Error;
use tracing::{error, info};

use crate::auth::AccessDenied;
use crate::auth::gateway::require_role;
use crate::models::audit::{ActionKind, AuditEntry, AuditRecord, NewAuditRecord};
use crate::models::auth::{Identity, ROLE_ADMIN, UserId};
use crate::store::AuditLog;

/// Audit log errors.
#[derive(Debug, Error)]
pub enum AuditError {
    #[error(transparent)]
    AccessDenied(#[from] AccessDenied),

    #[error("Unknown actor {0}")]
    UnknownActor(UserId),

    #[error("Unknown action '{0}' in audit log")]
    UnknownAction(String),

    #[error("Database error: {0}")]
    DbError(#[from] sqlx::Error),
}

/// Appends audit rows stamped with the current time.
#[derive(Clone)]
pub struct AuditRecorder {
    log: Arc<dyn AuditLog>,
}

impl AuditRecorder {
    pub fn new(log: Arc<dyn AuditLog>) -> Self {
        Self { log }
    }

    pub async fn record(
        &self,
        actor: UserId,
        action: ActionKind,
        details: Option<String>,
    ) -> Result<AuditRecord, AuditError> {
        let entry = NewAuditRecord {
            id_user: actor,
            action,
            date: Utc::now(),
            details,
        };
        match self.log.append(&entry).await {
            Ok(record) => {
                info!(actor, action = %action, id = record.id, "audit recorded");
                Ok(record)
            }
            Err(e) => {
                error!(actor, action = %action, error = %e, "audit write failed");
                Err(e)
            }
        }
    }
}

/// Read-only reporting over the audit log. Every query requires the
/// caller to hold the `admin` role.
#[derive(Clone)]
pub struct AdminQuery {
    log: Arc<dyn AuditLog>,
}

impl AdminQuery {
    pub fn new(log: Arc<dyn AuditLog>) -> Self {
        Self { log }
    }

    pub async fn list_all(&self, caller: &Identity) -> Result<Vec<AuditRecord>, AuditError> {
        require_role(caller, ROLE_ADMIN)?;
        self.log.list_all().await
    }

    pub async fn by_action_kind(
        &self,
        caller: &Identity,
        kind: ActionKind,
    ) -> Result<Vec<AuditEntry>, AuditError> {
        require_role(caller, ROLE_ADMIN)?;
        self.log.by_action(kind).await
    }

    /// Records for a raw action code. A code outside the known set matches
    /// no rows.
    pub async fn by_action_id(
        &self,
        caller: &Identity,
        id_action: i32,
    ) -> Result<Vec<AuditEntry>, AuditError> {
        match ActionKind::from_id(id_action) {
            Some(kind) => self.by_action_kind(caller, kind).await,
            None => {
                require_role(caller, ROLE_ADMIN)?;
                Ok(Vec::new())
            }
        }
    }

    pub async fn by_user(
        &self,
        caller: &Identity,
        id_user: UserId,
    ) -> Result<Vec<AuditEntry>, AuditError> {
        require_role(caller, ROLE_ADMIN)?;
        self.log.by_user(id_user).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::auth::{NewUser, ROLE_USER};
    use crate::store::{CredentialStore, MemoryStore};

    async fn setup() -> (Arc<MemoryStore>, Identity, Identity) {
        let store = Arc::new(MemoryStore::new());
        let mut identities = Vec::new();
        for (name, email, role) in [
            ("Root", "root@x.com", ROLE_ADMIN),
            ("Ann", "ann@x.com", ROLE_USER),
        ] {
            let user = store
                .create(&NewUser {
                    name: name.into(),
                    email: email.into(),
                    password_hash: "hash".into(),
                })
                .await
                .unwrap();
            store.grant_role(user.id, role).await.unwrap();
            let roles = store.roles_for(user.id).await.unwrap();
            identities.push(Identity { user, roles });
        }
        let ann = identities.pop().unwrap();
        let admin = identities.pop().unwrap();
        (store, admin, ann)
    }

    #[tokio::test]
    async fn record_appends_one_row() {
        let (store, _admin, ann) = setup().await;
        let recorder = AuditRecorder::new(store.clone());

        let record = recorder
            .record(ann.user.id, ActionKind::CheckEmail, Some("Email checked: a@b.c".into()))
            .await
            .unwrap();
        assert_eq!(record.id_user, ann.user.id);
        assert_eq!(record.id_action, 4);

        let all = store.list_all().await.unwrap();
        assert_eq!(all, vec![record]);
    }

    #[tokio::test]
    async fn admin_queries_require_admin() {
        let (store, admin, ann) = setup().await;
        let recorder = AuditRecorder::new(store.clone());
        recorder
            .record(ann.user.id, ActionKind::Login, None)
            .await
            .unwrap();
        let query = AdminQuery::new(store);

        assert!(matches!(
            query.list_all(&ann).await,
            Err(AuditError::AccessDenied(_))
        ));
        assert!(matches!(
            query.by_action_kind(&ann, ActionKind::Login).await,
            Err(AuditError::AccessDenied(_))
        ));
        assert!(matches!(
            query.by_user(&ann, ann.user.id).await,
            Err(AuditError::AccessDenied(_))
        ));

        assert_eq!(query.list_all(&admin).await.unwrap().len(), 1);
        let by_kind = query
            .by_action_kind(&admin, ActionKind::Login)
            .await
            .unwrap();
        assert_eq!(by_kind[0].user_name, "Ann");
        assert!(query.by_user(&admin, admin.user.id).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn unknown_action_code_is_empty_for_admins_only() {
        let (store, admin, ann) = setup().await;
        AuditRecorder::new(store.clone())
            .record(ann.user.id, ActionKind::Login, None)
            .await
            .unwrap();
        let query = AdminQuery::new(store);

        assert!(query.by_action_id(&admin, 99).await.unwrap().is_empty());
        assert!(matches!(
            query.by_action_id(&ann, 99).await,
            Err(AuditError::AccessDenied(_))
        ));

        let logins = query
            .by_action_id(&admin, ActionKind::Login.id())
            .await
            .unwrap();
        assert_eq!(logins.len(), 1);
    }
}

//! Audit log domain models.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::auth::UserId;

/// Closed set of audited actions.
///
/// Each kind has a stable numeric code stored alongside its name
/// (`id_action`), used by the log viewer's per-action filter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActionKind {
    Register,
    Login,
    GetUserInfo,
    CheckEmail,
    SpamEmail,
    GeneratePassword,
    CheckCommonPassword,
    Domains,
    FakeIdentity,
    RandomPersonImage,
}

impl ActionKind {
    pub const ALL: [ActionKind; 10] = [
        ActionKind::Register,
        ActionKind::Login,
        ActionKind::GetUserInfo,
        ActionKind::CheckEmail,
        ActionKind::SpamEmail,
        ActionKind::GeneratePassword,
        ActionKind::CheckCommonPassword,
        ActionKind::Domains,
        ActionKind::FakeIdentity,
        ActionKind::RandomPersonImage,
    ];

    /// Stable numeric code.
    pub fn id(self) -> i32 {
        match self {
            ActionKind::Register => 1,
            ActionKind::Login => 2,
            ActionKind::GetUserInfo => 3,
            ActionKind::CheckEmail => 4,
            ActionKind::SpamEmail => 5,
            ActionKind::GeneratePassword => 6,
            ActionKind::CheckCommonPassword => 7,
            ActionKind::Domains => 8,
            ActionKind::FakeIdentity => 9,
            ActionKind::RandomPersonImage => 10,
        }
    }

    pub fn from_id(id: i32) -> Option<Self> {
        Self::ALL.into_iter().find(|k| k.id() == id)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            ActionKind::Register => "register",
            ActionKind::Login => "login",
            ActionKind::GetUserInfo => "get_user_info",
            ActionKind::CheckEmail => "check_email",
            ActionKind::SpamEmail => "spam_email",
            ActionKind::GeneratePassword => "generate_password",
            ActionKind::CheckCommonPassword => "check_common_password",
            ActionKind::Domains => "domains",
            ActionKind::FakeIdentity => "fake_identity",
            ActionKind::RandomPersonImage => "random_person_image",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|k| k.as_str() == s)
    }
}

impl fmt::Display for ActionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A row in the audit log. Immutable once written.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AuditRecord {
    pub id: i64,
    pub id_user: UserId,
    pub action: ActionKind,
    pub id_action: i32,
    pub date: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
}

/// Input for an audit append.
#[derive(Debug, Clone)]
pub struct NewAuditRecord {
    pub id_user: UserId,
    pub action: ActionKind,
    pub date: DateTime<Utc>,
    pub details: Option<String>,
}

/// Audit row joined with the actor's display name.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AuditEntry {
    pub id: i64,
    pub action: ActionKind,
    pub date: DateTime<Utc>,
    pub user_name: String,
}

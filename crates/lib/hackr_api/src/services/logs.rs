//! Audit log viewer. Role enforcement lives in `hackr_core::audit::AdminQuery`.

use axum::extract::Path;
use axum::extract::rejection::PathRejection;
use hackr_core::auth::gateway::require_role;
use hackr_core::auth::{AuthError, FieldErrors};
use hackr_core::models::audit::{AuditEntry, AuditRecord};
use hackr_core::models::auth::{Identity, ROLE_ADMIN, UserId};

use crate::AppState;
use crate::error::{AppError, AppResult};

pub async fn list_all(state: &AppState, caller: &Identity) -> AppResult<Vec<AuditRecord>> {
    Ok(state.admin.list_all(caller).await?)
}

/// Records for one action code. Unknown codes yield an empty list.
pub async fn by_action(
    state: &AppState,
    caller: &Identity,
    id_action: i32,
) -> AppResult<Vec<AuditEntry>> {
    Ok(state.admin.by_action_id(caller, id_action).await?)
}

pub async fn by_user(
    state: &AppState,
    caller: &Identity,
    id_user: UserId,
) -> AppResult<Vec<AuditEntry>> {
    Ok(state.admin.by_user(caller, id_user).await?)
}

/// Unwraps a path parameter of an admin-only route.
///
/// A malformed segment is reported as a validation failure on `field`, but
/// only after the role check, so non-admins see 403 for every input.
pub fn admin_path_param<T>(
    caller: &Identity,
    param: Result<Path<T>, PathRejection>,
    field: &str,
) -> AppResult<T> {
    match param {
        Ok(Path(value)) => Ok(value),
        Err(rejection) => {
            require_role(caller, ROLE_ADMIN).map_err(AuthError::from)?;
            let mut fields = FieldErrors::new();
            fields.insert(field.to_string(), vec![rejection.body_text()]);
            Err(AppError::Validation(fields))
        }
    }
}

//! Admin log viewer handlers.

use axum::extract::rejection::PathRejection;
use axum::extract::{Path, State};
use axum::{Extension, Json};
use hackr_core::models::audit::{AuditEntry, AuditRecord};
use hackr_core::models::auth::UserId;

use crate::AppState;
use crate::error::AppResult;
use crate::middleware::auth::AuthenticatedUser;
use crate::services::logs::{self, admin_path_param};

/// `GET /logs`: every audit record.
pub async fn list_logs_handler(
    State(state): State<AppState>,
    Extension(user): Extension<AuthenticatedUser>,
) -> AppResult<Json<Vec<AuditRecord>>> {
    let records = logs::list_all(&state, &user.0).await?;
    Ok(Json(records))
}

/// `GET /log-action/{id_action}`: records for one action code, with actor names.
pub async fn logs_by_action_handler(
    State(state): State<AppState>,
    Extension(user): Extension<AuthenticatedUser>,
    id_action: Result<Path<i32>, PathRejection>,
) -> AppResult<Json<Vec<AuditEntry>>> {
    let id_action = admin_path_param(&user.0, id_action, "id_action")?;
    let entries = logs::by_action(&state, &user.0, id_action).await?;
    Ok(Json(entries))
}

/// `GET /log-user/{id_user}`: records for one actor, with actor names.
pub async fn logs_by_user_handler(
    State(state): State<AppState>,
    Extension(user): Extension<AuthenticatedUser>,
    id_user: Result<Path<UserId>, PathRejection>,
) -> AppResult<Json<Vec<AuditEntry>>> {
    let id_user = admin_path_param(&user.0, id_user, "id_user")?;
    let entries = logs::by_user(&state, &user.0, id_user).await?;
    Ok(Json(entries))
}

//! Authentication service: register/login/identity flows over `hackr_core`.

use chrono::Utc;
use hackr_core::auth::AuthError;
use hackr_core::auth::password::{hash_password, verify_user_password};
use hackr_core::auth::validation::validate_registration;
use hackr_core::models::audit::ActionKind;
use hackr_core::models::auth::{Identity, NewUser, ROLE_USER};
use tracing::{info, warn};

use crate::AppState;
use crate::error::{AppError, AppResult};
use crate::models::{TokenResponse, UserResponse};

/// Register a new account and return its first token.
///
/// `name` and `email` are trimmed before validation and storage. Nothing is
/// written unless validation passes. The new user gets the `user` role.
pub async fn register(
    state: &AppState,
    name: &str,
    email: &str,
    password: &str,
) -> AppResult<TokenResponse> {
    let (name, email) = (name.trim(), email.trim());
    validate_registration(name, email, password)?;

    let plaintext = password.to_string();
    let password_hash = tokio::task::spawn_blocking(move || hash_password(&plaintext))
        .await
        .map_err(blocking_failed)?
        .map_err(creation_failed)?;

    let user = state
        .credentials
        .create(&NewUser {
            name: name.to_string(),
            email: email.to_string(),
            password_hash,
        })
        .await
        .map_err(|e| match e {
            AuthError::DuplicateEmail => AppError::DuplicateEmail,
            other => creation_failed(other),
        })?;

    state
        .credentials
        .grant_role(user.id, ROLE_USER)
        .await
        .map_err(creation_failed)?;

    let token = state.gateway.tokens().issue(user.id, Utc::now())?;

    state
        .recorder
        .record(user.id, ActionKind::Register, None)
        .await?;

    info!(user_id = user.id, "user registered");
    Ok(token.into())
}

/// Authenticate with email + password.
///
/// Unknown email and wrong password produce the same error. The email is
/// trimmed; the password is compared as given.
pub async fn login(state: &AppState, email: &str, password: &str) -> AppResult<TokenResponse> {
    let Some(user) = state.credentials.find_by_email(email.trim()).await? else {
        return Err(AuthError::CredentialError.into());
    };

    let candidate = password.to_string();
    let (user, matches) = tokio::task::spawn_blocking(move || {
        let matches = verify_user_password(&user, &candidate);
        (user, matches)
    })
    .await
    .map_err(blocking_failed)?;

    if !matches? {
        warn!(user_id = user.user.id, "login rejected: wrong password");
        return Err(AuthError::CredentialError.into());
    }

    let token = state.gateway.tokens().issue(user.user.id, Utc::now())?;

    state
        .recorder
        .record(user.user.id, ActionKind::Login, None)
        .await?;

    Ok(token.into())
}

/// Public fields of the authenticated caller.
pub async fn me(state: &AppState, identity: Identity) -> AppResult<UserResponse> {
    state
        .recorder
        .record(identity.user.id, ActionKind::GetUserInfo, None)
        .await?;
    Ok(identity.user.into())
}

fn blocking_failed(e: tokio::task::JoinError) -> AppError {
    AppError::Internal(format!("password hashing task failed: {e}"))
}

fn creation_failed(e: AuthError) -> AppError {
    AppError::CreationFailed(e.to_string())
}

//! Authentication middleware: Bearer token extraction and identity resolution.

use axum::http::header::AUTHORIZATION;
use axum::{
    extract::{Request, State},
    middleware::Next,
    response::Response,
};
use chrono::Utc;
use hackr_core::auth::TokenError;
use hackr_core::models::auth::Identity;

use crate::AppState;
use crate::error::AppError;

/// The resolved caller, stored in request extensions.
#[derive(Debug, Clone)]
pub struct AuthenticatedUser(pub Identity);

/// Axum middleware: reads `Authorization: Bearer <token>`, authenticates it
/// through the gateway, and injects `AuthenticatedUser` into request
/// extensions.
pub async fn require_auth(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Result<Response, AppError> {
    let header = match request.headers().get(AUTHORIZATION) {
        None => None,
        Some(value) => Some(value.to_str().map_err(|_| TokenError::Invalid)?),
    };

    let identity = state.gateway.authenticate(header, Utc::now()).await?;

    request.extensions_mut().insert(AuthenticatedUser(identity));

    Ok(next.run(request).await)
}

//! # hackr_api
//!
//! HTTP API library for hackr.

pub mod config;
pub mod error;
pub mod extract;
pub mod handlers;
pub mod middleware;
pub mod models;
pub mod services;

use std::sync::Arc;

use axum::Router;
use axum::routing::{get, post};
use chrono::Duration;
use hackr_core::audit::{AdminQuery, AuditRecorder};
use hackr_core::auth::gateway::AuthGateway;
use hackr_core::auth::jwt::TokenService;
use hackr_core::store::{AuditLog, CredentialStore, MemoryStore, PgStore};
use sqlx::PgPool;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::config::ApiConfig;
use crate::handlers::{auth, logs};

/// Shared application state passed to all handlers.
#[derive(Clone)]
pub struct AppState {
    /// API configuration.
    pub config: ApiConfig,
    /// User records and role assignments.
    pub credentials: Arc<dyn CredentialStore>,
    /// Bearer token validation and identity resolution.
    pub gateway: AuthGateway,
    /// Appends one audit row per successful privileged action.
    pub recorder: AuditRecorder,
    /// Admin-only reporting over the audit log.
    pub admin: AdminQuery,
}

impl AppState {
    /// Wires the services over the given stores.
    pub fn new(
        config: ApiConfig,
        credentials: Arc<dyn CredentialStore>,
        audit: Arc<dyn AuditLog>,
    ) -> Self {
        let tokens = TokenService::new(
            config.jwt_secret.as_bytes(),
            Duration::minutes(config.token_ttl_minutes),
        );
        Self {
            gateway: AuthGateway::new(tokens, credentials.clone()),
            recorder: AuditRecorder::new(audit.clone()),
            admin: AdminQuery::new(audit),
            credentials,
            config,
        }
    }

    /// State backed by PostgreSQL.
    pub fn with_pool(config: ApiConfig, pool: PgPool) -> Self {
        let store = Arc::new(PgStore::new(pool));
        Self::new(config, store.clone(), store)
    }

    /// State backed by a fresh in-memory store.
    pub fn in_memory(config: ApiConfig) -> Self {
        let store = Arc::new(MemoryStore::new());
        Self::new(config, store.clone(), store)
    }
}

/// Run embedded database migrations.
///
/// Delegates to `hackr_core::migrate::migrate()` which owns the migration files.
pub async fn migrate(pool: &PgPool) -> Result<(), sqlx::migrate::MigrateError> {
    hackr_core::migrate::migrate(pool).await
}

/// Builds the Axum router with all routes and shared state.
///
/// Routes are served at the root and again under `/api`.
pub fn router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    // Public routes (no auth required)
    let public = Router::new()
        .route("/register", post(auth::register_handler))
        .route("/login", post(auth::login_handler));

    // Protected routes (require a valid bearer token)
    let protected = Router::new()
        .route("/me", get(auth::me_handler))
        .route("/logs", get(logs::list_logs_handler))
        .route("/log-action/{id_action}", get(logs::logs_by_action_handler))
        .route("/log-user/{id_user}", get(logs::logs_by_user_handler))
        .route_layer(axum::middleware::from_fn_with_state(
            state.clone(),
            middleware::auth::require_auth,
        ));

    let routes = Router::new().merge(public).merge(protected);

    Router::new()
        .merge(routes.clone())
        .nest("/api", routes)
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}

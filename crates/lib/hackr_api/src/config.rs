//! API server configuration.

use hackr_core::auth::jwt::{DEFAULT_TOKEN_TTL_MINUTES, resolve_jwt_secret};
use tracing::warn;

/// Configuration for the API server.
#[derive(Clone, Debug)]
pub struct ApiConfig {
    /// Address to bind the HTTP listener (e.g. "127.0.0.1:3100").
    pub bind_addr: String,
    /// PostgreSQL connection URL.
    pub database_url: String,
    /// JWT signing secret.
    pub jwt_secret: String,
    /// Access token lifetime in minutes.
    pub token_ttl_minutes: i64,
}

impl ApiConfig {
    /// Reads configuration from environment variables with sensible defaults.
    ///
    /// | Variable           | Default                                     |
    /// |--------------------|---------------------------------------------|
    /// | `BIND_ADDR`        | `127.0.0.1:3100`                            |
    /// | `DATABASE_URL`     | `postgres://localhost:5432/hackr`           |
    /// | `JWT_SECRET` / `AUTH_SECRET` | generated & persisted to file     |
    /// | `JWT_TTL_MINUTES`  | `60`                                        |
    pub fn from_env() -> Self {
        Self {
            bind_addr: std::env::var("BIND_ADDR").unwrap_or_else(|_| "127.0.0.1:3100".into()),
            database_url: std::env::var("DATABASE_URL")
                .unwrap_or_else(|_| "postgres://localhost:5432/hackr".into()),
            jwt_secret: resolve_jwt_secret(),
            token_ttl_minutes: ttl_from_env(),
        }
    }
}

fn ttl_from_env() -> i64 {
    match std::env::var("JWT_TTL_MINUTES") {
        Err(_) => DEFAULT_TOKEN_TTL_MINUTES,
        Ok(raw) => parse_ttl(&raw).unwrap_or_else(|| {
            warn!(value = %raw, "ignoring invalid JWT_TTL_MINUTES");
            DEFAULT_TOKEN_TTL_MINUTES
        }),
    }
}

/// Parse a positive minute count.
pub fn parse_ttl(raw: &str) -> Option<i64> {
    raw.trim().parse::<i64>().ok().filter(|m| *m > 0)
}

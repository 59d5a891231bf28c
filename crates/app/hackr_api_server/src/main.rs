//! hackr API server binary.
//!
//! `serve` (the default) runs the HTTP API; `grant-role` assigns a role to an
//! existing user, which is how the first admin is created.

use clap::{Parser, Subcommand};
use hackr_api::config::{ApiConfig, parse_ttl};
use hackr_core::store::{CredentialStore, PgStore};
use sqlx::PgPool;
use sqlx::postgres::PgPoolOptions;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

/// CLI arguments.
#[derive(Parser, Debug)]
#[command(name = "hackr_api_server", about = "hackr authentication and audit API")]
struct Args {
    #[command(subcommand)]
    command: Option<Command>,

    /// PostgreSQL connection URL.
    #[arg(
        long,
        global = true,
        env = "DATABASE_URL",
        default_value = "postgres://localhost:5432/hackr"
    )]
    database_url: String,

    /// Maximum number of database connections in the pool.
    #[arg(long, global = true, default_value_t = 5)]
    max_connections: u32,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Run the HTTP API.
    Serve(ServeArgs),

    /// Grant a role ("admin" or "user") to an existing user.
    GrantRole {
        /// Email of the user to promote.
        #[arg(long)]
        email: String,

        /// Role name.
        #[arg(long, default_value = "admin")]
        role: String,
    },
}

#[derive(clap::Args, Debug, Default)]
struct ServeArgs {
    /// Address to listen on.
    #[arg(long, env = "BIND_ADDR")]
    bind: Option<String>,

    /// Access token lifetime in minutes.
    #[arg(long, env = "JWT_TTL_MINUTES")]
    ttl_minutes: Option<String>,

    /// Keep users and audit records in process memory instead of PostgreSQL.
    #[arg(long, default_value_t = false)]
    memory: bool,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("info,hackr_api=debug,hackr_core=debug")),
        )
        .init();

    let args = Args::parse();

    match args.command {
        Some(Command::GrantRole { ref email, ref role }) => {
            let pool = connect(&args).await?;
            grant_role(pool, email, role).await
        }
        Some(Command::Serve(ref serve_args)) => serve(&args, serve_args).await,
        None => serve(&args, &ServeArgs::default()).await,
    }
}

async fn connect(args: &Args) -> Result<PgPool, Box<dyn std::error::Error>> {
    info!(max_connections = args.max_connections, "configuring connection pool");

    let pool = PgPoolOptions::new()
        .max_connections(args.max_connections)
        .acquire_timeout(std::time::Duration::from_secs(30))
        .connect(&args.database_url)
        .await?;

    info!("running database migrations");
    hackr_api::migrate(&pool).await?;
    Ok(pool)
}

async fn serve(args: &Args, serve_args: &ServeArgs) -> Result<(), Box<dyn std::error::Error>> {
    let mut config = ApiConfig::from_env();
    config.database_url = args.database_url.clone();
    if let Some(bind) = &serve_args.bind {
        config.bind_addr = bind.clone();
    }
    if let Some(raw) = &serve_args.ttl_minutes {
        match parse_ttl(raw) {
            Some(minutes) => config.token_ttl_minutes = minutes,
            None => warn!(value = %raw, "ignoring invalid --ttl-minutes"),
        }
    }

    let state = if serve_args.memory {
        warn!("using in-memory store; data is lost on exit");
        hackr_api::AppState::in_memory(config.clone())
    } else {
        info!(database_url = %config.database_url, "connecting to database");
        let pool = connect(args).await?;
        hackr_api::AppState::with_pool(config.clone(), pool)
    };

    let app = hackr_api::router(state);

    let listener = tokio::net::TcpListener::bind(&config.bind_addr).await?;
    let local_addr = listener.local_addr()?;
    info!(
        addr = %local_addr,
        token_ttl_minutes = config.token_ttl_minutes,
        "REST API listening"
    );

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("server stopped");
    Ok(())
}

async fn grant_role(pool: PgPool, email: &str, role: &str) -> Result<(), Box<dyn std::error::Error>> {
    let store = PgStore::new(pool);
    let user = store
        .find_by_email(email)
        .await?
        .ok_or_else(|| format!("no user registered with email {email}"))?;

    store.grant_role(user.user.id, role).await?;
    info!(user_id = user.user.id, email, role, "role granted");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!(error = %e, "could not listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    info!("shutdown signal received");
}

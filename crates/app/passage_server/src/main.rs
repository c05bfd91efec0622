//! Passage API server binary.
//!
//! Stores users and credentials in PostgreSQL when a database URL is given,
//! otherwise in process memory.

use std::sync::Arc;
use std::time::Duration;

use clap::Parser;
use passage_api::config::ApiConfig;
use passage_core::auth::jwt::TokenIssuer;
use passage_core::provider::{GoogleConfig, GoogleProvider, OAuthStateStore};
use passage_core::session::{SessionService, SessionSettings};
use passage_core::store::{
    CredentialStore, MemoryCredentialStore, MemoryUserDirectory, PgCredentialStore,
    PgUserDirectory, UserDirectory,
};
use sqlx::postgres::PgPoolOptions;
use tracing::{info, warn};

/// CLI arguments for the API server.
#[derive(Parser, Debug)]
#[command(name = "passage_server", about = "Passage API server")]
struct Args {
    /// Port to listen on (0 = ephemeral).
    #[arg(long, env = "PORT", default_value_t = 8080)]
    port: u16,

    /// PostgreSQL connection URL. In-memory stores are used when absent.
    #[arg(long, env = "DATABASE_URL")]
    database_url: Option<String>,

    /// Maximum number of database connections in the pool.
    #[arg(long, default_value_t = 5)]
    max_connections: u32,

    /// Accept only the refresh token of the currently stored credential.
    #[arg(long, env = "SINGLE_USE_REFRESH", default_value_t = false)]
    single_use_refresh: bool,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,passage_api=debug,passage_core=debug".into()),
        )
        .init();

    let args = Args::parse();
    let mut config = ApiConfig::from_env();
    if std::env::var("BIND_ADDR").is_err() {
        config.bind_addr = format!("127.0.0.1:{}", args.port);
    }

    info!(bind_addr = %config.bind_addr, "starting passage_server");

    let (users, credentials): (Arc<dyn UserDirectory>, Arc<dyn CredentialStore>) =
        match &args.database_url {
            Some(url) => {
                info!(
                    max_connections = args.max_connections,
                    "configuring connection pool"
                );
                let pool = PgPoolOptions::new()
                    .max_connections(args.max_connections)
                    .acquire_timeout(Duration::from_secs(30))
                    .connect(url)
                    .await?;

                info!("running database migrations");
                passage_core::migrate::migrate(&pool).await?;

                (
                    Arc::new(PgUserDirectory::new(pool.clone())),
                    Arc::new(PgCredentialStore::new(pool)),
                )
            }
            None => {
                warn!("DATABASE_URL not set, sessions will not survive a restart");
                (
                    Arc::new(MemoryUserDirectory::new()),
                    Arc::new(MemoryCredentialStore::new()),
                )
            }
        };

    if config.google_client_id.is_empty() {
        warn!("GOOGLE_CLIENT_ID not set, logins will fail at the provider");
    }

    let provider = GoogleProvider::new(GoogleConfig::new(
        config.google_client_id.clone(),
        config.google_client_secret.clone(),
        config.google_redirect_uri.clone(),
    ));

    let sessions = SessionService::new(
        Arc::new(TokenIssuer::from_secret(config.jwt_secret.as_bytes())),
        users,
        credentials,
        Arc::new(provider),
    )
    .with_settings(SessionSettings {
        single_use_refresh: args.single_use_refresh,
    });

    let oauth_state = Arc::new(OAuthStateStore::new());
    oauth_state.spawn_cleanup_task();

    let state = passage_api::AppState {
        sessions: Arc::new(sessions),
        oauth_state,
        config: config.clone(),
    };

    let app = passage_api::router(state);

    let listener = tokio::net::TcpListener::bind(&config.bind_addr).await?;
    let local_addr = listener.local_addr()?;
    info!(addr = %local_addr, "REST API listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(async {
            let _ = tokio::signal::ctrl_c().await;
            info!("shutdown signal received");
        })
        .await?;

    Ok(())
}

use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use clap::Parser;
use tracing_subscriber::EnvFilter;

use folio::app::build_router;
use folio::auth::login::bootstrap_admin;
use folio::auth::token::TokenKeys;
use folio::config::{AppConfig, DEFAULT_CONFIG_FILE};
use folio::db::news_repository::MySqlNewsRepository;
use folio::db::person_repository::MySqlPersonRepository;
use folio::db::publication_repository::MySqlPublicationRepository;
use folio::db::settings_repository::MySqlSettingsRepository;
use folio::db::soon_repository::MySqlSoonRepository;
use folio::db::user_repository::MySqlUserRepository;
use folio::db::visitor_repository::MySqlVisitorRepository;
use folio::db::pool;
use folio::publisher;
use folio::search::store::MySqlSearchStore;
use folio::state::AppState;
use folio::storage::client::S3StorageClient;

/// Content-management backend for the portfolio site.
#[derive(Debug, Parser)]
#[command(version, about)]
struct Cli {
    /// Path to the TOML configuration file. A missing file is allowed.
    #[arg(long, short, default_value = DEFAULT_CONFIG_FILE)]
    config: PathBuf,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let config = AppConfig::load(&cli.config)
        .with_context(|| format!("Failed to load configuration from {}", cli.config.display()))?;
    config.validate().context("Invalid configuration")?;

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(&config.logging.filter)),
        )
        .init();

    tracing::info!(version = env!("CARGO_PKG_VERSION"), "Starting folio server");

    let addr = config
        .socket_addr()
        .context("Failed to determine socket address")?;

    let pool = pool::connect(&config.database)
        .await
        .context("Failed to connect to MySQL")?;
    if config.database.run_migrations {
        pool::migrate(&pool).await.context("Failed to run migrations")?;
        tracing::info!("Database migrations applied");
    }

    let users = Arc::new(MySqlUserRepository::new(pool.clone()));
    if bootstrap_admin(users.as_ref(), &config.auth)
        .await
        .context("Failed to create bootstrap admin")?
    {
        tracing::info!("Bootstrap admin account ready");
    }

    let storage = S3StorageClient::from_config(&config.storage)
        .await
        .context("Failed to initialize S3 client")?;
    tracing::info!(bucket = %config.storage.bucket, "S3 storage client initialized");

    let _publisher = publisher::spawn(
        Arc::new(MySqlPublicationRepository::new(pool.clone())),
        Duration::from_secs(config.publisher.interval_secs),
    );

    let state = AppState {
        tokens: Arc::new(TokenKeys::new(
            &config.auth.jwt_secret,
            config.auth.token_ttl_hours,
        )),
        users,
        news: Arc::new(MySqlNewsRepository::new(pool.clone())),
        soon: Arc::new(MySqlSoonRepository::new(pool.clone())),
        persons: Arc::new(MySqlPersonRepository::new(pool.clone())),
        settings: Arc::new(MySqlSettingsRepository::new(pool.clone())),
        visitors: Arc::new(MySqlVisitorRepository::new(pool.clone())),
        search: Arc::new(MySqlSearchStore::new(pool.clone())),
        storage: Arc::new(storage),
        config: Arc::new(config),
    };

    let app = build_router(state);

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind TCP listener on {addr}"))?;
    tracing::info!("Listening on http://{}", addr);

    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .with_graceful_shutdown(shutdown_signal())
    .await
    .context("Server terminated unexpectedly")?;

    pool.close().await;
    tracing::info!("Server shutdown complete");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "Failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutdown signal received, starting graceful shutdown...");
}

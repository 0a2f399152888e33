//! Book service - catalog and lending availability
//!
//! A Rust REST API server for a library's book catalog.

use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::Context;
use sqlx::postgres::PgPoolOptions;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, Layer};

use book_service::{
    api,
    config::{AppConfig, LoggingConfig, StorageBackend},
    repository::{BookStore, MemoryBookStore, PgBookStore, SerializedBookStore},
    services::Services,
    AppState,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment variables from .env file
    dotenvy::dotenv().ok();

    let config = AppConfig::load().context("Failed to load configuration")?;

    let _log_guard = init_tracing(&config.logging);

    tracing::info!("Starting book service v{}", env!("CARGO_PKG_VERSION"));

    let store = connect_store(&config).await?;
    let services = Services::new(store);

    let addr = SocketAddr::new(
        config.server.host.parse().context("Invalid host address")?,
        config.server.port,
    );

    let state = AppState {
        services: Arc::new(services),
    };

    let app = api::create_router(state);

    tracing::info!("Server listening on http://{}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    Ok(())
}

/// Set up stdout logging, plus a daily rolling file when a log directory is configured.
/// The returned guard must live until shutdown so buffered file output is flushed.
fn init_tracing(logging: &LoggingConfig) -> Option<WorkerGuard> {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| format!("book_service={},tower_http=debug", logging.level).into());

    let stdout = if logging.format == "json" {
        tracing_subscriber::fmt::layer().json().boxed()
    } else {
        tracing_subscriber::fmt::layer().boxed()
    };

    let (file, guard) = match &logging.directory {
        Some(directory) => {
            let appender = tracing_appender::rolling::daily(directory, "book-service.log");
            let (writer, guard) = tracing_appender::non_blocking(appender);
            let layer = tracing_subscriber::fmt::layer()
                .with_writer(writer)
                .with_ansi(false);
            (Some(layer), Some(guard))
        }
        None => (None, None),
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(stdout)
        .with(file)
        .init();

    guard
}

async fn connect_store(config: &AppConfig) -> anyhow::Result<Arc<dyn BookStore>> {
    let serialize = config.storage.serialize_updates;

    let store: Arc<dyn BookStore> = match config.storage.backend {
        StorageBackend::Memory => {
            tracing::warn!("Using in-memory book store; data is lost on shutdown");
            with_serialization(MemoryBookStore::new(), serialize)
        }
        StorageBackend::Postgres => {
            let pool = PgPoolOptions::new()
                .max_connections(config.database.max_connections)
                .min_connections(config.database.min_connections)
                .connect(&config.database.url)
                .await
                .context("Failed to connect to database")?;

            tracing::info!("Connected to database");

            sqlx::migrate!("./migrations")
                .run(&pool)
                .await
                .context("Failed to run database migrations")?;

            tracing::info!("Database migrations completed");

            with_serialization(PgBookStore::new(pool), serialize)
        }
    };

    if serialize {
        tracing::info!("Per-book update serialization enabled");
    }

    Ok(store)
}

fn with_serialization<S: BookStore + 'static>(store: S, serialize: bool) -> Arc<dyn BookStore> {
    if serialize {
        Arc::new(SerializedBookStore::new(store))
    } else {
        Arc::new(store)
    }
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutdown signal received");
}

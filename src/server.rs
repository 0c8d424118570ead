//! HTTP server initialization and runtime setup.
//!
//! Handles storage setup, event bus and aggregator wiring, and the Axum
//! server lifecycle.

use crate::config::{Config, StorageBackend};
use crate::domain::click_worker::ClickAggregator;
use crate::domain::event_bus::EventBus;
use crate::domain::repositories::{LinkRepository, StatsRepository};
use crate::infrastructure::memory::{InMemoryLinkRepository, InMemoryStatsRepository};
use crate::infrastructure::persistence::{MIGRATOR, PgLinkRepository, PgStatsRepository};
use crate::routes::app_router;
use crate::state::AppState;

use anyhow::{Context, Result};
use axum::ServiceExt;
use axum::extract::Request;
use sqlx::PgPool;
use sqlx::postgres::PgPoolOptions;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

type Repositories = (Arc<dyn LinkRepository>, Arc<dyn StatsRepository>);

/// Runs the HTTP server with the given configuration.
///
/// Initializes:
/// - Storage (PostgreSQL pool + migrations, or in-memory maps)
/// - Event bus
/// - Background click aggregator
/// - Axum HTTP server with graceful shutdown
///
/// The aggregator is not drained on shutdown; queued clicks are lost.
///
/// # Errors
///
/// Returns an error if:
/// - Database connection or migration fails
/// - Server bind fails
/// - Server runtime error occurs
pub async fn run(config: Config) -> Result<()> {
    let (link_repository, stats_repository) = build_repositories(&config).await?;

    let event_bus = EventBus::new(config.click_queue_capacity, config.click_overflow_policy);

    let aggregator = ClickAggregator::new(stats_repository.clone(), config.click_attribution);
    tokio::spawn(aggregator.run(event_bus.subscribe()));

    let state = AppState::new(link_repository, stats_repository, event_bus);
    let app = app_router(state);

    let addr: SocketAddr = config
        .listen_addr
        .parse()
        .with_context(|| format!("Invalid LISTEN address '{}'", config.listen_addr))?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    tracing::info!("Listening on http://{addr}");

    axum::serve(listener, ServiceExt::<Request>::into_make_service(app))
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("Server stopped");

    Ok(())
}

async fn build_repositories(config: &Config) -> Result<Repositories> {
    match config.storage_backend {
        StorageBackend::Memory => {
            tracing::warn!("Using in-memory storage, data is lost on restart");
            Ok((
                Arc::new(InMemoryLinkRepository::new()),
                Arc::new(InMemoryStatsRepository::new()),
            ))
        }
        StorageBackend::Postgres => {
            let database_url = config
                .database_url
                .as_deref()
                .context("DATABASE_URL is required for the postgres backend")?;

            let pool = connect_pool(config, database_url).await?;
            tracing::info!("Connected to database");

            MIGRATOR
                .run(&pool)
                .await
                .context("Failed to run database migrations")?;
            tracing::info!("Database migrations applied");

            let pool = Arc::new(pool);
            Ok((
                Arc::new(PgLinkRepository::new(pool.clone())),
                Arc::new(PgStatsRepository::new(pool)),
            ))
        }
    }
}

/// Opens a PostgreSQL pool with the configured limits.
pub async fn connect_pool(config: &Config, database_url: &str) -> Result<PgPool> {
    PgPoolOptions::new()
        .max_connections(config.db_max_connections)
        .acquire_timeout(Duration::from_secs(config.db_connect_timeout))
        .connect(database_url)
        .await
        .context("Failed to connect to database")
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!("Failed to listen for Ctrl-C: {e}");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::error!("Failed to listen for SIGTERM: {e}");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    tracing::info!("Shutdown signal received");
}

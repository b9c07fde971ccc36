use std::sync::Arc;

use anyhow::Context;
use db::{DBService, models::job_counter::JobCounter};
use server::{AppState, routes};
use services::services::{database_validator::DatabaseValidator, storage::DbStorage};
use tracing::info;
use utils::{config::ServerConfig, logging::init_tracing};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = ServerConfig::from_env()?;
    init_tracing();

    let db = DBService::new(&config.database_url, config.db_max_connections)
        .await
        .with_context(|| format!("failed to open database {}", config.database_url))?;
    let validation = DatabaseValidator::new(db.pool.clone()).ensure_ready().await?;
    info!("{}", validation.summary());
    let last_job_number = JobCounter::current(&db.pool).await?;
    info!(last_job_number, "Job counter loaded");

    let state = AppState::new(Arc::new(DbStorage::new(db)));
    let app = routes::router(state);

    let listener = tokio::net::TcpListener::bind(config.bind_address())
        .await
        .with_context(|| format!("failed to bind {}", config.bind_address()))?;
    info!(address = %listener.local_addr()?, "Server listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;
    info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "Failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
}

//! HMS Server: application entry point.

use clap::Parser;
use hms_db::DbManager;
use hms_server::config::log_filter;
use hms_server::{AppState, ServerConfig, router};
use tokio::net::TcpListener;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(log_filter()?)
        .json()
        .init();

    let config = ServerConfig::parse();
    config.validate()?;

    tracing::info!(bind = %config.bind, "Starting HMS server...");

    let db = DbManager::connect(&config.db_config()).await?;
    hms_db::run_migrations(db.client()).await?;

    let state = AppState::new(db.client().clone(), config.auth_config(), config.cookie_secure);
    let app = router(state);

    let listener = TcpListener::bind(config.bind).await?;
    tracing::info!(addr = %listener.local_addr()?, "listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("HMS server stopped.");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "failed to listen for shutdown signal");
    }
}

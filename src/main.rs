mod config;
mod error;
mod extract;
mod gemini;
mod models;
mod openai;
mod pack;
mod pipeline;
mod placeholder;
mod prompt;
mod provider;
mod routes;

use anyhow::Context;
use std::net::SocketAddr;
use tracing_subscriber::{fmt, EnvFilter};

use crate::config::Config;
use crate::routes::{router, AppState};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment variables from .env file
    dotenv::dotenv().ok();

    // Init tracing
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    fmt().with_env_filter(filter).init();

    let config = Config::from_env().context("invalid configuration")?;
    if config.defer_credential_check {
        if let Err(e) = config.require_credentials() {
            tracing::warn!("⚠️ {} Affected endpoints will answer 500 until it is set.", e);
        }
    } else {
        config.require_credentials().context("refusing to start")?;
    }
    tracing::info!("Image provider: {:?}", config.image_mode);

    let state = AppState::from_config(&config);
    let app = router(state);

    let addr = SocketAddr::from(([0, 0, 0, 0], config.port));
    tracing::info!(%addr, "Starting server");
    let listener = tokio::net::TcpListener::bind(addr).await
        .with_context(|| format!("failed to bind {addr}"))?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("server error")?;
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("❌ Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutting down");
}

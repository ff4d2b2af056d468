//! quarry HTTP server entry point.
//!
//! Serves the search API over HTTP. Logs go to stderr as JSON.

use anyhow::{Context, Result};
use quarry_client::{SearchOptions, Searcher, SearcherConfig};
use quarry_core::AppConfig;
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

mod error;
mod handler;
mod routes;

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .json()
        .init();

    let config = AppConfig::load().context("loading configuration")?;
    let searcher = Searcher::new(SearcherConfig::from(&config))?;
    let state = Arc::new(handler::AppState { searcher, defaults: SearchOptions::from(&config) });

    let listener = tokio::net::TcpListener::bind(&config.bind_addr)
        .await
        .with_context(|| format!("binding {}", config.bind_addr))?;
    tracing::info!("quarry server listening on http://{}", listener.local_addr()?);

    axum::serve(listener, handler::router(state))
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::warn!("failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
    tracing::info!("shutting down");
}

//! Image search HTTP API server (Axum).
//!
//! Exposes seeding, text-to-image search and collection status over REST.

pub mod error;
pub mod routes;
pub mod state;

use anyhow::Context;
use axum::Router;
use iv_search::ImageSearch;
use state::AppState;
use tokio::net::TcpListener;
use tracing::info;

/// Build the application router over a ready pipeline.
pub fn app(search: ImageSearch) -> Router {
    app_with_state(AppState::new(search))
}

/// Build the application router with a custom state.
pub fn app_with_state(state: AppState) -> Router {
    Router::new()
        .merge(routes::health_routes())
        .merge(routes::collection_routes())
        .merge(routes::search_routes())
        .with_state(state)
}

/// Bind `host:port`; `host` may be an IP address or a resolvable name.
pub async fn bind(host: &str, port: u16) -> std::io::Result<TcpListener> {
    TcpListener::bind((host, port)).await
}

/// Bind `host:port` and serve until the process is stopped.
pub async fn serve(search: ImageSearch, host: &str, port: u16) -> anyhow::Result<()> {
    let listener = bind(host, port)
        .await
        .with_context(|| format!("failed to bind {host}:{port}"))?;
    info!(addr = %listener.local_addr()?, "image search server listening");
    axum::serve(listener, app(search)).await?;
    Ok(())
}

#[cfg(test)]
mod tests;

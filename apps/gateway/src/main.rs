mod config;
mod detail;
mod errors;
mod files;
mod job_client;
mod models;
mod offline;
mod render;
mod routes;
mod search;
mod session;
mod state;
mod suggest;
#[cfg(test)]
mod testing;

use anyhow::Result;
use std::net::SocketAddr;
use std::sync::Arc;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::config::Config;
use crate::offline::MockCatalog;
use crate::routes::build_router;
use crate::state::AppState;

#[tokio::main]
async fn main() -> Result<()> {
    // Load configuration first (fails on malformed numeric env vars)
    let config = Config::from_env()?;

    // Initialize structured logging
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(format!("{}={}", env!("CARGO_PKG_NAME"), &config.rust_log))
        }))
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting SeekCareer gateway v{}", env!("CARGO_PKG_VERSION"));
    info!(
        "Request timeout {}s, suggestion debounce {}ms, {} results per search",
        config.request_timeout.as_secs(),
        config.suggest_debounce.as_millis(),
        config.search_num_results
    );

    let state = AppState::build(config.clone(), Arc::new(MockCatalog::bundled()))?;

    info!("Sessions expire after {}s idle", config.session_ttl.as_secs());
    state.sessions.clone().spawn_sweeper(config.session_ttl);

    let app = build_router(state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive()); // TODO: restrict CORS to the front-end origin once it is configurable

    let addr: SocketAddr = format!("0.0.0.0:{}", config.port).parse()?;
    info!("Listening on {addr}");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

mod backend;
mod config;
mod errors;
mod grid;
mod models;
mod remarks;
mod routes;
mod state;

use anyhow::Result;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::backend::client::BackendClient;
use crate::config::Config;
use crate::routes::build_router;
use crate::state::AppState;

#[tokio::main]
async fn main() -> Result<()> {
    // Configuration first; a missing BACKEND_URL stops startup here
    let config = Config::from_env()?;

    // Initialize structured logging
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(format!("crm_console={}", &config.rust_log))
        }))
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting CRM console v{}", env!("CARGO_PKG_VERSION"));

    let backend = BackendClient::new(
        &config.backend_url,
        config.backend_token.clone(),
        Duration::from_secs(config.backend_timeout_secs),
    )?;
    info!(
        "Backend client initialized ({}, timeout {}s)",
        config.backend_url, config.backend_timeout_secs
    );
    info!(
        "Reminders read in UTC{}, default page size {}",
        config.reminder_offset, config.default_page_size
    );

    let state = AppState::new(Arc::new(backend), config.clone());

    let app = build_router(state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive());

    let addr: SocketAddr = format!("0.0.0.0:{}", config.port).parse()?;
    info!("Listening on {addr}");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

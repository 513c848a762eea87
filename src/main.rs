//! Main entry point for the Webhook Chat Gateway

use std::sync::Arc;

use anyhow::Context;
use tracing::info;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use webhook_chat_gateway::api::routes::create_router;
use webhook_chat_gateway::config::Settings;
use webhook_chat_gateway::AppState;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Local development reads a .env file; deployments set variables directly
    dotenvy::dotenv().ok();

    // Configuration must load before logging so the operating mode can pick
    // the default verbosity
    let settings = Settings::load().context("failed to load configuration")?;

    // Initialize logging
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(settings.gateway_mode.default_log_filter()));

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().json())
        .init();

    info!("Starting Webhook Chat Gateway");

    let state = AppState::from_settings(settings).context("failed to initialize gateway")?;
    info!(models = ?state.registry.names(), "Registered models");

    let state = Arc::new(state);

    // Build the router
    let app = create_router(state.clone());

    let addr = state.settings.bind_addr();
    info!("Server listening on {}", addr);

    // Start the server
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

//! Table Timer - dining-time control for all-you-can-eat restaurants

use anyhow::Result;
use chrono::Utc;
use std::path::Path;
use std::time::Duration;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use tabletimer::{
    api::{self, AppState},
    config::Config,
    services::spawn_ticker,
    store::create_store,
};

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "tabletimer=info,tower_http=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!("Starting Table Timer...");

    // Load configuration
    let config = Config::load_with_env(Path::new("config.yml"))?;
    tracing::info!("Configuration loaded");

    // Initialize store
    let kv = create_store(&config.store);

    // Build application state
    let tick_period = Duration::from_millis(config.timers.console_tick_ms);
    let addr = format!("{}:{}", config.server.host, config.server.port);
    tracing::info!("Customer codes point at {}", config.server.public_origin);
    let state = AppState::new(config, kv).await?;

    // Console tick raises expiry alerts even while no dashboard is open
    let console = state.console.clone();
    let ticker = spawn_ticker("console", tick_period, move || {
        let console = console.clone();
        async move {
            console.tick(Utc::now()).await;
        }
    });

    // Build router
    let app = api::build_router(state);

    // Start server
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!("Server listening on http://{}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    ticker.cancel();
    tracing::info!("Server stopped");

    Ok(())
}

/// Resolve once Ctrl+C is received
async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutdown signal received");
}

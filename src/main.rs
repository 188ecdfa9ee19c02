//! PhishGuard server entry point

use std::sync::Arc;

use anyhow::Context;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use phishguard::logic::external_intel::spawn_refresh;
use phishguard::{create_router, AppState, Config};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load configuration
    dotenvy::dotenv().ok();
    let config = Config::from_env();

    init_tracing(config.json_logs);

    tracing::info!("PhishGuard starting ({})...", config.environment);

    let state = AppState::from_config(config.clone()).context("failed to initialize classifier")?;

    // Threat feeds
    if state.intel.has_sources() {
        if config.feed_refresh.is_zero() {
            match state.intel.sync_all().await {
                Ok(result) => tracing::info!("Threat feeds loaded: {} indicators", result.total_indicators),
                Err(e) => tracing::warn!("Initial feed sync failed: {}", e),
            }
        } else {
            tracing::info!("Refreshing threat feeds every {:?}", config.feed_refresh);
            spawn_refresh(Arc::clone(&state.intel), config.feed_refresh);
        }
    }

    if config.admin_token.is_none() {
        tracing::info!("ADMIN_TOKEN not set, admin API disabled");
    }

    // Build router
    let app = create_router(state);

    // Start server
    let listener = tokio::net::TcpListener::bind((config.host.as_str(), config.port))
        .await
        .with_context(|| format!("failed to bind {}:{}", config.host, config.port))?;
    tracing::info!("🚀 Server listening on http://{}", listener.local_addr()?);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("server error")?;

    tracing::info!("Server stopped");
    Ok(())
}

fn init_tracing(json: bool) {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "phishguard=debug,tower_http=debug".into());

    let registry = tracing_subscriber::registry().with(filter);
    if json {
        registry.with(tracing_subscriber::fmt::layer().json()).init();
    } else {
        registry.with(tracing_subscriber::fmt::layer()).init();
    }
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutdown signal received");
}

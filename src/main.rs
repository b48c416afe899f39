// Main entry point - Dependency injection and server setup
mod application;
mod domain;
mod infrastructure;
mod presentation;

use std::net::SocketAddr;
use std::sync::Arc;
use tokio::sync::watch;
use tracing_subscriber::EnvFilter;

use crate::application::dashboard_service::DashboardService;
use crate::application::settings_service::SettingsEditor;
use crate::domain::settings::{NotificationConfig, ThresholdConfig};
use crate::infrastructure::config::load_app_config;
use crate::infrastructure::http_backend::HttpBackend;
use crate::infrastructure::live_channel::LiveChannel;
use crate::presentation::app_state::AppState;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    // Load configuration
    let config = load_app_config()?;

    // Create backend client (infrastructure layer)
    let backend = Arc::new(HttpBackend::new(
        &config.backend.base_url,
        config.backend.request_timeout(),
    )?);

    // Create services (application layer)
    let (dashboard, reducer) = DashboardService::start(backend.clone(), config.aggregator.clone());
    let thresholds = SettingsEditor::<ThresholdConfig>::new("threshold", backend.clone());
    let phone = SettingsEditor::<NotificationConfig>::new("phone", backend.clone());
    thresholds.load().await;
    phone.load().await;

    // Background feeds
    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    let mut tasks = dashboard.spawn_pollers(shutdown_rx.clone());
    let live = LiveChannel::new(config.backend.live_url(), config.backend.reconnect_delay());
    tasks.push(tokio::spawn(live.run(dashboard.clone(), shutdown_rx.clone())));

    // Create application state
    let state = Arc::new(AppState {
        dashboard,
        thresholds,
        phone,
        status_colors: config.status_colors.clone(),
        shutdown: shutdown_rx,
    });

    // Build router (presentation layer)
    // Note: responses are compressed by our own response builders,
    // so no CompressionLayer is added
    let router = presentation::router(state);

    // Start server
    let addr: SocketAddr = config.server.bind_addr.parse()?;
    tracing::info!("Starting sensor-dashboard service on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, router)
        .with_graceful_shutdown(async move {
            if let Err(e) = tokio::signal::ctrl_c().await {
                tracing::error!("Failed to listen for shutdown signal: {}", e);
            }
            tracing::info!("Shutting down");
            let _ = shutdown_tx.send(true);
        })
        .await?;

    for task in tasks {
        if let Err(e) = task.await {
            tracing::warn!("Background task ended abnormally: {}", e);
        }
    }
    // the router held the last service clone, so the reducer drains and exits
    if let Err(e) = reducer.await {
        tracing::warn!("Dashboard reducer ended abnormally: {}", e);
    }

    Ok(())
}

// main.rs
mod app;
mod clock;
mod config;
mod devices;
mod docs;
mod energy;
mod error;
mod events;
mod handlers;
mod logging;
mod metrics;
mod models;
mod utils;

use anyhow::Context;
use std::sync::Arc;
use tokio::signal;
use tracing::info;

use clock::SystemClock;
use devices::SmartLight;
use events::EventBus;
use models::AppState;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    logging::setup_console_logging();

    let settings = config::Settings::new()
        .map_err(|e| anyhow::anyhow!("Failed to load config: {}", e))?;

    if settings.metrics.enabled {
        metrics::setup_metrics(settings.metrics.port)
            .context("Failed to setup metrics")?;
        info!("Metrics exporter listening on port {}", settings.metrics.port);
    }

    let events = Arc::new(EventBus::new());
    let light = Arc::new(SmartLight::new(
        settings.light,
        Arc::new(SystemClock),
        events.clone(),
    ));
    let state = Arc::new(AppState::new(light, events));
    let cors = app::cors_layer(&settings.server)?;
    let app = app::router(state, cors);

    let listener = tokio::net::TcpListener::bind(&settings.server.address)
        .await
        .map_err(|e| anyhow::anyhow!("Failed to bind address: {}", e))?;

    tracing::info!(
        environment = ?settings.server.environment,
        "Server started on {}",
        settings.server.address
    );

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .map_err(|e| anyhow::anyhow!("Server error: {}", e))?;

    info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            tracing::error!("Failed to install Ctrl+C handler: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sig) => {
                sig.recv().await;
            }
            Err(e) => {
                tracing::error!("Failed to install signal handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
    info!("signal received, starting graceful shutdown");
}

//! User Weather server entry point.

use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::Context;
use tokio::signal;
use tracing::{error, info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use user_weather::api::create_router;
use user_weather::{AppState, Config, RefreshScheduler};

/// # Startup Sequence
/// 1. Initialize tracing subscriber for logging
/// 2. Load configuration from environment variables
/// 3. Build cache, providers and scheduler
/// 4. Load the initial cards and start auto-refresh
/// 5. Serve the API until SIGINT/SIGTERM, then stop the scheduler
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Defaults to "info" level, can be overridden with RUST_LOG env var
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "user_weather=info,tower_http=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting User Weather server");

    let config = Config::from_env();
    info!(
        "Configuration loaded: users={}, cache_ttl={}m, refresh_interval={}m, port={}",
        config.user_count, config.cache_ttl_minutes, config.refresh_interval_minutes, config.server_port
    );
    if config.opencage_key.is_empty() {
        warn!("OPENCAGE_KEY is not set, cards will have no weather");
    }

    let state = AppState::from_config(&config)?;

    match state.dashboard.load_cards(config.user_count, false).await {
        Ok(cards) => info!("Initial load complete: {} cards", cards.len()),
        Err(e) => warn!("Initial load failed, retry with POST /users/reload: {}", e),
    }

    state.scheduler.start();
    let scheduler = state.scheduler.clone();

    let app = create_router(state);

    let addr = SocketAddr::from(([0, 0, 0, 0], config.server_port));
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("failed to bind {}", addr))?;
    info!("Server listening on http://{}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal(scheduler))
        .await
        .context("server error")?;

    info!("Server shutdown complete");
    Ok(())
}

/// Waits for Ctrl+C or SIGTERM, then stops auto-refresh.
async fn shutdown_signal(scheduler: Arc<RefreshScheduler>) {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            error!("Failed to listen for Ctrl+C: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                error!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("Received Ctrl+C, initiating shutdown...");
        }
        _ = terminate => {
            info!("Received SIGTERM, initiating shutdown...");
        }
    }

    if scheduler.is_active() {
        scheduler.stop();
    }
}

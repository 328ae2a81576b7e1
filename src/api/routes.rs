//! API Routes
//!
//! Configures the Axum router with all endpoints.

use axum::{
    routing::{delete, get, post, put},
    Router,
};
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

use super::handlers::{
    cards_handler, clear_cache_handler, health_handler, interval_handler, refresh_handler,
    refresh_status_handler, reload_handler, start_refresh_handler, stats_handler, stop_refresh_handler,
    AppState,
};

/// Creates the main router with all endpoints configured.
///
/// # Middleware
/// - CORS: Allows any origin, the card page is served separately
/// - Tracing: Logs all requests
pub fn create_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/cards", get(cards_handler))
        .route("/users/reload", post(reload_handler))
        .route("/refresh", post(refresh_handler))
        .route("/refresh/status", get(refresh_status_handler))
        .route("/refresh/interval", put(interval_handler))
        .route("/refresh/start", post(start_refresh_handler))
        .route("/refresh/stop", post(stop_refresh_handler))
        .route("/cache", delete(clear_cache_handler))
        .route("/stats", get(stats_handler))
        .route("/health", get(health_handler))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

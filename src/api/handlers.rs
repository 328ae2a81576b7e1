//! API Handlers
//!
//! HTTP request handlers for the card, refresh and cache endpoints.

use std::sync::Arc;

use axum::{extract::State, Json};
use tracing::{info, warn};

use crate::cache::{ExpiringCache, FileStore, KeyValueStore, MemoryStore};
use crate::clock::SystemClock;
use crate::config::Config;
use crate::dashboard::Dashboard;
use crate::error::{AppError, Result};
use crate::models::{
    CardsResponse, HealthResponse, IntervalRequest, MessageResponse, RefreshResponse, ReloadRequest,
    StatsResponse,
};
use crate::retry::RetryExecutor;
use crate::services::{ApiClient, GeocodingService, UserService, WeatherService};
use crate::tasks::{RefreshScheduler, ScheduleStatus};

/// Application state shared across all handlers.
#[derive(Debug, Clone)]
pub struct AppState {
    pub dashboard: Arc<Dashboard>,
    pub scheduler: Arc<RefreshScheduler>,
    pub cache: ExpiringCache,
    /// Users loaded when a reload does not name a count
    pub default_count: usize,
}

impl AppState {
    /// Wires an idle scheduler whose callback refreshes the dashboard weather.
    pub fn new(dashboard: Arc<Dashboard>, cache: ExpiringCache, interval_minutes: u64, default_count: usize) -> Self {
        let target = dashboard.clone();
        let scheduler = RefreshScheduler::new(interval_minutes, move || {
            let dashboard = target.clone();
            async move { dashboard.refresh_weather().await }
        });

        Self {
            dashboard,
            scheduler: Arc::new(scheduler),
            cache,
            default_count,
        }
    }

    /// Builds the providers, cache and scheduler from configuration.
    ///
    /// An unusable cache directory falls back to an in-memory store.
    pub fn from_config(config: &Config) -> Result<Self> {
        let store: Arc<dyn KeyValueStore> = match &config.cache_dir {
            Some(dir) => match FileStore::open(dir) {
                Ok(store) => {
                    info!("Persistent cache at {}", store.dir().display());
                    Arc::new(store)
                }
                Err(e) => {
                    warn!("Cannot open cache directory {}: {}; using memory", dir.display(), e);
                    Arc::new(MemoryStore::new())
                }
            },
            None => Arc::new(MemoryStore::new()),
        };

        let clock = Arc::new(SystemClock);
        let cache = ExpiringCache::with_clock(store, clock.clone(), config.cache_ttl());
        let client = ApiClient::new(config.request_timeout())
            .map_err(|e| AppError::Internal(format!("HTTP client setup failed: {}", e)))?;
        let retry = RetryExecutor::new(config.retry_policy());

        let dashboard = Dashboard::new(
            UserService::new(client.clone(), cache.clone(), retry, config.random_user_url.clone()),
            GeocodingService::new(client.clone(), config.opencage_url.clone(), config.opencage_key.clone()),
            WeatherService::new(client, retry, clock, config.weather_url.clone()).with_max_age(config.cache_ttl()),
            cache.clone(),
        );

        Ok(Self::new(
            Arc::new(dashboard),
            cache,
            config.refresh_interval_minutes,
            config.user_count,
        ))
    }
}

/// Handler for GET /cards
pub async fn cards_handler(State(state): State<AppState>) -> Result<Json<CardsResponse>> {
    let cards = state.dashboard.cards().await;
    if cards.is_empty() {
        return Err(AppError::NotFound("No cards loaded".to_string()));
    }
    Ok(Json(CardsResponse::new(&cards)))
}

/// Handler for POST /users/reload
///
/// Replaces the cards with a new set of users.
pub async fn reload_handler(
    State(state): State<AppState>,
    Json(req): Json<ReloadRequest>,
) -> Result<Json<CardsResponse>> {
    if let Some(error_msg) = req.validate() {
        return Err(AppError::InvalidRequest(error_msg));
    }

    let count = req.count.unwrap_or(state.default_count);
    let cards = state.dashboard.load_cards(count, req.fresh).await?;

    Ok(Json(CardsResponse::new(&cards)))
}

/// Handler for POST /refresh
///
/// Runs the weather refresh now and restarts the countdown.
pub async fn refresh_handler(State(state): State<AppState>) -> Result<Json<RefreshResponse>> {
    let ran = state
        .scheduler
        .force_refresh()
        .await
        .map_err(|e| AppError::RefreshFailed(e.to_string()))?;

    let message = if ran {
        "Weather refreshed"
    } else {
        "Auto-refresh is not active, nothing refreshed"
    };
    Ok(Json(RefreshResponse::new(message, state.scheduler.status())))
}

/// Handler for GET /refresh/status
pub async fn refresh_status_handler(State(state): State<AppState>) -> Json<ScheduleStatus> {
    Json(state.scheduler.status())
}

/// Handler for PUT /refresh/interval
pub async fn interval_handler(
    State(state): State<AppState>,
    Json(req): Json<IntervalRequest>,
) -> Result<Json<RefreshResponse>> {
    if let Some(error_msg) = req.validate() {
        return Err(AppError::InvalidRequest(error_msg));
    }

    state.scheduler.update_interval(req.minutes);

    Ok(Json(RefreshResponse::new(
        format!("Refresh interval set to {} minutes", req.minutes),
        state.scheduler.status(),
    )))
}

/// Handler for POST /refresh/start
pub async fn start_refresh_handler(State(state): State<AppState>) -> Json<RefreshResponse> {
    state.scheduler.start();
    Json(RefreshResponse::new("Auto-refresh started", state.scheduler.status()))
}

/// Handler for POST /refresh/stop
pub async fn stop_refresh_handler(State(state): State<AppState>) -> Json<RefreshResponse> {
    state.scheduler.stop();
    Json(RefreshResponse::new("Auto-refresh stopped", state.scheduler.status()))
}

/// Handler for DELETE /cache
///
/// Drops every cached entry. Loaded cards are kept.
pub async fn clear_cache_handler(State(state): State<AppState>) -> Json<MessageResponse> {
    state.cache.clear_all();
    Json(MessageResponse::new("Cache cleared"))
}

/// Handler for GET /stats
pub async fn stats_handler(State(state): State<AppState>) -> Json<StatsResponse> {
    Json(StatsResponse::from(state.cache.stats()))
}

/// Handler for GET /health
pub async fn health_handler() -> Json<HealthResponse> {
    Json(HealthResponse::healthy())
}

//! Response DTOs for the user weather API
//!
//! Defines the structure of outgoing HTTP response bodies. Cards are rendered
//! into display strings here, with placeholders where data is missing.

use serde::Serialize;

use crate::cache::CacheStats;
use crate::clock::{format_timestamp, Clock, SystemClock};
use crate::models::UserWeatherCard;
use crate::tasks::ScheduleStatus;

/// Placeholder for a missing reading
pub const NOT_AVAILABLE: &str = "N/A";

/// Placeholder for a missing condition
pub const WEATHER_UNAVAILABLE: &str = "Weather data unavailable";

/// Display form of one user card
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CardView {
    pub name: String,
    pub email: String,
    pub picture: String,
    /// "City, Country"
    pub location: String,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    /// e.g. "21.4°C" or "N/A"
    pub temperature: String,
    /// e.g. "64%" or "N/A"
    pub humidity: String,
    pub condition: String,
    /// True when the weather shown is an outdated fallback
    pub stale: bool,
}

impl From<&UserWeatherCard> for CardView {
    fn from(card: &UserWeatherCard) -> Self {
        let user = &card.user;
        let weather = card.weather.as_ref();

        Self {
            name: user.full_name(),
            email: user.email.clone(),
            picture: user.picture.large.clone(),
            location: format!("{}, {}", user.location.city, user.location.country),
            latitude: card.coordinates.map(|c| c.lat),
            longitude: card.coordinates.map(|c| c.lng),
            temperature: weather
                .map(|w| format!("{}°C", w.temperature))
                .unwrap_or_else(|| NOT_AVAILABLE.to_string()),
            humidity: weather
                .map(|w| format!("{}%", w.humidity))
                .unwrap_or_else(|| NOT_AVAILABLE.to_string()),
            condition: weather
                .map(|w| w.condition.clone())
                .unwrap_or_else(|| WEATHER_UNAVAILABLE.to_string()),
            stale: weather.is_some_and(|w| w.stale),
        }
    }
}

/// Response body for GET /cards and POST /users/reload
#[derive(Debug, Clone, Serialize)]
pub struct CardsResponse {
    pub cards: Vec<CardView>,
    /// Number of cards
    pub total: usize,
    /// Number of cards with weather
    pub with_weather: usize,
}

impl CardsResponse {
    pub fn new(cards: &[UserWeatherCard]) -> Self {
        Self {
            cards: cards.iter().map(CardView::from).collect(),
            total: cards.len(),
            with_weather: cards.iter().filter(|c| c.weather.is_some()).count(),
        }
    }
}

/// Response body for POST /refresh and PUT /refresh/interval
#[derive(Debug, Clone, Serialize)]
pub struct RefreshResponse {
    pub message: String,
    pub status: ScheduleStatus,
}

impl RefreshResponse {
    pub fn new(message: impl Into<String>, status: ScheduleStatus) -> Self {
        Self {
            message: message.into(),
            status,
        }
    }
}

/// Plain acknowledgement (DELETE /cache)
#[derive(Debug, Clone, Serialize)]
pub struct MessageResponse {
    pub message: String,
}

impl MessageResponse {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

/// Response body for the stats endpoint (GET /stats)
#[derive(Debug, Clone, Serialize)]
pub struct StatsResponse {
    pub hits: u64,
    pub misses: u64,
    pub expirations: u64,
    pub write_failures: u64,
    pub read_failures: u64,
    /// Hit rate (hits / (hits + misses))
    pub hit_rate: f64,
}

impl From<CacheStats> for StatsResponse {
    fn from(stats: CacheStats) -> Self {
        Self {
            hit_rate: stats.hit_rate(),
            hits: stats.hits,
            misses: stats.misses,
            expirations: stats.expirations,
            write_failures: stats.write_failures,
            read_failures: stats.read_failures,
        }
    }
}

/// Liveness probe body (GET /health)
#[derive(Debug, Clone, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub version: &'static str,
    /// RFC 3339 server time
    pub timestamp: String,
}

impl HealthResponse {
    pub fn healthy() -> Self {
        Self {
            status: "healthy",
            version: env!("CARGO_PKG_VERSION"),
            timestamp: format_timestamp(SystemClock.now_ms()),
        }
    }
}

/// `{ "error": "..." }`, the body of every non-2xx response
#[derive(Debug, Clone, Serialize)]
pub struct ErrorResponse {
    pub error: String,
}

impl ErrorResponse {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            error: message.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::domain::fixtures;
    use crate::models::Coordinates;

    #[test]
    fn test_card_view_with_weather() {
        let coords = Coordinates::new(45.5, -73.6);
        let card = UserWeatherCard {
            user: fixtures::user("Ada", "Montreal", "Canada"),
            weather: Some(fixtures::weather(21.4, coords, 0)),
            coordinates: Some(coords),
        };

        let view = CardView::from(&card);
        assert_eq!(view.name, "Ada Tester");
        assert_eq!(view.location, "Montreal, Canada");
        assert_eq!(view.temperature, "21.4°C");
        assert_eq!(view.humidity, "50%");
        assert_eq!(view.condition, "Clear sky");
        assert_eq!(view.latitude, Some(45.5));
        assert!(!view.stale);
    }

    #[test]
    fn test_card_view_placeholders() {
        let card = UserWeatherCard {
            user: fixtures::user("Bob", "Nowhere", "Atlantis"),
            weather: None,
            coordinates: None,
        };

        let view = CardView::from(&card);
        assert_eq!(view.temperature, NOT_AVAILABLE);
        assert_eq!(view.humidity, NOT_AVAILABLE);
        assert_eq!(view.condition, WEATHER_UNAVAILABLE);
        assert_eq!(view.latitude, None);
    }

    #[test]
    fn test_cards_response_counts() {
        let coords = Coordinates::new(1.0, 1.0);
        let cards = vec![
            UserWeatherCard {
                user: fixtures::user("A", "X", "Y"),
                weather: Some(fixtures::weather(1.0, coords, 0)),
                coordinates: Some(coords),
            },
            UserWeatherCard {
                user: fixtures::user("B", "X", "Y"),
                weather: None,
                coordinates: None,
            },
        ];

        let resp = CardsResponse::new(&cards);
        assert_eq!(resp.total, 2);
        assert_eq!(resp.with_weather, 1);
    }

    #[test]
    fn test_stats_response_from_cache_stats() {
        let mut stats = CacheStats::new();
        stats.record_hit();
        stats.record_hit();
        stats.record_hit();
        stats.record_expiration();

        let resp = StatsResponse::from(stats);
        assert_eq!(resp.expirations, 1);
        assert!((resp.hit_rate - 0.75).abs() < 0.001);
    }

    #[test]
    fn test_health_and_error_json_shape() {
        let health = serde_json::to_value(HealthResponse::healthy()).unwrap();
        assert_eq!(health["status"], "healthy");
        assert!(health["timestamp"].as_str().unwrap().contains('T'));

        let error = serde_json::to_value(ErrorResponse::new("No cards loaded")).unwrap();
        assert_eq!(error, serde_json::json!({ "error": "No cards loaded" }));
    }
}

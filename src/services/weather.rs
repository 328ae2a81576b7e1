//! Current weather provider (Open-Meteo) with retry and stale fallback.

use std::sync::Arc;
use std::time::Duration;

use serde::Deserialize;
use tracing::{error, info, warn};

use crate::cache::DEFAULT_TTL;
use crate::clock::{duration_ms, Clock};
use crate::error::FetchError;
use crate::models::{Coordinates, Weather};
use crate::retry::RetryExecutor;
use crate::services::client::ApiClient;

const CURRENT_FIELDS: &str = "temperature_2m,relative_humidity_2m,weather_code";

#[derive(Debug, Deserialize)]
struct ForecastResponse {
    current: Option<CurrentConditions>,
}

#[derive(Debug, Deserialize)]
struct CurrentConditions {
    temperature_2m: f64,
    relative_humidity_2m: f64,
    weather_code: i32,
}

/// Describes a WMO weather interpretation code.
pub fn describe_weather_code(code: i32) -> &'static str {
    match code {
        0 => "Clear sky",
        1 => "Mainly clear",
        2 => "Partly cloudy",
        3 => "Overcast",
        45 => "Foggy",
        48 => "Depositing rime fog",
        51 => "Light drizzle",
        53 => "Moderate drizzle",
        55 => "Dense drizzle",
        61 => "Slight rain",
        63 => "Moderate rain",
        65 => "Heavy rain",
        71 => "Slight snow",
        73 => "Moderate snow",
        75 => "Heavy snow",
        77 => "Snow grains",
        80 => "Slight rain showers",
        81 => "Moderate rain showers",
        82 => "Violent rain showers",
        85 => "Slight snow showers",
        86 => "Heavy snow showers",
        95 => "Thunderstorm",
        96 => "Thunderstorm with slight hail",
        99 => "Thunderstorm with heavy hail",
        _ => "Unknown",
    }
}

#[derive(Debug, Clone)]
pub struct WeatherService {
    client: ApiClient,
    retry: RetryExecutor,
    clock: Arc<dyn Clock>,
    url: String,
    max_age: Duration,
}

impl WeatherService {
    pub fn new(client: ApiClient, retry: RetryExecutor, clock: Arc<dyn Clock>, url: impl Into<String>) -> Self {
        Self {
            client,
            retry,
            clock,
            url: url.into(),
            max_age: DEFAULT_TTL,
        }
    }

    /// Age below which a reading counts as fresh (30 minutes by default).
    pub fn with_max_age(mut self, max_age: Duration) -> Self {
        self.max_age = max_age;
        self
    }

    /// Fetches the current weather at `coordinates`, retrying failures.
    pub async fn get_current_weather(&self, coordinates: Coordinates) -> Result<Weather, FetchError> {
        let Coordinates { lat, lng } = coordinates;
        if !lat.is_finite() || !lng.is_finite() || lat == 0.0 || lng == 0.0 {
            error!("Invalid coordinates: {}, {}", lat, lng);
            return Err(FetchError::InvalidCoordinates { lat, lng });
        }

        let query = [
            ("latitude", lat.to_string()),
            ("longitude", lng.to_string()),
            ("current", CURRENT_FIELDS.to_string()),
        ];
        let label = format!("Weather API ({}, {})", lat, lng);

        self.retry
            .run(&label, || async {
                let data: ForecastResponse = self.client.fetch_json(&self.url, &query).await?;
                let current = data
                    .current
                    .ok_or_else(|| FetchError::Validation("No current weather data available".to_string()))?;

                Ok::<_, FetchError>(Weather {
                    temperature: current.temperature_2m,
                    humidity: current.relative_humidity_2m,
                    condition: describe_weather_code(current.weather_code).to_string(),
                    timestamp: self.clock.now_ms(),
                    coordinates,
                    stale: false,
                })
            })
            .await
    }

    /// True when `weather` is younger than the configured max age.
    pub fn is_fresh(&self, weather: &Weather) -> bool {
        self.clock.now_ms() - weather.timestamp < duration_ms(self.max_age)
    }

    /// Fetches the current weather, falling back to `fallback` on failure.
    ///
    /// A fresh fallback is returned as is; an outdated one is returned marked
    /// `stale`. Without a fallback the provider error is returned.
    pub async fn get_weather_with_fallback(
        &self,
        coordinates: Coordinates,
        fallback: Option<&Weather>,
    ) -> Result<Weather, FetchError> {
        match self.get_current_weather(coordinates).await {
            Ok(weather) => Ok(weather),
            Err(e) => {
                warn!(
                    "Weather API failed for {}, {}: {}",
                    coordinates.lat, coordinates.lng, e
                );
                match fallback {
                    Some(cached) if self.is_fresh(cached) => {
                        info!("Using fresh cached weather data");
                        Ok(cached.clone())
                    }
                    Some(cached) => {
                        warn!("Cached weather data is stale but will be used as fallback");
                        Ok(Weather {
                            stale: true,
                            ..cached.clone()
                        })
                    }
                    None => {
                        error!("No fallback weather data available");
                        Err(e)
                    }
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::ManualClock;
    use crate::models::domain::fixtures;
    use crate::retry::RetryPolicy;
    use serde_json::json;
    use wiremock::matchers::{method, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    const NOW: i64 = 1_700_000_000_000;
    const PARIS: Coordinates = Coordinates { lat: 48.85, lng: 2.35 };

    fn service(server: &MockServer) -> WeatherService {
        WeatherService::new(
            ApiClient::new(Duration::from_secs(5)).unwrap(),
            RetryExecutor::new(RetryPolicy::from_millis(3, 1, 5)),
            Arc::new(ManualClock::new(NOW)),
            server.uri(),
        )
    }

    fn forecast(code: i32) -> serde_json::Value {
        json!({
            "latitude": 48.85,
            "current": { "temperature_2m": 12.3, "relative_humidity_2m": 81, "weather_code": code }
        })
    }

    #[test]
    fn test_describe_weather_code() {
        assert_eq!(describe_weather_code(0), "Clear sky");
        assert_eq!(describe_weather_code(63), "Moderate rain");
        assert_eq!(describe_weather_code(99), "Thunderstorm with heavy hail");
        assert_eq!(describe_weather_code(4), "Unknown");
    }

    #[tokio::test]
    async fn test_current_weather() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(query_param("latitude", "48.85"))
            .and(query_param("longitude", "2.35"))
            .and(query_param("current", CURRENT_FIELDS))
            .respond_with(ResponseTemplate::new(200).set_body_json(forecast(3)))
            .mount(&server)
            .await;

        let weather = service(&server).get_current_weather(PARIS).await.unwrap();
        assert_eq!(weather.temperature, 12.3);
        assert_eq!(weather.humidity, 81.0);
        assert_eq!(weather.condition, "Overcast");
        assert_eq!(weather.timestamp, NOW);
        assert_eq!(weather.coordinates, PARIS);
        assert!(!weather.stale);
    }

    #[tokio::test]
    async fn test_missing_current_is_retried() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "latitude": 1.0 })))
            .up_to_n_times(1)
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_body_json(forecast(0)))
            .mount(&server)
            .await;

        let weather = service(&server).get_current_weather(PARIS).await.unwrap();
        assert_eq!(weather.condition, "Clear sky");
    }

    #[tokio::test]
    async fn test_invalid_coordinates_skip_request() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_body_json(forecast(0)))
            .expect(0)
            .mount(&server)
            .await;

        let result = service(&server).get_current_weather(Coordinates::new(0.0, 10.0)).await;
        assert!(matches!(result, Err(FetchError::InvalidCoordinates { .. })));

        let result = service(&server).get_current_weather(Coordinates::new(f64::NAN, 10.0)).await;
        assert!(matches!(result, Err(FetchError::InvalidCoordinates { .. })));
    }

    #[tokio::test]
    async fn test_fallback_fresh_stale_and_missing() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(502))
            .expect(9)
            .mount(&server)
            .await;
        let service = service(&server);

        let fresh = fixtures::weather(20.0, PARIS, NOW - 60_000);
        let result = service.get_weather_with_fallback(PARIS, Some(&fresh)).await.unwrap();
        assert_eq!(result, fresh);

        let old = fixtures::weather(5.0, PARIS, NOW - 31 * 60_000);
        let result = service.get_weather_with_fallback(PARIS, Some(&old)).await.unwrap();
        assert!(result.stale);
        assert_eq!(result.temperature, 5.0);

        let result = service.get_weather_with_fallback(PARIS, None).await;
        assert!(matches!(result, Err(FetchError::Status(502))));
    }

    #[test]
    fn test_is_fresh_boundary() {
        let service = WeatherService::new(
            ApiClient::new(Duration::from_secs(1)).unwrap(),
            RetryExecutor::default(),
            Arc::new(ManualClock::new(NOW)),
            "http://unused",
        )
        .with_max_age(Duration::from_secs(60));

        assert!(service.is_fresh(&fixtures::weather(1.0, PARIS, NOW - 59_999)));
        assert!(!service.is_fresh(&fixtures::weather(1.0, PARIS, NOW - 60_000)));
    }
}

//! Dashboard Module
//!
//! Builds user+weather cards and keeps their weather current. The weather
//! refresh is what the auto-refresh scheduler runs.

use std::convert::Infallible;

use anyhow::bail;
use tokio::sync::RwLock;
use tracing::{info, warn};

use crate::cache::{CacheKey, ExpiringCache};
use crate::error::FetchError;
use crate::fanout::fetch_all;
use crate::models::{Coordinates, User, UserWeatherCard, Weather};
use crate::services::{GeocodingService, UserService, WeatherService};

/// Card list plus the providers that fill it.
#[derive(Debug)]
pub struct Dashboard {
    users: UserService,
    geocoder: GeocodingService,
    weather: WeatherService,
    cache: ExpiringCache,
    cards: RwLock<Vec<UserWeatherCard>>,
}

impl Dashboard {
    pub fn new(users: UserService, geocoder: GeocodingService, weather: WeatherService, cache: ExpiringCache) -> Self {
        Self {
            users,
            geocoder,
            weather,
            cache,
            cards: RwLock::new(Vec::new()),
        }
    }

    /// Snapshot of the current cards.
    pub async fn cards(&self) -> Vec<UserWeatherCard> {
        self.cards.read().await.clone()
    }

    /// Loads `count` users and converts them into cards, replacing the current set.
    ///
    /// `fresh` bypasses the cached user list. Geocoding or weather failures only
    /// leave the affected card without weather; only a user fetch failure is an error.
    pub async fn load_cards(&self, count: usize, fresh: bool) -> Result<Vec<UserWeatherCard>, FetchError> {
        let users = if fresh {
            self.users.fetch_fresh_users(count).await?
        } else {
            self.users.fetch_random_users(count, true).await?
        };

        let converted = fetch_all(users, |user| async move { Ok::<_, Infallible>(self.convert(user).await) }).await;
        let cards: Vec<UserWeatherCard> = converted.into_values().into_iter().flatten().collect();

        let with_weather = cards.iter().filter(|c| c.weather.is_some()).count();
        info!("Loaded {} cards ({} with weather)", cards.len(), with_weather);

        self.remember_weather(&cards);
        if with_weather > 0 {
            self.cache.record_fetch(CacheKey::LastFetch.as_str());
        }

        *self.cards.write().await = cards.clone();
        Ok(cards)
    }

    /// Geocodes a user and looks up the weather there.
    pub async fn convert(&self, user: User) -> UserWeatherCard {
        info!(
            "Processing location for {}: {}, {}",
            user.full_name(),
            user.location.city,
            user.location.country
        );

        let Some(coordinates) = self
            .geocoder
            .get_coordinates(&user.location.city, &user.location.country)
            .await
        else {
            warn!("Could not get coordinates for {}", user.name.first);
            return UserWeatherCard {
                user,
                weather: None,
                coordinates: None,
            };
        };

        let weather = match self.weather.get_current_weather(coordinates).await {
            Ok(weather) => Some(weather),
            Err(e) => {
                warn!("No weather for {}: {}", user.name.first, e);
                None
            }
        };

        UserWeatherCard {
            user,
            weather,
            coordinates: Some(coordinates),
        }
    }

    /// Refreshes the weather of every card with coordinates, concurrently.
    ///
    /// A failed lookup falls back to the card's previous reading (marked stale
    /// once outdated). Fails only when lookups were attempted and none succeeded.
    pub async fn refresh_weather(&self) -> anyhow::Result<()> {
        let snapshot = self.cards().await;
        let cached: Vec<Option<Weather>> = self.cache.get(CacheKey::Weather.as_str()).unwrap_or_default();

        let targets: Vec<(usize, Coordinates, Option<Weather>)> = snapshot
            .iter()
            .enumerate()
            .filter_map(|(index, card)| {
                let fallback = card
                    .weather
                    .clone()
                    .or_else(|| cached.get(index).cloned().flatten());
                card.coordinates.map(|coords| (index, coords, fallback))
            })
            .collect();

        if targets.is_empty() {
            info!("No cards with coordinates to refresh");
            return Ok(());
        }

        let total = targets.len();
        let result = fetch_all(targets, |(index, coords, fallback)| async move {
            info!("Refreshing weather for coordinates: {}, {}", coords.lat, coords.lng);
            self.weather
                .get_weather_with_fallback(coords, fallback.as_ref())
                .await
                .map(|weather| (index, coords, weather))
        })
        .await;
        let success_count = result.success_count();

        let updated = {
            let mut cards = self.cards.write().await;
            for (index, coords, weather) in result.into_values().into_iter().flatten() {
                // Skip slots whose card was replaced by a reload meanwhile
                if let Some(card) = cards.get_mut(index).filter(|c| c.coordinates == Some(coords)) {
                    card.weather = Some(weather);
                }
            }
            cards.clone()
        };

        info!(
            "Weather refresh complete! Successfully updated {} out of {} cards",
            success_count, total
        );

        self.remember_weather(&updated);
        if success_count == 0 {
            bail!("Weather refresh failed for all {} cards", total);
        }
        self.cache.record_fetch(CacheKey::LastFetch.as_str());
        Ok(())
    }

    /// Refreshes only when the last recorded fetch is at least one TTL old.
    pub async fn refresh_if_due(&self) -> anyhow::Result<bool> {
        if !self.cache.should_refresh(CacheKey::LastFetch.as_str()) {
            return Ok(false);
        }
        self.refresh_weather().await?;
        Ok(true)
    }

    fn remember_weather(&self, cards: &[UserWeatherCard]) {
        let weather: Vec<Option<Weather>> = cards.iter().map(|c| c.weather.clone()).collect();
        self.cache.set(CacheKey::Weather.as_str(), &weather);
    }
}

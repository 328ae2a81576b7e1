//! Forward geocoding: city and country to coordinates (OpenCage).
//!
//! Lookups never fail outward; any problem yields `None` and the card is shown
//! without weather.

use serde::Deserialize;
use tracing::{debug, error, warn};

use crate::models::Coordinates;
use crate::services::client::ApiClient;

#[derive(Debug, Deserialize)]
struct GeocodeResponse {
    #[serde(default)]
    results: Vec<GeocodeResult>,
}

#[derive(Debug, Deserialize)]
struct GeocodeResult {
    geometry: Coordinates,
}

#[derive(Debug, Clone)]
pub struct GeocodingService {
    client: ApiClient,
    url: String,
    api_key: String,
}

impl GeocodingService {
    pub fn new(client: ApiClient, url: impl Into<String>, api_key: impl Into<String>) -> Self {
        Self {
            client,
            url: url.into(),
            api_key: api_key.into(),
        }
    }

    /// Coordinates of the best match for "city,country", if any.
    pub async fn get_coordinates(&self, city: &str, country: &str) -> Option<Coordinates> {
        if self.api_key.is_empty() {
            warn!("No geocoding API key configured, skipping {}, {}", city, country);
            return None;
        }

        let query = [
            ("q", format!("{},{}", city, country)),
            ("key", self.api_key.clone()),
        ];

        let data: GeocodeResponse = match self.client.fetch_json(&self.url, &query).await {
            Ok(data) => data,
            Err(e) => {
                error!("Error getting coordinates for {}, {}: {}", city, country, e);
                return None;
            }
        };

        let coordinates = data.results.into_iter().next().map(|r| r.geometry);
        if coordinates.is_none() {
            debug!("No geocoding results for {}, {}", city, country);
        }
        coordinates
    }
}

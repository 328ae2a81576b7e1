//! Domain models shared by the providers, the dashboard and the API
//!
//! User payloads keep the random-user provider's field names so cached lists
//! round-trip unchanged.

use serde::{Deserialize, Serialize};

/// Person's name
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserName {
    #[serde(default)]
    pub title: String,
    pub first: String,
    pub last: String,
}

/// Claimed location of a user
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserLocation {
    pub city: String,
    pub country: String,
}

/// Profile picture URLs
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct UserPicture {
    #[serde(default)]
    pub large: String,
    #[serde(default)]
    pub medium: String,
    #[serde(default)]
    pub thumbnail: String,
}

/// Randomized user profile
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct User {
    pub name: UserName,
    pub location: UserLocation,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub picture: UserPicture,
}

impl User {
    /// "First Last"
    pub fn full_name(&self) -> String {
        format!("{} {}", self.name.first, self.name.last)
    }
}

/// Geographic coordinates
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinates {
    pub lat: f64,
    pub lng: f64,
}

impl Coordinates {
    pub fn new(lat: f64, lng: f64) -> Self {
        Self { lat, lng }
    }
}

/// Current weather at a location
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Weather {
    /// Degrees Celsius
    pub temperature: f64,
    /// Relative humidity, percent
    pub humidity: f64,
    /// Human-readable condition
    pub condition: String,
    /// When the reading was fetched (Unix milliseconds)
    pub timestamp: i64,
    pub coordinates: Coordinates,
    /// Set when an outdated reading is served because the provider failed
    #[serde(default)]
    pub stale: bool,
}

/// A user with the weather at their location
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserWeatherCard {
    pub user: User,
    pub weather: Option<Weather>,
    pub coordinates: Option<Coordinates>,
}

#[cfg(test)]
pub(crate) mod fixtures {
    use super::*;

    pub fn user(first: &str, city: &str, country: &str) -> User {
        User {
            name: UserName {
                title: "Ms".to_string(),
                first: first.to_string(),
                last: "Tester".to_string(),
            },
            location: UserLocation {
                city: city.to_string(),
                country: country.to_string(),
            },
            email: format!("{}@example.com", first.to_lowercase()),
            picture: UserPicture::default(),
        }
    }

    pub fn weather(temperature: f64, coordinates: Coordinates, timestamp: i64) -> Weather {
        Weather {
            temperature,
            humidity: 50.0,
            condition: "Clear sky".to_string(),
            timestamp,
            coordinates,
            stale: false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_user_deserializes_provider_payload() {
        let json = r#"{
            "gender": "female",
            "name": {"title": "Miss", "first": "Jennie", "last": "Nichols"},
            "location": {"city": "Billings", "country": "United States", "postcode": "63104"},
            "email": "jennie.nichols@example.com",
            "picture": {"large": "https://x/l.jpg", "medium": "https://x/m.jpg", "thumbnail": "https://x/t.jpg"}
        }"#;

        let user: User = serde_json::from_str(json).unwrap();
        assert_eq!(user.full_name(), "Jennie Nichols");
        assert_eq!(user.location.city, "Billings");
        assert_eq!(user.picture.large, "https://x/l.jpg");
    }

    #[test]
    fn test_weather_stale_defaults_false() {
        let json = r#"{"temperature": 1.5, "humidity": 80, "condition": "Foggy",
            "timestamp": 0, "coordinates": {"lat": 1.0, "lng": 2.0}}"#;

        let weather: Weather = serde_json::from_str(json).unwrap();
        assert!(!weather.stale);
        assert_eq!(weather.coordinates, Coordinates::new(1.0, 2.0));
    }
}

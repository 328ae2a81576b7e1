//! Data Providers Module
//!
//! HTTP clients for the random user, geocoding and weather providers.

mod client;
mod geocoding;
mod users;
mod weather;

pub use client::{validate, ApiClient};
pub use geocoding::GeocodingService;
pub use users::UserService;
pub use weather::{describe_weather_code, WeatherService};

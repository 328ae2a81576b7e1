//! Data models for the user weather service
//!
//! Domain values produced by the providers, plus the DTOs used for
//! serializing/deserializing HTTP request and response bodies.

pub mod domain;
pub mod requests;
pub mod responses;

// Re-export commonly used types
pub use domain::{Coordinates, User, UserLocation, UserName, UserPicture, UserWeatherCard, Weather};
pub use requests::{IntervalRequest, ReloadRequest};
pub use responses::{
    CardView, CardsResponse, ErrorResponse, HealthResponse, MessageResponse, RefreshResponse,
    StatsResponse,
};

//! Error types for the user weather service
//!
//! Provides unified error handling using thiserror.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use thiserror::Error;

use crate::models::ErrorResponse;

// == Fetch Error Enum ==
/// Failure of a remote lookup. Every variant is retryable.
#[derive(Error, Debug)]
pub enum FetchError {
    /// Connection, timeout or other transport failure
    #[error("Request failed: {0}")]
    Transport(#[from] reqwest::Error),

    /// Provider answered with a non-success status
    #[error("HTTP error! status: {0}")]
    Status(u16),

    /// Response body could not be decoded
    #[error("Invalid response body: {0}")]
    Decode(String),

    /// Response decoded but was rejected by a shape check
    #[error("{0}")]
    Validation(String),

    /// Lookup refused before any request was made
    #[error("Invalid coordinates: {lat}, {lng}")]
    InvalidCoordinates { lat: f64, lng: f64 },
}

// == Store Error Enum ==
/// Failure of the durable key-value store. Always absorbed by the cache.
#[derive(Error, Debug)]
pub enum StoreError {
    /// Filesystem failure
    #[error("Storage I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Envelope could not be encoded or decoded
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

// == App Error Enum ==
/// Error type for the HTTP surface.
#[derive(Error, Debug)]
pub enum AppError {
    /// Nothing loaded yet
    #[error("Not found: {0}")]
    NotFound(String),

    /// Invalid request data
    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    /// A caller-initiated refresh failed
    #[error("Refresh failed: {0}")]
    RefreshFailed(String),

    /// Upstream provider failure
    #[error(transparent)]
    Upstream(#[from] FetchError),

    /// Internal server error
    #[error("Internal error: {0}")]
    Internal(String),
}

// == IntoResponse Implementation ==
impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = match &self {
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::InvalidRequest(_) => StatusCode::BAD_REQUEST,
            AppError::RefreshFailed(_) | AppError::Upstream(_) => StatusCode::BAD_GATEWAY,
            AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };

        let body = Json(ErrorResponse::new(self.to_string()));

        (status, body).into_response()
    }
}

// == Result Type Alias ==
/// Convenience Result type for the HTTP surface.
pub type Result<T> = std::result::Result<T, AppError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_mapping() {
        let cases = [
            (AppError::NotFound("cards".into()), StatusCode::NOT_FOUND),
            (AppError::InvalidRequest("x".into()), StatusCode::BAD_REQUEST),
            (AppError::RefreshFailed("x".into()), StatusCode::BAD_GATEWAY),
            (AppError::Upstream(FetchError::Status(503)), StatusCode::BAD_GATEWAY),
            (AppError::Internal("x".into()), StatusCode::INTERNAL_SERVER_ERROR),
        ];

        for (err, expected) in cases {
            assert_eq!(err.into_response().status(), expected);
        }
    }

    #[test]
    fn test_fetch_error_messages() {
        assert_eq!(FetchError::Status(404).to_string(), "HTTP error! status: 404");
        assert_eq!(
            FetchError::Validation("No users found in response".into()).to_string(),
            "No users found in response"
        );
    }
}

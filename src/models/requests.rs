//! Request DTOs for the user weather API
//!
//! Defines the structure of incoming HTTP request bodies.

use serde::Deserialize;

/// Largest accepted refresh interval (one week)
pub const MAX_INTERVAL_MINUTES: u64 = 7 * 24 * 60;

/// Largest accepted user count per reload
pub const MAX_USER_COUNT: usize = 50;

/// Request body for PUT /refresh/interval
#[derive(Debug, Clone, Deserialize)]
pub struct IntervalRequest {
    /// New refresh interval in minutes
    pub minutes: u64,
}

impl IntervalRequest {
    /// Returns an error message if validation fails, None if valid.
    pub fn validate(&self) -> Option<String> {
        if self.minutes == 0 {
            return Some("Interval must be at least 1 minute".to_string());
        }
        if self.minutes > MAX_INTERVAL_MINUTES {
            return Some(format!(
                "Interval exceeds maximum of {} minutes",
                MAX_INTERVAL_MINUTES
            ));
        }
        None
    }
}

/// Request body for POST /users/reload
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ReloadRequest {
    /// Number of users to load (configured default if absent)
    #[serde(default)]
    pub count: Option<usize>,
    /// Bypass the cached user list
    #[serde(default)]
    pub fresh: bool,
}

impl ReloadRequest {
    /// Returns an error message if validation fails, None if valid.
    pub fn validate(&self) -> Option<String> {
        match self.count {
            Some(0) => Some("Count must be at least 1".to_string()),
            Some(n) if n > MAX_USER_COUNT => {
                Some(format!("Count exceeds maximum of {}", MAX_USER_COUNT))
            }
            _ => None,
        }
    }
}

//! Configuration Module
//!
//! Handles loading and managing service configuration from environment variables.

use std::env;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use crate::cache::DEFAULT_TTL;
use crate::retry::{RetryPolicy, DEFAULT_BASE_DELAY_MS, DEFAULT_MAX_ATTEMPTS, DEFAULT_MAX_DELAY_MS};
use crate::tasks::DEFAULT_INTERVAL_MINUTES;

pub const DEFAULT_RANDOM_USER_URL: &str = "https://randomuser.me/api/";
pub const DEFAULT_OPENCAGE_URL: &str = "https://api.opencagedata.com/geocode/v1/json";
pub const DEFAULT_WEATHER_URL: &str = "https://api.open-meteo.com/v1/forecast";

/// Service configuration parameters.
///
/// All values can be configured via environment variables with sensible defaults.
#[derive(Debug, Clone)]
pub struct Config {
    /// HTTP server port
    pub server_port: u16,
    /// Number of user cards to load
    pub user_count: usize,
    /// Lifetime of cached entries in minutes
    pub cache_ttl_minutes: u64,
    /// Auto-refresh cadence in minutes
    pub refresh_interval_minutes: u64,
    /// Directory for the persistent cache; in-memory when unset
    pub cache_dir: Option<PathBuf>,
    /// Maximum attempts per provider call
    pub retry_max_attempts: u32,
    /// First retry delay in milliseconds
    pub retry_base_delay_ms: u64,
    /// Retry delay cap in milliseconds
    pub retry_max_delay_ms: u64,
    /// Per-request timeout in seconds
    pub request_timeout_secs: u64,
    pub random_user_url: String,
    pub opencage_url: String,
    /// OpenCage API key; geocoding is skipped when empty
    pub opencage_key: String,
    pub weather_url: String,
}

impl Config {
    /// Creates a new Config by loading values from environment variables.
    ///
    /// # Environment Variables
    /// - `SERVER_PORT` - HTTP server port (default: 3000)
    /// - `USER_COUNT` - Number of user cards (default: 5)
    /// - `CACHE_TTL_MINUTES` - Cache entry lifetime (default: 30)
    /// - `REFRESH_INTERVAL_MINUTES` - Auto-refresh cadence (default: 30)
    /// - `CACHE_DIR` - Persistent cache directory (default: in-memory)
    /// - `RETRY_MAX_ATTEMPTS` - Attempts per provider call (default: 3)
    /// - `RETRY_BASE_DELAY_MS` - First retry delay (default: 1000)
    /// - `RETRY_MAX_DELAY_MS` - Retry delay cap (default: 5000)
    /// - `REQUEST_TIMEOUT_SECS` - Per-request timeout (default: 10)
    /// - `RANDOM_USER_URL`, `OPENCAGE_URL`, `OPENCAGE_KEY`, `WEATHER_URL` - Providers
    pub fn from_env() -> Self {
        let defaults = Self::default();

        Self {
            server_port: parse_var("SERVER_PORT").unwrap_or(defaults.server_port),
            user_count: parse_var("USER_COUNT").unwrap_or(defaults.user_count),
            cache_ttl_minutes: parse_var("CACHE_TTL_MINUTES").unwrap_or(defaults.cache_ttl_minutes),
            refresh_interval_minutes: parse_var("REFRESH_INTERVAL_MINUTES")
                .unwrap_or(defaults.refresh_interval_minutes),
            cache_dir: env::var("CACHE_DIR")
                .ok()
                .filter(|v| !v.is_empty())
                .map(PathBuf::from),
            retry_max_attempts: parse_var("RETRY_MAX_ATTEMPTS").unwrap_or(defaults.retry_max_attempts),
            retry_base_delay_ms: parse_var("RETRY_BASE_DELAY_MS").unwrap_or(defaults.retry_base_delay_ms),
            retry_max_delay_ms: parse_var("RETRY_MAX_DELAY_MS").unwrap_or(defaults.retry_max_delay_ms),
            request_timeout_secs: parse_var("REQUEST_TIMEOUT_SECS")
                .unwrap_or(defaults.request_timeout_secs),
            random_user_url: env::var("RANDOM_USER_URL").unwrap_or(defaults.random_user_url),
            opencage_url: env::var("OPENCAGE_URL").unwrap_or(defaults.opencage_url),
            opencage_key: env::var("OPENCAGE_KEY").unwrap_or(defaults.opencage_key),
            weather_url: env::var("WEATHER_URL").unwrap_or(defaults.weather_url),
        }
    }

    /// Retry policy shared by the provider calls.
    pub fn retry_policy(&self) -> RetryPolicy {
        RetryPolicy::from_millis(
            self.retry_max_attempts,
            self.retry_base_delay_ms,
            self.retry_max_delay_ms,
        )
    }

    pub fn cache_ttl(&self) -> Duration {
        Duration::from_secs(self.cache_ttl_minutes * 60)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            server_port: 3000,
            user_count: 5,
            cache_ttl_minutes: DEFAULT_TTL.as_secs() / 60,
            refresh_interval_minutes: DEFAULT_INTERVAL_MINUTES,
            cache_dir: None,
            retry_max_attempts: DEFAULT_MAX_ATTEMPTS,
            retry_base_delay_ms: DEFAULT_BASE_DELAY_MS,
            retry_max_delay_ms: DEFAULT_MAX_DELAY_MS,
            request_timeout_secs: 10,
            random_user_url: DEFAULT_RANDOM_USER_URL.to_string(),
            opencage_url: DEFAULT_OPENCAGE_URL.to_string(),
            opencage_key: String::new(),
            weather_url: DEFAULT_WEATHER_URL.to_string(),
        }
    }
}

fn parse_var<T: FromStr>(name: &str) -> Option<T> {
    env::var(name).ok().and_then(|v| v.parse().ok())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_default() {
        let config = Config::default();
        assert_eq!(config.server_port, 3000);
        assert_eq!(config.user_count, 5);
        assert_eq!(config.cache_ttl(), Duration::from_secs(30 * 60));
        assert_eq!(config.refresh_interval_minutes, 30);
        assert!(config.cache_dir.is_none());
        assert_eq!(config.retry_policy(), RetryPolicy::default());
    }

    #[test]
    fn test_config_from_env() {
        env::set_var("USER_COUNT", "8");
        env::set_var("RETRY_MAX_ATTEMPTS", "not-a-number");
        env::set_var("CACHE_DIR", "/tmp/user-weather-cache");

        let config = Config::from_env();
        assert_eq!(config.user_count, 8);
        assert_eq!(config.retry_max_attempts, 3);
        assert_eq!(config.cache_dir, Some(PathBuf::from("/tmp/user-weather-cache")));

        env::remove_var("USER_COUNT");
        env::remove_var("RETRY_MAX_ATTEMPTS");
        env::remove_var("CACHE_DIR");
    }
}

//! Cache Module
//!
//! Provides a TTL cache with lazy expiry over a pluggable key-value store.

mod backend;
mod entry;
mod stats;
mod store;


use std::time::Duration;

// Re-export public types
pub use backend::{FileStore, KeyValueStore, MemoryStore};
pub use entry::CacheEntry;
pub use stats::CacheStats;
pub use store::ExpiringCache;

// == Public Constants ==
/// Default lifetime of a cache entry
pub const DEFAULT_TTL: Duration = Duration::from_secs(30 * 60);

// == Cache Keys ==
/// The application's fixed cache key namespace.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CacheKey {
    /// Last fetched list of random users
    Users,
    /// Last known weather, one slot per card
    Weather,
    /// Timestamp of the last successful fetch
    LastFetch,
}

impl CacheKey {
    pub const ALL: [CacheKey; 3] = [CacheKey::Users, CacheKey::Weather, CacheKey::LastFetch];

    pub fn as_str(&self) -> &'static str {
        match self {
            CacheKey::Users => "weather_app_users",
            CacheKey::Weather => "weather_app_weather",
            CacheKey::LastFetch => "weather_app_last_fetch",
        }
    }
}

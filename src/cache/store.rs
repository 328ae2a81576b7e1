//! Expiring Cache Module
//!
//! Typed cache over a raw key-value store. Every entry carries an absolute
//! expiry; reads lazily evict expired entries. Storage failures never escape:
//! writes degrade to no-ops and reads degrade to misses.

use std::sync::Arc;
use std::time::Duration;

use parking_lot::Mutex;
use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::{debug, error, info};

use crate::cache::{CacheEntry, CacheKey, CacheStats, KeyValueStore, DEFAULT_TTL};
use crate::clock::{duration_ms, Clock, SystemClock};
use crate::error::StoreError;

// == Expiring Cache ==
/// Cache with a fixed per-instance TTL and a fixed key namespace.
///
/// Concurrent writers to the same key are last-write-wins.
#[derive(Debug, Clone)]
pub struct ExpiringCache {
    /// Persistence backend
    store: Arc<dyn KeyValueStore>,
    /// Time source for expiry decisions
    clock: Arc<dyn Clock>,
    /// Lifetime of every entry
    ttl: Duration,
    /// Keys removed by `clear_all`
    namespace: Arc<[String]>,
    /// Shared statistics
    stats: Arc<Mutex<CacheStats>>,
}

impl ExpiringCache {
    // == Constructor ==
    /// Creates a cache over `store` with the default 30 minute TTL, the system
    /// clock and the application key namespace.
    pub fn new(store: Arc<dyn KeyValueStore>) -> Self {
        Self::with_clock(store, Arc::new(SystemClock), DEFAULT_TTL)
    }

    /// Creates a cache with an explicit clock and TTL.
    pub fn with_clock(store: Arc<dyn KeyValueStore>, clock: Arc<dyn Clock>, ttl: Duration) -> Self {
        Self {
            store,
            clock,
            ttl,
            namespace: CacheKey::ALL.iter().map(|k| k.as_str().to_string()).collect(),
            stats: Arc::new(Mutex::new(CacheStats::new())),
        }
    }

    /// Replaces the key namespace cleared by [`ExpiringCache::clear_all`].
    pub fn with_namespace<I, S>(mut self, keys: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.namespace = keys.into_iter().map(Into::into).collect();
        self
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    pub fn now_ms(&self) -> i64 {
        self.clock.now_ms()
    }

    // == Set ==
    /// Stores `value` under `key`, stamped with the current time.
    pub fn set<T: Serialize>(&self, key: &str, value: &T) {
        self.set_at(key, value, self.clock.now_ms());
    }

    /// Stores `value` under `key` as if written at `now_ms`.
    ///
    /// Overwrites any existing entry. Failures are logged and dropped.
    pub fn set_at<T: Serialize>(&self, key: &str, value: &T, now_ms: i64) {
        let entry = CacheEntry::new(value, now_ms, self.ttl);

        let result = serde_json::to_string(&entry)
            .map_err(StoreError::from)
            .and_then(|raw| self.store.set_raw(key, &raw));

        if let Err(e) = result {
            error!("Failed to cache data for {}: {}", key, e);
            self.stats.lock().record_write_failure();
        }
    }

    // == Get ==
    /// Returns the value stored under `key` if present and not expired.
    ///
    /// Expired entries are removed on the way out. Unreadable or malformed
    /// data is logged and reported as a miss.
    pub fn get<T: DeserializeOwned>(&self, key: &str) -> Option<T> {
        let raw = match self.store.get_raw(key) {
            Ok(Some(raw)) => raw,
            Ok(None) => {
                self.stats.lock().record_miss();
                return None;
            }
            Err(e) => {
                error!("Failed to retrieve cached data for {}: {}", key, e);
                self.stats.lock().record_read_failure();
                return None;
            }
        };

        let entry: CacheEntry<T> = match serde_json::from_str(&raw) {
            Ok(entry) => entry,
            Err(e) => {
                error!("Failed to decode cached data for {}: {}", key, e);
                self.stats.lock().record_read_failure();
                return None;
            }
        };

        if entry.is_expired(self.clock.now_ms()) {
            debug!("Cache entry {} expired, evicting", key);
            self.remove(key);
            self.stats.lock().record_expiration();
            return None;
        }

        self.stats.lock().record_hit();
        Some(entry.into_value())
    }

    // == Remove ==
    /// Removes `key`. Idempotent.
    pub fn remove(&self, key: &str) {
        if let Err(e) = self.store.remove_raw(key) {
            error!("Failed to remove cached data for {}: {}", key, e);
        }
    }

    // == Clear All ==
    /// Removes every key in this cache's namespace.
    pub fn clear_all(&self) {
        for key in self.namespace.iter() {
            self.remove(key);
        }
        info!("Cleared all cache data ({} keys)", self.namespace.len());
    }

    // == Fetch Bookkeeping ==
    /// Records the current time as the last fetch under `last_fetch_key`.
    pub fn record_fetch(&self, last_fetch_key: &str) {
        let now = self.clock.now_ms();
        self.set_at(last_fetch_key, &now, now);
    }

    /// True when no fetch is recorded under `last_fetch_key` or at least one
    /// TTL has elapsed since it.
    pub fn should_refresh(&self, last_fetch_key: &str) -> bool {
        match self.get::<i64>(last_fetch_key) {
            None => true,
            Some(last_fetch) => self.clock.now_ms() - last_fetch >= duration_ms(self.ttl),
        }
    }

    // == Stats ==
    /// Returns a snapshot of the cache statistics.
    pub fn stats(&self) -> CacheStats {
        self.stats.lock().clone()
    }
}

// == Unit Tests ==
#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::MemoryStore;
    use crate::clock::ManualClock;

    const TTL: Duration = Duration::from_secs(30 * 60);

    fn setup() -> (ExpiringCache, Arc<MemoryStore>, Arc<ManualClock>) {
        let store = Arc::new(MemoryStore::new());
        let clock = Arc::new(ManualClock::new(1_700_000_000_000));
        let cache = ExpiringCache::with_clock(store.clone(), clock.clone(), TTL);
        (cache, store, clock)
    }

    #[derive(Debug)]
    struct BrokenStore;

    impl KeyValueStore for BrokenStore {
        fn get_raw(&self, _key: &str) -> Result<Option<String>, StoreError> {
            Err(std::io::Error::other("disk on fire").into())
        }

        fn set_raw(&self, _key: &str, _value: &str) -> Result<(), StoreError> {
            Err(std::io::Error::other("disk full").into())
        }

        fn remove_raw(&self, _key: &str) -> Result<(), StoreError> {
            Err(std::io::Error::other("read only").into())
        }
    }

    #[test]
    fn test_set_and_get() {
        let (cache, _, _) = setup();

        cache.set("key1", &vec!["a".to_string(), "b".to_string()]);
        let value: Option<Vec<String>> = cache.get("key1");

        assert_eq!(value, Some(vec!["a".to_string(), "b".to_string()]));
    }

    #[test]
    fn test_get_nonexistent() {
        let (cache, _, _) = setup();
        assert_eq!(cache.get::<String>("nonexistent"), None);
        assert_eq!(cache.stats().misses, 1);
    }

    #[test]
    fn test_overwrite() {
        let (cache, _, _) = setup();

        cache.set("key1", &1);
        cache.set("key1", &2);
        assert_eq!(cache.get::<i32>("key1"), Some(2));
    }

    #[test]
    fn test_expiry_evicts_lazily_and_idempotently() {
        let (cache, store, clock) = setup();

        cache.set("key1", &"value");
        assert_eq!(cache.get::<String>("key1").as_deref(), Some("value"));

        // Still valid exactly at the TTL boundary
        clock.advance(TTL);
        assert!(cache.get::<String>("key1").is_some());

        clock.advance(Duration::from_millis(1));
        assert!(store.get_raw("key1").unwrap().is_some(), "no background sweep");
        assert_eq!(cache.get::<String>("key1"), None);
        assert!(store.get_raw("key1").unwrap().is_none(), "evicted on read");
        assert_eq!(cache.get::<String>("key1"), None);

        let stats = cache.stats();
        assert_eq!(stats.expirations, 1);
        assert_eq!(stats.hits, 2);
    }

    #[test]
    fn test_set_at_uses_given_timestamp() {
        let (cache, store, clock) = setup();
        let past = clock.now_ms() - duration_ms(TTL) - 1;

        cache.set_at("old", &42, past);
        assert_eq!(cache.get::<i32>("old"), None);
        assert!(store.is_empty());
    }

    #[test]
    fn test_remove_is_idempotent() {
        let (cache, _, _) = setup();

        cache.set("key1", &true);
        cache.remove("key1");
        cache.remove("key1");
        assert_eq!(cache.get::<bool>("key1"), None);
    }

    #[test]
    fn test_clear_all_only_touches_namespace() {
        let (cache, store, _) = setup();

        for key in CacheKey::ALL {
            cache.set(key.as_str(), &1);
        }
        cache.set("foreign", &1);

        cache.clear_all();

        for key in CacheKey::ALL {
            assert_eq!(cache.get::<i32>(key.as_str()), None);
        }
        assert_eq!(store.len(), 1);
        assert_eq!(cache.get::<i32>("foreign"), Some(1));
    }

    #[test]
    fn test_custom_namespace() {
        let (cache, store, _) = setup();
        let cache = cache.with_namespace(["a", "b"]);

        cache.set("a", &1);
        cache.set("b", &2);
        cache.set(CacheKey::Users.as_str(), &3);
        cache.clear_all();

        assert_eq!(store.len(), 1);
    }

    #[test]
    fn test_should_refresh_lifecycle() {
        let (cache, _, clock) = setup();
        let key = CacheKey::LastFetch.as_str();

        assert!(cache.should_refresh(key));

        cache.record_fetch(key);
        assert!(!cache.should_refresh(key));

        clock.advance(TTL - Duration::from_millis(1));
        assert!(!cache.should_refresh(key));

        clock.advance(Duration::from_millis(1));
        assert!(cache.should_refresh(key));
    }

    #[test]
    fn test_malformed_data_is_a_miss() {
        let (cache, store, _) = setup();

        store.set_raw("bad", "{not json").unwrap();
        assert_eq!(cache.get::<String>("bad"), None);

        // Valid envelope, wrong value type
        cache.set("typed", &"text");
        assert_eq!(cache.get::<u64>("typed"), None);

        assert_eq!(cache.stats().read_failures, 2);
    }

    #[test]
    fn test_broken_backend_is_absorbed() {
        let cache = ExpiringCache::new(Arc::new(BrokenStore));

        cache.set("key", &1);
        assert_eq!(cache.get::<i32>("key"), None);
        cache.remove("key");
        cache.clear_all();
        assert!(cache.should_refresh("key"));

        let stats = cache.stats();
        assert_eq!(stats.write_failures, 1);
        assert_eq!(stats.read_failures, 2);
    }

    #[test]
    fn test_clones_share_storage_and_stats() {
        let (cache, _, _) = setup();
        let other = cache.clone();

        cache.set("shared", &"x");
        assert_eq!(other.get::<String>("shared").as_deref(), Some("x"));
        assert_eq!(cache.stats().hits, 1);
    }
}

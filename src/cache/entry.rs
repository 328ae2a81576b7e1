//! Cache Entry Module
//!
//! Defines the envelope persisted for every cached value.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::clock::duration_ms;

// == Cache Entry ==
/// A cached value together with its storage and expiry timestamps.
///
/// Only `value` is ever handed back to callers of the cache.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CacheEntry<T> {
    /// The stored value
    pub value: T,
    /// Storage timestamp (Unix milliseconds)
    pub stored_at: i64,
    /// Expiration timestamp (Unix milliseconds)
    pub expires_at: i64,
}

impl<T> CacheEntry<T> {
    // == Constructor ==
    /// Wraps `value` stored at `now_ms` with the given TTL.
    pub fn new(value: T, now_ms: i64, ttl: Duration) -> Self {
        Self {
            value,
            stored_at: now_ms,
            expires_at: now_ms.saturating_add(duration_ms(ttl)),
        }
    }

    // == Is Expired ==
    /// Checks if the entry has expired at `now_ms`.
    ///
    /// The entry is still valid at exactly `expires_at`; it expires strictly after.
    pub fn is_expired(&self, now_ms: i64) -> bool {
        now_ms > self.expires_at
    }

    // == Time To Live ==
    /// Returns remaining TTL in milliseconds at `now_ms`, zero once expired.
    pub fn ttl_remaining_ms(&self, now_ms: i64) -> i64 {
        (self.expires_at - now_ms).max(0)
    }

    /// Unwraps the stored value.
    pub fn into_value(self) -> T {
        self.value
    }
}

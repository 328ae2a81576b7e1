//! Cache Statistics Module
//!
//! Tracks cache hits, misses, lazy expirations and absorbed storage failures.

use serde::Serialize;

// == Cache Stats ==
/// Tracks cache performance and degradation counters.
#[derive(Debug, Clone, Default, Serialize, PartialEq, Eq)]
pub struct CacheStats {
    /// Number of reads that returned a value
    pub hits: u64,
    /// Number of reads that returned nothing (absent, expired or unreadable)
    pub misses: u64,
    /// Number of entries evicted on read because their TTL had elapsed
    pub expirations: u64,
    /// Number of writes dropped because the backend or encoding failed
    pub write_failures: u64,
    /// Number of reads degraded to a miss because stored data was unusable
    pub read_failures: u64,
}

impl CacheStats {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fraction of reads that were hits; 0.0 before the first read.
    pub fn hit_rate(&self) -> f64 {
        match self.hits + self.misses {
            0 => 0.0,
            reads => self.hits as f64 / reads as f64,
        }
    }

    // == Recording ==

    pub fn record_hit(&mut self) {
        self.hits += 1;
    }

    pub fn record_miss(&mut self) {
        self.misses += 1;
    }

    /// An expiration is also a miss.
    pub fn record_expiration(&mut self) {
        self.expirations += 1;
        self.misses += 1;
    }

    pub fn record_write_failure(&mut self) {
        self.write_failures += 1;
    }

    /// A read failure is also a miss.
    pub fn record_read_failure(&mut self) {
        self.read_failures += 1;
        self.misses += 1;
    }
}

// == Unit Tests ==
#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stats_new() {
        let stats = CacheStats::new();
        assert_eq!(stats, CacheStats::default());
        assert_eq!(stats.hit_rate(), 0.0);
    }

    #[test]
    fn test_hit_rate_mixed() {
        let mut stats = CacheStats::new();
        stats.record_hit();
        stats.record_miss();
        assert_eq!(stats.hit_rate(), 0.5);
    }

    #[test]
    fn test_expiration_and_read_failure_count_as_misses() {
        let mut stats = CacheStats::new();
        stats.record_expiration();
        stats.record_read_failure();

        assert_eq!(stats.expirations, 1);
        assert_eq!(stats.read_failures, 1);
        assert_eq!(stats.misses, 2);
        assert_eq!(stats.hit_rate(), 0.0);
    }

    #[test]
    fn test_record_write_failure() {
        let mut stats = CacheStats::new();
        stats.record_write_failure();
        stats.record_write_failure();
        assert_eq!(stats.write_failures, 2);
        assert_eq!(stats.misses, 0);
    }
}

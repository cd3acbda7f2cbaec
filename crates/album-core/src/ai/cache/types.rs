//! Core data types for caption caching.

use serde::Serialize;
use std::time::{Duration, Instant};

use crate::gallery::Caption;

/// A cached caption with bookkeeping.
#[derive(Debug, Clone)]
pub struct CachedCaption {
    /// The cached result.
    pub caption: Caption,
    /// When the entry was stored.
    pub inserted_at: Instant,
    /// Number of times the entry has been served.
    pub hits: u64,
}

impl CachedCaption {
    /// Create a new entry stamped at `now`.
    pub fn new(caption: Caption, now: Instant) -> Self {
        Self { caption, inserted_at: now, hits: 0 }
    }

    /// Whether the entry is older than `ttl` at `now`.
    pub fn is_expired(&self, now: Instant, ttl: Duration) -> bool {
        now.saturating_duration_since(self.inserted_at) >= ttl
    }
}

/// Cache statistics for observability.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct CacheStats {
    /// Total number of cache hits.
    pub total_hits: u64,
    /// Total number of cache misses (including expired entries).
    pub total_misses: u64,
    /// Total number of evictions (capacity or expiry).
    pub total_evictions: u64,
    /// Current number of captions in cache.
    pub cache_size: usize,
}

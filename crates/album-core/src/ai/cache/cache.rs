//! CaptionCache implementation with TTL expiry and oldest-entry eviction.

use std::collections::HashMap;
use std::sync::{PoisonError, RwLock};
use std::time::Instant;
use tracing::{debug, info};

use super::config::{CacheConfig, CacheConfigError};
use super::types::{CacheStats, CachedCaption};
use crate::gallery::Caption;

/// In-memory caption cache keyed by image URL.
///
/// Entries expire `ttl_secs` after insertion; expiry is checked on read and
/// by `purge_expired`. When full, the oldest entry is evicted first.
#[derive(Debug)]
pub struct CaptionCache {
    /// The cache storage (image URL -> cached caption).
    entries: RwLock<HashMap<String, CachedCaption>>,
    /// Cache configuration.
    config: CacheConfig,
    /// Cache statistics.
    stats: RwLock<CacheStats>,
}

impl CaptionCache {
    /// Create a new caption cache with the given configuration.
    ///
    /// # Errors
    /// Returns `CacheConfigError` if the configuration is invalid.
    pub fn new(config: CacheConfig) -> Result<Self, CacheConfigError> {
        config.validate()?;

        Ok(Self {
            entries: RwLock::new(HashMap::new()),
            config,
            stats: RwLock::new(CacheStats::default()),
        })
    }

    /// The active configuration.
    pub fn config(&self) -> &CacheConfig {
        &self.config
    }

    /// Returns a fresh caption for `url`, if any.
    pub fn get(&self, url: &str) -> Option<Caption> {
        self.get_at(url, Instant::now())
    }

    pub(crate) fn get_at(&self, url: &str, now: Instant) -> Option<Caption> {
        if !self.config.enabled {
            return None;
        }

        let mut entries = self.entries.write().unwrap_or_else(PoisonError::into_inner);
        let mut stats = self.stats.write().unwrap_or_else(PoisonError::into_inner);

        match entries.get_mut(url) {
            Some(entry) if !entry.is_expired(now, self.config.ttl()) => {
                entry.hits += 1;
                stats.total_hits += 1;
                debug!(url = %url, hits = entry.hits, "Caption cache hit");
                Some(entry.caption.clone())
            }
            Some(_) => {
                entries.remove(url);
                stats.total_misses += 1;
                stats.total_evictions += 1;
                stats.cache_size = entries.len();
                debug!(url = %url, "Caption cache entry expired");
                None
            }
            None => {
                stats.total_misses += 1;
                debug!(url = %url, "Caption cache miss");
                None
            }
        }
    }

    /// Stores a caption for `url`, evicting the oldest entry when full.
    pub fn insert(&self, url: &str, caption: Caption) {
        self.insert_at(url, caption, Instant::now());
    }

    pub(crate) fn insert_at(&self, url: &str, caption: Caption, now: Instant) {
        if !self.config.enabled {
            return;
        }

        let mut entries = self.entries.write().unwrap_or_else(PoisonError::into_inner);
        let mut stats = self.stats.write().unwrap_or_else(PoisonError::into_inner);

        if !entries.contains_key(url) && entries.len() >= self.config.max_entries {
            if let Some(oldest) = Self::find_oldest_key(&entries) {
                entries.remove(&oldest);
                stats.total_evictions += 1;
                info!(url = %oldest, "Evicted oldest caption from cache");
            }
        }

        entries.insert(url.to_string(), CachedCaption::new(caption, now));
        stats.cache_size = entries.len();
    }

    /// Removes every expired entry, returning how many were dropped.
    pub fn purge_expired(&self) -> usize {
        self.purge_expired_at(Instant::now())
    }

    pub(crate) fn purge_expired_at(&self, now: Instant) -> usize {
        let ttl = self.config.ttl();
        let mut entries = self.entries.write().unwrap_or_else(PoisonError::into_inner);
        let before = entries.len();
        entries.retain(|_, entry| !entry.is_expired(now, ttl));
        let purged = before - entries.len();

        let mut stats = self.stats.write().unwrap_or_else(PoisonError::into_inner);
        stats.total_evictions += purged as u64;
        stats.cache_size = entries.len();

        if purged > 0 {
            debug!(purged, "Purged expired captions");
        }
        purged
    }

    /// Drops every entry.
    pub fn clear(&self) {
        let mut entries = self.entries.write().unwrap_or_else(PoisonError::into_inner);
        let cleared = entries.len();
        entries.clear();

        let mut stats = self.stats.write().unwrap_or_else(PoisonError::into_inner);
        stats.total_evictions += cleared as u64;
        stats.cache_size = 0;
    }

    /// Snapshot of the cache statistics.
    pub fn stats(&self) -> CacheStats {
        self.stats.read().unwrap_or_else(PoisonError::into_inner).clone()
    }

    /// Number of stored entries, fresh or not.
    pub fn len(&self) -> usize {
        self.entries.read().unwrap_or_else(PoisonError::into_inner).len()
    }

    /// Whether the cache holds no entries.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn find_oldest_key(entries: &HashMap<String, CachedCaption>) -> Option<String> {
        entries.iter().min_by_key(|(_, entry)| entry.inserted_at).map(|(key, _)| key.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    fn caption(text: &str) -> Caption {
        Caption { caption: text.to_string(), tags: vec!["night".to_string()] }
    }

    fn cache(ttl_secs: u64, max_entries: usize) -> CaptionCache {
        CaptionCache::new(CacheConfig { enabled: true, ttl_secs, max_entries }).unwrap()
    }

    #[test]
    fn test_new_rejects_invalid_config() {
        let config = CacheConfig { ttl_secs: 0, ..CacheConfig::default() };
        assert!(CaptionCache::new(config).is_err());
    }

    #[test]
    fn test_hit_within_ttl_and_miss_after() {
        let cache = cache(3600, 8);
        let t0 = Instant::now();
        cache.insert_at("https://img/a.jpg", caption("A street."), t0);

        let hit = cache.get_at("https://img/a.jpg", t0 + Duration::from_secs(3599));
        assert_eq!(hit.unwrap().caption, "A street.");

        assert!(cache.get_at("https://img/a.jpg", t0 + Duration::from_secs(3600)).is_none());
        assert!(cache.is_empty());

        let stats = cache.stats();
        assert_eq!(stats.total_hits, 1);
        assert_eq!(stats.total_misses, 1);
        assert_eq!(stats.total_evictions, 1);
    }

    #[test]
    fn test_unknown_key_counts_miss() {
        let cache = cache(60, 8);
        assert!(cache.get("nope").is_none());
        assert_eq!(cache.stats().total_misses, 1);
    }

    #[test]
    fn test_oldest_entry_evicted_at_capacity() {
        let cache = cache(3600, 2);
        let t0 = Instant::now();
        cache.insert_at("a", caption("a"), t0);
        cache.insert_at("b", caption("b"), t0 + Duration::from_secs(1));
        cache.insert_at("c", caption("c"), t0 + Duration::from_secs(2));

        let now = t0 + Duration::from_secs(3);
        assert!(cache.get_at("a", now).is_none());
        assert!(cache.get_at("b", now).is_some());
        assert!(cache.get_at("c", now).is_some());
        assert_eq!(cache.stats().cache_size, 2);
    }

    #[test]
    fn test_reinsert_same_key_does_not_evict() {
        let cache = cache(3600, 1);
        cache.insert("a", caption("first"));
        cache.insert("a", caption("second"));
        assert_eq!(cache.get("a").unwrap().caption, "second");
        assert_eq!(cache.stats().total_evictions, 0);
    }

    #[test]
    fn test_purge_expired() {
        let cache = cache(10, 8);
        let t0 = Instant::now();
        cache.insert_at("old", caption("old"), t0);
        cache.insert_at("new", caption("new"), t0 + Duration::from_secs(8));

        assert_eq!(cache.purge_expired_at(t0 + Duration::from_secs(12)), 1);
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn test_disabled_cache_stores_nothing() {
        let cache =
            CaptionCache::new(CacheConfig { enabled: false, ..CacheConfig::default() }).unwrap();
        cache.insert("a", caption("a"));
        assert!(cache.get("a").is_none());
        assert!(cache.is_empty());
    }

    #[test]
    fn test_clear() {
        let cache = cache(60, 8);
        cache.insert("a", caption("a"));
        cache.clear();
        assert!(cache.is_empty());
        assert_eq!(cache.stats().cache_size, 0);
    }
}

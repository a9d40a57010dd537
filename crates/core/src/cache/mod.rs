//! In-memory TTL cache for upstream query results.
//!
//! The store is a string-keyed map guarded by an async `RwLock`. Entries
//! carry an expiry instant and are evicted lazily when a read finds them
//! stale. There is no single-flight deduplication: concurrent requests for
//! the same uncached key may both miss and both fetch upstream, which is
//! tolerated because a redundant call is cheap and not a correctness issue.

pub mod key;

use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};

use tokio::sync::RwLock;

struct Entry<V> {
    value: V,
    expires_at: Instant,
}

impl<V> Entry<V> {
    fn is_expired(&self) -> bool {
        Instant::now() >= self.expires_at
    }
}

/// A shared, thread-safe key-value store with per-entry expiration.
///
/// Values must be `Clone`; `get` hands out an owned copy so no lock is held
/// while the caller works with the result.
#[derive(Clone)]
pub struct MemoryCache<V> {
    entries: Arc<RwLock<HashMap<String, Entry<V>>>>,
    default_ttl: Duration,
}

impl<V: Clone> MemoryCache<V> {
    /// Create a cache whose `put` uses the given TTL.
    pub fn new(default_ttl: Duration) -> Self {
        Self { entries: Arc::new(RwLock::new(HashMap::new())), default_ttl }
    }

    /// Look up a key, treating expired entries as misses.
    ///
    /// An expired entry is removed on the way out so the map does not
    /// accumulate dead slots for hot keys.
    pub async fn get(&self, key: &str) -> Option<V> {
        {
            let entries = self.entries.read().await;
            match entries.get(key) {
                Some(entry) if !entry.is_expired() => return Some(entry.value.clone()),
                Some(_) => {}
                None => return None,
            }
        }

        // Expired: upgrade to a write lock and drop the stale entry. Another
        // task may have refreshed it in between, so re-check the expiry.
        let mut entries = self.entries.write().await;
        if let Some(entry) = entries.get(key) {
            if !entry.is_expired() {
                return Some(entry.value.clone());
            }
            entries.remove(key);
            tracing::debug!(key, "evicted expired cache entry");
        }
        None
    }

    /// Insert a value with the cache's default TTL.
    pub async fn put(&self, key: impl Into<String>, value: V) {
        self.put_with_ttl(key, value, self.default_ttl).await;
    }

    /// Insert a value with an explicit TTL.
    pub async fn put_with_ttl(&self, key: impl Into<String>, value: V, ttl: Duration) {
        let entry = Entry { value, expires_at: Instant::now() + ttl };
        self.entries.write().await.insert(key.into(), entry);
    }

    /// Number of entries currently stored, including not-yet-evicted
    /// expired ones.
    pub async fn len(&self) -> usize {
        self.entries.read().await.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_put_then_get() {
        let cache: MemoryCache<String> = MemoryCache::new(Duration::from_secs(60));
        cache.put("k", "v".to_string()).await;
        assert_eq!(cache.get("k").await.as_deref(), Some("v"));
    }

    #[tokio::test]
    async fn test_miss_on_unknown_key() {
        let cache: MemoryCache<u32> = MemoryCache::new(Duration::from_secs(60));
        assert_eq!(cache.get("nope").await, None);
    }

    #[tokio::test]
    async fn test_expired_entry_is_a_miss() {
        let cache: MemoryCache<u32> = MemoryCache::new(Duration::from_secs(60));
        cache.put_with_ttl("k", 7, Duration::ZERO).await;
        assert_eq!(cache.get("k").await, None);
        // and the stale slot was evicted
        assert_eq!(cache.len().await, 0);
    }

    #[tokio::test]
    async fn test_put_overwrites() {
        let cache: MemoryCache<u32> = MemoryCache::new(Duration::from_secs(60));
        cache.put("k", 1).await;
        cache.put("k", 2).await;
        assert_eq!(cache.get("k").await, Some(2));
        assert_eq!(cache.len().await, 1);
    }

    #[tokio::test]
    async fn test_explicit_ttl_beats_default() {
        let cache: MemoryCache<u32> = MemoryCache::new(Duration::ZERO);
        cache.put_with_ttl("k", 9, Duration::from_secs(60)).await;
        assert_eq!(cache.get("k").await, Some(9));
    }
}

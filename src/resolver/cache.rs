//! Domain mapping cache.
//!
//! The resolver talks to the cache through the `PageCache` port so the store
//! can be swapped (shared KV service, in-process map). `MemoryPageCache` is the
//! in-process implementation: absolute expiry per entry, expired entries are
//! treated as absent and dropped on read.

use async_trait::async_trait;
use dashmap::DashMap;
use std::time::{Duration, Instant};
use thiserror::Error;

/// Error raised by a cache store.
#[derive(Debug, Error)]
#[error("cache error: {0}")]
pub struct CacheError(pub String);

/// Key-value store with per-entry TTL.
#[async_trait]
pub trait PageCache: Send + Sync {
    /// Get a live value.
    async fn get(&self, key: &str) -> Result<Option<String>, CacheError>;

    /// Store a value that expires after `ttl`.
    async fn put(&self, key: &str, value: String, ttl: Duration) -> Result<(), CacheError>;
}

#[derive(Debug, Clone)]
struct CacheEntry {
    value: String,
    expires_at: Instant,
}

/// In-memory TTL cache.
#[derive(Debug)]
pub struct MemoryPageCache {
    entries: DashMap<String, CacheEntry>,
    max_entries: usize,
}

impl MemoryPageCache {
    /// Create a cache holding at most `max_entries` mappings.
    pub fn new(max_entries: usize) -> Self {
        Self {
            entries: DashMap::new(),
            max_entries: max_entries.max(1),
        }
    }

    /// Drop every expired entry. Returns how many were removed.
    pub fn purge_expired(&self) -> usize {
        let now = Instant::now();
        let before = self.entries.len();
        self.entries.retain(|_, entry| entry.expires_at > now);
        before - self.entries.len()
    }

    /// Number of stored entries, expired ones included until purged.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl Default for MemoryPageCache {
    fn default() -> Self {
        Self::new(10_000)
    }
}

#[async_trait]
impl PageCache for MemoryPageCache {
    async fn get(&self, key: &str) -> Result<Option<String>, CacheError> {
        let now = Instant::now();
        {
            let Some(entry) = self.entries.get(key) else {
                return Ok(None);
            };
            if entry.expires_at > now {
                return Ok(Some(entry.value.clone()));
            }
        }
        self.entries.remove_if(key, |_, entry| entry.expires_at <= now);
        Ok(None)
    }

    async fn put(&self, key: &str, value: String, ttl: Duration) -> Result<(), CacheError> {
        if !self.entries.contains_key(key) && self.entries.len() >= self.max_entries {
            self.purge_expired();
            if self.entries.len() >= self.max_entries {
                return Err(CacheError(format!(
                    "capacity of {} entries reached",
                    self.max_entries
                )));
            }
        }

        self.entries.insert(
            key.to_string(),
            CacheEntry {
                value,
                expires_at: Instant::now() + ttl,
            },
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_put_get() {
        let cache = MemoryPageCache::new(10);
        assert!(cache.get("domain:a.xyz").await.unwrap().is_none());

        cache
            .put("domain:a.xyz", "page".into(), Duration::from_secs(60))
            .await
            .unwrap();
        assert_eq!(cache.get("domain:a.xyz").await.unwrap().as_deref(), Some("page"));
        assert!(cache.get("domain:b.xyz").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_expired_entry_is_absent() {
        let cache = MemoryPageCache::new(10);
        cache
            .put("k", "v".into(), Duration::from_millis(20))
            .await
            .unwrap();
        tokio::time::sleep(Duration::from_millis(50)).await;

        assert!(cache.get("k").await.unwrap().is_none());
        assert!(cache.is_empty());
    }

    #[tokio::test]
    async fn test_capacity_evicts_expired_first() {
        let cache = MemoryPageCache::new(2);
        cache.put("old", "v".into(), Duration::from_millis(10)).await.unwrap();
        cache.put("live", "v".into(), Duration::from_secs(60)).await.unwrap();
        tokio::time::sleep(Duration::from_millis(30)).await;

        cache.put("new", "v".into(), Duration::from_secs(60)).await.unwrap();
        assert_eq!(cache.len(), 2);

        let err = cache.put("extra", "v".into(), Duration::from_secs(60)).await;
        assert!(err.is_err());

        // Overwriting an existing key never hits the cap.
        cache.put("live", "v2".into(), Duration::from_secs(60)).await.unwrap();
        assert_eq!(cache.get("live").await.unwrap().as_deref(), Some("v2"));
    }
}

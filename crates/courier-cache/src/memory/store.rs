//! In-memory cache implementation using the moka crate.

use std::time::{Duration, Instant};

use async_trait::async_trait;
use moka::Expiry;
use moka::future::Cache;

use courier_core::config::cache::MemoryCacheConfig;
use courier_core::result::AppResult;
use courier_core::traits::cache::CacheProvider;

/// Entries carry their own TTL so callers can override the cache-wide default.
struct PerEntryExpiry;

impl Expiry<String, (String, Duration)> for PerEntryExpiry {
    fn expire_after_create(
        &self,
        _key: &String,
        value: &(String, Duration),
        _created_at: Instant,
    ) -> Option<Duration> {
        Some(value.1)
    }
}

/// In-memory cache provider using moka.
#[derive(Debug, Clone)]
pub struct MemoryCacheProvider {
    /// The underlying moka cache, storing `(value, ttl)` pairs.
    cache: Cache<String, (String, Duration)>,
    /// Default TTL for entries.
    default_ttl: Duration,
}

impl MemoryCacheProvider {
    /// Create a new in-memory cache from configuration.
    pub fn new(config: &MemoryCacheConfig, default_ttl_seconds: u64) -> Self {
        let cache = Cache::builder()
            .max_capacity(config.max_capacity)
            .expire_after(PerEntryExpiry)
            .build();

        Self {
            cache,
            default_ttl: Duration::from_secs(default_ttl_seconds),
        }
    }
}

#[async_trait]
impl CacheProvider for MemoryCacheProvider {
    async fn get(&self, key: &str) -> AppResult<Option<String>> {
        Ok(self.cache.get(key).await.map(|(value, _)| value))
    }

    async fn set(&self, key: &str, value: &str, ttl: Duration) -> AppResult<()> {
        self.cache
            .insert(key.to_string(), (value.to_string(), ttl))
            .await;
        Ok(())
    }

    async fn set_default(&self, key: &str, value: &str) -> AppResult<()> {
        self.set(key, value, self.default_ttl).await
    }

    async fn delete(&self, key: &str) -> AppResult<()> {
        self.cache.remove(key).await;
        Ok(())
    }

    async fn exists(&self, key: &str) -> AppResult<bool> {
        Ok(self.cache.contains_key(key))
    }

    async fn health_check(&self) -> AppResult<bool> {
        Ok(true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn provider() -> MemoryCacheProvider {
        MemoryCacheProvider::new(&MemoryCacheConfig::default(), 300)
    }

    #[tokio::test]
    async fn test_set_and_get() {
        let cache = provider();
        cache.set("a", "1", Duration::from_secs(60)).await.unwrap();
        assert_eq!(cache.get("a").await.unwrap().as_deref(), Some("1"));
        assert!(cache.exists("a").await.unwrap());
    }

    #[tokio::test]
    async fn test_get_missing_returns_none() {
        let cache = provider();
        assert!(cache.get("missing").await.unwrap().is_none());
        assert!(!cache.exists("missing").await.unwrap());
    }

    #[tokio::test]
    async fn test_delete_removes_entry() {
        let cache = provider();
        cache.set("a", "1", Duration::from_secs(60)).await.unwrap();
        cache.delete("a").await.unwrap();
        assert!(cache.get("a").await.unwrap().is_none());
    }
}

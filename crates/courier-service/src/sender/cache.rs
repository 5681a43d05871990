//! Best-effort write-through cache for sent messages.

use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use courier_cache::{CacheManager, keys};
use courier_core::result::AppResult;
use courier_core::traits::cache::CacheProvider;

/// How long sent-message entries are retained.
const SENT_MESSAGE_TTL: Duration = Duration::from_secs(30 * 24 * 60 * 60);

/// Cache entry recorded after a confirmed delivery.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CachedMessage {
    /// Provider-assigned message identifier.
    pub provider_message_id: String,
    /// When the message was confirmed delivered.
    pub sent_at: DateTime<Utc>,
}

/// Write-through cache keyed by the provider message identifier.
///
/// The sender never reads from this cache; the read-back helpers exist for
/// operational tooling.
#[derive(Debug, Clone)]
pub struct SentMessageCache {
    cache: CacheManager,
}

impl SentMessageCache {
    /// Creates a new sent-message cache over the given backend.
    pub fn new(cache: CacheManager) -> Self {
        Self { cache }
    }

    /// Records a delivery. Entries expire after 30 days.
    pub async fn store(
        &self,
        provider_message_id: &str,
        sent_at: DateTime<Utc>,
    ) -> AppResult<()> {
        let entry = CachedMessage {
            provider_message_id: provider_message_id.to_string(),
            sent_at,
        };
        let key = keys::sent_message(provider_message_id);
        self.cache.set_json(&key, &entry, SENT_MESSAGE_TTL).await
    }

    /// Looks up a recorded delivery.
    pub async fn get(&self, provider_message_id: &str) -> AppResult<Option<CachedMessage>> {
        let key = keys::sent_message(provider_message_id);
        self.cache.get_json(&key).await
    }

    /// Checks whether a delivery has been recorded.
    pub async fn contains(&self, provider_message_id: &str) -> AppResult<bool> {
        let key = keys::sent_message(provider_message_id);
        self.cache.exists(&key).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use courier_cache::memory::MemoryCacheProvider;
    use courier_core::config::cache::MemoryCacheConfig;
    use std::sync::Arc;

    fn sent_cache() -> SentMessageCache {
        let provider = MemoryCacheProvider::new(&MemoryCacheConfig::default(), 300);
        SentMessageCache::new(CacheManager::from_provider(Arc::new(provider)))
    }

    #[tokio::test]
    async fn test_store_then_get_round_trips() {
        let cache = sent_cache();
        let sent_at = Utc::now();
        cache.store("wh-1", sent_at).await.unwrap();

        let entry = cache.get("wh-1").await.unwrap().unwrap();
        assert_eq!(entry.provider_message_id, "wh-1");
        assert_eq!(entry.sent_at, sent_at);
        assert!(cache.contains("wh-1").await.unwrap());
    }

    #[tokio::test]
    async fn test_get_unknown_id_returns_none() {
        let cache = sent_cache();
        assert!(cache.get("unknown").await.unwrap().is_none());
        assert!(!cache.contains("unknown").await.unwrap());
    }
}

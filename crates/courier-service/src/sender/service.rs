//! Batch sender: one cycle fetches pending messages and delivers each.

use std::sync::Arc;

use chrono::Utc;
use tracing::{debug, info, warn};

use courier_core::config::sender::FailurePolicy;
use courier_core::error::AppError;
use courier_core::result::AppResult;
use courier_database::repositories::message::MessageStore;
use courier_entity::message::model::Message;
use courier_webhook::client::{SendMessage, WebhookTransport};

use super::cache::SentMessageCache;

/// Batch size used when constructed with a non-positive value.
const DEFAULT_BATCH_SIZE: i64 = 2;

/// Delivers pending messages to the webhook provider in bounded batches.
///
/// Each cycle is independent: no state is carried between calls, and
/// messages within a batch are dispatched independently of one another.
pub struct SenderService {
    store: Arc<dyn MessageStore>,
    transport: Arc<dyn WebhookTransport>,
    /// Write-through cache; `None` when disabled by configuration.
    cache: Option<SentMessageCache>,
    batch_size: i64,
    on_failure: FailurePolicy,
}

impl SenderService {
    /// Creates a new sender service.
    ///
    /// A non-positive `batch_size` falls back to the default of 2.
    pub fn new(
        store: Arc<dyn MessageStore>,
        transport: Arc<dyn WebhookTransport>,
        cache: Option<SentMessageCache>,
        batch_size: i64,
        on_failure: FailurePolicy,
    ) -> Self {
        let batch_size = if batch_size <= 0 {
            DEFAULT_BATCH_SIZE
        } else {
            batch_size
        };

        Self {
            store,
            transport,
            cache,
            batch_size,
            on_failure,
        }
    }

    /// Runs one sending cycle: fetch up to `batch_size` pending messages
    /// (oldest first) and attempt delivery of each.
    ///
    /// Individual failures are logged and the cycle continues; the cycle
    /// itself fails only when a batch was fetched and *every* message in it
    /// failed. A failed dispatch leaves the message pending (retried next
    /// cycle) unless the mark-failed policy is configured.
    pub async fn send_pending_messages(&self) -> AppResult<()> {
        let messages = self.store.find_pending(self.batch_size).await?;

        if messages.is_empty() {
            debug!("No pending messages");
            return Ok(());
        }

        let attempted = messages.len();
        let mut failed = 0usize;

        for message in &messages {
            if let Err(err) = self.dispatch(message).await {
                warn!(message_id = %message.id, error = %err, "Failed to send message");
                failed += 1;
            }
        }

        if failed == attempted {
            return Err(AppError::external_service(format!(
                "All {attempted} pending messages failed to send"
            )));
        }

        info!(
            attempted,
            sent = attempted - failed,
            failed,
            "Sending cycle completed"
        );
        Ok(())
    }

    /// Dispatches a single message: webhook call, then status update, then
    /// best-effort cache write.
    async fn dispatch(&self, message: &Message) -> AppResult<()> {
        let request = SendMessage {
            to: message.phone_number.clone(),
            content: message.content.clone(),
        };

        let receipt = match self.transport.send(&request).await {
            Ok(receipt) => receipt,
            Err(err) => {
                if self.on_failure == FailurePolicy::MarkFailed {
                    if let Err(mark_err) = self.store.mark_failed(message.id).await {
                        warn!(
                            message_id = %message.id,
                            error = %mark_err,
                            "Failed to mark message failed"
                        );
                    }
                }
                return Err(err);
            }
        };

        let sent_at = Utc::now();
        self.store
            .mark_sent(message.id, &receipt.message_id, sent_at)
            .await?;

        // Cache failures must never affect the message outcome.
        if let Some(cache) = &self.cache {
            if let Err(err) = cache.store(&receipt.message_id, sent_at).await {
                warn!(
                    provider_message_id = %receipt.message_id,
                    error = %err,
                    "Failed to cache sent message"
                );
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use std::sync::Mutex;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;

    use async_trait::async_trait;
    use chrono::{DateTime, Utc};
    use uuid::Uuid;

    use courier_cache::CacheManager;
    use courier_core::error::ErrorKind;
    use courier_core::traits::cache::CacheProvider;
    use courier_webhook::client::DeliveryReceipt;

    fn pending(phone: &str, content: &str) -> Message {
        Message::new_pending(phone, content)
    }

    #[derive(Default)]
    struct MockStore {
        pending: Mutex<Vec<Message>>,
        sent: Mutex<Vec<(Uuid, String)>>,
        failed: Mutex<Vec<Uuid>>,
        fail_find: bool,
        fail_mark_sent: bool,
    }

    impl MockStore {
        fn with_pending(messages: Vec<Message>) -> Self {
            Self {
                pending: Mutex::new(messages),
                ..Self::default()
            }
        }
    }

    #[async_trait]
    impl MessageStore for MockStore {
        async fn find_pending(&self, limit: i64) -> AppResult<Vec<Message>> {
            if self.fail_find {
                return Err(AppError::database("connection reset"));
            }
            let pending = self.pending.lock().unwrap();
            Ok(pending.iter().take(limit as usize).cloned().collect())
        }

        async fn mark_sent(
            &self,
            id: Uuid,
            provider_message_id: &str,
            _sent_at: DateTime<Utc>,
        ) -> AppResult<()> {
            if self.fail_mark_sent {
                return Err(AppError::database("update failed"));
            }
            self.sent
                .lock()
                .unwrap()
                .push((id, provider_message_id.to_string()));
            Ok(())
        }

        async fn mark_failed(&self, id: Uuid) -> AppResult<()> {
            self.failed.lock().unwrap().push(id);
            Ok(())
        }
    }

    /// Transport that succeeds unless the recipient is listed as failing.
    struct MockTransport {
        calls: AtomicUsize,
        failing_recipients: Vec<String>,
    }

    impl MockTransport {
        fn ok() -> Self {
            Self {
                calls: AtomicUsize::new(0),
                failing_recipients: Vec::new(),
            }
        }

        fn failing_for(recipients: &[&str]) -> Self {
            Self {
                calls: AtomicUsize::new(0),
                failing_recipients: recipients.iter().map(|r| r.to_string()).collect(),
            }
        }

        fn calls(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl WebhookTransport for MockTransport {
        async fn send(&self, request: &SendMessage) -> AppResult<DeliveryReceipt> {
            let n = self.calls.fetch_add(1, Ordering::SeqCst) + 1;
            if self.failing_recipients.contains(&request.to) {
                return Err(AppError::external_service("webhook connection error"));
            }
            Ok(DeliveryReceipt {
                message: "Accepted".to_string(),
                message_id: format!("wh-{n}"),
            })
        }
    }

    /// Cache provider that records sets and optionally fails them.
    #[derive(Debug, Default)]
    struct MockCacheProvider {
        sets: Mutex<Vec<String>>,
        fail_set: bool,
    }

    #[async_trait]
    impl CacheProvider for MockCacheProvider {
        async fn get(&self, _key: &str) -> AppResult<Option<String>> {
            Ok(None)
        }

        async fn set(&self, key: &str, _value: &str, _ttl: Duration) -> AppResult<()> {
            if self.fail_set {
                return Err(AppError::cache("redis error"));
            }
            self.sets.lock().unwrap().push(key.to_string());
            Ok(())
        }

        async fn set_default(&self, key: &str, value: &str) -> AppResult<()> {
            self.set(key, value, Duration::from_secs(0)).await
        }

        async fn delete(&self, _key: &str) -> AppResult<()> {
            Ok(())
        }

        async fn exists(&self, _key: &str) -> AppResult<bool> {
            Ok(false)
        }

        async fn health_check(&self) -> AppResult<bool> {
            Ok(true)
        }
    }

    fn sender(
        store: Arc<MockStore>,
        transport: Arc<MockTransport>,
        cache: Option<SentMessageCache>,
    ) -> SenderService {
        SenderService::new(store, transport, cache, 2, FailurePolicy::Requeue)
    }

    #[tokio::test]
    async fn test_all_messages_sent_successfully() {
        let store = Arc::new(MockStore::with_pending(vec![
            pending("+905551111111", "Message 1"),
            pending("+905552222222", "Message 2"),
        ]));
        let transport = Arc::new(MockTransport::ok());
        let service = sender(Arc::clone(&store), Arc::clone(&transport), None);

        service.send_pending_messages().await.unwrap();

        assert_eq!(transport.calls(), 2);
        let sent = store.sent.lock().unwrap();
        assert_eq!(sent.len(), 2);
        assert_eq!(sent[0].1, "wh-1");
        assert_eq!(sent[1].1, "wh-2");
    }

    #[tokio::test]
    async fn test_no_pending_messages_is_a_noop() {
        let store = Arc::new(MockStore::default());
        let transport = Arc::new(MockTransport::ok());
        let service = sender(Arc::clone(&store), Arc::clone(&transport), None);

        service.send_pending_messages().await.unwrap();

        assert_eq!(transport.calls(), 0);
        assert!(store.sent.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_store_listing_failure_fails_the_cycle() {
        let store = Arc::new(MockStore {
            fail_find: true,
            ..MockStore::default()
        });
        let transport = Arc::new(MockTransport::ok());
        let service = sender(store, Arc::clone(&transport), None);

        let err = service.send_pending_messages().await.unwrap_err();
        assert_eq!(err.kind, ErrorKind::Database);
        assert_eq!(transport.calls(), 0);
    }

    #[tokio::test]
    async fn test_all_failed_returns_aggregate_error() {
        let store = Arc::new(MockStore::with_pending(vec![
            pending("+905551111111", "Message 1"),
            pending("+905552222222", "Message 2"),
        ]));
        let transport = Arc::new(MockTransport::failing_for(&[
            "+905551111111",
            "+905552222222",
        ]));
        let service = sender(Arc::clone(&store), transport, None);

        let err = service.send_pending_messages().await.unwrap_err();
        assert_eq!(err.kind, ErrorKind::ExternalService);
        assert!(err.message.contains("All 2"));

        // Both messages stay pending under the requeue policy.
        assert!(store.sent.lock().unwrap().is_empty());
        assert!(store.failed.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_partial_failure_returns_success() {
        let store = Arc::new(MockStore::with_pending(vec![
            pending("+905551111111", "Message 1"),
            pending("+905552222222", "Message 2"),
        ]));
        let transport = Arc::new(MockTransport::failing_for(&["+905552222222"]));
        let service = sender(Arc::clone(&store), transport, None);

        service.send_pending_messages().await.unwrap();

        let sent = store.sent.lock().unwrap();
        assert_eq!(sent.len(), 1);
    }

    #[tokio::test]
    async fn test_mark_sent_failure_counts_as_message_failure() {
        let store = Arc::new(MockStore {
            pending: Mutex::new(vec![pending("+905551111111", "Message 1")]),
            fail_mark_sent: true,
            ..MockStore::default()
        });
        let transport = Arc::new(MockTransport::ok());
        let service = sender(store, Arc::clone(&transport), None);

        // Delivery succeeded but persistence failed, and it was the only
        // message in the batch, so the cycle fails.
        let err = service.send_pending_messages().await.unwrap_err();
        assert_eq!(err.kind, ErrorKind::ExternalService);
        assert_eq!(transport.calls(), 1);
    }

    #[tokio::test]
    async fn test_cache_write_records_delivery() {
        let store = Arc::new(MockStore::with_pending(vec![pending(
            "+905551111111",
            "Message 1",
        )]));
        let transport = Arc::new(MockTransport::ok());
        let provider = Arc::new(MockCacheProvider::default());
        let shared: Arc<dyn CacheProvider> = provider.clone();
        let cache = SentMessageCache::new(CacheManager::from_provider(shared));
        let service = sender(store, transport, Some(cache));

        service.send_pending_messages().await.unwrap();

        let sets = provider.sets.lock().unwrap();
        assert_eq!(sets.as_slice(), ["message:wh-1"]);
    }

    #[tokio::test]
    async fn test_cache_failure_does_not_affect_the_cycle() {
        let store = Arc::new(MockStore::with_pending(vec![pending(
            "+905551111111",
            "Message 1",
        )]));
        let transport = Arc::new(MockTransport::ok());
        let provider = Arc::new(MockCacheProvider {
            fail_set: true,
            ..MockCacheProvider::default()
        });
        let cache = SentMessageCache::new(CacheManager::from_provider(provider));
        let service = sender(Arc::clone(&store), transport, Some(cache));

        service.send_pending_messages().await.unwrap();

        // The message is still marked sent.
        assert_eq!(store.sent.lock().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_no_cache_calls_when_disabled() {
        let store = Arc::new(MockStore::with_pending(vec![pending(
            "+905551111111",
            "Message 1",
        )]));
        let transport = Arc::new(MockTransport::ok());
        let service = sender(Arc::clone(&store), transport, None);

        service.send_pending_messages().await.unwrap();
        assert_eq!(store.sent.lock().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_mark_failed_policy_marks_the_message() {
        let store = Arc::new(MockStore::with_pending(vec![pending(
            "+905551111111",
            "Message 1",
        )]));
        let transport = Arc::new(MockTransport::failing_for(&["+905551111111"]));
        let service = SenderService::new(
            store.clone(),
            transport,
            None,
            2,
            FailurePolicy::MarkFailed,
        );

        let err = service.send_pending_messages().await.unwrap_err();
        assert_eq!(err.kind, ErrorKind::ExternalService);
        assert_eq!(store.failed.lock().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_batch_size_bounds_the_fetch() {
        let store = Arc::new(MockStore::with_pending(vec![
            pending("+905551111111", "Message 1"),
            pending("+905552222222", "Message 2"),
            pending("+905553333333", "Message 3"),
        ]));
        let transport = Arc::new(MockTransport::ok());
        let service = sender(store, Arc::clone(&transport), None);

        service.send_pending_messages().await.unwrap();
        assert_eq!(transport.calls(), 2);
    }

    #[test]
    fn test_non_positive_batch_size_falls_back_to_default() {
        let store = Arc::new(MockStore::default());
        let transport = Arc::new(MockTransport::ok());
        let service = SenderService::new(store, transport, None, 0, FailurePolicy::Requeue);
        assert_eq!(service.batch_size, DEFAULT_BATCH_SIZE);
    }

    #[test]
    fn test_custom_batch_size_is_kept() {
        let store = Arc::new(MockStore::default());
        let transport = Arc::new(MockTransport::ok());
        let service = SenderService::new(store, transport, None, 5, FailurePolicy::Requeue);
        assert_eq!(service.batch_size, 5);
    }
}

//! Fail-open cache client.
//!
//! # Responsibilities
//! - Wrap the remote store behind the fail-open policy
//! - Record every remote outcome against the owned circuit breaker
//! - Absorb every store error; callers never see a `Result`
//!
//! # Design Decisions
//! - A caching layer that can itself cause outages defeats its purpose, so
//!   no public operation throws or blocks on a broken store
//! - A cache miss is a successful remote call, not a failure
//! - While the breaker is open the store is never touched; callers fall
//!   back to the source of truth and only pay the extra latency

use std::sync::Arc;

use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::cache::keys;
use crate::observability::metrics;
use crate::resilience::{CircuitBreaker, CircuitStatus};
use crate::store::KeyValueStore;

/// Circuit-breaker-guarded client for the remote cache.
///
/// Constructed without a store (`None`) it degrades to a no-op: every read
/// is a miss and every write is dropped.
pub struct CacheClient {
    store: Option<Arc<dyn KeyValueStore>>,
    breaker: CircuitBreaker,
}

impl CacheClient {
    pub fn new(store: Option<Arc<dyn KeyValueStore>>, breaker: CircuitBreaker) -> Self {
        if store.is_none() {
            tracing::info!("Cache store not configured, caching disabled");
        }
        Self { store, breaker }
    }

    /// Read a typed value. Returns `None` on miss, on any store error, and
    /// immediately (without a remote call) while unconfigured or open.
    pub async fn get<T: DeserializeOwned>(&self, key: &str) -> Option<T> {
        let store = self.store.as_ref()?;
        if self.breaker.is_open() {
            metrics::record_cache_result("skipped");
            return None;
        }

        match store.get(key).await {
            Ok(Some(raw)) => match serde_json::from_str(&raw) {
                Ok(value) => {
                    self.breaker.record_success();
                    metrics::record_cache_result("hit");
                    Some(value)
                }
                Err(e) => {
                    self.breaker.record_failure();
                    metrics::record_cache_result("error");
                    tracing::warn!(key = %key, error = %e, "Cache value failed to decode");
                    None
                }
            },
            Ok(None) => {
                self.breaker.record_success();
                metrics::record_cache_result("miss");
                None
            }
            Err(e) => {
                self.breaker.record_failure();
                metrics::record_cache_result("error");
                tracing::warn!(key = %key, error = %e, "Cache read failed");
                None
            }
        }
    }

    /// Write a typed value with a TTL in seconds, defaulting to the user
    /// context TTL. Errors are absorbed.
    pub async fn set<T: Serialize>(&self, key: &str, value: &T, ttl_secs: Option<u64>) {
        let Some(store) = self.store.as_ref() else {
            return;
        };
        if self.breaker.is_open() {
            metrics::record_cache_result("skipped");
            return;
        }

        let raw = match serde_json::to_string(value) {
            Ok(raw) => raw,
            Err(e) => {
                self.breaker.record_failure();
                tracing::warn!(key = %key, error = %e, "Cache value failed to encode");
                return;
            }
        };

        let ttl = ttl_secs.unwrap_or(keys::DEFAULT_TTL_SECS);
        match store.set(key, &raw, ttl).await {
            Ok(()) => self.breaker.record_success(),
            Err(e) => {
                self.breaker.record_failure();
                tracing::warn!(key = %key, error = %e, "Cache write failed");
            }
        }
    }

    /// Delete a key. Deleting a key that does not exist is a success.
    pub async fn delete(&self, key: &str) {
        let Some(store) = self.store.as_ref() else {
            return;
        };
        if self.breaker.is_open() {
            metrics::record_cache_result("skipped");
            return;
        }

        match store.del(key).await {
            Ok(_) => self.breaker.record_success(),
            Err(e) => {
                self.breaker.record_failure();
                tracing::warn!(key = %key, error = %e, "Cache delete failed");
            }
        }
    }

    /// Invalidate every cached category for a user in one logical
    /// operation. All five deletions are attempted regardless of earlier
    /// failures; the combined outcome is recorded as a single breaker
    /// event and a single aggregated log entry.
    pub async fn delete_user_context(&self, user_id: &str) {
        let Some(store) = self.store.as_ref() else {
            return;
        };
        if self.breaker.is_open() {
            metrics::record_cache_result("skipped");
            return;
        }

        let mut failed: Vec<String> = Vec::new();
        let mut last_error: Option<String> = None;

        for key in keys::user_context_keys(user_id) {
            if let Err(e) = store.del(&key).await {
                last_error = Some(e.to_string());
                failed.push(key);
            }
        }

        if failed.is_empty() {
            self.breaker.record_success();
        } else {
            self.breaker.record_failure();
            tracing::warn!(
                user_id = %user_id,
                failed_keys = ?failed,
                error = %last_error.unwrap_or_default(),
                "User context invalidation partially failed"
            );
        }
    }

    /// True iff a store is configured and the breaker is not open.
    /// Callers can use this to skip key construction entirely.
    pub fn is_enabled(&self) -> bool {
        self.store.is_some() && !self.breaker.is_open()
    }

    pub fn circuit_status(&self) -> CircuitStatus {
        self.breaker.status()
    }

    pub fn reset_circuit(&self) {
        self.breaker.reset();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::resilience::CircuitBreakerConfig;
    use crate::store::StoreError;
    use async_trait::async_trait;
    use dashmap::DashMap;
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// In-memory store that can be switched into a failing mode, either
    /// wholesale or for a chosen set of keys.
    #[derive(Default)]
    struct MockStore {
        entries: DashMap<String, String>,
        fail: std::sync::atomic::AtomicBool,
        fail_keys: DashMap<String, ()>,
        calls: AtomicUsize,
    }

    impl MockStore {
        fn failing() -> Self {
            let store = Self::default();
            store.fail.store(true, Ordering::SeqCst);
            store
        }

        fn fail_key(&self, key: &str) {
            self.fail_keys.insert(key.to_string(), ());
        }

        fn calls(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }

        fn check(&self, key: &str) -> Result<(), StoreError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if self.fail.load(Ordering::SeqCst) || self.fail_keys.contains_key(key) {
                Err(StoreError::Connection("connection refused".into()))
            } else {
                Ok(())
            }
        }
    }

    #[async_trait]
    impl KeyValueStore for MockStore {
        async fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
            self.check(key)?;
            Ok(self.entries.get(key).map(|e| e.value().clone()))
        }

        async fn set(&self, key: &str, value: &str, _ttl_secs: u64) -> Result<(), StoreError> {
            self.check(key)?;
            self.entries.insert(key.to_string(), value.to_string());
            Ok(())
        }

        async fn del(&self, key: &str) -> Result<u64, StoreError> {
            self.check(key)?;
            Ok(u64::from(self.entries.remove(key).is_some()))
        }
    }

    /// Minimal subscriber that counts WARN events while installed.
    struct WarnCounter(Arc<AtomicUsize>);

    impl tracing::Subscriber for WarnCounter {
        fn enabled(&self, _: &tracing::Metadata<'_>) -> bool {
            true
        }

        fn new_span(&self, _: &tracing::span::Attributes<'_>) -> tracing::span::Id {
            tracing::span::Id::from_u64(1)
        }

        fn record(&self, _: &tracing::span::Id, _: &tracing::span::Record<'_>) {}

        fn record_follows_from(&self, _: &tracing::span::Id, _: &tracing::span::Id) {}

        fn event(&self, event: &tracing::Event<'_>) {
            if *event.metadata().level() == tracing::Level::WARN {
                self.0.fetch_add(1, Ordering::SeqCst);
            }
        }

        fn enter(&self, _: &tracing::span::Id) {}

        fn exit(&self, _: &tracing::span::Id) {}
    }

    fn client(store: Arc<MockStore>) -> CacheClient {
        CacheClient::new(
            Some(store),
            CircuitBreaker::new("cache", CircuitBreakerConfig::default()),
        )
    }

    #[tokio::test]
    async fn round_trips_typed_values() {
        let store = Arc::new(MockStore::default());
        let cache = client(store.clone());

        cache.set("lucid:context:u-1", &serde_json::json!({"mood": "calm"}), None).await;
        let value: Option<serde_json::Value> = cache.get("lucid:context:u-1").await;
        assert_eq!(value, Some(serde_json::json!({"mood": "calm"})));
    }

    #[tokio::test]
    async fn unconfigured_client_is_inert() {
        let cache = CacheClient::new(
            None,
            CircuitBreaker::new("cache", CircuitBreakerConfig::default()),
        );
        assert!(!cache.is_enabled());
        let value: Option<serde_json::Value> = cache.get("lucid:context:u-1").await;
        assert_eq!(value, None);
        cache.set("lucid:context:u-1", &1u32, None).await;
        cache.delete_user_context("u-1").await;
    }

    #[tokio::test]
    async fn miss_counts_as_success() {
        let store = Arc::new(MockStore::default());
        let cache = client(store);

        let value: Option<String> = cache.get("lucid:context:absent").await;
        assert_eq!(value, None);
        assert_eq!(cache.circuit_status().failures, 0);
    }

    #[tokio::test]
    async fn errors_are_absorbed_and_open_the_circuit() {
        let store = Arc::new(MockStore::failing());
        let cache = client(store.clone());

        for _ in 0..3 {
            let value: Option<String> = cache.get("lucid:context:u-1").await;
            assert_eq!(value, None);
        }

        let status = cache.circuit_status();
        assert!(status.is_open);
        assert_eq!(status.failures, 3);
        assert!(!cache.is_enabled());
    }

    #[tokio::test]
    async fn open_circuit_never_touches_the_store() {
        let store = Arc::new(MockStore::failing());
        let cache = client(store.clone());

        for _ in 0..3 {
            let _: Option<String> = cache.get("k").await;
        }
        let calls_when_opened = store.calls();

        let _: Option<String> = cache.get("k").await;
        cache.set("k", &1u32, None).await;
        cache.delete("k").await;
        cache.delete_user_context("u-1").await;

        assert_eq!(store.calls(), calls_when_opened);
    }

    #[tokio::test]
    async fn undecodable_value_is_a_failure_not_a_panic() {
        let store = Arc::new(MockStore::default());
        store
            .entries
            .insert("lucid:context:u-1".into(), "not json".into());
        let cache = client(store);

        let value: Option<u64> = cache.get("lucid:context:u-1").await;
        assert_eq!(value, None);
        assert_eq!(cache.circuit_status().failures, 1);
    }

    #[tokio::test]
    async fn deleting_missing_key_is_success() {
        let store = Arc::new(MockStore::default());
        let cache = client(store);

        cache.delete("lucid:context:never-set").await;
        assert_eq!(cache.circuit_status().failures, 0);
    }

    #[tokio::test]
    async fn user_invalidation_attempts_all_keys_and_records_once() {
        let store = Arc::new(MockStore::failing());
        let cache = client(store.clone());

        cache.delete_user_context("u-1").await;

        // All five deletions attempted despite every one failing,
        // recorded as a single breaker failure.
        assert_eq!(store.calls(), 5);
        assert_eq!(cache.circuit_status().failures, 1);
    }

    #[tokio::test]
    async fn user_invalidation_survives_partial_failure_with_one_warn() {
        let store = Arc::new(MockStore::default());
        let keys = keys::user_context_keys("u-1");
        store.fail_key(&keys[1]);
        store.fail_key(&keys[3]);
        let cache = client(store.clone());

        let warns = Arc::new(AtomicUsize::new(0));
        let guard = tracing::subscriber::set_default(WarnCounter(warns.clone()));
        cache.delete_user_context("u-1").await;
        drop(guard);

        // The two broken keys do not stop the other three deletions, and
        // the combined outcome is one breaker failure and one warn line.
        assert_eq!(store.calls(), 5);
        assert_eq!(cache.circuit_status().failures, 1);
        assert_eq!(warns.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn user_invalidation_success_records_one_success() {
        let store = Arc::new(MockStore::default());
        let cache = client(store.clone());

        // Leave one earlier failure on the breaker, then recover.
        store.fail.store(true, Ordering::SeqCst);
        let _: Option<String> = cache.get("k").await;
        assert_eq!(cache.circuit_status().failures, 1);

        store.fail.store(false, Ordering::SeqCst);
        cache.delete_user_context("u-1").await;
        assert_eq!(cache.circuit_status().failures, 0);
    }

    #[tokio::test]
    async fn recovery_after_success_reports_closed() {
        let store = Arc::new(MockStore::failing());
        let cache = client(store.clone());

        for _ in 0..3 {
            let _: Option<String> = cache.get("k").await;
        }
        assert!(cache.circuit_status().is_open);

        cache.reset_circuit();
        store.fail.store(false, Ordering::SeqCst);
        let _: Option<String> = cache.get("k").await;

        let status = cache.circuit_status();
        assert!(!status.is_open);
        assert_eq!(status.failures, 0);
    }
}

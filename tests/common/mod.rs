//! Shared test doubles for the resilience layer.

#![allow(dead_code)]

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

use async_trait::async_trait;
use dashmap::DashMap;

use lucid::rate_limit::{LimitDecision, LimiterBackend};
use lucid::store::{KeyValueStore, StoreError};

/// In-memory key-value store that can be switched into a failing mode.
#[derive(Default)]
pub struct MockStore {
    pub entries: DashMap<String, String>,
    fail: AtomicBool,
    calls: AtomicUsize,
}

impl MockStore {
    pub fn failing() -> Self {
        let store = Self::default();
        store.set_failing(true);
        store
    }

    pub fn set_failing(&self, fail: bool) {
        self.fail.store(fail, Ordering::SeqCst);
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    fn check(&self) -> Result<(), StoreError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if self.fail.load(Ordering::SeqCst) {
            Err(StoreError::Connection("connection refused".into()))
        } else {
            Ok(())
        }
    }
}

#[async_trait]
impl KeyValueStore for MockStore {
    async fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        self.check()?;
        Ok(self.entries.get(key).map(|e| e.value().clone()))
    }

    async fn set(&self, key: &str, value: &str, _ttl_secs: u64) -> Result<(), StoreError> {
        self.check()?;
        self.entries.insert(key.to_string(), value.to_string());
        Ok(())
    }

    async fn del(&self, key: &str) -> Result<u64, StoreError> {
        self.check()?;
        Ok(u64::from(self.entries.remove(key).is_some()))
    }
}

/// Limiter backend returning a fixed decision, or an error when failing.
pub struct MockLimiter {
    pub decision: LimitDecision,
    fail: AtomicBool,
    calls: AtomicUsize,
}

impl MockLimiter {
    pub fn allowing(remaining: u64, reset: u64) -> Self {
        Self {
            decision: LimitDecision {
                success: true,
                remaining,
                reset,
            },
            fail: AtomicBool::new(false),
            calls: AtomicUsize::new(0),
        }
    }

    pub fn over_limit(reset: u64) -> Self {
        Self {
            decision: LimitDecision {
                success: false,
                remaining: 0,
                reset,
            },
            fail: AtomicBool::new(false),
            calls: AtomicUsize::new(0),
        }
    }

    pub fn failing() -> Self {
        let limiter = Self::allowing(0, 0);
        limiter.fail.store(true, Ordering::SeqCst);
        limiter
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl LimiterBackend for MockLimiter {
    async fn limit(&self, _identifier: &str) -> Result<LimitDecision, StoreError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if self.fail.load(Ordering::SeqCst) {
            Err(StoreError::Timeout("limiter timed out".into()))
        } else {
            Ok(self.decision)
        }
    }
}

/// Current unix time in milliseconds.
pub fn now_ms() -> u64 {
    std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .unwrap()
        .as_millis() as u64
}

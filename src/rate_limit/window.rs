//! Fixed-window limiter primitive backed by Redis.
//!
//! Counts requests per identifier in aligned time windows using an atomic
//! INCR + EXPIRE pipeline. Deliberately simple; the resilience layer in
//! `limiter.rs` treats this as an opaque collaborator and any backend
//! honoring [`LimiterBackend`] can replace it.

use std::time::{SystemTime, UNIX_EPOCH};

use async_trait::async_trait;
use redis::aio::ConnectionManager;

use super::limiter::{LimitDecision, LimiterBackend};
use crate::store::StoreError;

/// Key prefix for limiter counters in Redis.
const KEY_PREFIX: &str = "lucid:ratelimit";

/// Fixed-window request counter.
pub struct FixedWindowLimiter {
    conn: ConnectionManager,
    max_requests: u64,
    window_secs: u64,
}

impl FixedWindowLimiter {
    /// Connect to Redis and configure the window.
    pub async fn connect(
        redis_url: &str,
        max_requests: u64,
        window_secs: u64,
    ) -> Result<Self, StoreError> {
        let client = redis::Client::open(redis_url)
            .map_err(|e| StoreError::Connection(format!("invalid redis url: {e}")))?;
        let conn = ConnectionManager::new(client)
            .await
            .map_err(|e| StoreError::Connection(e.to_string()))?;

        Ok(Self {
            conn,
            max_requests,
            window_secs,
        })
    }
}

#[async_trait]
impl LimiterBackend for FixedWindowLimiter {
    async fn limit(&self, identifier: &str) -> Result<LimitDecision, StoreError> {
        let now_ms = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap_or_default()
            .as_millis() as u64;
        let window_ms = self.window_secs * 1000;
        let window = now_ms / window_ms;
        let key = format!("{KEY_PREFIX}:{identifier}:{window}");

        let mut conn = self.conn.clone();
        // Counter key expires with its window; the extra second covers
        // clock skew between this process and Redis.
        let (count,): (u64,) = redis::pipe()
            .atomic()
            .incr(&key, 1u64)
            .expire(&key, self.window_secs as i64 + 1)
            .ignore()
            .query_async(&mut conn)
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    StoreError::Timeout(e.to_string())
                } else {
                    StoreError::Connection(e.to_string())
                }
            })?;

        Ok(LimitDecision {
            success: count <= self.max_requests,
            remaining: self.max_requests.saturating_sub(count),
            reset: (window + 1) * window_ms,
        })
    }
}

//! Remote key-value store abstraction.
//!
//! # Responsibilities
//! - Define the narrow interface the resilience layer consumes
//! - Collapse transport/timeout/serialization faults into one error type
//! - Provide the Redis-backed production implementation
//!
//! # Design Decisions
//! - Trait object seam so tests inject in-memory/failing stores
//! - Values cross this boundary as serialized strings; typed encoding is
//!   the cache client's concern

use async_trait::async_trait;
use thiserror::Error;

pub mod redis;

pub use self::redis::RedisStore;

/// Errors from a remote store or limiter call.
///
/// The resilience layer treats every variant identically; the split exists
/// only so logs say what actually went wrong.
#[derive(Debug, Error)]
pub enum StoreError {
    /// Transport-level failure (connection refused, reset, protocol).
    #[error("connection error: {0}")]
    Connection(String),

    /// The remote call did not complete in time.
    #[error("timeout: {0}")]
    Timeout(String),

    /// Payload could not be encoded or decoded.
    #[error("serialization error: {0}")]
    Serialization(String),
}

/// Minimal async key-value interface over the remote store.
#[async_trait]
pub trait KeyValueStore: Send + Sync {
    /// Fetch a value. `Ok(None)` is a miss, not an error.
    async fn get(&self, key: &str) -> Result<Option<String>, StoreError>;

    /// Store a value with an expiry in seconds.
    async fn set(&self, key: &str, value: &str, ttl_secs: u64) -> Result<(), StoreError>;

    /// Delete a key, returning the number of keys removed. Deleting a
    /// missing key returns `Ok(0)`.
    async fn del(&self, key: &str) -> Result<u64, StoreError>;
}

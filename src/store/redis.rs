//! Redis-backed key-value store.

use async_trait::async_trait;
use redis::aio::ConnectionManager;
use redis::AsyncCommands;

use super::{KeyValueStore, StoreError};

/// Redis implementation of [`KeyValueStore`].
///
/// `ConnectionManager` multiplexes one connection across all requests and
/// reconnects on its own; cloning it is cheap.
pub struct RedisStore {
    conn: ConnectionManager,
}

impl RedisStore {
    /// Connect to a Redis instance.
    ///
    /// # Arguments
    /// * `redis_url` - connection URL (e.g., "redis://localhost:6379")
    pub async fn connect(redis_url: &str) -> Result<Self, StoreError> {
        let client = redis::Client::open(redis_url)
            .map_err(|e| StoreError::Connection(format!("invalid redis url: {e}")))?;

        let conn = ConnectionManager::new(client)
            .await
            .map_err(map_redis_err)?;

        Ok(Self { conn })
    }
}

#[async_trait]
impl KeyValueStore for RedisStore {
    async fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        let mut conn = self.conn.clone();
        let value: Option<String> = conn.get(key).await.map_err(map_redis_err)?;
        Ok(value)
    }

    async fn set(&self, key: &str, value: &str, ttl_secs: u64) -> Result<(), StoreError> {
        let mut conn = self.conn.clone();
        conn.set_ex::<_, _, ()>(key, value, ttl_secs)
            .await
            .map_err(map_redis_err)
    }

    async fn del(&self, key: &str) -> Result<u64, StoreError> {
        let mut conn = self.conn.clone();
        conn.del(key).await.map_err(map_redis_err)
    }
}

fn map_redis_err(e: redis::RedisError) -> StoreError {
    if e.is_timeout() {
        StoreError::Timeout(e.to_string())
    } else {
        StoreError::Connection(e.to_string())
    }
}

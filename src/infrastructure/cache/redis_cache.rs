//! Redis-backed cache implementation.

use super::service::{CacheError, CacheResult, CacheService};
use async_trait::async_trait;
use redis::{AsyncCommands, Client, aio::ConnectionManager};
use std::time::Duration;
use tracing::{debug, info, warn};

/// Redis cache for deployments running several service instances.
///
/// Uses `ConnectionManager` for connection reuse and reconnects. Entries are
/// written with `SET EX` so Redis enforces the life window; the entry size limit
/// is checked client-side before writing.
pub struct RedisCache {
    client: ConnectionManager,
    life_window: Duration,
    max_entry_size: usize,
    key_prefix: String,
}

impl RedisCache {
    /// Connects to Redis and validates the connection with a PING.
    ///
    /// # Errors
    ///
    /// Returns [`CacheError::Unexpected`] if the URL is invalid, the connection cannot
    /// be established, or the PING health check fails.
    pub async fn connect(
        redis_url: &str,
        life_window: Duration,
        max_entry_size: usize,
    ) -> CacheResult<Self> {
        info!("Connecting to Redis");

        let client = Client::open(redis_url).map_err(|e| {
            CacheError::Unexpected(format!("Failed to create Redis client: {}", e))
        })?;

        let manager = ConnectionManager::new(client).await.map_err(|e| {
            CacheError::Unexpected(format!("Failed to connect to Redis: {}", e))
        })?;

        let mut test_conn = manager.clone();
        test_conn
            .ping::<()>()
            .await
            .map_err(|e| CacheError::Unexpected(format!("Redis PING failed: {}", e)))?;

        info!("Connected to Redis");

        Ok(Self {
            client: manager,
            life_window,
            max_entry_size,
            key_prefix: "alias:".to_string(),
        })
    }

    /// Constructs the full Redis key with namespace prefix.
    fn build_key(&self, key: &str) -> String {
        format!("{}{}", self.key_prefix, key)
    }
}

#[async_trait]
impl CacheService for RedisCache {
    async fn get(&self, key: &str) -> CacheResult<Vec<u8>> {
        let redis_key = self.build_key(key);
        let mut conn = self.client.clone();

        match conn.get::<_, Option<Vec<u8>>>(&redis_key).await {
            Ok(Some(value)) => {
                debug!("Cache HIT: {}", key);
                Ok(value)
            }
            Ok(None) => {
                debug!("Cache MISS: {}", key);
                Err(CacheError::NotFound)
            }
            Err(e) => {
                warn!("Redis GET error for {}: {}", key, e);
                Err(CacheError::Unexpected(e.to_string()))
            }
        }
    }

    async fn set(&self, key: &str, value: Vec<u8>) -> CacheResult<()> {
        let size = key.len() + value.len();
        if size > self.max_entry_size {
            return Err(CacheError::EntryTooLarge {
                size,
                max: self.max_entry_size,
            });
        }

        let redis_key = self.build_key(key);
        let mut conn = self.client.clone();
        let ttl_seconds = self.life_window.as_secs().max(1);

        conn.set_ex::<_, _, ()>(&redis_key, value, ttl_seconds)
            .await
            .map_err(|e| {
                warn!("Redis SET error for {}: {}", key, e);
                CacheError::Unexpected(e.to_string())
            })?;

        debug!("Cache SET: {} (TTL: {}s)", key, ttl_seconds);
        Ok(())
    }

    async fn health_check(&self) -> bool {
        let mut conn = self.client.clone();
        conn.ping::<()>().await.is_ok()
    }
}

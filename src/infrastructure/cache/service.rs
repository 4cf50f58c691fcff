//! Cache service trait and error types.

use async_trait::async_trait;

/// Errors that can occur during cache operations.
///
/// [`CacheError::NotFound`] is a signal, not a failure: callers fall back to the
/// durable store. The other variants mean the cache itself misbehaved.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CacheError {
    #[error("cache entry not found")]
    NotFound,
    #[error("cache entry too large: {size} bytes (max {max})")]
    EntryTooLarge { size: usize, max: usize },
    #[error("cache fault: {0}")]
    Unexpected(String),
}

/// Result type for cache operations.
pub type CacheResult<T> = Result<T, CacheError>;

/// Best-effort key/value cache in front of the durable store.
///
/// Implementations must be thread-safe and must not block indefinitely.
///
/// # Implementations
///
/// - [`crate::infrastructure::cache::MemoryCache`] - Sharded in-process cache (default)
/// - [`crate::infrastructure::cache::RedisCache`] - Redis-backed cache
/// - [`crate::infrastructure::cache::NullCache`] - No-op implementation for disabled caching
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait CacheService: Send + Sync {
    /// Returns the bytes stored under `key`.
    ///
    /// # Errors
    ///
    /// - [`CacheError::NotFound`] when the key is absent or expired
    /// - [`CacheError::Unexpected`] when the backend fails
    async fn get(&self, key: &str) -> CacheResult<Vec<u8>>;

    /// Stores `value` under `key`. Overwriting an existing key is not an error.
    ///
    /// # Errors
    ///
    /// - [`CacheError::EntryTooLarge`] when the entry exceeds the configured maximum
    /// - [`CacheError::Unexpected`] when the backend fails
    async fn set(&self, key: &str, value: Vec<u8>) -> CacheResult<()>;

    /// Checks if the cache backend is healthy.
    async fn health_check(&self) -> bool;
}

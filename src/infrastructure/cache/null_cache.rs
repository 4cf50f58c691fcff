//! No-op cache implementation for disabled caching.

use super::service::{CacheError, CacheResult, CacheService};
use async_trait::async_trait;
use tracing::debug;

/// A cache that never stores anything.
///
/// Every lookup reports [`CacheError::NotFound`], so all reads go to the
/// durable store. Selected with `CACHE_BACKEND=none`.
pub struct NullCache;

impl NullCache {
    /// Creates a new NullCache instance.
    pub fn new() -> Self {
        debug!("Using NullCache (caching disabled)");
        Self
    }
}

impl Default for NullCache {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl CacheService for NullCache {
    async fn get(&self, _key: &str) -> CacheResult<Vec<u8>> {
        Err(CacheError::NotFound)
    }

    async fn set(&self, _key: &str, _value: Vec<u8>) -> CacheResult<()> {
        Ok(())
    }

    async fn health_check(&self) -> bool {
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_null_cache_never_hits() {
        let cache = NullCache::new();

        cache.set("abcde", b"x".to_vec()).await.unwrap();

        assert_eq!(cache.get("abcde").await.unwrap_err(), CacheError::NotFound);
        assert!(cache.health_check().await);
    }
}

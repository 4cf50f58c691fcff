//! Caching layer in front of the durable store.
//!
//! Provides a [`CacheService`] trait with three implementations:
//! - [`MemoryCache`] - Sharded, size-bounded, expiring in-process cache (default)
//! - [`RedisCache`] - Redis-backed cache shared between instances
//! - [`NullCache`] - No-op implementation for disabled caching

mod memory_cache;
mod null_cache;
mod redis_cache;
mod service;

pub use memory_cache::{EvictionListener, EvictionReason, MemoryCache, MemoryCacheOptions};
pub use null_cache::NullCache;
pub use redis_cache::RedisCache;
pub use service::{CacheError, CacheResult, CacheService};

#[cfg(test)]
pub use service::MockCacheService;

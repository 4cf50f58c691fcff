//! Sharded in-process cache built on Moka.

use super::service::{CacheError, CacheResult, CacheService};
use async_trait::async_trait;
use moka::future::Cache;
use moka::notification::RemovalCause;
use std::hash::{BuildHasher, RandomState};
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;
use tracing::{debug, info, trace};

/// Why an entry left the cache.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EvictionReason {
    /// The entry outlived the life window.
    Expired,
    /// The memory ceiling was reached and the entry was chosen for eviction.
    NoSpace,
    /// The entry was removed explicitly.
    Deleted,
}

impl EvictionReason {
    pub fn as_str(&self) -> &'static str {
        match self {
            EvictionReason::Expired => "expired",
            EvictionReason::NoSpace => "no space",
            EvictionReason::Deleted => "deleted",
        }
    }

    fn from_cause(cause: RemovalCause) -> Option<Self> {
        match cause {
            RemovalCause::Expired => Some(EvictionReason::Expired),
            RemovalCause::Size => Some(EvictionReason::NoSpace),
            RemovalCause::Explicit => Some(EvictionReason::Deleted),
            RemovalCause::Replaced => None,
        }
    }
}

/// Callback notified on every eviction with the key and the reason.
pub type EvictionListener = Arc<dyn Fn(&str, EvictionReason) + Send + Sync>;

/// Tuning knobs for [`MemoryCache`].
#[derive(Clone)]
pub struct MemoryCacheOptions {
    /// Number of independent shards.
    pub shards: usize,
    /// Maximum lifetime of an entry, regardless of access.
    pub life_window: Duration,
    /// How often expired entries are reclaimed in the background.
    pub clean_window: Duration,
    /// Entries larger than this (key + value bytes) are rejected.
    pub max_entry_size: usize,
    /// Memory ceiling across all shards, in bytes.
    pub hard_max_bytes: u64,
    /// Eviction notification. Defaults to an `info` log line.
    pub on_evict: Option<EvictionListener>,
}

impl Default for MemoryCacheOptions {
    fn default() -> Self {
        Self {
            shards: 16,
            life_window: Duration::from_secs(12 * 60 * 60),
            clean_window: Duration::from_secs(60),
            max_entry_size: 1024,
            hard_max_bytes: 30 * 1024 * 1024,
            on_evict: None,
        }
    }
}

impl std::fmt::Debug for MemoryCacheOptions {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MemoryCacheOptions")
            .field("shards", &self.shards)
            .field("life_window", &self.life_window)
            .field("clean_window", &self.clean_window)
            .field("max_entry_size", &self.max_entry_size)
            .field("hard_max_bytes", &self.hard_max_bytes)
            .finish_non_exhaustive()
    }
}

/// In-memory cache split into shards to bound lock contention.
///
/// Each shard is a Moka cache weighted by entry size, so the configured
/// memory ceiling is enforced in bytes rather than entry counts. A background
/// task sweeps expired entries every `clean_window`; expired entries are never
/// returned even before the sweep reaches them.
pub struct MemoryCache {
    shards: Arc<[Cache<String, Arc<[u8]>>]>,
    hasher: RandomState,
    max_entry_size: usize,
    sweeper: Option<JoinHandle<()>>,
}

impl MemoryCache {
    /// Creates the cache and, when called inside a Tokio runtime, starts the sweeper.
    pub fn new(options: MemoryCacheOptions) -> Self {
        let shard_count = options.shards.max(1);
        let per_shard_bytes = (options.hard_max_bytes / shard_count as u64).max(1);
        let listener = options.on_evict.clone().unwrap_or_else(default_listener);

        let shards: Arc<[Cache<String, Arc<[u8]>>]> = (0..shard_count)
            .map(|_| {
                let listener = listener.clone();
                Cache::builder()
                    .max_capacity(per_shard_bytes)
                    .weigher(|key: &String, value: &Arc<[u8]>| -> u32 {
                        (key.len() + value.len()).try_into().unwrap_or(u32::MAX)
                    })
                    .time_to_live(options.life_window)
                    .eviction_listener(move |key: Arc<String>, _value, cause| {
                        if let Some(reason) = EvictionReason::from_cause(cause) {
                            metrics::counter!("cache_evictions_total", "reason" => reason.as_str())
                                .increment(1);
                            listener(key.as_str(), reason);
                        }
                    })
                    .build()
            })
            .collect();

        let sweeper = tokio::runtime::Handle::try_current()
            .ok()
            .map(|handle| handle.spawn(sweep(shards.clone(), options.clean_window)));

        debug!(
            shards = shard_count,
            per_shard_bytes,
            max_entry_size = options.max_entry_size,
            "Memory cache initialised"
        );

        Self {
            shards,
            hasher: RandomState::new(),
            max_entry_size: options.max_entry_size,
            sweeper,
        }
    }

    fn shard(&self, key: &str) -> &Cache<String, Arc<[u8]>> {
        let index = self.hasher.hash_one(key) as usize % self.shards.len();
        &self.shards[index]
    }

    /// Removes `key` explicitly. The eviction listener sees [`EvictionReason::Deleted`].
    pub async fn remove(&self, key: &str) {
        self.shard(key).invalidate(key).await;
    }

    /// Runs pending maintenance (expiry, eviction notifications) on every shard now.
    pub async fn run_pending_tasks(&self) {
        for shard in self.shards.iter() {
            shard.run_pending_tasks().await;
        }
    }

    /// Approximate number of live entries across all shards.
    pub fn entry_count(&self) -> u64 {
        self.shards.iter().map(|s| s.entry_count()).sum()
    }
}

impl Drop for MemoryCache {
    fn drop(&mut self) {
        if let Some(sweeper) = self.sweeper.take() {
            sweeper.abort();
        }
    }
}

#[async_trait]
impl CacheService for MemoryCache {
    async fn get(&self, key: &str) -> CacheResult<Vec<u8>> {
        match self.shard(key).get(key).await {
            Some(value) => {
                trace!(key, "Memory cache hit");
                Ok(value.to_vec())
            }
            None => {
                trace!(key, "Memory cache miss");
                Err(CacheError::NotFound)
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

        self.shard(key)
            .insert(key.to_string(), Arc::from(value))
            .await;
        trace!(key, size, "Memory cache set");
        Ok(())
    }

    async fn health_check(&self) -> bool {
        true
    }
}

async fn sweep(shards: Arc<[Cache<String, Arc<[u8]>>]>, every: Duration) {
    let mut ticker = tokio::time::interval(every);
    ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
    ticker.tick().await;

    loop {
        ticker.tick().await;
        for shard in shards.iter() {
            shard.run_pending_tasks().await;
        }
    }
}

fn default_listener() -> EvictionListener {
    Arc::new(|key: &str, reason: EvictionReason| {
        info!("CACHE: {} has been removed because [{}]", key, reason.as_str());
    })
}

#![allow(dead_code)]

use async_trait::async_trait;
use linkdrop::application::services::{ResolutionOptions, ResolutionService};
use linkdrop::domain::entities::AliasRecord;
use linkdrop::domain::repositories::{AliasRepository, StoreError};
use linkdrop::infrastructure::cache::{CacheService, MemoryCache, MemoryCacheOptions};
use linkdrop::infrastructure::captcha::{CaptchaError, CaptchaVerifier};
use linkdrop::infrastructure::object_store::FsObjectStore;
use linkdrop::state::AppState;
use std::collections::HashMap;
use std::path::Path;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use tempfile::TempDir;
use tokio::sync::Mutex;

/// Alias store backed by a map, with the same uniqueness contract as Postgres.
#[derive(Default)]
pub struct InMemoryAliasRepository {
    records: Mutex<HashMap<String, AliasRecord>>,
    down: AtomicBool,
}

impl InMemoryAliasRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// Makes every call fail with a store fault.
    pub fn set_down(&self, down: bool) {
        self.down.store(down, Ordering::SeqCst);
    }

    pub async fn len(&self) -> usize {
        self.records.lock().await.len()
    }

    fn check_up(&self) -> Result<(), StoreError> {
        if self.down.load(Ordering::SeqCst) {
            return Err(StoreError::Fault("connection refused".to_string()));
        }
        Ok(())
    }
}

#[async_trait]
impl AliasRepository for InMemoryAliasRepository {
    async fn insert(&self, record: &AliasRecord) -> Result<(), StoreError> {
        self.check_up()?;
        let mut records = self.records.lock().await;
        if records.contains_key(&record.alias) {
            return Err(StoreError::UniqueViolation);
        }
        records.insert(record.alias.clone(), record.clone());
        Ok(())
    }

    async fn get(&self, alias: &str) -> Result<AliasRecord, StoreError> {
        self.check_up()?;
        self.records
            .lock()
            .await
            .get(alias)
            .cloned()
            .ok_or(StoreError::NotFound)
    }

    async fn ping(&self) -> Result<(), StoreError> {
        self.check_up()
    }
}

/// Captcha verifier that accepts one fixed token and rejects everything else.
pub struct StaticCaptcha {
    pub accepted: &'static str,
}

#[async_trait]
impl CaptchaVerifier for StaticCaptcha {
    async fn verify(&self, token: Option<&str>) -> Result<(), CaptchaError> {
        match token {
            None | Some("") => Err(CaptchaError::MissingInput),
            Some(t) if t == self.accepted => Ok(()),
            Some(_) => Err(CaptchaError::InvalidInput),
        }
    }
}

/// Everything a handler test needs to reach into.
pub struct TestApp {
    pub state: AppState,
    pub store: Arc<InMemoryAliasRepository>,
    pub cache: Arc<MemoryCache>,
    /// Root of the object store; dropped with the app.
    pub objects_dir: TempDir,
}

/// Builds state over an in-memory store, a memory cache and a temp-dir object store.
pub async fn create_test_app() -> TestApp {
    let objects_dir = tempfile::tempdir().unwrap();
    let objects = FsObjectStore::open(objects_dir.path()).await.unwrap();
    let store = Arc::new(InMemoryAliasRepository::new());
    let cache = Arc::new(MemoryCache::new(MemoryCacheOptions::default()));

    let service = ResolutionService::new(
        store.clone(),
        Arc::new(objects),
        cache.clone() as Arc<dyn CacheService>,
        ResolutionOptions::default(),
    );

    TestApp {
        state: AppState::new(Arc::new(service)),
        store,
        cache,
        objects_dir,
    }
}

/// Number of regular files under `dir`.
pub fn count_files(dir: &Path) -> usize {
    std::fs::read_dir(dir)
        .unwrap()
        .filter_map(Result::ok)
        .filter(|entry| entry.path().is_file())
        .count()
}

/// Polls the cache until `alias` shows up or a second passes.
pub async fn wait_for_cache(cache: &MemoryCache, alias: &str) -> Option<Vec<u8>> {
    for _ in 0..50 {
        if let Ok(bytes) = cache.get(alias).await {
            return Some(bytes);
        }
        tokio::time::sleep(std::time::Duration::from_millis(20)).await;
    }
    None
}

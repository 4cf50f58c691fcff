//! Alias creation and resolution across the cache, the durable store and the
//! object store.

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use tracing::{debug, error, warn};

use crate::domain::entities::{AliasKind, AliasRecord, FileDownload, NewFile, NewLink};
use crate::domain::repositories::{AliasRepository, ObjectStore, ObjectStoreError, StoreError};
use crate::error::AppError;
use crate::infrastructure::cache::{CacheError, CacheService};
use crate::utils::storage_key::generate_storage_key;

/// Message returned when an alias has already been claimed.
pub const ALIAS_TAKEN: &str = "alias already taken";

/// Message returned when an alias does not resolve.
pub const NOT_FOUND: &str = "not found";

/// Tunables for [`ResolutionService`].
#[derive(Debug, Clone)]
pub struct ResolutionOptions {
    /// Deadline applied to every collaborator call.
    pub operation_timeout: Duration,
    /// Cache records read from the store after a cache miss.
    pub write_back_on_miss: bool,
}

impl Default for ResolutionOptions {
    fn default() -> Self {
        Self {
            operation_timeout: Duration::from_secs(10),
            write_back_on_miss: true,
        }
    }
}

/// Creates and resolves aliases.
///
/// The durable store is the source of truth. The cache is consulted first on
/// [`find`](Self::find) and is populated in the background after every
/// successful insert, so a cache failure never fails a request. Downloads always
/// read the store.
///
/// Concurrent inserts of the same alias are arbitrated by the store's unique
/// key; this service holds no locks.
pub struct ResolutionService {
    store: Arc<dyn AliasRepository>,
    objects: Arc<dyn ObjectStore>,
    cache: Arc<dyn CacheService>,
    options: ResolutionOptions,
}

impl ResolutionService {
    pub fn new(
        store: Arc<dyn AliasRepository>,
        objects: Arc<dyn ObjectStore>,
        cache: Arc<dyn CacheService>,
        options: ResolutionOptions,
    ) -> Self {
        Self {
            store,
            objects,
            cache,
            options,
        }
    }

    /// Creates a LINK alias.
    ///
    /// # Errors
    ///
    /// - [`AppError::BadRequest`] if `link.kind` is not LINK or the alias is taken
    /// - [`AppError::Unexpected`] on store faults or timeouts
    pub async fn insert_link(&self, link: NewLink) -> Result<AliasRecord, AppError> {
        if link.kind != AliasKind::Link {
            return Err(AppError::bad_request("type must be LINK"));
        }

        let record = AliasRecord::link(link.alias, link.redirect_to);
        self.insert_record(&record).await?;

        debug!(alias = %record.alias, "Link alias created");
        self.populate_cache(&record);

        Ok(record)
    }

    /// Creates a FILE alias.
    ///
    /// The payload is uploaded before the record is written, so a failed upload
    /// never leaves a record pointing at nothing. If the record was rejected,
    /// the uploaded object is deleted again. A faulted or timed-out insert may
    /// still have committed, so the object is only deleted once the store
    /// confirms the record is absent.
    ///
    /// # Errors
    ///
    /// - [`AppError::BadRequest`] if `file.kind` is not FILE or the alias is taken
    /// - [`AppError::Unexpected`] on upload or store faults, or timeouts
    pub async fn insert_file(&self, file: NewFile) -> Result<AliasRecord, AppError> {
        if file.kind != AliasKind::File {
            return Err(AppError::bad_request("type must be FILE"));
        }

        let storage_key = generate_storage_key(&file.filename);

        self.deadline(
            "object_store.upload",
            self.objects
                .upload(&storage_key, &file.content_type, file.payload),
        )
        .await?
        .map_err(|e| {
            error!(alias = %file.alias, key = %storage_key, error = %e, "Upload failed");
            AppError::unexpected()
        })?;

        let record = AliasRecord::file(file.alias, file.filename, storage_key);

        let outcome = self.deadline("store.insert", self.store.insert(&record)).await;
        match outcome {
            Ok(Ok(())) => {}
            Ok(Err(StoreError::UniqueViolation)) => {
                self.discard_object(&record).await;
                return Err(AppError::bad_request(ALIAS_TAKEN));
            }
            Ok(Err(other)) => {
                error!(alias = %record.alias, error = %other, "Insert failed");
                self.discard_if_unwritten(&record).await;
                return Err(AppError::unexpected());
            }
            Err(err) => {
                self.discard_if_unwritten(&record).await;
                return Err(err);
            }
        }

        debug!(alias = %record.alias, "File alias created");
        self.populate_cache(&record);

        Ok(record)
    }

    /// Resolves an alias, cache first.
    ///
    /// A cache fault, a timed-out cache read or an undecodable entry counts as
    /// a miss.
    ///
    /// # Errors
    ///
    /// - [`AppError::NotFound`] if no such alias exists
    /// - [`AppError::Unexpected`] on store faults or timeouts
    pub async fn find(&self, alias: &str) -> Result<AliasRecord, AppError> {
        if let Some(record) = self.cached(alias).await {
            metrics::counter!("cache_hits_total").increment(1);
            return Ok(record);
        }
        metrics::counter!("cache_misses_total").increment(1);

        let record = self.fetch_record(alias).await?;

        if self.options.write_back_on_miss {
            self.populate_cache(&record);
        }

        Ok(record)
    }

    /// Loads a FILE alias and its bytes for download.
    ///
    /// Always reads the durable store, never the cache.
    ///
    /// # Errors
    ///
    /// - [`AppError::NotFound`] if the alias or its object does not exist
    /// - [`AppError::BadRequest`] if the alias is not a FILE
    /// - [`AppError::Unexpected`] on store faults or timeouts
    pub async fn download_file(&self, alias: &str) -> Result<FileDownload, AppError> {
        let record = self.fetch_record(alias).await?;

        if !record.is_file() {
            return Err(AppError::bad_request("alias is not a file"));
        }

        let (Some(filename), Some(storage_key)) = (&record.filename, &record.storage_key) else {
            error!(alias, "File record without filename or storage key");
            return Err(AppError::unexpected());
        };

        let object = self
            .deadline("object_store.get", self.objects.get(storage_key))
            .await?
            .map_err(|e| match e {
                ObjectStoreError::NotFound(_) => {
                    warn!(alias, key = %storage_key, "Object missing for file alias");
                    AppError::not_found(NOT_FOUND)
                }
                other => {
                    error!(alias, key = %storage_key, error = %other, "Object read failed");
                    AppError::unexpected()
                }
            })?;

        Ok(FileDownload {
            content_type: object.stat.content_type,
            content_length: object.stat.content_length,
            content_disposition: content_disposition(filename),
            body: object.body,
        })
    }

    /// Reports whether the durable store answers.
    pub async fn check_store(&self) -> bool {
        match tokio::time::timeout(self.options.operation_timeout, self.store.ping()).await {
            Ok(Ok(())) => true,
            Ok(Err(e)) => {
                warn!(error = %e, "Store health check failed");
                false
            }
            Err(_) => {
                warn!("Store health check timed out");
                false
            }
        }
    }

    /// Reports whether the cache backend answers.
    pub async fn check_cache(&self) -> bool {
        tokio::time::timeout(self.options.operation_timeout, self.cache.health_check())
            .await
            .unwrap_or(false)
    }

    async fn insert_record(&self, record: &AliasRecord) -> Result<(), AppError> {
        self.deadline("store.insert", self.store.insert(record))
            .await?
            .map_err(|e| match e {
                StoreError::UniqueViolation => AppError::bad_request(ALIAS_TAKEN),
                other => {
                    error!(alias = %record.alias, error = %other, "Insert failed");
                    AppError::unexpected()
                }
            })
    }

    async fn fetch_record(&self, alias: &str) -> Result<AliasRecord, AppError> {
        self.deadline("store.get", self.store.get(alias))
            .await?
            .map_err(|e| match e {
                StoreError::NotFound => AppError::not_found(NOT_FOUND),
                other => {
                    error!(alias, error = %other, "Lookup failed");
                    AppError::unexpected()
                }
            })
    }

    async fn cached(&self, alias: &str) -> Option<AliasRecord> {
        let bytes = match tokio::time::timeout(self.options.operation_timeout, self.cache.get(alias))
            .await
        {
            Ok(Ok(bytes)) => bytes,
            Ok(Err(CacheError::NotFound)) => return None,
            Ok(Err(e)) => {
                warn!(alias, error = %e, "Cache read failed, falling back to store");
                return None;
            }
            Err(_) => {
                warn!(alias, "Cache read timed out, falling back to store");
                return None;
            }
        };

        match serde_json::from_slice::<AliasRecord>(&bytes) {
            Ok(record) => Some(record),
            Err(e) => {
                warn!(alias, error = %e, "Corrupt cache entry, falling back to store");
                None
            }
        }
    }

    /// Writes `record` to the cache on a detached task.
    fn populate_cache(&self, record: &AliasRecord) {
        let value = match serde_json::to_vec(record) {
            Ok(value) => value,
            Err(e) => {
                warn!(alias = %record.alias, error = %e, "Failed to encode cache entry");
                return;
            }
        };

        let cache = Arc::clone(&self.cache);
        let alias = record.alias.clone();
        let timeout = self.options.operation_timeout;

        tokio::spawn(async move {
            match tokio::time::timeout(timeout, cache.set(&alias, value)).await {
                Ok(Ok(())) => debug!(alias = %alias, "Cached alias"),
                Ok(Err(e)) => warn!(alias = %alias, error = %e, "Failed to cache alias"),
                Err(_) => warn!(alias = %alias, "Caching alias timed out"),
            }
        });
    }

    /// Settles an insert whose outcome is unknown.
    ///
    /// The row may have been committed before the insert faulted or timed out.
    /// The object is deleted only once the store confirms the record is absent
    /// or belongs to another upload; otherwise it is kept.
    async fn discard_if_unwritten(&self, record: &AliasRecord) {
        let lookup =
            tokio::time::timeout(self.options.operation_timeout, self.store.get(&record.alias))
                .await;

        match lookup {
            Ok(Err(StoreError::NotFound)) => self.discard_object(record).await,
            Ok(Ok(existing)) if existing.storage_key != record.storage_key => {
                self.discard_object(record).await
            }
            Ok(Ok(_)) => {
                warn!(alias = %record.alias, "Insert reported failure but the record was written, keeping object")
            }
            Ok(Err(e)) => {
                warn!(alias = %record.alias, key = ?record.storage_key, error = %e, "Insert outcome unknown, keeping possibly orphaned object")
            }
            Err(_) => {
                warn!(alias = %record.alias, key = ?record.storage_key, "Insert outcome unknown, keeping possibly orphaned object")
            }
        }
    }

    /// Deletes the object behind a record whose insert failed.
    async fn discard_object(&self, record: &AliasRecord) {
        let Some(key) = &record.storage_key else {
            return;
        };

        match tokio::time::timeout(self.options.operation_timeout, self.objects.delete(key)).await
        {
            Ok(Ok(())) => debug!(alias = %record.alias, key = %key, "Discarded orphaned object"),
            Ok(Err(e)) => {
                error!(alias = %record.alias, key = %key, error = %e, "Failed to discard orphaned object")
            }
            Err(_) => {
                error!(alias = %record.alias, key = %key, "Discarding orphaned object timed out")
            }
        }
    }

    async fn deadline<T>(
        &self,
        op: &'static str,
        fut: impl Future<Output = T>,
    ) -> Result<T, AppError> {
        tokio::time::timeout(self.options.operation_timeout, fut)
            .await
            .map_err(|_| {
                error!(op, timeout = ?self.options.operation_timeout, "Operation timed out");
                AppError::unexpected()
            })
    }
}

/// Builds an `attachment` Content-Disposition for `filename`.
///
/// Quotes and control characters are dropped so the value stays a single,
/// well-formed header.
pub fn content_disposition(filename: &str) -> String {
    let safe: String = filename
        .chars()
        .filter(|c| *c != '"' && *c != '\\' && !c.is_control())
        .collect();
    format!("attachment; filename=\"{safe}\"")
}

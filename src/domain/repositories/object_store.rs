//! Trait for the blob store holding uploaded file bytes.

use async_trait::async_trait;
use bytes::Bytes;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ObjectStoreError {
    #[error("object not found: {0}")]
    NotFound(String),
    #[error("invalid object key: {0}")]
    InvalidKey(String),
    #[error("object store fault: {0}")]
    Fault(String),
}

/// Metadata returned alongside an object's bytes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ObjectStat {
    pub content_type: String,
    pub content_length: u64,
}

/// An object read fully into memory.
#[derive(Debug, Clone)]
pub struct StoredObject {
    pub stat: ObjectStat,
    pub body: Bytes,
}

/// Blob storage addressed by generated storage keys.
///
/// # Implementations
///
/// - [`crate::infrastructure::object_store::FsObjectStore`] - Directory-backed store
/// - Test mocks available with `cfg(test)`
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ObjectStore: Send + Sync {
    /// Stores `body` under `key`, replacing anything already there.
    async fn upload(&self, key: &str, content_type: &str, body: Bytes)
    -> Result<(), ObjectStoreError>;

    /// Reads the object stored under `key`.
    async fn get(&self, key: &str) -> Result<StoredObject, ObjectStoreError>;

    /// Removes the object under `key`. Deleting a missing object is not an error.
    async fn delete(&self, key: &str) -> Result<(), ObjectStoreError>;
}

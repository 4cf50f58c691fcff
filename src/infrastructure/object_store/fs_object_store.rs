//! Directory-backed object store.

use async_trait::async_trait;
use bytes::Bytes;
use serde::{Deserialize, Serialize};
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tracing::{debug, error};

use crate::domain::repositories::{ObjectStat, ObjectStore, ObjectStoreError, StoredObject};
use crate::utils::storage_key::is_valid_storage_key;

/// Content type used when an upload does not declare one.
pub const DEFAULT_CONTENT_TYPE: &str = "application/octet-stream";

/// Sidecar metadata written next to each object.
#[derive(Debug, Serialize, Deserialize)]
struct ObjectMeta {
    content_type: String,
}

/// Stores each object as a file under a root directory.
///
/// `<root>/<key>` holds the bytes and `<root>/<key>.meta.json` holds the
/// content type. Keys are restricted to what
/// [`crate::utils::storage_key::generate_storage_key`] produces, so a key can
/// never address a path outside `root`.
///
/// Writes go to a temporary file first and are renamed into place, so a
/// concurrent reader never sees a half-written object.
pub struct FsObjectStore {
    root: PathBuf,
}

impl FsObjectStore {
    /// Opens (and creates if needed) the store rooted at `root`.
    ///
    /// # Errors
    ///
    /// Returns [`ObjectStoreError::Fault`] if the directory cannot be created.
    pub async fn open(root: impl Into<PathBuf>) -> Result<Self, ObjectStoreError> {
        let root = root.into();
        tokio::fs::create_dir_all(&root)
            .await
            .map_err(|e| ObjectStoreError::Fault(format!("create {}: {e}", root.display())))?;

        debug!(root = %root.display(), "Object store ready");
        Ok(Self { root })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn paths(&self, key: &str) -> Result<(PathBuf, PathBuf), ObjectStoreError> {
        if !is_valid_storage_key(key) {
            return Err(ObjectStoreError::InvalidKey(key.to_string()));
        }
        Ok((
            self.root.join(key),
            self.root.join(format!("{key}.meta.json")),
        ))
    }
}

fn io_fault(op: &str, key: &str, e: std::io::Error) -> ObjectStoreError {
    error!(op, key, error = %e, "Object store I/O error");
    ObjectStoreError::Fault(e.to_string())
}

async fn write_atomically(path: &Path, contents: &[u8]) -> std::io::Result<()> {
    let mut tmp = path.as_os_str().to_owned();
    tmp.push(".partial");
    let tmp = PathBuf::from(tmp);
    let written = match tokio::fs::write(&tmp, contents).await {
        Ok(()) => tokio::fs::rename(&tmp, path).await,
        Err(e) => Err(e),
    };
    if written.is_err() {
        let _ = tokio::fs::remove_file(&tmp).await;
    }
    written
}

#[async_trait]
impl ObjectStore for FsObjectStore {
    async fn upload(
        &self,
        key: &str,
        content_type: &str,
        body: Bytes,
    ) -> Result<(), ObjectStoreError> {
        let (data_path, meta_path) = self.paths(key)?;

        let meta = serde_json::to_vec(&ObjectMeta {
            content_type: content_type.to_string(),
        })
        .map_err(|e| ObjectStoreError::Fault(e.to_string()))?;

        write_atomically(&data_path, &body)
            .await
            .map_err(|e| io_fault("upload", key, e))?;
        if let Err(e) = write_atomically(&meta_path, &meta).await {
            let _ = tokio::fs::remove_file(&data_path).await;
            return Err(io_fault("upload", key, e));
        }

        debug!(key, bytes = body.len(), "Object uploaded");
        Ok(())
    }

    async fn get(&self, key: &str) -> Result<StoredObject, ObjectStoreError> {
        let (data_path, meta_path) = self.paths(key)?;

        let body = match tokio::fs::read(&data_path).await {
            Ok(body) => Bytes::from(body),
            Err(e) if e.kind() == ErrorKind::NotFound => {
                return Err(ObjectStoreError::NotFound(key.to_string()));
            }
            Err(e) => return Err(io_fault("get", key, e)),
        };

        let content_type = match tokio::fs::read(&meta_path).await {
            Ok(raw) => serde_json::from_slice::<ObjectMeta>(&raw)
                .map(|m| m.content_type)
                .unwrap_or_else(|_| DEFAULT_CONTENT_TYPE.to_string()),
            Err(e) if e.kind() == ErrorKind::NotFound => DEFAULT_CONTENT_TYPE.to_string(),
            Err(e) => return Err(io_fault("get", key, e)),
        };

        Ok(StoredObject {
            stat: ObjectStat {
                content_type,
                content_length: body.len() as u64,
            },
            body,
        })
    }

    async fn delete(&self, key: &str) -> Result<(), ObjectStoreError> {
        let (data_path, meta_path) = self.paths(key)?;

        for path in [data_path, meta_path] {
            match tokio::fs::remove_file(&path).await {
                Ok(()) => {}
                Err(e) if e.kind() == ErrorKind::NotFound => {}
                Err(e) => return Err(io_fault("delete", key, e)),
            }
        }

        debug!(key, "Object deleted");
        Ok(())
    }
}

//! Alias record entity: the mapping from a short alias to a link or a file.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// What an alias points at.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum AliasKind {
    Link,
    File,
}

impl AliasKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            AliasKind::Link => "LINK",
            AliasKind::File => "FILE",
        }
    }
}

impl fmt::Display for AliasKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error returned when a stored kind string is not recognised.
#[derive(Debug, thiserror::Error)]
#[error("unknown alias kind: {0}")]
pub struct UnknownKind(pub String);

impl FromStr for AliasKind {
    type Err = UnknownKind;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "LINK" => Ok(AliasKind::Link),
            "FILE" => Ok(AliasKind::File),
            other => Err(UnknownKind(other.to_string())),
        }
    }
}

/// A persisted alias.
///
/// `kind` decides which of `redirect_to` / `filename` is meaningful. File records
/// also carry the object-store key their bytes live under, which may differ from
/// the user-visible `filename`.
///
/// The whole record (storage key included) is what the cache stores, so it
/// derives serde. API responses use their own DTOs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AliasRecord {
    pub alias: String,
    pub kind: AliasKind,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub redirect_to: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub filename: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub storage_key: Option<String>,
}

impl AliasRecord {
    /// Builds a LINK record.
    pub fn link(alias: impl Into<String>, redirect_to: impl Into<String>) -> Self {
        Self {
            alias: alias.into(),
            kind: AliasKind::Link,
            redirect_to: Some(redirect_to.into()),
            filename: None,
            storage_key: None,
        }
    }

    /// Builds a FILE record.
    pub fn file(
        alias: impl Into<String>,
        filename: impl Into<String>,
        storage_key: impl Into<String>,
    ) -> Self {
        Self {
            alias: alias.into(),
            kind: AliasKind::File,
            redirect_to: None,
            filename: Some(filename.into()),
            storage_key: Some(storage_key.into()),
        }
    }

    pub fn is_file(&self) -> bool {
        self.kind == AliasKind::File
    }
}

/// Input for creating a LINK alias.
///
/// `kind` is carried through from the request so the service can re-check it.
#[derive(Debug, Clone)]
pub struct NewLink {
    pub alias: String,
    pub kind: AliasKind,
    pub redirect_to: String,
}

/// Input for creating a FILE alias.
#[derive(Debug, Clone)]
pub struct NewFile {
    pub alias: String,
    pub kind: AliasKind,
    pub filename: String,
    pub content_type: String,
    pub payload: bytes::Bytes,
}

/// A file resolved for download.
#[derive(Debug, Clone)]
pub struct FileDownload {
    pub content_type: String,
    pub content_length: u64,
    pub content_disposition: String,
    pub body: bytes::Bytes,
}

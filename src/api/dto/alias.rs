//! Public view of an alias record.

use serde::Serialize;

use crate::domain::entities::{AliasKind, AliasRecord};

/// Alias as returned by the create and find endpoints.
///
/// The storage key is internal and never leaves the service.
#[derive(Debug, Serialize)]
pub struct AliasResponse {
    pub alias: String,
    #[serde(rename = "type")]
    pub kind: AliasKind,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub redirect_to: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub filename: Option<String>,
}

impl From<AliasRecord> for AliasResponse {
    fn from(record: AliasRecord) -> Self {
        Self {
            alias: record.alias,
            kind: record.kind,
            redirect_to: record.redirect_to,
            filename: record.filename,
        }
    }
}

//! Core domain entities.
//!
//! - [`AliasRecord`] - A persisted alias pointing at a link or a file
//! - [`NewLink`], [`NewFile`] - Inputs for creating aliases
//! - [`FileDownload`] - A resolved file ready to be streamed to a client

pub mod alias_record;

pub use alias_record::{AliasKind, AliasRecord, FileDownload, NewFile, NewLink, UnknownKind};

//! Utility helpers shared across layers.
//!
//! - [`storage_key`] - Collision-free object keys for uploaded files
//! - [`db_error`] - Classification of database errors

pub mod db_error;
pub mod storage_key;

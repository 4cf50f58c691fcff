//! Object store implementations for uploaded file payloads.

mod fs_object_store;

pub use fs_object_store::{DEFAULT_CONTENT_TYPE, FsObjectStore};

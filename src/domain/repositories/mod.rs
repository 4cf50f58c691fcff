//! Capability traits the resolution service depends on.
//!
//! These traits abstract the durable store and the blob store so that the
//! application layer never touches a concrete backend. Implementations live in
//! `crate::infrastructure`; mock implementations are generated via `mockall`
//! for unit tests.
//!
//! # Available Traits
//!
//! - [`AliasRepository`] - Create/read access to alias records
//! - [`ObjectStore`] - Upload/read/delete of file payloads
//!
//! The cache capability lives next to its implementations in
//! [`crate::infrastructure::cache`].

pub mod alias_repository;
pub mod object_store;

pub use alias_repository::{AliasRepository, StoreError};
pub use object_store::{ObjectStat, ObjectStore, ObjectStoreError, StoredObject};

#[cfg(test)]
pub use alias_repository::MockAliasRepository;
#[cfg(test)]
pub use object_store::MockObjectStore;

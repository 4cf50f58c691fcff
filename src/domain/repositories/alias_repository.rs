//! Repository trait for durable alias storage.

use crate::domain::entities::AliasRecord;
use async_trait::async_trait;

/// Errors a durable store can report.
///
/// The resolution service reclassifies these; they never reach HTTP handlers.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum StoreError {
    #[error("alias already exists")]
    UniqueViolation,
    #[error("alias not found")]
    NotFound,
    #[error("store fault: {0}")]
    Fault(String),
}

/// Durable source of truth for alias records.
///
/// Implementations must enforce alias uniqueness atomically: two concurrent
/// inserts of the same alias must yield exactly one success and one
/// [`StoreError::UniqueViolation`].
///
/// # Implementations
///
/// - [`crate::infrastructure::persistence::PgAliasRepository`] - PostgreSQL implementation
/// - Test mocks available with `cfg(test)`
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait AliasRepository: Send + Sync {
    /// Inserts a new record keyed by its alias.
    ///
    /// # Errors
    ///
    /// - [`StoreError::UniqueViolation`] if the alias is taken
    /// - [`StoreError::Fault`] on any other database error
    async fn insert(&self, record: &AliasRecord) -> Result<(), StoreError>;

    /// Fetches a record by alias.
    ///
    /// # Errors
    ///
    /// - [`StoreError::NotFound`] if no record has this alias
    /// - [`StoreError::Fault`] on database errors
    async fn get(&self, alias: &str) -> Result<AliasRecord, StoreError>;

    /// Round-trips to the database. Used by health checks.
    async fn ping(&self) -> Result<(), StoreError>;
}

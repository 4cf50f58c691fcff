//! PostgreSQL repository implementations.
//!
//! Concrete implementations of domain repository traits using SQLx.
//!
//! # Repositories
//!
//! - [`PgAliasRepository`] - Alias record storage and retrieval

pub mod pg_alias_repository;

pub use pg_alias_repository::PgAliasRepository;

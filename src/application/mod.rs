//! Application layer services implementing business logic.
//!
//! Services consume the repository, object store and cache traits and give the
//! HTTP handlers a single entry point that already speaks [`crate::AppError`].
//!
//! # Available Services
//!
//! - [`services::resolution_service::ResolutionService`] - Alias creation, lookup and file download

pub mod services;

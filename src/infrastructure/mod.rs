//! Infrastructure layer for external integrations.
//!
//! This layer implements interfaces defined by the domain layer, providing
//! concrete implementations for persistence, blob storage and caching.
//!
//! # Modules
//!
//! - [`cache`] - Cache backends (in-memory, Redis and no-op)
//! - [`captcha`] - Turnstile captcha verification
//! - [`object_store`] - Blob storage for uploaded files
//! - [`persistence`] - PostgreSQL repository implementations

pub mod cache;
pub mod captcha;
pub mod object_store;
pub mod persistence;

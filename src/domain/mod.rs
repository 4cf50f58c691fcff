//! Domain layer containing business entities and collaborator contracts.
//!
//! # Architecture
//!
//! - [`entities`] - Alias records and the inputs/outputs of alias operations
//! - [`repositories`] - Trait definitions for the durable store and the object store
//!
//! # Design Principles
//!
//! - Domain layer has no dependencies on infrastructure or presentation layers
//! - Traits define contracts implemented by the infrastructure layer
//! - Orchestration lives in [`crate::application::services`]

pub mod entities;
pub mod repositories;

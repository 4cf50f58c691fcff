//! HTTP request handlers for API endpoints.
//!
//! Each handler module corresponds to a logical grouping of endpoints.

pub mod download;
pub mod file;
pub mod find;
pub mod health;
pub mod link;

pub use download::download_handler;
pub use file::create_file_handler;
pub use find::find_handler;
pub use health::{health_handler, root_handler};
pub use link::create_link_handler;

//! API route configuration.
//!
//! Create endpoints pass through [`crate::api::middleware::captcha`]; lookups
//! do not.

use crate::api::handlers::{
    create_file_handler, create_link_handler, download_handler, find_handler,
};
use crate::api::middleware::captcha;
use crate::state::AppState;
use axum::{
    Router,
    extract::DefaultBodyLimit,
    middleware,
    routing::{get, post},
};

/// Version 2 API routes.
///
/// # Endpoints
///
/// - `POST /link`                  - Create a LINK alias
/// - `POST /file`                  - Create a FILE alias (multipart, capped at `max_upload_bytes`)
/// - `GET  /find/{alias}`          - Resolve an alias
/// - `GET  /download-file/{alias}` - Download the file behind a FILE alias
pub fn v2_routes(state: AppState, max_upload_bytes: usize) -> Router<AppState> {
    let create = Router::new()
        .route("/link", post(create_link_handler))
        .route(
            "/file",
            post(create_file_handler).layer(DefaultBodyLimit::max(max_upload_bytes)),
        )
        .route_layer(middleware::from_fn_with_state(state, captcha::layer));

    let lookup = Router::new()
        .route("/find/{alias}", get(find_handler))
        .route("/download-file/{alias}", get(download_handler));

    create.merge(lookup)
}

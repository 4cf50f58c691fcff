//! Handler for file downloads.

use axum::{
    extract::{Path, State},
    http::{
        HeaderValue, StatusCode,
        header::{CONTENT_DISPOSITION, CONTENT_LENGTH, CONTENT_TYPE},
    },
    response::{IntoResponse, Response},
};
use tracing::error;

use crate::error::AppError;
use crate::infrastructure::object_store::DEFAULT_CONTENT_TYPE;
use crate::state::AppState;

/// Streams the bytes behind a FILE alias as an attachment.
///
/// # Endpoint
///
/// `GET /api/v2/download-file/{alias}`
///
/// Responds with `Content-Type`, `Content-Length` and
/// `Content-Disposition: attachment; filename="<original name>"`.
///
/// # Errors
///
/// - 400 if the alias is a LINK
/// - 404 if the alias (or its file) does not exist
/// - 500 on storage failures
pub async fn download_handler(
    State(state): State<AppState>,
    Path(alias): Path<String>,
) -> Result<Response, AppError> {
    let file = state.resolution_service.download_file(&alias).await?;

    let content_type = HeaderValue::from_str(&file.content_type)
        .unwrap_or_else(|_| HeaderValue::from_static(DEFAULT_CONTENT_TYPE));

    let disposition = HeaderValue::from_str(&file.content_disposition).map_err(|e| {
        error!(alias = %alias, error = %e, "Invalid Content-Disposition");
        AppError::unexpected()
    })?;

    Ok((
        StatusCode::OK,
        [
            (CONTENT_TYPE, content_type),
            (CONTENT_LENGTH, HeaderValue::from(file.content_length)),
            (CONTENT_DISPOSITION, disposition),
        ],
        file.body,
    )
        .into_response())
}

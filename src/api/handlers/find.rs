//! Handler for alias lookup.

use axum::extract::{Path, State};

use crate::api::dto::alias::AliasResponse;
use crate::api::dto::envelope::ApiResponse;
use crate::error::AppError;
use crate::state::AppState;

/// Resolves an alias to its record, cache first.
///
/// # Endpoint
///
/// `GET /api/v2/find/{alias}`
///
/// # Errors
///
/// - 404 if the alias does not exist
/// - 500 on storage failures
pub async fn find_handler(
    State(state): State<AppState>,
    Path(alias): Path<String>,
) -> Result<ApiResponse<AliasResponse>, AppError> {
    let record = state.resolution_service.find(&alias).await?;

    Ok(ApiResponse::ok(record.into()))
}

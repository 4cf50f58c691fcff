//! Handler for link creation endpoint.

use axum::{
    Json,
    extract::{State, rejection::JsonRejection},
};
use validator::Validate;

use crate::api::dto::alias::AliasResponse;
use crate::api::dto::envelope::ApiResponse;
use crate::api::dto::link::ShortenLinkRequest;
use crate::error::AppError;
use crate::state::AppState;

/// Creates a LINK alias.
///
/// # Endpoint
///
/// `POST /api/v2/link`
///
/// # Request Body
///
/// ```json
/// { "alias": "abcde12345", "type": "LINK", "redirect_to": "https://example.com" }
/// ```
///
/// Unknown fields are rejected.
///
/// # Response
///
/// ```json
/// {
///   "code": 200,
///   "message": "OK",
///   "alias": "abcde12345",
///   "type": "LINK",
///   "redirect_to": "https://example.com"
/// }
/// ```
///
/// # Errors
///
/// - 400 if the body is malformed, fails validation, or the alias is taken
/// - 500 on storage failures
pub async fn create_link_handler(
    State(state): State<AppState>,
    payload: Result<Json<ShortenLinkRequest>, JsonRejection>,
) -> Result<ApiResponse<AliasResponse>, AppError> {
    let Json(payload) = payload?;
    payload.validate()?;

    let record = state.resolution_service.insert_link(payload.into()).await?;

    Ok(ApiResponse::ok(record.into()))
}

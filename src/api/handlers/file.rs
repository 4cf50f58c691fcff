//! Handler for file upload endpoint.

use axum::extract::{
    Multipart, State,
    multipart::{Field, MultipartRejection},
};
use bytes::Bytes;
use validator::Validate;

use crate::api::dto::alias::AliasResponse;
use crate::api::dto::envelope::ApiResponse;
use crate::api::dto::file::ShortenFileRequest;
use crate::domain::entities::NewFile;
use crate::error::AppError;
use crate::infrastructure::object_store::DEFAULT_CONTENT_TYPE;
use crate::state::AppState;

/// Multipart part carrying the JSON request.
pub const JSON_FIELD: &str = "json_field";

/// Multipart part carrying the file bytes.
pub const FILE_FIELD: &str = "file_field";

struct Upload {
    filename: String,
    content_type: String,
    payload: Bytes,
}

/// Creates a FILE alias from a multipart upload.
///
/// # Endpoint
///
/// `POST /api/v2/file`
///
/// # Request Body
///
/// `multipart/form-data` with exactly two parts:
/// - `json_field`: `{ "alias": "filealias1", "type": "FILE" }`
/// - `file_field`: the file, with a filename
///
/// The request size is capped by `MAX_UPLOAD_BYTES`.
///
/// # Errors
///
/// - 400 if a part is missing, unexpected or invalid, or the alias is taken
/// - 500 on upload or storage failures
pub async fn create_file_handler(
    State(state): State<AppState>,
    multipart: Result<Multipart, MultipartRejection>,
) -> Result<ApiResponse<AliasResponse>, AppError> {
    let mut multipart = multipart.map_err(|e| AppError::bad_request(e.body_text()))?;

    let mut request: Option<ShortenFileRequest> = None;
    let mut upload: Option<Upload> = None;

    while let Some(field) = multipart.next_field().await? {
        let name = field.name().unwrap_or_default().to_owned();
        match name.as_str() {
            JSON_FIELD => {
                let text = field.text().await?;
                let parsed = serde_json::from_str::<ShortenFileRequest>(&text)
                    .map_err(|e| AppError::bad_request(format!("{JSON_FIELD}: {e}")))?;
                request = Some(parsed);
            }
            FILE_FIELD => upload = Some(read_upload(field).await?),
            other => {
                return Err(AppError::bad_request(format!(
                    "unexpected multipart field '{other}'"
                )));
            }
        }
    }

    let request =
        request.ok_or_else(|| AppError::bad_request(format!("{JSON_FIELD} is required")))?;
    request.validate()?;
    let upload =
        upload.ok_or_else(|| AppError::bad_request(format!("{FILE_FIELD} is required")))?;

    let record = state
        .resolution_service
        .insert_file(NewFile {
            alias: request.alias,
            kind: request.kind,
            filename: upload.filename,
            content_type: upload.content_type,
            payload: upload.payload,
        })
        .await?;

    Ok(ApiResponse::ok(record.into()))
}

async fn read_upload(field: Field<'_>) -> Result<Upload, AppError> {
    let filename = field
        .file_name()
        .and_then(base_name)
        .ok_or_else(|| AppError::bad_request(format!("{FILE_FIELD} must carry a filename")))?;

    let content_type = field
        .content_type()
        .map(str::to_owned)
        .unwrap_or_else(|| DEFAULT_CONTENT_TYPE.to_string());

    let payload = field.bytes().await?;

    Ok(Upload {
        filename,
        content_type,
        payload,
    })
}

/// Strips any directory components a client put in the filename.
fn base_name(raw: &str) -> Option<String> {
    raw.rsplit(['/', '\\'])
        .next()
        .map(str::trim)
        .filter(|name| !name.is_empty())
        .map(str::to_owned)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_base_name() {
        assert_eq!(base_name("report.pdf").as_deref(), Some("report.pdf"));
        assert_eq!(base_name("C:\\Users\\me\\report.pdf").as_deref(), Some("report.pdf"));
        assert_eq!(base_name("../../etc/passwd").as_deref(), Some("passwd"));
        assert_eq!(base_name("dir/"), None);
        assert_eq!(base_name("   "), None);
    }
}

//! Application error taxonomy and its HTTP rendering.
//!
//! Every failure leaving the resolution service is one of three kinds:
//! [`AppError::BadRequest`], [`AppError::NotFound`] or [`AppError::Unexpected`].
//! Handlers return them directly; [`IntoResponse`] renders the `{code, message}`
//! envelope.

use axum::{
    Json,
    extract::rejection::JsonRejection,
    extract::multipart::MultipartError,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;
use validator::{ValidationErrors, ValidationErrorsKind};

/// Public message for faults the client cannot fix by changing the request.
pub const CANT_PROCESS_REQUEST: &str = "can't process your request";

/// Error body shared by every failing endpoint.
#[derive(Debug, Serialize)]
pub struct ErrorEnvelope {
    pub code: u16,
    pub message: String,
}

#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("{message}")]
    BadRequest { message: String },
    #[error("{message}")]
    NotFound { message: String },
    #[error("{message}")]
    Unexpected { message: String },
}

impl AppError {
    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::BadRequest {
            message: message.into(),
        }
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self::NotFound {
            message: message.into(),
        }
    }

    /// An unexpected fault with the generic public message.
    ///
    /// Callers log the underlying cause before constructing this.
    pub fn unexpected() -> Self {
        Self::Unexpected {
            message: CANT_PROCESS_REQUEST.to_string(),
        }
    }

    pub fn status_code(&self) -> StatusCode {
        match self {
            AppError::BadRequest { .. } => StatusCode::BAD_REQUEST,
            AppError::NotFound { .. } => StatusCode::NOT_FOUND,
            AppError::Unexpected { .. } => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    pub fn to_envelope(&self) -> ErrorEnvelope {
        ErrorEnvelope {
            code: self.status_code().as_u16(),
            message: self.to_string(),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        (self.status_code(), Json(self.to_envelope())).into_response()
    }
}

impl From<ValidationErrors> for AppError {
    fn from(errors: ValidationErrors) -> Self {
        AppError::bad_request(describe_validation(&errors))
    }
}

impl From<JsonRejection> for AppError {
    fn from(rejection: JsonRejection) -> Self {
        AppError::bad_request(rejection.body_text())
    }
}

impl From<MultipartError> for AppError {
    fn from(err: MultipartError) -> Self {
        AppError::bad_request(err.body_text())
    }
}

/// Turns the first field error into a human readable sentence.
fn describe_validation(errors: &ValidationErrors) -> String {
    let mut fields: Vec<_> = errors.errors().iter().collect();
    fields.sort_by_key(|(field, _)| field.to_string());

    for (field, kind) in fields {
        let ValidationErrorsKind::Field(field_errors) = kind else {
            continue;
        };
        let Some(err) = field_errors.first() else {
            continue;
        };

        if let Some(message) = &err.message {
            return format!("{field}: {message}");
        }

        return match &*err.code {
            "length" => {
                let min = err.params.get("min").map(|v| v.to_string());
                let max = err.params.get("max").map(|v| v.to_string());
                match (min, max) {
                    (Some(min), Some(max)) => {
                        format!("{field} must be between {min} and {max} characters")
                    }
                    _ => format!("{field} has an invalid length"),
                }
            }
            "regex" => format!("{field} must only contain alphanumeric characters"),
            "url" => format!("{field} must be a valid URL"),
            code => format!("{field} is invalid ({code})"),
        };
    }

    "invalid request".to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use validator::Validate;

    #[derive(Validate)]
    struct Probe {
        #[validate(length(min = 5, max = 30))]
        alias: String,
    }

    #[test]
    fn test_status_codes() {
        assert_eq!(
            AppError::bad_request("x").status_code(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(AppError::not_found("x").status_code(), StatusCode::NOT_FOUND);
        assert_eq!(
            AppError::unexpected().status_code(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn test_unexpected_hides_cause() {
        let envelope = AppError::unexpected().to_envelope();
        assert_eq!(envelope.code, 500);
        assert_eq!(envelope.message, CANT_PROCESS_REQUEST);
    }

    #[test]
    fn test_validation_errors_become_bad_request() {
        let errors = Probe {
            alias: "abc".to_string(),
        }
        .validate()
        .unwrap_err();

        let err = AppError::from(errors);
        assert!(matches!(err, AppError::BadRequest { .. }));
        assert_eq!(err.to_string(), "alias must be between 5 and 30 characters");
    }
}

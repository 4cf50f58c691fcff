//! Captcha verification for the create endpoints.
//!
//! [`CaptchaVerifier`] is the seam the HTTP middleware calls; [`TurnstileVerifier`]
//! checks tokens against Cloudflare Turnstile.

mod turnstile;

use async_trait::async_trait;
use axum::http::StatusCode;

pub use turnstile::{SITEVERIFY_URL, TurnstileVerifier, classify_error_code};

/// Why a captcha token was rejected.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CaptchaError {
    #[error("captcha is required")]
    MissingInput,
    #[error("invalid captcha")]
    InvalidInput,
    #[error("malformed captcha")]
    BadRequest,
    #[error("duplicate captcha")]
    TimeoutOrDuplicate,
    #[error("internal captcha validation error")]
    Internal,
}

impl CaptchaError {
    /// HTTP status the rejection is reported with.
    pub fn status_code(&self) -> StatusCode {
        match self {
            CaptchaError::MissingInput | CaptchaError::BadRequest => StatusCode::BAD_REQUEST,
            CaptchaError::InvalidInput | CaptchaError::TimeoutOrDuplicate => {
                StatusCode::NOT_ACCEPTABLE
            }
            CaptchaError::Internal => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

#[async_trait]
pub trait CaptchaVerifier: Send + Sync {
    /// Verifies the token the client sent; `None` when the header was absent.
    async fn verify(&self, token: Option<&str>) -> Result<(), CaptchaError>;
}

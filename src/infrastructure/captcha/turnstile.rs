//! Cloudflare Turnstile token verification.

use async_trait::async_trait;
use serde::Deserialize;
use std::time::Duration;
use tracing::{debug, warn};

use super::{CaptchaError, CaptchaVerifier};

pub const SITEVERIFY_URL: &str = "https://challenges.cloudflare.com/turnstile/v0/siteverify";

#[derive(Debug, Deserialize)]
struct SiteverifyResponse {
    success: bool,
    #[serde(default, rename = "error-codes")]
    error_codes: Vec<String>,
}

/// Maps a Turnstile error code to a rejection.
///
/// Codes that are not client faults (including ones Cloudflare may add later)
/// are treated as internal errors.
pub fn classify_error_code(code: &str) -> CaptchaError {
    match code {
        "missing-input-response" => CaptchaError::MissingInput,
        "invalid-input-response" => CaptchaError::InvalidInput,
        "bad-request" => CaptchaError::BadRequest,
        "timeout-or-duplicate" => CaptchaError::TimeoutOrDuplicate,
        "internal-error" => CaptchaError::Internal,
        other => {
            debug!(code = other, "Unrecognised turnstile error code");
            CaptchaError::Internal
        }
    }
}

/// Verifies tokens with the Turnstile `siteverify` endpoint.
pub struct TurnstileVerifier {
    client: reqwest::Client,
    secret: String,
    endpoint: String,
}

impl TurnstileVerifier {
    /// Creates a verifier for the given site secret.
    ///
    /// # Errors
    ///
    /// Fails if the HTTP client cannot be built.
    pub fn new(secret: impl Into<String>, timeout: Duration) -> anyhow::Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .redirect(reqwest::redirect::Policy::none())
            .build()?;

        Ok(Self {
            client,
            secret: secret.into(),
            endpoint: SITEVERIFY_URL.to_string(),
        })
    }

    /// Points the verifier at a different endpoint.
    pub fn with_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = endpoint.into();
        self
    }
}

#[async_trait]
impl CaptchaVerifier for TurnstileVerifier {
    async fn verify(&self, token: Option<&str>) -> Result<(), CaptchaError> {
        let response = self
            .client
            .post(&self.endpoint)
            .form(&[
                ("secret", self.secret.as_str()),
                ("response", token.unwrap_or_default()),
            ])
            .send()
            .await
            .map_err(|e| {
                warn!(error = %e, "Turnstile request failed");
                CaptchaError::Internal
            })?;

        let result: SiteverifyResponse = response.json().await.map_err(|e| {
            warn!(error = %e, "Turnstile response could not be decoded");
            CaptchaError::Internal
        })?;

        if result.success {
            return Ok(());
        }

        Err(result
            .error_codes
            .first()
            .map(|code| classify_error_code(code))
            .unwrap_or(CaptchaError::Internal))
    }
}

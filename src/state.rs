//! Shared application state injected into handlers and middleware.

use std::sync::Arc;

use crate::application::services::ResolutionService;
use crate::infrastructure::captcha::CaptchaVerifier;

#[derive(Clone)]
pub struct AppState {
    pub resolution_service: Arc<ResolutionService>,
    /// Verifier for create requests; `None` disables the captcha check.
    pub captcha: Option<Arc<dyn CaptchaVerifier>>,
}

impl AppState {
    pub fn new(resolution_service: Arc<ResolutionService>) -> Self {
        Self {
            resolution_service,
            captcha: None,
        }
    }

    pub fn with_captcha(mut self, verifier: Arc<dyn CaptchaVerifier>) -> Self {
        self.captcha = Some(verifier);
        self
    }
}

//! CORS policy.

use anyhow::{Context, Result};
use axum::http::{HeaderName, HeaderValue, Method, header::CONTENT_TYPE};
use tower_http::cors::{AllowOrigin, Any, CorsLayer};

use crate::api::middleware::captcha::CAPTCHA_HEADER;
use crate::config::Environment;

/// Builds the CORS layer.
///
/// Locally any origin may call the API. In production only the configured
/// origins are allowed.
///
/// # Errors
///
/// Fails if a configured origin is not a valid header value.
pub fn layer(environment: Environment, allowed_origins: &[String]) -> Result<CorsLayer> {
    let base = CorsLayer::new()
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers([CONTENT_TYPE, HeaderName::from_static(CAPTCHA_HEADER)]);

    match environment {
        Environment::Local => Ok(base.allow_origin(Any)),
        Environment::Production => {
            let origins = allowed_origins
                .iter()
                .map(|origin| {
                    HeaderValue::from_str(origin)
                        .with_context(|| format!("invalid CORS origin '{origin}'"))
                })
                .collect::<Result<Vec<_>>>()?;

            Ok(base.allow_origin(AllowOrigin::list(origins)))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rejects_invalid_origin() {
        let origins = vec!["https://ok.example".to_string(), "bad\norigin".to_string()];

        assert!(layer(Environment::Production, &origins).is_err());
    }

    #[test]
    fn test_builds_for_both_environments() {
        assert!(layer(Environment::Local, &[]).is_ok());
        assert!(layer(Environment::Production, &["https://ok.example".to_string()]).is_ok());
    }
}

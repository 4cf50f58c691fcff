//! Top-level router configuration.
//!
//! # Route Structure
//!
//! - `GET  /`         - Liveness probe
//! - `GET  /health`   - Health check: database and cache
//! - `/api/v2/*`      - Alias API (rate limited)
//!
//! # Middleware
//!
//! - **Tracing** - Structured request/response logging
//! - **Panic recovery** - 500 envelope instead of a dropped connection
//! - **CORS** - Any origin locally, configured origins in production
//! - **Rate limiting** - Per-IP token bucket (configurable for proxy deployments)
//! - **Captcha** - Turnstile check on create endpoints, when configured
//! - **Path normalization** - Trailing slash handling

use crate::api;
use crate::api::handlers::{health_handler, root_handler};
use crate::api::middleware::{cors, panic, rate_limit, tracing};
use crate::config::{Config, Environment};
use crate::state::AppState;
use anyhow::Result;
use axum::Router;
use axum::routing::get;
use tower::Layer;
use tower_http::normalize_path::{NormalizePath, NormalizePathLayer};

/// HTTP-facing settings.
#[derive(Debug, Clone)]
pub struct HttpOptions {
    pub environment: Environment,
    pub cors_allowed_origins: Vec<String>,
    pub max_upload_bytes: usize,
    pub rate_limit_per_second: u64,
    pub rate_limit_burst: u32,
    /// When `true`, rate limiting reads client IP from forwarding headers
    /// instead of the peer socket address; enable only when the service runs
    /// behind a trusted reverse proxy.
    pub behind_proxy: bool,
}

impl Default for HttpOptions {
    fn default() -> Self {
        Self {
            environment: Environment::Local,
            cors_allowed_origins: Vec::new(),
            max_upload_bytes: 10 << 20,
            rate_limit_per_second: 3,
            rate_limit_burst: 3,
            behind_proxy: false,
        }
    }
}

impl From<&Config> for HttpOptions {
    fn from(config: &Config) -> Self {
        Self {
            environment: config.environment,
            cors_allowed_origins: config.cors_allowed_origins.clone(),
            max_upload_bytes: config.max_upload_bytes,
            rate_limit_per_second: config.rate_limit_per_second,
            rate_limit_burst: config.rate_limit_burst,
            behind_proxy: config.behind_proxy,
        }
    }
}

/// Builds the router with all routes and middleware.
///
/// # Errors
///
/// Fails if the rate limit or CORS settings are invalid.
pub fn router(state: AppState, options: &HttpOptions) -> Result<Router> {
    let v2 = api::routes::v2_routes(state.clone(), options.max_upload_bytes);

    let v2 = if options.behind_proxy {
        v2.layer(rate_limit::smart_ip_layer(
            options.rate_limit_per_second,
            options.rate_limit_burst,
        )?)
    } else {
        v2.layer(rate_limit::peer_ip_layer(
            options.rate_limit_per_second,
            options.rate_limit_burst,
        )?)
    };

    Ok(Router::new()
        .route("/", get(root_handler))
        .route("/health", get(health_handler))
        .nest("/api/v2", v2)
        .with_state(state)
        .layer(cors::layer(
            options.environment,
            &options.cors_allowed_origins,
        )?)
        .layer(panic::layer())
        .layer(tracing::layer()))
}

/// [`router`] wrapped so that `/api/v2/find/abc/` and `/api/v2/find/abc`
/// resolve the same.
pub fn app_router(state: AppState, options: &HttpOptions) -> Result<NormalizePath<Router>> {
    Ok(NormalizePathLayer::trim_trailing_slash().layer(router(state, options)?))
}

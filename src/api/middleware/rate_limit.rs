//! Rate limiting middleware using token bucket algorithm.

use anyhow::{Context, Result, bail};
use governor::clock::QuantaInstant;
use governor::middleware::NoOpMiddleware;
use std::sync::Arc;
use std::time::Duration;
use tower_governor::{
    GovernorLayer,
    governor::{GovernorConfig, GovernorConfigBuilder},
    key_extractor::{KeyExtractor, PeerIpKeyExtractor, SmartIpKeyExtractor},
};

/// How often idle client buckets are dropped.
const CLEANUP_INTERVAL: Duration = Duration::from_secs(60);

pub type PeerIpGovernor =
    GovernorLayer<PeerIpKeyExtractor, NoOpMiddleware<QuantaInstant>, axum::body::Body>;

pub type SmartIpGovernor =
    GovernorLayer<SmartIpKeyExtractor, NoOpMiddleware<QuantaInstant>, axum::body::Body>;

/// Limits requests per client socket address.
///
/// Each client gets a bucket of `burst` tokens refilled at `per_second`.
/// Requests exceeding the limit receive `429 Too Many Requests`. The server
/// must be started with `into_make_service_with_connect_info::<SocketAddr>()`.
///
/// # Example
///
/// ```rust,ignore
/// let app = Router::new()
///     .route("/api/v2/link", post(create_link_handler))
///     .layer(rate_limit::peer_ip_layer(3, 3)?);
/// ```
pub fn peer_ip_layer(per_second: u64, burst: u32) -> Result<PeerIpGovernor> {
    let config = GovernorConfigBuilder::default()
        .per_millisecond(replenish_interval_ms(per_second)?)
        .burst_size(burst)
        .finish()
        .context("invalid rate limit configuration")?;

    Ok(GovernorLayer::new(with_cleanup(config)))
}

/// Limits requests per client IP taken from `X-Forwarded-For`, `X-Real-IP`
/// or `Forwarded`, falling back to the socket address.
///
/// Only use behind a trusted reverse proxy; clients can forge these headers.
pub fn smart_ip_layer(per_second: u64, burst: u32) -> Result<SmartIpGovernor> {
    let config = GovernorConfigBuilder::default()
        .per_millisecond(replenish_interval_ms(per_second)?)
        .burst_size(burst)
        .key_extractor(SmartIpKeyExtractor)
        .finish()
        .context("invalid rate limit configuration")?;

    Ok(GovernorLayer::new(with_cleanup(config)))
}

/// Converts a requests-per-second rate into the interval at which one token
/// is added back to a client's bucket.
fn replenish_interval_ms(per_second: u64) -> Result<u64> {
    if per_second == 0 {
        bail!("rate limit must allow at least one request per second");
    }
    Ok((1000 / per_second).max(1))
}

/// Periodically forgets clients whose buckets have refilled.
fn with_cleanup<K>(
    config: GovernorConfig<K, NoOpMiddleware<QuantaInstant>>,
) -> Arc<GovernorConfig<K, NoOpMiddleware<QuantaInstant>>>
where
    K: KeyExtractor,
    K::Key: Send + Sync + 'static,
{
    let config = Arc::new(config);

    if let Ok(handle) = tokio::runtime::Handle::try_current() {
        let limiter = Arc::clone(config.limiter());
        handle.spawn(async move {
            let mut interval = tokio::time::interval(CLEANUP_INTERVAL);
            loop {
                interval.tick().await;
                limiter.retain_recent();
            }
        });
    }

    config
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_zero_rate_is_rejected() {
        assert!(peer_ip_layer(0, 3).is_err());
        assert!(smart_ip_layer(3, 0).is_err());
    }

    #[test]
    fn test_replenish_interval() {
        assert_eq!(replenish_interval_ms(1).unwrap(), 1000);
        assert_eq!(replenish_interval_ms(3).unwrap(), 333);
        assert_eq!(replenish_interval_ms(5000).unwrap(), 1);
        assert!(replenish_interval_ms(0).is_err());
    }

    #[test]
    fn test_valid_layers_build() {
        assert!(peer_ip_layer(3, 3).is_ok());
        assert!(smart_ip_layer(3, 3).is_ok());
    }
}

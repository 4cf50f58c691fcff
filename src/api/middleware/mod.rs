//! HTTP middleware for request processing and protection.
//!
//! Provides captcha verification, rate limiting, CORS, panic recovery and
//! observability middleware.

pub mod captcha;
pub mod cors;
pub mod panic;
pub mod rate_limit;
pub mod tracing;

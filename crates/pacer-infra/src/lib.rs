//! Pacer Infrastructure Library
//!
//! This crate provides the infrastructure components Pacer workers are built on:
//! - Rate limiting (token bucket)
//! - Telemetry initialization
//! - Error reporting through tracing

#[cfg(feature = "observability-basic")]
pub mod telemetry;

#[cfg(feature = "rate-limit")]
pub mod rate_limit;

#[cfg(feature = "reporting")]
pub mod reporting;

// Re-export commonly used types
#[cfg(feature = "observability-basic")]
pub use telemetry::{init_telemetry, shutdown_telemetry};

#[cfg(feature = "rate-limit")]
pub use rate_limit::{Limit, RateLimiter};

#[cfg(feature = "reporting")]
pub use reporting::TracingErrorReporter;

//! Pacer Worker – rate-limited background workers.
//!
//! A worker repeatedly runs one [`Handler`], at most as often as its execution
//! limiter allows. When the handler fails the failure is reported and the worker
//! restarts, at most as often as its restart limiter allows. Both limiters, the
//! retry delay and the error reporter are set through [`WorkerOption`]s.

mod config;
mod handler;
mod options;
mod worker;

pub use config::{
    WorkerConfig, DEFAULT_EXECUTION_BURST, DEFAULT_EXECUTION_PERIOD, DEFAULT_RESTART_BURST,
    DEFAULT_RESTART_PERIOD, DEFAULT_RETRY_DELAY,
};
pub use handler::Handler;
pub use options::{
    with_limit_every, with_limiter, with_report, with_restart_limiter, with_settings, with_sleep,
    WorkerOption,
};
pub use worker::{Worker, WorkerHandle, WorkerStats};

// Re-exported so callers can build limiters and contexts without extra dependencies
pub use pacer_core::{ErrorReporter, WorkerContext, WorkerError};
pub use pacer_infra::{Limit, RateLimiter};

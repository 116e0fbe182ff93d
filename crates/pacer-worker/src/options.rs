//! Worker options
//!
//! Each option changes one aspect of a [`WorkerConfig`] while it is being built.

use std::sync::Arc;
use std::time::Duration;

use pacer_core::{ErrorReporter, WorkerSettings};
use pacer_infra::RateLimiter;

use crate::config::WorkerConfig;

/// A single configuration step, applied by [`WorkerConfig::new`].
pub struct WorkerOption(Box<dyn FnOnce(&mut WorkerConfig) + Send>);

impl WorkerOption {
    pub(crate) fn new<F>(apply: F) -> Self
    where
        F: FnOnce(&mut WorkerConfig) + Send + 'static,
    {
        Self(Box::new(apply))
    }

    pub(crate) fn apply(self, config: &mut WorkerConfig) {
        (self.0)(config)
    }
}

/// Report handler failures to `reporter`.
///
/// The reporter then owns the failure event; the run loop only logs it at debug.
pub fn with_report(reporter: Arc<dyn ErrorReporter>) -> WorkerOption {
    WorkerOption::new(move |config| config.error_reporter = Some(reporter))
}

/// Sleep for `delay` whenever a rate limiter denies an attempt.
pub fn with_sleep(delay: Duration) -> WorkerOption {
    WorkerOption::new(move |config| config.retry_delay = delay)
}

/// Use `limiter` to pace handler executions.
pub fn with_limiter(limiter: RateLimiter) -> WorkerOption {
    WorkerOption::new(move |config| config.execution_limiter = limiter)
}

/// Run the handler at most once per `period` (burst of one).
pub fn with_limit_every(period: Duration) -> WorkerOption {
    WorkerOption::new(move |config| config.execution_limiter = RateLimiter::every(period, 1))
}

/// Use `limiter` to pace restarts after a failure.
pub fn with_restart_limiter(limiter: RateLimiter) -> WorkerOption {
    WorkerOption::new(move |config| config.restart_limiter = limiter)
}

/// Apply limiter and retry settings loaded from the environment.
pub fn with_settings(settings: &WorkerSettings) -> WorkerOption {
    let execution_period = settings.execution_period;
    let execution_burst = settings.execution_burst;
    let restart_period = settings.restart_period;
    let restart_burst = settings.restart_burst;
    let retry_delay = settings.retry_delay;

    WorkerOption::new(move |config| {
        config.execution_limiter = RateLimiter::every(execution_period, execution_burst);
        config.restart_limiter = RateLimiter::every(restart_period, restart_burst);
        config.retry_delay = retry_delay;
    })
}

//! Worker configuration
//!
//! `WorkerConfig` is built once from a name, a handler and an ordered list of
//! options, then only read. Options run in the order given, so the last option
//! touching a field wins.

use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use pacer_core::ErrorReporter;
use pacer_infra::RateLimiter;

use crate::handler::Handler;
use crate::options::WorkerOption;

/// Default execution cadence: one run per minute.
pub const DEFAULT_EXECUTION_PERIOD: Duration = Duration::from_secs(60);
pub const DEFAULT_EXECUTION_BURST: u32 = 1;
/// Default restart cadence: one token per hour, up to five banked.
pub const DEFAULT_RESTART_PERIOD: Duration = Duration::from_secs(3600);
pub const DEFAULT_RESTART_BURST: u32 = 5;
/// Sleep between attempts when a limiter denies one.
pub const DEFAULT_RETRY_DELAY: Duration = Duration::from_secs(1);

pub struct WorkerConfig {
    pub(crate) name: String,
    pub(crate) handler: Arc<dyn Handler>,
    pub(crate) execution_limiter: RateLimiter,
    pub(crate) restart_limiter: RateLimiter,
    pub(crate) error_reporter: Option<Arc<dyn ErrorReporter>>,
    pub(crate) retry_delay: Duration,
}

impl WorkerConfig {
    /// Build a worker configuration.
    ///
    /// Defaults are applied first, then `options` in order. Construction never
    /// fails.
    pub fn new<H>(
        name: impl Into<String>,
        handler: H,
        options: impl IntoIterator<Item = WorkerOption>,
    ) -> Self
    where
        H: Handler + 'static,
    {
        Self::with_shared_handler(name, Arc::new(handler), options)
    }

    /// Same as [`WorkerConfig::new`] for a handler that is already shared.
    pub fn with_shared_handler(
        name: impl Into<String>,
        handler: Arc<dyn Handler>,
        options: impl IntoIterator<Item = WorkerOption>,
    ) -> Self {
        let mut config = Self {
            name: name.into(),
            handler,
            execution_limiter: RateLimiter::every(DEFAULT_EXECUTION_PERIOD, DEFAULT_EXECUTION_BURST),
            restart_limiter: RateLimiter::every(DEFAULT_RESTART_PERIOD, DEFAULT_RESTART_BURST),
            error_reporter: None,
            retry_delay: DEFAULT_RETRY_DELAY,
        };

        let mut applied = 0usize;
        for option in options {
            option.apply(&mut config);
            applied += 1;
        }

        tracing::debug!(
            worker = %config.name,
            options = applied,
            execution_limit = config.execution_limiter.limit().as_per_second(),
            execution_burst = config.execution_limiter.burst(),
            restart_limit = config.restart_limiter.limit().as_per_second(),
            restart_burst = config.restart_limiter.burst(),
            retry_delay_ms = config.retry_delay.as_millis(),
            error_reporter = config.error_reporter.is_some(),
            "Worker configured"
        );

        config
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn handler(&self) -> &Arc<dyn Handler> {
        &self.handler
    }

    pub fn execution_limiter(&self) -> &RateLimiter {
        &self.execution_limiter
    }

    pub fn restart_limiter(&self) -> &RateLimiter {
        &self.restart_limiter
    }

    pub fn error_reporter(&self) -> Option<&Arc<dyn ErrorReporter>> {
        self.error_reporter.as_ref()
    }

    pub fn retry_delay(&self) -> Duration {
        self.retry_delay
    }
}

impl fmt::Debug for WorkerConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("WorkerConfig")
            .field("name", &self.name)
            .field("execution_limiter", &self.execution_limiter)
            .field("restart_limiter", &self.restart_limiter)
            .field("error_reporter", &self.error_reporter.is_some())
            .field("retry_delay", &self.retry_delay)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::options::{
        with_limit_every, with_limiter, with_report, with_restart_limiter, with_settings,
        with_sleep,
    };
    use pacer_core::{NoOpErrorReporter, WorkerContext, WorkerSettings};
    use pacer_infra::Limit;

    fn noop_handler() -> Arc<dyn Handler> {
        Arc::new(|_ctx: WorkerContext| async { Ok::<_, anyhow::Error>(()) })
    }

    fn build(options: Vec<WorkerOption>) -> WorkerConfig {
        WorkerConfig::with_shared_handler("sync-job", noop_handler(), options)
    }

    #[test]
    fn defaults_without_options() {
        let config = build(vec![]);

        assert_eq!(config.name(), "sync-job");
        assert_eq!(
            config.execution_limiter().limit(),
            Limit::every(Duration::from_secs(60))
        );
        assert_eq!(config.execution_limiter().burst(), 1);
        assert_eq!(
            config.restart_limiter().limit(),
            Limit::every(Duration::from_secs(3600))
        );
        assert_eq!(config.restart_limiter().burst(), 5);
        assert_eq!(config.retry_delay(), Duration::from_secs(1));
        assert!(config.error_reporter().is_none());
    }

    #[test]
    fn later_sleep_option_wins() {
        let config = build(vec![
            with_sleep(Duration::from_secs(2)),
            with_sleep(Duration::from_millis(500)),
        ]);
        assert_eq!(config.retry_delay(), Duration::from_millis(500));
    }

    #[test]
    fn execution_limiter_options_are_last_write_wins() {
        let explicit_last = build(vec![
            with_limit_every(Duration::from_secs(10)),
            with_limiter(RateLimiter::every(Duration::from_secs(3), 4)),
        ]);
        assert_eq!(
            explicit_last.execution_limiter().limit(),
            Limit::every(Duration::from_secs(3))
        );
        assert_eq!(explicit_last.execution_limiter().burst(), 4);

        let period_last = build(vec![
            with_limiter(RateLimiter::every(Duration::from_secs(3), 4)),
            with_limit_every(Duration::from_secs(10)),
        ]);
        assert_eq!(
            period_last.execution_limiter().limit(),
            Limit::every(Duration::from_secs(10))
        );
        assert_eq!(period_last.execution_limiter().burst(), 1);
    }

    #[test]
    fn later_reporter_option_wins() {
        let first: Arc<dyn ErrorReporter> = Arc::new(NoOpErrorReporter);
        let second: Arc<dyn ErrorReporter> = Arc::new(NoOpErrorReporter);

        let config = build(vec![with_report(first.clone()), with_report(second.clone())]);
        let reporter = config.error_reporter().expect("reporter should be set");
        assert!(Arc::ptr_eq(reporter, &second));
        assert!(!Arc::ptr_eq(reporter, &first));
    }

    #[test]
    fn limit_every_matches_explicit_limiter() {
        let period = Duration::from_millis(1500);
        let config = build(vec![with_limit_every(period)]);
        let explicit = RateLimiter::new(Limit::every(period), 1);

        assert_eq!(config.execution_limiter().limit(), explicit.limit());
        assert_eq!(config.execution_limiter().burst(), explicit.burst());
    }

    #[test]
    fn options_never_touch_name_or_handler() {
        let handler = noop_handler();
        let config = WorkerConfig::with_shared_handler(
            "sync-job",
            handler.clone(),
            vec![
                with_sleep(Duration::ZERO),
                with_limit_every(Duration::from_secs(1)),
                with_restart_limiter(RateLimiter::every(Duration::from_secs(5), 1)),
                with_report(Arc::new(NoOpErrorReporter)),
                with_settings(&WorkerSettings::default()),
            ],
        );

        assert_eq!(config.name(), "sync-job");
        assert!(Arc::ptr_eq(config.handler(), &handler));
    }

    #[test]
    fn restart_limiter_option_only_touches_restart_limiter() {
        let config = build(vec![with_restart_limiter(RateLimiter::every(
            Duration::from_secs(30),
            2,
        ))]);

        assert_eq!(
            config.restart_limiter().limit(),
            Limit::every(Duration::from_secs(30))
        );
        assert_eq!(config.restart_limiter().burst(), 2);
        assert_eq!(
            config.execution_limiter().limit(),
            Limit::every(DEFAULT_EXECUTION_PERIOD)
        );
    }

    #[test]
    fn settings_option_applies_and_can_be_overridden() {
        let settings = WorkerSettings {
            execution_period: Duration::from_secs(15),
            execution_burst: 3,
            restart_period: Duration::from_secs(120),
            restart_burst: 2,
            retry_delay: Duration::from_millis(200),
            ..WorkerSettings::default()
        };

        let config = build(vec![
            with_settings(&settings),
            with_sleep(Duration::from_secs(4)),
        ]);

        assert_eq!(
            config.execution_limiter().limit(),
            Limit::every(Duration::from_secs(15))
        );
        assert_eq!(config.execution_limiter().burst(), 3);
        assert_eq!(
            config.restart_limiter().limit(),
            Limit::every(Duration::from_secs(120))
        );
        assert_eq!(config.restart_limiter().burst(), 2);
        assert_eq!(config.retry_delay(), Duration::from_secs(4));
    }

    #[test]
    fn construction_is_deterministic() {
        let handler = noop_handler();
        let make = || {
            WorkerConfig::with_shared_handler(
                "sync-job",
                handler.clone(),
                vec![
                    with_sleep(Duration::from_millis(750)),
                    with_limit_every(Duration::from_secs(20)),
                ],
            )
        };

        let a = make();
        let b = make();
        assert_eq!(a.name(), b.name());
        assert_eq!(a.retry_delay(), b.retry_delay());
        assert_eq!(a.execution_limiter().limit(), b.execution_limiter().limit());
        assert_eq!(a.execution_limiter().burst(), b.execution_limiter().burst());
        assert_eq!(a.restart_limiter().limit(), b.restart_limiter().limit());
        assert_eq!(a.restart_limiter().burst(), b.restart_limiter().burst());
        assert_eq!(a.error_reporter().is_some(), b.error_reporter().is_some());
        assert_eq!(format!("{:?}", a), format!("{:?}", b));
    }
}

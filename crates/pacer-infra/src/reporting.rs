//! Error reporting through the tracing pipeline
//!
//! For deployments without an external error tracker: failures are emitted as
//! structured events and picked up by whatever subscriber is installed.

use async_trait::async_trait;

use pacer_core::error::LogLevel;
use pacer_core::{ErrorReporter, WorkerContext, WorkerError};

#[derive(Debug, Clone, Copy, Default)]
pub struct TracingErrorReporter;

#[async_trait]
impl ErrorReporter for TracingErrorReporter {
    async fn report(&self, ctx: &WorkerContext, err: &WorkerError) -> anyhow::Result<()> {
        match err.log_level() {
            LogLevel::Warn => tracing::warn!(
                worker = %ctx.name(),
                error = %err,
                "Worker handler failed"
            ),
            LogLevel::Error => tracing::error!(
                worker = %ctx.name(),
                error = %err,
                panic = err.is_panic(),
                "Worker handler crashed"
            ),
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio_util::sync::CancellationToken;

    #[tokio::test]
    async fn reporting_never_fails() {
        let ctx = WorkerContext::new("indexer", CancellationToken::new());
        let reporter = TracingErrorReporter;

        let handler_err = WorkerError::Handler(anyhow::anyhow!("timeout"));
        assert!(reporter.report(&ctx, &handler_err).await.is_ok());

        let panic_err = WorkerError::Panicked("boom".to_string());
        assert!(reporter.report(&ctx, &panic_err).await.is_ok());
    }
}

//! Hooks for surfacing worker failures
//!
//! The worker does not know where failures should go (an alerting service, an
//! error tracker, a log line). Integrations implement [`ErrorReporter`] and hand
//! it to the worker configuration.

use async_trait::async_trait;

use crate::context::WorkerContext;
use crate::error::WorkerError;

/// Capability for reporting handler failures.
///
/// Reporting is best-effort: the run loop logs an `Err` returned from `report`
/// and carries on.
#[async_trait]
pub trait ErrorReporter: Send + Sync {
    async fn report(&self, ctx: &WorkerContext, err: &WorkerError) -> anyhow::Result<()>;
}

/// No-op implementation for when reporting is disabled
pub struct NoOpErrorReporter;

#[async_trait]
impl ErrorReporter for NoOpErrorReporter {
    async fn report(&self, _ctx: &WorkerContext, _err: &WorkerError) -> anyhow::Result<()> {
        Ok(())
    }
}

//! Worker run loop: rate-limited execution, failure reporting, and restarts.
//!
//! Each iteration first takes a token from the execution limiter, sleeping the
//! retry delay whenever it is denied. The handler then runs on its own task, so a
//! panic is contained and treated like an error. After a failure the error is
//! reported (best effort) and the loop waits for a restart token, sleeping the
//! retry delay on each denial, before trying again.
//!
//! Shutdown is cooperative: cancelling the token interrupts any sleep at once,
//! while an in-flight handler is awaited (it sees the same token in its context).

use anyhow::{Context, Result};
use std::any::Any;
use std::sync::Arc;
use tokio::task::JoinHandle;
use tokio::time::sleep;
use tokio_util::sync::CancellationToken;

use pacer_core::error::LogLevel;
use pacer_core::{WorkerContext, WorkerError};

use crate::config::WorkerConfig;

/// Counters collected over one run of a worker.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct WorkerStats {
    /// Handler invocations started.
    pub executions: u64,
    /// Invocations that returned an error or panicked.
    pub failures: u64,
    /// Restarts granted by the restart limiter.
    pub restarts: u64,
    /// Attempts denied by either limiter.
    pub throttled: u64,
}

pub struct Worker {
    config: WorkerConfig,
}

impl Worker {
    pub fn new(config: WorkerConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &WorkerConfig {
        &self.config
    }

    /// Run the worker on a background task.
    ///
    /// The worker observes a child of `token`: cancelling the parent stops it,
    /// [`WorkerHandle::shutdown`] stops only this worker.
    pub fn spawn(self, token: CancellationToken) -> WorkerHandle {
        let token = token.child_token();
        let worker_token = token.clone();
        let name = self.config.name.clone();

        let join = tokio::spawn(async move { self.run(worker_token).await });

        WorkerHandle { name, token, join }
    }

    /// Run until `token` is cancelled, returning what happened along the way.
    #[tracing::instrument(skip_all, fields(worker = %self.config.name))]
    pub async fn run(&self, token: CancellationToken) -> WorkerStats {
        let ctx = WorkerContext::new(self.config.name.as_str(), token.clone());
        let mut stats = WorkerStats::default();

        tracing::info!(
            retry_delay_ms = self.config.retry_delay.as_millis(),
            error_reporter = self.config.error_reporter.is_some(),
            "Worker started"
        );

        while !token.is_cancelled() {
            if !self.config.execution_limiter.try_acquire().await {
                stats.throttled += 1;
                tracing::trace!("Execution rate limit reached, sleeping");
                if !self.pause(&token).await {
                    break;
                }
                continue;
            }

            stats.executions += 1;
            match self.execute(&ctx).await {
                Ok(()) => {
                    tracing::debug!(executions = stats.executions, "Handler completed");
                }
                Err(err) => {
                    stats.failures += 1;
                    self.report(&ctx, &err).await;

                    if !self.wait_for_restart(&token, &mut stats).await {
                        break;
                    }
                    stats.restarts += 1;
                    tracing::info!(restarts = stats.restarts, "Restarting worker");
                }
            }
        }

        tracing::info!(
            executions = stats.executions,
            failures = stats.failures,
            restarts = stats.restarts,
            throttled = stats.throttled,
            "Worker stopped"
        );

        stats
    }

    async fn execute(&self, ctx: &WorkerContext) -> Result<(), WorkerError> {
        let handler = Arc::clone(&self.config.handler);
        let ctx = ctx.clone();

        match tokio::spawn(async move { handler.handle(ctx).await }).await {
            Ok(Ok(())) => Ok(()),
            Ok(Err(e)) => Err(WorkerError::Handler(e)),
            Err(join_err) if join_err.is_panic() => Err(WorkerError::Panicked(panic_message(
                join_err.into_panic(),
            ))),
            Err(join_err) => Err(WorkerError::Aborted(join_err.to_string())),
        }
    }

    async fn report(&self, ctx: &WorkerContext, err: &WorkerError) {
        match failure_log_level(err, self.config.error_reporter.is_some()) {
            Some(LogLevel::Warn) => tracing::warn!(error = %err, "Worker handler failed"),
            Some(LogLevel::Error) => tracing::error!(error = %err, "Worker handler crashed"),
            None => tracing::debug!(error = %err, "Passing failure to error reporter"),
        }

        if let Some(reporter) = &self.config.error_reporter {
            if let Err(e) = reporter.report(ctx, err).await {
                tracing::warn!(error = %e, "Error reporter failed, continuing");
            }
        }
    }

    /// Wait for a restart token. Returns false if cancelled first.
    async fn wait_for_restart(&self, token: &CancellationToken, stats: &mut WorkerStats) -> bool {
        loop {
            if token.is_cancelled() {
                return false;
            }
            if self.config.restart_limiter.try_acquire().await {
                return true;
            }
            stats.throttled += 1;
            tracing::debug!(
                retry_delay_ms = self.config.retry_delay.as_millis(),
                "Restart rate limit reached, sleeping"
            );
            if !self.pause(token).await {
                return false;
            }
        }
    }

    /// Sleep for the retry delay. Returns false if cancelled first.
    async fn pause(&self, token: &CancellationToken) -> bool {
        tokio::select! {
            _ = token.cancelled() => false,
            _ = sleep(self.config.retry_delay) => true,
        }
    }
}

/// Level the run loop logs a failure at; `None` when a reporter owns the event.
fn failure_log_level(err: &WorkerError, has_reporter: bool) -> Option<LogLevel> {
    if has_reporter {
        None
    } else {
        Some(err.log_level())
    }
}

fn panic_message(payload: Box<dyn Any + Send>) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic payload".to_string()
    }
}

/// Handle to a worker started with [`Worker::spawn`].
pub struct WorkerHandle {
    name: String,
    token: CancellationToken,
    join: JoinHandle<WorkerStats>,
}

impl WorkerHandle {
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Signals the worker to stop.
    ///
    /// Returns immediately; use [`WorkerHandle::join`] to wait for the loop to exit
    /// (which includes waiting for an in-flight handler to return).
    pub fn shutdown(&self) {
        tracing::info!(worker = %self.name, "Initiating worker shutdown");
        self.token.cancel();
    }

    pub fn is_finished(&self) -> bool {
        self.join.is_finished()
    }

    /// Wait for the worker to stop on its own or after [`WorkerHandle::shutdown`].
    pub async fn join(self) -> Result<WorkerStats> {
        self.join
            .await
            .with_context(|| format!("Worker '{}' task failed", self.name))
    }

    /// Shut down and wait for the worker to stop.
    pub async fn stop(self) -> Result<WorkerStats> {
        self.shutdown();
        self.join().await
    }
}

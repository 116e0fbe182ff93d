//! Handler trait
//!
//! The unit of recurring work a worker executes. Closures returning a future
//! implement it directly, so most workers never name the trait.

use anyhow::Result;
use async_trait::async_trait;
use std::future::Future;

use pacer_core::WorkerContext;

/// One execution of a worker's job.
///
/// Returning `Err` counts as a failure: it is reported and the worker goes
/// through its restart limiter before running again. Long-running handlers should
/// return once `ctx` is cancelled.
#[async_trait]
pub trait Handler: Send + Sync {
    async fn handle(&self, ctx: WorkerContext) -> Result<()>;
}

#[async_trait]
impl<F, Fut> Handler for F
where
    F: Fn(WorkerContext) -> Fut + Send + Sync,
    Fut: Future<Output = Result<()>> + Send + 'static,
{
    async fn handle(&self, ctx: WorkerContext) -> Result<()> {
        (self)(ctx).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;
    use tokio_util::sync::CancellationToken;

    struct CountingHandler {
        calls: AtomicUsize,
    }

    #[async_trait]
    impl Handler for CountingHandler {
        async fn handle(&self, _ctx: WorkerContext) -> Result<()> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(())
        }
    }

    #[tokio::test]
    async fn closure_is_a_handler() {
        let seen = Arc::new(AtomicUsize::new(0));
        let counter = seen.clone();
        let handler = move |ctx: WorkerContext| {
            let counter = counter.clone();
            async move {
                assert_eq!(ctx.name(), "closure");
                counter.fetch_add(1, Ordering::SeqCst);
                Ok::<_, anyhow::Error>(())
            }
        };

        let ctx = WorkerContext::new("closure", CancellationToken::new());
        handler.handle(ctx.clone()).await.unwrap();
        handler.handle(ctx).await.unwrap();
        assert_eq!(seen.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn struct_is_a_handler() {
        let handler: Arc<dyn Handler> = Arc::new(CountingHandler {
            calls: AtomicUsize::new(0),
        });
        let ctx = WorkerContext::new("struct", CancellationToken::new());
        handler.handle(ctx).await.unwrap();
    }

    #[tokio::test]
    async fn closure_errors_propagate() {
        let handler = |_ctx: WorkerContext| async {
            Err::<(), _>(anyhow::anyhow!("upstream unavailable"))
        };
        let ctx = WorkerContext::new("failing", CancellationToken::new());
        let err = handler.handle(ctx).await.unwrap_err();
        assert_eq!(err.to_string(), "upstream unavailable");
    }
}

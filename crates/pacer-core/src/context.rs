//! Execution context passed to worker handlers and error reporters.

use std::fmt;
use std::sync::Arc;

use tokio_util::sync::CancellationToken;

/// Cancellable execution context for one worker.
///
/// Cloning is cheap: the name is shared and the token is a handle to the same
/// cancellation state. Handlers should watch [`WorkerContext::cancelled`] (or poll
/// [`WorkerContext::is_cancelled`]) and return once the worker is shutting down.
#[derive(Clone)]
pub struct WorkerContext {
    name: Arc<str>,
    token: CancellationToken,
}

impl WorkerContext {
    pub fn new(name: impl Into<Arc<str>>, token: CancellationToken) -> Self {
        Self {
            name: name.into(),
            token,
        }
    }

    /// Name of the worker this context belongs to.
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn token(&self) -> &CancellationToken {
        &self.token
    }

    pub fn is_cancelled(&self) -> bool {
        self.token.is_cancelled()
    }

    /// Resolves once the worker has been asked to stop.
    pub async fn cancelled(&self) {
        self.token.cancelled().await
    }
}

impl fmt::Debug for WorkerContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("WorkerContext")
            .field("name", &self.name)
            .field("cancelled", &self.token.is_cancelled())
            .finish()
    }
}

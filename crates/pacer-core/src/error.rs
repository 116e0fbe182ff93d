//! Error types module
//!
//! `WorkerError` describes why a single handler execution failed. It is what the
//! run loop hands to an [`ErrorReporter`](crate::ErrorReporter) before deciding
//! whether to restart.

/// Log level for error reporting
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogLevel {
    /// Warning level - the worker will try to restart
    Warn,
    /// Error level - the handler crashed
    Error,
}

#[derive(Debug, thiserror::Error)]
pub enum WorkerError {
    /// The handler returned an error.
    #[error("Handler failed: {0:#}")]
    Handler(#[source] anyhow::Error),

    /// The handler panicked while running.
    #[error("Handler panicked: {0}")]
    Panicked(String),

    /// The handler task was aborted by the runtime before it finished.
    #[error("Handler aborted: {0}")]
    Aborted(String),
}

impl WorkerError {
    pub fn is_panic(&self) -> bool {
        matches!(self, WorkerError::Panicked(_))
    }

    pub fn log_level(&self) -> LogLevel {
        match self {
            WorkerError::Handler(_) => LogLevel::Warn,
            WorkerError::Panicked(_) | WorkerError::Aborted(_) => LogLevel::Error,
        }
    }
}

impl From<anyhow::Error> for WorkerError {
    fn from(err: anyhow::Error) -> Self {
        WorkerError::Handler(err)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::error::Error as _;

    #[test]
    fn handler_error_keeps_source_chain() {
        let err: WorkerError = anyhow::anyhow!("connection refused")
            .context("sync failed")
            .into();

        assert_eq!(err.to_string(), "Handler failed: sync failed: connection refused");
        assert!(err.source().is_some());
        assert_eq!(err.log_level(), LogLevel::Warn);
        assert!(!err.is_panic());
    }

    #[test]
    fn panic_is_logged_as_error() {
        let err = WorkerError::Panicked("index out of bounds".to_string());
        assert!(err.is_panic());
        assert_eq!(err.log_level(), LogLevel::Error);
        assert_eq!(err.to_string(), "Handler panicked: index out of bounds");
    }
}

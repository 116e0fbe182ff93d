//! Pacer Core Library
//!
//! This crate provides the types shared by every Pacer component: the execution
//! context handed to worker handlers, the error reporting hook, worker error types
//! and environment-driven settings.

pub mod config;
pub mod context;
pub mod error;
pub mod hooks;

// Re-export commonly used types
pub use config::{LogFormat, WorkerSettings};
pub use context::WorkerContext;
pub use error::WorkerError;
pub use hooks::{ErrorReporter, NoOpErrorReporter};

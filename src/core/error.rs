//! Error types for scheduler operations.

use thiserror::Error;

/// Errors produced while assembling or running a scheduler.
#[derive(Debug, Error)]
pub enum SchedulerError {
    /// Configuration failed validation.
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
    /// No async runtime was available to drive the scheduler.
    #[error("runtime unavailable: {0}")]
    Runtime(String),
}

/// Error observed by waiters on a start request.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StartError<F> {
    /// The start attempt failed; carries the classified failure.
    #[error("job start failed: {0}")]
    Failed(F),
    /// The scheduler shut down before the request settled.
    #[error("scheduler stopped")]
    Stopped,
    /// The start function or classifier panicked.
    #[error("internal error: {0}")]
    Internal(String),
}

impl<F> StartError<F> {
    /// Whether this rejection came from shutdown.
    pub const fn is_stopped(&self) -> bool {
        matches!(self, Self::Stopped)
    }
}

/// Application-facing result using anyhow for higher-level contexts.
pub type AppResult<T> = Result<T, anyhow::Error>;

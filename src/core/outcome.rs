//! Tagged outcome types returned by guards and request processors.
//!
//! Both types are plain enums so every consumer is forced by the compiler to
//! handle every case.

use std::fmt;

/// Result of attempting a critical section behind one or more guards.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SyncOutcome<T> {
    /// Every guard admitted the section and it ran to completion.
    Executed(T),
    /// A guard refused admission; the section never ran.
    Blocked(String),
}

impl<T> SyncOutcome<T> {
    /// Returns true if the critical section ran.
    pub const fn is_executed(&self) -> bool {
        matches!(self, Self::Executed(_))
    }

    /// Returns true if a guard refused admission.
    pub const fn is_blocked(&self) -> bool {
        matches!(self, Self::Blocked(_))
    }
}

/// Result of running a scheduled request through a processor.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProcessOutcome<T, E> {
    /// The work finished; waiters receive the value.
    Success(T),
    /// The work failed permanently; waiters receive the error.
    Failure(E),
    /// The work should be attempted again on a later pass.
    Retry(String),
}

impl<T, E> ProcessOutcome<T, E> {
    /// Returns true for the success and failure cases.
    pub const fn is_terminal(&self) -> bool {
        !matches!(self, Self::Retry(_))
    }

    /// Short lowercase label for logs.
    pub const fn label(&self) -> &'static str {
        match self {
            Self::Success(_) => "success",
            Self::Failure(_) => "failure",
            Self::Retry(_) => "retry",
        }
    }
}

impl<T> fmt::Display for SyncOutcome<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Executed(_) => write!(f, "executed"),
            Self::Blocked(reason) => write!(f, "blocked: {reason}"),
        }
    }
}

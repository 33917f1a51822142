//! Error types for Trellis core systems.

use std::fmt;

/// The main error type for Trellis core operations.
#[derive(Debug)]
pub enum TrellisError {
    /// Timer-related error.
    Timer(TimerError),
    /// Deferred-call queue error.
    Task(TaskError),
}

impl fmt::Display for TrellisError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Timer(err) => write!(f, "Timer error: {err}"),
            Self::Task(err) => write!(f, "Task error: {err}"),
        }
    }
}

impl std::error::Error for TrellisError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Timer(err) => Some(err),
            Self::Task(err) => Some(err),
        }
    }
}

/// Timer-specific errors.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TimerError {
    /// The timer ID is invalid or has already been removed.
    InvalidTimerId,
}

impl fmt::Display for TimerError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidTimerId => write!(f, "Invalid or expired timer ID"),
        }
    }
}

impl std::error::Error for TimerError {}

/// Deferred-call queue errors.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TaskError {
    /// The event loop that owned the queue has been dropped.
    LoopClosed,
}

impl fmt::Display for TaskError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::LoopClosed => write!(f, "The event loop owning this queue has shut down"),
        }
    }
}

impl std::error::Error for TaskError {}

impl From<TimerError> for TrellisError {
    fn from(err: TimerError) -> Self {
        Self::Timer(err)
    }
}

impl From<TaskError> for TrellisError {
    fn from(err: TaskError) -> Self {
        Self::Task(err)
    }
}

/// A specialized Result type for Trellis core operations.
pub type Result<T> = std::result::Result<T, TrellisError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display_and_source() {
        let err: TrellisError = TimerError::InvalidTimerId.into();
        assert_eq!(err.to_string(), "Timer error: Invalid or expired timer ID");
        assert!(std::error::Error::source(&err).is_some());

        let err: TrellisError = TaskError::LoopClosed.into();
        assert!(err.to_string().contains("shut down"));
    }
}

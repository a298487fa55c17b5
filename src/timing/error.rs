//! Errors raised by the timing core.

use thiserror::Error;

/// Local, recoverable misuse of the timing core.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum TimingError {
    /// An operation was attempted in a phase that does not allow it.
    #[error("cannot {operation} while timer is {phase}")]
    InvalidTransition {
        operation: &'static str,
        phase: &'static str,
    },
    /// A duration, delta or manual time entry was out of range or malformed.
    #[error("invalid input: {0}")]
    InvalidInput(String),
}

impl TimingError {
    pub fn invalid_input(message: impl Into<String>) -> Self {
        Self::InvalidInput(message.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_messages() {
        let err = TimingError::InvalidTransition {
            operation: "resume",
            phase: "idle",
        };
        assert_eq!(err.to_string(), "cannot resume while timer is idle");

        let err = TimingError::invalid_input("target must be positive");
        assert_eq!(err.to_string(), "invalid input: target must be positive");
    }
}

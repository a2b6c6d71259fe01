//! Logging error types

use std::fmt;
use std::io;

/// Result type for logging operations
pub type LogResult<T> = Result<T, LogError>;

/// Logging errors
#[derive(Debug)]
pub enum LogError {
    /// IO error
    Io(io::Error),

    /// Envelope serialization error
    Serialization(String),

    /// Rotation error
    Rotation(String),

    /// Output could not be opened or written
    Output(String),

    /// Sink is in the wrong state for the operation
    InvalidState {
        /// State the sink is in
        current: String,
        /// Operation that was attempted
        operation: &'static str,
    },

    /// Output handle already released
    Closed,
}

impl fmt::Display for LogError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Io(err) => write!(f, "IO error: {}", err),
            Self::Serialization(msg) => write!(f, "serialization error: {}", msg),
            Self::Rotation(msg) => write!(f, "rotation error: {}", msg),
            Self::Output(msg) => write!(f, "output error: {}", msg),
            Self::InvalidState { current, operation } => {
                write!(f, "cannot {} while sink is {}", operation, current)
            },
            Self::Closed => write!(f, "log output closed"),
        }
    }
}

impl std::error::Error for LogError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Io(err) => Some(err),
            _ => None,
        }
    }
}

impl From<io::Error> for LogError {
    fn from(err: io::Error) -> Self {
        Self::Io(err)
    }
}

impl From<serde_json::Error> for LogError {
    fn from(err: serde_json::Error) -> Self {
        Self::Serialization(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::error::Error;

    #[test]
    fn test_error_display() {
        let err = LogError::Rotation("copy failed".to_string());
        assert!(err.to_string().contains("rotation error"));
    }

    #[test]
    fn test_io_error_conversion() {
        let io_err = io::Error::new(io::ErrorKind::NotFound, "file not found");
        let log_err: LogError = io_err.into();
        assert!(matches!(log_err, LogError::Io(_)));
        assert!(log_err.source().is_some());
    }

    #[test]
    fn test_invalid_state_display() {
        let err = LogError::InvalidState {
            current: "Closed".to_string(),
            operation: "write",
        };
        assert_eq!(err.to_string(), "cannot write while sink is Closed");
    }

    #[test]
    fn test_closed_error() {
        assert_eq!(LogError::Closed.to_string(), "log output closed");
    }
}

//! Configuration error types.

use std::path::PathBuf;
use thiserror::Error;

/// Configuration-related errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Failed to read configuration file.
    #[error("failed to read configuration file '{path}': {source}")]
    ReadError {
        /// Path to the configuration file.
        path: PathBuf,
        /// Underlying IO error.
        #[source]
        source: std::io::Error,
    },

    /// Failed to write configuration file.
    #[error("failed to write configuration file '{path}': {source}")]
    WriteError {
        /// Path to the configuration file.
        path: PathBuf,
        /// Underlying IO error.
        #[source]
        source: std::io::Error,
    },

    /// Failed to parse the JSON document.
    #[error("failed to parse configuration: {0}")]
    Parse(#[from] serde_json::Error),

    /// Failed to serialize the JSON document.
    #[error("failed to serialize configuration: {0}")]
    Serialize(#[source] serde_json::Error),
}

/// Result type for configuration operations.
pub type ConfigResult<T> = Result<T, ConfigError>;

#[cfg(test)]
mod tests {
    use super::*;
    use std::error::Error;

    #[test]
    fn test_parse_error_from_serde() {
        let err: ConfigError = serde_json::from_str::<serde_json::Value>("{").unwrap_err().into();
        assert!(matches!(err, ConfigError::Parse(_)));
        assert!(err.to_string().starts_with("failed to parse configuration"));
    }

    #[test]
    fn test_io_errors_keep_source() {
        let err = ConfigError::WriteError {
            path: PathBuf::from("/tmp/config.json"),
            source: std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied"),
        };
        assert!(err.to_string().contains("/tmp/config.json"));
        assert!(err.source().is_some());
    }
}

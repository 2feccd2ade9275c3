//! CLI error types.

use thiserror::Error;
use tranche_core::TrancheError;

/// Errors surfaced by the `tranche` binary.
#[derive(Error, Debug)]
pub enum CliError {
    /// Referenced file does not exist
    #[error("File not found: {0}")]
    FileNotFound(String),

    /// Argument failed validation
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    /// Unknown log level
    #[error("Invalid log level: {0}. Must be one of: trace, debug, info, warn, error")]
    InvalidLogLevel(String),

    /// Unknown output format
    #[error("Invalid output format: {0}. Supported: table, json")]
    InvalidFormat(String),

    /// Engine rejected the request or configuration
    #[error("Engine error: {0}")]
    Engine(#[from] TrancheError),

    /// Reading the configuration file failed
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Rendering JSON output failed
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Result alias for CLI operations.
pub type Result<T> = std::result::Result<T, CliError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        assert_eq!(
            CliError::FileNotFound("tranche.toml".to_string()).to_string(),
            "File not found: tranche.toml"
        );
        assert!(CliError::InvalidFormat("xml".to_string())
            .to_string()
            .contains("table, json"));
    }

    #[test]
    fn test_engine_error_conversion() {
        let err: CliError = TrancheError::InvertedRange { min: 5, max: 1 }.into();
        assert!(matches!(err, CliError::Engine(_)));
        assert!(err.to_string().contains("min 5 > max 1"));
    }
}

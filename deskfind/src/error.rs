//! Error types for deskfind

use thiserror::Error;

/// deskfind error type
#[derive(Error, Debug)]
pub enum Error {
    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization error
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Index error
    #[error("Index error: {0}")]
    IndexError(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    ConfigError(String),

    /// Generic error
    #[error("{0}")]
    Other(String),
}

/// Result type alias for deskfind operations
pub type Result<T> = std::result::Result<T, Error>;

impl From<glob::PatternError> for Error {
    fn from(err: glob::PatternError) -> Self {
        Error::ConfigError(format!("Invalid glob pattern: {}", err))
    }
}

impl From<walkdir::Error> for Error {
    fn from(err: walkdir::Error) -> Self {
        Error::Io(err.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = Error::ConfigError("refresh_days must be positive".to_string());
        assert_eq!(
            err.to_string(),
            "Configuration error: refresh_days must be positive"
        );
    }

    #[test]
    fn test_glob_error_becomes_config_error() {
        let err: Error = glob::Pattern::new("[").unwrap_err().into();
        assert!(matches!(err, Error::ConfigError(_)));
        assert!(err.to_string().contains("Invalid glob pattern"));
    }
}

//! Error types for finops-anomaly.
//!
//! Detection and explanation never fail; these cover the surrounding
//! plumbing (configuration, series sources, the CLI).

use thiserror::Error;

/// Result type alias for crate operations
pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Error)]
pub enum Error {
    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Time series source failure
    #[error("Source error: {0}")]
    Source(String),

    /// Invalid input
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// LLM provider construction error
    #[error("LLM error: {0}")]
    Llm(#[from] crate::llm::LlmError),
}

impl From<config::ConfigError> for Error {
    fn from(err: config::ConfigError) -> Self {
        Error::Config(err.to_string())
    }
}

impl From<toml::ser::Error> for Error {
    fn from(err: toml::ser::Error) -> Self {
        Error::Config(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = Error::Source("view unavailable".to_string());
        assert_eq!(err.to_string(), "Source error: view unavailable");
    }

    #[test]
    fn test_llm_error_conversion() {
        let err: Error = crate::llm::LlmError::ConfigError("bad".to_string()).into();
        assert!(err.to_string().contains("bad"));
    }
}

//! Store error types.

use thiserror::Error;
use trm_core::CoreError;

/// Errors that can occur while loading or saving configuration.
#[derive(Debug, Error)]
pub enum StoreError {
    /// IO error.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization error.
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// YAML serialization error.
    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    /// Configuration error.
    #[error("Configuration error: {0}")]
    Config(String),

    /// A loaded rule table failed validation.
    #[error(transparent)]
    Core(#[from] CoreError),

    /// File extension not recognized as JSON or YAML.
    #[error("Unsupported file format: {0} (expected .json, .yaml, or .yml)")]
    UnsupportedFormat(String),
}

impl StoreError {
    /// Returns true if the file was simply absent.
    pub fn is_not_found(&self) -> bool {
        matches!(self, StoreError::Io(e) if e.kind() == std::io::ErrorKind::NotFound)
    }

    /// Returns true if the file exists but its contents are unusable.
    pub fn is_parse_error(&self) -> bool {
        matches!(
            self,
            StoreError::Serialization(_)
                | StoreError::Yaml(_)
                | StoreError::Core(CoreError::InvalidRules(_))
        )
    }
}

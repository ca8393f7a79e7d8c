//! Shared error types for the application

use std::path::PathBuf;
use thiserror::Error;

/// Main error type for exovet operations
#[derive(Debug, Error)]
pub enum Error {
    /// File system related errors
    #[error("File system error: {message}")]
    FileSystem {
        message: String,
        path: Option<PathBuf>,
        #[source]
        source: Option<std::io::Error>,
    },

    /// Prediction payload decoding errors
    #[error("Decode error: {0}")]
    Decode(String),

    /// Configuration errors
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// Job monitor errors
    #[error("Monitor error: {0}")]
    Monitor(String),

    /// Validation errors
    #[error("Validation error: {0}")]
    Validation(String),

    /// Generic errors with context
    #[error("{context}: {message}")]
    WithContext { context: String, message: String },

    /// Wrapped external errors
    #[error(transparent)]
    External(#[from] anyhow::Error),

    /// IO errors
    #[error(transparent)]
    Io(#[from] std::io::Error),

    /// JSON errors
    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

impl Error {
    /// Create a file system error with path context
    pub fn file_system(message: impl Into<String>, path: impl Into<PathBuf>) -> Self {
        Self::FileSystem {
            message: message.into(),
            path: Some(path.into()),
            source: None,
        }
    }

    /// Add context to an error
    pub fn with_context(self, context: impl Into<String>) -> Self {
        Self::WithContext {
            context: context.into(),
            message: self.to_string(),
        }
    }
}

/// Result type alias using our error type
pub type Result<T> = std::result::Result<T, Error>;

/// Extension trait for adding context to Results
pub trait ResultExt<T> {
    /// Add context to an error
    fn context(self, context: impl Into<String>) -> Result<T>;
}

impl<T> ResultExt<T> for Result<T> {
    fn context(self, context: impl Into<String>) -> Result<T> {
        self.map_err(|e| e.with_context(context))
    }
}

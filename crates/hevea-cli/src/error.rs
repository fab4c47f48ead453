//! Error types for hevea-cli

use std::path::PathBuf;
use std::process::ExitCode;
use thiserror::Error;

/// Result type alias for CLI operations
pub(crate) type Result<T> = std::result::Result<T, CliError>;

/// CLI error types
#[derive(Error, Debug)]
pub(crate) enum CliError {
    /// File not found
    #[error("File not found: {0}")]
    FileNotFound(PathBuf),

    /// Measurement outside its valid range
    #[error("Validation failed: {0}")]
    ValidationFailed(String),

    /// Configuration could not be loaded
    #[error("Configuration error: {0}")]
    Config(String),

    /// Output serialization failed
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Engine error
    #[error("Hevea error: {0}")]
    Hevea(String),
}

impl CliError {
    /// Get exit code for this error
    pub(crate) fn exit_code(&self) -> ExitCode {
        match self {
            Self::FileNotFound(_) => ExitCode::from(3),
            Self::ValidationFailed(_) => ExitCode::from(4),
            Self::Config(_) => ExitCode::from(5),
            Self::Json(_) => ExitCode::from(6),
            Self::Hevea(_) => ExitCode::from(1),
        }
    }
}

impl From<hevea::HeveaError> for CliError {
    fn from(e: hevea::HeveaError) -> Self {
        match e {
            hevea::HeveaError::Validation { message } => Self::ValidationFailed(message),
            hevea::HeveaError::Config { message } => Self::Config(message),
            hevea::HeveaError::Io { .. } => Self::Config(e.to_string()),
            other => Self::Hevea(other.to_string()),
        }
    }
}

//! Error types for hevea operations.
//!
//! Structural failures (ragged or empty training data, arity mismatches at
//! inference, bad hyperparameters) are surfaced as typed errors. Numerical
//! degeneracies such as zero-variance features or nodes that cannot be split
//! further are absorbed by the engines and never reach this type.

use std::path::PathBuf;
use thiserror::Error;

/// Main error type for hevea operations.
///
/// # Examples
///
/// ```
/// use hevea::error::HeveaError;
///
/// let err = HeveaError::DimensionMismatch {
///     context: "query".to_string(),
///     expected: 5,
///     actual: 4,
/// };
/// assert!(err.to_string().contains("dimension mismatch"));
/// ```
#[derive(Debug, Error)]
pub enum HeveaError {
    /// A feature vector does not have the arity the operation expects.
    #[error("dimension mismatch in {context}: expected {expected} features, got {actual}")]
    DimensionMismatch {
        /// Where the mismatch was detected
        context: String,
        /// Expected number of features
        expected: usize,
        /// Actual number of features
        actual: usize,
    },

    /// A model cannot be fitted on zero samples.
    #[error("cannot fit {model} on an empty training set")]
    EmptyTrainingSet {
        /// Model being fitted
        model: &'static str,
    },

    /// Feature rows and labels disagree in count.
    #[error("length mismatch: {features} feature rows but {labels} labels")]
    LengthMismatch {
        /// Number of feature rows
        features: usize,
        /// Number of labels
        labels: usize,
    },

    /// Invalid hyperparameter value provided.
    #[error("invalid hyperparameter: {param} = {value}, expected {constraint}")]
    InvalidHyperparameter {
        /// Parameter name
        param: String,
        /// Provided value
        value: String,
        /// Constraint description
        constraint: String,
    },

    /// Caller-side input contract violated (missing or out-of-range feature).
    #[error("validation failed: {message}")]
    Validation {
        /// Validation failure message
        message: String,
    },

    /// Configuration could not be parsed or is inconsistent.
    #[error("invalid configuration: {message}")]
    Config {
        /// Error description
        message: String,
    },

    /// Configuration file could not be read.
    #[error("failed to read {path}: {source}")]
    Io {
        /// File being read
        path: PathBuf,
        /// Underlying I/O error
        source: std::io::Error,
    },

    /// The training corpus collaborator failed to supply data.
    #[error("corpus source failed: {0}")]
    CorpusUnavailable(String),
}

impl HeveaError {
    /// Create a dimension mismatch error with descriptive context
    #[must_use]
    pub fn dimension_mismatch(context: &str, expected: usize, actual: usize) -> Self {
        Self::DimensionMismatch {
            context: context.to_string(),
            expected,
            actual,
        }
    }

    /// Create an invalid hyperparameter error
    #[must_use]
    pub fn invalid_hyperparameter(
        param: &str,
        value: impl ToString,
        constraint: &str,
    ) -> Self {
        Self::InvalidHyperparameter {
            param: param.to_string(),
            value: value.to_string(),
            constraint: constraint.to_string(),
        }
    }

    /// Create a validation error
    #[must_use]
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation {
            message: message.into(),
        }
    }

    /// Returns true for failures caused by malformed training or query data.
    #[must_use]
    pub fn is_structural(&self) -> bool {
        matches!(
            self,
            Self::DimensionMismatch { .. } | Self::EmptyTrainingSet { .. } | Self::LengthMismatch { .. }
        )
    }
}

/// Convenience type alias for Results.
pub type Result<T> = std::result::Result<T, HeveaError>;

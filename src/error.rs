//! Error types for sorting-hat operations.
//!
//! Every failure in the library is reported through [`HatError`]; nothing is
//! retried internally.

use thiserror::Error;

/// Main error type for sorting-hat operations.
///
/// # Examples
///
/// ```
/// use sorting_hat::error::HatError;
///
/// let err = HatError::DimensionMismatch {
///     expected: "features=12".to_string(),
///     actual: "11".to_string(),
/// };
/// assert!(err.to_string().contains("dimension mismatch"));
/// ```
#[derive(Debug, Error)]
pub enum HatError {
    /// Input data is unusable for the requested operation
    /// (zero samples, mismatched lengths, unknown labels, ...).
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Matrix/vector dimensions don't match for the operation.
    #[error("Matrix dimension mismatch: expected {expected}, got {actual}")]
    DimensionMismatch {
        /// Expected dimensions description
        expected: String,
        /// Actual dimensions found
        actual: String,
    },

    /// Invalid hyperparameter value provided.
    #[error("Invalid hyperparameter: {param} = {value}, expected {constraint}")]
    InvalidHyperparameter {
        /// Parameter name
        param: String,
        /// Provided value
        value: String,
        /// Constraint description
        constraint: String,
    },

    /// A fitted component (scaler, imputer, classifier) was used before fit.
    #[error("{what} is not fitted; fit it on training data first")]
    NotFitted {
        /// Component name
        what: String,
    },

    /// Training was stopped at an epoch boundary.
    #[error("Training interrupted after {completed_epochs} completed epochs")]
    Interrupted {
        /// Number of epochs that ran to completion
        completed_epochs: usize,
    },

    /// Invalid or corrupt model file.
    #[error("Invalid model format: {message}")]
    Format {
        /// Error description
        message: String,
    },

    /// Model file written by an incompatible format version.
    #[error(
        "Unsupported model format version: found {}.{}, supported {}.{}",
        found.0, found.1, supported.0, supported.1
    )]
    UnsupportedVersion {
        /// Version found in the file
        found: (u8, u8),
        /// Version this build reads
        supported: (u8, u8),
    },

    /// Serialization/deserialization error.
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// Configuration could not be parsed or failed validation.
    #[error("Configuration error: {0}")]
    Config(String),

    /// I/O error (file not found, permission denied, etc.).
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Malformed CSV input.
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),
}

impl From<bincode::Error> for HatError {
    fn from(err: bincode::Error) -> Self {
        HatError::Serialization(err.to_string())
    }
}

impl From<toml::de::Error> for HatError {
    fn from(err: toml::de::Error) -> Self {
        HatError::Config(err.to_string())
    }
}

impl HatError {
    /// Create a dimension mismatch error with descriptive context
    #[must_use]
    pub fn dimension_mismatch(context: &str, expected: usize, actual: usize) -> Self {
        Self::DimensionMismatch {
            expected: format!("{context}={expected}"),
            actual: format!("{actual}"),
        }
    }

    /// Create an empty input error
    #[must_use]
    pub fn empty_input(context: &str) -> Self {
        Self::InvalidInput(format!("empty input: {context}"))
    }

    /// Create an uninitialized-state error for `what`
    #[must_use]
    pub fn not_fitted(what: &str) -> Self {
        Self::NotFitted {
            what: what.to_string(),
        }
    }

    /// Create a model-format error
    #[must_use]
    pub fn format(message: impl Into<String>) -> Self {
        Self::Format {
            message: message.into(),
        }
    }

    /// True for failures that belong to the persistence category.
    #[must_use]
    pub fn is_persistence_failure(&self) -> bool {
        matches!(
            self,
            Self::Format { .. } | Self::UnsupportedVersion { .. } | Self::Serialization(_) | Self::Io(_)
        )
    }
}

/// Convenience type alias for Results.
pub type Result<T> = std::result::Result<T, HatError>;

//! Error types for the sorting-hat CLI.

use std::path::PathBuf;
use std::process::ExitCode;

use sorting_hat::HatError;
use thiserror::Error;

/// Result type alias for CLI operations
pub(crate) type Result<T> = std::result::Result<T, CliError>;

/// CLI error types
#[derive(Error, Debug)]
pub(crate) enum CliError {
    /// Input file missing
    #[error("File not found: {0}")]
    FileNotFound(PathBuf),

    /// Library error
    #[error(transparent)]
    Hat(#[from] HatError),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Writing the prediction table failed
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// Rendering JSON output failed
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl CliError {
    /// Numeric process status for this error
    pub(crate) fn status(&self) -> u8 {
        match self {
            Self::FileNotFound(_) => 3,
            Self::Hat(e) if e.is_persistence_failure() => 4,
            Self::Hat(HatError::Config(_) | HatError::InvalidHyperparameter { .. }) => 5,
            Self::Hat(HatError::NotFitted { .. }) => 6,
            Self::Hat(HatError::Interrupted { .. }) => 130,
            Self::Hat(_) => 1,
            Self::Io(_) => 7,
            Self::Csv(_) | Self::Json(_) => 8,
        }
    }

    /// Get exit code for this error
    pub(crate) fn exit_code(&self) -> ExitCode {
        ExitCode::from(self.status())
    }
}

//! Training configuration.
//!
//! Every default that would otherwise be a literal at a call site (feature
//! columns, label column, file paths, batch size) is a named field here.
//! A TOML file may set any subset of fields:
//!
//! ```toml
//! learning_rate = 0.1
//! epochs = 500
//! descent = "mini_batch"
//! batch_size = 32
//! holdout = 0.2
//! ```

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::classification::{GradientDescent, DEFAULT_BATCH_SIZE, DEFAULT_LEARNING_RATE};
use crate::error::{HatError, Result};

/// Default class label column.
pub const DEFAULT_LABEL_COLUMN: &str = "Hogwarts House";

/// Default feature columns, in projection order.
pub const DEFAULT_FEATURES: [&str; 12] = [
    "Arithmancy",
    "Astronomy",
    "Herbology",
    "Divination",
    "Muggle Studies",
    "Ancient Runes",
    "History of Magic",
    "Transfiguration",
    "Potions",
    "Care of Magical Creatures",
    "Charms",
    "Flying",
];

/// Default number of epochs per binary classifier.
pub const DEFAULT_EPOCHS: usize = 100;

/// Default seed for weight initialisation and shuffling.
pub const DEFAULT_SEED: u64 = 42;

/// Default path of the persisted model.
pub const DEFAULT_MODEL_PATH: &str = "model.bin";

/// Default path of the prediction table.
pub const DEFAULT_PREDICTIONS_PATH: &str = "houses.csv";

/// Gradient-descent variant as named in configuration files.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DescentMode {
    /// Full dataset per step.
    #[default]
    Batch,
    /// One sample per step.
    Stochastic,
    /// `batch_size` samples per step.
    MiniBatch,
}

impl From<GradientDescent> for DescentMode {
    fn from(descent: GradientDescent) -> Self {
        match descent {
            GradientDescent::Batch => Self::Batch,
            GradientDescent::Stochastic => Self::Stochastic,
            GradientDescent::MiniBatch { .. } => Self::MiniBatch,
        }
    }
}

/// Hyperparameters and paths for a training run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct TrainingConfig {
    /// Feature columns, in the order the model consumes them.
    pub features: Vec<String>,
    /// Class label column.
    pub label_column: String,
    /// Gradient step size.
    pub learning_rate: f64,
    /// Epochs per binary classifier.
    pub epochs: usize,
    /// Seed for weight initialisation and shuffling; `None` uses OS entropy.
    pub seed: Option<u64>,
    /// Gradient-descent variant.
    pub descent: DescentMode,
    /// Samples per mini-batch step.
    pub batch_size: usize,
    /// L1 strength `C`.
    pub regularization: Option<f64>,
    /// Train the per-house classifiers on worker threads.
    pub parallel: bool,
    /// Fraction of rows held out for evaluation during `train`.
    pub holdout: Option<f64>,
    /// Seed for the holdout split.
    pub split_seed: Option<u64>,
    /// Where the trained model is written.
    pub model_path: PathBuf,
    /// Where predictions are written.
    pub predictions_path: PathBuf,
}

impl Default for TrainingConfig {
    fn default() -> Self {
        Self {
            features: DEFAULT_FEATURES.iter().map(ToString::to_string).collect(),
            label_column: DEFAULT_LABEL_COLUMN.to_string(),
            learning_rate: DEFAULT_LEARNING_RATE,
            epochs: DEFAULT_EPOCHS,
            seed: Some(DEFAULT_SEED),
            descent: DescentMode::Batch,
            batch_size: DEFAULT_BATCH_SIZE,
            regularization: None,
            parallel: true,
            holdout: None,
            split_seed: None,
            model_path: PathBuf::from(DEFAULT_MODEL_PATH),
            predictions_path: PathBuf::from(DEFAULT_PREDICTIONS_PATH),
        }
    }
}

impl TrainingConfig {
    /// Reads and validates a TOML configuration file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read, does not parse, or fails
    /// [`TrainingConfig::validate`].
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path)?;
        let config = Self::from_toml_str(&text)?;
        tracing::debug!(path = %path.display(), "configuration loaded");
        Ok(config)
    }

    /// Parses and validates a TOML configuration.
    ///
    /// # Errors
    ///
    /// Returns [`HatError::Config`] on parse or validation failure.
    pub fn from_toml_str(text: &str) -> Result<Self> {
        let config: Self = toml::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    /// Checks value ranges.
    ///
    /// # Errors
    ///
    /// Returns [`HatError::Config`] naming the first offending field.
    pub fn validate(&self) -> Result<()> {
        if self.features.is_empty() {
            return Err(HatError::Config("features must not be empty".into()));
        }
        if let Some(dup) = self
            .features
            .iter()
            .enumerate()
            .find(|(i, f)| self.features[..*i].contains(f))
            .map(|(_, f)| f)
        {
            return Err(HatError::Config(format!("feature '{dup}' is listed twice")));
        }
        if self.label_column.is_empty() {
            return Err(HatError::Config("label_column must not be empty".into()));
        }
        if self.features.contains(&self.label_column) {
            return Err(HatError::Config(format!(
                "label column '{}' is also a feature",
                self.label_column
            )));
        }
        if !(self.learning_rate.is_finite() && self.learning_rate > 0.0) {
            return Err(HatError::Config(format!(
                "learning_rate must be finite and > 0, got {}",
                self.learning_rate
            )));
        }
        if self.epochs < 1 {
            return Err(HatError::Config("epochs must be at least 1".into()));
        }
        if self.batch_size < 1 {
            return Err(HatError::Config("batch_size must be at least 1".into()));
        }
        if let Some(c) = self.regularization {
            if !(c.is_finite() && c > 0.0) {
                return Err(HatError::Config(format!(
                    "regularization must be finite and > 0, got {c}"
                )));
            }
        }
        if let Some(holdout) = self.holdout {
            if !(holdout > 0.0 && holdout < 1.0) {
                return Err(HatError::Config(format!(
                    "holdout must be in (0, 1), got {holdout}"
                )));
            }
        }
        Ok(())
    }

    /// The descent variant with its batch size.
    #[must_use]
    pub fn gradient_descent(&self) -> GradientDescent {
        match self.descent {
            DescentMode::Batch => GradientDescent::Batch,
            DescentMode::Stochastic => GradientDescent::Stochastic,
            DescentMode::MiniBatch => GradientDescent::MiniBatch {
                batch_size: self.batch_size,
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = TrainingConfig::default();
        assert_eq!(config.features.len(), 12);
        assert_eq!(config.features[0], "Arithmancy");
        assert_eq!(config.features[11], "Flying");
        assert_eq!(config.label_column, "Hogwarts House");
        assert_eq!(config.batch_size, 16);
        assert_eq!(config.seed, Some(42));
        assert_eq!(config.model_path, PathBuf::from("model.bin"));
        assert_eq!(config.gradient_descent(), GradientDescent::Batch);
        config.validate().expect("defaults are valid");
    }

    #[test]
    fn test_partial_toml_keeps_defaults() {
        let config = TrainingConfig::from_toml_str(
            r#"
            learning_rate = 0.5
            descent = "mini_batch"
            batch_size = 8
            "#,
        )
        .expect("valid toml");

        assert_eq!(config.learning_rate, 0.5);
        assert_eq!(config.gradient_descent(), GradientDescent::MiniBatch { batch_size: 8 });
        assert_eq!(config.epochs, DEFAULT_EPOCHS);
        assert_eq!(config.label_column, DEFAULT_LABEL_COLUMN);
    }

    #[test]
    fn test_unknown_field_rejected() {
        let err = TrainingConfig::from_toml_str("learnin_rate = 0.5").expect_err("typo");
        assert!(matches!(err, HatError::Config(_)));
    }

    #[test]
    fn test_validation_errors() {
        for text in [
            "learning_rate = 0.0",
            "epochs = 0",
            "batch_size = 0",
            "regularization = -1.0",
            "holdout = 1.0",
            "features = []",
            "features = [\"Flying\", \"Flying\"]",
            "label_column = \"Flying\"",
        ] {
            assert!(
                TrainingConfig::from_toml_str(text).is_err(),
                "{text} should be rejected"
            );
        }
    }

    #[test]
    fn test_load_from_file() {
        let dir = tempfile::tempdir().expect("temp dir");
        let path = dir.path().join("train.toml");
        std::fs::write(&path, "epochs = 7\nparallel = false\n").expect("write");

        let config = TrainingConfig::load(&path).expect("load");
        assert_eq!(config.epochs, 7);
        assert!(!config.parallel);
    }
}

//! One-vs-all multiclass model over the four houses.

use std::collections::BTreeMap;
use std::path::Path;
use std::sync::atomic::AtomicBool;
use std::sync::Arc;

use rayon::prelude::*;

use super::house::{House, N_HOUSES};
use super::logistic::{GradientDescent, LogisticRegression};
use crate::config::{TrainingConfig, DEFAULT_LABEL_COLUMN};
use crate::data::DataFrame;
use crate::error::{HatError, Result};
use crate::preprocessing::{MeanImputer, MinMaxScaler};
use crate::primitives::Matrix;
use crate::serialization::{self, ModelBundle};
use crate::traits::Transformer;

/// Multiclass classifier built from one binary [`LogisticRegression`] per
/// house.
///
/// The model owns the whole pipeline: it projects a table onto its feature
/// columns, fills missing cells with training means, min-max scales, and
/// asks each house's classifier for a probability. The most probable house
/// wins; ties go to the house declared first in [`House::ALL`].
///
/// # Example
///
/// ```
/// use sorting_hat::prelude::*;
///
/// let csv = "Index,Hogwarts House,Astronomy\n\
///            0,Slytherin,-5\n1,Gryffindor,5\n2,Ravenclaw,0\n3,Hufflepuff,\n";
/// let table = DataFrame::from_reader(csv.as_bytes()).expect("valid CSV");
///
/// let mut model = OneVsAllModel::new(vec!["Astronomy".to_string()], "Hogwarts House");
/// let (x, labels) = model.preprocess(&table, true).expect("training data");
/// let y = require_labels(&labels).expect("every row is labelled");
/// model.train(&x, &y, 10, Some(1)).expect("training succeeds");
///
/// let predicted = model.predict(&x).expect("fitted");
/// assert_eq!(predicted.len(), 4);
/// ```
#[derive(Debug, Clone)]
pub struct OneVsAllModel {
    features: Vec<String>,
    label_column: String,
    imputer: MeanImputer,
    scaler: MinMaxScaler,
    /// Indexed by [`House::index`].
    classifiers: [LogisticRegression; N_HOUSES],
    parallel: bool,
}

impl OneVsAllModel {
    /// Creates an untrained model over `features`, reading labels from
    /// `label_column`.
    #[must_use]
    pub fn new(features: Vec<String>, label_column: impl Into<String>) -> Self {
        Self {
            features,
            label_column: label_column.into(),
            imputer: MeanImputer::new(),
            scaler: MinMaxScaler::new(),
            classifiers: std::array::from_fn(|_| LogisticRegression::new()),
            parallel: true,
        }
    }

    /// Creates an untrained model with the columns and hyperparameters of
    /// `config`.
    #[must_use]
    pub fn from_config(config: &TrainingConfig) -> Self {
        Self::new(config.features.clone(), config.label_column.clone())
            .with_learning_rate(config.learning_rate)
            .with_descent(config.gradient_descent())
            .with_regularization(config.regularization)
            .with_parallel(config.parallel)
    }

    fn map_classifiers(
        mut self,
        f: impl Fn(LogisticRegression) -> LogisticRegression,
    ) -> Self {
        self.classifiers = self.classifiers.map(f);
        self
    }

    /// Sets the learning rate of every classifier.
    #[must_use]
    pub fn with_learning_rate(self, learning_rate: f64) -> Self {
        self.map_classifiers(|c| c.with_learning_rate(learning_rate))
    }

    /// Sets the descent variant of every classifier.
    #[must_use]
    pub fn with_descent(self, descent: GradientDescent) -> Self {
        self.map_classifiers(|c| c.with_descent(descent))
    }

    /// Sets the L1 strength of every classifier.
    #[must_use]
    pub fn with_regularization(self, c: Option<f64>) -> Self {
        self.map_classifiers(|clf| clf.with_regularization(c))
    }

    /// Shares one stop flag among all classifiers.
    #[must_use]
    pub fn with_stop_flag(self, stop: Arc<AtomicBool>) -> Self {
        self.map_classifiers(|c| c.with_stop_flag(Arc::clone(&stop)))
    }

    /// Trains the four classifiers concurrently (`true`) or one after the
    /// other (`false`).
    #[must_use]
    pub fn with_parallel(mut self, parallel: bool) -> Self {
        self.parallel = parallel;
        self
    }

    /// Reads labels from a different column.
    #[must_use]
    pub fn with_label_column(mut self, label_column: impl Into<String>) -> Self {
        self.label_column = label_column.into();
        self
    }

    /// Feature columns, in the order the model consumes them.
    #[must_use]
    pub fn features(&self) -> &[String] {
        &self.features
    }

    /// Class label column.
    #[must_use]
    pub fn label_column(&self) -> &str {
        &self.label_column
    }

    /// The binary classifier answering "is it `house`?".
    #[must_use]
    pub fn classifier(&self, house: House) -> &LogisticRegression {
        &self.classifiers[house.index()]
    }

    /// Fitted imputer.
    #[must_use]
    pub fn imputer(&self) -> &MeanImputer {
        &self.imputer
    }

    /// Fitted scaler.
    #[must_use]
    pub fn scaler(&self) -> &MinMaxScaler {
        &self.scaler
    }

    /// True when the preprocessing state and all four classifiers are fitted.
    #[must_use]
    pub fn is_fitted(&self) -> bool {
        self.imputer.is_fitted()
            && self.scaler.is_fitted()
            && self.classifiers.iter().all(LogisticRegression::is_fitted)
    }

    /// Turns a table into a model-ready feature matrix and its labels.
    ///
    /// With `is_train` the imputation means are computed from this table,
    /// then the scaler is fit on the imputed data; otherwise the stored
    /// means and scaler are applied. Rows are never dropped.
    ///
    /// Labels are required for training. Otherwise the label column may be
    /// absent or have empty cells, which come back as `None`.
    ///
    /// # Errors
    ///
    /// Returns an error if a feature column is missing or non-numeric, a
    /// label is unknown, a training label is missing, or, when not training,
    /// the means and scaler have not been fit.
    pub fn preprocess(
        &mut self,
        table: &DataFrame,
        is_train: bool,
    ) -> Result<(Matrix<f64>, Vec<Option<House>>)> {
        let raw = table.select_numeric(self.features.as_slice())?;
        let labels = self.read_labels(table, is_train)?;

        let x = if is_train {
            let mut imputer = MeanImputer::new();
            let filled = imputer.fit_transform(&raw)?;
            let mut scaler = MinMaxScaler::new();
            let scaled = scaler.fit_transform(&filled)?;
            self.imputer = imputer;
            self.scaler = scaler;
            scaled
        } else {
            let filled = self.imputer.transform(&raw)?;
            self.scaler.transform(&filled)?
        };

        tracing::debug!(rows = x.n_rows(), is_train, "table preprocessed");
        Ok((x, labels))
    }

    fn read_labels(&self, table: &DataFrame, required: bool) -> Result<Vec<Option<House>>> {
        if !table.has_column(&self.label_column) {
            if required {
                return Err(HatError::InvalidInput(format!(
                    "label column '{}' not found",
                    self.label_column
                )));
            }
            return Ok(vec![None; table.n_rows()]);
        }

        let labels = table
            .text_column(&self.label_column)?
            .into_iter()
            .map(|cell| cell.map(str::parse::<House>).transpose())
            .collect::<Result<Vec<_>>>()?;
        if required {
            require_labels(&labels)?;
        }
        Ok(labels)
    }

    /// Trains one classifier per house on the binarized labels.
    ///
    /// Every classifier sees the same `x`, `epochs` and `seed`. All inputs
    /// and hyperparameters are checked before any classifier is touched.
    /// If any house fails, all four classifiers are restored to their state
    /// before the call.
    ///
    /// # Errors
    ///
    /// Returns an error if lengths differ, there are no samples, `epochs` is
    /// 0, the column count is not the feature count, a hyperparameter is
    /// invalid, a classifier fails, or training is interrupted.
    pub fn train(
        &mut self,
        x: &Matrix<f64>,
        y: &[House],
        epochs: usize,
        seed: Option<u64>,
    ) -> Result<()> {
        if x.n_rows() != y.len() {
            return Err(HatError::InvalidInput(format!(
                "Number of samples in X and y must match: {} != {}",
                x.n_rows(),
                y.len()
            )));
        }
        if y.is_empty() {
            return Err(HatError::empty_input("zero samples"));
        }
        if epochs < 1 {
            return Err(HatError::InvalidInput("epochs must be at least 1".into()));
        }
        if x.n_cols() != self.features.len() {
            return Err(HatError::dimension_mismatch(
                "model features",
                self.features.len(),
                x.n_cols(),
            ));
        }
        for classifier in &self.classifiers {
            classifier.validate_hyperparameters()?;
        }

        let train_one = |(index, classifier): (usize, &mut LogisticRegression)| -> Result<()> {
            let house = House::ALL[index];
            let span = tracing::info_span!("one_vs_all", house = %house);
            let _guard = span.enter();

            let binary: Vec<usize> = y.iter().map(|&label| usize::from(label == house)).collect();
            let positives = binary.iter().sum::<usize>();
            tracing::info!(epochs, positives, "training classifier");
            classifier.train(x, &binary, epochs, seed)?;
            tracing::info!("classifier trained");
            Ok(())
        };

        let snapshot = self.classifiers.clone();
        let outcome = if self.parallel {
            self.classifiers
                .par_iter_mut()
                .enumerate()
                .try_for_each(train_one)
        } else {
            self.classifiers.iter_mut().enumerate().try_for_each(train_one)
        };

        if let Err(e) = &outcome {
            tracing::warn!(error = %e, "one-vs-all training failed; classifiers restored");
            self.classifiers = snapshot;
        }
        outcome
    }

    fn check_fitted(&self) -> Result<()> {
        if self.classifiers.iter().all(LogisticRegression::is_fitted) {
            Ok(())
        } else {
            Err(HatError::not_fitted("OneVsAllModel"))
        }
    }

    /// Probability of each house for each sample: an `n × 4` matrix with
    /// columns in [`House::ALL`] order.
    ///
    /// # Errors
    ///
    /// Returns an error if the model is not trained or dimensions mismatch.
    pub fn predict_proba(&self, x: &Matrix<f64>) -> Result<Matrix<f64>> {
        self.check_fitted()?;
        let columns = self
            .classifiers
            .iter()
            .map(|c| c.predict_proba(x))
            .collect::<Result<Vec<_>>>()?;

        let mut proba = Matrix::zeros(x.n_rows(), N_HOUSES);
        for (j, column) in columns.iter().enumerate() {
            for (i, &p) in column.iter().enumerate() {
                proba.set(i, j, p);
            }
        }
        Ok(proba)
    }

    /// Most probable house for each sample.
    ///
    /// # Errors
    ///
    /// Returns an error if the model is not trained or dimensions mismatch.
    pub fn predict(&self, x: &Matrix<f64>) -> Result<Vec<House>> {
        let proba = self.predict_proba(x)?;
        Ok(proba.rows().map(argmax_house).collect())
    }

    /// Fraction of samples whose predicted house equals the label.
    ///
    /// # Errors
    ///
    /// Returns an error if the model is not trained, dimensions mismatch,
    /// or there are no samples.
    pub fn score(&self, x: &Matrix<f64>, y: &[House]) -> Result<f64> {
        if x.n_rows() != y.len() {
            return Err(HatError::InvalidInput(format!(
                "Number of samples in X and y must match: {} != {}",
                x.n_rows(),
                y.len()
            )));
        }
        if y.is_empty() {
            return Err(HatError::empty_input("zero samples"));
        }
        let predicted = self.predict(x)?;
        let correct = predicted.iter().zip(y).filter(|(p, t)| p == t).count();
        Ok(correct as f64 / y.len() as f64)
    }

    /// Captures the fitted state for persistence.
    ///
    /// # Errors
    ///
    /// Returns [`HatError::NotFitted`] unless preprocessing and all four
    /// classifiers are fitted.
    pub fn to_bundle(&self) -> Result<ModelBundle> {
        let scaler = self
            .scaler
            .state()
            .cloned()
            .ok_or_else(|| HatError::not_fitted("MinMaxScaler"))?;
        let imputation_means = self
            .imputer
            .means()
            .cloned()
            .ok_or_else(|| HatError::not_fitted("MeanImputer"))?;

        let mut weights = BTreeMap::new();
        for house in House::ALL {
            let weight = self.classifiers[house.index()]
                .dump()
                .ok_or_else(|| HatError::not_fitted("OneVsAllModel"))?;
            weights.insert(house, weight.to_vec());
        }

        Ok(ModelBundle {
            features: self.features.clone(),
            scaler,
            weights,
            imputation_means,
        })
    }

    /// Rebuilds a model from a bundle, using the default label column and
    /// default hyperparameters.
    ///
    /// # Errors
    ///
    /// Returns an error if the bundle is inconsistent.
    pub fn from_bundle(bundle: ModelBundle) -> Result<Self> {
        bundle.validate()?;
        let ModelBundle {
            features,
            scaler,
            mut weights,
            imputation_means,
        } = bundle;

        let mut model = Self::new(features, DEFAULT_LABEL_COLUMN);
        model.scaler = MinMaxScaler::from_state(scaler)?;
        model.imputer = MeanImputer::from_means(imputation_means);
        for house in House::ALL {
            let weight = weights
                .remove(&house)
                .ok_or_else(|| HatError::format(format!("missing weights for {house}")))?;
            model.classifiers[house.index()].load(weight)?;
        }
        Ok(model)
    }

    /// Saves the fitted model to `path` atomically.
    ///
    /// # Errors
    ///
    /// Returns an error if the model is not fitted or writing fails.
    pub fn dump<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        serialization::save_bundle(path, &self.to_bundle()?)
    }

    /// Loads a model saved with [`OneVsAllModel::dump`]. Nothing is built
    /// unless the whole file is valid.
    ///
    /// # Errors
    ///
    /// Returns an error if the file is missing, malformed or inconsistent.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        Self::from_bundle(serialization::load_bundle(path)?)
    }
}

impl Default for OneVsAllModel {
    fn default() -> Self {
        Self::from_config(&TrainingConfig::default())
    }
}

/// Unwraps labels, failing on the first missing one.
///
/// # Errors
///
/// Returns [`HatError::InvalidInput`] naming the first unlabelled row.
pub fn require_labels(labels: &[Option<House>]) -> Result<Vec<House>> {
    labels
        .iter()
        .enumerate()
        .map(|(row, label)| {
            label.ok_or_else(|| HatError::InvalidInput(format!("row {row} has no label")))
        })
        .collect()
}

/// First house with the strictly greatest probability.
fn argmax_house(probabilities: &[f64]) -> House {
    let mut best = 0;
    for (j, &p) in probabilities.iter().enumerate().skip(1) {
        if p > probabilities[best] {
            best = j;
        }
    }
    House::ALL[best]
}

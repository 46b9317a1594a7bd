//! Binary logistic regression trained by gradient descent.

use std::str::FromStr;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use rand_distr::Normal;

use crate::error::{HatError, Result};
use crate::primitives::Matrix;

/// Default learning rate.
pub const DEFAULT_LEARNING_RATE: f64 = 0.01;

/// Default number of samples per mini-batch.
pub const DEFAULT_BATCH_SIZE: usize = 16;

/// The sigmoid argument is clamped to `[-SIGMOID_RANGE, SIGMOID_RANGE]`.
pub const SIGMOID_RANGE: f64 = 100.0;

/// Probabilities are kept in `[PROBABILITY_EPSILON, 1 - PROBABILITY_EPSILON]`,
/// since `1 / (1 + e^-z)` rounds to exactly `1.0` in f64 for `z > ~37`.
pub const PROBABILITY_EPSILON: f64 = 1e-15;

/// Standard deviation of the normal distribution used to initialise weights.
pub const INIT_WEIGHT_SCALE: f64 = 0.1;

/// How training samples are grouped into gradient steps within an epoch.
///
/// All variants share one gradient-step primitive; they differ only in the
/// rows passed to each call.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum GradientDescent {
    /// One step per epoch over the full dataset.
    #[default]
    Batch,
    /// A fresh permutation each epoch, one step per sample.
    Stochastic,
    /// A fresh permutation each epoch, one step per contiguous chunk of
    /// `batch_size` samples. The trailing partial chunk is always used.
    MiniBatch {
        /// Samples per step.
        batch_size: usize,
    },
}

impl GradientDescent {
    /// Mini-batch descent with [`DEFAULT_BATCH_SIZE`].
    #[must_use]
    pub fn mini_batch() -> Self {
        Self::MiniBatch {
            batch_size: DEFAULT_BATCH_SIZE,
        }
    }

    fn chunk_size(self, n_samples: usize) -> usize {
        match self {
            Self::Batch => n_samples,
            Self::Stochastic => 1,
            Self::MiniBatch { batch_size } => batch_size,
        }
    }

    fn shuffles(self) -> bool {
        !matches!(self, Self::Batch)
    }

    fn validate(self) -> Result<()> {
        match self {
            Self::MiniBatch { batch_size: 0 } => Err(HatError::InvalidHyperparameter {
                param: "batch_size".to_string(),
                value: "0".to_string(),
                constraint: ">= 1".to_string(),
            }),
            _ => Ok(()),
        }
    }
}

impl FromStr for GradientDescent {
    type Err = HatError;

    /// Parses `batch`, `stochastic` or `mini-batch` / `mini_batch`
    /// (with the default batch size).
    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "batch" => Ok(Self::Batch),
            "stochastic" | "sgd" => Ok(Self::Stochastic),
            "mini-batch" | "mini_batch" | "minibatch" => Ok(Self::mini_batch()),
            other => Err(HatError::InvalidHyperparameter {
                param: "descent".to_string(),
                value: other.to_string(),
                constraint: "one of batch, stochastic, mini-batch".to_string(),
            }),
        }
    }
}

/// Logistic sigmoid with a clamped argument and a clamped result, so the
/// output is always strictly inside `(0, 1)`.
#[must_use]
pub fn sigmoid(z: f64) -> f64 {
    let z = z.clamp(-SIGMOID_RANGE, SIGMOID_RANGE);
    (1.0 / (1.0 + (-z).exp())).clamp(PROBABILITY_EPSILON, 1.0 - PROBABILITY_EPSILON)
}

/// `weight[0] + row · weight[1..]`
fn net(weight: &[f64], row: &[f64]) -> f64 {
    weight[0]
        + weight[1..]
            .iter()
            .zip(row)
            .map(|(w, v)| w * v)
            .sum::<f64>()
}

/// Logistic regression classifier for binary classification.
///
/// The weight vector has `1 + n_features` entries: index 0 is the bias, the
/// rest align with the feature columns. Weights are drawn from
/// `N(0, 0.1²)` on the first `train` call and updated in place by gradient
/// descent afterwards.
///
/// # Example
///
/// ```
/// use sorting_hat::classification::LogisticRegression;
/// use sorting_hat::primitives::Matrix;
///
/// let x = Matrix::from_vec(4, 1, vec![-2.0, -1.0, 1.0, 2.0]).expect("4x1 matrix");
/// let y = vec![0, 0, 1, 1];
///
/// let mut model = LogisticRegression::new().with_learning_rate(0.1);
/// model.train(&x, &y, 200, Some(7)).expect("valid training data");
/// assert_eq!(model.predict(&x).expect("fitted"), y);
/// ```
#[derive(Debug, Clone)]
pub struct LogisticRegression {
    weight: Option<Vec<f64>>,
    learning_rate: f64,
    /// L1 strength `C`; `None` trains without regularization.
    regularization: Option<f64>,
    descent: GradientDescent,
    /// Drives weight initialisation and per-epoch shuffles.
    rng: StdRng,
    stop: Option<Arc<AtomicBool>>,
}

impl LogisticRegression {
    /// Creates an untrained classifier with default parameters.
    #[must_use]
    pub fn new() -> Self {
        Self {
            weight: None,
            learning_rate: DEFAULT_LEARNING_RATE,
            regularization: None,
            descent: GradientDescent::Batch,
            rng: StdRng::from_os_rng(),
            stop: None,
        }
    }

    /// Sets the learning rate.
    #[must_use]
    pub fn with_learning_rate(mut self, learning_rate: f64) -> Self {
        self.learning_rate = learning_rate;
        self
    }

    /// Enables L1 regularization with strength `c`.
    #[must_use]
    pub fn with_regularization(mut self, c: Option<f64>) -> Self {
        self.regularization = c;
        self
    }

    /// Selects how samples are grouped into gradient steps.
    #[must_use]
    pub fn with_descent(mut self, descent: GradientDescent) -> Self {
        self.descent = descent;
        self
    }

    /// Installs a flag that, once set, stops training at the next epoch
    /// boundary.
    #[must_use]
    pub fn with_stop_flag(mut self, stop: Arc<AtomicBool>) -> Self {
        self.stop = Some(stop);
        self
    }

    /// Learning rate in use.
    #[must_use]
    pub fn learning_rate(&self) -> f64 {
        self.learning_rate
    }

    /// Descent variant in use.
    #[must_use]
    pub fn descent(&self) -> GradientDescent {
        self.descent
    }

    /// Returns true once a weight vector exists.
    #[must_use]
    pub fn is_fitted(&self) -> bool {
        self.weight.is_some()
    }

    /// Number of features the weight vector expects.
    #[must_use]
    pub fn n_features(&self) -> Option<usize> {
        self.weight.as_ref().map(|w| w.len() - 1)
    }

    /// Raw weight vector (bias first), the unit of persistence.
    #[must_use]
    pub fn dump(&self) -> Option<&[f64]> {
        self.weight.as_deref()
    }

    /// Replaces the weight vector.
    ///
    /// # Errors
    ///
    /// Returns an error if `weight` is empty (it must at least hold the bias).
    pub fn load(&mut self, weight: Vec<f64>) -> Result<()> {
        if weight.is_empty() {
            return Err(HatError::empty_input("weight vector needs a bias term"));
        }
        self.weight = Some(weight);
        Ok(())
    }

    fn fitted_weight(&self, n_features: usize) -> Result<&[f64]> {
        let weight = self
            .weight
            .as_deref()
            .ok_or_else(|| HatError::not_fitted("LogisticRegression"))?;
        if weight.len() != n_features + 1 {
            return Err(HatError::dimension_mismatch(
                "classifier features",
                weight.len() - 1,
                n_features,
            ));
        }
        Ok(weight)
    }

    /// Predicts 1 where `net > 0`, else 0.
    ///
    /// # Errors
    ///
    /// Returns an error if the model is not fitted or dimensions mismatch.
    pub fn predict(&self, x: &Matrix<f64>) -> Result<Vec<usize>> {
        let weight = self.fitted_weight(x.n_cols())?;
        Ok(x.rows().map(|row| usize::from(net(weight, row) > 0.0)).collect())
    }

    /// Probability of class 1 for each sample, strictly inside `(0, 1)`.
    ///
    /// # Errors
    ///
    /// Returns an error if the model is not fitted or dimensions mismatch.
    pub fn predict_proba(&self, x: &Matrix<f64>) -> Result<Vec<f64>> {
        let weight = self.fitted_weight(x.n_cols())?;
        Ok(x.rows().map(|row| sigmoid(net(weight, row))).collect())
    }

    /// Fraction of samples whose prediction equals the label.
    ///
    /// # Errors
    ///
    /// Returns an error if the model is not fitted, dimensions mismatch, or
    /// there are no samples.
    pub fn score(&self, x: &Matrix<f64>, y: &[usize]) -> Result<f64> {
        check_samples(x, y.len())?;
        let predictions = self.predict(x)?;
        let correct = predictions.iter().zip(y).filter(|(p, t)| p == t).count();
        Ok(correct as f64 / y.len() as f64)
    }

    pub(crate) fn validate_hyperparameters(&self) -> Result<()> {
        if !(self.learning_rate.is_finite() && self.learning_rate > 0.0) {
            return Err(HatError::InvalidHyperparameter {
                param: "learning_rate".to_string(),
                value: self.learning_rate.to_string(),
                constraint: "finite and > 0".to_string(),
            });
        }
        if let Some(c) = self.regularization {
            if !(c.is_finite() && c > 0.0) {
                return Err(HatError::InvalidHyperparameter {
                    param: "C".to_string(),
                    value: c.to_string(),
                    constraint: "finite and > 0".to_string(),
                });
            }
        }
        self.descent.validate()
    }

    /// Trains for `epochs` epochs.
    ///
    /// On the first call the weights are initialised from the generator,
    /// which is first reseeded with `seed` when one is given; later calls
    /// continue from the current weights and generator state.
    ///
    /// # Arguments
    ///
    /// * `x` - Feature matrix (`n_samples` × `n_features`)
    /// * `y` - Binary labels (`n_samples`), must be 0 or 1
    /// * `epochs` - Number of passes over the data, at least 1
    /// * `seed` - Seed for weight initialisation and shuffling
    ///
    /// # Errors
    ///
    /// Returns an error, before touching the weights, if lengths differ,
    /// there are no samples, `epochs` is 0, a label is not binary, a
    /// hyperparameter is invalid, or the feature count differs from the
    /// existing weights. Returns [`HatError::Interrupted`] if the stop flag
    /// is raised; the weights reached so far are kept.
    pub fn train(
        &mut self,
        x: &Matrix<f64>,
        y: &[usize],
        epochs: usize,
        seed: Option<u64>,
    ) -> Result<()> {
        check_samples(x, y.len())?;
        if epochs < 1 {
            return Err(HatError::InvalidInput("epochs must be at least 1".into()));
        }
        if let Some(pos) = y.iter().position(|&label| label > 1) {
            return Err(HatError::InvalidInput(format!(
                "label {} at row {pos} is not 0 or 1",
                y[pos]
            )));
        }
        self.validate_hyperparameters()?;

        let n_features = x.n_cols();
        if let Some(existing) = self.n_features() {
            if existing != n_features {
                return Err(HatError::dimension_mismatch(
                    "classifier features",
                    existing,
                    n_features,
                ));
            }
        }

        let mut weight = match self.weight.take() {
            Some(weight) => weight,
            None => self.initial_weight(n_features, seed)?,
        };
        let outcome = self.run_epochs(&mut weight, x, y, epochs);
        self.weight = Some(weight);
        outcome
    }

    fn initial_weight(&mut self, n_features: usize, seed: Option<u64>) -> Result<Vec<f64>> {
        if let Some(seed) = seed {
            self.rng = StdRng::seed_from_u64(seed);
        }
        let normal = Normal::new(0.0, INIT_WEIGHT_SCALE).map_err(|e| {
            HatError::InvalidHyperparameter {
                param: "init_weight_scale".to_string(),
                value: INIT_WEIGHT_SCALE.to_string(),
                constraint: e.to_string(),
            }
        })?;
        Ok((0..=n_features).map(|_| self.rng.sample(normal)).collect())
    }

    fn run_epochs(
        &mut self,
        weight: &mut [f64],
        x: &Matrix<f64>,
        y: &[usize],
        epochs: usize,
    ) -> Result<()> {
        let n_samples = x.n_rows();
        let chunk_size = self.descent.chunk_size(n_samples);
        let mut order: Vec<usize> = (0..n_samples).collect();

        for epoch in 0..epochs {
            if self
                .stop
                .as_ref()
                .is_some_and(|flag| flag.load(Ordering::Relaxed))
            {
                return Err(HatError::Interrupted {
                    completed_epochs: epoch,
                });
            }

            if self.descent.shuffles() {
                order.shuffle(&mut self.rng);
            }
            for rows in order.chunks(chunk_size) {
                gradient_step(weight, self.learning_rate, self.regularization, x, y, rows);
            }

            tracing::debug!(epoch = epoch + 1, epochs, weight = ?weight, "epoch complete");
        }
        Ok(())
    }
}

impl Default for LogisticRegression {
    fn default() -> Self {
        Self::new()
    }
}

fn check_samples(x: &Matrix<f64>, n_labels: usize) -> Result<()> {
    if x.n_rows() != n_labels {
        return Err(HatError::InvalidInput(format!(
            "Number of samples in X and y must match: {} != {n_labels}",
            x.n_rows()
        )));
    }
    if n_labels == 0 {
        return Err(HatError::empty_input("zero samples"));
    }
    Ok(())
}

/// One gradient-descent update over the sample `rows`.
///
/// Errors are `p - y`. The bias gradient is their sum, each weight gradient
/// the dot product of its feature column with the errors. With `C` set both
/// are scaled by `C` and `|w|` is added to every non-bias component.
fn gradient_step(
    weight: &mut [f64],
    learning_rate: f64,
    regularization: Option<f64>,
    x: &Matrix<f64>,
    y: &[usize],
    rows: &[usize],
) {
    let errors: Vec<f64> = rows
        .iter()
        .map(|&r| sigmoid(net(weight, x.row(r))) - y[r] as f64)
        .collect();

    let mut bias_grad: f64 = errors.iter().sum();
    let mut grad = vec![0.0; weight.len() - 1];
    for (&r, &err) in rows.iter().zip(&errors) {
        for (g, &v) in grad.iter_mut().zip(x.row(r)) {
            *g += v * err;
        }
    }

    if let Some(c) = regularization {
        bias_grad *= c;
        for (g, w) in grad.iter_mut().zip(&weight[1..]) {
            *g = *g * c + w.abs();
        }
    }

    weight[0] -= learning_rate * bias_grad;
    for (w, g) in weight[1..].iter_mut().zip(&grad) {
        *w -= learning_rate * g;
    }
}

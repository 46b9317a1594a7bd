//! Min-max feature scaling.

use serde::{Deserialize, Serialize};

use crate::error::{HatError, Result};
use crate::primitives::Matrix;
use crate::traits::Transformer;

/// Lower bound on a column's range when dividing, so near-constant columns
/// never divide by zero.
pub const SCALE_EPSILON: f64 = 1e-7;

/// Fitted parameters of a [`MinMaxScaler`]: per-column minimum and maximum.
///
/// This is the unit of persistence for the scaler; both vectors have one
/// entry per feature column.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScalerState {
    /// Minimum of each column over the training rows.
    pub min: Vec<f64>,
    /// Maximum of each column over the training rows.
    pub max: Vec<f64>,
}

impl ScalerState {
    /// Number of feature columns described by this state.
    #[must_use]
    pub fn n_features(&self) -> usize {
        self.min.len()
    }
}

/// Scales each feature to `[0, 1]` using the training minimum and maximum.
///
/// `x' = (x - min) / max(max - min, ε)` with `ε = 1e-7`. Columns that were
/// constant in the training data (`max == min`) scale to `0` for any input.
///
/// # Example
///
/// ```
/// use sorting_hat::prelude::*;
///
/// let data = Matrix::from_vec(3, 2, vec![
///     0.0, 0.0,
///     5.0, 10.0,
///     10.0, 20.0,
/// ]).expect("valid matrix dimensions");
///
/// let mut scaler = MinMaxScaler::new();
/// let scaled = scaler.fit_transform(&data).expect("fit_transform should succeed");
///
/// assert!((scaled.get(0, 0) - 0.0).abs() < 1e-6);
/// assert!((scaled.get(2, 0) - 1.0).abs() < 1e-6);
/// assert!((scaled.get(1, 0) - 0.5).abs() < 1e-6);
/// ```
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MinMaxScaler {
    state: Option<ScalerState>,
}

impl MinMaxScaler {
    /// Creates an unfitted scaler.
    #[must_use]
    pub fn new() -> Self {
        Self { state: None }
    }

    /// Restores a scaler from previously fitted parameters.
    ///
    /// # Errors
    ///
    /// Returns an error if `min` and `max` have different lengths.
    pub fn from_state(state: ScalerState) -> Result<Self> {
        if state.min.len() != state.max.len() {
            return Err(HatError::dimension_mismatch(
                "scaler min length",
                state.min.len(),
                state.max.len(),
            ));
        }
        Ok(Self { state: Some(state) })
    }

    /// Returns the fitted parameters, if any.
    #[must_use]
    pub fn state(&self) -> Option<&ScalerState> {
        self.state.as_ref()
    }

    /// Returns true if the scaler has been fitted.
    #[must_use]
    pub fn is_fitted(&self) -> bool {
        self.state.is_some()
    }

    fn fitted_state(&self, n_features: usize) -> Result<&ScalerState> {
        let state = self
            .state
            .as_ref()
            .ok_or_else(|| HatError::not_fitted("MinMaxScaler"))?;
        if n_features != state.n_features() {
            return Err(HatError::dimension_mismatch(
                "scaler features",
                state.n_features(),
                n_features,
            ));
        }
        Ok(state)
    }

    /// Maps scaled data back to the original feature space.
    ///
    /// Constant columns map back to their training value.
    ///
    /// # Errors
    ///
    /// Returns an error if the scaler is not fitted or dimensions mismatch.
    pub fn inverse_transform(&self, x: &Matrix<f64>) -> Result<Matrix<f64>> {
        let state = self.fitted_state(x.n_cols())?;
        let mut result = x.clone();
        for i in 0..x.n_rows() {
            for j in 0..x.n_cols() {
                let range = state.max[j] - state.min[j];
                let original = if range > 0.0 {
                    x.get(i, j) * range.max(SCALE_EPSILON) + state.min[j]
                } else {
                    state.min[j]
                };
                result.set(i, j, original);
            }
        }
        Ok(result)
    }
}

impl Transformer for MinMaxScaler {
    type Input = f64;

    /// Computes the min and max of each feature.
    ///
    /// Fitting on zero rows is not an error: the stored bounds are the empty
    /// fold values (`+inf`, `-inf`) and every column then behaves as constant.
    fn fit(&mut self, x: &Matrix<f64>) -> Result<()> {
        let n_features = x.n_cols();
        if x.is_empty() {
            tracing::warn!(n_features, "fitting MinMaxScaler on zero rows; bounds are undefined");
        }

        let mut min = vec![f64::INFINITY; n_features];
        let mut max = vec![f64::NEG_INFINITY; n_features];
        for row in x.rows() {
            for (j, &val) in row.iter().enumerate() {
                min[j] = min[j].min(val);
                max[j] = max[j].max(val);
            }
        }

        self.state = Some(ScalerState { min, max });
        Ok(())
    }

    /// Scales the data with the fitted bounds. Does not modify the fit.
    fn transform(&self, x: &Matrix<f64>) -> Result<Matrix<f64>> {
        let state = self.fitted_state(x.n_cols())?;
        let mut result = x.clone();
        for i in 0..x.n_rows() {
            for j in 0..x.n_cols() {
                let range = state.max[j] - state.min[j];
                let scaled = if range > 0.0 {
                    (x.get(i, j) - state.min[j]) / range.max(SCALE_EPSILON)
                } else {
                    0.0
                };
                result.set(i, j, scaled);
            }
        }
        Ok(result)
    }
}

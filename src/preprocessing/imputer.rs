//! Mean imputation of missing feature values.

use serde::{Deserialize, Serialize};

use crate::error::{HatError, Result};
use crate::primitives::Matrix;
use crate::traits::Transformer;

/// Mean used for a column that has no observed value in the training data.
pub const ALL_MISSING_MEAN: f64 = 0.0;

/// Per-column means of the observed training values.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ImputationMeans(Vec<f64>);

impl ImputationMeans {
    /// Wraps per-column means.
    #[must_use]
    pub fn new(means: Vec<f64>) -> Self {
        Self(means)
    }

    /// Means in column order.
    #[must_use]
    pub fn as_slice(&self) -> &[f64] {
        &self.0
    }

    /// Number of feature columns.
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// True when no columns are described.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// Replaces missing cells with the column mean learned from training data.
///
/// Only observed cells contribute to a mean. A column with no observed cell
/// gets [`ALL_MISSING_MEAN`]. Evaluation data never influences the means.
///
/// # Example
///
/// ```
/// use sorting_hat::prelude::*;
///
/// let raw = Matrix::from_rows(vec![vec![Some(1.0)], vec![None], vec![Some(3.0)]])
///     .expect("rectangular rows");
/// let mut imputer = MeanImputer::new();
/// let filled = imputer.fit_transform(&raw).expect("fit_transform should succeed");
/// assert_eq!(filled.column(0), vec![1.0, 2.0, 3.0]);
/// ```
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MeanImputer {
    means: Option<ImputationMeans>,
}

impl MeanImputer {
    /// Creates an unfitted imputer.
    #[must_use]
    pub fn new() -> Self {
        Self { means: None }
    }

    /// Restores an imputer from previously computed means.
    #[must_use]
    pub fn from_means(means: ImputationMeans) -> Self {
        Self { means: Some(means) }
    }

    /// Returns the fitted means, if any.
    #[must_use]
    pub fn means(&self) -> Option<&ImputationMeans> {
        self.means.as_ref()
    }

    /// Returns true if the imputer has been fitted.
    #[must_use]
    pub fn is_fitted(&self) -> bool {
        self.means.is_some()
    }
}

impl Transformer for MeanImputer {
    type Input = Option<f64>;

    fn fit(&mut self, x: &Matrix<Option<f64>>) -> Result<()> {
        let n_features = x.n_cols();
        let mut sums = vec![0.0; n_features];
        let mut counts = vec![0usize; n_features];

        check_finite(x)?;
        for row in x.rows() {
            for (j, value) in row.iter().enumerate() {
                if let Some(v) = value {
                    sums[j] += v;
                    counts[j] += 1;
                }
            }
        }

        let means = sums
            .iter()
            .zip(&counts)
            .enumerate()
            .map(|(j, (&sum, &count))| {
                if count == 0 {
                    tracing::warn!(column = j, "column has no observed values; imputing {ALL_MISSING_MEAN}");
                    ALL_MISSING_MEAN
                } else {
                    sum / count as f64
                }
            })
            .collect();

        self.means = Some(ImputationMeans(means));
        Ok(())
    }

    fn transform(&self, x: &Matrix<Option<f64>>) -> Result<Matrix<f64>> {
        let means = self
            .means
            .as_ref()
            .ok_or_else(|| HatError::not_fitted("MeanImputer"))?;
        if x.n_cols() != means.len() {
            return Err(HatError::dimension_mismatch(
                "imputer features",
                means.len(),
                x.n_cols(),
            ));
        }

        check_finite(x)?;

        let mut result = Matrix::zeros(x.n_rows(), x.n_cols());
        for i in 0..x.n_rows() {
            for j in 0..x.n_cols() {
                result.set(i, j, x.get(i, j).unwrap_or(means.0[j]));
            }
        }
        Ok(result)
    }
}

/// Rejects observed NaN or infinite cells.
fn check_finite(x: &Matrix<Option<f64>>) -> Result<()> {
    for (i, row) in x.rows().enumerate() {
        if let Some(j) = row.iter().position(|v| v.is_some_and(|v| !v.is_finite())) {
            return Err(HatError::InvalidInput(format!(
                "non-finite value at row {i}, column {j}; use None for missing cells"
            )));
        }
    }
    Ok(())
}

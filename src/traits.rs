//! Core traits for fitted preprocessing components.

use crate::error::Result;
use crate::primitives::Matrix;

/// Trait for data transformers (scalers, imputers).
///
/// A transformer learns its parameters once from training data in `fit` and
/// then applies them unchanged to any matrix with the same columns.
/// `transform` is a pure function of the fitted state.
///
/// # Examples
///
/// ```
/// use sorting_hat::prelude::*;
///
/// let train = Matrix::from_vec(2, 1, vec![0.0, 10.0]).expect("valid");
/// let test = Matrix::from_vec(1, 1, vec![5.0]).expect("valid");
///
/// let mut scaler = MinMaxScaler::new();
/// scaler.fit(&train).expect("fit");
/// let scaled = scaler.transform(&test).expect("fitted");
/// assert!((scaled.get(0, 0) - 0.5).abs() < 1e-6);
/// ```
pub trait Transformer {
    /// Element type of the matrices this transformer consumes.
    type Input: Copy;

    /// Fits the transformer to data.
    ///
    /// # Errors
    ///
    /// Returns an error if fitting fails.
    fn fit(&mut self, x: &Matrix<Self::Input>) -> Result<()>;

    /// Transforms data using fitted parameters.
    ///
    /// # Errors
    ///
    /// Returns an error if the transformer is not fitted or the column count
    /// differs from the fitted one.
    fn transform(&self, x: &Matrix<Self::Input>) -> Result<Matrix<f64>>;

    /// Fits and transforms in one step.
    ///
    /// # Errors
    ///
    /// Returns an error if fitting fails.
    fn fit_transform(&mut self, x: &Matrix<Self::Input>) -> Result<Matrix<f64>> {
        self.fit(x)?;
        self.transform(x)
    }
}

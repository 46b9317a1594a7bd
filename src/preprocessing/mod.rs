//! Preprocessing transformers fitted on training data.
//!
//! - [`MeanImputer`] fills missing cells with per-column training means.
//! - [`MinMaxScaler`] maps each column onto `[0, 1]` using the training
//!   minimum and maximum.
//!
//! Imputation runs first, so the scaler's min/max are computed on
//! means-filled data.
//!
//! # Example
//!
//! ```
//! use sorting_hat::prelude::*;
//!
//! let raw = Matrix::from_rows(vec![
//!     vec![Some(1.0), Some(10.0)],
//!     vec![None, Some(20.0)],
//!     vec![Some(3.0), None],
//! ]).expect("rectangular rows");
//!
//! let mut imputer = MeanImputer::new();
//! let filled = imputer.fit_transform(&raw).expect("fit_transform should succeed");
//! assert_eq!(filled.get(1, 0), 2.0);
//! assert_eq!(filled.get(2, 1), 15.0);
//!
//! let mut scaler = MinMaxScaler::new();
//! let scaled = scaler.fit_transform(&filled).expect("fit_transform should succeed");
//! assert_eq!(scaled.get(0, 0), 0.0);
//! assert_eq!(scaled.get(2, 0), 1.0);
//! ```

mod imputer;
mod scaler;

pub use imputer::{ImputationMeans, MeanImputer, ALL_MISSING_MEAN};
pub use scaler::{MinMaxScaler, ScalerState, SCALE_EPSILON};

#[cfg(test)]
mod tests;

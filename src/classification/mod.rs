//! Classification algorithms.
//!
//! - [`LogisticRegression`]: a binary learner trained by batch, stochastic
//!   or mini-batch gradient descent, optionally L1-regularized
//! - [`OneVsAllModel`]: one binary learner per [`House`], combined by
//!   probability argmax, together with the imputation and scaling state
//!
//! # Example
//!
//! ```
//! use sorting_hat::prelude::*;
//!
//! // Two features; the house is decided by the sign of the first one.
//! let x = Matrix::from_vec(4, 2, vec![
//!     -1.0, 0.3,
//!     -0.8, -0.5,
//!     0.9, 0.1,
//!     0.7, -0.2,
//! ]).expect("Matrix dimensions match data length");
//! let y = vec![House::Slytherin, House::Slytherin, House::Gryffindor, House::Gryffindor];
//!
//! let mut model = OneVsAllModel::new(vec!["a".into(), "b".into()], "house")
//!     .with_learning_rate(0.5)
//!     .with_parallel(false);
//! model.train(&x, &y, 200, Some(42)).expect("Training data is valid");
//!
//! let predictions = model.predict(&x).expect("model is trained");
//! assert_eq!(predictions.len(), 4);
//! ```

mod house;
mod logistic;
mod one_vs_all;

pub use house::{House, N_HOUSES};
pub use logistic::{
    sigmoid, GradientDescent, LogisticRegression, DEFAULT_BATCH_SIZE, DEFAULT_LEARNING_RATE,
    INIT_WEIGHT_SCALE, PROBABILITY_EPSILON, SIGMOID_RANGE,
};
pub use one_vs_all::{require_labels, OneVsAllModel};


#[cfg(test)]
mod tests_logreg_contract;

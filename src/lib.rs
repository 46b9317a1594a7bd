//! Sorting Hat: one-vs-all logistic regression for house classification.
//!
//! Four independent binary logistic-regression learners, one per house, are
//! trained by gradient descent on mean-imputed, min-max scaled features and
//! combined by probability argmax. A trained model is saved as a single
//! bundle so training and inference can run as separate processes.
//!
//! # Quick Start
//!
//! ```
//! use sorting_hat::prelude::*;
//!
//! let csv = "\
//! Index,Hogwarts House,Astronomy,Herbology
//! 0,Slytherin,-9.0,1.0
//! 1,Slytherin,-8.0,
//! 2,Gryffindor,9.0,-1.0
//! 3,Gryffindor,8.0,0.5
//! ";
//! let table = DataFrame::from_reader(csv.as_bytes()).expect("valid CSV");
//!
//! let mut model = OneVsAllModel::new(
//!     vec!["Astronomy".to_string(), "Herbology".to_string()],
//!     "Hogwarts House",
//! )
//! .with_learning_rate(0.5);
//!
//! let (x, labels) = model.preprocess(&table, true).expect("training table");
//! let y = require_labels(&labels).expect("every row is labelled");
//! model.train(&x, &y, 200, Some(42)).expect("valid training data");
//!
//! let predictions = model.predict(&x).expect("model is trained");
//! assert_eq!(accuracy(&predictions, &y), 1.0);
//! ```
//!
//! # Modules
//!
//! - [`primitives`]: Row-major `Matrix`
//! - [`data`]: `DataFrame` of named CSV columns
//! - [`preprocessing`]: Mean imputation and min-max scaling
//! - [`classification`]: Binary logistic regression and the one-vs-all model
//! - [`model_selection`]: Train/test splitting
//! - [`metrics`]: Accuracy, confusion matrix, per-class report
//! - [`stats`]: Descriptive statistics for dataset exploration
//! - [`serialization`]: Model bundle file format
//! - [`config`]: Training configuration with named defaults

pub mod classification;
pub mod config;
pub mod data;
pub mod error;
pub mod metrics;
pub mod model_selection;
pub mod prelude;
pub mod preprocessing;
pub mod primitives;
pub mod serialization;
pub mod stats;
pub mod traits;

pub use error::{HatError, Result};
pub use primitives::Matrix;
pub use traits::Transformer;

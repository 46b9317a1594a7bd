//! Convenience re-exports for common usage.
//!
//! # Usage
//!
//! ```
//! use sorting_hat::prelude::*;
//! ```

pub use crate::classification::{
    require_labels, GradientDescent, House, LogisticRegression, OneVsAllModel,
};
pub use crate::config::TrainingConfig;
pub use crate::data::DataFrame;
pub use crate::error::HatError;
pub use crate::metrics::{accuracy, confusion_matrix, house_report, ClassificationReport};
pub use crate::model_selection::train_test_split;
pub use crate::preprocessing::{ImputationMeans, MeanImputer, MinMaxScaler, ScalerState};
pub use crate::primitives::Matrix;
pub use crate::traits::Transformer;

//! Evaluation metrics for classifiers.
//!
//! Accuracy, confusion counts and a per-class precision/recall/F1 report.

pub mod classification;

pub use classification::{
    accuracy, confusion_matrix, house_report, ClassMetrics, ClassificationReport,
};

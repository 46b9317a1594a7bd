//! Classification metrics for evaluating classifier performance.
//!
//! Provides accuracy, confusion matrix and a per-class report for
//! multi-class classification tasks.

use std::fmt;

use serde::Serialize;

use crate::classification::{House, N_HOUSES};
use crate::primitives::Matrix;

/// Compute classification accuracy.
///
/// accuracy = `correct_predictions` / `total_predictions`
///
/// # Arguments
///
/// * `y_pred` - Predicted class labels
/// * `y_true` - True class labels
///
/// # Returns
///
/// Accuracy score between 0.0 and 1.0
///
/// # Panics
///
/// Panics if slices have different lengths or are empty.
///
/// # Examples
///
/// ```
/// use sorting_hat::metrics::classification::accuracy;
///
/// let y_true = vec![0, 1, 2, 0, 1, 2];
/// let y_pred = vec![0, 2, 1, 0, 0, 1];
/// let acc = accuracy(&y_pred, &y_true);
/// assert!((acc - 1.0 / 3.0).abs() < 1e-12);
/// ```
#[must_use]
pub fn accuracy<L: PartialEq>(y_pred: &[L], y_true: &[L]) -> f64 {
    assert_eq!(y_pred.len(), y_true.len(), "Vectors must have same length");
    assert!(!y_true.is_empty(), "Vectors cannot be empty");

    let correct = y_pred
        .iter()
        .zip(y_true.iter())
        .filter(|(p, t)| p == t)
        .count();

    correct as f64 / y_true.len() as f64
}

/// Compute confusion matrix.
///
/// Returns an `n_classes × n_classes` matrix where element `[i,j]` is the
/// count of samples with true label i and predicted label j.
///
/// # Panics
///
/// Panics if slices have different lengths, are empty, or hold a label
/// `>= n_classes`.
///
/// # Examples
///
/// ```
/// use sorting_hat::metrics::classification::confusion_matrix;
///
/// let y_true = vec![0, 0, 1, 1, 2, 2];
/// let y_pred = vec![0, 1, 1, 1, 2, 0];
/// let cm = confusion_matrix(&y_pred, &y_true, 3);
/// assert_eq!(cm.shape(), (3, 3));
/// assert_eq!(cm.get(0, 1), 1);
/// assert_eq!(cm.get(1, 1), 2);
/// ```
#[must_use]
pub fn confusion_matrix(y_pred: &[usize], y_true: &[usize], n_classes: usize) -> Matrix<usize> {
    assert_eq!(y_pred.len(), y_true.len(), "Vectors must have same length");
    assert!(!y_true.is_empty(), "Vectors cannot be empty");

    let mut cm = Matrix::filled(n_classes, n_classes, 0usize);
    for (&true_label, &pred_label) in y_true.iter().zip(y_pred.iter()) {
        assert!(
            true_label < n_classes && pred_label < n_classes,
            "Label out of range for {n_classes} classes"
        );
        cm.set(true_label, pred_label, cm.get(true_label, pred_label) + 1);
    }
    cm
}

/// Precision, recall and F1 for one class.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ClassMetrics {
    /// Class name.
    pub label: String,
    /// TP / (TP + FP); 0 when the class is never predicted.
    pub precision: f64,
    /// TP / (TP + FN); 0 when the class never occurs.
    pub recall: f64,
    /// Harmonic mean of precision and recall; 0 when both are 0.
    pub f1: f64,
    /// Number of samples whose true label is this class.
    pub support: usize,
}

/// Per-class metrics plus overall accuracy and confusion counts.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ClassificationReport {
    /// One entry per class, in class index order.
    pub classes: Vec<ClassMetrics>,
    /// Overall accuracy.
    pub accuracy: f64,
    /// Number of samples.
    pub total: usize,
    /// Confusion counts, rows = truth, columns = prediction.
    pub confusion: Vec<Vec<usize>>,
}

impl ClassificationReport {
    /// Builds a report for integer labels `0..labels.len()` named by `labels`.
    ///
    /// # Panics
    ///
    /// Panics if slices have different lengths, are empty, or hold a label
    /// `>= labels.len()`.
    #[must_use]
    pub fn new(y_pred: &[usize], y_true: &[usize], labels: &[&str]) -> Self {
        let n_classes = labels.len();
        let cm = confusion_matrix(y_pred, y_true, n_classes);

        let classes = labels
            .iter()
            .enumerate()
            .map(|(k, label)| {
                let tp = cm.get(k, k);
                let predicted: usize = cm.column(k).iter().sum();
                let support: usize = cm.row(k).iter().sum();
                let precision = ratio(tp, predicted);
                let recall = ratio(tp, support);
                let f1 = if precision + recall > 0.0 {
                    2.0 * precision * recall / (precision + recall)
                } else {
                    0.0
                };
                ClassMetrics {
                    label: (*label).to_string(),
                    precision,
                    recall,
                    f1,
                    support,
                }
            })
            .collect();

        Self {
            classes,
            accuracy: accuracy(y_pred, y_true),
            total: y_true.len(),
            confusion: cm.rows().map(<[usize]>::to_vec).collect(),
        }
    }

    /// Unweighted mean of the per-class F1 scores.
    #[must_use]
    pub fn macro_f1(&self) -> f64 {
        if self.classes.is_empty() {
            return 0.0;
        }
        self.classes.iter().map(|c| c.f1).sum::<f64>() / self.classes.len() as f64
    }
}

fn ratio(numerator: usize, denominator: usize) -> f64 {
    if denominator == 0 {
        0.0
    } else {
        numerator as f64 / denominator as f64
    }
}

impl fmt::Display for ClassificationReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let width = self
            .classes
            .iter()
            .map(|c| c.label.len())
            .max()
            .unwrap_or(0)
            .max("accuracy".len());

        writeln!(
            f,
            "{:>width$}  {:>9}  {:>9}  {:>9}  {:>9}",
            "", "precision", "recall", "f1-score", "support"
        )?;
        writeln!(f)?;
        for c in &self.classes {
            writeln!(
                f,
                "{:>width$}  {:>9.2}  {:>9.2}  {:>9.2}  {:>9}",
                c.label, c.precision, c.recall, c.f1, c.support
            )?;
        }
        writeln!(f)?;
        write!(
            f,
            "{:>width$}  {:>9}  {:>9}  {:>9.2}  {:>9}",
            "accuracy", "", "", self.accuracy, self.total
        )
    }
}

/// Report over the four houses, in [`House::ALL`] order.
///
/// # Panics
///
/// Panics if slices have different lengths or are empty.
///
/// # Examples
///
/// ```
/// use sorting_hat::classification::House;
/// use sorting_hat::metrics::house_report;
///
/// let y_true = vec![House::Slytherin, House::Gryffindor, House::Ravenclaw, House::Hufflepuff];
/// let y_pred = vec![House::Slytherin, House::Gryffindor, House::Ravenclaw, House::Ravenclaw];
/// let report = house_report(&y_pred, &y_true);
/// assert_eq!(report.accuracy, 0.75);
/// assert_eq!(report.classes[2].precision, 0.5);
/// ```
#[must_use]
pub fn house_report(y_pred: &[House], y_true: &[House]) -> ClassificationReport {
    let names: [&str; N_HOUSES] = House::ALL.map(House::name);
    let pred: Vec<usize> = y_pred.iter().map(|h| h.index()).collect();
    let truth: Vec<usize> = y_true.iter().map(|h| h.index()).collect();
    ClassificationReport::new(&pred, &truth, &names)
}

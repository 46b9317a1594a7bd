//! Model selection utilities.
//!
//! Deterministic train/test partitioning for holding out evaluation data.

use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;

use crate::error::{HatError, Result};
use crate::primitives::Matrix;

/// A split produced by [`train_test_split`]: `(x_train, x_test, y_train, y_test)`.
pub type Split<T, L> = (Matrix<T>, Matrix<T>, Vec<L>, Vec<L>);

/// Validates inputs for `train_test_split`.
fn validate_split_inputs(n_samples: usize, n_labels: usize, test_size: f64) -> Result<(usize, usize)> {
    if !(test_size > 0.0 && test_size < 1.0) {
        return Err(HatError::InvalidHyperparameter {
            param: "test_size".to_string(),
            value: test_size.to_string(),
            constraint: "between 0 and 1 (exclusive)".to_string(),
        });
    }

    if n_samples != n_labels {
        return Err(HatError::InvalidInput(format!(
            "X and y must have same number of samples, got {n_samples} and {n_labels}"
        )));
    }

    let n_test = (n_samples as f64 * test_size).round() as usize;
    let n_train = n_samples - n_test;

    if n_test == 0 || n_train == 0 {
        return Err(HatError::InvalidInput(format!(
            "Split would result in empty train or test set (n_train={n_train}, n_test={n_test})"
        )));
    }

    Ok((n_train, n_test))
}

/// Shuffles indices with optional random seed.
fn shuffle_indices(n_samples: usize, random_state: Option<u64>) -> Vec<usize> {
    let mut indices: Vec<usize> = (0..n_samples).collect();

    let mut rng = match random_state {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_os_rng(),
    };
    indices.shuffle(&mut rng);

    indices
}

/// Randomly partitions `0..n_samples` into training and test row indices.
///
/// This is the partition [`train_test_split`] applies, exposed for callers
/// that must split raw rows before fitting any preprocessing.
///
/// # Errors
///
/// Returns an error if `test_size` is outside `(0, 1)` or either side would
/// be empty.
pub fn train_test_indices(
    n_samples: usize,
    test_size: f64,
    random_state: Option<u64>,
) -> Result<(Vec<usize>, Vec<usize>)> {
    let (n_train, _) = validate_split_inputs(n_samples, n_samples, test_size)?;
    let mut train = shuffle_indices(n_samples, random_state);
    let test = train.split_off(n_train);
    Ok((train, test))
}

/// Randomly partitions samples into a training set and a test set.
///
/// `n_test = round(n_samples * test_size)`; the rest is training data. The
/// same `random_state` always produces the same partition.
///
/// # Errors
///
/// Returns an error if `test_size` is outside `(0, 1)`, the lengths differ,
/// or either side would be empty.
///
/// # Examples
///
/// ```rust
/// use sorting_hat::model_selection::train_test_split;
/// use sorting_hat::primitives::Matrix;
///
/// let x = Matrix::from_vec(10, 2, (0..20).map(f64::from).collect()).expect("10x2 matrix");
/// let y = vec![0, 1, 0, 1, 0, 1, 0, 1, 0, 1];
///
/// let (x_train, x_test, y_train, y_test) =
///     train_test_split(&x, &y, 0.2, Some(42)).expect("valid split");
/// assert_eq!(x_train.n_rows(), 8);  // 80% training
/// assert_eq!(x_test.n_rows(), 2);   // 20% test
/// assert_eq!((y_train.len(), y_test.len()), (8, 2));
/// ```
pub fn train_test_split<T: Copy, L: Clone>(
    x: &Matrix<T>,
    y: &[L],
    test_size: f64,
    random_state: Option<u64>,
) -> Result<Split<T, L>> {
    validate_split_inputs(x.n_rows(), y.len(), test_size)?;
    let (train_indices, test_indices) = train_test_indices(x.n_rows(), test_size, random_state)?;

    let pick = |idx: &[usize]| idx.iter().map(|&i| y[i].clone()).collect::<Vec<L>>();
    Ok((
        x.select_rows(&train_indices),
        x.select_rows(&test_indices),
        pick(&train_indices),
        pick(&test_indices),
    ))
}

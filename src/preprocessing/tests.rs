//! Tests for preprocessing module.

use super::*;
use crate::error::HatError;
use crate::primitives::Matrix;
use crate::traits::Transformer;

fn two_column_data() -> Matrix<f64> {
    Matrix::from_vec(3, 2, vec![1.0, -10.0, 2.0, 0.0, 3.0, 10.0]).expect("valid matrix dimensions")
}

#[test]
fn test_scaler_new_is_unfitted() {
    let scaler = MinMaxScaler::new();
    assert!(!scaler.is_fitted());
    assert!(scaler.state().is_none());
}

#[test]
fn test_scaler_fit_stores_bounds() {
    let mut scaler = MinMaxScaler::new();
    scaler.fit(&two_column_data()).expect("fit should succeed");

    let state = scaler.state().expect("fitted");
    assert_eq!(state.min, vec![1.0, -10.0]);
    assert_eq!(state.max, vec![3.0, 10.0]);
}

#[test]
fn test_scaler_transform_unit_range() {
    let mut scaler = MinMaxScaler::new();
    let scaled = scaler.fit_transform(&two_column_data()).expect("fit_transform");

    assert_eq!(scaled.column(0), vec![0.0, 0.5, 1.0]);
    assert_eq!(scaled.column(1), vec![0.0, 0.5, 1.0]);
}

#[test]
fn test_scaler_uses_training_fit_for_test_data() {
    let mut scaler = MinMaxScaler::new();
    scaler.fit(&two_column_data()).expect("fit");

    let test = Matrix::from_vec(1, 2, vec![5.0, -20.0]).expect("valid");
    let scaled = scaler.transform(&test).expect("transform");
    // Outside the training range maps outside [0, 1].
    assert!((scaled.get(0, 0) - 2.0).abs() < 1e-12);
    assert!((scaled.get(0, 1) + 0.5).abs() < 1e-12);
}

#[test]
fn test_scaler_transform_is_pure() {
    let mut scaler = MinMaxScaler::new();
    scaler.fit(&two_column_data()).expect("fit");
    let before = scaler.state().cloned();

    let input = Matrix::from_vec(2, 2, vec![1.5, 3.0, 2.5, -7.0]).expect("valid");
    let first = scaler.transform(&input).expect("transform");
    let second = scaler.transform(&input).expect("transform");

    assert_eq!(first, second);
    assert_eq!(scaler.state().cloned(), before);
}

#[test]
fn test_scaler_constant_column_scales_to_zero() {
    let data = Matrix::from_vec(3, 2, vec![4.0, 1.0, 4.0, 2.0, 4.0, 3.0]).expect("valid");
    let mut scaler = MinMaxScaler::new();
    scaler.fit(&data).expect("fit");

    let unseen = Matrix::from_vec(3, 2, vec![4.0, 1.0, -100.0, 2.0, 1e9, 3.0]).expect("valid");
    let scaled = scaler.transform(&unseen).expect("transform");
    for value in scaled.column(0) {
        assert_eq!(value, 0.0);
        assert!(value.is_finite());
    }
}

#[test]
fn test_scaler_tiny_range_is_epsilon_guarded() {
    let data = Matrix::from_vec(2, 1, vec![0.0, 1e-9]).expect("valid");
    let mut scaler = MinMaxScaler::new();
    let scaled = scaler.fit_transform(&data).expect("fit_transform");
    // Divided by ε, not by the true 1e-9 range.
    assert!((scaled.get(1, 0) - 1e-9 / SCALE_EPSILON).abs() < 1e-12);
}

#[test]
fn test_scaler_transform_without_fit() {
    let scaler = MinMaxScaler::new();
    let err = scaler.transform(&two_column_data()).expect_err("unfitted");
    assert!(matches!(err, HatError::NotFitted { .. }));
}

#[test]
fn test_scaler_dimension_mismatch() {
    let mut scaler = MinMaxScaler::new();
    scaler.fit(&two_column_data()).expect("fit");
    let wrong = Matrix::from_vec(1, 3, vec![1.0, 2.0, 3.0]).expect("valid");
    assert!(matches!(
        scaler.transform(&wrong),
        Err(HatError::DimensionMismatch { .. })
    ));
}

#[test]
fn test_scaler_zero_rows_fit_is_silent() {
    let empty = Matrix::from_vec(0, 2, Vec::new()).expect("valid");
    let mut scaler = MinMaxScaler::new();
    scaler.fit(&empty).expect("zero-row fit does not fail");
    let state = scaler.state().expect("fitted");
    assert_eq!(state.min.len(), 2);
    assert!(state.min.iter().all(|v| v.is_infinite()));
}

#[test]
fn test_scaler_state_round_trip() {
    let mut scaler = MinMaxScaler::new();
    scaler.fit(&two_column_data()).expect("fit");
    let state = scaler.state().cloned().expect("fitted");

    let restored = MinMaxScaler::from_state(state.clone()).expect("valid state");
    assert_eq!(restored.state(), Some(&state));

    let input = two_column_data();
    assert_eq!(
        scaler.transform(&input).expect("transform"),
        restored.transform(&input).expect("transform")
    );
}

#[test]
fn test_scaler_from_state_rejects_ragged() {
    let state = ScalerState {
        min: vec![0.0, 1.0],
        max: vec![1.0],
    };
    assert!(MinMaxScaler::from_state(state).is_err());
}

#[test]
fn test_scaler_inverse_transform() {
    let data = two_column_data();
    let mut scaler = MinMaxScaler::new();
    let scaled = scaler.fit_transform(&data).expect("fit_transform");
    let restored = scaler.inverse_transform(&scaled).expect("inverse");

    for (a, b) in restored.as_slice().iter().zip(data.as_slice()) {
        assert!((a - b).abs() < 1e-9);
    }
}

#[test]
fn test_imputer_column_mean() {
    let raw = Matrix::from_rows(vec![vec![Some(1.0)], vec![None], vec![Some(3.0)]]).expect("valid");
    let mut imputer = MeanImputer::new();
    imputer.fit(&raw).expect("fit");

    assert_eq!(imputer.means().expect("fitted").as_slice(), &[2.0]);
    let filled = imputer.transform(&raw).expect("transform");
    assert_eq!(filled.get(1, 0), 2.0);
}

#[test]
fn test_imputer_all_missing_column_defaults_to_zero() {
    let raw = Matrix::from_rows(vec![vec![Some(5.0), None], vec![Some(7.0), None]]).expect("valid");
    let mut imputer = MeanImputer::new();
    let filled = imputer.fit_transform(&raw).expect("fit_transform");

    assert_eq!(imputer.means().expect("fitted").as_slice(), &[6.0, ALL_MISSING_MEAN]);
    assert_eq!(filled.column(1), vec![0.0, 0.0]);
}

#[test]
fn test_imputer_uses_training_means_only() {
    let train = Matrix::from_rows(vec![vec![Some(10.0)], vec![Some(20.0)]]).expect("valid");
    let test = Matrix::from_rows(vec![vec![None], vec![Some(1000.0)]]).expect("valid");

    let mut imputer = MeanImputer::new();
    imputer.fit(&train).expect("fit");
    let filled = imputer.transform(&test).expect("transform");

    assert_eq!(filled.column(0), vec![15.0, 1000.0]);
    assert_eq!(imputer.means().expect("fitted").as_slice(), &[15.0]);
}

#[test]
fn test_imputer_transform_without_fit() {
    let imputer = MeanImputer::new();
    let raw = Matrix::from_rows(vec![vec![None::<f64>]]).expect("valid");
    assert!(matches!(
        imputer.transform(&raw),
        Err(HatError::NotFitted { .. })
    ));
}

#[test]
fn test_imputer_from_means() {
    let imputer = MeanImputer::from_means(ImputationMeans::new(vec![1.5, -2.0]));
    let raw = Matrix::from_rows(vec![vec![None, None]]).expect("valid");
    let filled = imputer.transform(&raw).expect("transform");
    assert_eq!(filled.row(0), &[1.5, -2.0]);
}

#[test]
fn test_imputer_dimension_mismatch() {
    let imputer = MeanImputer::from_means(ImputationMeans::new(vec![0.0]));
    let raw = Matrix::from_rows(vec![vec![Some(1.0), Some(2.0)]]).expect("valid");
    assert!(matches!(
        imputer.transform(&raw),
        Err(HatError::DimensionMismatch { .. })
    ));
}

#[test]
fn test_imputer_rejects_non_finite_cells() {
    let mut imputer = MeanImputer::new();
    for bad in [f64::NAN, f64::INFINITY, f64::NEG_INFINITY] {
        let raw = Matrix::from_rows(vec![vec![Some(1.0)], vec![Some(bad)]]).expect("valid");
        assert!(matches!(imputer.fit(&raw), Err(HatError::InvalidInput(_))));
        assert!(!imputer.is_fitted());
    }

    imputer
        .fit(&Matrix::from_rows(vec![vec![Some(1.0)]]).expect("valid"))
        .expect("fit");
    let raw = Matrix::from_rows(vec![vec![Some(f64::NAN)]]).expect("valid");
    assert!(matches!(imputer.transform(&raw), Err(HatError::InvalidInput(_))));
}

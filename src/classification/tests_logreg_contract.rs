// =========================================================================
// FALSIFY-LOGREG: behavioural contract of the binary and one-vs-all
// logistic regression learners.
//
// Each test tries to falsify one claim; the assertion message names the
// claim that broke.
// =========================================================================

use super::*;
use crate::primitives::Matrix;

fn blobs() -> (Matrix<f64>, Vec<usize>) {
    let x = Matrix::from_vec(6, 2, vec![
        -1.0, -0.8, -0.9, -1.0, -0.7, -0.6,
        0.8, 0.9, 1.0, 0.7, 0.6, 0.8,
    ]).expect("valid");
    (x, vec![0_usize, 0, 0, 1, 1, 1])
}

/// FALSIFY-LOGREG-001: Predictions in {0, 1}
#[test]
fn falsify_logreg_001_binary_predictions() {
    let (x, y) = blobs();
    let mut lr = LogisticRegression::new().with_learning_rate(0.1);
    lr.train(&x, &y, 100, Some(1)).expect("train");

    let preds = lr.predict(&x).expect("fitted");
    for (i, &p) in preds.iter().enumerate() {
        assert!(
            p <= 1,
            "FALSIFIED LOGREG-001: prediction[{i}] = {p}, not in {{0, 1}}"
        );
    }
}

/// FALSIFY-LOGREG-002: Prediction count matches input count
#[test]
fn falsify_logreg_002_prediction_count() {
    let (x, y) = blobs();
    let mut lr = LogisticRegression::new();
    lr.train(&x, &y, 10, Some(1)).expect("train");

    let preds = lr.predict(&x).expect("fitted");
    assert_eq!(preds.len(), 6, "FALSIFIED LOGREG-002: {} predictions for 6 inputs", preds.len());
}

/// FALSIFY-LOGREG-003: Probabilities in (0, 1), never at the endpoints
#[test]
fn falsify_logreg_003_probabilities_open_interval() {
    let (x, y) = blobs();
    let mut lr = LogisticRegression::new().with_learning_rate(10.0);
    lr.train(&x, &y, 500, Some(1)).expect("train");

    let probas = lr.predict_proba(&x).expect("fitted");
    for (i, p) in probas.iter().enumerate() {
        assert!(
            *p > 0.0 && *p < 1.0,
            "FALSIFIED LOGREG-003: proba[{i}] = {p} not in (0, 1)"
        );
    }
}

/// FALSIFY-LOGREG-004: Deterministic predictions
#[test]
fn falsify_logreg_004_deterministic() {
    let (x, y) = blobs();
    let mut lr = LogisticRegression::new();
    lr.train(&x, &y, 10, Some(1)).expect("train");

    let p1 = lr.predict(&x).expect("fitted");
    let p2 = lr.predict(&x).expect("fitted");
    assert_eq!(p1, p2, "FALSIFIED LOGREG-004: predictions differ on same input");
}

/// FALSIFY-LOGREG-005: predict agrees with thresholding predict_proba at 0.5
#[test]
fn falsify_logreg_005_predict_matches_proba() {
    let (x, y) = blobs();
    let mut lr = LogisticRegression::new().with_learning_rate(0.1);
    lr.train(&x, &y, 30, Some(2)).expect("train");

    let preds = lr.predict(&x).expect("fitted");
    let probas = lr.predict_proba(&x).expect("fitted");
    for (i, (&p, &q)) in preds.iter().zip(&probas).enumerate() {
        assert_eq!(
            p,
            usize::from(q > 0.5),
            "FALSIFIED LOGREG-005: sample {i} predicted {p} with probability {q}"
        );
    }
}

/// FALSIFY-LOGREG-006: One-vs-all only ever answers with a known house
#[test]
fn falsify_logreg_006_one_vs_all_completeness() {
    let (x, y) = blobs();
    let y: Vec<House> = y.iter().map(|&l| House::ALL[l * 2]).collect();
    let mut model = OneVsAllModel::new(vec!["a".into(), "b".into()], "house");
    model.train(&x, &y, 10, Some(3)).expect("train");

    let unseen = Matrix::from_vec(3, 2, vec![0.0, 0.0, 1e6, -1e6, -3.0, 3.0]).expect("valid");
    for house in model.predict(&unseen).expect("fitted") {
        assert!(
            House::ALL.contains(&house),
            "FALSIFIED LOGREG-006: unknown label {house:?}"
        );
    }
}

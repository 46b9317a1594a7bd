//! Property-based tests using proptest.
//!
//! These tests verify invariants of preprocessing, the binary learner and
//! the one-vs-all model over generated inputs.

use sorting_hat::classification::sigmoid;
use sorting_hat::prelude::*;
use sorting_hat::serialization::ModelBundle;
use proptest::prelude::*;

// Strategy for generating small matrices
fn matrix_strategy(rows: usize, cols: usize) -> impl Strategy<Value = Matrix<f64>> {
    proptest::collection::vec(-1000.0f64..1000.0, rows * cols).prop_map(move |data| {
        Matrix::from_vec(rows, cols, data).expect("Test data should be valid")
    })
}

// Strategy for matrices with roughly a quarter of the cells missing
fn sparse_matrix_strategy(rows: usize, cols: usize) -> impl Strategy<Value = Matrix<Option<f64>>> {
    proptest::collection::vec(
        prop_oneof![3 => (-100.0f64..100.0).prop_map(Some), 1 => Just(None)],
        rows * cols,
    )
    .prop_map(move |data| Matrix::from_vec(rows, cols, data).expect("Test data should be valid"))
}

// CSV cells: numbers, missing markers and the odd infinity
fn cell_strategy() -> impl Strategy<Value = String> {
    prop_oneof![
        6 => (-50.0f64..50.0).prop_map(|v| v.to_string()),
        1 => Just(String::new()),
        1 => Just("NaN".to_string()),
        1 => Just("nan".to_string()),
        1 => Just("NA".to_string()),
        1 => Just("inf".to_string()),
    ]
}

fn house_strategy() -> impl Strategy<Value = House> {
    (0usize..4).prop_map(|i| House::ALL[i])
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn scaler_state_round_trips(x in matrix_strategy(8, 3)) {
        let mut scaler = MinMaxScaler::new();
        scaler.fit(&x).expect("fit");
        let state = scaler.state().cloned().expect("fitted");

        let restored = MinMaxScaler::from_state(state.clone()).expect("valid state");
        prop_assert_eq!(restored.state(), Some(&state));
    }

    #[test]
    fn scaler_transform_is_pure(train in matrix_strategy(6, 2), unseen in matrix_strategy(4, 2)) {
        let mut scaler = MinMaxScaler::new();
        scaler.fit(&train).expect("fit");
        let first = scaler.transform(&unseen).expect("transform");
        let second = scaler.transform(&unseen).expect("transform");
        prop_assert_eq!(first, second);
    }

    #[test]
    fn scaled_training_data_is_in_unit_range(x in matrix_strategy(10, 4)) {
        let mut scaler = MinMaxScaler::new();
        let scaled = scaler.fit_transform(&x).expect("fit_transform");
        for &v in scaled.as_slice() {
            prop_assert!(v.is_finite());
            prop_assert!((0.0..=1.0 + 1e-12).contains(&v), "scaled value {}", v);
        }
    }

    #[test]
    fn constant_columns_scale_to_zero(value in -1e6f64..1e6, unseen in matrix_strategy(5, 1)) {
        let train = Matrix::filled(4, 1, value);
        let mut scaler = MinMaxScaler::new();
        scaler.fit(&train).expect("fit");
        let scaled = scaler.transform(&unseen).expect("transform");
        prop_assert!(scaled.as_slice().iter().all(|&v| v == 0.0));
    }

    #[test]
    fn imputation_leaves_no_gaps_and_keeps_observed(x in sparse_matrix_strategy(8, 3)) {
        let mut imputer = MeanImputer::new();
        let filled = imputer.fit_transform(&x).expect("fit_transform");
        let means = imputer.means().expect("fitted").as_slice().to_vec();

        for i in 0..x.n_rows() {
            for j in 0..x.n_cols() {
                let expected = x.get(i, j).unwrap_or(means[j]);
                prop_assert_eq!(filled.get(i, j), expected);
            }
        }
    }

    #[test]
    fn sigmoid_stays_in_open_interval(z in proptest::num::f64::ANY) {
        let p = sigmoid(z);
        if !z.is_nan() {
            prop_assert!(p > 0.0 && p < 1.0, "sigmoid({}) = {}", z, p);
        }
    }

    #[test]
    fn training_is_reproducible(x in matrix_strategy(12, 2), seed in any::<u64>()) {
        let y: Vec<usize> = (0..12).map(|i| i % 2).collect();
        let mut a = LogisticRegression::new().with_descent(GradientDescent::Stochastic);
        let mut b = LogisticRegression::new().with_descent(GradientDescent::Stochastic);
        a.train(&x, &y, 3, Some(seed)).expect("train a");
        b.train(&x, &y, 3, Some(seed)).expect("train b");
        prop_assert_eq!(a.dump(), b.dump());
    }

    #[test]
    fn one_vs_all_always_answers_a_known_house(
        x in matrix_strategy(12, 2),
        y in proptest::collection::vec(house_strategy(), 12),
        unseen in matrix_strategy(6, 2),
    ) {
        let mut model = OneVsAllModel::new(vec!["a".into(), "b".into()], "house").with_parallel(false);
        model.train(&x, &y, 5, Some(1)).expect("train");

        let predictions = model.predict(&unseen).expect("trained");
        prop_assert_eq!(predictions.len(), 6);
        for house in predictions {
            prop_assert!(House::ALL.contains(&house));
        }
    }

    #[test]
    fn bundle_bytes_round_trip_exactly(x in matrix_strategy(8, 2), seed in any::<u64>()) {
        let y: Vec<House> = (0..8).map(|i| House::ALL[i % 4]).collect();
        let mut model = OneVsAllModel::new(vec!["a".into(), "b".into()], "house").with_parallel(false);
        model.train(&x, &y, 2, Some(seed)).expect("train");

        // Preprocessing state is required for a bundle.
        let table_csv = "a,b\n1.0,2.0\n3.0,4.0\n";
        let table = DataFrame::from_reader(table_csv.as_bytes()).expect("valid CSV");
        model.preprocess(&table, true).expect("fit preprocessing");

        let bundle = model.to_bundle().expect("fitted");
        let decoded = ModelBundle::from_bytes(&bundle.to_bytes().expect("encode")).expect("decode");
        prop_assert_eq!(decoded, bundle);
    }

    #[test]
    fn table_cells_never_produce_nan_probabilities(
        cells in proptest::collection::vec(cell_strategy(), 16),
    ) {
        let mut csv = String::from("House,a,b\n");
        for (i, pair) in cells.chunks(2).enumerate() {
            csv.push_str(&format!("{},{},{}\n", House::ALL[i % 4], pair[0], pair[1]));
        }
        let table = DataFrame::from_reader(csv.as_bytes()).expect("valid CSV");
        let mut model = OneVsAllModel::new(vec!["a".into(), "b".into()], "House").with_parallel(false);

        let (x, labels) = match model.preprocess(&table, true) {
            Ok(prepared) => prepared,
            Err(err) => {
                prop_assert!(cells.iter().any(|c| c == "inf"), "unexpected error: {}", err);
                prop_assert!(matches!(err, HatError::InvalidInput(_)));
                return Ok(());
            }
        };
        prop_assert!(x.as_slice().iter().all(|v| v.is_finite()));

        let y = require_labels(&labels).expect("labelled");
        model.train(&x, &y, 5, Some(2)).expect("train");
        let proba = model.predict_proba(&x).expect("trained");
        for &p in proba.as_slice() {
            prop_assert!(p > 0.0 && p < 1.0, "probability {}", p);
        }
    }
}

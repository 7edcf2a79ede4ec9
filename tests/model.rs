use jointanc::errors::ReconstructionError;
use jointanc::model::RateModel;

#[test]
fn rate_model_when_default_constructed_then_uses_jukes_cantor_values() {
    let model = RateModel::default();

    assert_eq!(model.pi, [0.25, 0.25, 0.25, 0.25]);
    assert_eq!(model.rho, [1.0; 6]);
}

#[test]
fn rate_model_when_frequencies_sum_to_one_then_builds_successfully() {
    let model = RateModel::new([0.1, 0.2, 0.3, 0.4], [1.0, 2.0, 1.0, 2.0, 1.0, 2.0])
        .expect("valid frequencies should build");

    assert_eq!(model.pi, [0.1, 0.2, 0.3, 0.4]);
}

#[test]
fn rate_model_when_frequencies_do_not_sum_to_one_then_returns_bad_model_error() {
    let err = RateModel::new([0.1, 0.1, 0.1, 0.1], [1.0; 6]);

    match err.expect_err("frequencies summing to 0.4 should be rejected") {
        ReconstructionError::BadModel { freq_sum, .. } => {
            assert!((freq_sum - 0.4).abs() < 1e-9);
        }
        other => panic!("unexpected error: {other:?}"),
    }
}

#[test]
fn rate_model_when_a_value_is_negative_then_returns_bad_model_error() {
    let err = RateModel::new([0.25, 0.25, 0.25, 0.25], [-1.0, 1.0, 1.0, 1.0, 1.0, 1.0]);

    match err.expect_err("negative exchangeability should be rejected") {
        ReconstructionError::BadModel { negative_count, .. } => {
            assert_eq!(negative_count, 1);
        }
        other => panic!("unexpected error: {other:?}"),
    }
}

#[test]
fn rate_matrix_when_jukes_cantor_then_rows_sum_to_zero() {
    let model = RateModel::default();
    let q = model.rate_matrix();

    for row in q {
        let sum: f64 = row.iter().sum();
        assert!(sum.abs() < 1e-9, "row {row:?} did not sum to zero");
    }
}

#[test]
fn rate_matrix_when_jukes_cantor_then_off_diagonal_entries_are_equal() {
    let model = RateModel::default();
    let q = model.rate_matrix();

    for (i, row) in q.iter().enumerate() {
        for (j, &cell) in row.iter().enumerate() {
            if i != j {
                assert!((cell - 0.25).abs() < 1e-9);
            }
        }
    }
}

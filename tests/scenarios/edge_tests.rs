//! Edge cases that must degrade rather than fail

use datafit::{FitKernel, IndexingPolicy};
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

use crate::test_helpers::{collection, steepest_kernel};

#[test]
fn test_relative_reference_off_the_end() {
    let data = collection("data", 4, &[0.0], |x, _| x + 1.0);
    let mut kernel = steepest_kernel("m*R", &data);
    kernel.add_reference("R").unwrap().x_policy = IndexingPolicy::Relative(1);

    let mut rng = ChaCha8Rng::seed_from_u64(1);
    let report = kernel.fit_with_rng(&data, false, &mut rng).unwrap();
    assert!(report.is_success());

    let range = &kernel.reference("R").unwrap().data_space().ranges()[0];
    assert_eq!(range.reference_y(0, 0), 2.0);
    assert_eq!(range.reference_y(2, 0), 4.0);
    assert_eq!(range.reference_y(3, 0), 0.0);
}

#[test]
fn test_eval_error_fails_only_its_range() {
    let data = collection("data", 4, &[0.0, 1.0, 2.0], |x, _| x);
    let mut kernel = steepest_kernel("m*x + 0/z", &data);

    let mut rng = ChaCha8Rng::seed_from_u64(1);
    let report = kernel.fit_with_rng(&data, false, &mut rng).unwrap();
    assert_eq!(report.n_failed(), 1);
    assert_eq!(report.n_fitted(), 2);
    assert!(report.ranges[0].error().is_some());
    assert!(kernel.data_space().ranges()[0].fitted_value("m").is_none());
    assert!((kernel.data_space().ranges()[2].fitted_value("m").unwrap() - 1.0).abs() < 1e-6);
}

#[test]
fn test_all_missing_slice_fits_trivially() {
    let mut data = collection("data", 3, &[0.0, 1.0], |x, _| x);
    for i in 0..3 {
        data.set_point_kind(1, i, datafit::PointKind::Missing).unwrap();
    }
    let mut kernel = steepest_kernel("m*x", &data);

    let mut rng = ChaCha8Rng::seed_from_u64(1);
    let report = kernel.fit_with_rng(&data, false, &mut rng).unwrap();
    let empty = report.ranges[1].fit().unwrap();
    assert_eq!(empty.cells, 0);
    assert_eq!(empty.sum_squared_error, 0.0);
    assert_eq!(empty.rmse(), 0.0);
    assert!(!report.overall_rmse().is_nan());
}

#[test]
fn test_fit_without_source_or_equation() {
    let data = collection("data", 3, &[0.0], |x, _| x);
    let mut rng = ChaCha8Rng::seed_from_u64(1);

    let mut kernel = FitKernel::new();
    kernel.set_equation("m*x").unwrap();
    assert!(matches!(
        kernel.fit_with_rng(&data, false, &mut rng),
        Err(datafit::FitError::NoSourceCollection)
    ));

    let mut kernel = FitKernel::new();
    kernel.set_source_collection(&data);
    assert!(matches!(
        kernel.fit_with_rng(&data, false, &mut rng),
        Err(datafit::FitError::InvalidEquation)
    ));

    let mut kernel = FitKernel::new();
    kernel.set_equation("2*x").unwrap();
    kernel.set_source_collection(&data);
    assert!(matches!(
        kernel.fit_with_rng(&data, false, &mut rng),
        Err(datafit::FitError::NoVariablesToFit)
    ));
}

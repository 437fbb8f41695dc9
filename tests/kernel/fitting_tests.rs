//! Fitting behavior across partitions, methods and limits

use approx::assert_abs_diff_eq;
use datafit::data::{PointKind, SourceData};
use datafit::kernel::{AxisRange, FittedValuesRecord};
use datafit::minimize::MinimizationMethod;
use datafit::{FitError, FitKernel, KernelState};
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

use crate::test_helpers::{collection, fitted, steepest_kernel};

#[test]
fn test_orthogonal_fit_per_point() {
    let data = collection("data", 5, &[1.0, 2.0, 3.0], |x, z| x * z);
    let mut kernel = steepest_kernel("a*z", &data);
    kernel.config_mut().orthogonal = true;
    kernel.config_mut().x_range = AxisRange::indices(1, 4);

    let mut rng = ChaCha8Rng::seed_from_u64(9);
    kernel.fit_with_rng(&data, false, &mut rng).unwrap();
    let report = kernel.report().unwrap();
    assert_eq!(report.ranges.len(), 4);
    assert!(report.is_success());
    for (a, x) in fitted(&kernel, "a").iter().zip([1.0, 2.0, 3.0, 4.0]) {
        assert_abs_diff_eq!(*a, x, epsilon = 1e-4);
    }
    assert_eq!(report.ranges[2].x_window, (3, 3));
    assert_eq!(report.ranges[2].z_window, (0, 2));
}

#[test]
fn test_missing_points_are_ignored() {
    let mut data = collection("data", 6, &[0.0], |x, _| 2.0 * x);
    data.set_y(0, 3, 1.0e6).unwrap();
    data.set_point_kind(0, 3, PointKind::Missing).unwrap();

    let mut kernel = steepest_kernel("m*x", &data);
    let mut rng = ChaCha8Rng::seed_from_u64(9);
    let report = kernel.fit_with_rng(&data, false, &mut rng).unwrap();

    let fit = report.ranges[0].fit().unwrap();
    assert_eq!(fit.cells, 5);
    assert_abs_diff_eq!(fit.values["m"], 2.0, epsilon = 1e-4);
    assert!(fit.rmse() < 1e-3);
}

#[test]
fn test_fixed_variables_are_not_varied() {
    let data = collection("data", 5, &[0.0], |x, _| 2.0 * x + 3.0);
    let mut kernel = steepest_kernel("m*x + c", &data);
    {
        let c = kernel.variable_mut("c").unwrap();
        c.fit = false;
        c.value = 3.0;
    }

    let mut rng = ChaCha8Rng::seed_from_u64(9);
    let report = kernel.fit_with_rng(&data, false, &mut rng).unwrap();
    let fit = report.ranges[0].fit().unwrap();
    assert_eq!(fit.values.len(), 1);
    assert_abs_diff_eq!(fit.values["m"], 2.0, epsilon = 1e-4);
    assert_eq!(kernel.variable("c").unwrap().value, 3.0);
}

#[test]
fn test_limits_hold_the_fit_near_the_bound() {
    let data = collection("data", 5, &[0.0], |x, _| 2.0 * x);
    let mut kernel = steepest_kernel("m*x", &data);
    kernel
        .variable_mut("m")
        .unwrap()
        .set_limits(None, Some(1.5))
        .unwrap();

    let mut rng = ChaCha8Rng::seed_from_u64(9);
    kernel.fit_with_rng(&data, false, &mut rng).unwrap();
    let m = fitted(&kernel, "m")[0];
    assert!(m > 1.45 && m < 1.55, "m = {}", m);
}

#[test]
fn test_parallel_matches_serial() {
    let data = collection("data", 8, &[1.0, 2.0, 3.0, 4.0], |x, z| z * x - z);
    let run = |parallel: bool| {
        let mut kernel = FitKernel::new();
        kernel.set_equation("a*x + b").unwrap();
        kernel.set_source_collection(&data);
        kernel.config_mut().method = MinimizationMethod::ModifiedSteepestDescent;
        kernel.config_mut().parallel = parallel;
        let mut rng = ChaCha8Rng::seed_from_u64(2024);
        kernel.fit_with_rng(&data, false, &mut rng).unwrap();
        (fitted(&kernel, "a"), fitted(&kernel, "b"))
    };

    assert_eq!(run(true), run(false));
}

#[test]
fn test_seeded_fit_is_reproducible() {
    let data = collection("data", 8, &[1.0, 2.0], |x, z| (z * x).sin());
    let run = || {
        let mut kernel = FitKernel::new();
        kernel.set_equation("sin(k*x) + c").unwrap();
        kernel.set_source_collection(&data);
        let mut rng = ChaCha8Rng::seed_from_u64(77);
        let report = kernel.fit_with_rng(&data, true, &mut rng).unwrap();
        (report.overall_rmse(), fitted(&kernel, "k"), fitted(&kernel, "c"))
    };

    assert_eq!(run(), run());
}

#[test]
fn test_simplex_fits_two_parameters() {
    let data = collection("data", 6, &[0.0], |x, _| 2.0 * x + 1.0);
    let mut kernel = steepest_kernel("a*x + b", &data);
    kernel.config_mut().method = MinimizationMethod::Simplex;
    kernel.config_mut().max_steps = 2000;

    let mut rng = ChaCha8Rng::seed_from_u64(1);
    let report = kernel.fit_with_rng(&data, false, &mut rng).unwrap();
    assert!(report.is_success());
    assert_abs_diff_eq!(fitted(&kernel, "a")[0], 2.0, epsilon = 1e-3);
    assert_abs_diff_eq!(fitted(&kernel, "b")[0], 1.0, epsilon = 1e-3);
}

#[test]
fn test_simplex_needs_two_parameters() {
    let data = collection("data", 6, &[0.0], |x, _| 2.0 * x);
    let mut kernel = steepest_kernel("m*x", &data);
    kernel.config_mut().method = MinimizationMethod::Simplex;

    let mut rng = ChaCha8Rng::seed_from_u64(1);
    let err = kernel.fit_with_rng(&data, false, &mut rng).unwrap_err();
    assert!(matches!(err, FitError::Underdetermined { parameters: 1 }));
    assert_eq!(kernel.state(), KernelState::Configuring);
}

#[test]
fn test_window_outside_the_source_aborts() {
    let data = collection("data", 4, &[0.0, 1.0], |x, _| x);
    let mut kernel = steepest_kernel("m*x", &data);
    kernel.config_mut().z_range = AxisRange::indices(0, 5);

    let mut rng = ChaCha8Rng::seed_from_u64(1);
    let err = kernel.fit_with_rng(&data, false, &mut rng).unwrap_err();
    assert!(matches!(err, FitError::RangeError { .. }));

    kernel.check_ranges(&data);
    assert!(kernel.fit_with_rng(&data, false, &mut rng).is_ok());
    assert_eq!(kernel.n_ranges(), 2);
}

#[test]
fn test_cost_at_given_parameters() {
    let data = collection("data", 5, &[0.0, 1.0], |x, z| (2.0 + z) * x);
    let mut kernel = steepest_kernel("m*x", &data);
    kernel.initialise_data_space(&data).unwrap();

    assert_eq!(kernel.cost(0, &[2.0]).unwrap(), 0.0);
    // Squared residuals x^2 for x = 0..4
    assert_abs_diff_eq!(kernel.cost(1, &[2.0]).unwrap(), 30.0, epsilon = 1e-12);
    assert_abs_diff_eq!(kernel.rms_cost(1, &[2.0]).unwrap(), 6.0_f64.sqrt(), epsilon = 1e-12);
    assert!(matches!(
        kernel.cost(0, &[1.0, 2.0]),
        Err(FitError::DimensionMismatch(_))
    ));
    assert!(kernel.cost(2, &[1.0]).is_err());
}

#[test]
fn test_fitted_values_survive_json() {
    let data = collection("data", 5, &[0.0, 1.0, 2.0], |x, z| (1.0 + z) * x);
    let mut kernel = steepest_kernel("m*x", &data);
    let mut rng = ChaCha8Rng::seed_from_u64(4);
    kernel.fit_with_rng(&data, false, &mut rng).unwrap();

    let json = kernel.export_fitted_values().to_json().unwrap();
    let record = FittedValuesRecord::from_json(&json).unwrap();

    let mut restored = steepest_kernel("m*x", &data);
    restored.initialise_data_space(&data).unwrap();
    restored.load_fitted_values(&record).unwrap();
    assert_eq!(fitted(&restored, "m"), fitted(&kernel, "m"));

    let mut buffer = Vec::new();
    record.write_to(&mut buffer).unwrap();
    let reread = FittedValuesRecord::read_from(buffer.as_slice()).unwrap();
    assert_eq!(reread.ranges.len(), 3);
}

#[test]
fn test_calculated_collection_after_fit() {
    let data = collection("data", 5, &[0.0, 1.0], |x, z| (2.0 + z) * x);
    let mut kernel = steepest_kernel("m*x", &data);
    let mut rng = ChaCha8Rng::seed_from_u64(4);
    kernel.fit_with_rng(&data, false, &mut rng).unwrap();

    let output = kernel.calculated_collection(&data).unwrap();
    assert_eq!(output.id(), "data (fit)");
    assert_eq!(output.slice_count(), 2);
    for (slice, expected) in output.slices().iter().zip(data.slices()) {
        for (y, target) in slice.y().iter().zip(expected.y()) {
            assert_abs_diff_eq!(*y, *target, epsilon = 1e-3);
        }
    }
}

#[test]
fn test_report_display() {
    let data = collection("data", 4, &[0.0], |x, _| 2.0 * x);
    let mut kernel = steepest_kernel("m*x", &data);
    let mut rng = ChaCha8Rng::seed_from_u64(4);
    let report = kernel.fit_with_rng(&data, false, &mut rng).unwrap();

    let text = report.to_string();
    assert!(text.starts_with("Fit Report:"));
    assert!(text.contains("1 fitted, 0 failed"));
    assert!(text.contains("m = "));
}

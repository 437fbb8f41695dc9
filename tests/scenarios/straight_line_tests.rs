//! A single slope on a single slice

use approx::assert_abs_diff_eq;
use datafit::data::Collection;
use datafit::minimize::MinimizationMethod;
use datafit::{FitKernel, KernelState};
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

fn line() -> Collection {
    let mut data = Collection::new("line", vec![0.0, 1.0, 2.0, 3.0, 4.0]);
    data.add_slice("y", 0.0, vec![0.0, 2.0, 4.0, 6.0, 8.0]).unwrap();
    data
}

fn kernel(data: &Collection, method: MinimizationMethod) -> FitKernel {
    let mut kernel = FitKernel::new();
    kernel.set_equation("A1*x").unwrap();
    kernel.set_source_collection(data);
    kernel.config_mut().method = method;
    kernel.config_mut().tolerance = 1e-6;
    kernel
}

#[test]
fn test_steepest_descent_finds_the_slope() {
    let data = line();
    let mut kernel = kernel(&data, MinimizationMethod::SteepestDescent);
    let mut rng = ChaCha8Rng::seed_from_u64(0);
    let report = kernel.fit_with_rng(&data, false, &mut rng).unwrap();

    assert_eq!(report.ranges.len(), 1);
    assert!(report.is_success());
    assert_abs_diff_eq!(kernel.variable("A1").unwrap().value, 2.0, epsilon = 1e-4);
    assert_abs_diff_eq!(
        kernel.data_space().ranges()[0].fitted_value("A1").unwrap(),
        2.0,
        epsilon = 1e-4
    );
    assert_eq!(kernel.state(), KernelState::Done);
}

#[test]
fn test_modified_steepest_descent_finds_the_slope() {
    let data = line();
    let mut kernel = kernel(&data, MinimizationMethod::ModifiedSteepestDescent);
    kernel.config_mut().tolerance = 1e-10;
    let mut rng = ChaCha8Rng::seed_from_u64(0);
    kernel.fit_with_rng(&data, false, &mut rng).unwrap();
    assert_abs_diff_eq!(kernel.variable("A1").unwrap().value, 2.0, epsilon = 1e-4);
}

#[test]
fn test_refit_from_the_result_stays_put() {
    let data = line();
    let mut kernel = kernel(&data, MinimizationMethod::SteepestDescent);
    let mut rng = ChaCha8Rng::seed_from_u64(0);
    kernel.fit_with_rng(&data, false, &mut rng).unwrap();
    let first = kernel.variable("A1").unwrap().value;

    kernel.fit_with_rng(&data, false, &mut rng).unwrap();
    let second = kernel.variable("A1").unwrap().value;
    assert_abs_diff_eq!(first, second, epsilon = 1e-4);
}

#[test]
fn test_seeded_modified_descent_is_idempotent_from_unity() {
    let data = line();
    let mut kernel = kernel(&data, MinimizationMethod::ModifiedSteepestDescent);

    kernel
        .fit_with_rng(&data, true, &mut ChaCha8Rng::seed_from_u64(21))
        .unwrap();
    let first = kernel.variable("A1").unwrap().value;
    kernel
        .fit_with_rng(&data, true, &mut ChaCha8Rng::seed_from_u64(21))
        .unwrap();
    assert_eq!(kernel.variable("A1").unwrap().value, first);
}

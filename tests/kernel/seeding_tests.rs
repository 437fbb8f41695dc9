//! Starting values for each range
//!
//! With a zero step budget the minimizer returns its starting point, so the
//! fitted values show exactly how each range was seeded.

use datafit::kernel::{FittedValuesRecord, RangeValues};
use datafit::minimize::MinimizationMethod;
use datafit::FitKernel;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

use crate::test_helpers::{collection, fitted};

fn frozen_kernel(data: &datafit::Collection) -> FitKernel {
    let mut kernel = FitKernel::new();
    kernel.set_equation("m*x").unwrap();
    kernel.set_source_collection(data);
    kernel.config_mut().method = MinimizationMethod::SteepestDescent;
    kernel.config_mut().max_steps = 0;
    kernel
}

#[test]
fn test_default_seed_is_unity() {
    let data = collection("data", 4, &[0.0, 1.0, 2.0], |x, _| 2.0 * x);
    let mut kernel = frozen_kernel(&data);
    kernel.variable_mut("m").unwrap().value = 5.0;

    let mut rng = ChaCha8Rng::seed_from_u64(0);
    kernel.fit_with_rng(&data, false, &mut rng).unwrap();
    assert_eq!(fitted(&kernel, "m"), vec![1.0, 1.0, 1.0]);
}

#[test]
fn test_roll_on_seeds_from_the_variable() {
    let data = collection("data", 4, &[0.0, 1.0, 2.0], |x, _| 2.0 * x);
    let mut kernel = frozen_kernel(&data);
    kernel.variable_mut("m").unwrap().value = 5.0;
    kernel.config_mut().roll_on = true;

    let mut rng = ChaCha8Rng::seed_from_u64(0);
    kernel.fit_with_rng(&data, false, &mut rng).unwrap();
    assert_eq!(fitted(&kernel, "m"), vec![5.0, 5.0, 5.0]);
    assert_eq!(kernel.variable("m").unwrap().value, 5.0);
}

#[test]
fn test_unity_overrides_everything() {
    let data = collection("data", 4, &[0.0, 1.0], |x, _| 2.0 * x);
    let mut kernel = frozen_kernel(&data);
    kernel.variable_mut("m").unwrap().value = 5.0;
    kernel.config_mut().roll_on = true;
    kernel.initialise_data_space(&data).unwrap();
    kernel
        .load_fitted_values(&FittedValuesRecord {
            ranges: vec![RangeValues {
                index: 0,
                values: vec![("m".to_string(), 7.0)],
            }],
        })
        .unwrap();

    let mut rng = ChaCha8Rng::seed_from_u64(0);
    kernel.fit_with_rng(&data, true, &mut rng).unwrap();
    assert_eq!(fitted(&kernel, "m"), vec![1.0, 1.0]);
}

#[test]
fn test_stored_values_seed_their_range() {
    let data = collection("data", 4, &[0.0, 1.0, 2.0], |x, _| 2.0 * x);
    let mut kernel = frozen_kernel(&data);
    kernel.initialise_data_space(&data).unwrap();
    kernel
        .load_fitted_values(&FittedValuesRecord {
            ranges: vec![
                RangeValues {
                    index: 0,
                    values: vec![("m".to_string(), 7.0)],
                },
                RangeValues {
                    index: 2,
                    values: vec![("m".to_string(), -3.0)],
                },
            ],
        })
        .unwrap();

    let mut rng = ChaCha8Rng::seed_from_u64(0);
    kernel.fit_with_rng(&data, false, &mut rng).unwrap();
    assert_eq!(fitted(&kernel, "m"), vec![7.0, 1.0, -3.0]);
}

#[test]
fn test_roll_on_carries_fits_forward() {
    // Slopes 2, 3, 4: each fit starts where the previous one finished
    let data = collection("data", 5, &[2.0, 3.0, 4.0], |x, z| z * x);
    let mut kernel = FitKernel::new();
    kernel.set_equation("m*x").unwrap();
    kernel.set_source_collection(&data);
    kernel.config_mut().method = MinimizationMethod::SteepestDescent;
    kernel.config_mut().tolerance = 1e-10;
    kernel.config_mut().max_steps = 500;
    kernel.config_mut().roll_on = true;

    let mut rng = ChaCha8Rng::seed_from_u64(0);
    let report = kernel.fit_with_rng(&data, false, &mut rng).unwrap();
    assert!(report.is_success());
    let m = fitted(&kernel, "m");
    for (value, expected) in m.iter().zip([2.0, 3.0, 4.0]) {
        assert!((value - expected).abs() < 1e-4);
    }
    assert!((kernel.variable("m").unwrap().value - 4.0).abs() < 1e-4);
}

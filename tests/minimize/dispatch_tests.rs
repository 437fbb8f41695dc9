//! Every method through the common entry point

use approx::assert_abs_diff_eq;
use datafit::minimize::{minimize, ConvergenceStatus, MinimizationMethod, MinimizeOptions};
use datafit::{FitError, Result};
use ndarray::{array, Array1};
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

fn bowl(p: &Array1<f64>) -> Result<f64> {
    Ok((p[0] - 1.5).powi(2) + 2.0 * (p[1] + 0.5).powi(2))
}

fn options() -> MinimizeOptions {
    MinimizeOptions {
        tolerance: 1e-12,
        max_steps: 2000,
        random_trials: 10,
        random_range: (-2.0, 2.0),
    }
}

#[test]
fn test_every_method_finds_the_bowl_minimum() {
    for method in MinimizationMethod::ALL {
        let mut rng = ChaCha8Rng::seed_from_u64(13);
        let result = minimize(method, bowl, &array![0.0, 0.0], &options(), &mut rng).unwrap();
        assert_abs_diff_eq!(result.params[0], 1.5, epsilon = 1e-3);
        assert_abs_diff_eq!(result.params[1], -0.5, epsilon = 1e-3);
        assert!(result.cost < 1e-6, "{}: {}", method, result);
        assert!(result.func_evals > result.iterations);
    }
}

#[test]
fn test_cost_errors_propagate() {
    for method in MinimizationMethod::ALL {
        let mut rng = ChaCha8Rng::seed_from_u64(13);
        let failing = |_: &Array1<f64>| -> Result<f64> {
            Err(FitError::InvalidState("no data".to_string()))
        };
        let result = minimize(method, failing, &array![1.0, 1.0], &options(), &mut rng);
        assert!(matches!(result, Err(FitError::InvalidState(_))));
    }
}

#[test]
fn test_zero_budget_returns_the_start() {
    for method in [
        MinimizationMethod::SteepestDescent,
        MinimizationMethod::ModifiedSteepestDescent,
    ] {
        let mut rng = ChaCha8Rng::seed_from_u64(13);
        let opts = MinimizeOptions {
            max_steps: 0,
            random_trials: 0,
            ..options()
        };
        let result = minimize(method, bowl, &array![3.0, 3.0], &opts, &mut rng).unwrap();
        assert_eq!(result.params, array![3.0, 3.0]);
        assert_eq!(result.iterations, 0);
        assert_eq!(result.status, ConvergenceStatus::MaxIterationsReached);
    }
}

#[test]
fn test_method_names() {
    assert_eq!(
        "Steepest Descent".parse::<MinimizationMethod>().unwrap(),
        MinimizationMethod::SteepestDescent
    );
    assert_eq!(MinimizationMethod::Simplex.to_string(), "Simplex");
    assert!(matches!(
        "Newton".parse::<MinimizationMethod>(),
        Err(FitError::UnknownMethod(name)) if name == "Newton"
    ));
}

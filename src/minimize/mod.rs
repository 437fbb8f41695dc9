//! # Minimizers
//!
//! Three derivative-free minimizers operating only on a scalar cost function
//! of a parameter vector:
//!
//! - [`SteepestDescent`]: central-difference gradient with a backtracking line search
//! - [`ModifiedSteepestDescent`]: random trials, a normalized gradient,
//!   a bidirectional line search and restarts
//! - [`NelderMead`]: a generic downhill simplex
//!
//! [`minimize`] dispatches on a [`MinimizationMethod`].

pub mod finite_difference;
pub mod modified_steepest_descent;
pub mod simplex;
pub mod steepest_descent;

use ndarray::Array1;
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::{FitError, Result};

pub use modified_steepest_descent::ModifiedSteepestDescent;
pub use simplex::NelderMead;
pub use steepest_descent::SteepestDescent;

/// Available minimization methods.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum MinimizationMethod {
    /// Plain steepest descent
    SteepestDescent,

    /// Steepest descent with random trials and restarts
    #[default]
    ModifiedSteepestDescent,

    /// Nelder-Mead downhill simplex
    Simplex,
}

impl MinimizationMethod {
    /// Every method, in keyword order
    pub const ALL: [MinimizationMethod; 3] = [
        MinimizationMethod::SteepestDescent,
        MinimizationMethod::ModifiedSteepestDescent,
        MinimizationMethod::Simplex,
    ];

    /// Keyword naming this method
    pub fn keyword(&self) -> &'static str {
        match self {
            MinimizationMethod::SteepestDescent => "Steepest Descent",
            MinimizationMethod::ModifiedSteepestDescent => "Modified Steepest Descent",
            MinimizationMethod::Simplex => "Simplex",
        }
    }
}

impl fmt::Display for MinimizationMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.keyword())
    }
}

impl FromStr for MinimizationMethod {
    type Err = FitError;

    fn from_str(s: &str) -> Result<Self> {
        Self::ALL
            .iter()
            .find(|method| method.keyword().eq_ignore_ascii_case(s.trim()))
            .copied()
            .ok_or_else(|| FitError::UnknownMethod(s.to_string()))
    }
}

/// Settings shared by all minimizers.
#[derive(Debug, Clone, PartialEq)]
pub struct MinimizeOptions {
    /// Convergence tolerance on the cost
    pub tolerance: f64,

    /// Maximum number of iterations
    pub max_steps: usize,

    /// Random trials per parameter (modified steepest descent only)
    pub random_trials: usize,

    /// Interval random trial values are drawn from (modified steepest descent only)
    pub random_range: (f64, f64),
}

impl Default for MinimizeOptions {
    fn default() -> Self {
        Self {
            tolerance: 1e-5,
            max_steps: 100,
            random_trials: 20,
            random_range: (-1.0, 1.0),
        }
    }
}

/// Why a minimizer stopped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConvergenceStatus {
    /// The change in cost fell below the tolerance, or the cost itself did.
    FunctionValueConvergence,

    /// No step along the search direction lowers the cost.
    NoImprovingStep,

    /// The spread of the simplex vertex costs fell below the tolerance.
    SimplexConvergence,

    /// The step budget was exhausted.
    MaxIterationsReached,
}

impl ConvergenceStatus {
    /// Returns true if the minimizer converged rather than running out of steps.
    pub fn is_converged(&self) -> bool {
        !matches!(self, ConvergenceStatus::MaxIterationsReached)
    }

    /// Returns a description of the convergence status.
    pub fn description(&self) -> &'static str {
        match self {
            ConvergenceStatus::FunctionValueConvergence => "Converged: small cost change",
            ConvergenceStatus::NoImprovingStep => "Converged: no improving step",
            ConvergenceStatus::SimplexConvergence => "Converged: simplex collapsed",
            ConvergenceStatus::MaxIterationsReached => "Terminated: maximum steps reached",
        }
    }
}

/// Outcome of one minimization.
#[derive(Debug, Clone)]
pub struct MinimizeResult {
    /// Best parameters found
    pub params: Array1<f64>,

    /// Cost at `params`
    pub cost: f64,

    /// Iterations performed
    pub iterations: usize,

    /// Cost function evaluations
    pub func_evals: usize,

    /// Why the minimizer stopped
    pub status: ConvergenceStatus,
}

impl fmt::Display for MinimizeResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Minimization Result:")?;
        writeln!(f, "  Status: {}", self.status.description())?;
        writeln!(f, "  Cost: {:.6e}", self.cost)?;
        writeln!(f, "  Iterations: {}", self.iterations)?;
        writeln!(f, "  Function evaluations: {}", self.func_evals)?;
        writeln!(f, "  Parameters: {}", self.params)
    }
}

/// Cost function wrapper counting evaluations.
pub(crate) struct Objective<F> {
    f: F,
    evals: usize,
}

impl<F> Objective<F>
where
    F: FnMut(&Array1<f64>) -> Result<f64>,
{
    pub(crate) fn new(f: F) -> Self {
        Self { f, evals: 0 }
    }

    pub(crate) fn eval(&mut self, params: &Array1<f64>) -> Result<f64> {
        self.evals += 1;
        (self.f)(params)
    }

    pub(crate) fn evals(&self) -> usize {
        self.evals
    }
}

/// Minimize `cost` from `initial` with the given method.
///
/// `rng` drives the random trials of [`MinimizationMethod::ModifiedSteepestDescent`]
/// and is left untouched by the other methods.
///
/// # Examples
///
/// ```
/// use datafit::minimize::{minimize, MinimizationMethod, MinimizeOptions};
/// use ndarray::{array, Array1};
/// use rand::SeedableRng;
///
/// let mut rng = rand::rngs::StdRng::seed_from_u64(7);
/// let cost = |p: &Array1<f64>| -> datafit::Result<f64> { Ok((p[0] - 3.0).powi(2)) };
/// let result = minimize(
///     MinimizationMethod::SteepestDescent,
///     cost,
///     &array![1.0],
///     &MinimizeOptions { tolerance: 1e-10, ..Default::default() },
///     &mut rng,
/// )
/// .unwrap();
/// assert!((result.params[0] - 3.0).abs() < 1e-3);
/// ```
pub fn minimize<F, R>(
    method: MinimizationMethod,
    cost: F,
    initial: &Array1<f64>,
    options: &MinimizeOptions,
    rng: &mut R,
) -> Result<MinimizeResult>
where
    F: FnMut(&Array1<f64>) -> Result<f64>,
    R: Rng + ?Sized,
{
    match method {
        MinimizationMethod::SteepestDescent => {
            SteepestDescent::new(options.tolerance, options.max_steps).minimize(cost, initial)
        }
        MinimizationMethod::ModifiedSteepestDescent => ModifiedSteepestDescent::new(
            options.tolerance,
            options.max_steps,
            options.random_trials,
            options.random_range,
        )
        .minimize(cost, initial, rng),
        MinimizationMethod::Simplex => {
            NelderMead::new(options.tolerance, options.max_steps).minimize(cost, initial)
        }
    }
}

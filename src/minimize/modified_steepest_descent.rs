//! Modified steepest descent
//!
//! A more robust descent for cost surfaces with poor starting points:
//!
//! 1. Each parameter is replaced by random values drawn from the data range,
//!    keeping any replacement that lowers the cost.
//! 2. The gradient is normalized by its largest component and components
//!    below 1% of that are dropped.
//! 3. The line search tries both directions along the gradient before
//!    declaring a local minimum.
//! 4. If the cost is still above the tolerance, the whole procedure restarts
//!    from the best point, within one overall step budget.

use ndarray::Array1;
use rand::Rng;

use crate::error::Result;
use crate::minimize::finite_difference::gradient;
use crate::minimize::{ConvergenceStatus, MinimizeResult, Objective};

/// Maximum number of halvings (or doublings) in one line search pass.
const MAX_LINE_STEPS: usize = 20;

/// Number of times the line search may flip direction.
const MAX_FLIPS: usize = 2;

/// Relative gradient components below this are ignored.
const GRADIENT_CUTOFF: f64 = 0.01;

/// Steepest descent with random trials, normalized gradients and restarts.
#[derive(Debug, Clone)]
pub struct ModifiedSteepestDescent {
    /// Target cost, and the smallest cost change treated as progress
    pub tolerance: f64,

    /// Maximum number of descent steps across all restarts
    pub max_steps: usize,

    /// Random trials per parameter before each descent
    pub random_trials: usize,

    /// Interval random trial values are drawn from
    pub random_range: (f64, f64),
}

impl Default for ModifiedSteepestDescent {
    fn default() -> Self {
        Self::new(1e-5, 100, 20, (-1.0, 1.0))
    }
}

impl ModifiedSteepestDescent {
    /// Create a new minimizer
    ///
    /// # Arguments
    ///
    /// * `tolerance` - Target cost and minimum useful cost change
    /// * `max_steps` - Step budget shared by all restarts
    /// * `random_trials` - Random trials per parameter; zero disables trials and restarts
    /// * `random_range` - Interval random values are drawn from, in either order
    pub fn new(
        tolerance: f64,
        max_steps: usize,
        random_trials: usize,
        random_range: (f64, f64),
    ) -> Self {
        Self {
            tolerance,
            max_steps,
            random_trials,
            random_range,
        }
    }

    /// Minimize `cost` starting from `initial`, drawing trial values from `rng`.
    ///
    /// The same `rng` state always yields the same result.
    pub fn minimize<F, R>(&self, cost: F, initial: &Array1<f64>, rng: &mut R) -> Result<MinimizeResult>
    where
        F: FnMut(&Array1<f64>) -> Result<f64>,
        R: Rng + ?Sized,
    {
        let mut objective = Objective::new(cost);
        let mut params = initial.clone();
        let mut best = objective.eval(&params)?;
        let mut steps = 0;
        let mut restarts = 0;

        let status = loop {
            self.random_trials_pass(&mut objective, &mut params, &mut best, rng)?;

            let mut local = ConvergenceStatus::MaxIterationsReached;
            let mut lambda = 0.1 * params.iter().fold(1.0_f64, |m, p| m.max(p.abs()));
            while steps < self.max_steps {
                if best <= self.tolerance {
                    local = ConvergenceStatus::FunctionValueConvergence;
                    break;
                }
                steps += 1;

                let Some(direction) = normalized_direction(&mut objective, &params)? else {
                    local = ConvergenceStatus::NoImprovingStep;
                    break;
                };
                let Some((next, next_cost, step)) =
                    bidirectional_search(&mut objective, &params, &direction, best, lambda)?
                else {
                    local = ConvergenceStatus::NoImprovingStep;
                    break;
                };

                let delta = best - next_cost;
                log::debug!(
                    "Modified steepest descent step {}: cost {:e} -> {:e}",
                    steps,
                    best,
                    next_cost
                );
                params = next;
                best = next_cost;
                lambda = step.abs();

                if delta < self.tolerance {
                    local = ConvergenceStatus::FunctionValueConvergence;
                    break;
                }
            }

            if best <= self.tolerance || self.random_trials == 0 {
                break local;
            }
            if steps >= self.max_steps {
                break ConvergenceStatus::MaxIterationsReached;
            }
            restarts += 1;
            log::debug!(
                "Modified steepest descent restart {} at cost {:e}",
                restarts,
                best
            );
        };

        Ok(MinimizeResult {
            params,
            cost: best,
            iterations: steps,
            func_evals: objective.evals(),
            status,
        })
    }

    /// Try random values for each parameter in turn, keeping improvements.
    fn random_trials_pass<F, R>(
        &self,
        objective: &mut Objective<F>,
        params: &mut Array1<f64>,
        best: &mut f64,
        rng: &mut R,
    ) -> Result<()>
    where
        F: FnMut(&Array1<f64>) -> Result<f64>,
        R: Rng + ?Sized,
    {
        let (a, b) = self.random_range;
        let (low, high) = if a <= b { (a, b) } else { (b, a) };
        if self.random_trials == 0 || !low.is_finite() || !high.is_finite() {
            return Ok(());
        }

        for j in 0..params.len() {
            for _ in 0..self.random_trials {
                let mut trial = params.clone();
                trial[j] = rng.gen_range(low..=high);
                let trial_cost = objective.eval(&trial)?;
                if trial_cost < *best {
                    *params = trial;
                    *best = trial_cost;
                }
            }
        }
        Ok(())
    }
}

/// Descent direction from the gradient scaled so its largest component is 1,
/// with small components zeroed. `None` at a stationary point.
fn normalized_direction<F>(
    objective: &mut Objective<F>,
    params: &Array1<f64>,
) -> Result<Option<Array1<f64>>>
where
    F: FnMut(&Array1<f64>) -> Result<f64>,
{
    let grad = gradient(&mut |p: &Array1<f64>| objective.eval(p), params)?;
    let largest = grad.iter().fold(0.0_f64, |m, g| m.max(g.abs()));
    if largest == 0.0 || !largest.is_finite() {
        return Ok(None);
    }

    Ok(Some(grad.mapv(|g| {
        let scaled = g / largest;
        if scaled.abs() < GRADIENT_CUTOFF {
            0.0
        } else {
            -scaled
        }
    })))
}

/// Line search along `direction`, flipping direction when shrinking fails.
fn bidirectional_search<F>(
    objective: &mut Objective<F>,
    params: &Array1<f64>,
    direction: &Array1<f64>,
    current: f64,
    lambda: f64,
) -> Result<Option<(Array1<f64>, f64, f64)>>
where
    F: FnMut(&Array1<f64>) -> Result<f64>,
{
    let mut start = lambda;
    for flip in 0..=MAX_FLIPS {
        let mut step = start;
        for _ in 0..MAX_LINE_STEPS {
            let trial = params + &(direction * step);
            let trial_cost = objective.eval(&trial)?;
            if trial_cost < current {
                return expand(objective, params, direction, trial, trial_cost, step).map(Some);
            }
            step *= 0.5;
        }

        // Reverse direction; the second reversal continues below the shrunk step
        start = if flip == 0 { -lambda } else { -step };
    }
    Ok(None)
}

/// Keep doubling an accepted step while the cost keeps dropping.
fn expand<F>(
    objective: &mut Objective<F>,
    params: &Array1<f64>,
    direction: &Array1<f64>,
    mut trial: Array1<f64>,
    mut trial_cost: f64,
    mut step: f64,
) -> Result<(Array1<f64>, f64, f64)>
where
    F: FnMut(&Array1<f64>) -> Result<f64>,
{
    for _ in 0..MAX_LINE_STEPS {
        let next = params + &(direction * (2.0 * step));
        let next_cost = objective.eval(&next)?;
        if next_cost >= trial_cost {
            break;
        }
        step *= 2.0;
        trial = next;
        trial_cost = next_cost;
    }
    Ok((trial, trial_cost, step))
}

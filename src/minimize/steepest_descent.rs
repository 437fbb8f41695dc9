//! Steepest descent
//!
//! Each iteration takes a central-difference gradient and moves against it,
//! choosing the step length with a backtracking line search: the step is
//! halved until the cost drops, then grown or shrunk further while it keeps
//! dropping. The accepted step length seeds the next iteration's search.

use ndarray::Array1;

use crate::error::Result;
use crate::minimize::finite_difference::gradient;
use crate::minimize::{ConvergenceStatus, MinimizeResult, Objective};

/// Maximum number of halvings (or doublings) in one line search.
const MAX_LINE_STEPS: usize = 50;

/// Plain steepest descent minimizer.
#[derive(Debug, Clone)]
pub struct SteepestDescent {
    /// Stop when the cost changes by less than this between iterations
    pub tolerance: f64,

    /// Maximum number of iterations
    pub max_steps: usize,
}

impl Default for SteepestDescent {
    fn default() -> Self {
        Self::new(1e-5, 100)
    }
}

impl SteepestDescent {
    /// Create a new minimizer
    pub fn new(tolerance: f64, max_steps: usize) -> Self {
        Self {
            tolerance,
            max_steps,
        }
    }

    /// Minimize `cost` starting from `initial`.
    ///
    /// Running out of steps is not an error: the best parameters so far are
    /// returned with [`ConvergenceStatus::MaxIterationsReached`].
    pub fn minimize<F>(&self, cost: F, initial: &Array1<f64>) -> Result<MinimizeResult>
    where
        F: FnMut(&Array1<f64>) -> Result<f64>,
    {
        let mut objective = Objective::new(cost);
        let mut params = initial.clone();
        let mut current = objective.eval(&params)?;
        let mut lambda = 1.0;
        let mut iterations = 0;
        let mut status = ConvergenceStatus::MaxIterationsReached;

        while iterations < self.max_steps {
            if current == 0.0 {
                status = ConvergenceStatus::FunctionValueConvergence;
                break;
            }
            iterations += 1;

            let grad = gradient(&mut |p: &Array1<f64>| objective.eval(p), &params)?;
            if grad.iter().all(|g| *g == 0.0) || grad.iter().any(|g| !g.is_finite()) {
                status = ConvergenceStatus::NoImprovingStep;
                break;
            }
            let direction = -grad;

            let Some((next, next_cost, step)) =
                line_search(&mut objective, &params, &direction, current, lambda)?
            else {
                status = ConvergenceStatus::NoImprovingStep;
                break;
            };

            let delta = current - next_cost;
            log::debug!(
                "Steepest descent step {}: cost {:e} -> {:e} (lambda {:e})",
                iterations,
                current,
                next_cost,
                step
            );
            params = next;
            current = next_cost;
            lambda = step;

            if delta.abs() < self.tolerance {
                status = ConvergenceStatus::FunctionValueConvergence;
                break;
            }
        }

        Ok(MinimizeResult {
            params,
            cost: current,
            iterations,
            func_evals: objective.evals(),
            status,
        })
    }
}

/// Backtracking line search along `direction` from `params`.
///
/// Returns the accepted point, its cost and the step length, or `None` if no
/// step within the halving budget lowers the cost.
fn line_search<F>(
    objective: &mut Objective<F>,
    params: &Array1<f64>,
    direction: &Array1<f64>,
    current: f64,
    lambda: f64,
) -> Result<Option<(Array1<f64>, f64, f64)>>
where
    F: FnMut(&Array1<f64>) -> Result<f64>,
{
    let mut step = lambda;
    let mut trial = params + &(direction * step);
    let mut best = objective.eval(&trial)?;

    let mut halvings = 0;
    while !(best < current) {
        if halvings == MAX_LINE_STEPS {
            return Ok(None);
        }
        step *= 0.5;
        trial = params + &(direction * step);
        best = objective.eval(&trial)?;
        halvings += 1;
    }

    // Grow the first step if it was accepted outright, otherwise keep shrinking
    let factor = if halvings == 0 { 2.0 } else { 0.5 };
    for _ in 0..MAX_LINE_STEPS {
        let next_step = step * factor;
        let next = params + &(direction * next_step);
        let next_cost = objective.eval(&next)?;
        if next_cost < best {
            step = next_step;
            trial = next;
            best = next_cost;
        } else {
            break;
        }
    }

    Ok(Some((trial, best, step)))
}

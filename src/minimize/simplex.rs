//! Nelder-Mead downhill simplex
//!
//! A generic implementation usable with any cost function. The initial
//! simplex is the starting point plus one vertex per parameter, perturbed by a
//! fixed relative step.

use ndarray::Array1;

use crate::error::{FitError, Result};
use crate::minimize::finite_difference::RELATIVE_STEP;
use crate::minimize::{ConvergenceStatus, MinimizeResult, Objective};

/// Nelder-Mead minimizer.
#[derive(Debug, Clone)]
pub struct NelderMead {
    /// Converged when the spread of vertex costs falls below this
    pub tolerance: f64,

    /// Maximum number of simplex moves
    pub max_iterations: usize,

    /// Relative perturbation used to build the initial simplex
    pub initial_step: f64,

    /// Reflection coefficient
    pub alpha: f64,

    /// Expansion coefficient
    pub gamma: f64,

    /// Contraction coefficient
    pub rho: f64,

    /// Shrink coefficient
    pub sigma: f64,
}

impl Default for NelderMead {
    fn default() -> Self {
        Self::new(1e-5, 100)
    }
}

impl NelderMead {
    /// Create a minimizer with the standard coefficients
    pub fn new(tolerance: f64, max_iterations: usize) -> Self {
        Self {
            tolerance,
            max_iterations,
            initial_step: RELATIVE_STEP,
            alpha: 1.0,
            gamma: 2.0,
            rho: 0.5,
            sigma: 0.5,
        }
    }

    /// Minimize `cost` starting from `initial`.
    ///
    /// # Errors
    ///
    /// [`FitError::Underdetermined`] if fewer than two parameters are given,
    /// or the first error returned by `cost`.
    pub fn minimize<F>(&self, cost: F, initial: &Array1<f64>) -> Result<MinimizeResult>
    where
        F: FnMut(&Array1<f64>) -> Result<f64>,
    {
        let n = initial.len();
        if n < 2 {
            return Err(FitError::Underdetermined { parameters: n });
        }

        let mut objective = Objective::new(cost);
        let mut vertices = Vec::with_capacity(n + 1);
        vertices.push(initial.clone());
        for j in 0..n {
            let mut vertex = initial.clone();
            vertex[j] += if initial[j] == 0.0 {
                self.initial_step
            } else {
                self.initial_step * initial[j]
            };
            vertices.push(vertex);
        }
        let mut costs = vertices
            .iter()
            .map(|v| objective.eval(v))
            .collect::<Result<Vec<f64>>>()?;

        let mut status = ConvergenceStatus::MaxIterationsReached;
        let mut iterations = 0;
        let mut indices: Vec<usize> = (0..=n).collect();

        while iterations < self.max_iterations {
            indices.sort_by(|&a, &b| costs[a].total_cmp(&costs[b]));
            let best = indices[0];
            let worst = indices[n];
            let second_worst = indices[n - 1];

            if costs[worst] - costs[best] < self.tolerance {
                status = ConvergenceStatus::SimplexConvergence;
                break;
            }
            iterations += 1;

            let mut centroid = Array1::<f64>::zeros(n);
            for &i in &indices[..n] {
                centroid += &vertices[i];
            }
            centroid /= n as f64;

            let reflected = &centroid + &((&centroid - &vertices[worst]) * self.alpha);
            let f_reflected = objective.eval(&reflected)?;

            if f_reflected < costs[best] {
                let expanded = &centroid + &((&reflected - &centroid) * self.gamma);
                let f_expanded = objective.eval(&expanded)?;
                if f_expanded < f_reflected {
                    vertices[worst] = expanded;
                    costs[worst] = f_expanded;
                } else {
                    vertices[worst] = reflected;
                    costs[worst] = f_reflected;
                }
                continue;
            }

            if f_reflected < costs[second_worst] {
                vertices[worst] = reflected;
                costs[worst] = f_reflected;
                continue;
            }

            let contracted = if f_reflected < costs[worst] {
                &centroid + &((&reflected - &centroid) * self.rho)
            } else {
                &centroid + &((&vertices[worst] - &centroid) * self.rho)
            };
            let f_contracted = objective.eval(&contracted)?;
            if f_contracted < costs[worst].min(f_reflected) {
                vertices[worst] = contracted;
                costs[worst] = f_contracted;
                continue;
            }

            let anchor = vertices[best].clone();
            for &i in &indices[1..] {
                vertices[i] = &anchor + &((&vertices[i] - &anchor) * self.sigma);
                costs[i] = objective.eval(&vertices[i])?;
            }
            log::debug!("Simplex shrink at iteration {}", iterations);
        }

        let best = (0..=n)
            .min_by(|&a, &b| costs[a].total_cmp(&costs[b]))
            .unwrap_or(0);

        Ok(MinimizeResult {
            params: vertices[best].clone(),
            cost: costs[best],
            iterations,
            func_evals: objective.evals(),
            status,
        })
    }
}

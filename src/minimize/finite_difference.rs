//! Finite difference gradients for the descent minimizers.

use ndarray::Array1;

use crate::error::Result;

/// Relative perturbation used for each parameter.
pub const RELATIVE_STEP: f64 = 0.01;

/// Perturbation applied to a parameter with the given value.
///
/// Scales with the value, falling back to [`RELATIVE_STEP`] at zero.
pub fn step_size(value: f64) -> f64 {
    if value == 0.0 {
        RELATIVE_STEP
    } else {
        (RELATIVE_STEP * value).abs()
    }
}

/// Compute the gradient of a scalar cost using central finite differences.
///
/// # Arguments
///
/// * `f` - The cost function
/// * `params` - The parameter values at which to evaluate the gradient
///
/// # Returns
///
/// * `Result<Array1<f64>>` - The gradient vector, or the first cost error
pub fn gradient<F>(f: &mut F, params: &Array1<f64>) -> Result<Array1<f64>>
where
    F: FnMut(&Array1<f64>) -> Result<f64>,
{
    let mut grad = Array1::zeros(params.len());

    for j in 0..params.len() {
        let delta = step_size(params[j]);

        let mut forward = params.clone();
        forward[j] += delta;
        let mut backward = params.clone();
        backward[j] -= delta;

        let f_forward = f(&forward)?;
        let f_backward = f(&backward)?;
        grad[j] = (f_forward - f_backward) / (2.0 * delta);
    }

    Ok(grad)
}

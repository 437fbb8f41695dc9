//! Fit reports

use std::collections::BTreeMap;
use std::fmt;

use crate::error::FitError;
use crate::minimize::ConvergenceStatus;

/// Result of minimizing one range.
#[derive(Debug, Clone)]
pub struct RangeFit {
    /// Fitted value of every fit variable
    pub values: BTreeMap<String, f64>,

    /// Final cost including the limit penalty
    pub cost: f64,

    /// Sum of squared errors at the fitted values
    pub sum_squared_error: f64,

    /// Number of non-missing cells
    pub cells: usize,

    /// Minimizer iterations
    pub iterations: usize,

    /// Cost function evaluations
    pub func_evals: usize,

    /// Why the minimizer stopped
    pub status: ConvergenceStatus,
}

impl RangeFit {
    /// Root mean squared error at the fitted values, `0.0` with no cells
    pub fn rmse(&self) -> f64 {
        if self.cells == 0 {
            0.0
        } else {
            (self.sum_squared_error / self.cells as f64).sqrt()
        }
    }
}

/// Outcome of one range within a fit.
#[derive(Debug)]
pub struct RangeResult {
    /// Position of the range in the data space
    pub index: usize,

    /// Inclusive abscissa index window
    pub x_window: (usize, usize),

    /// Inclusive slice index window
    pub z_window: (usize, usize),

    /// Fitted values, or the error that stopped this range
    pub outcome: Result<RangeFit, FitError>,
}

impl RangeResult {
    /// Whether this range was fitted
    pub fn is_fitted(&self) -> bool {
        self.outcome.is_ok()
    }

    /// The fit, if successful
    pub fn fit(&self) -> Option<&RangeFit> {
        self.outcome.as_ref().ok()
    }

    /// The error, if the range failed
    pub fn error(&self) -> Option<&FitError> {
        self.outcome.as_ref().err()
    }
}

/// Outcome of a complete fit.
#[derive(Debug, Default)]
pub struct FitReport {
    /// One entry per range, in range order
    pub ranges: Vec<RangeResult>,
}

impl FitReport {
    /// Number of ranges that were fitted
    pub fn n_fitted(&self) -> usize {
        self.ranges.iter().filter(|r| r.is_fitted()).count()
    }

    /// Number of ranges that failed
    pub fn n_failed(&self) -> usize {
        self.ranges.len() - self.n_fitted()
    }

    /// Whether every range was fitted
    pub fn is_success(&self) -> bool {
        self.n_failed() == 0
    }

    /// Range result by index
    pub fn range(&self, index: usize) -> Option<&RangeResult> {
        self.ranges.get(index)
    }

    /// Root mean squared error pooled over every cell of every fitted range
    pub fn overall_rmse(&self) -> f64 {
        let (sse, cells) = self
            .ranges
            .iter()
            .filter_map(RangeResult::fit)
            .fold((0.0, 0), |(sse, cells), fit| {
                (sse + fit.sum_squared_error, cells + fit.cells)
            });
        if cells == 0 {
            0.0
        } else {
            (sse / cells as f64).sqrt()
        }
    }
}

impl fmt::Display for FitReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Fit Report:")?;
        writeln!(
            f,
            "  Ranges: {} fitted, {} failed",
            self.n_fitted(),
            self.n_failed()
        )?;
        writeln!(f, "  Overall RMSE: {:.6e}", self.overall_rmse())?;

        for range in &self.ranges {
            write!(
                f,
                "  [{}] x {}..={}, z {}..={}: ",
                range.index, range.x_window.0, range.x_window.1, range.z_window.0, range.z_window.1
            )?;
            match &range.outcome {
                Ok(fit) => {
                    write!(f, "rmse {:.6e}", fit.rmse())?;
                    for (name, value) in &fit.values {
                        write!(f, ", {} = {:.6e}", name, value)?;
                    }
                    writeln!(f)?;
                }
                Err(err) => writeln!(f, "failed: {}", err)?,
            }
        }

        Ok(())
    }
}

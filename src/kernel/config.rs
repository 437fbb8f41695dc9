//! Configuration for the fit kernel.
//!
//! [`FitConfig`] holds the fit window selection for both axes, the partition
//! and seeding strategy, and the minimizer settings.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::{FitError, Result};
use crate::minimize::{MinimizationMethod, MinimizeOptions};

/// How the fit window along one axis is selected.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum RangeType {
    /// Every index whose axis value lies inside an absolute value window
    #[default]
    Absolute,

    /// One index only
    SingleIndex,

    /// An inclusive index window
    IndexRange,
}

impl RangeType {
    /// Every range type, in keyword order
    pub const ALL: [RangeType; 3] = [
        RangeType::Absolute,
        RangeType::SingleIndex,
        RangeType::IndexRange,
    ];

    /// Keyword naming this range type
    pub fn keyword(&self) -> &'static str {
        match self {
            RangeType::Absolute => "Absolute",
            RangeType::SingleIndex => "SingleIndex",
            RangeType::IndexRange => "IndexRange",
        }
    }
}

impl fmt::Display for RangeType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.keyword())
    }
}

impl FromStr for RangeType {
    type Err = FitError;

    fn from_str(s: &str) -> Result<Self> {
        Self::ALL
            .iter()
            .find(|range| range.keyword().eq_ignore_ascii_case(s.trim()))
            .copied()
            .ok_or_else(|| FitError::UnknownRangeType(s.to_string()))
    }
}

/// Fit window selection along one axis.
///
/// The absolute and index settings are kept independently so switching
/// [`RangeType`] never loses the other settings.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct AxisRange {
    /// Active selection mode
    pub range_type: RangeType,

    /// Lower value for [`RangeType::Absolute`]
    pub absolute_min: f64,

    /// Upper value for [`RangeType::Absolute`]
    pub absolute_max: f64,

    /// First index for [`RangeType::IndexRange`]
    pub index_min: usize,

    /// Last index for [`RangeType::IndexRange`]
    pub index_max: usize,

    /// Index for [`RangeType::SingleIndex`]
    pub index_single: usize,
}

impl AxisRange {
    /// Select every index in `min..=max`
    pub fn indices(min: usize, max: usize) -> Self {
        Self {
            range_type: RangeType::IndexRange,
            index_min: min,
            index_max: max,
            ..Self::default()
        }
    }

    /// Select a single index
    pub fn single(index: usize) -> Self {
        Self {
            range_type: RangeType::SingleIndex,
            index_single: index,
            ..Self::default()
        }
    }

    /// Select every index whose value lies in `min..=max`
    pub fn absolute(min: f64, max: f64) -> Self {
        Self {
            range_type: RangeType::Absolute,
            absolute_min: min,
            absolute_max: max,
            ..Self::default()
        }
    }

    /// Resolve to an inclusive `(first, last)` index window over the axis `values`.
    ///
    /// An absolute window takes the first index with a value at or above the
    /// minimum and the last index with a value at or below the maximum; the
    /// result may be inverted if no value lies inside the window, which the
    /// data space then rejects.
    ///
    /// # Examples
    ///
    /// ```
    /// use datafit::kernel::AxisRange;
    ///
    /// let values = [0.0, 0.5, 1.0, 1.5, 2.0];
    /// assert_eq!(AxisRange::absolute(0.4, 1.6).resolve(&values), (1, 3));
    /// assert_eq!(AxisRange::single(2).resolve(&values), (2, 2));
    /// ```
    pub fn resolve(&self, values: &[f64]) -> (usize, usize) {
        match self.range_type {
            RangeType::Absolute => {
                let last_index = values.len().saturating_sub(1);
                let first = (0..last_index)
                    .find(|&i| values[i] >= self.absolute_min)
                    .unwrap_or(last_index);
                let last = (1..=last_index)
                    .rev()
                    .find(|&i| values[i] <= self.absolute_max)
                    .unwrap_or(0);
                (first, last)
            }
            RangeType::SingleIndex => (self.index_single, self.index_single),
            RangeType::IndexRange => (self.index_min, self.index_max),
        }
    }

    /// Reset every setting to span the whole axis.
    pub fn set_defaults(&mut self, values: &[f64]) {
        let (lo, hi) = values.iter().fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), v| {
            (lo.min(*v), hi.max(*v))
        });
        if values.is_empty() {
            self.absolute_min = 0.0;
            self.absolute_max = 0.0;
        } else {
            self.absolute_min = lo;
            self.absolute_max = hi;
        }
        self.index_min = 0;
        self.index_max = values.len().saturating_sub(1);
        self.index_single = 0;
    }

    /// Clamp the index settings into an axis of length `len`.
    pub fn clamp(&mut self, len: usize) {
        let last = len.saturating_sub(1);
        self.index_max = self.index_max.min(last);
        self.index_min = self.index_min.min(self.index_max);
        self.index_single = self.index_single.min(last);
    }
}

/// Settings for a [`FitKernel`](crate::kernel::FitKernel).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FitConfig {
    /// Abscissa window
    pub x_range: AxisRange,

    /// Slice window
    pub z_range: AxisRange,

    /// Partition the window into one range per abscissa index
    pub orthogonal: bool,

    /// Fit the whole window as a single range
    pub global: bool,

    /// Seed each range from the previous range's fitted values
    pub roll_on: bool,

    /// Minimizer to use
    pub method: MinimizationMethod,

    /// Convergence tolerance. Default: 1e-5
    pub tolerance: f64,

    /// Step budget per range. Default: 100
    pub max_steps: usize,

    /// Multiplier of the squared limit violation in the cost penalty. Default: 1e3
    pub limit_strength: f64,

    /// Random trials per parameter for modified steepest descent. Default: 20
    pub random_trials: usize,

    /// Fit independent ranges on the rayon thread pool
    pub parallel: bool,
}

impl Default for FitConfig {
    fn default() -> Self {
        Self {
            x_range: AxisRange::default(),
            z_range: AxisRange::default(),
            orthogonal: false,
            global: false,
            roll_on: false,
            method: MinimizationMethod::ModifiedSteepestDescent,
            tolerance: 1e-5,
            max_steps: 100,
            limit_strength: 1e3,
            random_trials: 20,
            parallel: false,
        }
    }
}

impl FitConfig {
    /// Minimizer options with the given random trial interval
    pub fn minimize_options(&self, random_range: (f64, f64)) -> MinimizeOptions {
        MinimizeOptions {
            tolerance: self.tolerance,
            max_steps: self.max_steps,
            random_trials: self.random_trials,
            random_range,
        }
    }
}

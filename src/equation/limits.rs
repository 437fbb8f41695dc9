//! Variable limits
//!
//! Limits are soft: a value outside an enabled limit is never rejected, it only
//! makes the fit cost worse through a quadratic penalty.

use serde::{Deserialize, Serialize};

/// Optional lower and upper limits on a fitted value.
///
/// An absent limit is disabled. Serialized as `{"min": null | f64, "max": null | f64}`.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Limits {
    /// Minimum allowed value, if enabled
    pub min: Option<f64>,

    /// Maximum allowed value, if enabled
    pub max: Option<f64>,
}

impl Limits {
    /// Create limits, returning `None` if both are set and `min > max`.
    ///
    /// # Examples
    ///
    /// ```
    /// use datafit::equation::Limits;
    ///
    /// let limits = Limits::new(Some(0.0), Some(10.0)).unwrap();
    /// assert!(limits.contains(5.0));
    /// assert!(Limits::new(Some(2.0), Some(1.0)).is_none());
    /// ```
    pub fn new(min: Option<f64>, max: Option<f64>) -> Option<Self> {
        match (min, max) {
            (Some(lo), Some(hi)) if lo > hi => None,
            _ => Some(Self { min, max }),
        }
    }

    /// Limits with neither side enabled
    pub fn unbounded() -> Self {
        Self::default()
    }

    /// Whether `value` satisfies every enabled limit
    pub fn contains(&self, value: f64) -> bool {
        self.violation(value) == 0.0
    }

    /// Distance by which `value` lies outside the enabled limits (zero inside).
    pub fn violation(&self, value: f64) -> f64 {
        if let Some(min) = self.min {
            if value < min {
                return min - value;
            }
        }
        if let Some(max) = self.max {
            if value > max {
                return value - max;
            }
        }
        0.0
    }

    /// Quadratic barrier term `strength * violation^2`.
    pub fn penalty(&self, value: f64, strength: f64) -> f64 {
        let v = self.violation(value);
        strength * v * v
    }

    /// Clamp `value` into the enabled limits.
    pub fn clamp(&self, value: f64) -> f64 {
        let value = self.min.map_or(value, |min| value.max(min));
        self.max.map_or(value, |max| value.min(max))
    }
}

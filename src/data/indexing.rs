//! Index resolution rules for reference data
//!
//! An [`IndexingPolicy`] turns a position inside a data space range into an
//! absolute index into the source collection, along one [`Axis`].

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::{FitError, Result};

/// One of the two data axes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Axis {
    /// Abscissa (point index within a slice)
    X,

    /// Slice index
    Z,
}

impl fmt::Display for Axis {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Axis::X => write!(f, "x"),
            Axis::Z => write!(f, "z"),
        }
    }
}

/// How one axis index is resolved against the source data.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum IndexingPolicy {
    /// Same absolute index as the cell being calculated
    #[default]
    Normal,

    /// Always the given absolute index
    Fixed(usize),

    /// The cell's absolute index shifted by an offset
    Relative(isize),
}

impl IndexingPolicy {
    /// Resolve the cell at `local` (relative to a range starting at `start`)
    /// to an absolute index into a source axis of length `available`.
    ///
    /// Resolutions outside `[0, available)` yield [`FitError::OutOfRangeIndex`];
    /// callers treat that as "no contribution" rather than a fatal error.
    ///
    /// # Examples
    ///
    /// ```
    /// use datafit::data::{Axis, IndexingPolicy};
    ///
    /// let policy = IndexingPolicy::Relative(1);
    /// assert_eq!(policy.resolve(Axis::X, 0, 2, 5).unwrap(), 3);
    /// assert!(policy.resolve(Axis::X, 0, 4, 5).is_err());
    /// ```
    pub fn resolve(&self, axis: Axis, start: usize, local: usize, available: usize) -> Result<usize> {
        let current = start.saturating_add(local);
        let resolved = match *self {
            IndexingPolicy::Normal => Some(current),
            IndexingPolicy::Fixed(index) => Some(index),
            IndexingPolicy::Relative(offset) => current.checked_add_signed(offset),
        };

        match resolved {
            Some(index) if index < available => Ok(index),
            _ => Err(FitError::OutOfRangeIndex {
                axis,
                index: self.nominal_index(current),
                available,
            }),
        }
    }

    /// Signed index reported for an unresolvable cell, saturating at the `isize` limits
    fn nominal_index(&self, current: usize) -> isize {
        let signed = |index: usize| isize::try_from(index).unwrap_or(isize::MAX);
        match *self {
            IndexingPolicy::Normal => signed(current),
            IndexingPolicy::Fixed(index) => signed(index),
            IndexingPolicy::Relative(offset) => signed(current).saturating_add(offset),
        }
    }
}

impl fmt::Display for IndexingPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            IndexingPolicy::Normal => write!(f, "Normal"),
            IndexingPolicy::Fixed(index) => write!(f, "Fixed({})", index),
            IndexingPolicy::Relative(offset) => write!(f, "Relative({:+})", offset),
        }
    }
}

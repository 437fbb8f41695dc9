//! Source-data contract
//!
//! The fitting core reads source data only through [`SourceData`]: an abscissa
//! shared by every slice, and an ordered series of labeled slices carrying y
//! values and per-point kinds. [`DataProvider`] looks collections up by id.

use serde::{Deserialize, Serialize};

/// Whether a data point exists.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum PointKind {
    /// A real data point
    #[default]
    Normal,

    /// No data at this point; excluded from every error computation
    Missing,
}

/// Borrowed view of one slice of source data.
#[derive(Debug, Clone, Copy)]
pub struct SliceView<'a> {
    /// Slice name
    pub name: &'a str,

    /// Scalar z-label
    pub z: f64,

    /// y values, one per abscissa point
    pub y: &'a [f64],

    /// Point kinds, parallel to `y`
    pub point_kind: &'a [PointKind],
}

/// Narrow read-only accessor over a 2D data collection.
pub trait SourceData {
    /// Identifier of this collection
    fn id(&self) -> &str;

    /// Number of slices
    fn slice_count(&self) -> usize;

    /// Abscissa shared by every slice
    fn abscissa(&self) -> &[f64];

    /// Number of abscissa points
    fn abscissa_length(&self) -> usize {
        self.abscissa().len()
    }

    /// Slice at `index`, if it exists
    fn slice(&self, index: usize) -> Option<SliceView<'_>>;

    /// Monotonic counter bumped on every data change
    fn data_version(&self) -> u64;

    /// Index of the first slice with the given name
    fn slice_index(&self, name: &str) -> Option<usize> {
        (0..self.slice_count()).find(|&i| self.slice(i).map_or(false, |s| s.name == name))
    }
}

/// Lookup of source collections by id.
pub trait DataProvider {
    /// Collection with the given id, if known
    fn collection(&self, id: &str) -> Option<&dyn SourceData>;
}

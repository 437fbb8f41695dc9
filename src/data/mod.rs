//! # Data Spaces
//!
//! Source data access and the partitioning of a fit window into independent
//! ranges.
//!
//! ## Core Components
//!
//! - [`SourceData`] / [`DataProvider`]: the read-only contract over source collections
//! - [`Collection`] / [`Collections`]: in-memory implementations of that contract
//! - [`IndexingPolicy`]: how an axis index is resolved (normal, fixed, relative)
//! - [`DataSpaceRange`]: one rectangular window of reference, calculated and point-kind grids
//! - [`DataSpace`]: the ordered ranges covering a window, rebuilt or resized on demand

pub mod collection;
pub mod indexing;
pub mod range;
pub mod source;
pub mod space;

pub use collection::{Collection, Collections, DataSlice};
pub use indexing::{Axis, IndexingPolicy};
pub use range::{DataSpaceRange, ReferenceSample};
pub use source::{DataProvider, PointKind, SliceView, SourceData};
pub use space::{validate_window, DataSpace};

//! # datafit
//!
//! `datafit` fits a user-supplied scalar equation to rectangular grids of data:
//! an abscissa crossed with a series of labeled slices, each slice tagged with
//! a scalar z value.
//!
//! The library provides:
//! - Partitioning of a fit window into independent ranges (per slice, per
//!   abscissa point, or one global range)
//! - Equation variables with soft limits, and reference variables bound to
//!   other data through indexing policies
//! - Steepest descent, modified steepest descent and Nelder-Mead simplex
//!   minimizers working on a scalar cost
//! - A built-in expression evaluator for equation text
//!
//! ## Basic Usage
//!
//! ```
//! use datafit::data::Collection;
//! use datafit::FitKernel;
//!
//! let mut data = Collection::new("data", vec![0.0, 1.0, 2.0, 3.0, 4.0]);
//! data.add_slice("first", 0.0, vec![1.0, 3.0, 5.0, 7.0, 9.0]).unwrap();
//!
//! let mut kernel = FitKernel::new();
//! kernel.set_equation("a*x + b").unwrap();
//! kernel.set_source_collection(&data);
//! kernel.config_mut().tolerance = 1e-8;
//! kernel.config_mut().max_steps = 500;
//!
//! let report = kernel.fit(&data, false).unwrap();
//! assert!(report.is_success());
//! ```

// Public modules
pub mod data;
pub mod equation;
pub mod error;
pub mod kernel;
pub mod minimize;

// Re-exports for convenience
pub use data::{Collection, DataSpace, DataSpaceRange, IndexingPolicy, PointKind};
pub use equation::{Equation, EquationVariable, Expression, ReferenceVariable};
pub use error::{FitError, Result};
pub use kernel::{FitConfig, FitKernel, FitReport, KernelState};
pub use minimize::MinimizationMethod;

/// Version of the library
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

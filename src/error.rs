use thiserror::Error;

use crate::data::Axis;
use crate::equation::ExpressionError;

/// Error types for the datafit library.
#[derive(Error, Debug)]
pub enum FitError {
    /// Requested index window does not fit inside the source data.
    #[error("Invalid {axis} index range {min}..={max} (source has {available} entries)")]
    RangeError {
        axis: Axis,
        min: usize,
        max: usize,
        available: usize,
    },

    /// The equation text could not be parsed.
    #[error("Failed to parse equation: {0}")]
    ParseError(ExpressionError),

    /// The equation failed to evaluate for a specific cell.
    #[error("Equation evaluation failed at x = {x}, z = {z}: {source}")]
    EvalError {
        x: f64,
        z: f64,
        #[source]
        source: ExpressionError,
    },

    /// Simplex minimization needs at least two free parameters.
    #[error("Simplex minimization requires at least 2 free parameters, got {parameters}")]
    Underdetermined { parameters: usize },

    /// An indexing policy resolved outside the source data.
    #[error("Resolved {axis} index {index} is out of range ({available} entries available)")]
    OutOfRangeIndex {
        axis: Axis,
        index: isize,
        available: usize,
    },

    /// Minimum limit lies above the maximum limit.
    #[error("Invalid limits for '{name}': min ({min}) must not exceed max ({max})")]
    InvalidLimits { name: String, min: f64, max: f64 },

    /// No used equation variable is enabled for fitting.
    #[error("No variables to fit")]
    NoVariablesToFit,

    /// No valid equation has been set.
    #[error("No valid equation has been set")]
    InvalidEquation,

    /// Attempt to use one of the reserved names `x` or `z`.
    #[error("Name '{0}' is reserved")]
    ReservedName(String),

    /// A reference variable with this name already exists.
    #[error("A reference named '{0}' already exists")]
    ReferenceExists(String),

    /// Reference variable lookup failed.
    #[error("Reference '{0}' not found")]
    ReferenceNotFound(String),

    /// Collection lookup failed.
    #[error("Collection '{0}' not found")]
    CollectionNotFound(String),

    /// Unrecognized minimization method keyword.
    #[error("Unknown minimization method '{0}'")]
    UnknownMethod(String),

    /// Unrecognized range type keyword.
    #[error("Unknown range type '{0}'")]
    UnknownRangeType(String),

    /// No source collection has been assigned to the fit.
    #[error("No source collection has been set")]
    NoSourceCollection,

    /// Mismatched lengths between related arrays.
    #[error("Dimension mismatch: {0}")]
    DimensionMismatch(String),

    /// Invalid state in the algorithm or data structure.
    #[error("Invalid state: {0}")]
    InvalidState(String),

    /// I/O error wrapper.
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    /// JSON serialization/deserialization error.
    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),
}

/// Result type alias for datafit operations.
pub type Result<T> = std::result::Result<T, FitError>;

impl From<ExpressionError> for FitError {
    fn from(err: ExpressionError) -> Self {
        FitError::ParseError(err)
    }
}

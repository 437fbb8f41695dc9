//! # Equations and Variables
//!
//! This module holds everything the fit kernel knows about the equation being
//! fitted: the evaluator contract ([`Equation`]), the built-in nom-based
//! evaluator ([`Expression`]), and the two kinds of variable binding.
//!
//! - [`EquationVariable`]: a fittable (or fixed) scalar with optional limits
//! - [`ReferenceVariable`]: a read-only value pulled from another part of the data
//!   through a pair of [`IndexingPolicy`](crate::data::IndexingPolicy) rules
//!
//! The reserved identifiers `x` and `z` are always equation inputs and never
//! become variables.

pub mod expression;
pub mod limits;
pub mod variables;

use std::collections::{BTreeSet, HashMap};

pub use expression::{Bindings, Expression, ExpressionError, Function, Node, Operator};
pub use limits::Limits;
pub use variables::{EquationVariable, ReferenceVariable};

/// Identifiers bound to the abscissa and slice label of each cell.
pub const RESERVED_NAMES: [&str; 2] = ["x", "z"];

/// Returns true if `name` is one of the reserved identifiers.
pub fn is_reserved(name: &str) -> bool {
    RESERVED_NAMES.contains(&name)
}

/// Contract for the evaluator used by the fit kernel.
///
/// The kernel never inspects expression internals: it parses text once, asks
/// for the free identifiers, and evaluates the result for one binding map per
/// data cell.
pub trait Equation: Sized + Send + Sync {
    /// Parse equation text.
    fn parse(text: &str) -> Result<Self, ExpressionError>;

    /// Names of all free identifiers, including `x` and `z` if present.
    fn free_variable_names(&self) -> BTreeSet<String>;

    /// Evaluate for the given bindings.
    fn evaluate(&self, bindings: &HashMap<String, f64>) -> Result<f64, ExpressionError>;
}

impl Equation for Expression {
    fn parse(text: &str) -> Result<Self, ExpressionError> {
        Expression::parse(text)
    }

    fn free_variable_names(&self) -> BTreeSet<String> {
        self.identifiers().clone()
    }

    fn evaluate(&self, bindings: &HashMap<String, f64>) -> Result<f64, ExpressionError> {
        Expression::evaluate(self, bindings)
    }
}

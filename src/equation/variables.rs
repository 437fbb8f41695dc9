//! Variable bindings
//!
//! An [`EquationVariable`] is a scalar the fitter may vary (or hold fixed).
//! A [`ReferenceVariable`] instead streams values out of source data through
//! a pair of indexing policies, using its own reference-only [`DataSpace`]
//! mirroring the parent fit.

use serde::{Deserialize, Serialize};

use crate::data::{DataProvider, DataSpace, DataSpaceRange, IndexingPolicy};
use crate::equation::limits::Limits;
use crate::error::{FitError, Result};

/// A named scalar appearing in the equation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EquationVariable {
    /// Identifier as it appears in the equation
    pub name: String,

    /// Current value; holds the last fitted value after a fit
    pub value: f64,

    /// Whether the minimizer may vary this variable
    pub fit: bool,

    limits: Limits,

    /// Whether the current equation references this variable
    #[serde(default)]
    pub used: bool,
}

impl EquationVariable {
    /// Create a fittable variable with value `1.0` and no limits
    ///
    /// # Examples
    ///
    /// ```
    /// use datafit::equation::EquationVariable;
    ///
    /// let var = EquationVariable::new("A1");
    /// assert_eq!(var.value, 1.0);
    /// assert!(var.fit);
    /// assert_eq!(var.min_limit(), None);
    /// ```
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            value: 1.0,
            fit: true,
            limits: Limits::unbounded(),
            used: false,
        }
    }

    /// Limits on the fitted value
    pub fn limits(&self) -> Limits {
        self.limits
    }

    /// Lower limit, if enabled
    pub fn min_limit(&self) -> Option<f64> {
        self.limits.min
    }

    /// Upper limit, if enabled
    pub fn max_limit(&self) -> Option<f64> {
        self.limits.max
    }

    /// Replace the limits. Fails if both are enabled and `min > max`.
    pub fn set_limits(&mut self, min: Option<f64>, max: Option<f64>) -> Result<()> {
        self.limits = Limits::new(min, max).ok_or_else(|| FitError::InvalidLimits {
            name: self.name.clone(),
            min: min.unwrap_or(f64::NEG_INFINITY),
            max: max.unwrap_or(f64::INFINITY),
        })?;
        Ok(())
    }

    /// Whether this variable is both referenced and free
    pub fn is_fitted(&self) -> bool {
        self.used && self.fit
    }
}

/// An equation input bound to values in another part of the data.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReferenceVariable {
    /// Identifier as it appears in the equation
    pub name: String,

    /// Collection to read from; the parent fit's source when `None`
    pub source_collection: Option<String>,

    /// Resolution of the abscissa index
    pub x_policy: IndexingPolicy,

    /// Resolution of the slice index
    pub z_policy: IndexingPolicy,

    /// Slice to read from by name, overriding `z_policy`
    pub z_slice_name: Option<String>,

    /// Whether the current equation references this variable
    #[serde(default)]
    pub used: bool,

    #[serde(skip)]
    space: DataSpace,

    #[serde(skip)]
    cursor: usize,
}

impl ReferenceVariable {
    /// Create a reference reading the same cell of the parent fit's source
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            source_collection: None,
            x_policy: IndexingPolicy::Normal,
            z_policy: IndexingPolicy::Normal,
            z_slice_name: None,
            used: false,
            space: DataSpace::new(),
            cursor: 0,
        }
    }

    /// Rebuild the private data space to mirror `parent` and fill it with
    /// resolved reference values.
    ///
    /// `parent_source` names the fit's own collection and is used when no
    /// explicit source collection is set. Unresolvable cells are zeroed with
    /// a warning. The cursor is reset to the first range.
    pub fn initialise_data_space(
        &mut self,
        provider: &dyn DataProvider,
        parent_source: &str,
        parent: &DataSpace,
    ) -> Result<()> {
        let id = self.source_collection.as_deref().unwrap_or(parent_source);
        let source = provider
            .collection(id)
            .ok_or_else(|| FitError::CollectionNotFound(id.to_string()))?;

        self.space.initialise_from(parent, source, true)?;
        self.cursor = 0;

        let z_policy = match &self.z_slice_name {
            None => Some(self.z_policy),
            Some(slice_name) => match source.slice_index(slice_name) {
                Some(index) => Some(IndexingPolicy::Fixed(index)),
                None => {
                    log::warn!(
                        "Reference '{}': no slice named '{}' in collection '{}'; contributing zero",
                        self.name,
                        slice_name,
                        id
                    );
                    None
                }
            },
        };

        let mut zeroed = 0;
        for range in self.space.ranges_mut() {
            match z_policy {
                Some(z_policy) => zeroed += range.copy_values(source, self.x_policy, z_policy),
                None => range.zero_reference(),
            }
        }
        if zeroed > 0 {
            log::warn!(
                "Reference '{}' ({}, {}): {} cell(s) resolved outside '{}'",
                self.name,
                self.x_policy,
                self.z_policy,
                zeroed,
                id
            );
        }

        Ok(())
    }

    /// The reference-only data space
    pub fn data_space(&self) -> &DataSpace {
        &self.space
    }

    /// Move the cursor back to the first range
    pub fn reset_cursor(&mut self) {
        self.cursor = 0;
    }

    /// Step the cursor to the next range
    pub fn advance(&mut self) {
        self.cursor += 1;
    }

    /// Cursor position
    pub fn cursor(&self) -> usize {
        self.cursor
    }

    /// Range under the cursor
    pub fn current_range(&self) -> Option<&DataSpaceRange> {
        self.space.range(self.cursor)
    }
}

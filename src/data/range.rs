//! Data space ranges
//!
//! A [`DataSpaceRange`] is one rectangular window of (x-index, z-index) cells
//! extracted from a source collection and fitted as one optimization problem.
//! All grids are indexed `[[point, slice]]`.

use ndarray::Array2;
use std::collections::{BTreeMap, HashMap};

use crate::data::indexing::{Axis, IndexingPolicy};
use crate::data::source::{PointKind, SourceData};
use crate::equation::Equation;
use crate::error::{FitError, Result};

/// Value streamed into the equation from a reference variable's matching range.
#[derive(Debug, Clone, Copy)]
pub struct ReferenceSample<'a> {
    /// Identifier the value is bound to
    pub name: &'a str,

    /// Reference range with the same shape as the range being calculated
    pub range: &'a DataSpaceRange,
}

/// One rectangular sub-grid of source data.
#[derive(Debug, Clone)]
pub struct DataSpaceRange {
    x_start: usize,
    x_end: usize,
    z_start: usize,
    z_end: usize,
    reference_only: bool,
    x: Vec<f64>,
    z: Vec<f64>,
    y_reference: Array2<f64>,
    y_point_kind: Array2<PointKind>,
    y_calculated: Array2<f64>,
    fitted_values: BTreeMap<String, f64>,
}

impl DataSpaceRange {
    /// Extract the window `x_start..=x_end` by `z_start..=z_end` from `source`.
    ///
    /// With `reference_only` the point-kind and calculated grids are not
    /// allocated and the range can only serve reference values.
    pub fn new(
        source: &dyn SourceData,
        x_start: usize,
        x_end: usize,
        z_start: usize,
        z_end: usize,
        reference_only: bool,
    ) -> Result<Self> {
        let mut range = Self {
            x_start,
            x_end,
            z_start,
            z_end,
            reference_only,
            x: Vec::new(),
            z: Vec::new(),
            y_reference: Array2::zeros((0, 0)),
            y_point_kind: Array2::from_elem((0, 0), PointKind::Normal),
            y_calculated: Array2::zeros((0, 0)),
            fitted_values: BTreeMap::new(),
        };
        range.load(source)?;
        Ok(range)
    }

    /// (Re)load x, z, reference y and point kinds from `source`. Fitted values are kept.
    fn load(&mut self, source: &dyn SourceData) -> Result<()> {
        let abscissa = source.abscissa();
        if self.x_start > self.x_end || self.x_end >= abscissa.len() {
            return Err(FitError::RangeError {
                axis: Axis::X,
                min: self.x_start,
                max: self.x_end,
                available: abscissa.len(),
            });
        }
        if self.z_start > self.z_end || self.z_end >= source.slice_count() {
            return Err(FitError::RangeError {
                axis: Axis::Z,
                min: self.z_start,
                max: self.z_end,
                available: source.slice_count(),
            });
        }

        let n_points = self.x_end - self.x_start + 1;
        let n_slices = self.z_end - self.z_start + 1;

        self.x = abscissa[self.x_start..=self.x_end].to_vec();
        self.z = Vec::with_capacity(n_slices);
        self.y_reference = Array2::zeros((n_points, n_slices));
        if self.reference_only {
            self.y_point_kind = Array2::from_elem((0, 0), PointKind::Normal);
            self.y_calculated = Array2::zeros((0, 0));
        } else {
            self.y_point_kind = Array2::from_elem((n_points, n_slices), PointKind::Normal);
            self.y_calculated = Array2::zeros((n_points, n_slices));
        }

        for n in 0..n_slices {
            let slice = source.slice(self.z_start + n).ok_or_else(|| FitError::RangeError {
                axis: Axis::Z,
                min: self.z_start,
                max: self.z_end,
                available: source.slice_count(),
            })?;
            let short_slice = || {
                FitError::DimensionMismatch(format!(
                    "slice '{}' is shorter than the abscissa ({} points)",
                    slice.name,
                    abscissa.len()
                ))
            };
            self.z.push(slice.z);
            for i in 0..n_points {
                let index = self.x_start + i;
                self.y_reference[[i, n]] = *slice.y.get(index).ok_or_else(short_slice)?;
                if !self.reference_only {
                    self.y_point_kind[[i, n]] = *slice.point_kind.get(index).ok_or_else(short_slice)?;
                }
            }
        }

        Ok(())
    }

    /*
     * Target data
     */

    /// First abscissa index in the source
    pub fn x_start(&self) -> usize {
        self.x_start
    }

    /// Last abscissa index in the source
    pub fn x_end(&self) -> usize {
        self.x_end
    }

    /// First slice index in the source
    pub fn z_start(&self) -> usize {
        self.z_start
    }

    /// Last slice index in the source
    pub fn z_end(&self) -> usize {
        self.z_end
    }

    /// Number of abscissa points
    pub fn n_points(&self) -> usize {
        self.x.len()
    }

    /// Number of slices
    pub fn n_slices(&self) -> usize {
        self.z.len()
    }

    /// Whether only reference values are held
    pub fn is_reference_only(&self) -> bool {
        self.reference_only
    }

    /// Abscissa values of the range
    pub fn x(&self) -> &[f64] {
        &self.x
    }

    /// z-labels of the range
    pub fn z(&self) -> &[f64] {
        &self.z
    }

    /// First and last x value
    pub fn x_bounds(&self) -> (f64, f64) {
        (
            self.x.first().copied().unwrap_or(0.0),
            self.x.last().copied().unwrap_or(0.0),
        )
    }

    /// First and last z value
    pub fn z_bounds(&self) -> (f64, f64) {
        (
            self.z.first().copied().unwrap_or(0.0),
            self.z.last().copied().unwrap_or(0.0),
        )
    }

    /*
     * Values
     */

    /// Reference y value at local `(point, slice)`
    pub fn reference_y(&self, point: usize, slice: usize) -> f64 {
        self.y_reference[[point, slice]]
    }

    /// Calculated y value at local `(point, slice)`
    pub fn calculated_y(&self, point: usize, slice: usize) -> f64 {
        self.y_calculated[[point, slice]]
    }

    /// Point kind at local `(point, slice)`
    pub fn point_kind(&self, point: usize, slice: usize) -> PointKind {
        self.y_point_kind
            .get([point, slice])
            .copied()
            .unwrap_or(PointKind::Normal)
    }

    /// Reference grid, `[[point, slice]]`
    pub fn reference_grid(&self) -> &Array2<f64> {
        &self.y_reference
    }

    /// Calculated grid, `[[point, slice]]` (empty for reference-only ranges)
    pub fn calculated_grid(&self) -> &Array2<f64> {
        &self.y_calculated
    }

    /// Smallest reference value
    pub fn reference_y_min(&self) -> f64 {
        self.y_reference
            .iter()
            .copied()
            .reduce(f64::min)
            .unwrap_or(0.0)
    }

    /// Largest reference value
    pub fn reference_y_max(&self) -> f64 {
        self.y_reference
            .iter()
            .copied()
            .reduce(f64::max)
            .unwrap_or(0.0)
    }

    /// Refill the reference grid from `source`, resolving every cell through the
    /// given policies.
    ///
    /// Cells whose indices resolve outside the source are logged and left at
    /// zero. Returns the number of such cells.
    pub fn copy_values(
        &mut self,
        source: &dyn SourceData,
        x_policy: IndexingPolicy,
        z_policy: IndexingPolicy,
    ) -> usize {
        self.y_reference.fill(0.0);
        let n_points = self.n_points();
        let n_slices = self.n_slices();
        let n_abscissa = source.abscissa_length();
        let mut zeroed = 0;

        let x_indices: Vec<Option<usize>> = (0..n_points)
            .map(|i| match x_policy.resolve(Axis::X, self.x_start, i, n_abscissa) {
                Ok(index) => Some(index),
                Err(err) => {
                    log::warn!("{} when copying reference values; contributing zero", err);
                    None
                }
            })
            .collect();

        for n in 0..n_slices {
            let slice = match z_policy.resolve(Axis::Z, self.z_start, n, source.slice_count()) {
                Ok(index) => source.slice(index),
                Err(err) => {
                    log::warn!("{} when copying reference values; contributing zero", err);
                    None
                }
            };
            let Some(slice) = slice else {
                zeroed += n_points;
                continue;
            };

            for (i, x_index) in x_indices.iter().enumerate() {
                match (*x_index).and_then(|index| slice.y.get(index)) {
                    Some(value) => self.y_reference[[i, n]] = *value,
                    None => zeroed += 1,
                }
            }
        }

        zeroed
    }

    /// Set every reference value to zero
    pub fn zero_reference(&mut self) {
        self.y_reference.fill(0.0);
    }

    /// Evaluate `equation` for every non-missing cell, storing the results in
    /// the calculated grid.
    ///
    /// `bindings` must already hold the values of every equation variable; `x`,
    /// `z` and each reference are bound per cell. The first evaluation failure
    /// aborts the calculation.
    pub fn calculate_values<E: Equation>(
        &mut self,
        equation: &E,
        bindings: &mut HashMap<String, f64>,
        references: &[ReferenceSample<'_>],
    ) -> Result<()> {
        if self.reference_only {
            return Err(FitError::InvalidState(
                "cannot calculate values in a reference-only range".to_string(),
            ));
        }
        for reference in references {
            if reference.range.n_points() != self.n_points()
                || reference.range.n_slices() != self.n_slices()
            {
                return Err(FitError::DimensionMismatch(format!(
                    "reference '{}' covers {}x{} cells but the range has {}x{}",
                    reference.name,
                    reference.range.n_points(),
                    reference.range.n_slices(),
                    self.n_points(),
                    self.n_slices()
                )));
            }
        }

        for n in 0..self.n_slices() {
            let z = self.z[n];
            set_binding(bindings, "z", z);

            for i in 0..self.n_points() {
                if self.y_point_kind[[i, n]] == PointKind::Missing {
                    continue;
                }

                let x = self.x[i];
                set_binding(bindings, "x", x);
                for reference in references {
                    set_binding(bindings, reference.name, reference.range.reference_y(i, n));
                }

                self.y_calculated[[i, n]] = equation
                    .evaluate(bindings)
                    .map_err(|source| FitError::EvalError { x, z, source })?;
            }
        }

        Ok(())
    }

    /// Number of non-missing cells
    pub fn cell_count(&self) -> usize {
        self.y_point_kind
            .iter()
            .filter(|&&kind| kind == PointKind::Normal)
            .count()
    }

    /// Sum of squared differences between reference and calculated values over
    /// non-missing cells
    pub fn sum_squared_error(&self) -> f64 {
        self.y_point_kind
            .indexed_iter()
            .filter(|(_, kind)| **kind == PointKind::Normal)
            .map(|(idx, _)| {
                let diff = self.y_reference[idx] - self.y_calculated[idx];
                diff * diff
            })
            .sum()
    }

    /// Root mean squared error over non-missing cells, `0.0` when there are none
    pub fn root_mean_squared_error(&self) -> f64 {
        let cells = self.cell_count();
        if cells == 0 {
            return 0.0;
        }
        (self.sum_squared_error() / cells as f64).sqrt()
    }

    /*
     * Fitted values
     */

    /// Add or replace a named fitted value
    pub fn set_fitted_value(&mut self, name: &str, value: f64) {
        self.fitted_values.insert(name.to_string(), value);
    }

    /// Named fitted value, if one has been stored
    pub fn fitted_value(&self, name: &str) -> Option<f64> {
        self.fitted_values.get(name).copied()
    }

    /// All fitted values
    pub fn fitted_values(&self) -> &BTreeMap<String, f64> {
        &self.fitted_values
    }

    /// Forget all fitted values
    pub fn clear_fitted_values(&mut self) {
        self.fitted_values.clear();
    }

    pub(crate) fn take_fitted_values(&mut self) -> BTreeMap<String, f64> {
        std::mem::take(&mut self.fitted_values)
    }

    pub(crate) fn restore_fitted_values(&mut self, values: BTreeMap<String, f64>) {
        self.fitted_values = values;
    }
}

fn set_binding(bindings: &mut HashMap<String, f64>, name: &str, value: f64) {
    match bindings.get_mut(name) {
        Some(slot) => *slot = value,
        None => {
            bindings.insert(name.to_string(), value);
        }
    }
}

//! Data spaces
//!
//! A [`DataSpace`] partitions a window of a source collection into
//! [`DataSpaceRange`]s, one per independent fitting problem.

use std::collections::{BTreeMap, HashMap};

use crate::data::collection::Collection;
use crate::data::indexing::Axis;
use crate::data::range::DataSpaceRange;
use crate::data::source::{PointKind, SourceData};
use crate::error::{FitError, Result};

/// Ordered collection of ranges over one window of a source collection.
#[derive(Debug, Clone, Default)]
pub struct DataSpace {
    source_id: Option<String>,
    source_version: u64,
    x_start: usize,
    x_end: usize,
    z_start: usize,
    z_end: usize,
    orthogonal: bool,
    global: bool,
    ranges: Vec<DataSpaceRange>,
}

/// Check that `x_min..=x_max` by `z_min..=z_max` lies inside `source`.
pub fn validate_window(
    source: &dyn SourceData,
    x_min: usize,
    x_max: usize,
    z_min: usize,
    z_max: usize,
) -> Result<()> {
    let n_abscissa = source.abscissa_length();
    if x_min > x_max || x_max >= n_abscissa {
        return Err(FitError::RangeError {
            axis: Axis::X,
            min: x_min,
            max: x_max,
            available: n_abscissa,
        });
    }
    let n_slices = source.slice_count();
    if z_min > z_max || z_max >= n_slices {
        return Err(FitError::RangeError {
            axis: Axis::Z,
            min: z_min,
            max: z_max,
            available: n_slices,
        });
    }
    Ok(())
}

impl DataSpace {
    /// Create an empty data space
    pub fn new() -> Self {
        Self::default()
    }

    /// Partition the window `x_min..=x_max` by `z_min..=z_max` of `source`.
    ///
    /// If `global`, a single range spans the window; otherwise if `orthogonal`
    /// there is one range per x index, else one range per slice.
    ///
    /// The space is rebuilt from scratch when the source, its data version, or
    /// the orthogonal/global flags change. When only the bounds move, ranges
    /// that survive keep their fitted values. On error the space is unchanged.
    pub fn initialise(
        &mut self,
        source: &dyn SourceData,
        x_min: usize,
        x_max: usize,
        z_min: usize,
        z_max: usize,
        orthogonal: bool,
        global: bool,
    ) -> Result<()> {
        validate_window(source, x_min, x_max, z_min, z_max)?;

        let from_scratch = self.ranges.is_empty()
            || self.source_id.as_deref() != Some(source.id())
            || self.source_version != source.data_version()
            || self.orthogonal != orthogonal
            || self.global != global;

        let windows = partition(x_min, x_max, z_min, z_max, orthogonal, global);
        let mut ranges = Vec::with_capacity(windows.len());
        for (xs, xe, zs, ze) in windows {
            ranges.push(DataSpaceRange::new(source, xs, xe, zs, ze, false)?);
        }

        if !from_scratch {
            let mut preserved: HashMap<usize, BTreeMap<String, f64>> = self
                .ranges
                .iter_mut()
                .map(|r| (range_key(r, orthogonal, global), r.take_fitted_values()))
                .collect();
            for range in ranges.iter_mut() {
                if let Some(values) = preserved.remove(&range_key(range, orthogonal, global)) {
                    range.restore_fitted_values(values);
                }
            }
        }

        let abscissa = source.abscissa();
        let z_first = source.slice(z_min).map_or(0.0, |s| s.z);
        let z_last = source.slice(z_max).map_or(0.0, |s| s.z);
        log::info!(
            "Setting up {} ({}) data over {:e} < x < {:e} and {:e} < z < {:e}: {} range(s){}",
            if orthogonal { "orthogonal" } else { "normal" },
            if orthogonal { "ZY" } else { "XY" },
            abscissa[x_min],
            abscissa[x_max],
            z_first,
            z_last,
            ranges.len(),
            if from_scratch { "" } else { ", fitted values kept" }
        );

        self.source_id = Some(source.id().to_string());
        self.source_version = source.data_version();
        self.x_start = x_min;
        self.x_end = x_max;
        self.z_start = z_min;
        self.z_end = z_max;
        self.orthogonal = orthogonal;
        self.global = global;
        self.ranges = ranges;
        Ok(())
    }

    /// Mirror the partition of `other` exactly, reading data from `source`.
    ///
    /// With `reference_only`, ranges hold reference values only.
    pub fn initialise_from(
        &mut self,
        other: &DataSpace,
        source: &dyn SourceData,
        reference_only: bool,
    ) -> Result<()> {
        if other.ranges.is_empty() {
            return Err(FitError::InvalidState(
                "cannot mirror an uninitialised data space".to_string(),
            ));
        }
        validate_window(source, other.x_start, other.x_end, other.z_start, other.z_end)?;

        let mut ranges = Vec::with_capacity(other.ranges.len());
        for range in &other.ranges {
            ranges.push(DataSpaceRange::new(
                source,
                range.x_start(),
                range.x_end(),
                range.z_start(),
                range.z_end(),
                reference_only,
            )?);
        }

        self.source_id = Some(source.id().to_string());
        self.source_version = source.data_version();
        self.x_start = other.x_start;
        self.x_end = other.x_end;
        self.z_start = other.z_start;
        self.z_end = other.z_end;
        self.orthogonal = other.orthogonal;
        self.global = other.global;
        self.ranges = ranges;
        Ok(())
    }

    /// Drop every range
    pub fn clear(&mut self) {
        self.ranges.clear();
        self.source_id = None;
    }

    /// Id of the source collection, if initialised
    pub fn source_id(&self) -> Option<&str> {
        self.source_id.as_deref()
    }

    /// Number of ranges
    pub fn n_ranges(&self) -> usize {
        self.ranges.len()
    }

    /// All ranges, in order
    pub fn ranges(&self) -> &[DataSpaceRange] {
        &self.ranges
    }

    /// All ranges, mutable
    pub fn ranges_mut(&mut self) -> &mut [DataSpaceRange] {
        &mut self.ranges
    }

    /// Range at `index`
    pub fn range(&self, index: usize) -> Option<&DataSpaceRange> {
        self.ranges.get(index)
    }

    /// Mutable range at `index`
    pub fn range_mut(&mut self, index: usize) -> Option<&mut DataSpaceRange> {
        self.ranges.get_mut(index)
    }

    /// Whether the ranges are sliced along z
    pub fn is_orthogonal(&self) -> bool {
        self.orthogonal
    }

    /// Whether the window is a single range
    pub fn is_global(&self) -> bool {
        self.global
    }

    /// Abscissa index window `(start, end)`
    pub fn x_window(&self) -> (usize, usize) {
        (self.x_start, self.x_end)
    }

    /// Slice index window `(start, end)`
    pub fn z_window(&self) -> (usize, usize) {
        (self.z_start, self.z_end)
    }

    /// Build a collection holding the calculated values of every range, one
    /// slice per source slice in the window named `"Fit to: <name>"`.
    ///
    /// Points missing in the source stay missing in the result.
    pub fn calculated_collection(&self, source: &dyn SourceData) -> Result<Collection> {
        if self.ranges.is_empty() {
            return Err(FitError::InvalidState(
                "data space has not been initialised".to_string(),
            ));
        }
        validate_window(source, self.x_start, self.x_end, self.z_start, self.z_end)?;

        let n_points = self.x_end - self.x_start + 1;
        let n_slices = self.z_end - self.z_start + 1;
        let mut values = vec![vec![0.0; n_points]; n_slices];
        for range in &self.ranges {
            if range.is_reference_only() {
                continue;
            }
            for n in 0..range.n_slices() {
                for i in 0..range.n_points() {
                    let slice = range.z_start() + n - self.z_start;
                    let point = range.x_start() + i - self.x_start;
                    values[slice][point] = range.calculated_y(i, n);
                }
            }
        }

        let abscissa = source.abscissa()[self.x_start..=self.x_end].to_vec();
        let mut output = Collection::new(&format!("{} (fit)", source.id()), abscissa);
        for (n, y) in values.into_iter().enumerate() {
            let Some(original) = source.slice(self.z_start + n) else {
                continue;
            };
            let index = output.add_slice(&format!("Fit to: {}", original.name), original.z, y)?;
            for i in 0..n_points {
                if original.point_kind[self.x_start + i] == PointKind::Missing {
                    output.set_point_kind(index, i, PointKind::Missing)?;
                }
            }
        }
        Ok(output)
    }
}

/// Partition a window into `(x_start, x_end, z_start, z_end)` range windows.
fn partition(
    x_min: usize,
    x_max: usize,
    z_min: usize,
    z_max: usize,
    orthogonal: bool,
    global: bool,
) -> Vec<(usize, usize, usize, usize)> {
    if global {
        vec![(x_min, x_max, z_min, z_max)]
    } else if orthogonal {
        (x_min..=x_max).map(|x| (x, x, z_min, z_max)).collect()
    } else {
        (z_min..=z_max).map(|z| (x_min, x_max, z, z)).collect()
    }
}

/// Identity of a range across incremental re-partitions.
fn range_key(range: &DataSpaceRange, orthogonal: bool, global: bool) -> usize {
    if global {
        0
    } else if orthogonal {
        range.x_start()
    } else {
        range.z_start()
    }
}

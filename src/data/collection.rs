//! In-memory source collections
//!
//! [`Collection`] is the concrete implementation of [`SourceData`] used by the
//! crate's tests and by callers without their own data store. [`Collections`]
//! is a registry keyed by collection id.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::data::source::{DataProvider, PointKind, SliceView, SourceData};
use crate::error::{FitError, Result};

/// One labeled y(x) curve.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DataSlice {
    name: String,
    z: f64,
    y: Vec<f64>,
    point_kind: Vec<PointKind>,
}

impl DataSlice {
    /// Slice name
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Scalar z-label
    pub fn z(&self) -> f64 {
        self.z
    }

    /// y values
    pub fn y(&self) -> &[f64] {
        &self.y
    }

    /// Point kinds, parallel to `y`
    pub fn point_kind(&self) -> &[PointKind] {
        &self.point_kind
    }
}

/// A named 2D data collection: an abscissa crossed with labeled slices.
///
/// Deserialized collections are checked so every slice matches the abscissa.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "CollectionRecord")]
pub struct Collection {
    id: String,
    abscissa: Vec<f64>,
    slices: Vec<DataSlice>,
    #[serde(default)]
    version: u64,
}

/// Unchecked serialized form of a [`Collection`]
#[derive(Deserialize)]
struct CollectionRecord {
    id: String,
    abscissa: Vec<f64>,
    slices: Vec<DataSlice>,
    #[serde(default)]
    version: u64,
}

impl TryFrom<CollectionRecord> for Collection {
    type Error = FitError;

    fn try_from(record: CollectionRecord) -> Result<Self> {
        let n_points = record.abscissa.len();
        for slice in &record.slices {
            if slice.y.len() != n_points || slice.point_kind.len() != n_points {
                return Err(FitError::DimensionMismatch(format!(
                    "slice '{}' has {} values and {} point kinds but the abscissa has {} points",
                    slice.name,
                    slice.y.len(),
                    slice.point_kind.len(),
                    n_points
                )));
            }
        }

        Ok(Self {
            id: record.id,
            abscissa: record.abscissa,
            slices: record.slices,
            version: record.version,
        })
    }
}

impl Collection {
    /// Create an empty collection over the given abscissa
    ///
    /// # Examples
    ///
    /// ```
    /// use datafit::data::{Collection, SourceData};
    ///
    /// let mut data = Collection::new("source", vec![0.0, 1.0, 2.0]);
    /// data.add_slice("first", 0.0, vec![0.0, 2.0, 4.0]).unwrap();
    /// assert_eq!(data.slice_count(), 1);
    /// assert_eq!(data.abscissa_length(), 3);
    /// ```
    pub fn new(id: &str, abscissa: Vec<f64>) -> Self {
        Self {
            id: id.to_string(),
            abscissa,
            slices: Vec::new(),
            version: 0,
        }
    }

    /// Append a slice with every point marked [`PointKind::Normal`], returning its index
    pub fn add_slice(&mut self, name: &str, z: f64, y: Vec<f64>) -> Result<usize> {
        if y.len() != self.abscissa.len() {
            return Err(FitError::DimensionMismatch(format!(
                "slice '{}' has {} values but the abscissa has {} points",
                name,
                y.len(),
                self.abscissa.len()
            )));
        }

        let point_kind = vec![PointKind::Normal; y.len()];
        self.slices.push(DataSlice {
            name: name.to_string(),
            z,
            y,
            point_kind,
        });
        self.version += 1;
        Ok(self.slices.len() - 1)
    }

    /// Set the y value of one point
    pub fn set_y(&mut self, slice: usize, point: usize, value: f64) -> Result<()> {
        let target = self.point_mut(slice, point)?;
        target.y[point] = value;
        self.version += 1;
        Ok(())
    }

    /// Set the kind of one point
    pub fn set_point_kind(&mut self, slice: usize, point: usize, kind: PointKind) -> Result<()> {
        let target = self.point_mut(slice, point)?;
        target.point_kind[point] = kind;
        self.version += 1;
        Ok(())
    }

    /// Change the z-label of a slice
    pub fn set_slice_z(&mut self, slice: usize, z: f64) -> Result<()> {
        let available = self.slices.len();
        let target = self
            .slices
            .get_mut(slice)
            .ok_or_else(|| FitError::DimensionMismatch(format!(
                "slice {} requested but only {} exist",
                slice, available
            )))?;
        target.z = z;
        self.version += 1;
        Ok(())
    }

    /// Remove every slice
    pub fn clear_slices(&mut self) {
        self.slices.clear();
        self.version += 1;
    }

    /// All slices, in order
    pub fn slices(&self) -> &[DataSlice] {
        &self.slices
    }

    /// Smallest and largest abscissa value
    pub fn x_extent(&self) -> Option<(f64, f64)> {
        extent(self.abscissa.iter().copied())
    }

    /// Smallest and largest slice z-label
    pub fn z_extent(&self) -> Option<(f64, f64)> {
        extent(self.slices.iter().map(|s| s.z))
    }

    /// Smallest y value over every non-missing point
    pub fn data_min(&self) -> Option<f64> {
        extent(self.normal_values()).map(|(lo, _)| lo)
    }

    /// Largest y value over every non-missing point
    pub fn data_max(&self) -> Option<f64> {
        extent(self.normal_values()).map(|(_, hi)| hi)
    }

    fn normal_values(&self) -> impl Iterator<Item = f64> + '_ {
        self.slices.iter().flat_map(|s| {
            s.y.iter()
                .zip(&s.point_kind)
                .filter(|(_, kind)| **kind == PointKind::Normal)
                .map(|(y, _)| *y)
        })
    }

    fn point_mut(&mut self, slice: usize, point: usize) -> Result<&mut DataSlice> {
        let n_slices = self.slices.len();
        let n_points = self.abscissa.len();
        if point >= n_points {
            return Err(FitError::DimensionMismatch(format!(
                "point {} requested but the abscissa has {} points",
                point, n_points
            )));
        }
        self.slices.get_mut(slice).ok_or_else(|| {
            FitError::DimensionMismatch(format!(
                "slice {} requested but only {} exist",
                slice, n_slices
            ))
        })
    }
}

fn extent(values: impl Iterator<Item = f64>) -> Option<(f64, f64)> {
    values.fold(None, |acc, v| match acc {
        None => Some((v, v)),
        Some((lo, hi)) => Some((lo.min(v), hi.max(v))),
    })
}

impl SourceData for Collection {
    fn id(&self) -> &str {
        &self.id
    }

    fn slice_count(&self) -> usize {
        self.slices.len()
    }

    fn abscissa(&self) -> &[f64] {
        &self.abscissa
    }

    fn slice(&self, index: usize) -> Option<SliceView<'_>> {
        self.slices.get(index).map(|s| SliceView {
            name: &s.name,
            z: s.z,
            y: &s.y,
            point_kind: &s.point_kind,
        })
    }

    fn data_version(&self) -> u64 {
        self.version
    }
}

impl DataProvider for Collection {
    fn collection(&self, id: &str) -> Option<&dyn SourceData> {
        if id == self.id {
            Some(self)
        } else {
            None
        }
    }
}

/// Registry of collections keyed by id.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Collections {
    collections: BTreeMap<String, Collection>,
}

impl Collections {
    /// Create an empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Add or replace a collection under its own id
    pub fn insert(&mut self, collection: Collection) -> Option<Collection> {
        self.collections.insert(collection.id.clone(), collection)
    }

    /// Collection by id
    pub fn get(&self, id: &str) -> Option<&Collection> {
        self.collections.get(id)
    }

    /// Mutable collection by id
    pub fn get_mut(&mut self, id: &str) -> Option<&mut Collection> {
        self.collections.get_mut(id)
    }

    /// Remove a collection
    pub fn remove(&mut self, id: &str) -> Option<Collection> {
        self.collections.remove(id)
    }

    /// Number of collections
    pub fn len(&self) -> usize {
        self.collections.len()
    }

    /// Whether the registry is empty
    pub fn is_empty(&self) -> bool {
        self.collections.is_empty()
    }
}

impl DataProvider for Collections {
    fn collection(&self, id: &str) -> Option<&dyn SourceData> {
        self.collections.get(id).map(|c| c as &dyn SourceData)
    }
}

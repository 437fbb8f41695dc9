//! Persisted fitted values
//!
//! Fitted values are exchanged as a list of `(name, value)` pairs per range,
//! keyed by range index. Loading them restores each range's fitted values
//! without running a minimizer.

use serde::{Deserialize, Serialize};
use std::io::{Read, Write};

use crate::data::DataSpace;
use crate::error::Result;

/// Fitted values of one range.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RangeValues {
    /// Range index within the data space
    pub index: usize,

    /// `(name, value)` pairs
    pub values: Vec<(String, f64)>,
}

/// Fitted values of every range of a data space.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct FittedValuesRecord {
    /// Ranges holding at least one fitted value
    pub ranges: Vec<RangeValues>,
}

impl FittedValuesRecord {
    /// Collect the fitted values of every range in `space`
    pub fn from_data_space(space: &DataSpace) -> Self {
        let ranges = space
            .ranges()
            .iter()
            .enumerate()
            .filter(|(_, range)| !range.fitted_values().is_empty())
            .map(|(index, range)| RangeValues {
                index,
                values: range
                    .fitted_values()
                    .iter()
                    .map(|(name, value)| (name.clone(), *value))
                    .collect(),
            })
            .collect();
        Self { ranges }
    }

    /// Serialize to pretty-printed JSON
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Deserialize from JSON
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Write JSON to `writer`
    pub fn write_to<W: Write>(&self, writer: W) -> Result<()> {
        serde_json::to_writer_pretty(writer, self)?;
        Ok(())
    }

    /// Read JSON from `reader`
    pub fn read_from<R: Read>(reader: R) -> Result<Self> {
        Ok(serde_json::from_reader(reader)?)
    }
}

//! The loaded dataset and its high-level access operations.
//!
//! A [`Dataset`] is the in-memory form of one gridded file: the file
//! metadata, the validated longitude/latitude axes, the decoded time axis
//! and one [`DataCube`] per gridded variable. The operations here follow a
//! validate-then-lookup pattern: coordinate queries are range-checked
//! explicitly before any index lookup happens.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::axis::CoordinateAxis;
use crate::calendar::TimeAxis;
use crate::cube::{DataCube, GridIndex};
use crate::error::{HadleyError, Result};
use crate::series::{FieldMeanSeries, PointSeries};

/// Metadata about a file dimension
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Dimension {
    /// Name of the dimension
    pub name: String,
    /// Size of the dimension
    pub size: usize,
    /// Whether this dimension is unlimited
    pub is_unlimited: bool,
}

/// Metadata about a file variable
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Variable {
    /// Name of the variable
    pub name: String,
    /// Dimensions of the variable
    pub dimensions: Vec<String>,
    /// Shape of the variable (dimension sizes)
    pub shape: Vec<usize>,
    /// Variable attributes
    pub attributes: HashMap<String, AttributeValue>,
    /// Data type as string
    pub dtype: String,
}

impl Variable {
    /// The `units` attribute, if present and textual
    pub fn units(&self) -> Option<&str> {
        match self.attributes.get("units") {
            Some(AttributeValue::Text(text)) => Some(text),
            _ => None,
        }
    }
}

/// Possible attribute values in a gridded file
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum AttributeValue {
    /// String attribute
    Text(String),
    /// Numeric attribute (stored as f64 for simplicity)
    Number(f64),
    /// Array of numbers
    NumberArray(Vec<f64>),
}

/// Complete metadata for a gridded file
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Metadata {
    /// File-level attributes
    pub global_attributes: HashMap<String, AttributeValue>,
    /// Dimensions in the file
    pub dimensions: HashMap<String, Dimension>,
    /// Variables in the file
    pub variables: HashMap<String, Variable>,
    /// Coordinate variables (subset of variables that match dimension names)
    pub coordinates: HashMap<String, Vec<f64>>,
}

/// Summary statistics for one variable, excluding missing cells
#[derive(Debug, Clone, Serialize)]
pub struct VariableSummary {
    pub name: String,
    pub units: Option<String>,
    pub min: f64,
    pub max: f64,
    pub mean: f64,
    pub valid_count: usize,
    pub missing_count: usize,
}

/// One gridded file loaded fully into memory
#[derive(Debug, Clone)]
pub struct Dataset {
    /// File metadata
    pub metadata: Metadata,
    /// Longitude axis
    pub lon: CoordinateAxis,
    /// Latitude axis
    pub lat: CoordinateAxis,
    /// Decoded time axis
    pub time: TimeAxis,
    /// Loaded data cubes, keyed by variable name
    pub cubes: HashMap<String, DataCube>,
}

impl Dataset {
    pub fn new(
        metadata: Metadata,
        lon: CoordinateAxis,
        lat: CoordinateAxis,
        time: TimeAxis,
        cubes: HashMap<String, DataCube>,
    ) -> Self {
        Self {
            metadata,
            lon,
            lat,
            time,
            cubes,
        }
    }

    /// Get a variable's data cube
    pub fn get_cube(&self, name: &str) -> Option<&DataCube> {
        self.cubes.get(name)
    }

    /// Get a variable's data cube with error handling
    pub fn get_cube_checked(&self, name: &str) -> Result<&DataCube> {
        self.cubes.get(name).ok_or_else(|| HadleyError::DataNotFound {
            message: format!("Variable not found: {}", name),
        })
    }

    /// Get variable metadata
    pub fn get_variable_metadata(&self, name: &str) -> Option<&Variable> {
        self.metadata.variables.get(name)
    }

    /// Get variable metadata with error handling
    pub fn get_variable_metadata_checked(&self, name: &str) -> Result<&Variable> {
        self.metadata
            .variables
            .get(name)
            .ok_or_else(|| HadleyError::DataNotFound {
                message: format!("Variable metadata not found: {}", name),
            })
    }

    /// Check if a variable has a loaded cube
    pub fn has_variable(&self, name: &str) -> bool {
        self.cubes.contains_key(name)
    }

    /// Names of all loaded gridded variables, sorted
    pub fn variable_names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.cubes.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }

    /// Per-timestep spatial mean over the whole grid
    pub fn field_mean(&self, var: &str) -> Result<FieldMeanSeries> {
        let cube = self.get_cube_checked(var)?;
        FieldMeanSeries::new(&self.time, cube.field_mean())
    }

    /// Time series at the grid cell nearest (lon, lat).
    ///
    /// Both coordinates are range-checked before the index lookup.
    pub fn point_series(&self, var: &str, lon: f64, lat: f64) -> Result<PointSeries> {
        self.check_in_range(&self.lon, lon)?;
        self.check_in_range(&self.lat, lat)?;

        let index = GridIndex {
            lon: self.lon.nearest_index(lon),
            lat: self.lat.nearest_index(lat),
        };

        let cube = self.get_cube_checked(var)?;
        PointSeries::new(&self.time, index, cube.extract_point(index)?)
    }

    /// The sub-cube spanning inclusive coordinate ranges on both spatial
    /// axes and the full time axis.
    pub fn region_cube(
        &self,
        var: &str,
        lon_range: (f64, f64),
        lat_range: (f64, f64),
    ) -> Result<DataCube> {
        self.check_interval(&self.lon, lon_range)?;
        self.check_interval(&self.lat, lat_range)?;

        let cube = self.get_cube_checked(var)?;
        cube.extract_region(
            self.index_interval(&self.lon, lon_range),
            self.index_interval(&self.lat, lat_range),
        )
    }

    /// Per-timestep spatial mean over a coordinate region
    pub fn region_mean(
        &self,
        var: &str,
        lon_range: (f64, f64),
        lat_range: (f64, f64),
    ) -> Result<FieldMeanSeries> {
        let region = self.region_cube(var, lon_range, lat_range)?;
        FieldMeanSeries::new(&self.time, region.field_mean())
    }

    /// Summary statistics over all cells of a variable
    pub fn summary(&self, var: &str) -> Result<VariableSummary> {
        let cube = self.get_cube_checked(var)?;
        let units = self
            .get_variable_metadata(var)
            .and_then(|meta| meta.units())
            .map(str::to_string);

        let mut min = f64::INFINITY;
        let mut max = f64::NEG_INFINITY;
        let mut sum = 0.0f64;
        let mut valid_count = 0usize;
        let mut missing_count = 0usize;

        for &value in cube.data().iter() {
            if value.is_nan() {
                missing_count += 1;
                continue;
            }
            let value = value as f64;
            min = min.min(value);
            max = max.max(value);
            sum += value;
            valid_count += 1;
        }

        let (min, max, mean) = if valid_count == 0 {
            (f64::NAN, f64::NAN, f64::NAN)
        } else {
            (min, max, sum / valid_count as f64)
        };

        Ok(VariableSummary {
            name: var.to_string(),
            units,
            min,
            max,
            mean,
            valid_count,
            missing_count,
        })
    }

    /// Validate that the dataset is consistent and ready for use
    pub fn validate(&self) -> Result<()> {
        if self.cubes.is_empty() {
            return Err(HadleyError::DataNotFound {
                message: "No gridded variables found in the dataset".to_string(),
            });
        }

        // Validate that all referenced dimensions exist
        for (var_name, var) in &self.metadata.variables {
            for dim_name in &var.dimensions {
                if !self.metadata.dimensions.contains_key(dim_name) {
                    return Err(HadleyError::DataNotFound {
                        message: format!(
                            "Variable {} references non-existent dimension {}",
                            var_name, dim_name
                        ),
                    });
                }
            }
        }

        // Validate that every cube matches the grid axes
        let expected = (self.lon.len(), self.lat.len(), self.time.len());
        for (var_name, cube) in &self.cubes {
            if !self.metadata.variables.contains_key(var_name) {
                return Err(HadleyError::DataNotFound {
                    message: format!("Cube {} has no variable metadata", var_name),
                });
            }

            let shape = cube.shape();
            if shape != expected {
                return Err(HadleyError::InvalidAxis {
                    message: format!(
                        "Cube {} has shape {:?} but the grid axes imply {:?}",
                        var_name, shape, expected
                    ),
                });
            }
        }

        Ok(())
    }

    fn check_in_range(&self, axis: &CoordinateAxis, value: f64) -> Result<()> {
        if !axis.in_range(value) {
            let (min, max) = axis.bounds();
            return Err(HadleyError::InvalidCoordinates {
                message: format!(
                    "Coordinate value {} is outside the range of {} ({} to {})",
                    value,
                    axis.name(),
                    min,
                    max
                ),
            });
        }
        Ok(())
    }

    fn check_interval(&self, axis: &CoordinateAxis, range: (f64, f64)) -> Result<()> {
        if !axis.in_range_interval(range.0, range.1) {
            let (min, max) = axis.bounds();
            return Err(HadleyError::InvalidCoordinates {
                message: format!(
                    "Coordinate range ({} to {}) is not an ordered interval within {} ({} to {})",
                    range.0,
                    range.1,
                    axis.name(),
                    min,
                    max
                ),
            });
        }
        Ok(())
    }

    /// Map an ordered coordinate interval to an ordered index interval.
    ///
    /// On a decreasing axis the lower coordinate maps to the higher index,
    /// so the pair is reordered after lookup.
    fn index_interval(&self, axis: &CoordinateAxis, range: (f64, f64)) -> (usize, usize) {
        let a = axis.nearest_index(range.0);
        let b = axis.nearest_index(range.1);
        (a.min(b), a.max(b))
    }
}

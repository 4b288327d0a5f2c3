//! NetCDF data loading.
//!
//! This module handles reading a gridded NetCDF file fully into memory:
//! file metadata, the longitude/latitude coordinate axes, the decoded time
//! axis and one [`DataCube`] per `(time, lat, lon)`-shaped variable. The
//! file's `missing_value`/`_FillValue` sentinel is mapped to NaN and CF
//! `scale_factor`/`add_offset` packing is applied on read, so everything
//! downstream only sees unpacked values with NaN gaps.

use ndarray::{Array, Ix3, IxDyn};
use netcdf::{self, Attribute, Variable as NetCdfVariable};
use std::collections::HashMap;
use std::path::Path;
use tracing::{debug, info, warn};

use crate::axis::CoordinateAxis;
use crate::calendar::{self, TimeAxis};
use crate::config::{Config, DataConfig};
use crate::cube::DataCube;
use crate::dataset::{AttributeValue, Dataset, Dimension, Metadata, Variable};
use crate::error::{HadleyError, Result};

/// Alternate spellings tried when the configured dimension name is absent
const LON_ALIASES: &[&str] = &["lon", "longitude"];
const LAT_ALIASES: &[&str] = &["lat", "latitude"];
const TIME_ALIASES: &[&str] = &["time"];

/// Resolved names of the three grid dimensions in one file
#[derive(Debug, Clone)]
struct GridNames {
    lon: String,
    lat: String,
    time: String,
}

/// Load a gridded NetCDF file into memory and build a validated [`Dataset`]
pub fn load_dataset(path: &Path, config: &Config) -> Result<Dataset> {
    if !path.exists() {
        return Err(HadleyError::Io(std::io::Error::new(
            std::io::ErrorKind::NotFound,
            format!("File not found: {}", path.display()),
        )));
    }

    let file = netcdf::open(path)?;

    info!("Opened gridded file: {}", path.display());
    debug!("File has {} variables", file.variables().count());
    debug!("File has {} dimensions", file.dimensions().count());

    let metadata = extract_metadata(&file)?;
    let grid = resolve_grid(&metadata, &config.data)?;

    let lon = coordinate_axis(&metadata, &grid.lon)?;
    let lat = coordinate_axis(&metadata, &grid.lat)?;
    let time = decode_time(&metadata, &grid.time)?;

    let cubes = extract_cubes(&file, &metadata, &grid)?;

    let dataset = Dataset::new(metadata, lon, lat, time, cubes);
    dataset.validate()?;

    Ok(dataset)
}

/// Extract metadata from the NetCDF file
fn extract_metadata(file: &netcdf::File) -> Result<Metadata> {
    let mut global_attributes = HashMap::new();
    for attr in file.attributes() {
        let value = convert_attribute(&attr)?;
        global_attributes.insert(attr.name().to_string(), value);
    }

    let mut dimensions = HashMap::new();
    for dim in file.dimensions() {
        let dimension = Dimension {
            name: dim.name().to_string(),
            size: dim.len(),
            is_unlimited: dim.is_unlimited(),
        };
        dimensions.insert(dim.name().to_string(), dimension);
    }

    let mut variables = HashMap::new();
    let mut coordinates = HashMap::new();

    for var in file.variables() {
        if !is_supported_variable(&var) {
            warn!("Skipping unsupported variable: {}", var.name());
            continue;
        }

        let var_dims: Vec<String> = var
            .dimensions()
            .iter()
            .map(|dim| dim.name().to_string())
            .collect();
        let var_shape: Vec<usize> = var.dimensions().iter().map(|dim| dim.len()).collect();

        let mut var_attrs = HashMap::new();
        for attr in var.attributes() {
            let value = convert_attribute(&attr)?;
            var_attrs.insert(attr.name().to_string(), value);
        }

        let variable = Variable {
            name: var.name().to_string(),
            dimensions: var_dims,
            shape: var_shape,
            attributes: var_attrs,
            dtype: format!("{:?}", var.vartype()),
        };

        variables.insert(var.name().to_string(), variable);

        // Coordinate variables share their dimension's name
        if file.dimension(&var.name()).is_some() {
            let coord_values = extract_coordinate_values(&var)?;
            coordinates.insert(var.name().to_string(), coord_values);
        }
    }

    // Dimensions without a coordinate variable get 0-based index coordinates
    for dim_name in dimensions.keys() {
        if !coordinates.contains_key(dim_name) {
            let dim_size = dimensions[dim_name].size;
            let coord_values: Vec<f64> = (0..dim_size).map(|i| i as f64).collect();
            coordinates.insert(dim_name.to_string(), coord_values);

            warn!("Created default coordinates for dimension: {}", dim_name);
        }
    }

    Ok(Metadata {
        global_attributes,
        dimensions,
        variables,
        coordinates,
    })
}

/// Resolve the configured grid dimension names against the file,
/// falling back to common alternate spellings
fn resolve_grid(metadata: &Metadata, config: &DataConfig) -> Result<GridNames> {
    Ok(GridNames {
        lon: resolve_dimension(metadata, &config.lon_name, LON_ALIASES)?,
        lat: resolve_dimension(metadata, &config.lat_name, LAT_ALIASES)?,
        time: resolve_dimension(metadata, &config.time_name, TIME_ALIASES)?,
    })
}

fn resolve_dimension(metadata: &Metadata, configured: &str, aliases: &[&str]) -> Result<String> {
    if metadata.coordinates.contains_key(configured) {
        return Ok(configured.to_string());
    }

    for &alias in aliases {
        if metadata.coordinates.contains_key(alias) {
            debug!(
                "Dimension {} not found, using alias {} instead",
                configured, alias
            );
            return Ok(alias.to_string());
        }
    }

    Err(HadleyError::DataNotFound {
        message: format!(
            "Dimension {} not found (also tried: {})",
            configured,
            aliases.join(", ")
        ),
    })
}

fn coordinate_axis(metadata: &Metadata, name: &str) -> Result<CoordinateAxis> {
    let values = metadata
        .coordinates
        .get(name)
        .ok_or_else(|| HadleyError::DataNotFound {
            message: format!("Coordinate values for dimension {} not found", name),
        })?;

    CoordinateAxis::new(name, values.clone())
}

/// Decode the time coordinate into timestamps using its units attribute
fn decode_time(metadata: &Metadata, name: &str) -> Result<TimeAxis> {
    let offsets = metadata
        .coordinates
        .get(name)
        .ok_or_else(|| HadleyError::DataNotFound {
            message: format!("Coordinate values for dimension {} not found", name),
        })?;

    let units = metadata
        .variables
        .get(name)
        .and_then(|var| var.units())
        .ok_or_else(|| HadleyError::InvalidTime {
            message: format!("Time variable {} has no units attribute", name),
        })?;

    calendar::decode_time_axis(offsets, units)
}

/// Check if a variable has a supported numeric type
fn is_supported_variable(var: &NetCdfVariable) -> bool {
    use netcdf::types::{BasicType, VariableType};

    matches!(
        var.vartype(),
        VariableType::Basic(BasicType::Byte)
            | VariableType::Basic(BasicType::Short)
            | VariableType::Basic(BasicType::Int)
            | VariableType::Basic(BasicType::Float)
            | VariableType::Basic(BasicType::Double)
    )
}

/// Convert a NetCDF attribute to our AttributeValue enum
fn convert_attribute(attr: &Attribute) -> Result<AttributeValue> {
    use netcdf::AttributeValue as NcAttributeValue;

    let value = attr.value()?;

    match value {
        NcAttributeValue::Str(s) => Ok(AttributeValue::Text(s)),

        // Numeric types are stored as f64 for simplicity
        NcAttributeValue::Uchar(v) => Ok(AttributeValue::Number(v as f64)),
        NcAttributeValue::Schar(v) => Ok(AttributeValue::Number(v as f64)),
        NcAttributeValue::Short(v) => Ok(AttributeValue::Number(v as f64)),
        NcAttributeValue::Int(v) => Ok(AttributeValue::Number(v as f64)),
        NcAttributeValue::Float(v) => Ok(AttributeValue::Number(v as f64)),
        NcAttributeValue::Double(v) => Ok(AttributeValue::Number(v)),

        // Anything else keeps a text representation
        _ => Ok(AttributeValue::Text(format!("{:?}", value))),
    }
}

/// Extract coordinate values from a coordinate variable
fn extract_coordinate_values(var: &NetCdfVariable) -> Result<Vec<f64>> {
    use netcdf::types::{BasicType, VariableType};

    match var.vartype() {
        VariableType::Basic(BasicType::Byte) => {
            let values: Vec<i8> = var.get_values::<i8, _>(&[] as &[netcdf::Extent])?;
            Ok(values.into_iter().map(|v| v as f64).collect())
        }
        VariableType::Basic(BasicType::Short) => {
            let values: Vec<i16> = var.get_values::<i16, _>(&[] as &[netcdf::Extent])?;
            Ok(values.into_iter().map(|v| v as f64).collect())
        }
        VariableType::Basic(BasicType::Int) => {
            let values: Vec<i32> = var.get_values::<i32, _>(&[] as &[netcdf::Extent])?;
            Ok(values.into_iter().map(|v| v as f64).collect())
        }
        VariableType::Basic(BasicType::Float) => {
            let values: Vec<f32> = var.get_values::<f32, _>(&[] as &[netcdf::Extent])?;
            Ok(values.into_iter().map(|v| v as f64).collect())
        }
        VariableType::Basic(BasicType::Double) => {
            let values: Vec<f64> = var.get_values::<f64, _>(&[] as &[netcdf::Extent])?;
            Ok(values)
        }
        _ => Err(HadleyError::DataNotFound {
            message: format!(
                "Unsupported coordinate variable type: {:?}",
                var.vartype()
            ),
        }),
    }
}

/// Read all `(time, lat, lon)`-shaped variables into `[lon, lat, time]` cubes
fn extract_cubes(
    file: &netcdf::File,
    metadata: &Metadata,
    grid: &GridNames,
) -> Result<HashMap<String, DataCube>> {
    let mut cubes = HashMap::new();

    for (var_name, var_meta) in &metadata.variables {
        if !is_gridded_variable(var_meta, grid) {
            debug!("Skipping non-gridded variable: {}", var_name);
            continue;
        }

        if let Some(var) = file.variable(var_name) {
            let mut values = read_variable_values(&var)?;
            apply_value_attributes(&mut values, var_meta);

            let array = Array::from_shape_vec(IxDyn(&var_meta.shape), values)?;
            let cube = permute_to_cube(array, var_meta, grid)?;

            debug!(
                variable = var_name.as_str(),
                shape = ?cube.shape(),
                "Loaded variable"
            );
            cubes.insert(var_name.clone(), cube);
        }
    }

    Ok(cubes)
}

/// A gridded variable spans exactly the three grid dimensions, once each
fn is_gridded_variable(var: &Variable, grid: &GridNames) -> bool {
    var.dimensions.len() == 3
        && var.dimensions.iter().any(|d| *d == grid.lon)
        && var.dimensions.iter().any(|d| *d == grid.lat)
        && var.dimensions.iter().any(|d| *d == grid.time)
}

/// Read a variable's values as f32, whatever its storage type
fn read_variable_values(var: &NetCdfVariable) -> Result<Vec<f32>> {
    use netcdf::types::{BasicType, VariableType};

    match var.vartype() {
        VariableType::Basic(BasicType::Byte) => {
            let values: Vec<i8> = var.get_values::<i8, _>(&[] as &[netcdf::Extent])?;
            Ok(values.into_iter().map(|v| v as f32).collect())
        }
        VariableType::Basic(BasicType::Short) => {
            let values: Vec<i16> = var.get_values::<i16, _>(&[] as &[netcdf::Extent])?;
            Ok(values.into_iter().map(|v| v as f32).collect())
        }
        VariableType::Basic(BasicType::Int) => {
            let values: Vec<i32> = var.get_values::<i32, _>(&[] as &[netcdf::Extent])?;
            Ok(values.into_iter().map(|v| v as f32).collect())
        }
        VariableType::Basic(BasicType::Float) => {
            var.get_values::<f32, _>(&[] as &[netcdf::Extent])
                .map_err(HadleyError::from)
        }
        VariableType::Basic(BasicType::Double) => {
            let values: Vec<f64> = var.get_values::<f64, _>(&[] as &[netcdf::Extent])?;
            Ok(values.into_iter().map(|v| v as f32).collect())
        }
        _ => Err(HadleyError::DataNotFound {
            message: format!("Unsupported variable type: {:?}", var.vartype()),
        }),
    }
}

/// Map the missing-value sentinel to NaN and unpack scaled values.
///
/// The sentinel comparison happens on the packed value, before scale and
/// offset are applied.
fn apply_value_attributes(values: &mut [f32], var: &Variable) {
    let fill_value = numeric_attribute(var, "_FillValue");
    let missing_value = numeric_attribute(var, "missing_value");
    let scale_factor = numeric_attribute(var, "scale_factor").unwrap_or(1.0);
    let add_offset = numeric_attribute(var, "add_offset").unwrap_or(0.0);

    if fill_value.is_none()
        && missing_value.is_none()
        && scale_factor == 1.0
        && add_offset == 0.0
    {
        return;
    }

    for value in values.iter_mut() {
        let raw = *value as f64;
        let is_missing = fill_value.map_or(false, |fill| raw == fill)
            || missing_value.map_or(false, |missing| raw == missing);

        if is_missing {
            *value = f32::NAN;
        } else {
            *value = (raw * scale_factor + add_offset) as f32;
        }
    }
}

fn numeric_attribute(var: &Variable, name: &str) -> Option<f64> {
    var.attributes.get(name).and_then(|attr| match attr {
        AttributeValue::Number(n) => Some(*n),
        _ => None,
    })
}

/// Reorder a variable's array from its on-file dimension order to the
/// `[lon, lat, time]` cube layout
fn permute_to_cube(
    array: Array<f32, IxDyn>,
    var: &Variable,
    grid: &GridNames,
) -> Result<DataCube> {
    let position = |name: &str| -> Result<usize> {
        var.dimensions
            .iter()
            .position(|d| d == name)
            .ok_or_else(|| HadleyError::DataNotFound {
                message: format!("Variable {} has no dimension {}", var.name, name),
            })
    };

    let perm = vec![
        position(&grid.lon)?,
        position(&grid.lat)?,
        position(&grid.time)?,
    ];

    let permuted = array.permuted_axes(perm);
    let cube = permuted
        .as_standard_layout()
        .to_owned()
        .into_dimensionality::<Ix3>()?;

    Ok(DataCube::new(cube))
}

/// Create a small gridded NetCDF file with known values for testing
#[cfg(test)]
fn create_test_gridded_file(path: &Path) -> Result<()> {
    let mut file = netcdf::create(path)?;

    file.add_dimension("lon", 4)?;
    file.add_dimension("lat", 3)?;
    file.add_unlimited_dimension("time")?;

    file.add_attribute("title", "Hadley Test File")?;
    file.add_attribute("source", "test")?;

    {
        let mut lon_var = file.add_variable::<f64>("lon", &["lon"])?;
        lon_var.put_attribute("units", "degrees_east")?;
        lon_var.put_values(&[0.0, 1.0, 2.0, 3.0], &[..])?;
    }
    {
        let mut lat_var = file.add_variable::<f64>("lat", &["lat"])?;
        lat_var.put_attribute("units", "degrees_north")?;
        lat_var.put_values(&[0.0, 1.0, 2.0], &[..])?;
    }
    {
        let mut time_var = file.add_variable::<f64>("time", &["time"])?;
        time_var.put_attribute("units", "days since 2000-01-01")?;
        time_var.put_values(&[0.0, 1.0], &[..])?;
    }
    {
        let mut temp_var = file.add_variable::<f32>("temperature", &["time", "lat", "lon"])?;
        temp_var.put_attribute("units", "K")?;
        temp_var.put_attribute("long_name", "Temperature")?;

        // 2 time steps x 3 lat x 4 lon = 24 values, counting up
        let temp_data: Vec<f32> = (0..24).map(|i| i as f32).collect();
        temp_var.put_values(&temp_data, &[.., .., ..])?;
    }

    Ok(())
}

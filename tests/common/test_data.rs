//! Test data generation utilities.
//!
//! This module provides functions to generate gridded NetCDF test files
//! with known data patterns for testing the hadley library.

use std::path::Path;

// Use the netcdf crate's error type directly
use netcdf::Error;
type Result<T> = std::result::Result<T, Error>;

/// Fill value used for missing cells in the synthetic files
pub const FILL_VALUE: f32 = -9999.0;

/// Grid layout of the synthetic climate file
pub const LON_VALUES: [f64; 8] = [0.0, 45.0, 90.0, 135.0, 180.0, 225.0, 270.0, 315.0];
pub const LAT_VALUES: [f64; 5] = [-60.0, -30.0, 0.0, 30.0, 60.0];
pub const TIME_STEPS: usize = 4;

/// Temperature at (time step, lat index, lon index); fully valid
pub fn temperature_at(t: usize, y: usize, x: usize) -> f32 {
    273.15 + t as f32 + y as f32 + 0.1 * x as f32
}

/// Precipitation at (time step, lat index, lon index).
///
/// The (lat 0, lon 0) cell is always missing, and the entire last time
/// step is missing, so reductions can be checked against both partial and
/// all-missing windows.
pub fn precipitation_at(t: usize, y: usize, x: usize) -> f32 {
    if (y == 0 && x == 0) || t == TIME_STEPS - 1 {
        FILL_VALUE
    } else {
        2.0 + t as f32
    }
}

/// Creates a NetCDF file with two gridded variables and known patterns.
///
/// Layout: `temperature(time, lat, lon)` with no gaps and
/// `precipitation(time, lat, lon)` with deliberate missing cells, on an
/// 8 x 5 grid over 4 daily time steps starting 2000-01-01.
pub fn create_test_climate_nc(path: &Path) -> Result<()> {
    let lon_size = LON_VALUES.len();
    let lat_size = LAT_VALUES.len();

    // Create a new NetCDF file
    let mut file = netcdf::create(path)?;

    // Add dimensions
    file.add_dimension("lon", lon_size)?;
    file.add_dimension("lat", lat_size)?;
    file.add_unlimited_dimension("time")?;

    // Add file attributes
    file.add_attribute("title", "Hadley Test Climate Data")?;
    file.add_attribute("institution", "hadley test suite")?;
    file.add_attribute("source", "Synthetic climate data for testing")?;

    let time_values: Vec<f64> = (0..TIME_STEPS).map(|i| i as f64).collect();

    // Generate the data arrays in on-file (time, lat, lon) order
    let total_size = TIME_STEPS * lat_size * lon_size;
    let mut temp_data = Vec::with_capacity(total_size);
    let mut precip_data = Vec::with_capacity(total_size);

    for t in 0..TIME_STEPS {
        for y in 0..lat_size {
            for x in 0..lon_size {
                temp_data.push(temperature_at(t, y, x));
                precip_data.push(precipitation_at(t, y, x));
            }
        }
    }

    // Add and configure the lon variable
    {
        let mut lon_var = file.add_variable::<f64>("lon", &["lon"])?;
        lon_var.put_attribute("units", "degrees_east")?;
        lon_var.put_attribute("long_name", "Longitude")?;
        lon_var.put_values(&LON_VALUES, &[..])?;
    }

    // Add and configure the lat variable
    {
        let mut lat_var = file.add_variable::<f64>("lat", &["lat"])?;
        lat_var.put_attribute("units", "degrees_north")?;
        lat_var.put_attribute("long_name", "Latitude")?;
        lat_var.put_values(&LAT_VALUES, &[..])?;
    }

    // Add and configure the time variable
    {
        let mut time_var = file.add_variable::<f64>("time", &["time"])?;
        time_var.put_attribute("units", "days since 2000-01-01")?;
        time_var.put_attribute("calendar", "standard")?;
        time_var.put_values(&time_values, &[..])?;
    }

    // Add and configure the temperature variable
    {
        let mut temp_var = file.add_variable::<f32>("temperature", &["time", "lat", "lon"])?;
        temp_var.put_attribute("units", "K")?;
        temp_var.put_attribute("long_name", "Temperature")?;
        temp_var.put_values(&temp_data, &[.., .., ..])?;
    }

    // Add and configure the precipitation variable
    {
        let mut precip_var =
            file.add_variable::<f32>("precipitation", &["time", "lat", "lon"])?;
        precip_var.put_attribute("units", "mm/day")?;
        precip_var.put_attribute("long_name", "Precipitation Rate")?;
        precip_var.put_attribute("_FillValue", FILL_VALUE)?;
        precip_var.put_values(&precip_data, &[.., .., ..])?;
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_create_test_climate_nc() {
        let dir = tempdir().unwrap();
        let file_path = dir.path().join("climate_test.nc");

        assert!(create_test_climate_nc(&file_path).is_ok());
        assert!(file_path.exists());

        // Verify we can open and read the file
        let nc_file = netcdf::open(&file_path).unwrap();
        assert!(nc_file.variable("temperature").is_some());
        assert!(nc_file.variable("precipitation").is_some());
        assert_eq!(nc_file.dimension("lon").unwrap().len(), 8);
        assert_eq!(nc_file.dimension("lat").unwrap().len(), 5);
        assert_eq!(nc_file.dimension("time").unwrap().len(), 4);
    }
}

//! The in-memory data cube.
//!
//! A [`DataCube`] holds one variable's values as a 3-dimensional array
//! indexed `[lon, lat, time]`. Missing values are represented as NaN (the
//! loader maps the file's fill/missing sentinel on read) and excluded from
//! every reduction. Operations never mutate the cube; they return new
//! derived values.

use ndarray::{s, Array3};
use serde::Serialize;

use crate::error::{HadleyError, Result};

/// A single (longitude, latitude) cell position in the spatial grid
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct GridIndex {
    /// Index on the longitude axis
    pub lon: usize,
    /// Index on the latitude axis
    pub lat: usize,
}

/// A 3-dimensional data array indexed `[lon, lat, time]`
#[derive(Debug, Clone, PartialEq)]
pub struct DataCube {
    data: Array3<f32>,
}

impl DataCube {
    pub fn new(data: Array3<f32>) -> Self {
        Self { data }
    }

    /// Build a cube from a flat value vector in `[lon, lat, time]` order
    pub fn from_shape_vec(shape: (usize, usize, usize), values: Vec<f32>) -> Result<Self> {
        Ok(Self {
            data: Array3::from_shape_vec(shape, values)?,
        })
    }

    pub fn data(&self) -> &Array3<f32> {
        &self.data
    }

    /// Cube dimensions as (n_lon, n_lat, n_time)
    pub fn shape(&self) -> (usize, usize, usize) {
        let shape = self.data.shape();
        (shape[0], shape[1], shape[2])
    }

    pub fn n_lon(&self) -> usize {
        self.data.shape()[0]
    }

    pub fn n_lat(&self) -> usize {
        self.data.shape()[1]
    }

    pub fn n_time(&self) -> usize {
        self.data.shape()[2]
    }

    /// Per-timestep spatial mean over all grid cells.
    ///
    /// NaN cells are excluded from both the sum and the count. A time step
    /// with no valid cell at all yields NaN, so the output always has one
    /// entry per time step, in time order.
    pub fn field_mean(&self) -> Vec<f64> {
        let n_time = self.n_time();
        let mut means = Vec::with_capacity(n_time);

        for t in 0..n_time {
            let mut sum = 0.0f64;
            let mut count = 0usize;

            for &value in self.data.slice(s![.., .., t]).iter() {
                if !value.is_nan() {
                    sum += value as f64;
                    count += 1;
                }
            }

            if count == 0 {
                means.push(f64::NAN);
            } else {
                means.push(sum / count as f64);
            }
        }

        means
    }

    /// The full time series at a single grid cell, one value per time step.
    ///
    /// The indices must already be validated against the axes; out-of-bounds
    /// indices fail fast rather than clamping.
    pub fn extract_point(&self, index: GridIndex) -> Result<Vec<f64>> {
        let (n_lon, n_lat, _) = self.shape();

        if index.lon >= n_lon || index.lat >= n_lat {
            return Err(HadleyError::InvalidCoordinates {
                message: format!(
                    "Grid index ({}, {}) is outside the cube shape ({}, {})",
                    index.lon, index.lat, n_lon, n_lat
                ),
            });
        }

        Ok(self
            .data
            .slice(s![index.lon, index.lat, ..])
            .iter()
            .map(|&v| v as f64)
            .collect())
    }

    /// The sub-cube spanning inclusive index ranges on both spatial axes
    /// and the full time axis.
    pub fn extract_region(
        &self,
        lon_range: (usize, usize),
        lat_range: (usize, usize),
    ) -> Result<DataCube> {
        let (n_lon, n_lat, _) = self.shape();
        validate_index_range("longitude", lon_range, n_lon)?;
        validate_index_range("latitude", lat_range, n_lat)?;

        let (lon_lo, lon_hi) = lon_range;
        let (lat_lo, lat_hi) = lat_range;

        Ok(DataCube::new(
            self.data
                .slice(s![lon_lo..=lon_hi, lat_lo..=lat_hi, ..])
                .to_owned(),
        ))
    }
}

fn validate_index_range(axis: &str, range: (usize, usize), size: usize) -> Result<()> {
    let (lo, hi) = range;

    if lo > hi {
        return Err(HadleyError::InvalidCoordinates {
            message: format!("Reversed {} index range ({} to {})", axis, lo, hi),
        });
    }
    if hi >= size {
        return Err(HadleyError::InvalidCoordinates {
            message: format!(
                "{} index range ({} to {}) exceeds the axis length {}",
                axis, lo, hi, size
            ),
        });
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::arr3;

    /// The (2 lon, 2 lat, 3 time) reference cube
    fn reference_cube() -> DataCube {
        DataCube::new(arr3(&[
            [[1.0, 2.0, 3.0], [4.0, 5.0, 6.0]],
            [[7.0, 8.0, 9.0], [10.0, 11.0, 12.0]],
        ]))
    }

    #[test]
    fn test_field_mean_reference_case() {
        let means = reference_cube().field_mean();
        assert_eq!(means, vec![5.5, 6.5, 7.5]);
    }

    #[test]
    fn test_field_mean_excludes_missing_cells() {
        let mut cube = reference_cube();
        cube.data[[0, 0, 0]] = f32::NAN;

        let means = cube.field_mean();
        // Time step 0 averages only the 3 remaining cells
        assert_eq!(means[0], (4.0 + 7.0 + 10.0) / 3.0);
        assert_eq!(means[1], 6.5);
        assert_eq!(means[2], 7.5);
    }

    #[test]
    fn test_field_mean_all_missing_step_is_nan() {
        let mut cube = reference_cube();
        for lon in 0..2 {
            for lat in 0..2 {
                cube.data[[lon, lat, 1]] = f32::NAN;
            }
        }

        let means = cube.field_mean();
        assert_eq!(means.len(), 3);
        assert_eq!(means[0], 5.5);
        assert!(means[1].is_nan());
        assert_eq!(means[2], 7.5);
    }

    #[test]
    fn test_field_mean_length_matches_time_axis() {
        let cube = DataCube::from_shape_vec((1, 1, 7), vec![0.0; 7]).unwrap();
        assert_eq!(cube.field_mean().len(), 7);

        let wide = DataCube::from_shape_vec((5, 4, 2), vec![1.0; 40]).unwrap();
        assert_eq!(wide.field_mean().len(), 2);
    }

    #[test]
    fn test_field_mean_is_idempotent() {
        let cube = reference_cube();
        assert_eq!(cube.field_mean(), cube.field_mean());
    }

    #[test]
    fn test_extract_point() {
        let cube = reference_cube();
        let series = cube.extract_point(GridIndex { lon: 1, lat: 0 }).unwrap();
        assert_eq!(series, vec![7.0, 8.0, 9.0]);

        let series = cube.extract_point(GridIndex { lon: 0, lat: 1 }).unwrap();
        assert_eq!(series, vec![4.0, 5.0, 6.0]);
    }

    #[test]
    fn test_extract_point_rejects_out_of_bounds() {
        let cube = reference_cube();
        let result = cube.extract_point(GridIndex { lon: 2, lat: 0 });
        assert!(matches!(
            result,
            Err(HadleyError::InvalidCoordinates { .. })
        ));
    }

    #[test]
    fn test_extract_point_is_idempotent() {
        let cube = reference_cube();
        let index = GridIndex { lon: 0, lat: 0 };
        assert_eq!(
            cube.extract_point(index).unwrap(),
            cube.extract_point(index).unwrap()
        );
    }

    #[test]
    fn test_extract_region_full_bounds_round_trips() {
        let cube = reference_cube();
        let region = cube.extract_region((0, 1), (0, 1)).unwrap();
        assert_eq!(region, cube);
    }

    #[test]
    fn test_extract_region_sub_cube() {
        let cube = reference_cube();
        let region = cube.extract_region((1, 1), (0, 1)).unwrap();
        assert_eq!(region.shape(), (1, 2, 3));
        assert_eq!(region.data()[[0, 0, 0]], 7.0);
        assert_eq!(region.data()[[0, 1, 2]], 12.0);
    }

    #[test]
    fn test_extract_region_rejects_reversed_range() {
        let cube = reference_cube();
        assert!(cube.extract_region((1, 0), (0, 1)).is_err());
    }

    #[test]
    fn test_extract_region_rejects_out_of_bounds() {
        let cube = reference_cube();
        assert!(cube.extract_region((0, 2), (0, 1)).is_err());
        assert!(cube.extract_region((0, 1), (0, 5)).is_err());
    }

    #[test]
    fn test_from_shape_vec_rejects_bad_shape() {
        assert!(DataCube::from_shape_vec((2, 2, 2), vec![0.0; 7]).is_err());
    }
}

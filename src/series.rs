//! Derived time series.
//!
//! These types pair reduction output with the decoded time axis. A NaN
//! value marks a time step whose reduction window was entirely missing.

use chrono::NaiveDateTime;
use serde::Serialize;

use crate::calendar::TimeAxis;
use crate::cube::GridIndex;
use crate::error::{HadleyError, Result};

/// One (timestamp, value) pair of a derived series
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct SeriesSample {
    pub time: NaiveDateTime,
    pub value: f64,
}

/// Per-timestep spatial mean of a gridded variable
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FieldMeanSeries {
    pub samples: Vec<SeriesSample>,
}

impl FieldMeanSeries {
    /// Pair field-mean values with their timestamps; lengths must agree
    pub fn new(time: &TimeAxis, values: Vec<f64>) -> Result<Self> {
        Ok(Self {
            samples: zip_samples(time, values)?,
        })
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }
}

/// The time series of a single grid cell
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PointSeries {
    /// The grid cell the series was extracted at
    pub index: GridIndex,
    pub samples: Vec<SeriesSample>,
}

impl PointSeries {
    pub fn new(time: &TimeAxis, index: GridIndex, values: Vec<f64>) -> Result<Self> {
        Ok(Self {
            index,
            samples: zip_samples(time, values)?,
        })
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }
}

fn zip_samples(time: &TimeAxis, values: Vec<f64>) -> Result<Vec<SeriesSample>> {
    if time.len() != values.len() {
        return Err(HadleyError::InvalidAxis {
            message: format!(
                "Time axis length {} does not match series length {}",
                time.len(),
                values.len()
            ),
        });
    }

    Ok(time
        .timestamps()
        .iter()
        .zip(values)
        .map(|(&time, value)| SeriesSample { time, value })
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::calendar::decode_time_axis;

    fn time_axis() -> TimeAxis {
        decode_time_axis(&[0.0, 1.0, 2.0], "days since 2000-01-01").unwrap()
    }

    #[test]
    fn test_field_mean_series_pairs_in_order() {
        let series = FieldMeanSeries::new(&time_axis(), vec![5.5, 6.5, 7.5]).unwrap();
        assert_eq!(series.len(), 3);
        assert_eq!(series.samples[0].value, 5.5);
        assert_eq!(series.samples[2].value, 7.5);
        assert!(series.samples[0].time < series.samples[1].time);
    }

    #[test]
    fn test_length_mismatch_fails() {
        let result = FieldMeanSeries::new(&time_axis(), vec![1.0, 2.0]);
        assert!(matches!(result, Err(HadleyError::InvalidAxis { .. })));

        let index = GridIndex { lon: 0, lat: 0 };
        assert!(PointSeries::new(&time_axis(), index, vec![1.0; 4]).is_err());
    }

    #[test]
    fn test_point_series_keeps_index() {
        let index = GridIndex { lon: 3, lat: 7 };
        let series = PointSeries::new(&time_axis(), index, vec![1.0, 2.0, 3.0]).unwrap();
        assert_eq!(series.index, index);
        assert_eq!(series.samples[1].value, 2.0);
    }

    #[test]
    fn test_series_serializes_to_json() {
        let series = FieldMeanSeries::new(&time_axis(), vec![1.0, 2.0, 3.0]).unwrap();
        let json = serde_json::to_value(&series).unwrap();
        let samples = json["samples"].as_array().unwrap();
        assert_eq!(samples.len(), 3);
        assert_eq!(samples[0]["time"], "2000-01-01T00:00:00");
        assert_eq!(samples[0]["value"], 1.0);
    }
}

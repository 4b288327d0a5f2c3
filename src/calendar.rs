//! Time axis decoding.
//!
//! Gridded files store time as numeric offsets plus a units attribute of
//! the form `"<unit> since <timestamp>"` (e.g. `"days since 2000-01-01"` or
//! `"hours since 1900-01-01 00:00:00"`). This module converts such an axis
//! into concrete timestamps once, at load time.

use chrono::{Duration, NaiveDate, NaiveDateTime, NaiveTime};

use crate::error::{HadleyError, Result};

/// Time units supported in `"<unit> since <timestamp>"` strings
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimeUnit {
    Seconds,
    Minutes,
    Hours,
    Days,
}

impl TimeUnit {
    /// Parse a unit token, accepting singular and plural spellings
    pub fn parse(token: &str) -> Result<Self> {
        match token.to_lowercase().as_str() {
            "second" | "seconds" | "sec" | "secs" | "s" => Ok(TimeUnit::Seconds),
            "minute" | "minutes" | "min" | "mins" => Ok(TimeUnit::Minutes),
            "hour" | "hours" | "hr" | "hrs" | "h" => Ok(TimeUnit::Hours),
            "day" | "days" | "d" => Ok(TimeUnit::Days),
            _ => Err(HadleyError::InvalidTime {
                message: format!("Unknown time unit: {}", token),
            }),
        }
    }

    /// Length of one unit in seconds
    pub fn seconds(&self) -> i64 {
        match self {
            TimeUnit::Seconds => 1,
            TimeUnit::Minutes => 60,
            TimeUnit::Hours => 3_600,
            TimeUnit::Days => 86_400,
        }
    }
}

/// An ordered sequence of timestamps, one per time step
#[derive(Debug, Clone, PartialEq)]
pub struct TimeAxis {
    timestamps: Vec<NaiveDateTime>,
}

impl TimeAxis {
    pub fn new(timestamps: Vec<NaiveDateTime>) -> Result<Self> {
        if timestamps.is_empty() {
            return Err(HadleyError::InvalidTime {
                message: "Time axis is empty".to_string(),
            });
        }
        Ok(Self { timestamps })
    }

    pub fn timestamps(&self) -> &[NaiveDateTime] {
        &self.timestamps
    }

    pub fn len(&self) -> usize {
        self.timestamps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.timestamps.is_empty()
    }
}

/// Decode numeric time offsets plus a CF-style units string into a
/// [`TimeAxis`].
///
/// Fractional offsets are resolved to millisecond precision.
pub fn decode_time_axis(offsets: &[f64], units: &str) -> Result<TimeAxis> {
    let parts: Vec<&str> = units.trim().splitn(3, ' ').collect();
    if parts.len() < 3 || parts[1] != "since" {
        return Err(HadleyError::InvalidTime {
            message: format!("Unexpected time units format: '{}'", units),
        });
    }

    let unit = TimeUnit::parse(parts[0])?;
    let base = parse_base_timestamp(parts[2])?;

    let timestamps = offsets
        .iter()
        .map(|&offset| {
            let millis = offset * unit.seconds() as f64 * 1_000.0;
            base + Duration::milliseconds(millis.round() as i64)
        })
        .collect();

    TimeAxis::new(timestamps)
}

/// Parse the timestamp part of a units string.
///
/// Accepts `YYYY-MM-DD`, `YYYY-MM-DD HH:MM:SS` and the ISO-8601 `T`
/// separator; a date without a time component means midnight.
fn parse_base_timestamp(text: &str) -> Result<NaiveDateTime> {
    let text = text.trim().trim_end_matches(" UTC").trim_end_matches('Z');

    for format in ["%Y-%m-%d %H:%M:%S", "%Y-%m-%dT%H:%M:%S"] {
        if let Ok(stamp) = NaiveDateTime::parse_from_str(text, format) {
            return Ok(stamp);
        }
    }

    if let Ok(date) = NaiveDate::parse_from_str(text, "%Y-%m-%d") {
        return Ok(date.and_time(NaiveTime::MIN));
    }

    Err(HadleyError::InvalidTime {
        message: format!("Failed to parse base timestamp: '{}'", text),
    })
}

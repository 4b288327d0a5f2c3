//! Error types for the hadley library.
//!
//! This module defines a comprehensive error enum that covers all possible
//! error conditions in the library and the CLI built on top of it.

use thiserror::Error;

/// The main error type for hadley operations.
#[derive(Error, Debug)]
pub enum HadleyError {
    /// NetCDF file operation errors
    #[cfg(feature = "netcdf")]
    #[error("NetCDF error: {0}")]
    NetCdf(#[from] netcdf::Error),

    /// IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Array shape errors
    #[error("Shape error: {0}")]
    Shape(#[from] ndarray::ShapeError),

    /// Configuration errors
    #[error("Configuration error: {message}")]
    Config { message: String },

    /// Invalid axis errors (empty or non-monotonic coordinates)
    #[error("Invalid axis: {message}")]
    InvalidAxis { message: String },

    /// Invalid coordinate errors (out-of-range queries, bad index ranges)
    #[error("Invalid coordinates: {message}")]
    InvalidCoordinates { message: String },

    /// Time axis decoding errors
    #[error("Invalid time axis: {message}")]
    InvalidTime { message: String },

    /// Data not found errors
    #[error("Data not found: {message}")]
    DataNotFound { message: String },

    /// JSON serialization/deserialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Convenience type alias for Results with HadleyError
pub type Result<T> = std::result::Result<T, HadleyError>;

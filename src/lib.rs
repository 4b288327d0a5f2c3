//! # hadley
//!
//! A fast, in-memory gridded-NetCDF time-series extraction toolkit.
//!
//! This library loads a gridded climate-data file (longitude x latitude x
//! time) fully into memory and provides typed, validated access to it:
//! nearest-index coordinate lookup, per-timestep spatial means, per-location
//! time series, and spatial sub-cube extraction.
//!
//! ## Key Features
//!
//! - **Whole-file in-memory access**: Load any gridded NetCDF file once and
//!   query it with microsecond latency
//! - **Validated coordinate axes**: Strict monotonicity checks and explicit
//!   validate-then-lookup range semantics
//! - **Missing-value aware reductions**: The file's fill sentinel becomes
//!   NaN and is excluded from every mean
//! - **Decoded timestamps**: `"<unit> since <date>"` time axes become real
//!   timestamps up front
//!
//! ## Architecture
//!
//! - **Data Layer**: Loads NetCDF files into memory for fast access
//! - **Accessor Layer**: Pure functions over immutable axes and cubes
//! - **CLI**: Inspection and extraction subcommands built on the library

pub mod axis;
pub mod calendar;
pub mod config;
pub mod cube;
#[cfg(feature = "netcdf")]
pub mod data_loader;
pub mod dataset;
pub mod error;
pub mod logging;
pub mod series;

pub use axis::{AxisDirection, CoordinateAxis};
pub use calendar::{decode_time_axis, TimeAxis, TimeUnit};
pub use config::{Args, Command, Config};
pub use cube::{DataCube, GridIndex};
pub use dataset::{AttributeValue, Dataset, Dimension, Metadata, Variable, VariableSummary};
pub use error::{HadleyError, Result};
pub use logging::{init_tracing, log_data_load_stats, log_error, log_timed_operation};
pub use series::{FieldMeanSeries, PointSeries, SeriesSample};

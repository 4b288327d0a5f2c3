//! Configuration management for hadley.
//!
//! This module handles the layered configuration system with the following
//! precedence:
//! 1. Command-line arguments (highest priority)
//! 2. Environment variables
//! 3. JSON config file
//! 4. Default values (lowest priority)

use clap::{Parser, Subcommand};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::error::{HadleyError, Result};

/// Command-line arguments for hadley
#[derive(Parser, Debug)]
#[command(name = "hadley")]
#[command(author, version, about, long_about = None)]
pub struct Args {
    /// Path to the gridded NetCDF file to open
    pub netcdf_file: PathBuf,

    /// Variable to operate on (defaults to the file's only gridded variable)
    #[arg(long, env = "HADLEY_VARIABLE")]
    pub variable: Option<String>,

    /// Path to JSON configuration file
    #[arg(short, long, env = "HADLEY_CONFIG")]
    pub config: Option<PathBuf>,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, env = "HADLEY_LOG_LEVEL", default_value = "info")]
    pub log_level: String,

    #[command(subcommand)]
    pub command: Command,
}

/// The operation to run against the loaded file
#[derive(Subcommand, Debug, Clone)]
pub enum Command {
    /// Print dimensions, variables, attributes and coordinates
    Info {
        /// Emit the full metadata as JSON instead of a text report
        #[arg(long)]
        json: bool,
    },
    /// Print summary statistics for the selected variable
    Summary,
    /// Per-timestep spatial mean over the whole grid
    FieldMean {
        /// Emit the series as JSON
        #[arg(long)]
        json: bool,
    },
    /// Time series at the grid cell nearest a coordinate
    Point {
        /// Longitude of the query point
        #[arg(long)]
        lon: f64,
        /// Latitude of the query point
        #[arg(long)]
        lat: f64,
        /// Emit the series as JSON
        #[arg(long)]
        json: bool,
    },
    /// Per-timestep spatial mean over an inclusive coordinate region
    Region {
        #[arg(long)]
        lon_min: f64,
        #[arg(long)]
        lon_max: f64,
        #[arg(long)]
        lat_min: f64,
        #[arg(long)]
        lat_max: f64,
        /// Emit the series as JSON
        #[arg(long)]
        json: bool,
    },
}

/// Grid and variable configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DataConfig {
    /// Name of the longitude dimension
    #[serde(default = "default_lon_name")]
    pub lon_name: String,

    /// Name of the latitude dimension
    #[serde(default = "default_lat_name")]
    pub lat_name: String,

    /// Name of the time dimension
    #[serde(default = "default_time_name")]
    pub time_name: String,

    /// Default variable to operate on
    #[serde(default)]
    pub variable: Option<String>,
}

/// Complete configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Data configuration
    #[serde(default)]
    pub data: DataConfig,

    /// Log level
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

impl Config {
    /// Load configuration from all sources with proper precedence
    pub fn load() -> Result<(Self, Args)> {
        let args = Args::parse();
        Self::from_args(args)
    }

    /// Build the configuration for already-parsed arguments
    pub fn from_args(args: Args) -> Result<(Self, Args)> {
        // Start with defaults
        let mut config = Config::default();

        // Load from JSON file if provided
        if let Some(config_path) = &args.config {
            let json_config = Self::load_from_file(config_path)?;
            config.merge(json_config);
        }

        // Override with command-line arguments
        config.log_level = args.log_level.clone();
        if args.variable.is_some() {
            config.data.variable = args.variable.clone();
        }

        Ok((config, args))
    }

    /// Load configuration from a JSON file
    fn load_from_file(path: &PathBuf) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: Config = serde_json::from_str(&content)?;
        Ok(config)
    }

    /// Merge another config into this one (other takes precedence)
    fn merge(&mut self, other: Config) {
        self.data = other.data;
        self.log_level = other.log_level;
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<()> {
        match self.log_level.as_str() {
            "trace" | "debug" | "info" | "warn" | "error" => {}
            _ => {
                return Err(HadleyError::Config {
                    message: format!(
                        "Invalid log level: {}. Must be one of: trace, debug, info, warn, error",
                        self.log_level
                    ),
                });
            }
        }

        for (label, name) in [
            ("longitude", &self.data.lon_name),
            ("latitude", &self.data.lat_name),
            ("time", &self.data.time_name),
        ] {
            if name.is_empty() {
                return Err(HadleyError::Config {
                    message: format!("The {} dimension name cannot be empty", label),
                });
            }
        }

        Ok(())
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            data: DataConfig::default(),
            log_level: default_log_level(),
        }
    }
}

impl Default for DataConfig {
    fn default() -> Self {
        Self {
            lon_name: default_lon_name(),
            lat_name: default_lat_name(),
            time_name: default_time_name(),
            variable: None,
        }
    }
}

// Default value functions for serde
fn default_lon_name() -> String {
    "lon".to_string()
}

fn default_lat_name() -> String {
    "lat".to_string()
}

fn default_time_name() -> String {
    "time".to_string()
}

fn default_log_level() -> String {
    "info".to_string()
}

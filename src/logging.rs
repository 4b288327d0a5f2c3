//! Logging utilities for hadley.
//!
//! This module provides structured logging functionality to make logs more
//! searchable, analyzable, and useful when processing large files.

use std::time::Instant;
use tracing::{debug, error, info};

use uuid::Uuid;

/// Initialize the tracing subscriber with the given log level
pub fn init_tracing(log_level: &str) {
    let filter = match std::env::var("RUST_LOG") {
        Ok(val) => val,
        Err(_) => log_level.to_string(),
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .init();
}

/// Log an operation with timing and result in a single statement
pub fn log_timed_operation<F, R>(operation: &str, f: F) -> R
where
    F: FnOnce() -> R,
{
    let start = Instant::now();
    let operation_id = Uuid::new_v4();

    debug!(
        operation = operation,
        operation_id = %operation_id,
        "Starting operation"
    );

    let result = f();

    let duration = start.elapsed();

    info!(
        operation = operation,
        operation_id = %operation_id,
        duration_ms = duration.as_secs_f64() * 1000.0,
        "Operation completed"
    );

    result
}

/// Log detailed information about the data loaded
pub fn log_data_load_stats(
    file_path: &str,
    var_count: usize,
    var_names: &[&str],
    grid_shape: (usize, usize, usize),
) {
    let (n_lon, n_lat, n_time) = grid_shape;
    info!(
        operation = "data_load",
        file_path = file_path,
        var_count = var_count,
        vars = %var_names.join(", "),
        n_lon = n_lon,
        n_lat = n_lat,
        n_time = n_time,
        "Data loaded successfully"
    );
}

/// Log an error with context
pub fn log_error(error: &crate::error::HadleyError, context: &str) {
    error!(
        error = %error,
        context = context,
        "Error occurred"
    );
}

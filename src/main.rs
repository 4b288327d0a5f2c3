//! hadley - a fast, in-memory gridded-NetCDF time-series extraction toolkit
//!
//! This is the main entry point for the hadley command line interface.

use tracing::info;

use hadley::data_loader::load_dataset;
use hadley::{
    init_tracing, log_data_load_stats, log_error, log_timed_operation, AttributeValue, Command,
    Config, Dataset, FieldMeanSeries, HadleyError, PointSeries, Result,
};

fn main() -> Result<()> {
    // Load configuration
    let (config, args) = Config::load()?;
    config.validate()?;

    init_tracing(&config.log_level);

    info!("Starting hadley v{}", env!("CARGO_PKG_VERSION"));
    info!("Loading gridded file: {:?}", args.netcdf_file);

    let dataset = log_timed_operation("load_dataset", || {
        load_dataset(&args.netcdf_file, &config)
    })
    .map_err(|e| {
        log_error(&e, "loading dataset");
        e
    })?;

    let var_names = dataset.variable_names();
    log_data_load_stats(
        &args.netcdf_file.to_string_lossy(),
        var_names.len(),
        &var_names,
        (dataset.lon.len(), dataset.lat.len(), dataset.time.len()),
    );

    match args.command {
        Command::Info { json } => print_info(&dataset, json)?,
        Command::Summary => {
            let variable = select_variable(&dataset, &config)?;
            print_summary(&dataset, &variable)?;
        }
        Command::FieldMean { json } => {
            let variable = select_variable(&dataset, &config)?;
            let series = dataset.field_mean(&variable)?;
            print_field_mean(&variable, &series, json)?;
        }
        Command::Point { lon, lat, json } => {
            let variable = select_variable(&dataset, &config)?;
            let series = dataset.point_series(&variable, lon, lat)?;
            print_point(&dataset, &variable, &series, json)?;
        }
        Command::Region {
            lon_min,
            lon_max,
            lat_min,
            lat_max,
            json,
        } => {
            let variable = select_variable(&dataset, &config)?;
            let series = dataset.region_mean(&variable, (lon_min, lon_max), (lat_min, lat_max))?;
            if !json {
                println!(
                    "Region mean of {} over lon [{}, {}], lat [{}, {}]:",
                    variable, lon_min, lon_max, lat_min, lat_max
                );
            }
            print_series(&series, json)?;
        }
    }

    Ok(())
}

/// Pick the variable to operate on: configured name, or the file's only one
fn select_variable(dataset: &Dataset, config: &Config) -> Result<String> {
    if let Some(name) = &config.data.variable {
        if !dataset.has_variable(name) {
            return Err(HadleyError::DataNotFound {
                message: format!(
                    "Variable not found: {} (available: {})",
                    name,
                    dataset.variable_names().join(", ")
                ),
            });
        }
        return Ok(name.clone());
    }

    let names = dataset.variable_names();
    if names.len() == 1 {
        return Ok(names[0].to_string());
    }

    Err(HadleyError::Config {
        message: format!(
            "Multiple gridded variables found, select one with --variable (available: {})",
            names.join(", ")
        ),
    })
}

/// Print the file metadata, either as a sectioned report or as JSON
fn print_info(dataset: &Dataset, json: bool) -> Result<()> {
    if json {
        let response = serde_json::json!({
            "global_attributes": dataset.metadata.global_attributes,
            "dimensions": dataset.metadata.dimensions,
            "variables": dataset.metadata.variables,
            "coordinates": dataset.metadata.coordinates,
        });
        println!("{}", serde_json::to_string_pretty(&response)?);
        return Ok(());
    }

    println!("=== FILE INFORMATION ===");

    println!("\nDimensions:");
    let mut dims: Vec<_> = dataset.metadata.dimensions.values().collect();
    dims.sort_by(|a, b| a.name.cmp(&b.name));
    for dim in dims {
        println!(
            "  {} = {} {}",
            dim.name,
            dim.size,
            if dim.is_unlimited { "(unlimited)" } else { "" }
        );
    }

    println!("\nVariables:");
    let mut vars: Vec<_> = dataset.metadata.variables.values().collect();
    vars.sort_by(|a, b| a.name.cmp(&b.name));
    for var in vars {
        let dims: Vec<String> = var
            .dimensions
            .iter()
            .zip(&var.shape)
            .map(|(name, size)| format!("{} = {}", name, size))
            .collect();
        println!("  {} ({}) [{}]", var.name, var.dtype, dims.join(", "));

        let mut attrs: Vec<_> = var.attributes.iter().collect();
        attrs.sort_by_key(|(name, _)| name.as_str());
        for (name, value) in attrs {
            println!("    {}: {}", name, format_attribute(value));
        }
    }

    println!("\nGlobal Attributes:");
    let mut attrs: Vec<_> = dataset.metadata.global_attributes.iter().collect();
    attrs.sort_by_key(|(name, _)| name.as_str());
    for (name, value) in attrs {
        println!("  {}: {}", name, format_attribute(value));
    }

    println!("\nGrid:");
    let (lon_min, lon_max) = dataset.lon.bounds();
    let (lat_min, lat_max) = dataset.lat.bounds();
    println!(
        "  {}: {} points, {} to {}",
        dataset.lon.name(),
        dataset.lon.len(),
        lon_min,
        lon_max
    );
    println!(
        "  {}: {} points, {} to {}",
        dataset.lat.name(),
        dataset.lat.len(),
        lat_min,
        lat_max
    );
    let stamps = dataset.time.timestamps();
    println!(
        "  time: {} steps, {} to {}",
        dataset.time.len(),
        stamps[0],
        stamps[stamps.len() - 1]
    );

    Ok(())
}

fn print_summary(dataset: &Dataset, variable: &str) -> Result<()> {
    let summary = dataset.summary(variable)?;

    println!("Summary of {}:", summary.name);
    if let Some(units) = &summary.units {
        println!("  units:   {}", units);
    }
    println!("  min:     {}", format_value(summary.min));
    println!("  max:     {}", format_value(summary.max));
    println!("  mean:    {}", format_value(summary.mean));
    println!("  valid:   {}", summary.valid_count);
    println!("  missing: {}", summary.missing_count);

    Ok(())
}

fn print_field_mean(variable: &str, series: &FieldMeanSeries, json: bool) -> Result<()> {
    if !json {
        println!("Field mean of {}:", variable);
    }
    print_series(series, json)
}

fn print_point(
    dataset: &Dataset,
    variable: &str,
    series: &PointSeries,
    json: bool,
) -> Result<()> {
    if json {
        println!("{}", serde_json::to_string_pretty(series)?);
        return Ok(());
    }

    println!(
        "Time series of {} at grid cell (lon {}, lat {}):",
        variable,
        dataset.lon.values()[series.index.lon],
        dataset.lat.values()[series.index.lat]
    );
    for sample in &series.samples {
        println!(
            "  {}  {}",
            sample.time.format("%Y-%m-%d %H:%M:%S"),
            format_value(sample.value)
        );
    }

    Ok(())
}

fn print_series(series: &FieldMeanSeries, json: bool) -> Result<()> {
    if json {
        println!("{}", serde_json::to_string_pretty(series)?);
        return Ok(());
    }

    for sample in &series.samples {
        println!(
            "  {}  {}",
            sample.time.format("%Y-%m-%d %H:%M:%S"),
            format_value(sample.value)
        );
    }

    Ok(())
}

fn format_value(value: f64) -> String {
    if value.is_nan() {
        "missing".to_string()
    } else {
        format!("{:.4}", value)
    }
}

fn format_attribute(value: &AttributeValue) -> String {
    match value {
        AttributeValue::Text(text) => text.clone(),
        AttributeValue::Number(n) => n.to_string(),
        AttributeValue::NumberArray(values) => format!("{:?}", values),
    }
}

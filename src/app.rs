//! Top-level application orchestration.
//!
//! `src/main.rs` stays tiny; this module is the "real main" that:
//! - parses CLI arguments
//! - stacks the pipeline modules each command needs
//! - prints reports/plots
//! - writes optional exports

use std::path::PathBuf;

use clap::Parser;
use tracing::debug;

use crate::cli::{Cli, Command, ConfigArgs, ExtractArgs, ShowArgs, TargetArgs};
use crate::config::CONFIG_ENV;
use crate::error::AppError;
use crate::instrument::WavelengthBins;
use crate::pipeline::{
    ConfigLoaderModule, Context, ExtractionModule, MeasurementReaderModule, Pipeline, TargetLoaderModule,
};

/// Entry point for the `sygn` binary.
pub fn run() -> Result<(), AppError> {
    let cli = Cli::parse();

    match cli.command {
        Command::Check(args) => handle_check(args),
        Command::Show(args) => handle_show(args),
        Command::Bins(args) => handle_bins(args),
        Command::Target(args) => handle_target(args),
        Command::Extract(args) => handle_extract(args),
    }
}

fn handle_check(args: ConfigArgs) -> Result<(), AppError> {
    let ctx = load_config(args.config)?;
    let config = ctx.config()?;
    let resolved = config.resolve()?;

    println!("{}", crate::report::format_config_summary(config, &resolved));
    if let Some(path) = &ctx.config_path {
        println!("OK: {}", path.display());
    }
    Ok(())
}

fn handle_show(args: ShowArgs) -> Result<(), AppError> {
    let ctx = load_config(args.config.config)?;
    let config = ctx.config()?;

    if args.resolved {
        let resolved = config.resolve()?;
        let json = serde_json::to_string_pretty(&resolved)
            .map_err(|e| AppError::new(4, format!("Failed to serialize resolved configuration: {e}")))?;
        println!("{json}");
    } else {
        print!("{}", config.to_yaml()?);
    }
    Ok(())
}

fn handle_bins(args: ConfigArgs) -> Result<(), AppError> {
    let ctx = load_config(args.config)?;
    let bins = WavelengthBins::from_instrument(&ctx.config()?.observatory.instrument_parameters)?;
    print!("{}", crate::report::format_bins_table(&bins));
    Ok(())
}

fn handle_target(args: TargetArgs) -> Result<(), AppError> {
    let config_path = config_path(args.config)?;
    let ctx = Pipeline::new()
        .with(ConfigLoaderModule::new(config_path))
        .with(TargetLoaderModule::new(&args.target))
        .run()?;

    let grid_size = ctx.config()?.settings.grid_size;
    let target = ctx.target()?;
    println!("{}", crate::report::format_target_summary(target, grid_size));

    if args.map {
        let distance = target.star.distance_m();
        for planet in &target.planets {
            println!("{}", crate::plot::render_planet_map(planet, distance, grid_size));
        }
    }
    Ok(())
}

fn handle_extract(args: ExtractArgs) -> Result<(), AppError> {
    let ctx = Pipeline::new()
        .with(MeasurementReaderModule::measurement(&args.data))
        .with(MeasurementReaderModule::templates(&args.templates))
        .with(ExtractionModule)
        .run()?;

    let result = ctx
        .extraction
        .as_ref()
        .ok_or_else(|| AppError::new(4, "Extraction produced no result."))?;

    println!("{}", crate::report::format_extraction_summary(result));

    if !args.no_plot {
        for (o, map) in result.cost_maps.iter().enumerate() {
            let title = format!("output {o}");
            println!("{}", crate::plot::render_cost_map(map, &title, args.width, args.height));
        }
    }

    // Optional exports.
    if let Some(path) = &args.export {
        crate::io::export::write_extraction_json(path, result)?;
        debug!(path = %path.display(), "wrote extraction JSON");
    }
    if let Some(path) = &args.export_csv {
        crate::io::export::write_cost_csv(path, result)?;
        debug!(path = %path.display(), "wrote cost CSV");
    }

    Ok(())
}

fn load_config(arg: Option<PathBuf>) -> Result<Context, AppError> {
    let path = config_path(arg)?;
    Pipeline::new().with(ConfigLoaderModule::new(path)).run()
}

fn config_path(arg: Option<PathBuf>) -> Result<PathBuf, AppError> {
    resolve_config_path(arg, std::env::var(CONFIG_ENV).ok())
}

/// The explicit argument wins; otherwise `SYGN_CONFIG` (possibly from `.env`).
pub fn resolve_config_path(arg: Option<PathBuf>, env: Option<String>) -> Result<PathBuf, AppError> {
    if let Some(path) = arg {
        return Ok(path);
    }
    match env {
        Some(value) if !value.trim().is_empty() => Ok(PathBuf::from(value.trim())),
        _ => Err(AppError::new(
            2,
            format!("No configuration given: pass <CONFIG> or set {CONFIG_ENV} (environment or .env)."),
        )),
    }
}

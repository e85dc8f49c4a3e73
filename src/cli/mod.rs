//! Command-line parsing for the `sygn` configuration and extraction tool.
//!
//! The goal of this module is to keep **argument parsing** separate from
//! command dispatch (`app`) and the loading/extraction code.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

/// Top-level CLI.
#[derive(Debug, Parser)]
#[command(
    name = "sygn",
    version,
    about = "Nulling interferometer simulation configuration and signal extraction"
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

/// CLI subcommands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Load and validate a configuration document, then print a summary.
    Check(ConfigArgs),
    /// Print the normalized configuration document.
    Show(ShowArgs),
    /// Print the wavelength bins of the configured instrument.
    Bins(ConfigArgs),
    /// Summarize a target system (star, habitable zone, planet positions).
    Target(TargetArgs),
    /// Run ML extraction of a measurement against a directory of templates.
    Extract(ExtractArgs),
}

/// A configuration document, falling back to `SYGN_CONFIG`.
#[derive(Debug, Args, Clone)]
pub struct ConfigArgs {
    /// Configuration YAML (defaults to $SYGN_CONFIG).
    #[arg(value_name = "CONFIG")]
    pub config: Option<PathBuf>,
}

#[derive(Debug, Args, Clone)]
pub struct ShowArgs {
    #[command(flatten)]
    pub config: ConfigArgs,

    /// Print SI-resolved values as JSON instead of the YAML document.
    #[arg(long)]
    pub resolved: bool,
}

#[derive(Debug, Args, Clone)]
pub struct TargetArgs {
    /// Target system YAML.
    #[arg(value_name = "TARGET")]
    pub target: PathBuf,

    /// Configuration YAML for the sky grid (defaults to $SYGN_CONFIG).
    #[arg(long, value_name = "CONFIG")]
    pub config: Option<PathBuf>,

    /// Draw each planet's position on its sky grid.
    #[arg(long)]
    pub map: bool,
}

#[derive(Debug, Args, Clone)]
pub struct ExtractArgs {
    /// Measurement JSON (synthetic measurement with config header).
    #[arg(long, value_name = "JSON")]
    pub data: PathBuf,

    /// Directory of template JSON files, one per grid cell.
    #[arg(long, value_name = "DIR")]
    pub templates: PathBuf,

    /// Export the full extraction result to JSON.
    #[arg(long, value_name = "JSON")]
    pub export: Option<PathBuf>,

    /// Export the cost table to CSV.
    #[arg(long = "export-csv", value_name = "CSV")]
    pub export_csv: Option<PathBuf>,

    /// Disable the terminal cost-map plot.
    #[arg(long)]
    pub no_plot: bool,

    /// Plot width (columns).
    #[arg(long, default_value_t = 60)]
    pub width: usize,

    /// Plot height (rows).
    #[arg(long, default_value_t = 30)]
    pub height: usize,
}

//! CLI argument definitions using clap.

use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

/// meas-calc - aperture correction and catalog calculation over source catalogs
#[derive(Parser, Debug)]
#[command(
    name = "meas-calc",
    author,
    version,
    about = "Aperture correction and catalog calculation for source catalogs",
    long_about = "Applies aperture corrections to flux measurements and runs the configured \n\
                  catalog calculation plugins over a source catalog, writing the \n\
                  augmented catalog back out as JSON."
)]
pub struct Cli {
    /// Increase logging verbosity (-v for debug, -vv for trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true, env = "MEAS_CALC_VERBOSE")]
    pub verbose: u8,

    /// Suppress all output except warnings and errors
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Log output format
    #[arg(
        long,
        value_enum,
        default_value = "pretty",
        global = true,
        env = "MEAS_CALC_LOG_FORMAT"
    )]
    pub log_format: LogFormat,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Correct and classify a catalog
    Run(RunArgs),

    /// Validate a measurement configuration without running
    Validate(ValidateArgs),

    /// Display the resolved configuration
    Info(InfoArgs),
}

/// Arguments for the `run` command
#[derive(Parser, Debug, Clone)]
pub struct RunArgs {
    /// Path to measurement configuration (TOML or JSON)
    #[arg(
        short,
        long,
        default_value = "measurement.toml",
        env = "MEAS_CALC_CONFIG"
    )]
    pub config: PathBuf,

    /// Input catalog document (JSON)
    #[arg(long, env = "MEAS_CALC_CATALOG")]
    pub catalog: PathBuf,

    /// Aperture correction map document (JSON)
    #[arg(long, env = "MEAS_CALC_AP_CORR_MAP")]
    pub ap_corr_map: Option<PathBuf>,

    /// Output catalog document (JSON)
    #[arg(short, long, env = "MEAS_CALC_OUTPUT")]
    pub output: PathBuf,

    /// Do not apply aperture corrections
    #[arg(long)]
    pub skip_ap_corr: bool,

    /// Do not run catalog calculation plugins
    #[arg(long)]
    pub skip_catalog_calculation: bool,

    /// Use the quadrature flux error formula instead of the naive one
    #[arg(long)]
    pub full_flux_err: bool,

    /// Build the tasks against the input schema and exit without writing
    #[arg(long)]
    pub dry_run: bool,

    /// Metrics server port (0 = disabled)
    #[arg(long, default_value = "0", env = "MEAS_CALC_METRICS_PORT")]
    pub metrics_port: u16,
}

/// Arguments for the `validate` command
#[derive(Parser, Debug)]
pub struct ValidateArgs {
    /// Path to configuration file to validate
    #[arg(short, long, default_value = "measurement.toml")]
    pub config: PathBuf,

    /// Output validation result as JSON
    #[arg(long)]
    pub json: bool,
}

/// Arguments for the `info` command
#[derive(Parser, Debug)]
pub struct InfoArgs {
    /// Path to configuration file
    #[arg(short, long, default_value = "measurement.toml")]
    pub config: PathBuf,

    /// Output as JSON
    #[arg(long)]
    pub json: bool,

    /// Show resolved plugin configuration
    #[arg(long)]
    pub plugins: bool,
}

/// Log output format
#[derive(ValueEnum, Clone, Copy, Debug, Default)]
pub enum LogFormat {
    /// JSON structured logging
    Json,
    /// Human-readable pretty format
    #[default]
    Pretty,
    /// Compact single-line format
    Compact,
}

impl From<LogFormat> for observability::LogFormat {
    fn from(format: LogFormat) -> Self {
        match format {
            LogFormat::Json => Self::Json,
            LogFormat::Pretty => Self::Pretty,
            LogFormat::Compact => Self::Compact,
        }
    }
}

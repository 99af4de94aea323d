//! CLI argument definitions using clap.

use clap::{Parser, Subcommand, ValueEnum};
use contracts::DurationChoice;
use std::path::PathBuf;

/// Goniometer - dual-sensor arm angle measurement pipeline
#[derive(Parser, Debug)]
#[command(
    name = "goniometer",
    author,
    version,
    about = "Dual-sensor arm angle measurement pipeline",
    long_about = "Measures an arm elevation angle from accelerometer and gyroscope streams.\n\n\
                  Combines both streams, runs an EWMA tilt estimate and a gyro/accel \n\
                  complementary fusion in parallel, records every result for the \n\
                  configured duration and exports the record as CSV."
)]
pub struct Cli {
    /// Increase logging verbosity (-v for debug, -vv for trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true, env = "GONIOMETER_VERBOSE")]
    pub verbose: u8,

    /// Suppress all output except errors
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Log output format
    #[arg(
        long,
        value_enum,
        default_value = "pretty",
        global = true,
        env = "GONIOMETER_LOG_FORMAT"
    )]
    pub log_format: LogFormat,

    #[command(subcommand)]
    pub command: Commands,
}

/// Available CLI commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Run one measurement session and export the record
    Run(RunArgs),

    /// Validate configuration file without running
    Validate(ValidateArgs),

    /// Display configuration information
    Info(InfoArgs),
}

/// Arguments for the `run` command
#[derive(Parser, Debug, Clone)]
pub struct RunArgs {
    /// Path to configuration file (TOML or JSON)
    #[arg(
        short,
        long,
        default_value = "goniometer.toml",
        env = "GONIOMETER_CONFIG"
    )]
    pub config: PathBuf,

    /// Override measurement duration from configuration
    #[arg(long, value_enum, env = "GONIOMETER_DURATION")]
    pub duration: Option<DurationArg>,

    /// Override CSV output path from configuration
    #[arg(short, long, env = "GONIOMETER_OUTPUT")]
    pub output: Option<PathBuf>,

    /// Override sample channel capacity from configuration
    #[arg(long, env = "GONIOMETER_CHANNEL_CAPACITY")]
    pub channel_capacity: Option<usize>,

    /// Validate configuration and exit without measuring
    #[arg(long)]
    pub dry_run: bool,

    /// Metrics server port (0 = disabled)
    #[arg(long, default_value = "0", env = "GONIOMETER_METRICS_PORT")]
    pub metrics_port: u16,
}

/// Arguments for the `validate` command
#[derive(Parser, Debug)]
pub struct ValidateArgs {
    /// Path to configuration file to validate
    #[arg(short, long, default_value = "goniometer.toml")]
    pub config: PathBuf,

    /// Output validation result as JSON
    #[arg(long)]
    pub json: bool,
}

/// Arguments for the `info` command
#[derive(Parser, Debug)]
pub struct InfoArgs {
    /// Path to configuration file
    #[arg(short, long, default_value = "goniometer.toml")]
    pub config: PathBuf,

    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}

/// Selectable measurement duration
#[derive(ValueEnum, Clone, Copy, Debug)]
pub enum DurationArg {
    /// 1 second run
    Short,
    /// 10 second run
    Long,
}

impl From<DurationArg> for DurationChoice {
    fn from(arg: DurationArg) -> Self {
        match arg {
            DurationArg::Short => DurationChoice::Short,
            DurationArg::Long => DurationChoice::Long,
        }
    }
}

/// Log output format
#[derive(ValueEnum, Clone, Debug, Default)]
pub enum LogFormat {
    /// JSON structured logging
    Json,
    /// Human-readable pretty format
    #[default]
    Pretty,
    /// Compact single-line format
    Compact,
}

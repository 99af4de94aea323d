//! `info` command implementation.

use anyhow::{Context, Result};
use contracts::AppConfig;
use serde::Serialize;
use tracing::info;

use crate::cli::InfoArgs;

/// Configuration info for JSON output
#[derive(Serialize)]
struct ConfigInfo {
    session: SessionInfo,
    sensors: SensorsInfo,
    export: ExportInfo,
}

#[derive(Serialize)]
struct SessionInfo {
    duration_seconds: f32,
    ewma_alpha: f32,
    fusion_weight: f32,
}

#[derive(Serialize)]
struct SensorsInfo {
    accel_hz: f64,
    gyro_hz: f64,
    channel_capacity: usize,
    drop_policy: String,
}

#[derive(Serialize)]
struct ExportInfo {
    output_path: String,
}

/// Execute the `info` command
pub fn run_info(args: &InfoArgs) -> Result<()> {
    info!(config = %args.config.display(), "Loading configuration info");

    if !args.config.exists() {
        anyhow::bail!("Configuration file not found: {}", args.config.display());
    }

    let config = config_loader::ConfigLoader::load_from_path(&args.config)
        .with_context(|| format!("Failed to load config from {}", args.config.display()))?;

    if args.json {
        let info = build_config_info(&config);
        let json =
            serde_json::to_string_pretty(&info).context("Failed to serialize config info")?;
        println!("{}", json);
    } else {
        print_config_info(&config);
    }

    Ok(())
}

fn build_config_info(config: &AppConfig) -> ConfigInfo {
    ConfigInfo {
        session: SessionInfo {
            duration_seconds: config.session.duration.limit_seconds(),
            ewma_alpha: config.session.tuning.ewma_alpha,
            fusion_weight: config.session.tuning.fusion_weight,
        },
        sensors: SensorsInfo {
            accel_hz: config.sensors.accel_hz,
            gyro_hz: config.sensors.gyro_hz,
            channel_capacity: config.sensors.channel_capacity,
            drop_policy: format!("{:?}", config.sensors.drop_policy),
        },
        export: ExportInfo {
            output_path: config.export.output_path.display().to_string(),
        },
    }
}

fn print_config_info(config: &AppConfig) {
    println!("Session:");
    println!("  Duration: {} s", config.session.duration.limit_seconds());
    println!("  EWMA alpha: {}", config.session.tuning.ewma_alpha);
    println!("  Fusion weight: {}", config.session.tuning.fusion_weight);
    println!("Sensors:");
    println!("  Accelerometer: {} Hz", config.sensors.accel_hz);
    println!("  Gyroscope: {} Hz", config.sensors.gyro_hz);
    println!("  Channel capacity: {}", config.sensors.channel_capacity);
    println!("  Drop policy: {:?}", config.sensors.drop_policy);
    println!("Export:");
    println!("  Output: {}", config.export.output_path.display());
}

//! `validate` command implementation.

use anyhow::{Context, Result};
use contracts::AppConfig;
use serde::Serialize;
use tracing::info;

use crate::cli::ValidateArgs;

/// Validation result for JSON output
#[derive(Serialize)]
struct ValidationResult {
    valid: bool,
    config_path: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    warnings: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    summary: Option<ConfigSummary>,
}

#[derive(Serialize)]
struct ConfigSummary {
    duration_seconds: f32,
    accel_hz: f64,
    gyro_hz: f64,
    channel_capacity: usize,
    output_path: String,
}

/// Execute the `validate` command
pub fn run_validate(args: &ValidateArgs) -> Result<()> {
    info!(config = %args.config.display(), "Validating configuration");

    let result = validate_config(args);

    if args.json {
        let json = serde_json::to_string_pretty(&result)
            .context("Failed to serialize validation result")?;
        println!("{}", json);
    } else {
        print_validation_result(&result);
    }

    if result.valid {
        Ok(())
    } else {
        anyhow::bail!("Configuration validation failed")
    }
}

fn validate_config(args: &ValidateArgs) -> ValidationResult {
    let config_path = args.config.display().to_string();

    // Check file exists
    if !args.config.exists() {
        return ValidationResult {
            valid: false,
            config_path,
            error: Some(format!("File not found: {}", args.config.display())),
            warnings: None,
            summary: None,
        };
    }

    // Try to load and validate
    match config_loader::ConfigLoader::load_from_path(&args.config) {
        Ok(config) => {
            let warnings = collect_warnings(&config);

            ValidationResult {
                valid: true,
                config_path,
                error: None,
                warnings: if warnings.is_empty() {
                    None
                } else {
                    Some(warnings)
                },
                summary: Some(ConfigSummary {
                    duration_seconds: config.session.duration.limit_seconds(),
                    accel_hz: config.sensors.accel_hz,
                    gyro_hz: config.sensors.gyro_hz,
                    channel_capacity: config.sensors.channel_capacity,
                    output_path: config.export.output_path.display().to_string(),
                }),
            }
        }
        Err(e) => ValidationResult {
            valid: false,
            config_path,
            error: Some(e.to_string()),
            warnings: None,
            summary: None,
        },
    }
}

/// Collect configuration warnings (non-fatal issues)
fn collect_warnings(config: &AppConfig) -> Vec<String> {
    let mut warnings = Vec::new();

    if config.sensors.channel_capacity < 8 {
        warnings.push(format!(
            "sensors.channel_capacity = {} is very small; bursts will be dropped aggressively",
            config.sensors.channel_capacity
        ));
    }

    if config.session.tuning.ewma_alpha > 0.9 {
        warnings.push(format!(
            "session.tuning.ewma_alpha = {} barely smooths the tilt angle",
            config.session.tuning.ewma_alpha
        ));
    }

    let rate_ratio = config.sensors.accel_hz / config.sensors.gyro_hz;
    if !(0.1..=10.0).contains(&rate_ratio) {
        warnings.push(format!(
            "sensor rates differ by {rate_ratio:.0}x; the slower stream will dominate staleness"
        ));
    }

    warnings
}

fn print_validation_result(result: &ValidationResult) {
    if result.valid {
        println!("✓ Configuration is valid: {}", result.config_path);

        if let Some(ref summary) = result.summary {
            println!("\n  Duration: {} s", summary.duration_seconds);
            println!("  Accelerometer: {} Hz", summary.accel_hz);
            println!("  Gyroscope: {} Hz", summary.gyro_hz);
            println!("  Channel capacity: {}", summary.channel_capacity);
            println!("  Output: {}", summary.output_path);
        }

        if let Some(ref warnings) = result.warnings {
            println!("\n⚠ Warnings:");
            for warning in warnings {
                println!("  - {}", warning);
            }
        }
    } else {
        println!("✗ Configuration is invalid: {}", result.config_path);
        if let Some(ref error) = result.error {
            println!("\n  Error: {}", error);
        }
    }
}

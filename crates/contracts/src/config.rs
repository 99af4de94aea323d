//! AppConfig - top-level application configuration
//!
//! Loaded from TOML or JSON by `config_loader`, consumed by the CLI.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::{DurationChoice, EstimatorTuning};

/// Drop policy when the sample channel is full
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DropPolicy {
    /// Reject the incoming sample, keep queued ones (last-value-wins consumer
    /// sees a slightly staler latest)
    #[default]
    DropNewest,
    /// Evict the oldest queued sample to make room
    DropOldest,
}

/// Top-level application configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AppConfig {
    /// Session defaults
    #[serde(default)]
    pub session: SessionSection,

    /// Sensor source configuration
    #[serde(default)]
    pub sensors: SensorSection,

    /// Export configuration
    #[serde(default)]
    pub export: ExportSection,
}

/// `[session]` section
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct SessionSection {
    /// Default duration used when the CLI does not override it
    #[serde(default)]
    pub duration: DurationChoice,

    /// Estimator coefficients
    #[serde(default)]
    pub tuning: EstimatorTuning,
}

/// `[sensors]` section
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SensorSection {
    /// Accelerometer sample rate (Hz)
    #[serde(default = "default_sample_hz")]
    pub accel_hz: f64,

    /// Gyroscope sample rate (Hz)
    #[serde(default = "default_sample_hz")]
    pub gyro_hz: f64,

    /// Bounded sample channel capacity
    #[serde(default = "default_channel_capacity")]
    pub channel_capacity: usize,

    /// Behavior when the channel is full
    #[serde(default)]
    pub drop_policy: DropPolicy,
}

fn default_sample_hz() -> f64 {
    50.0
}

fn default_channel_capacity() -> usize {
    64
}

impl Default for SensorSection {
    fn default() -> Self {
        Self {
            accel_hz: default_sample_hz(),
            gyro_hz: default_sample_hz(),
            channel_capacity: default_channel_capacity(),
            drop_policy: DropPolicy::default(),
        }
    }
}

/// `[export]` section
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExportSection {
    /// CSV output path
    #[serde(default = "default_output_path")]
    pub output_path: PathBuf,
}

fn default_output_path() -> PathBuf {
    PathBuf::from("./results.csv")
}

impl Default for ExportSection {
    fn default() -> Self {
        Self {
            output_path: default_output_path(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_fill_missing_sections() {
        let config: AppConfig = serde_json::from_str("{}").unwrap();
        assert_eq!(config.sensors.accel_hz, 50.0);
        assert_eq!(config.sensors.channel_capacity, 64);
        assert_eq!(config.session.duration, DurationChoice::Long);
        assert_eq!(config.export.output_path, PathBuf::from("./results.csv"));
    }
}

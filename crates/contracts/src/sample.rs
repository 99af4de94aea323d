//! AxisSample - Ingestion output
//!
//! Raw per-sensor sample structure.

use serde::{Deserialize, Serialize};

/// Which hardware stream a sample came from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SensorKind {
    /// Accelerometer (m/s² per axis)
    Accelerometer,
    /// Gyroscope (rad/s per axis)
    Gyroscope,
}

impl SensorKind {
    /// Stable identifier used in logs and metrics labels
    pub fn as_str(&self) -> &'static str {
        match self {
            SensorKind::Accelerometer => "accelerometer",
            SensorKind::Gyroscope => "gyroscope",
        }
    }
}

impl std::fmt::Display for SensorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// 3-axis sensor value
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Vector3 {
    pub x: f32,
    pub y: f32,
    pub z: f32,
}

impl Vector3 {
    /// Create a new vector
    pub fn new(x: f32, y: f32, z: f32) -> Self {
        Self { x, y, z }
    }

    /// Euclidean norm
    pub fn norm(&self) -> f32 {
        (self.x * self.x + self.y * self.y + self.z * self.z).sqrt()
    }
}

/// One raw sensor callback reading
///
/// Values are copied out of the producing source's buffer at delivery time;
/// a sample never aliases hardware-owned memory.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AxisSample {
    /// Producing stream
    pub kind: SensorKind,

    /// (X, Y, Z) reading
    pub values: Vector3,

    /// Arrival timestamp (wall clock, milliseconds)
    pub timestamp_ms: i64,
}

impl AxisSample {
    /// Convenience constructor
    pub fn new(kind: SensorKind, values: Vector3, timestamp_ms: i64) -> Self {
        Self {
            kind,
            values,
            timestamp_ms,
        }
    }
}

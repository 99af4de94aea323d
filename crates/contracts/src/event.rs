//! SyncedEvent / MeasuredResult - pipeline stage outputs

use serde::{Deserialize, Serialize};

use crate::Vector3;

/// Combined accelerometer + gyroscope event
///
/// Produced by the stream combiner whenever either source delivers a sample,
/// pairing it with the latest cached sample from the other side.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SyncedEvent {
    /// Latest known accelerometer reading (zero vector until the first sample)
    pub accel: Vector3,

    /// Latest known gyroscope reading (zero vector until the first sample)
    pub gyro: Vector3,

    /// max(accel timestamp, gyro timestamp) of the contributing samples (ms)
    pub timestamp_ms: i64,
}

/// One estimator output per synced event
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MeasuredResult {
    /// Timestamp of the event this result was derived from (ms)
    pub timestamp_ms: i64,

    /// Algorithm 1: EWMA-smoothed accelerometer tilt angle (degrees)
    pub tilt_angle: f32,

    /// Algorithm 2: gyro/accel complementary fusion angle (degrees)
    pub fusion_angle: f32,
}

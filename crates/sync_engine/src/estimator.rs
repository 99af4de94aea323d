//! Angle estimation: EWMA tilt + complementary fusion.

use contracts::{EstimatorTuning, MeasuredResult, SyncedEvent};
use tracing::instrument;

/// Filter memory carried between events
///
/// Owned exclusively by one estimator and mutated from the pipeline's single
/// consumption context; never shared across concurrent sessions.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct EstimatorState {
    /// Last EWMA-filtered tilt angle (degrees)
    pub last_tilt: f32,
    /// Last fusion angle (degrees)
    pub last_fusion: f32,
    /// Timestamp of the last processed event, unset before the first
    pub last_timestamp: Option<i64>,
}

/// Stateful two-algorithm angle estimator
///
/// Per event: algorithm 1 projects the accelerometer gravity vector into a
/// tilt angle and smooths it with an EWMA; algorithm 2 integrates the
/// gyroscope X rate over dt and blends it with the tilt angle through a
/// complementary filter. All output angles are degrees.
#[derive(Debug)]
pub struct AngleEstimator {
    tuning: EstimatorTuning,
    state: EstimatorState,
}

impl AngleEstimator {
    /// Create an estimator with zeroed state
    pub fn new(tuning: EstimatorTuning) -> Self {
        Self {
            tuning,
            state: EstimatorState::default(),
        }
    }

    /// Reset filter memory for a new session
    ///
    /// Required at every session start so a fresh run does not inherit stale
    /// filter memory from the previous one.
    pub fn reset(&mut self, tuning: EstimatorTuning) {
        self.tuning = tuning;
        self.state = EstimatorState::default();
    }

    /// Current filter memory (diagnostics and tests)
    pub fn state(&self) -> EstimatorState {
        self.state
    }

    /// Process one combined event
    #[instrument(
        level = "trace",
        name = "estimator_update",
        skip(self, event),
        fields(timestamp_ms = event.timestamp_ms)
    )]
    pub fn update(&mut self, event: &SyncedEvent) -> MeasuredResult {
        let dt = match self.state.last_timestamp {
            Some(last) => (event.timestamp_ms - last) as f32 / 1_000.0,
            None => 0.0,
        };
        self.state.last_timestamp = Some(event.timestamp_ms);

        let tilt = self.tilt_angle(event);
        let fusion = self.fusion_angle(tilt, event.gyro.x, dt);

        MeasuredResult {
            timestamp_ms: event.timestamp_ms,
            tilt_angle: tilt,
            fusion_angle: fusion,
        }
    }

    /// Algorithm 1: accelerometer tilt, EWMA-smoothed
    ///
    /// The projection axis pair is Y/Z: angle between the sensed gravity
    /// vector and the device Y axis, via atan2(az, ay).
    fn tilt_angle(&mut self, event: &SyncedEvent) -> f32 {
        // Zero-norm guard: no usable gravity direction, reuse the previous
        // filtered value instead of propagating NaN.
        if event.accel.norm() == 0.0 {
            metrics::counter!("estimator_zero_norm_total").increment(1);
            return self.state.last_tilt;
        }

        let raw = event.accel.z.atan2(event.accel.y).to_degrees();

        // Seed the filter with the first real reading rather than blending
        // against the zero initial state, which would bias startup toward 0.
        self.state.last_tilt = if self.state.last_tilt == 0.0 && raw > 0.0 {
            raw
        } else {
            let alpha = self.tuning.ewma_alpha;
            alpha * raw + (1.0 - alpha) * self.state.last_tilt
        };

        self.state.last_tilt
    }

    /// Algorithm 2: complementary filter over integrated gyro rate
    fn fusion_angle(&mut self, tilt: f32, gyro_x_rad: f32, dt: f32) -> f32 {
        let gyro_deg_per_sec = gyro_x_rad.to_degrees();
        let weight = self.tuning.fusion_weight;

        self.state.last_fusion =
            weight * tilt + (1.0 - weight) * (self.state.last_fusion + gyro_deg_per_sec * dt);
        self.state.last_fusion
    }
}

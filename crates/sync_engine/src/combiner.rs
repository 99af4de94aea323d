//! Combine-latest stream merge.

use contracts::{AxisSample, SensorKind, SyncedEvent, Vector3};
use tracing::instrument;

/// Two-stream combine-latest operator
///
/// Holds exactly the most recent sample per side and emits one `SyncedEvent`
/// for every incoming sample, paired with the other side's cached latest.
/// This is not a join: it never waits for matching timestamps and never
/// buffers more than one sample per side. A side that has not produced a
/// sample yet is tracked explicitly as absent; its value is materialized as
/// the zero-vector placeholder only when an event is emitted.
#[derive(Debug, Default)]
pub struct StreamCombiner {
    /// Most recent accelerometer sample, if any
    latest_accel: Option<AxisSample>,
    /// Most recent gyroscope sample, if any
    latest_gyro: Option<AxisSample>,
    /// Emitted event counter
    emitted: u64,
}

impl StreamCombiner {
    /// Create an empty combiner
    pub fn new() -> Self {
        Self::default()
    }

    /// Push a sample from either stream
    ///
    /// Emits exactly one event carrying the latest known value for both
    /// sides with `timestamp_ms = max` of the contributing timestamps.
    #[instrument(
        level = "trace",
        name = "combiner_push",
        skip(self, sample),
        fields(kind = %sample.kind, timestamp_ms = sample.timestamp_ms)
    )]
    pub fn push(&mut self, sample: AxisSample) -> SyncedEvent {
        match sample.kind {
            SensorKind::Accelerometer => self.latest_accel = Some(sample),
            SensorKind::Gyroscope => self.latest_gyro = Some(sample),
        }

        self.emitted += 1;
        metrics::counter!("combiner_events_total", "trigger" => sample.kind.as_str())
            .increment(1);

        let accel_ts = self.latest_accel.map(|s| s.timestamp_ms);
        let gyro_ts = self.latest_gyro.map(|s| s.timestamp_ms);

        SyncedEvent {
            accel: self
                .latest_accel
                .map(|s| s.values)
                .unwrap_or(Vector3::default()),
            gyro: self
                .latest_gyro
                .map(|s| s.values)
                .unwrap_or(Vector3::default()),
            timestamp_ms: accel_ts.max(gyro_ts).unwrap_or(sample.timestamp_ms),
        }
    }

    /// Which sides have delivered at least one sample (accel, gyro)
    ///
    /// Distinguishes "sensor absent" from "sensor reads exactly zero", which
    /// the emitted events alone cannot.
    pub fn live_sides(&self) -> (bool, bool) {
        (self.latest_accel.is_some(), self.latest_gyro.is_some())
    }

    /// Total events emitted since construction or the last reset
    pub fn event_count(&self) -> u64 {
        self.emitted
    }

    /// Forget both cached samples
    ///
    /// Called at session start so a new run never pairs fresh samples with
    /// the previous run's stale cache.
    pub fn reset(&mut self) {
        self.latest_accel = None;
        self.latest_gyro = None;
        self.emitted = 0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn accel(x: f32, y: f32, z: f32, ts: i64) -> AxisSample {
        AxisSample::new(SensorKind::Accelerometer, Vector3::new(x, y, z), ts)
    }

    fn gyro(x: f32, y: f32, z: f32, ts: i64) -> AxisSample {
        AxisSample::new(SensorKind::Gyroscope, Vector3::new(x, y, z), ts)
    }

    #[test]
    fn test_emits_on_every_sample() {
        let mut combiner = StreamCombiner::new();
        combiner.push(accel(0.0, 9.8, 0.0, 10));
        combiner.push(gyro(0.1, 0.0, 0.0, 12));
        combiner.push(accel(0.0, 9.7, 0.5, 30));
        assert_eq!(combiner.event_count(), 3);
    }

    #[test]
    fn test_placeholder_until_other_side_speaks() {
        let mut combiner = StreamCombiner::new();

        let event = combiner.push(accel(0.0, 9.8, 0.0, 100));
        assert_eq!(event.gyro, Vector3::default());
        assert_eq!(event.accel, Vector3::new(0.0, 9.8, 0.0));
        assert_eq!(event.timestamp_ms, 100);
        assert_eq!(combiner.live_sides(), (true, false));
    }

    #[test]
    fn test_timestamp_is_max_of_sides() {
        let mut combiner = StreamCombiner::new();
        combiner.push(accel(0.0, 9.8, 0.0, 200));

        // Gyro sample arrives with an older timestamp; the event still
        // carries the accel's newer one.
        let event = combiner.push(gyro(0.5, 0.0, 0.0, 150));
        assert_eq!(event.timestamp_ms, 200);

        let event = combiner.push(gyro(0.6, 0.0, 0.0, 250));
        assert_eq!(event.timestamp_ms, 250);
    }

    #[test]
    fn test_monotonic_latest_invariant() {
        // For any interleaving, an emitted event never carries a value older
        // than the newest observed for that side.
        let mut combiner = StreamCombiner::new();
        let samples = [
            accel(1.0, 0.0, 0.0, 10),
            gyro(0.1, 0.0, 0.0, 11),
            gyro(0.2, 0.0, 0.0, 15),
            accel(2.0, 0.0, 0.0, 18),
            gyro(0.3, 0.0, 0.0, 19),
        ];

        let mut newest_accel = Vector3::default();
        let mut newest_gyro = Vector3::default();
        for sample in samples {
            match sample.kind {
                SensorKind::Accelerometer => newest_accel = sample.values,
                SensorKind::Gyroscope => newest_gyro = sample.values,
            }
            let event = combiner.push(sample);
            assert_eq!(event.accel, newest_accel);
            assert_eq!(event.gyro, newest_gyro);
        }
    }

    #[test]
    fn test_reset_clears_cache() {
        let mut combiner = StreamCombiner::new();
        combiner.push(accel(1.0, 2.0, 3.0, 500));
        combiner.push(gyro(0.1, 0.2, 0.3, 510));
        combiner.reset();

        assert_eq!(combiner.live_sides(), (false, false));
        assert_eq!(combiner.event_count(), 0);

        // A fresh gyro sample must not see the previous run's accel value.
        let event = combiner.push(gyro(0.5, 0.0, 0.0, 600));
        assert_eq!(event.accel, Vector3::default());
        assert_eq!(event.timestamp_ms, 600);
    }
}

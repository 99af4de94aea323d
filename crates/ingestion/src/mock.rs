//! Mock sensor sources
//!
//! For running and testing without hardware.

use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use contracts::{AxisSample, SampleCallback, SensorKind, SensorSource, Vector3};
use tracing::debug;

const GRAVITY: f32 = 9.81;

/// Signal shape produced by a mock source
#[derive(Debug, Clone)]
pub enum Waveform {
    /// Fixed reading every tick
    Constant(Vector3),

    /// Simulated arm raise: gravity rotating from the Y axis toward the Z
    /// axis and back over `period_s`. For a gyroscope source this produces
    /// the matching X-axis angular rate instead.
    Sweep { period_s: f64 },

    /// Exact pre-scripted samples (their own timestamps), delivered at the
    /// configured rate; the source stops itself when the script runs out
    Scripted(Vec<AxisSample>),
}

/// Mock sensor source
///
/// Generates samples on a tokio task at a fixed rate until stopped.
pub struct MockSensorSource {
    kind: SensorKind,
    frequency_hz: f64,
    waveform: Waveform,
    running: Arc<AtomicBool>,
    /// Bumped on every listen; a delivery task whose generation no longer
    /// matches retires silently, so stop-then-listen cannot resurrect it
    generation: Arc<AtomicU64>,
}

impl MockSensorSource {
    /// Create a mock source with an explicit waveform
    pub fn new(kind: SensorKind, frequency_hz: f64, waveform: Waveform) -> Self {
        Self {
            kind,
            frequency_hz,
            waveform,
            running: Arc::new(AtomicBool::new(false)),
            generation: Arc::new(AtomicU64::new(0)),
        }
    }

    /// Mock accelerometer sweeping through an arm-raise motion
    pub fn accelerometer(frequency_hz: f64) -> Self {
        Self::new(
            SensorKind::Accelerometer,
            frequency_hz,
            Waveform::Sweep { period_s: 4.0 },
        )
    }

    /// Mock gyroscope producing the matching angular rate
    pub fn gyroscope(frequency_hz: f64) -> Self {
        Self::new(
            SensorKind::Gyroscope,
            frequency_hz,
            Waveform::Sweep { period_s: 4.0 },
        )
    }

    /// Mock source replaying an exact sample sequence
    pub fn scripted(kind: SensorKind, frequency_hz: f64, samples: Vec<AxisSample>) -> Self {
        Self::new(kind, frequency_hz, Waveform::Scripted(samples))
    }

    fn sweep_values(kind: SensorKind, period_s: f64, t: f64) -> Vector3 {
        // Arm angle oscillates 0..90 degrees over the period.
        let phase = 2.0 * std::f64::consts::PI * t / period_s;
        let angle = std::f64::consts::FRAC_PI_4 * (1.0 - phase.cos());

        match kind {
            SensorKind::Accelerometer => Vector3::new(
                0.0,
                GRAVITY * angle.cos() as f32,
                GRAVITY * angle.sin() as f32,
            ),
            SensorKind::Gyroscope => {
                // d(angle)/dt on the X axis, rad/s
                let rate =
                    std::f64::consts::FRAC_PI_4 * phase.sin() * 2.0 * std::f64::consts::PI
                        / period_s;
                Vector3::new(rate as f32, 0.0, 0.0)
            }
        }
    }

    fn now_ms() -> i64 {
        std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .map(|d| d.as_millis() as i64)
            .unwrap_or(0)
    }
}

impl SensorSource for MockSensorSource {
    fn kind(&self) -> SensorKind {
        self.kind
    }

    fn listen(&self, callback: SampleCallback) {
        if self.running.swap(true, Ordering::SeqCst) {
            return;
        }

        let kind = self.kind;
        let frequency_hz = self.frequency_hz;
        let waveform = self.waveform.clone();
        let running = self.running.clone();
        let generation = self.generation.clone();
        let my_generation = generation.fetch_add(1, Ordering::SeqCst) + 1;

        tokio::spawn(async move {
            let interval = Duration::from_secs_f64(1.0 / frequency_hz);
            let start = std::time::Instant::now();
            let mut script_index = 0usize;

            debug!(kind = %kind, frequency_hz, "mock sensor source started");

            while running.load(Ordering::Relaxed)
                && generation.load(Ordering::Relaxed) == my_generation
            {
                let sample = match &waveform {
                    Waveform::Constant(values) => {
                        AxisSample::new(kind, *values, Self::now_ms())
                    }
                    Waveform::Sweep { period_s } => {
                        let t = start.elapsed().as_secs_f64();
                        AxisSample::new(
                            kind,
                            Self::sweep_values(kind, *period_s, t),
                            Self::now_ms(),
                        )
                    }
                    Waveform::Scripted(samples) => match samples.get(script_index) {
                        Some(sample) => {
                            script_index += 1;
                            *sample
                        }
                        None => {
                            if generation.load(Ordering::SeqCst) == my_generation {
                                running.store(false, Ordering::SeqCst);
                            }
                            break;
                        }
                    },
                };

                callback(sample);
                tokio::time::sleep(interval).await;
            }

            debug!(kind = %kind, "mock sensor source stopped");
        });
    }

    fn stop(&self) {
        self.running.store(false, Ordering::SeqCst);
    }

    fn is_listening(&self) -> bool {
        self.running.load(Ordering::Relaxed)
    }
}

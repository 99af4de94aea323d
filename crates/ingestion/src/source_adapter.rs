//! Generic source adapter
//!
//! Adapts any `SensorSource` to the `SensorAdapter` interface so the
//! pipeline handles mock and hardware-backed sources uniformly.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use async_channel::Sender;
use contracts::{AxisSample, SampleCallback, SensorKind, SensorSource};
use tracing::{debug, trace};

use crate::adapter::{send_sample, SensorAdapter};
use crate::config::{BackpressureConfig, IngestionMetrics};
use crate::error::{IngestionError, Result};

/// Adapter wrapping a `SensorSource`
///
/// Sources are shared (`Arc`) so a session can re-subscribe the same source
/// across consecutive runs; the adapter is the per-run subscription handle.
pub struct SourceAdapter {
    source: Arc<dyn SensorSource>,
    config: BackpressureConfig,
    listening: Arc<AtomicBool>,
}

impl SourceAdapter {
    /// Create a new adapter
    pub fn new(source: Arc<dyn SensorSource>, config: BackpressureConfig) -> Self {
        Self {
            source,
            config,
            listening: Arc::new(AtomicBool::new(false)),
        }
    }
}

impl SensorAdapter for SourceAdapter {
    fn kind(&self) -> SensorKind {
        self.source.kind()
    }

    fn start(&self, tx: Sender<AxisSample>, metrics: Arc<IngestionMetrics>) -> Result<()> {
        if self.listening.swap(true, Ordering::SeqCst) {
            return Err(IngestionError::AlreadyListening {
                kind: self.source.kind(),
            });
        }

        let kind = self.source.kind();
        let drop_policy = self.config.drop_policy;
        let listening = self.listening.clone();

        debug!(kind = %kind, "starting source adapter");

        let callback: SampleCallback = Arc::new(move |sample| {
            // Samples arriving after stop() are discarded; the hardware
            // callback may fire once more before unregistration completes.
            if !listening.load(Ordering::Relaxed) {
                return;
            }

            metrics.record_received();
            trace!(kind = %kind, timestamp_ms = sample.timestamp_ms, "adapter received sample");
            if let Err(error) = send_sample(&tx, sample, &metrics, drop_policy) {
                tracing::warn!(%error, "sample delivery failed");
            }
        });

        self.source.listen(callback);
        Ok(())
    }

    fn stop(&self) {
        if self.listening.swap(false, Ordering::SeqCst) {
            debug!(kind = %self.source.kind(), "stopping source adapter");
            self.source.stop();
        }
    }

    fn is_listening(&self) -> bool {
        self.listening.load(Ordering::Relaxed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_channel::bounded;
    use contracts::{DropPolicy, Vector3};
    use std::time::Duration;

    /// Source driven by a plain thread for adapter-level tests
    struct ThreadedSource {
        kind: SensorKind,
        listening: Arc<AtomicBool>,
    }

    impl ThreadedSource {
        fn new(kind: SensorKind) -> Self {
            Self {
                kind,
                listening: Arc::new(AtomicBool::new(false)),
            }
        }
    }

    impl SensorSource for ThreadedSource {
        fn kind(&self) -> SensorKind {
            self.kind
        }

        fn listen(&self, callback: SampleCallback) {
            if self.listening.swap(true, Ordering::SeqCst) {
                return;
            }

            let kind = self.kind;
            let listening = self.listening.clone();

            std::thread::spawn(move || {
                let mut ts = 0i64;
                while listening.load(Ordering::Relaxed) {
                    ts += 10;
                    callback(AxisSample::new(kind, Vector3::new(0.0, 9.8, 0.0), ts));
                    std::thread::sleep(Duration::from_millis(10));
                }
            });
        }

        fn stop(&self) {
            self.listening.store(false, Ordering::SeqCst);
        }

        fn is_listening(&self) -> bool {
            self.listening.load(Ordering::Relaxed)
        }
    }

    #[test]
    fn test_source_adapter_forwards_samples() {
        let source = ThreadedSource::new(SensorKind::Accelerometer);
        let adapter = SourceAdapter::new(
            Arc::new(source),
            BackpressureConfig::new(16, DropPolicy::DropNewest),
        );

        let (tx, rx) = bounded(16);
        let metrics = Arc::new(IngestionMetrics::new());

        adapter.start(tx, metrics.clone()).unwrap();
        assert!(adapter.is_listening());

        std::thread::sleep(Duration::from_millis(60));
        adapter.stop();
        assert!(!adapter.is_listening());

        let mut count = 0;
        while rx.try_recv().is_ok() {
            count += 1;
        }
        assert!(count > 0);
        assert!(metrics.snapshot().samples_received >= count);
    }

    #[test]
    fn test_double_start_is_rejected() {
        let source = ThreadedSource::new(SensorKind::Gyroscope);
        let adapter = SourceAdapter::new(Arc::new(source), BackpressureConfig::default());

        let (tx, _rx) = bounded(16);
        let metrics = Arc::new(IngestionMetrics::new());

        adapter.start(tx.clone(), metrics.clone()).unwrap();
        assert!(matches!(
            adapter.start(tx, metrics),
            Err(IngestionError::AlreadyListening {
                kind: SensorKind::Gyroscope
            })
        ));
        assert!(adapter.is_listening());
        adapter.stop();
    }
}

//! Ingestion Pipeline main entry

use std::collections::HashMap;
use std::sync::Arc;

use async_channel::{bounded, Receiver, Sender};
use contracts::{AxisSample, SensorKind, SensorSource};
use tracing::{debug, info, instrument};

use crate::adapter::SensorAdapter;
use crate::config::{BackpressureConfig, IngestionMetrics};
use crate::source_adapter::SourceAdapter;

/// Ingestion Pipeline
///
/// Manages one adapter per sensor stream and fans all samples into a single
/// bounded channel. The channel is deliberately small: the downstream is a
/// last-value-wins combiner, so staleness is acceptable but unbounded
/// buffering is not.
pub struct IngestionPipeline {
    /// Registered adapters, one per stream
    adapters: HashMap<SensorKind, Box<dyn SensorAdapter>>,

    /// Shared metrics
    metrics: Arc<IngestionMetrics>,

    /// Sample sender, handed out to the adapters on start
    ///
    /// Released by `start_all` so the channel closes once the last source
    /// drops its callback; a receiver then sees the stream end.
    tx: Option<Sender<AxisSample>>,

    /// Sample receiver
    rx: Option<Receiver<AxisSample>>,

    /// Default backpressure configuration
    default_config: BackpressureConfig,
}

impl IngestionPipeline {
    /// Create new ingestion pipeline
    ///
    /// # Arguments
    /// * `channel_capacity` - sample channel capacity
    pub fn new(channel_capacity: usize) -> Self {
        Self::with_config(BackpressureConfig {
            channel_capacity,
            ..Default::default()
        })
    }

    /// Create with custom backpressure configuration
    pub fn with_config(config: BackpressureConfig) -> Self {
        let (tx, rx) = bounded(config.channel_capacity);

        Self {
            adapters: HashMap::new(),
            metrics: Arc::new(IngestionMetrics::new()),
            tx: Some(tx),
            rx: Some(rx),
            default_config: config,
        }
    }

    /// Register a sensor data source
    ///
    /// Registering a second source for the same stream replaces the previous
    /// one (its adapter is stopped on drop if it was listening).
    ///
    /// # Arguments
    /// * `source` - data source implementing `SensorSource`
    /// * `config` - optional backpressure configuration
    #[instrument(
        name = "ingestion_register_source",
        skip(self, source, config),
        fields(kind = %source.kind())
    )]
    pub fn register_source(
        &mut self,
        source: Arc<dyn SensorSource>,
        config: Option<BackpressureConfig>,
    ) {
        let kind = source.kind();
        let adapter = SourceAdapter::new(
            source,
            config.unwrap_or_else(|| self.default_config.clone()),
        );
        debug!(kind = %kind, "registered sensor source");
        if let Some(previous) = self.adapters.insert(kind, Box::new(adapter)) {
            previous.stop();
        }
    }

    /// Start all registered sources
    ///
    /// After this call the adapters hold the only senders: when every source
    /// has ended, the sample channel closes and the receiver sees `Err`.
    #[instrument(name = "ingestion_start_all", skip(self))]
    pub fn start_all(&mut self) {
        let Some(tx) = self.tx.take() else {
            debug!("adapters already started");
            return;
        };

        info!(count = self.adapters.len(), "starting all sensor adapters");
        for adapter in self.adapters.values() {
            debug!(kind = %adapter.kind(), "starting adapter");
            if let Err(error) = adapter.start(tx.clone(), self.metrics.clone()) {
                debug!(%error, "adapter start skipped");
            }
        }
    }

    /// Stop all sources
    #[instrument(name = "ingestion_stop_all", skip(self))]
    pub fn stop_all(&self) {
        info!(count = self.adapters.len(), "stopping all sensor adapters");
        for adapter in self.adapters.values() {
            if adapter.is_listening() {
                debug!(kind = %adapter.kind(), "stopping adapter");
                adapter.stop();
            }
        }
    }

    /// Get the sample stream receiver
    ///
    /// Note: can only be called once, subsequent calls return None
    pub fn take_receiver(&mut self) -> Option<Receiver<AxisSample>> {
        self.rx.take()
    }

    /// Get metrics reference
    pub fn metrics(&self) -> Arc<IngestionMetrics> {
        self.metrics.clone()
    }

    /// Get registered source count
    pub fn source_count(&self) -> usize {
        self.adapters.len()
    }

    /// Check whether the given stream is listening
    pub fn is_listening(&self, kind: SensorKind) -> bool {
        self.adapters
            .get(&kind)
            .map(|a| a.is_listening())
            .unwrap_or(false)
    }
}

impl Drop for IngestionPipeline {
    fn drop(&mut self) {
        self.stop_all();
    }
}

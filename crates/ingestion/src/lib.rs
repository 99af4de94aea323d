//! # Ingestion Pipeline
//!
//! Sensor sample ingestion module.
//!
//! Responsibilities:
//! - Register sensor data sources (supports mock and hardware-backed)
//! - Copy raw callbacks into `AxisSample`
//! - Backpressure management and drop policy
//! - Send to downstream via async-channel
//!
//! ## Usage Example
//!
//! ```ignore
//! use std::sync::Arc;
//! use ingestion::{IngestionPipeline, MockSensorSource};
//!
//! let mut pipeline = IngestionPipeline::new(64);
//! pipeline.register_source(Arc::new(MockSensorSource::accelerometer(50.0)), None);
//! pipeline.register_source(Arc::new(MockSensorSource::gyroscope(50.0)), None);
//!
//! pipeline.start_all();
//! let rx = pipeline.take_receiver().unwrap();
//! while let Ok(sample) = rx.recv().await {
//!     // Process sample
//! }
//! ```

mod adapter;
mod config;
mod error;
mod mock;
mod pipeline;
mod source_adapter;

// Re-exports
pub use adapter::SensorAdapter;
pub use config::{BackpressureConfig, IngestionMetrics, MetricsSnapshot};
pub use contracts::{AxisSample, DropPolicy, SensorKind};
pub use error::{IngestionError, Result};
pub use mock::{MockSensorSource, Waveform};
pub use pipeline::IngestionPipeline;
pub use source_adapter::SourceAdapter;

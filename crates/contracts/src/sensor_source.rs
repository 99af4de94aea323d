//! SensorSource trait - Sensor data source abstraction
//!
//! Defines a unified interface for sensor data sources, decoupling the
//! ingestion pipeline from how samples are physically obtained. Supports
//! unified handling of real hardware readers and mock sources.

use std::sync::Arc;

use crate::{AxisSample, SensorKind};

/// Sample delivery callback type
///
/// When a source produces a reading, it sends an `AxisSample` through this
/// callback. Uses `Arc` to allow callback sharing across contexts.
pub type SampleCallback = Arc<dyn Fn(AxisSample) + Send + Sync>;

/// Sensor data source trait
///
/// Abstracts the common behavior of hardware-backed and mock sensor readers.
/// The core only requires per-source monotonically non-decreasing timestamps
/// at millisecond resolution.
///
/// # Example
///
/// ```ignore
/// let source: Box<dyn SensorSource> = make_source();
/// source.listen(Arc::new(|sample| {
///     println!("got sample at {}", sample.timestamp_ms);
/// }));
/// // ... consume ...
/// source.stop();
/// ```
pub trait SensorSource: Send + Sync {
    /// Which stream this source produces
    fn kind(&self) -> SensorKind;

    /// Register data callback and start delivering samples
    ///
    /// If already listening, repeated calls are idempotent (a second callback
    /// is not registered).
    fn listen(&self, callback: SampleCallback);

    /// Stop delivering samples and release the underlying subscription
    fn stop(&self);

    /// Check if currently listening
    fn is_listening(&self) -> bool;
}

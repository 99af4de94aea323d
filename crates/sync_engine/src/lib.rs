//! # Sync Engine
//!
//! Two-stream synchronization and angle estimation.
//!
//! Responsibilities:
//! - Combine-latest merge of the accelerometer and gyroscope streams
//! - EWMA tilt angle (algorithm 1) and complementary fusion angle (algorithm 2)
//! - Output `MeasuredResult` per combined event
//!
//! ## Usage Example
//!
//! ```ignore
//! use sync_engine::{AngleEstimator, StreamCombiner};
//!
//! let mut combiner = StreamCombiner::new();
//! let mut estimator = AngleEstimator::new(tuning);
//!
//! // Push samples as they arrive
//! let event = combiner.push(sample);
//! let result = estimator.update(&event);
//! ```

mod combiner;
mod estimator;

// Re-exports
pub use combiner::StreamCombiner;
pub use estimator::{AngleEstimator, EstimatorState};

// Re-export contracts types
pub use contracts::{AxisSample, EstimatorTuning, MeasuredResult, SensorKind, SyncedEvent};

//! # Measurement Session
//!
//! Duration-bounded measurement runs over the sensor pipeline.
//!
//! A `MeasurementSession` owns one run at a time: it subscribes the
//! registered sensor sources, drives the merged sample stream through the
//! combiner and estimator on a dedicated task, buffers every result and
//! enforces the configured duration budget. Observable state is published
//! over a `tokio::sync::watch` channel once per processed result.

mod session;

pub use contracts::{
    DurationChoice, MeasuredResult, SessionConfig, SessionPhase, SessionSnapshot,
};
pub use session::MeasurementSession;

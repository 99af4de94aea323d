//! # Contracts
//!
//! Frozen interface contracts, defining inter-module data structures and traits.
//! All business crates can only depend on this crate, reverse dependencies are prohibited.
//!
//! ## Time Model
//! - Sample timestamps are wall-clock milliseconds (i64) as delivered by the source
//! - Per-source timestamps are assumed monotonically non-decreasing but not enforced

mod config;
mod error;
mod event;
mod sample;
mod sensor_source;
mod session;
mod tuning;

pub use config::*;
pub use error::*;
pub use event::*;
pub use sample::*;
pub use sensor_source::{SampleCallback, SensorSource};
pub use session::*;
pub use tuning::*;

//! # Exporter
//!
//! CSV export and re-import of measurement session records.
//!
//! One row per `MeasuredResult`, timestamps rebased so the first record
//! starts at zero. The writer never touches the in-memory record, so a
//! failed export can simply be retried.

mod csv;

pub use contracts::MeasuredResult;
pub use csv::{read_results, write_results, CsvExporter, CSV_HEADER};

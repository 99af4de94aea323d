//! CSV writer/reader for session records

use std::fs::File;
use std::io::{BufRead, BufReader, BufWriter, Read, Write};
use std::path::{Path, PathBuf};

use contracts::{CoreError, MeasuredResult};
use tracing::{debug, info, instrument};

/// Fixed column header; the angle columns are degrees
pub const CSV_HEADER: &str = "timestamp_ms,algo1_angle,algo2_angle";

/// Write a record to any writer
///
/// Timestamps are rebased to the first result so exported files always start
/// at zero regardless of the sensor clock. An empty record still produces the
/// header line.
pub fn write_results<W: Write>(results: &[MeasuredResult], writer: W) -> Result<(), CoreError> {
    let mut writer = BufWriter::new(writer);
    writeln!(writer, "{CSV_HEADER}")?;

    let base = results.first().map(|r| r.timestamp_ms).unwrap_or(0);
    for result in results {
        // Debug formatting keeps the decimal point on whole angles and is the
        // shortest representation that parses back to the same f32.
        writeln!(
            writer,
            "{},{:?},{:?}",
            result.timestamp_ms - base,
            result.tilt_angle,
            result.fusion_angle
        )?;
    }
    writer.flush()?;

    Ok(())
}

/// Read a record back from any reader
///
/// Returns the rows exactly as written, so timestamps start at zero.
pub fn read_results<R: Read>(reader: R) -> Result<Vec<MeasuredResult>, CoreError> {
    let reader = BufReader::new(reader);
    let mut lines = reader.lines().enumerate();

    match lines.next() {
        Some((_, Ok(header))) if header.trim() == CSV_HEADER => {}
        Some((_, Ok(header))) => {
            return Err(CoreError::export_parse(
                1,
                format!("unexpected header '{header}'"),
            ));
        }
        Some((_, Err(e))) => return Err(CoreError::Io(e)),
        None => return Err(CoreError::export_parse(1, "empty file")),
    }

    let mut results = Vec::new();
    for (index, line) in lines {
        let line = line?;
        let line_no = index + 1;
        if line.trim().is_empty() {
            continue;
        }
        results.push(parse_row(&line, line_no)?);
    }

    Ok(results)
}

fn parse_row(line: &str, line_no: usize) -> Result<MeasuredResult, CoreError> {
    let mut fields = line.trim().split(',');

    let mut next_field = |name: &str| {
        fields
            .next()
            .ok_or_else(|| CoreError::export_parse(line_no, format!("missing field '{name}'")))
    };

    let timestamp_ms = next_field("timestamp_ms")?
        .parse::<i64>()
        .map_err(|e| CoreError::export_parse(line_no, format!("bad timestamp: {e}")))?;
    let tilt_angle = next_field("algo1_angle")?
        .parse::<f32>()
        .map_err(|e| CoreError::export_parse(line_no, format!("bad algo1_angle: {e}")))?;
    let fusion_angle = next_field("algo2_angle")?
        .parse::<f32>()
        .map_err(|e| CoreError::export_parse(line_no, format!("bad algo2_angle: {e}")))?;

    if fields.next().is_some() {
        return Err(CoreError::export_parse(line_no, "too many fields"));
    }

    Ok(MeasuredResult {
        timestamp_ms,
        tilt_angle,
        fusion_angle,
    })
}

/// File-backed CSV exporter
#[derive(Debug, Clone)]
pub struct CsvExporter {
    path: PathBuf,
}

impl CsvExporter {
    /// Create an exporter targeting the given path
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Target path
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Export a record, replacing any existing file
    ///
    /// Returns the number of rows written.
    #[instrument(name = "export_csv", skip(self, results), fields(path = %self.path.display()))]
    pub fn export(&self, results: &[MeasuredResult]) -> Result<usize, CoreError> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)
                    .map_err(|e| CoreError::export_write(self.path.display().to_string(), e.to_string()))?;
            }
        }

        let file = File::create(&self.path)
            .map_err(|e| CoreError::export_write(self.path.display().to_string(), e.to_string()))?;
        write_results(results, file)
            .map_err(|e| CoreError::export_write(self.path.display().to_string(), e.to_string()))?;

        info!(rows = results.len(), "session record exported");
        metrics::counter!("export_rows_total").increment(results.len() as u64);

        Ok(results.len())
    }

    /// Re-import a previously exported file
    pub fn import(&self) -> Result<Vec<MeasuredResult>, CoreError> {
        let file = File::open(&self.path)?;
        let results = read_results(file)?;
        debug!(rows = results.len(), path = %self.path.display(), "session record imported");
        Ok(results)
    }
}

//! Session metrics collection
//!
//! Records per-result pipeline metrics and aggregates angle statistics for
//! the end-of-run summary.

use contracts::MeasuredResult;
use metrics::{counter, gauge, histogram};

/// Record metrics for one estimator result
///
/// Called once per `MeasuredResult` produced by the pipeline.
pub fn record_result_metrics(result: &MeasuredResult) {
    counter!("goniometer_results_total").increment(1);

    gauge!("goniometer_tilt_angle_degrees").set(result.tilt_angle as f64);
    gauge!("goniometer_fusion_angle_degrees").set(result.fusion_angle as f64);

    // Disagreement between the two algorithms; a growing divergence usually
    // means gyro drift or a badly tuned alpha.
    let divergence = (result.tilt_angle - result.fusion_angle).abs();
    histogram!("goniometer_angle_divergence_degrees").record(divergence as f64);
}

/// Record a raw sample arrival
pub fn record_sample_received(kind: &'static str) {
    counter!("goniometer_samples_received_total", "kind" => kind).increment(1);
}

/// Record a finished session run
pub fn record_session_finished(phase: &'static str, elapsed_seconds: f32) {
    counter!("goniometer_sessions_total", "phase" => phase).increment(1);
    histogram!("goniometer_session_elapsed_seconds").record(elapsed_seconds as f64);
}

/// Aggregates session results in memory for summary output
#[derive(Debug, Clone, Default)]
pub struct SessionMetricsAggregator {
    /// Total results processed
    pub total_results: u64,

    /// Tilt angle statistics (degrees)
    pub tilt_stats: RunningStats,

    /// Fusion angle statistics (degrees)
    pub fusion_stats: RunningStats,

    /// |tilt - fusion| statistics (degrees)
    pub divergence_stats: RunningStats,

    /// Timestamp of the first result (ms)
    first_timestamp_ms: Option<i64>,

    /// Timestamp of the last result (ms)
    last_timestamp_ms: i64,
}

impl SessionMetricsAggregator {
    /// Create a new aggregator
    pub fn new() -> Self {
        Self::default()
    }

    /// Fold one result into the running statistics
    pub fn update(&mut self, result: &MeasuredResult) {
        self.total_results += 1;
        self.first_timestamp_ms.get_or_insert(result.timestamp_ms);
        self.last_timestamp_ms = result.timestamp_ms;

        self.tilt_stats.push(result.tilt_angle as f64);
        self.fusion_stats.push(result.fusion_angle as f64);
        self.divergence_stats
            .push((result.tilt_angle - result.fusion_angle).abs() as f64);
    }

    /// Produce a summary report
    pub fn summary(&self) -> MetricsSummary {
        let span_ms = self
            .first_timestamp_ms
            .map(|first| self.last_timestamp_ms - first)
            .unwrap_or(0);

        MetricsSummary {
            total_results: self.total_results,
            span_ms,
            result_rate_hz: if span_ms > 0 {
                // n results span n-1 intervals
                (self.total_results.saturating_sub(1)) as f64 / (span_ms as f64 / 1000.0)
            } else {
                0.0
            },
            tilt_angle: StatsSummary::from(&self.tilt_stats),
            fusion_angle: StatsSummary::from(&self.fusion_stats),
            divergence: StatsSummary::from(&self.divergence_stats),
        }
    }

    /// Reset statistics
    pub fn reset(&mut self) {
        *self = Self::default();
    }
}

/// Summary of one session run
#[derive(Debug, Clone, Default)]
pub struct MetricsSummary {
    pub total_results: u64,
    pub span_ms: i64,
    pub result_rate_hz: f64,
    pub tilt_angle: StatsSummary,
    pub fusion_angle: StatsSummary,
    pub divergence: StatsSummary,
}

impl std::fmt::Display for MetricsSummary {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "=== Session Summary ===")?;
        writeln!(f, "Results: {}", self.total_results)?;
        writeln!(f, "Span: {} ms ({:.1} results/s)", self.span_ms, self.result_rate_hz)?;
        writeln!(f, "Tilt angle (deg): {}", self.tilt_angle)?;
        writeln!(f, "Fusion angle (deg): {}", self.fusion_angle)?;
        writeln!(f, "Divergence (deg): {}", self.divergence)?;
        Ok(())
    }
}

/// Statistics snapshot
#[derive(Debug, Clone, Default)]
pub struct StatsSummary {
    pub count: u64,
    pub min: f64,
    pub max: f64,
    pub mean: f64,
    pub std_dev: f64,
}

impl From<&RunningStats> for StatsSummary {
    fn from(stats: &RunningStats) -> Self {
        Self {
            count: stats.count(),
            min: stats.min(),
            max: stats.max(),
            mean: stats.mean(),
            std_dev: stats.std_dev(),
        }
    }
}

impl std::fmt::Display for StatsSummary {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.count == 0 {
            write!(f, "N/A")
        } else {
            write!(
                f,
                "min={:.3}, max={:.3}, mean={:.3}, std={:.3} (n={})",
                self.min, self.max, self.mean, self.std_dev, self.count
            )
        }
    }
}

/// Online statistics (Welford's algorithm)
#[derive(Debug, Clone, Default)]
pub struct RunningStats {
    count: u64,
    mean: f64,
    m2: f64,
    min: f64,
    max: f64,
}

impl RunningStats {
    /// Add a new value
    pub fn push(&mut self, value: f64) {
        self.count += 1;

        if self.count == 1 {
            self.min = value;
            self.max = value;
            self.mean = value;
            self.m2 = 0.0;
        } else {
            self.min = self.min.min(value);
            self.max = self.max.max(value);

            let delta = value - self.mean;
            self.mean += delta / self.count as f64;
            let delta2 = value - self.mean;
            self.m2 += delta * delta2;
        }
    }

    /// Sample count
    pub fn count(&self) -> u64 {
        self.count
    }

    /// Mean
    pub fn mean(&self) -> f64 {
        if self.count == 0 {
            0.0
        } else {
            self.mean
        }
    }

    /// Sample variance
    pub fn variance(&self) -> f64 {
        if self.count < 2 {
            0.0
        } else {
            self.m2 / (self.count - 1) as f64
        }
    }

    /// Standard deviation
    pub fn std_dev(&self) -> f64 {
        self.variance().sqrt()
    }

    /// Minimum
    pub fn min(&self) -> f64 {
        self.min
    }

    /// Maximum
    pub fn max(&self) -> f64 {
        self.max
    }
}

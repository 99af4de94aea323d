//! Mock Measurement Demo
//!
//! Runs one short measurement session against the simulated sensor sources
//! and exports the record as CSV. No hardware needed.
//!
//! Run with: cargo run --bin mock_measurement [config.toml]

use std::path::Path;
use std::sync::Arc;

use config_loader::ConfigLoader;
use contracts::{AppConfig, DurationChoice, SensorSource, SessionConfig, SessionPhase};
use exporter::CsvExporter;
use ingestion::{BackpressureConfig, MockSensorSource};
use observability::{LogFormat, ObservabilityConfig, SessionMetricsAggregator};
use session::MeasurementSession;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    observability::init_with_config(ObservabilityConfig {
        log_format: LogFormat::Pretty,
        metrics_port: None,
        ..Default::default()
    })?;

    tracing::info!("Starting Mock Measurement Demo");

    // ==== Stage 1: Use default config or load from file ====
    let config = if let Some(path) = std::env::args().nth(1) {
        tracing::info!(path = %path, "Loading configuration");
        ConfigLoader::load_from_path(Path::new(&path))?
    } else {
        AppConfig::default()
    };

    // ==== Stage 2: Simulated sensor sources ====
    let accel: Arc<dyn SensorSource> =
        Arc::new(MockSensorSource::accelerometer(config.sensors.accel_hz));
    let gyro: Arc<dyn SensorSource> =
        Arc::new(MockSensorSource::gyroscope(config.sensors.gyro_hz));

    // ==== Stage 3: Measurement session ====
    let backpressure = BackpressureConfig::new(
        config.sensors.channel_capacity,
        config.sensors.drop_policy,
    );
    let mut session = MeasurementSession::new(vec![accel, gyro], backpressure);
    let mut updates = session.subscribe();

    session
        .start(SessionConfig::from_choice(
            DurationChoice::Short,
            config.session.tuning,
        ))
        .await?;

    // ==== Stage 4: Follow the run like a UI would ====
    while updates.changed().await.is_ok() {
        let snapshot = updates.borrow_and_update().clone();
        if !snapshot.is_measuring() && snapshot.phase != SessionPhase::Idle {
            break;
        }
        tracing::info!(
            elapsed_s = snapshot.elapsed_seconds,
            tilt = snapshot.current_tilt_angle,
            fusion = snapshot.current_fusion_angle,
            "measuring"
        );
    }
    session.wait().await?;

    // ==== Stage 5: Export and summarize ====
    let record = session.record();
    let exporter = CsvExporter::new("demo_results.csv");
    exporter.export(&record)?;
    tracing::info!(
        results = record.len(),
        output = %exporter.path().display(),
        "Record exported"
    );

    let mut aggregator = SessionMetricsAggregator::new();
    for result in &record {
        aggregator.update(result);
    }
    println!("{}", aggregator.summary());

    Ok(())
}

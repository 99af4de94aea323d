//! `run` command implementation.

use std::sync::Arc;

use anyhow::{Context, Result};
use contracts::{AppConfig, SensorSource, SessionConfig, SessionPhase};
use exporter::CsvExporter;
use ingestion::{BackpressureConfig, MockSensorSource};
use observability::SessionMetricsAggregator;
use session::MeasurementSession;
use tracing::{info, warn};

use crate::cli::RunArgs;
use crate::error::CliError;

/// Execute the `run` command
pub async fn run_session(args: &RunArgs) -> Result<()> {
    info!(config = %args.config.display(), "Loading configuration");

    if !args.config.exists() {
        return Err(CliError::config_not_found(args.config.display().to_string()).into());
    }

    let mut config = config_loader::ConfigLoader::load_from_path(&args.config)
        .with_context(|| format!("Failed to load config from {}", args.config.display()))?;

    // Apply CLI overrides
    if let Some(duration) = args.duration {
        info!(duration = ?duration, "Overriding session duration from CLI");
        config.session.duration = duration.into();
    }
    if let Some(ref output) = args.output {
        info!(output = %output.display(), "Overriding output path from CLI");
        config.export.output_path = output.clone();
    }
    if let Some(capacity) = args.channel_capacity {
        info!(capacity, "Overriding channel capacity from CLI");
        config.sensors.channel_capacity = capacity;
    }
    config_loader::validate(&config).context("Configuration invalid after CLI overrides")?;

    info!(
        duration_s = config.session.duration.limit_seconds(),
        accel_hz = config.sensors.accel_hz,
        gyro_hz = config.sensors.gyro_hz,
        output = %config.export.output_path.display(),
        "Configuration loaded"
    );

    // Dry run - just validate and exit
    if args.dry_run {
        info!("Dry run mode - configuration is valid, exiting");
        print_config_summary(&config);
        return Ok(());
    }

    if args.metrics_port != 0 {
        observability::init_metrics_only(args.metrics_port)?;
    }

    // Simulated sources; a hardware build plugs its own `SensorSource`
    // implementations in here.
    let accel: Arc<dyn SensorSource> =
        Arc::new(MockSensorSource::accelerometer(config.sensors.accel_hz));
    let gyro: Arc<dyn SensorSource> = Arc::new(MockSensorSource::gyroscope(config.sensors.gyro_hz));

    let backpressure = BackpressureConfig::new(
        config.sensors.channel_capacity,
        config.sensors.drop_policy,
    );
    let mut session = MeasurementSession::new(vec![accel, gyro], backpressure);
    let mut updates = session.subscribe();

    let session_config =
        SessionConfig::from_choice(config.session.duration, config.session.tuning);
    session
        .start(session_config)
        .await
        .map_err(|e| CliError::session_execution(e.to_string()))?;

    info!("Measurement started");

    // Run until the session hits its deadline, or a shutdown signal aborts it.
    let completed = tokio::select! {
        result = updates.wait_for(|s| !s.is_measuring() && s.phase != SessionPhase::Idle) => {
            result.context("Session state channel closed")?;
            true
        }
        _ = shutdown_signal() => false,
    };

    if completed {
        session
            .wait()
            .await
            .map_err(|e| CliError::session_execution(e.to_string()))?;
    } else {
        warn!("Received shutdown signal, aborting measurement");
        session.stop().await;
    }

    let record = session.record();
    let snapshot = session.snapshot();
    info!(
        phase = ?snapshot.phase,
        results = record.len(),
        elapsed_s = snapshot.elapsed_seconds,
        "Measurement finished"
    );

    // Export
    let csv_exporter = CsvExporter::new(&config.export.output_path);
    csv_exporter
        .export(&record)
        .map_err(|e| CliError::export(e.to_string()))?;
    println!("Exported {} results to {}", record.len(), config.export.output_path.display());

    // Summary
    let mut aggregator = SessionMetricsAggregator::new();
    for result in &record {
        aggregator.update(result);
    }
    println!("\n{}", aggregator.summary());

    info!("Goniometer finished");
    Ok(())
}

/// Setup Ctrl+C and SIGTERM signal handlers
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            warn!(error = %e, "Failed to install Ctrl+C handler");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                warn!(error = %e, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}

/// Print configuration summary for dry-run mode
fn print_config_summary(config: &AppConfig) {
    println!("\n=== Configuration Summary ===\n");
    println!("Session:");
    println!("  Duration: {} s", config.session.duration.limit_seconds());
    println!("  EWMA alpha: {}", config.session.tuning.ewma_alpha);
    println!("  Fusion weight: {}", config.session.tuning.fusion_weight);
    println!("\nSensors:");
    println!("  Accelerometer: {} Hz", config.sensors.accel_hz);
    println!("  Gyroscope: {} Hz", config.sensors.gyro_hz);
    println!(
        "  Channel: {} samples, {:?}",
        config.sensors.channel_capacity, config.sensors.drop_policy
    );
    println!("\nExport:");
    println!("  Output: {}", config.export.output_path.display());
    println!();
}

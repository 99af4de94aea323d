//! # Integration Tests
//!
//! Integration and end-to-end tests.
//!
//! Covers:
//! - Mock e2e pipeline (sources -> combiner -> estimator), no hardware needed
//! - Full session runs with CSV export round trips
//! - Configuration flowing end to end into estimator behavior

#[cfg(test)]
mod e2e_pipeline {
    use std::sync::Arc;

    use contracts::{EstimatorTuning, SensorKind};
    use ingestion::{IngestionPipeline, MockSensorSource};
    use sync_engine::{AngleEstimator, StreamCombiner};

    /// End-to-end: MockSensorSource -> IngestionPipeline -> combiner -> estimator
    #[tokio::test]
    async fn test_e2e_mock_pipeline() {
        let mut pipeline = IngestionPipeline::new(256);
        pipeline.register_source(Arc::new(MockSensorSource::accelerometer(200.0)), None);
        pipeline.register_source(Arc::new(MockSensorSource::gyroscope(200.0)), None);

        let rx = pipeline.take_receiver().unwrap();
        pipeline.start_all();

        let mut combiner = StreamCombiner::new();
        let mut estimator = AngleEstimator::new(EstimatorTuning::default());

        let mut last_event_ts = i64::MIN;
        let mut seen_accel = false;
        let mut seen_gyro = false;

        for _ in 0..100 {
            let sample = rx.recv().await.unwrap();
            match sample.kind {
                SensorKind::Accelerometer => seen_accel = true,
                SensorKind::Gyroscope => seen_gyro = true,
            }

            let event = combiner.push(sample);
            // Event timestamps never go backwards under interleaving.
            assert!(event.timestamp_ms >= last_event_ts);
            last_event_ts = event.timestamp_ms;

            let result = estimator.update(&event);
            assert!(result.tilt_angle.is_finite());
            assert!(result.fusion_angle.is_finite());
            assert!((-180.0..=180.0).contains(&result.tilt_angle));
        }

        pipeline.stop_all();
        assert!(seen_accel && seen_gyro);
        assert_eq!(combiner.event_count(), 100);
    }

    /// The sweep mocks describe a 0..90 degree arm raise; the estimator must
    /// track it into a plausible range rather than sticking at the seed.
    #[tokio::test]
    async fn test_estimator_tracks_sweep_motion() {
        let mut pipeline = IngestionPipeline::new(256);
        pipeline.register_source(Arc::new(MockSensorSource::accelerometer(100.0)), None);

        let rx = pipeline.take_receiver().unwrap();
        pipeline.start_all();

        let mut combiner = StreamCombiner::new();
        let mut estimator = AngleEstimator::new(EstimatorTuning::default());

        let mut min_tilt = f32::MAX;
        let mut max_tilt = f32::MIN;
        for _ in 0..60 {
            let sample = rx.recv().await.unwrap();
            let result = estimator.update(&combiner.push(sample));
            min_tilt = min_tilt.min(result.tilt_angle);
            max_tilt = max_tilt.max(result.tilt_angle);
        }
        pipeline.stop_all();

        // 600ms of a 4s sweep: the angle must have moved, but cannot have
        // reached the 90 degree crest yet.
        assert!(max_tilt > min_tilt + 1.0);
        assert!(max_tilt < 90.0);
    }
}

#[cfg(test)]
mod e2e_session {
    use std::sync::Arc;
    use std::time::Duration;

    use contracts::{
        AxisSample, DurationChoice, EstimatorTuning, SensorKind, SensorSource, SessionConfig,
        SessionPhase, Vector3,
    };
    use exporter::CsvExporter;
    use ingestion::{BackpressureConfig, MockSensorSource};
    use session::MeasurementSession;
    use tokio::time::timeout;

    const WAIT_BUDGET: Duration = Duration::from_secs(5);

    fn accel_script(timestamps: &[i64]) -> Vec<AxisSample> {
        timestamps
            .iter()
            .map(|&ts| {
                AxisSample::new(SensorKind::Accelerometer, Vector3::new(0.0, 6.0, 8.0), ts)
            })
            .collect()
    }

    /// Full run: scripted sources -> session -> CSV export -> re-import
    #[tokio::test]
    async fn test_session_record_exports_and_reimports() {
        let source: Arc<dyn SensorSource> = Arc::new(MockSensorSource::scripted(
            SensorKind::Accelerometer,
            500.0,
            accel_script(&[0, 250, 500, 750, 1000]),
        ));
        let mut session =
            MeasurementSession::new(vec![source], BackpressureConfig::default());

        session
            .start(SessionConfig::from_choice(
                DurationChoice::Short,
                EstimatorTuning::default(),
            ))
            .await
            .unwrap();
        timeout(WAIT_BUDGET, session.wait()).await.unwrap().unwrap();

        assert_eq!(session.phase(), SessionPhase::Completed);
        let record = session.record();
        assert_eq!(record.len(), 5);

        let dir = tempfile::tempdir().unwrap();
        let exporter = CsvExporter::new(dir.path().join("session.csv"));
        exporter.export(&record).unwrap();

        let imported = exporter.import().unwrap();
        assert_eq!(imported.len(), record.len());
        assert_eq!(imported[0].timestamp_ms, 0);
        assert_eq!(
            imported.last().unwrap().timestamp_ms,
            record.last().unwrap().timestamp_ms - record[0].timestamp_ms
        );
        for (read, written) in imported.iter().zip(&record) {
            assert!((read.tilt_angle - written.tilt_angle).abs() < 1e-4);
            assert!((read.fusion_angle - written.fusion_angle).abs() < 1e-4);
        }
    }

    /// Config tuning flows through to the estimator: with alpha = 1.0 the
    /// EWMA is disabled and with weight = 1.0 fusion collapses onto tilt.
    #[tokio::test]
    async fn test_tuning_from_config_shapes_results() {
        let toml = r#"
[session]
duration = "short"
[session.tuning]
ewma_alpha = 1.0
fusion_weight = 1.0
"#;
        let config =
            config_loader::ConfigLoader::load_from_str(toml, config_loader::ConfigFormat::Toml)
                .unwrap();

        let source: Arc<dyn SensorSource> = Arc::new(MockSensorSource::scripted(
            SensorKind::Accelerometer,
            500.0,
            accel_script(&[0, 500, 1000]),
        ));
        let mut session =
            MeasurementSession::new(vec![source], BackpressureConfig::default());

        session
            .start(SessionConfig::from_choice(
                config.session.duration,
                config.session.tuning,
            ))
            .await
            .unwrap();
        timeout(WAIT_BUDGET, session.wait()).await.unwrap().unwrap();

        // Gravity at (0, 6, 8) is a constant 53.13 degree tilt.
        let expected = 8.0f32.atan2(6.0).to_degrees();
        for result in session.record() {
            assert!((result.tilt_angle - expected).abs() < 1e-3);
            assert!((result.fusion_angle - expected).abs() < 1e-3);
        }
    }

    /// Aborting early still yields an exportable record.
    #[tokio::test]
    async fn test_aborted_session_record_is_exportable() {
        let accel: Arc<dyn SensorSource> = Arc::new(MockSensorSource::accelerometer(200.0));
        let gyro: Arc<dyn SensorSource> = Arc::new(MockSensorSource::gyroscope(200.0));
        let mut session =
            MeasurementSession::new(vec![accel, gyro], BackpressureConfig::default());

        session.start(SessionConfig::default()).await.unwrap();
        tokio::time::sleep(Duration::from_millis(100)).await;
        session.stop().await;

        assert_eq!(session.phase(), SessionPhase::Aborted);
        let record = session.record();
        assert!(!record.is_empty());

        let dir = tempfile::tempdir().unwrap();
        let exporter = CsvExporter::new(dir.path().join("aborted.csv"));
        assert_eq!(exporter.export(&record).unwrap(), record.len());
    }

    /// Session results feed the summary aggregator without surprises.
    #[tokio::test]
    async fn test_summary_over_session_record() {
        let source: Arc<dyn SensorSource> = Arc::new(MockSensorSource::scripted(
            SensorKind::Accelerometer,
            500.0,
            accel_script(&[0, 500, 1000]),
        ));
        let mut session =
            MeasurementSession::new(vec![source], BackpressureConfig::default());

        session
            .start(SessionConfig::from_choice(
                DurationChoice::Short,
                EstimatorTuning::default(),
            ))
            .await
            .unwrap();
        timeout(WAIT_BUDGET, session.wait()).await.unwrap().unwrap();

        let mut aggregator = observability::SessionMetricsAggregator::new();
        for result in session.record() {
            aggregator.update(&result);
        }

        let summary = aggregator.summary();
        assert_eq!(summary.total_results, 3);
        assert_eq!(summary.span_ms, 1000);
        assert!(summary.tilt_angle.max <= 90.0);
    }
}

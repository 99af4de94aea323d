//! MeasurementSession - state machine around one bounded run

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use async_channel::Receiver;
use contracts::{
    AxisSample, CoreError, MeasuredResult, SensorSource, SessionConfig, SessionPhase,
    SessionSnapshot,
};
use ingestion::{BackpressureConfig, IngestionPipeline};
use sync_engine::{AngleEstimator, StreamCombiner};
use tokio::sync::{oneshot, watch};
use tokio::task::JoinHandle;
use tracing::{debug, info, instrument, warn};

/// Handle to the consume task of the run in progress
struct ActiveRun {
    /// Cancels the run; consumed on stop
    stop_tx: Option<oneshot::Sender<()>>,
    /// Consume task handle
    task: JoinHandle<()>,
}

/// Duration-bounded measurement session
///
/// Phases: `Idle -> Running -> Completed | Aborted`, and back to `Running`
/// on the next start. `start` while running and `stop` while idle are both
/// no-ops. The result record of the last run stays available until the next
/// start clears it.
pub struct MeasurementSession {
    /// Shared sources, re-subscribed on every run
    sources: Vec<Arc<dyn SensorSource>>,

    /// Channel sizing and drop policy for each run's pipeline
    backpressure: BackpressureConfig,

    /// Every result of the current/last run, in arrival order
    record: Arc<Mutex<Vec<MeasuredResult>>>,

    /// Single-writer observable state
    snapshot_tx: watch::Sender<SessionSnapshot>,

    run: Option<ActiveRun>,
}

impl MeasurementSession {
    /// Create an idle session over the given sources
    pub fn new(sources: Vec<Arc<dyn SensorSource>>, backpressure: BackpressureConfig) -> Self {
        let (snapshot_tx, _) = watch::channel(SessionSnapshot::default());

        Self {
            sources,
            backpressure,
            record: Arc::new(Mutex::new(Vec::new())),
            snapshot_tx,
            run: None,
        }
    }

    /// Subscribe to snapshot updates
    pub fn subscribe(&self) -> watch::Receiver<SessionSnapshot> {
        self.snapshot_tx.subscribe()
    }

    /// Current observable state
    pub fn snapshot(&self) -> SessionSnapshot {
        self.snapshot_tx.borrow().clone()
    }

    /// Current phase
    pub fn phase(&self) -> SessionPhase {
        self.snapshot_tx.borrow().phase
    }

    /// Whether a run is in progress
    pub fn is_running(&self) -> bool {
        self.run.as_ref().map(|r| !r.task.is_finished()).unwrap_or(false)
    }

    /// Full result record of the current/last run
    pub fn record(&self) -> Vec<MeasuredResult> {
        lock_record(&self.record).clone()
    }

    /// Start a new run
    ///
    /// No-op while a run is in progress. Clears the previous record, builds a
    /// fresh pipeline over the registered sources and spawns the consume task.
    #[instrument(
        name = "session_start",
        skip(self, config),
        fields(limit = config.duration_limit_seconds)
    )]
    pub async fn start(&mut self, config: SessionConfig) -> Result<(), CoreError> {
        if let Some(run) = &self.run {
            if !run.task.is_finished() {
                warn!("measurement already running, start ignored");
                return Ok(());
            }
        }

        // Reap a run that ended on its own deadline.
        if let Some(run) = self.run.take() {
            run.task
                .await
                .map_err(|e| CoreError::SessionTask { message: e.to_string() })?;
        }

        lock_record(&self.record).clear();

        let mut pipeline = IngestionPipeline::with_config(self.backpressure.clone());
        for source in &self.sources {
            pipeline.register_source(source.clone(), None);
        }
        let rx = pipeline.take_receiver().ok_or(CoreError::ReceiverTaken)?;
        pipeline.start_all();

        // Readers observe the reset and the new budget in one update.
        self.snapshot_tx.send_replace(SessionSnapshot {
            phase: SessionPhase::Running,
            duration_limit_seconds: config.duration_limit_seconds,
            ..Default::default()
        });

        let (stop_tx, stop_rx) = oneshot::channel();
        let task = tokio::spawn(consume_loop(
            rx,
            stop_rx,
            config,
            self.record.clone(),
            self.snapshot_tx.clone(),
            pipeline,
        ));

        info!(
            limit = config.duration_limit_seconds,
            sources = self.sources.len(),
            "measurement session started"
        );
        metrics::counter!("session_runs_started").increment(1);

        self.run = Some(ActiveRun {
            stop_tx: Some(stop_tx),
            task,
        });
        Ok(())
    }

    /// Stop the run in progress
    ///
    /// The run ends as `Aborted` with its record intact. No-op when idle; a
    /// run that already completed on its own is only reaped.
    #[instrument(name = "session_stop", skip(self))]
    pub async fn stop(&mut self) {
        let Some(mut run) = self.run.take() else {
            debug!("stop ignored: no active session");
            return;
        };

        if let Some(stop_tx) = run.stop_tx.take() {
            // Send fails only if the task already finished on its own.
            let _ = stop_tx.send(());
        }
        if let Err(e) = run.task.await {
            warn!(error = %e, "session task join failed");
        }
    }

    /// Wait for the run in progress to end on its own deadline
    pub async fn wait(&mut self) -> Result<(), CoreError> {
        if let Some(run) = self.run.take() {
            run.task
                .await
                .map_err(|e| CoreError::SessionTask { message: e.to_string() })?;
        }
        Ok(())
    }
}

impl Drop for MeasurementSession {
    fn drop(&mut self) {
        if let Some(run) = self.run.take() {
            // Dropping mid-run cancels the task; the pipeline's own Drop
            // releases the source subscriptions.
            run.task.abort();
        }
    }
}

/// Consume task of one run
///
/// Ends on the first of: elapsed budget reached, stop requested, sample
/// channel closed. The sources are unsubscribed on every exit path.
async fn consume_loop(
    rx: Receiver<AxisSample>,
    mut stop_rx: oneshot::Receiver<()>,
    config: SessionConfig,
    record: Arc<Mutex<Vec<MeasuredResult>>>,
    snapshot_tx: watch::Sender<SessionSnapshot>,
    pipeline: IngestionPipeline,
) {
    let mut combiner = StreamCombiner::new();
    let mut estimator = AngleEstimator::new(config.tuning);
    let mut first_timestamp: Option<i64> = None;
    let limit = config.duration_limit_seconds;

    let outcome = loop {
        tokio::select! {
            _ = &mut stop_rx => {
                debug!("stop requested");
                break SessionPhase::Aborted;
            }
            sample = rx.recv() => {
                // The channel closes once every source has ended; a run over
                // finite sources completes here instead of waiting out the
                // deadline.
                let Ok(sample) = sample else {
                    debug!("all sources ended, ending run");
                    break SessionPhase::Completed;
                };
                observability::record_sample_received(sample.kind.as_str());

                let event = combiner.push(sample);
                let result = estimator.update(&event);

                // Elapsed time is measured in sensor time from the first
                // result of this run, not in wall-clock time.
                let start_ts = *first_timestamp.get_or_insert(result.timestamp_ms);
                let elapsed = (result.timestamp_ms - start_ts) as f32 / 1000.0;

                lock_record(&record).push(result);
                observability::record_result_metrics(&result);

                if elapsed >= limit {
                    // The terminal result is recorded; the reported elapsed
                    // time is clamped to the budget and no plot point is
                    // added for it.
                    snapshot_tx.send_modify(|s| s.elapsed_seconds = limit);
                    break SessionPhase::Completed;
                }

                snapshot_tx.send_modify(|s| {
                    s.current_tilt_angle = result.tilt_angle;
                    s.current_fusion_angle = result.fusion_angle;
                    s.elapsed_seconds = elapsed;
                    s.recorded_points.push((elapsed, result.fusion_angle));
                });
            }
        }
    };

    pipeline.stop_all();
    drop(pipeline);

    let recorded = lock_record(&record).len();
    info!(phase = ?outcome, recorded, "session run finished");
    let phase_label = match outcome {
        SessionPhase::Aborted => "aborted",
        _ => "completed",
    };
    observability::record_session_finished(phase_label, snapshot_tx.borrow().elapsed_seconds);

    snapshot_tx.send_modify(|s| s.phase = outcome);
}

fn lock_record(record: &Mutex<Vec<MeasuredResult>>) -> MutexGuard<'_, Vec<MeasuredResult>> {
    record.lock().unwrap_or_else(PoisonError::into_inner)
}

#[cfg(test)]
mod tests {
    use super::*;
    use contracts::{DurationChoice, EstimatorTuning, SensorKind, Vector3};
    use ingestion::MockSensorSource;
    use std::time::Duration;
    use tokio::time::timeout;

    const WAIT_BUDGET: Duration = Duration::from_secs(5);

    fn flat_accel_script(timestamps: &[i64]) -> Vec<AxisSample> {
        timestamps
            .iter()
            .map(|&ts| {
                AxisSample::new(SensorKind::Accelerometer, Vector3::new(0.0, 0.0, 9.81), ts)
            })
            .collect()
    }

    fn scripted_session(timestamps: &[i64]) -> MeasurementSession {
        let source: Arc<dyn SensorSource> = Arc::new(MockSensorSource::scripted(
            SensorKind::Accelerometer,
            500.0,
            flat_accel_script(timestamps),
        ));
        MeasurementSession::new(vec![source], BackpressureConfig::default())
    }

    fn short_config() -> SessionConfig {
        SessionConfig::from_choice(DurationChoice::Short, EstimatorTuning::default())
    }

    #[tokio::test]
    async fn test_deadline_records_terminal_result() {
        let mut session = scripted_session(&[0, 300, 600, 900, 1200]);

        session.start(short_config()).await.unwrap();
        timeout(WAIT_BUDGET, session.wait()).await.unwrap().unwrap();

        let snapshot = session.snapshot();
        assert_eq!(snapshot.phase, SessionPhase::Completed);
        // The result that crossed the budget is recorded, the reported
        // elapsed time is clamped and no plot point is added for it.
        assert_eq!(session.record().len(), 5);
        assert_eq!(snapshot.elapsed_seconds, 1.0);
        assert_eq!(snapshot.recorded_points.len(), 4);
        assert!(!session.is_running());
    }

    #[tokio::test]
    async fn test_elapsed_equal_to_limit_is_terminal() {
        let mut session = scripted_session(&[0, 500, 1000]);

        session.start(short_config()).await.unwrap();
        timeout(WAIT_BUDGET, session.wait()).await.unwrap().unwrap();

        assert_eq!(session.phase(), SessionPhase::Completed);
        assert_eq!(session.record().len(), 3);
    }

    #[tokio::test]
    async fn test_completes_when_sources_end_before_deadline() {
        // Script ends at 400 ms, well inside the 1 s limit: the run must end
        // as Completed when the sample channel closes, not hang on the
        // deadline it will never reach.
        let mut session = scripted_session(&[0, 100, 200, 300, 400]);

        session.start(short_config()).await.unwrap();
        timeout(WAIT_BUDGET, session.wait()).await.unwrap().unwrap();

        let snapshot = session.snapshot();
        assert_eq!(snapshot.phase, SessionPhase::Completed);
        assert_eq!(session.record().len(), 5);
        assert_eq!(snapshot.elapsed_seconds, 0.4);
        assert_eq!(snapshot.recorded_points.len(), 5);
    }

    #[tokio::test]
    async fn test_stop_aborts_and_keeps_record() {
        let accel: Arc<dyn SensorSource> = Arc::new(MockSensorSource::accelerometer(200.0));
        let gyro: Arc<dyn SensorSource> = Arc::new(MockSensorSource::gyroscope(200.0));
        let mut session = MeasurementSession::new(
            vec![accel.clone(), gyro.clone()],
            BackpressureConfig::default(),
        );

        session.start(SessionConfig::default()).await.unwrap();
        tokio::time::sleep(Duration::from_millis(100)).await;
        assert!(session.is_running());

        session.stop().await;

        assert_eq!(session.phase(), SessionPhase::Aborted);
        assert!(!session.record().is_empty());
        assert!(!session.is_running());
        assert!(!accel.is_listening());
        assert!(!gyro.is_listening());
    }

    #[tokio::test]
    async fn test_start_while_running_is_noop() {
        let source: Arc<dyn SensorSource> = Arc::new(MockSensorSource::accelerometer(200.0));
        let mut session = MeasurementSession::new(vec![source], BackpressureConfig::default());

        session.start(SessionConfig::default()).await.unwrap();
        tokio::time::sleep(Duration::from_millis(50)).await;

        // Second start must not reset the run or its budget.
        session.start(short_config()).await.unwrap();
        let snapshot = session.snapshot();
        assert_eq!(snapshot.phase, SessionPhase::Running);
        assert_eq!(snapshot.duration_limit_seconds, 10.0);

        session.stop().await;
    }

    #[tokio::test]
    async fn test_stop_from_idle_is_noop() {
        let source: Arc<dyn SensorSource> = Arc::new(MockSensorSource::accelerometer(50.0));
        let mut session = MeasurementSession::new(vec![source], BackpressureConfig::default());

        session.stop().await;
        assert_eq!(session.phase(), SessionPhase::Idle);
    }

    #[tokio::test]
    async fn test_restart_is_deterministic() {
        let timestamps = [0, 250, 500, 750, 1000];
        let mut session = scripted_session(&timestamps);

        session.start(short_config()).await.unwrap();
        timeout(WAIT_BUDGET, session.wait()).await.unwrap().unwrap();
        let first = session.record();

        session.start(short_config()).await.unwrap();
        timeout(WAIT_BUDGET, session.wait()).await.unwrap().unwrap();
        let second = session.record();

        // Same script, same filter seeds: a restarted session must not
        // inherit state or duplicate deliveries from the previous run.
        assert_eq!(first.len(), timestamps.len());
        assert_eq!(first, second);
    }

    #[tokio::test]
    async fn test_snapshot_stream_observes_phases() {
        let mut session = scripted_session(&[0, 400, 800, 1200]);
        let mut rx = session.subscribe();

        session.start(short_config()).await.unwrap();

        rx.changed().await.unwrap();
        assert_eq!(rx.borrow_and_update().phase, SessionPhase::Running);

        timeout(WAIT_BUDGET, session.wait()).await.unwrap().unwrap();
        assert_eq!(rx.borrow().phase, SessionPhase::Completed);
    }
}

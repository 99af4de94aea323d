//! Session configuration and observable state

use serde::{Deserialize, Serialize};

use crate::EstimatorTuning;

/// Closed enumeration of selectable measurement durations
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DurationChoice {
    /// 1 second run
    Short,
    /// 10 second run
    #[default]
    Long,
}

impl DurationChoice {
    /// Duration limit in seconds
    pub fn limit_seconds(&self) -> f32 {
        match self {
            DurationChoice::Short => 1.0,
            DurationChoice::Long => 10.0,
        }
    }
}

/// Configuration for one measurement session
///
/// Immutable while the session is running.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SessionConfig {
    /// Hard elapsed-time budget (seconds)
    pub duration_limit_seconds: f32,

    /// Estimator coefficients for this run
    #[serde(default)]
    pub tuning: EstimatorTuning,
}

impl SessionConfig {
    /// Build a config from a duration choice with the given tuning
    pub fn from_choice(choice: DurationChoice, tuning: EstimatorTuning) -> Self {
        Self {
            duration_limit_seconds: choice.limit_seconds(),
            tuning,
        }
    }
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self::from_choice(DurationChoice::default(), EstimatorTuning::default())
    }
}

/// Session state machine phases
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionPhase {
    /// No active subscription
    #[default]
    Idle,
    /// Consuming results under a deadline
    Running,
    /// Deadline reached, record kept for export
    Completed,
    /// Stopped by the user before the deadline, record kept for export
    Aborted,
}

/// Observable session state, replaced wholesale once per processed result
///
/// Single-writer value published over a watch channel; any number of readers
/// (UI, logging, tests) may sample it without affecting the pipeline.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SessionSnapshot {
    /// Current phase
    pub phase: SessionPhase,

    /// Latest algorithm 1 angle (degrees)
    pub current_tilt_angle: f32,

    /// Latest algorithm 2 angle (degrees)
    pub current_fusion_angle: f32,

    /// Seconds since the first result of the run (clamped to the limit)
    pub elapsed_seconds: f32,

    /// Duration budget of the current/last run (seconds)
    pub duration_limit_seconds: f32,

    /// (elapsed seconds, fusion angle) per recorded result, for live plotting
    pub recorded_points: Vec<(f32, f32)>,
}

impl SessionSnapshot {
    /// Whether a session is currently consuming results
    pub fn is_measuring(&self) -> bool {
        self.phase == SessionPhase::Running
    }
}

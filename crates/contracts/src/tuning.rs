//! Estimator tuning coefficients
//!
//! The reference firmware shipped these as hard-coded literals and two
//! internal variants disagreed on the values; they are calibration
//! parameters here, carried in configuration.

use serde::{Deserialize, Serialize};

/// Coefficients for the two angle algorithms
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct EstimatorTuning {
    /// EWMA smoothing constant for the tilt angle, in (0, 1]
    #[serde(default = "default_ewma_alpha")]
    pub ewma_alpha: f32,

    /// Complementary filter weight on the tilt term, in [0, 1]
    #[serde(default = "default_fusion_weight")]
    pub fusion_weight: f32,
}

fn default_ewma_alpha() -> f32 {
    0.2
}

fn default_fusion_weight() -> f32 {
    0.5
}

impl Default for EstimatorTuning {
    fn default() -> Self {
        Self {
            ewma_alpha: default_ewma_alpha(),
            fusion_weight: default_fusion_weight(),
        }
    }
}

use serde::{Deserialize, Serialize};

/// Tuning knobs for the per-tick distance cache.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DistanceConfig {
    /// Populations at or above this size build matrix rows in parallel.
    pub parallel_threshold: usize,
    /// Re-derive every cached pair after a rebuild and fail on disagreement.
    pub verify_rebuilds: bool,
    /// Relative tolerance used by the verification pass (absolute below 1.0).
    pub verify_tolerance: f64,
}

impl Default for DistanceConfig {
    fn default() -> Self {
        Self {
            parallel_threshold: 512,
            verify_rebuilds: false,
            verify_tolerance: 1e-5,
        }
    }
}

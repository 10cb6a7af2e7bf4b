//! Settings management

use proxim_core::distance::DistanceConfig;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Errors raised while loading settings.
#[derive(Debug, Error)]
pub enum SettingsError {
    #[error("failed to read settings from {path}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid settings JSON")]
    Parse(#[from] serde_json::Error),

    #[error("invalid setting `{field}`: {reason}")]
    Invalid {
        field: &'static str,
        reason: &'static str,
    },
}

/// Session settings
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub distance: DistanceConfig,
    pub simulation: SimulationSettings,
}

/// Parameters for the demo simulation driver.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimulationSettings {
    pub ticks: u64,
    pub entity_count: usize,
    pub seed: u64,
    /// Entities spawn inside `[-world_extent, world_extent)²`.
    pub world_extent: f64,
    /// Largest per-axis move an entity makes in one tick.
    pub step_size: f64,
    pub queries_per_tick: usize,
    /// Number of recent ticks the tick timer averages over.
    pub timing_window: usize,
}

impl Default for SimulationSettings {
    fn default() -> Self {
        Self {
            ticks: 120,
            entity_count: 200,
            seed: 0x5EED,
            world_extent: 100.0,
            step_size: 1.5,
            queries_per_tick: 64,
            timing_window: 60,
        }
    }
}

impl Settings {
    /// Read settings from a JSON file. Missing fields fall back to defaults.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, SettingsError> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|source| SettingsError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        let settings = Self::from_json_str(&text)?;
        tracing::debug!(path = %path.display(), "loaded settings");
        Ok(settings)
    }

    pub fn from_json_str(text: &str) -> Result<Self, SettingsError> {
        let settings: Settings = serde_json::from_str(text)?;
        settings.validate()?;
        Ok(settings)
    }

    pub fn to_json_string(&self) -> Result<String, SettingsError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    fn validate(&self) -> Result<(), SettingsError> {
        let tolerance = self.distance.verify_tolerance;
        if !(tolerance.is_finite() && tolerance > 0.0) {
            return Err(SettingsError::Invalid {
                field: "distance.verify_tolerance",
                reason: "must be a positive finite number",
            });
        }
        let extent = self.simulation.world_extent;
        if !(extent.is_finite() && extent > 0.0) {
            return Err(SettingsError::Invalid {
                field: "simulation.world_extent",
                reason: "must be a positive finite number",
            });
        }
        if !(self.simulation.step_size.is_finite() && self.simulation.step_size >= 0.0) {
            return Err(SettingsError::Invalid {
                field: "simulation.step_size",
                reason: "must be a non-negative finite number",
            });
        }
        if self.simulation.timing_window == 0 {
            return Err(SettingsError::Invalid {
                field: "simulation.timing_window",
                reason: "must hold at least one tick",
            });
        }
        Ok(())
    }
}

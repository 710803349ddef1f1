//! Engine configuration.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{ScheduleError, ScheduleResult};

/// Configuration the host app hands the engine, from TOML.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// First hour row of the weekly grid.
    pub grid_start_hour: u8,
    /// Last hour row of the weekly grid.
    pub grid_end_hour: u8,
    /// How far ahead session synchronization looks, in days.
    pub session_horizon_days: u64,
}

impl Default for EngineConfig {
    fn default() -> Self {
        EngineConfig {
            grid_start_hour: 6,
            grid_end_hour: 23,
            session_horizon_days: 120,
        }
    }
}

impl EngineConfig {
    /// Load config from a TOML file; a missing file means defaults.
    pub fn load(path: &Path) -> ScheduleResult<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let content = std::fs::read_to_string(path)?;
        Self::from_toml(&content)
    }

    pub fn from_toml(content: &str) -> ScheduleResult<Self> {
        let config: EngineConfig =
            toml::from_str(content).map_err(|e| ScheduleError::Config(e.to_string()))?;
        if config.grid_start_hour >= config.grid_end_hour || config.grid_end_hour > 24 {
            return Err(ScheduleError::Config(format!(
                "grid hours out of order: {}-{}",
                config.grid_start_hour, config.grid_end_hour
            )));
        }
        Ok(config)
    }
}

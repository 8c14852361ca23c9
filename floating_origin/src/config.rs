//! Configuration types for a simulation scene

use crate::error::FrameError;
use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::debug;

/// Errors that can occur while loading configuration
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Invalid configuration: {0}")]
    Invalid(#[from] FrameError),
}

/// Timing and recentering settings for one scene
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimulationConfig {
    /// Simulation time at scene start
    pub start_ut: f64,
    /// Wall seconds per fixed step
    pub fixed_delta_time: f64,
    /// Time warp factor applied to every fixed step
    pub time_scale: f64,
    /// Upper bound on fixed steps per tick
    pub max_steps_per_tick: u32,
    /// Scene-local distance from the origin that triggers recentering
    pub max_relative_position: f64,
    /// Scene-local speed that triggers recentering
    pub max_relative_velocity: f64,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            start_ut: 0.0,
            fixed_delta_time: 0.02,
            time_scale: 1.0,
            max_steps_per_tick: 8,
            max_relative_position: 5_000.0,
            max_relative_velocity: 500.0,
        }
    }
}

impl SimulationConfig {
    /// Parse a configuration from JSON, filling missing fields with defaults
    pub fn from_json_str(json: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        debug!(config = ?config, "Parsed simulation config");
        Ok(config)
    }

    /// Load a configuration file
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        debug!(path = ?path, "Loading simulation config");
        let json = std::fs::read_to_string(path)?;
        Self::from_json_str(&json)
    }

    /// Check every value is usable
    pub fn validate(&self) -> Result<(), FrameError> {
        let positive = [
            ("fixed_delta_time", self.fixed_delta_time),
            ("time_scale", self.time_scale),
            ("max_relative_position", self.max_relative_position),
            ("max_relative_velocity", self.max_relative_velocity),
        ];
        for (name, value) in positive {
            if !(value.is_finite() && value > 0.0) {
                return Err(FrameError::InvalidArgument(format!(
                    "{name} must be positive and finite, got {value}"
                )));
            }
        }

        if !self.start_ut.is_finite() {
            return Err(FrameError::InvalidArgument(format!(
                "start_ut must be finite, got {}",
                self.start_ut
            )));
        }

        if self.max_steps_per_tick == 0 {
            return Err(FrameError::InvalidArgument(
                "max_steps_per_tick must be at least 1".to_string(),
            ));
        }

        Ok(())
    }
}

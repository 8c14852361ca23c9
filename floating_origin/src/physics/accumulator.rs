//! Fixed timestep accumulator
//!
//! Converts variable frame deltas into a whole number of fixed simulation
//! steps and keeps the remainder for the next tick.

use tracing::warn;

/// Accumulator deciding how many fixed steps a tick runs
#[derive(Debug, Clone)]
pub struct StepAccumulator {
    /// Accumulated wall time not yet consumed by a fixed step
    accumulator: f64,
    /// Fixed timestep in wall seconds
    pub fixed_timestep: f64,
    /// Upper bound on steps per tick
    pub max_steps: u32,
}

impl StepAccumulator {
    /// Create an accumulator with the given fixed timestep and step cap
    pub fn new(fixed_timestep: f64, max_steps: u32) -> Self {
        Self {
            accumulator: 0.0,
            fixed_timestep,
            max_steps,
        }
    }

    /// Add delta time to the accumulator
    /// Returns the number of fixed steps to perform
    pub fn accumulate(&mut self, delta_time: f64) -> u32 {
        self.accumulator += delta_time;

        // Prevent spiral of death
        let limit = self.fixed_timestep * f64::from(self.max_steps);
        if self.accumulator > limit {
            warn!(
                accumulated = self.accumulator,
                limit, "Step accumulator too large, clamping"
            );
            self.accumulator = limit;
        }

        // Tolerate rounding so a delta of exactly N steps yields N steps
        let steps = ((self.accumulator / self.fixed_timestep) + 1e-9).floor() as u32;
        self.accumulator = (self.accumulator - f64::from(steps) * self.fixed_timestep).max(0.0);

        steps
    }

    /// Interpolation alpha in [0, 1] between the last and next fixed step
    pub fn interpolation_alpha(&self) -> f64 {
        self.accumulator / self.fixed_timestep
    }

    /// Reset the accumulator to zero
    pub fn reset(&mut self) {
        self.accumulator = 0.0;
    }

    /// Get the current accumulated time
    pub fn accumulated_time(&self) -> f64 {
        self.accumulator
    }
}

impl Default for StepAccumulator {
    fn default() -> Self {
        // 50Hz fixed steps
        Self::new(0.02, 8)
    }
}

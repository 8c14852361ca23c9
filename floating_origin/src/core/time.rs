//! Simulation clock
//!
//! `ut` advances once per fixed step by `fixed_delta_time * time_scale`.
//! `old_ut` holds the value from one fixed step earlier, so inside a fixed step
//! `old_ut` is the start of the step and `ut` its end. Outside fixed steps `ut`
//! is the latest completed step and the time to use for frame switch requests.

use tracing::debug;

/// Universal simulation time, distinct from wall-clock time
#[derive(Debug, Clone, PartialEq)]
pub struct SimulationClock {
    ut: f64,
    old_ut: f64,
    /// Wall seconds covered by one fixed step
    fixed_delta_time: f64,
    /// Time warp factor
    time_scale: f64,
    fixed_steps: u64,
}

impl SimulationClock {
    pub fn new(start_ut: f64, fixed_delta_time: f64, time_scale: f64) -> Self {
        Self {
            ut: start_ut,
            old_ut: start_ut,
            fixed_delta_time,
            time_scale,
            fixed_steps: 0,
        }
    }

    /// Current simulation time
    pub fn ut(&self) -> f64 {
        self.ut
    }

    /// Simulation time one fixed step earlier
    pub fn old_ut(&self) -> f64 {
        self.old_ut
    }

    pub fn fixed_delta_time(&self) -> f64 {
        self.fixed_delta_time
    }

    pub fn time_scale(&self) -> f64 {
        self.time_scale
    }

    /// Simulation seconds covered by one fixed step at the current warp
    pub fn scaled_fixed_delta(&self) -> f64 {
        self.fixed_delta_time * self.time_scale
    }

    /// Number of fixed steps run since creation
    pub fn fixed_steps(&self) -> u64 {
        self.fixed_steps
    }

    pub fn set_time_scale(&mut self, time_scale: f64) {
        debug!(old = self.time_scale, new = time_scale, "Changing time scale");
        self.time_scale = time_scale;
    }

    /// Move the clock to the end of the next fixed step
    pub(crate) fn advance_fixed_step(&mut self) {
        self.old_ut = self.ut;
        self.ut += self.scaled_fixed_delta();
        self.fixed_steps += 1;
    }
}

impl Default for SimulationClock {
    fn default() -> Self {
        Self::new(0.0, 0.02, 1.0)
    }
}

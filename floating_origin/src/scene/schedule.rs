//! Ordered system lists run by the scene

use super::Scene;
use tracing::trace;

/// A callback run against the whole scene
pub type SceneSystem = Box<dyn FnMut(&mut Scene)>;

struct NamedSystem {
    name: String,
    system: SceneSystem,
}

/// Systems run in registration order
///
/// The scene keeps one schedule for the fixed step and one for the
/// presentation step. Fixed-step systems run before that step's physics
/// integration, so inside one `scene.old_ut()` is the time the scene state
/// corresponds to and `scene.ut()` the time it is being advanced to.
#[derive(Default)]
pub struct SystemSchedule {
    systems: Vec<NamedSystem>,
}

/// Systems run once per fixed step
pub type FixedStepSchedule = SystemSchedule;

/// Systems run once per tick, after any frame switch has been applied
pub type PresentationSchedule = SystemSchedule;

impl std::fmt::Debug for SystemSchedule {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SystemSchedule")
            .field("systems", &self.system_names())
            .finish()
    }
}

impl SystemSchedule {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_system(
        &mut self,
        name: impl Into<String>,
        system: impl FnMut(&mut Scene) + 'static,
    ) {
        self.systems.push(NamedSystem {
            name: name.into(),
            system: Box::new(system),
        });
    }

    pub fn len(&self) -> usize {
        self.systems.len()
    }

    pub fn is_empty(&self) -> bool {
        self.systems.is_empty()
    }

    pub fn system_names(&self) -> Vec<&str> {
        self.systems.iter().map(|system| system.name.as_str()).collect()
    }

    pub(crate) fn run(&mut self, scene: &mut Scene) {
        for system in self.systems.iter_mut() {
            trace!(system = %system.name, "Running system");
            (system.system)(scene);
        }
    }

    /// Append systems registered while this schedule was detached for a run
    pub(crate) fn absorb(&mut self, mut added: SystemSchedule) {
        self.systems.append(&mut added.systems);
    }
}

//! Simulation scene
//!
//! Owns the entity storage, the simulation clock and the one reference frame
//! manager of the scene, and drives the tick:
//!
//! 1. the step accumulator turns the variable wall delta into fixed steps
//! 2. each fixed step advances the clock, runs the fixed-step systems,
//!    integrates free and kinematic bodies, refreshes pinned transforms and
//!    checks the auto-recenter target
//!
//!    Fixed-step systems run before integration, so every transform they
//!    read or write is evaluated at `old_ut`, the time the bodies are at.
//! 3. a pending frame switch is applied
//! 4. presentation systems run
//!
//! Nothing in a fixed step can observe a frame switch requested during the
//! same tick; presentation systems always see the result.

mod schedule;
mod view;

#[cfg(test)]
mod tests;

pub use schedule::{FixedStepSchedule, PresentationSchedule, SceneSystem, SystemSchedule};
pub use view::{TransformView, TransformViewMut};

use crate::config::SimulationConfig;
use crate::core::SimulationClock;
use crate::error::{FrameError, FrameResult};
use crate::physics::StepAccumulator;
use crate::reference_frame::{AbsoluteState, ReferenceFrame, SceneReferenceFrameManager};
use crate::transform::{FrameContext, SceneTransform, TransformKind, TransformWrite};
use glam::{DQuat, DVec3, Vec3};
use hecs::Entity;
use tracing::{debug, info, trace, warn};

/// One simulated scene with its own reference frame
pub struct Scene {
    config: SimulationConfig,
    clock: SimulationClock,
    accumulator: StepAccumulator,
    manager: SceneReferenceFrameManager,
    world: hecs::World,
    kinematic_registered: bool,
    /// Set while the fixed-step systems of a step are running
    in_fixed_systems: bool,
    fixed_schedule: FixedStepSchedule,
    presentation_schedule: PresentationSchedule,
}

impl std::fmt::Debug for Scene {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Scene")
            .field("clock", &self.clock)
            .field("manager", &self.manager)
            .field("transforms", &self.transform_count())
            .field("kinematic_registered", &self.kinematic_registered)
            .field("fixed_schedule", &self.fixed_schedule)
            .field("presentation_schedule", &self.presentation_schedule)
            .finish()
    }
}

impl Scene {
    /// Scene whose frame is centered on the absolute origin at the start time
    pub fn new(config: SimulationConfig) -> FrameResult<Self> {
        let frame = ReferenceFrame::centered(config.start_ut, DVec3::ZERO);
        Self::with_frame(config, frame)
    }

    pub fn with_frame(config: SimulationConfig, frame: ReferenceFrame) -> FrameResult<Self> {
        config.validate()?;

        info!(
            start_ut = config.start_ut,
            fixed_delta_time = config.fixed_delta_time,
            time_scale = config.time_scale,
            kind = ?frame.kind(),
            "Creating scene"
        );

        Ok(Self {
            clock: SimulationClock::new(
                config.start_ut,
                config.fixed_delta_time,
                config.time_scale,
            ),
            accumulator: StepAccumulator::new(config.fixed_delta_time, config.max_steps_per_tick),
            manager: SceneReferenceFrameManager::new(
                frame,
                config.max_relative_position,
                config.max_relative_velocity,
            ),
            world: hecs::World::new(),
            kinematic_registered: false,
            in_fixed_systems: false,
            fixed_schedule: FixedStepSchedule::new(),
            presentation_schedule: PresentationSchedule::new(),
            config,
        })
    }

    pub fn config(&self) -> &SimulationConfig {
        &self.config
    }

    pub fn clock(&self) -> &SimulationClock {
        &self.clock
    }

    /// Current simulation time; the end of the fixed step while one runs
    pub fn ut(&self) -> f64 {
        self.clock.ut()
    }

    /// Simulation time one fixed step earlier; the start of the running step
    pub fn old_ut(&self) -> f64 {
        self.clock.old_ut()
    }

    /// Time the scene's transforms are currently evaluated at
    ///
    /// `old_ut` while fixed-step systems run, since bodies have not been
    /// integrated to `ut` yet. `ut` everywhere else.
    pub fn state_ut(&self) -> f64 {
        if self.in_fixed_systems {
            self.clock.old_ut()
        } else {
            self.clock.ut()
        }
    }

    pub fn set_time_scale(&mut self, time_scale: f64) -> FrameResult<()> {
        if !(time_scale.is_finite() && time_scale > 0.0) {
            return Err(FrameError::InvalidArgument(format!(
                "time_scale must be positive and finite, got {time_scale}"
            )));
        }
        self.clock.set_time_scale(time_scale);
        Ok(())
    }

    /// The frame every scene-local value is currently expressed in
    pub fn reference_frame(&self) -> &ReferenceFrame {
        self.manager.current_frame()
    }

    pub fn manager(&self) -> &SceneReferenceFrameManager {
        &self.manager
    }

    pub fn manager_mut(&mut self) -> &mut SceneReferenceFrameManager {
        &mut self.manager
    }

    /// Queue a frame switch for the next tick boundary
    ///
    /// The frame must be captured at the current simulation time, so
    /// `frame.reference_ut()` has to equal [`Self::ut`]. Inside a fixed-step
    /// system a frame captured at [`Self::state_ut`] is also accepted and is
    /// re-anchored to `ut` before it is queued.
    pub fn request_scene_reference_frame_switch(
        &mut self,
        frame: ReferenceFrame,
    ) -> FrameResult<()> {
        let ut = self.clock.ut();
        let frame = if self.in_fixed_systems && frame.reference_ut() == self.clock.old_ut() {
            frame.rebased(ut)
        } else {
            frame
        };
        self.manager.request_switch(frame, ut)
    }

    pub fn is_switch_requested(&self) -> bool {
        self.manager.is_switch_requested()
    }

    /// Follow `target` with the auto-recenter policy, or stop following
    pub fn set_target(&mut self, target: Option<Entity>) -> FrameResult<()> {
        if let Some(entity) = target {
            self.component(entity)?;
        }
        self.manager.set_target(target);
        Ok(())
    }

    /// The underlying entity storage
    ///
    /// Transforms must be added and removed through [`Self::spawn_transform`]
    /// and [`Self::despawn_transform`]; other components are free to use.
    pub fn world(&self) -> &hecs::World {
        &self.world
    }

    pub fn world_mut(&mut self) -> &mut hecs::World {
        &mut self.world
    }

    pub fn transform_count(&self) -> usize {
        self.world.query::<&SceneTransform>().iter().count()
    }

    /// Enable velocity integration of kinematic transforms
    ///
    /// Once enabled, kinematic bodies are integrated alongside free bodies
    /// after the fixed-step systems of every step. Must be called before any
    /// kinematic transform is spawned. Calling it again has no effect.
    pub fn register_kinematic_integration(&mut self) {
        if self.kinematic_registered {
            debug!("Kinematic integration already registered");
            return;
        }
        self.kinematic_registered = true;
        info!("Registered kinematic integration");
    }

    pub fn is_kinematic_integration_registered(&self) -> bool {
        self.kinematic_registered
    }

    pub fn add_fixed_step_system(
        &mut self,
        name: impl Into<String>,
        system: impl FnMut(&mut Scene) + 'static,
    ) {
        let name = name.into();
        debug!(system = %name, "Adding fixed-step system");
        self.fixed_schedule.add_system(name, system);
    }

    pub fn add_presentation_system(
        &mut self,
        name: impl Into<String>,
        system: impl FnMut(&mut Scene) + 'static,
    ) {
        let name = name.into();
        debug!(system = %name, "Adding presentation system");
        self.presentation_schedule.add_system(name, system);
    }

    pub fn fixed_schedule(&self) -> &FixedStepSchedule {
        &self.fixed_schedule
    }

    pub fn presentation_schedule(&self) -> &PresentationSchedule {
        &self.presentation_schedule
    }

    /// Register a transform with the scene
    pub fn spawn_transform(
        &mut self,
        transform: impl Into<SceneTransform>,
    ) -> FrameResult<Entity> {
        let transform = transform.into();
        let kind = transform.kind();

        if let SceneTransform::Free(free) = &transform {
            free.body().check_mass_properties()?;
        }
        if kind == TransformKind::Kinematic && !self.kinematic_registered {
            return Err(FrameError::InvalidState(
                "kinematic integration must be registered before spawning kinematic transforms"
                    .to_string(),
            ));
        }
        if let Some(target) = transform.pin_target() {
            self.check_pin_target(None, target)?;
        }

        let entity = self.world.spawn((transform,));
        debug!(entity = ?entity, kind = ?kind, "Spawned transform");
        Ok(entity)
    }

    /// Remove a transform and its entity
    ///
    /// Pinned transforms that followed it keep their current absolute pose
    /// and become unpinned. A manager target pointing at it is cleared.
    pub fn despawn_transform(&mut self, entity: Entity) -> FrameResult<()> {
        self.component(entity)?;

        let followers: Vec<Entity> = self
            .world
            .query::<&SceneTransform>()
            .iter()
            .filter(|(_, transform)| transform.pin_target() == Some(entity))
            .map(|(follower, _)| follower)
            .collect();

        for follower in followers {
            let pose = self.transform(follower)?.absolute_state();
            if let SceneTransform::Pinned(pinned) = &mut *self.component_mut(follower)? {
                pinned.set_reference(None, pose.position, pose.rotation);
            }
            debug!(
                follower = ?follower,
                target = ?entity,
                "Unpinned transform from despawned target"
            );
        }

        if self.manager.target() == Some(entity) {
            self.manager.clear_target();
        }

        self.world
            .despawn(entity)
            .map_err(|_| FrameError::TransformNotFound(entity))?;
        debug!(entity = ?entity, "Despawned transform");
        Ok(())
    }

    /// Read view of a transform in the current frame
    pub fn transform(&self, entity: Entity) -> FrameResult<TransformView<'_>> {
        let target = self.pin_target_state(entity)?;
        Ok(TransformView {
            entity,
            transform: self.component(entity)?,
            cx: self.context(target),
        })
    }

    /// Write view of a transform
    pub fn transform_mut(&mut self, entity: Entity) -> FrameResult<TransformViewMut<'_>> {
        self.component(entity)?;
        Ok(TransformViewMut {
            scene: self,
            entity,
        })
    }

    /// Advance by `delta_time` wall seconds; returns the fixed steps run
    pub fn tick(&mut self, delta_time: f64) -> FrameResult<u32> {
        let steps = self.accumulator.accumulate(delta_time);
        for _ in 0..steps {
            self.fixed_step()?;
        }

        self.apply_pending_switch()?;

        let mut schedule = std::mem::take(&mut self.presentation_schedule);
        schedule.run(self);
        let added = std::mem::replace(&mut self.presentation_schedule, schedule);
        self.presentation_schedule.absorb(added);

        trace!(steps, ut = self.clock.ut(), "Tick complete");
        Ok(steps)
    }

    fn fixed_step(&mut self) -> FrameResult<()> {
        self.clock.advance_fixed_step();
        let dt = (self.clock.ut() - self.clock.old_ut()) as f32;

        let mut schedule = std::mem::take(&mut self.fixed_schedule);
        self.in_fixed_systems = true;
        schedule.run(self);
        self.in_fixed_systems = false;
        let added = std::mem::replace(&mut self.fixed_schedule, schedule);
        self.fixed_schedule.absorb(added);

        for (_, transform) in self.world.query_mut::<&mut SceneTransform>() {
            match transform {
                SceneTransform::Free(free) => free.physics_step(dt),
                SceneTransform::Kinematic(kinematic) => kinematic.integration_step(dt),
                _ => {}
            }
        }

        self.refresh_pinned()?;
        self.check_recenter()
    }

    fn check_recenter(&mut self) -> FrameResult<()> {
        let Some(target) = self.manager.target() else {
            return Ok(());
        };

        let states = self
            .transform(target)
            .map(|view| (view.scene_state(), view.absolute_state()));
        let (local, absolute) = match states {
            Ok(states) => states,
            Err(FrameError::TransformNotFound(_)) => {
                warn!(target = ?target, "Recentering target has no transform, clearing it");
                self.manager.clear_target();
                return Ok(());
            }
            Err(error) => return Err(error),
        };

        if self.manager.needs_recenter(local.position, local.velocity) {
            let ut = self.clock.ut();
            self.manager
                .request_recenter(ut, absolute.position, absolute.velocity)?;
        }
        Ok(())
    }

    fn apply_pending_switch(&mut self) -> FrameResult<()> {
        let ut = self.clock.ut();
        let Some(data) = self.manager.begin_switch(ut) else {
            return Ok(());
        };

        for (_, transform) in self.world.query_mut::<&mut SceneTransform>() {
            transform
                .as_transform_mut()
                .on_scene_reference_frame_switch(&data);
        }
        self.manager.finish_switch(&data);

        self.refresh_pinned()
    }

    fn refresh_pinned(&mut self) -> FrameResult<()> {
        let pinned: Vec<Entity> = self
            .world
            .query::<&SceneTransform>()
            .iter()
            .filter(|(_, transform)| transform.kind() == TransformKind::Pinned)
            .map(|(entity, _)| entity)
            .collect();

        for entity in pinned {
            let target = self.pin_target_state(entity)?;
            let cx = self.context(target);
            if let SceneTransform::Pinned(transform) = &mut *self.component_mut(entity)? {
                transform.refresh(&cx);
            }
        }
        Ok(())
    }

    pub(crate) fn write_transform(
        &mut self,
        entity: Entity,
        write: TransformWrite,
    ) -> FrameResult<()> {
        let target = self.pin_target_state(entity)?;
        let cx = self.context(target);
        let mut transform = self.component_mut(entity)?;
        transform.as_transform_mut().set(&cx, write);
        Ok(())
    }

    pub(crate) fn apply_load(
        &mut self,
        entity: Entity,
        force: Vec3,
        torque: Vec3,
    ) -> FrameResult<()> {
        match &mut *self.component_mut(entity)? {
            SceneTransform::Free(free) => {
                free.apply_force(force);
                free.apply_torque(torque);
                Ok(())
            }
            other => Err(FrameError::InvalidState(format!(
                "{:?} transform {entity:?} does not accept forces",
                other.kind()
            ))),
        }
    }

    pub(crate) fn set_pin_reference(
        &mut self,
        entity: Entity,
        target: Option<Entity>,
        local_position: DVec3,
        local_rotation: DQuat,
    ) -> FrameResult<()> {
        let kind = self.component(entity)?.kind();
        if kind != TransformKind::Pinned {
            return Err(FrameError::InvalidState(format!(
                "{kind:?} transform {entity:?} cannot be pinned"
            )));
        }
        if let Some(target) = target {
            self.check_pin_target(Some(entity), target)?;
        }

        if let SceneTransform::Pinned(pinned) = &mut *self.component_mut(entity)? {
            pinned.set_reference(target, local_position, local_rotation);
        }
        debug!(entity = ?entity, target = ?target, "Pinned transform re-referenced");
        Ok(())
    }

    /// Reject a pin target that is missing or would close a cycle
    fn check_pin_target(&self, pinned: Option<Entity>, target: Entity) -> FrameResult<()> {
        let limit = self.world.len() as usize;
        let mut next = Some(target);
        let mut hops = 0;

        while let Some(entity) = next {
            if Some(entity) == pinned || hops > limit {
                return Err(FrameError::InvalidState(format!(
                    "pinning to {target:?} would create a cycle"
                )));
            }
            next = self
                .component(entity)
                .map_err(|_| {
                    FrameError::InvalidState(format!("pin target {entity:?} has no transform"))
                })?
                .pin_target();
            hops += 1;
        }
        Ok(())
    }

    /// Absolute state of the transform `entity` is pinned to, if any
    fn pin_target_state(&self, entity: Entity) -> FrameResult<Option<AbsoluteState>> {
        let target = self.component(entity)?.pin_target();
        match target {
            Some(target) => self.resolve_absolute(target, 0).map(Some),
            None => Ok(None),
        }
    }

    fn resolve_absolute(&self, entity: Entity, depth: usize) -> FrameResult<AbsoluteState> {
        if depth > self.world.len() as usize {
            return Err(FrameError::InvalidState(format!(
                "pin chain through {entity:?} is cyclic"
            )));
        }

        let transform = self.component(entity).map_err(|_| {
            FrameError::InvalidState(format!("pin target {entity:?} has no transform"))
        })?;
        let target = match transform.pin_target() {
            Some(next) => Some(self.resolve_absolute(next, depth + 1)?),
            None => None,
        };
        Ok(transform.as_transform().absolute_state(&self.context(target)))
    }

    fn context(&self, target: Option<AbsoluteState>) -> FrameContext<'_> {
        FrameContext::new(self.manager.current_frame(), self.state_ut()).with_target(target)
    }

    fn component(&self, entity: Entity) -> FrameResult<hecs::Ref<'_, SceneTransform>> {
        self.world
            .get::<&SceneTransform>(entity)
            .map_err(|_| FrameError::TransformNotFound(entity))
    }

    pub(crate) fn component_mut(
        &self,
        entity: Entity,
    ) -> FrameResult<hecs::RefMut<'_, SceneTransform>> {
        self.world
            .get::<&mut SceneTransform>(entity)
            .map_err(|_| FrameError::TransformNotFound(entity))
    }
}

//! Transform for bodies moved by the physics step

use super::{
    body, FrameContext, ReferenceFrameTransform, SceneState, TransformEvent, TransformEvents,
    TransformKind, TransformWrite,
};
use crate::physics::{integrate_dynamic_body, Rigidbody};
use crate::reference_frame::{AbsoluteState, SceneReferenceFrameSwitchData};
use glam::Vec3;

/// Full six degree of freedom transform backed by a dynamic rigid body
///
/// Forces and torques are accumulated on the body and consumed by the next
/// fixed step.
#[derive(Debug, Default)]
pub struct FreeTransform {
    body: Rigidbody,
    events: TransformEvents,
}

impl FreeTransform {
    pub fn new(mut body: Rigidbody) -> Self {
        body.is_kinematic = false;
        Self {
            body,
            events: TransformEvents::new(),
        }
    }

    /// A body of the given mass at rest at the scene origin
    ///
    /// The mass is checked when the transform is spawned into a scene.
    pub fn with_mass(mass: f32) -> Self {
        Self::new(Rigidbody::dynamic(mass))
    }

    pub fn body(&self) -> &Rigidbody {
        &self.body
    }

    /// Force in scene-local axes, applied during the next fixed step
    pub fn apply_force(&mut self, force: Vec3) {
        self.body.apply_force(force);
    }

    /// Torque in scene-local axes, applied during the next fixed step
    pub fn apply_torque(&mut self, torque: Vec3) {
        self.body.apply_torque(torque);
    }

    /// Advance the body by one fixed step and report the read-back
    pub(crate) fn physics_step(&mut self, dt: f32) {
        integrate_dynamic_body(&mut self.body, dt);
        self.events.notify(&TransformEvent::ALL_VALUES);
    }
}

impl ReferenceFrameTransform for FreeTransform {
    fn kind(&self) -> TransformKind {
        TransformKind::Free
    }

    fn scene_state(&self, _cx: &FrameContext) -> SceneState {
        body::scene_state(&self.body)
    }

    fn absolute_state(&self, cx: &FrameContext) -> AbsoluteState {
        body::absolute_state(&self.body, cx)
    }

    fn write(&mut self, cx: &FrameContext, write: TransformWrite) -> &'static [TransformEvent] {
        body::write(&mut self.body, cx, write)
    }

    fn on_scene_reference_frame_switch(&mut self, data: &SceneReferenceFrameSwitchData) {
        body::rebase(&mut self.body, data);
        self.events.notify(&TransformEvent::SCENE_LOCAL);
    }

    fn events(&self) -> &TransformEvents {
        &self.events
    }

    fn events_mut(&mut self) -> &mut TransformEvents {
        &mut self.events
    }
}

//! Transform for bodies on prescribed, non-physical motion

use super::{
    body, FrameContext, ReferenceFrameTransform, SceneState, TransformEvent, TransformEvents,
    TransformKind, TransformWrite,
};
use crate::physics::{integrate_kinematic_body, Rigidbody};
use crate::reference_frame::{AbsoluteState, SceneReferenceFrameSwitchData};

/// Transform advanced by explicit velocity integration
///
/// The physics step never touches its body. Instead the kinematic
/// integration system, registered into the scene's fixed-step schedule,
/// moves it by its own velocity and angular velocity every step.
#[derive(Debug)]
pub struct KinematicTransform {
    body: Rigidbody,
    events: TransformEvents,
}

impl Default for KinematicTransform {
    fn default() -> Self {
        Self::new()
    }
}

impl KinematicTransform {
    pub fn new() -> Self {
        Self {
            body: Rigidbody::kinematic(),
            events: TransformEvents::new(),
        }
    }

    pub fn body(&self) -> &Rigidbody {
        &self.body
    }

    pub(crate) fn integration_step(&mut self, dt: f32) {
        integrate_kinematic_body(&mut self.body, dt);
        self.events.notify(&TransformEvent::ALL_VALUES);
    }
}

impl ReferenceFrameTransform for KinematicTransform {
    fn kind(&self) -> TransformKind {
        TransformKind::Kinematic
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

#[cfg(test)]
mod tests {
    use super::*;
    use crate::reference_frame::ReferenceFrame;
    use glam::{DVec3, Vec3};

    #[test]
    fn test_integration_step_moves_by_velocity() {
        let frame = ReferenceFrame::default();
        let cx = FrameContext::new(&frame, 0.0);
        let mut transform = KinematicTransform::new();
        transform.set_absolute_velocity(&cx, DVec3::new(0.0, 0.0, 4.0));

        transform.integration_step(0.25);

        assert_eq!(transform.position(&cx), Vec3::new(0.0, 0.0, 1.0));
        assert!(transform.body().is_kinematic);
    }
}

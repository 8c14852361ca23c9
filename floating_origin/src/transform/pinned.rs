//! Transform pinned to another transform at a fixed local offset

use super::{
    FrameContext, ReferenceFrameTransform, SceneState, TransformEvent, TransformEvents,
    TransformKind, TransformWrite,
};
use crate::reference_frame::{AbsoluteState, SceneReferenceFrameSwitchData};
use glam::{DQuat, DVec3};
use hecs::Entity;
use tracing::trace;

/// Transform whose absolute state is derived from a target transform
///
/// ```text
/// absolute_position = target.absolute_position + target.absolute_rotation * reference_position
/// absolute_rotation = target.absolute_rotation * reference_rotation
/// ```
///
/// Velocity, angular velocity and accelerations are the target's own values.
/// The tangential contribution of the target's angular velocity acting on
/// the offset is not included. Without a target the reference pose is used
/// directly as the absolute pose.
///
/// The target's state arrives through [`FrameContext::target`]; the scene
/// resolves it on every access.
#[derive(Debug)]
pub struct PinnedTransform {
    target: Option<Entity>,
    reference_position: DVec3,
    reference_rotation: DQuat,
    /// Last state reported through events, used to detect target motion
    last_absolute: Option<AbsoluteState>,
    events: TransformEvents,
}

impl Default for PinnedTransform {
    fn default() -> Self {
        Self::new(None, DVec3::ZERO, DQuat::IDENTITY)
    }
}

impl PinnedTransform {
    pub fn new(
        target: Option<Entity>,
        reference_position: DVec3,
        reference_rotation: DQuat,
    ) -> Self {
        Self {
            target,
            reference_position,
            reference_rotation: reference_rotation.normalize(),
            last_absolute: None,
            events: TransformEvents::new(),
        }
    }

    pub fn target(&self) -> Option<Entity> {
        self.target
    }

    /// Offset from the target, expressed in the target's axes
    pub fn reference_position(&self) -> DVec3 {
        self.reference_position
    }

    pub fn reference_rotation(&self) -> DQuat {
        self.reference_rotation
    }

    /// Re-pin; the scene validates the target before calling this
    pub(crate) fn set_reference(
        &mut self,
        target: Option<Entity>,
        reference_position: DVec3,
        reference_rotation: DQuat,
    ) {
        self.target = target;
        self.reference_position = reference_position;
        self.reference_rotation = reference_rotation.normalize();
        self.last_absolute = None;
        self.events.notify(&TransformEvent::ALL_VALUES);
    }

    /// The absolute state implied by a target state and the stored offset
    pub fn compose(&self, target: Option<&AbsoluteState>) -> AbsoluteState {
        match target {
            Some(target) => AbsoluteState {
                position: target.position + target.rotation * self.reference_position,
                rotation: (target.rotation * self.reference_rotation).normalize(),
                velocity: target.velocity,
                angular_velocity: target.angular_velocity,
                acceleration: target.acceleration,
                angular_acceleration: target.angular_acceleration,
            },
            None => AbsoluteState::at_rest(self.reference_position, self.reference_rotation),
        }
    }

    /// Report a change if the derived state moved since the last refresh
    pub(crate) fn refresh(&mut self, cx: &FrameContext) -> bool {
        let current = self.absolute_state(cx);
        if self.last_absolute == Some(current) {
            return false;
        }
        self.last_absolute = Some(current);
        self.events.notify(&TransformEvent::ALL_VALUES);
        true
    }

    fn set_absolute_pose(
        &mut self,
        target: Option<&AbsoluteState>,
        position: Option<DVec3>,
        rotation: Option<DQuat>,
    ) {
        match target {
            Some(target) => {
                let to_target = target.rotation.conjugate();
                if let Some(position) = position {
                    self.reference_position = to_target * (position - target.position);
                }
                if let Some(rotation) = rotation {
                    self.reference_rotation = (to_target * rotation).normalize();
                }
            }
            None => {
                if let Some(position) = position {
                    self.reference_position = position;
                }
                if let Some(rotation) = rotation {
                    self.reference_rotation = rotation.normalize();
                }
            }
        }
    }
}

impl ReferenceFrameTransform for PinnedTransform {
    fn kind(&self) -> TransformKind {
        TransformKind::Pinned
    }

    fn scene_state(&self, cx: &FrameContext) -> SceneState {
        SceneState::from_local(&cx.frame.transform_state(cx.ut, &self.absolute_state(cx)))
    }

    fn absolute_state(&self, cx: &FrameContext) -> AbsoluteState {
        self.compose(cx.target.as_ref())
    }

    /// Pose writes move the offset so the written value holds; motion is
    /// always the target's and cannot be written
    fn write(&mut self, cx: &FrameContext, write: TransformWrite) -> &'static [TransformEvent] {
        let (frame, ut) = (cx.frame, cx.ut);
        let target = cx.target.as_ref();
        match write {
            TransformWrite::AbsolutePosition(value) => {
                self.set_absolute_pose(target, Some(value), None);
            }
            TransformWrite::Position(value) => {
                let absolute = frame.inverse_transform_position(ut, value.as_dvec3());
                self.set_absolute_pose(target, Some(absolute), None);
            }
            TransformWrite::AbsoluteRotation(value) => {
                self.set_absolute_pose(target, None, Some(value));
            }
            TransformWrite::Rotation(value) => {
                let absolute = frame.inverse_transform_rotation(ut, value.as_dquat());
                self.set_absolute_pose(target, None, Some(absolute));
            }
            _ => {
                trace!(write = ?write, "Ignoring motion write on pinned transform");
                return &[];
            }
        }
        self.last_absolute = Some(self.compose(target));
        write.events()
    }

    fn on_scene_reference_frame_switch(&mut self, _data: &SceneReferenceFrameSwitchData) {
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
    use std::f64::consts::FRAC_PI_2;

    fn target_state() -> AbsoluteState {
        AbsoluteState {
            position: DVec3::new(1_000.0, 0.0, 0.0),
            rotation: DQuat::from_rotation_z(FRAC_PI_2),
            velocity: DVec3::new(0.0, 5.0, 0.0),
            angular_velocity: DVec3::new(0.0, 0.0, 0.1),
            ..Default::default()
        }
    }

    #[test]
    fn test_compose_with_rotated_target() {
        let pinned = PinnedTransform::new(None, DVec3::new(2.0, 0.0, 0.0), DQuat::IDENTITY);
        let state = pinned.compose(Some(&target_state()));

        // +X offset turned a quarter about Z lands on +Y
        assert!((state.position - DVec3::new(1_000.0, 2.0, 0.0)).length() < 1e-9);
        assert!(state.rotation.abs_diff_eq(DQuat::from_rotation_z(FRAC_PI_2), 1e-12));
        assert_eq!(state.velocity, DVec3::new(0.0, 5.0, 0.0));
        assert_eq!(state.angular_velocity, DVec3::new(0.0, 0.0, 0.1));
    }

    #[test]
    fn test_without_target_reference_is_absolute() {
        let rotation = DQuat::from_rotation_x(0.4);
        let pinned = PinnedTransform::new(None, DVec3::new(7.0, 8.0, 9.0), rotation);
        let state = pinned.compose(None);

        assert_eq!(state.position, DVec3::new(7.0, 8.0, 9.0));
        assert_eq!(state.rotation, rotation.normalize());
        assert_eq!(state.velocity, DVec3::ZERO);
    }

    #[test]
    fn test_absolute_write_rewrites_offset() {
        let frame = ReferenceFrame::default();
        let cx = FrameContext::new(&frame, 0.0).with_target(Some(target_state()));
        let mut pinned = PinnedTransform::default();

        pinned.set_absolute_position(&cx, DVec3::new(1_000.0, 3.0, 0.0));
        assert!((pinned.reference_position() - DVec3::new(3.0, 0.0, 0.0)).length() < 1e-9);
        assert!((pinned.absolute_position(&cx) - DVec3::new(1_000.0, 3.0, 0.0)).length() < 1e-9);

        pinned.set_absolute_velocity(&cx, DVec3::splat(100.0));
        assert_eq!(pinned.absolute_velocity(&cx), DVec3::new(0.0, 5.0, 0.0));
    }

    #[test]
    fn test_refresh_reports_only_changes() {
        let frame = ReferenceFrame::default();
        let mut pinned = PinnedTransform::default();
        let first = FrameContext::new(&frame, 0.0).with_target(Some(target_state()));

        assert!(pinned.refresh(&first));
        assert!(!pinned.refresh(&first));

        let mut moved = target_state();
        moved.position.x += 1.0;
        let second = FrameContext::new(&frame, 0.0).with_target(Some(moved));
        assert!(pinned.refresh(&second));
    }
}

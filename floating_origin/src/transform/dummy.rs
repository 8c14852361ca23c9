//! Transform without any physics binding

use super::{
    FrameContext, ReferenceFrameTransform, SceneState, TransformEvent, TransformEvents,
    TransformKind, TransformWrite,
};
use crate::reference_frame::{AbsoluteState, SceneReferenceFrameSwitchData};

/// Plain holder of absolute state
///
/// Lets markers and test doubles take part in the reference frame contract.
/// Absolute state is the authority; scene-local values are derived on read,
/// so a frame switch changes them without touching the stored state.
#[derive(Debug, Default)]
pub struct DummyTransform {
    state: AbsoluteState,
    events: TransformEvents,
}

impl DummyTransform {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_state(state: AbsoluteState) -> Self {
        Self {
            state,
            events: TransformEvents::new(),
        }
    }
}

impl ReferenceFrameTransform for DummyTransform {
    fn kind(&self) -> TransformKind {
        TransformKind::Dummy
    }

    fn scene_state(&self, cx: &FrameContext) -> SceneState {
        SceneState::from_local(&cx.frame.transform_state(cx.ut, &self.state))
    }

    fn absolute_state(&self, _cx: &FrameContext) -> AbsoluteState {
        self.state
    }

    fn write(&mut self, cx: &FrameContext, write: TransformWrite) -> &'static [TransformEvent] {
        let (frame, ut) = (cx.frame, cx.ut);
        let state = &mut self.state;
        match write {
            TransformWrite::AbsolutePosition(value) => state.position = value,
            TransformWrite::Position(value) => {
                state.position = frame.inverse_transform_position(ut, value.as_dvec3());
            }
            TransformWrite::AbsoluteRotation(value) => state.rotation = value.normalize(),
            TransformWrite::Rotation(value) => {
                state.rotation = frame
                    .inverse_transform_rotation(ut, value.as_dquat())
                    .normalize();
            }
            TransformWrite::AbsoluteVelocity(value) => state.velocity = value,
            TransformWrite::Velocity(value) => {
                state.velocity = frame.inverse_transform_velocity(ut, value.as_dvec3());
            }
            TransformWrite::AbsoluteAngularVelocity(value) => state.angular_velocity = value,
            TransformWrite::AngularVelocity(value) => {
                state.angular_velocity =
                    frame.inverse_transform_angular_velocity(ut, value.as_dvec3());
            }
            TransformWrite::AbsoluteAcceleration(value) => state.acceleration = value,
            TransformWrite::Acceleration(value) => {
                state.acceleration = frame.inverse_transform_acceleration(ut, value.as_dvec3());
            }
        }
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

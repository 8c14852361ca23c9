//! Transform for static scenery

use super::{
    body, FrameContext, ReferenceFrameTransform, SceneState, TransformEvent, TransformEvents,
    TransformKind, TransformWrite,
};
use crate::physics::Rigidbody;
use crate::reference_frame::{AbsoluteState, SceneReferenceFrameSwitchData};
use tracing::trace;

/// Transform whose body never moves in scene space
///
/// Scene-local velocity, angular velocity and acceleration are always zero,
/// so its absolute motion is exactly the motion of the scene frame. Writes to
/// motion terms are ignored. A frame switch re-places the body so its absolute
/// pose is preserved; it is then at rest in the new frame.
#[derive(Debug, Default)]
pub struct FixedTransform {
    body: Rigidbody,
    events: TransformEvents,
}

impl FixedTransform {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn body(&self) -> &Rigidbody {
        &self.body
    }
}

impl ReferenceFrameTransform for FixedTransform {
    fn kind(&self) -> TransformKind {
        TransformKind::Fixed
    }

    fn is_fixed(&self) -> bool {
        true
    }

    fn scene_state(&self, _cx: &FrameContext) -> SceneState {
        body::scene_state(&self.body)
    }

    fn absolute_state(&self, cx: &FrameContext) -> AbsoluteState {
        body::absolute_state(&self.body, cx)
    }

    fn write(&mut self, cx: &FrameContext, write: TransformWrite) -> &'static [TransformEvent] {
        if write.is_motion() {
            trace!(write = ?write, "Ignoring motion write on fixed transform");
            return &[];
        }
        body::write(&mut self.body, cx, write)
    }

    fn on_scene_reference_frame_switch(&mut self, data: &SceneReferenceFrameSwitchData) {
        body::rebase(&mut self.body, data);
        self.body.rest();
        self.events.notify(&TransformEvent::SCENE_LOCAL);
    }

    fn events(&self) -> &TransformEvents {
        &self.events
    }

    fn events_mut(&mut self) -> &mut TransformEvents {
        &mut self.events
    }
}

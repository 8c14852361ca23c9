//! Reference frame transforms
//!
//! A transform is the per-object bridge between absolute state (f64,
//! frame-independent) and scene-local state (f32, expressed in the scene's
//! current reference frame). Every variant keeps
//! `scene_local == frame.transform(absolute)` whenever either side is read:
//!
//! - [`FreeTransform`]: rigid body advanced by the physics step
//! - [`FixedTransform`]: rigid body at rest in scene space
//! - [`KinematicTransform`]: rigid body advanced by explicit velocity integration
//! - [`PinnedTransform`]: absolute state derived from another transform
//! - [`DummyTransform`]: plain data holder with absolute authority

mod body;
pub mod dummy;
pub mod events;
pub mod fixed;
pub mod free;
pub mod kinematic;
pub mod pinned;

pub use dummy::DummyTransform;
pub use events::{TransformEvent, TransformEvents, TransformListenerId};
pub use fixed::FixedTransform;
pub use free::FreeTransform;
pub use kinematic::KinematicTransform;
pub use pinned::PinnedTransform;

use crate::reference_frame::{AbsoluteState, ReferenceFrame, SceneReferenceFrameSwitchData};
use glam::{DQuat, DVec3, Quat, Vec3};

/// What a transform is evaluated against
#[derive(Debug, Clone, Copy)]
pub struct FrameContext<'a> {
    /// The scene's current reference frame
    pub frame: &'a ReferenceFrame,
    /// Current simulation time
    pub ut: f64,
    /// Absolute state of the transform this one is pinned to, resolved by
    /// the scene. Only pinned transforms read it.
    pub target: Option<AbsoluteState>,
}

impl<'a> FrameContext<'a> {
    pub fn new(frame: &'a ReferenceFrame, ut: f64) -> Self {
        Self {
            frame,
            ut,
            target: None,
        }
    }

    pub fn with_target(mut self, target: Option<AbsoluteState>) -> Self {
        self.target = target;
        self
    }
}

/// Single-precision state in the scene frame
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SceneState {
    pub position: Vec3,
    pub rotation: Quat,
    pub velocity: Vec3,
    pub angular_velocity: Vec3,
    pub acceleration: Vec3,
}

impl SceneState {
    /// Narrow an f64 frame-local state to scene precision
    pub fn from_local(local: &AbsoluteState) -> Self {
        Self {
            position: local.position.as_vec3(),
            rotation: local.rotation.as_quat(),
            velocity: local.velocity.as_vec3(),
            angular_velocity: local.angular_velocity.as_vec3(),
            acceleration: local.acceleration.as_vec3(),
        }
    }
}

/// A single value written through a transform
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum TransformWrite {
    Position(Vec3),
    Rotation(Quat),
    Velocity(Vec3),
    AngularVelocity(Vec3),
    Acceleration(Vec3),
    AbsolutePosition(DVec3),
    AbsoluteRotation(DQuat),
    AbsoluteVelocity(DVec3),
    AbsoluteAngularVelocity(DVec3),
    AbsoluteAcceleration(DVec3),
}

impl TransformWrite {
    /// Events raised when this write changes the value
    ///
    /// Setting either side of a quantity changes both sides.
    pub fn events(&self) -> &'static [TransformEvent] {
        use TransformEvent::*;
        match self {
            Self::Position(_) | Self::AbsolutePosition(_) => {
                &[PositionChanged, AbsolutePositionChanged]
            }
            Self::Rotation(_) | Self::AbsoluteRotation(_) => {
                &[RotationChanged, AbsoluteRotationChanged]
            }
            Self::Velocity(_) | Self::AbsoluteVelocity(_) => {
                &[VelocityChanged, AbsoluteVelocityChanged]
            }
            Self::AngularVelocity(_) | Self::AbsoluteAngularVelocity(_) => {
                &[AngularVelocityChanged, AbsoluteAngularVelocityChanged]
            }
            Self::Acceleration(_) | Self::AbsoluteAcceleration(_) => {
                &[AccelerationChanged, AbsoluteAccelerationChanged]
            }
        }
    }

    /// Whether the write targets a motion term rather than the pose
    pub fn is_motion(&self) -> bool {
        !matches!(
            self,
            Self::Position(_)
                | Self::Rotation(_)
                | Self::AbsolutePosition(_)
                | Self::AbsoluteRotation(_)
        )
    }
}

/// Which variant a transform is
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TransformKind {
    Free,
    Fixed,
    Kinematic,
    Pinned,
    Dummy,
}

/// Shared contract of every transform variant
///
/// Getters are pure functions of the stored state and the context, so
/// repeated reads without an intervening write return identical values.
pub trait ReferenceFrameTransform {
    fn kind(&self) -> TransformKind;

    /// Fixed transforms never move in scene space
    fn is_fixed(&self) -> bool {
        false
    }

    /// Complete scene-local state
    fn scene_state(&self, cx: &FrameContext) -> SceneState;

    /// Complete absolute state
    fn absolute_state(&self, cx: &FrameContext) -> AbsoluteState;

    /// Apply one write; returns the events it raised, if any
    fn write(&mut self, cx: &FrameContext, write: TransformWrite) -> &'static [TransformEvent];

    /// Re-derive scene-local state after the scene frame switched
    fn on_scene_reference_frame_switch(&mut self, data: &SceneReferenceFrameSwitchData);

    fn events(&self) -> &TransformEvents;

    fn events_mut(&mut self) -> &mut TransformEvents;

    fn position(&self, cx: &FrameContext) -> Vec3 {
        self.scene_state(cx).position
    }

    fn rotation(&self, cx: &FrameContext) -> Quat {
        self.scene_state(cx).rotation
    }

    fn velocity(&self, cx: &FrameContext) -> Vec3 {
        self.scene_state(cx).velocity
    }

    fn angular_velocity(&self, cx: &FrameContext) -> Vec3 {
        self.scene_state(cx).angular_velocity
    }

    fn acceleration(&self, cx: &FrameContext) -> Vec3 {
        self.scene_state(cx).acceleration
    }

    fn absolute_position(&self, cx: &FrameContext) -> DVec3 {
        self.absolute_state(cx).position
    }

    fn absolute_rotation(&self, cx: &FrameContext) -> DQuat {
        self.absolute_state(cx).rotation
    }

    fn absolute_velocity(&self, cx: &FrameContext) -> DVec3 {
        self.absolute_state(cx).velocity
    }

    fn absolute_angular_velocity(&self, cx: &FrameContext) -> DVec3 {
        self.absolute_state(cx).angular_velocity
    }

    fn absolute_acceleration(&self, cx: &FrameContext) -> DVec3 {
        self.absolute_state(cx).acceleration
    }

    /// A fully general frame centered on this transform's current state
    fn local_reference_frame(&self, cx: &FrameContext) -> ReferenceFrame {
        ReferenceFrame::from_absolute_state(cx.ut, &self.absolute_state(cx))
    }

    /// Write a value and fire the resulting change events
    fn set(&mut self, cx: &FrameContext, write: TransformWrite) {
        let changed = self.write(cx, write);
        self.events_mut().notify(changed);
    }

    fn set_position(&mut self, cx: &FrameContext, value: Vec3) {
        self.set(cx, TransformWrite::Position(value));
    }

    fn set_rotation(&mut self, cx: &FrameContext, value: Quat) {
        self.set(cx, TransformWrite::Rotation(value));
    }

    fn set_velocity(&mut self, cx: &FrameContext, value: Vec3) {
        self.set(cx, TransformWrite::Velocity(value));
    }

    fn set_angular_velocity(&mut self, cx: &FrameContext, value: Vec3) {
        self.set(cx, TransformWrite::AngularVelocity(value));
    }

    fn set_acceleration(&mut self, cx: &FrameContext, value: Vec3) {
        self.set(cx, TransformWrite::Acceleration(value));
    }

    fn set_absolute_position(&mut self, cx: &FrameContext, value: DVec3) {
        self.set(cx, TransformWrite::AbsolutePosition(value));
    }

    fn set_absolute_rotation(&mut self, cx: &FrameContext, value: DQuat) {
        self.set(cx, TransformWrite::AbsoluteRotation(value));
    }

    fn set_absolute_velocity(&mut self, cx: &FrameContext, value: DVec3) {
        self.set(cx, TransformWrite::AbsoluteVelocity(value));
    }

    fn set_absolute_angular_velocity(&mut self, cx: &FrameContext, value: DVec3) {
        self.set(cx, TransformWrite::AbsoluteAngularVelocity(value));
    }

    fn set_absolute_acceleration(&mut self, cx: &FrameContext, value: DVec3) {
        self.set(cx, TransformWrite::AbsoluteAcceleration(value));
    }
}

/// Transform component stored on a scene entity
#[derive(Debug)]
pub enum SceneTransform {
    Free(FreeTransform),
    Fixed(FixedTransform),
    Kinematic(KinematicTransform),
    Pinned(PinnedTransform),
    Dummy(DummyTransform),
}

impl SceneTransform {
    pub fn as_transform(&self) -> &dyn ReferenceFrameTransform {
        match self {
            Self::Free(transform) => transform,
            Self::Fixed(transform) => transform,
            Self::Kinematic(transform) => transform,
            Self::Pinned(transform) => transform,
            Self::Dummy(transform) => transform,
        }
    }

    pub fn as_transform_mut(&mut self) -> &mut dyn ReferenceFrameTransform {
        match self {
            Self::Free(transform) => transform,
            Self::Fixed(transform) => transform,
            Self::Kinematic(transform) => transform,
            Self::Pinned(transform) => transform,
            Self::Dummy(transform) => transform,
        }
    }

    pub fn kind(&self) -> TransformKind {
        self.as_transform().kind()
    }

    /// The entity this transform is pinned to, if it is a pinned transform
    pub fn pin_target(&self) -> Option<hecs::Entity> {
        match self {
            Self::Pinned(pinned) => pinned.target(),
            _ => None,
        }
    }
}

impl From<FreeTransform> for SceneTransform {
    fn from(transform: FreeTransform) -> Self {
        Self::Free(transform)
    }
}

impl From<FixedTransform> for SceneTransform {
    fn from(transform: FixedTransform) -> Self {
        Self::Fixed(transform)
    }
}

impl From<KinematicTransform> for SceneTransform {
    fn from(transform: KinematicTransform) -> Self {
        Self::Kinematic(transform)
    }
}

impl From<PinnedTransform> for SceneTransform {
    fn from(transform: PinnedTransform) -> Self {
        Self::Pinned(transform)
    }
}

impl From<DummyTransform> for SceneTransform {
    fn from(transform: DummyTransform) -> Self {
        Self::Dummy(transform)
    }
}

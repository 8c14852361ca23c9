//! Reference frame algebra
//!
//! A reference frame is a time-parameterized coordinate transform between
//! absolute (f64, frame-independent) space and frame-local space. Every frame
//! captures its motion parameters at `reference_ut` and extrapolates them to
//! the evaluation time before transforming, so a frame built once stays valid
//! for any later simulation time.
//!
//! Five variants escalate the kinds of motion a frame may carry:
//! - [`CenteredReferenceFrame`]: static translation
//! - [`CenteredInertialReferenceFrame`]: translation with constant velocity
//! - [`OrientedReferenceFrame`]: static translation and rotation
//! - [`OrientedInertialReferenceFrame`]: constant linear and angular velocity
//! - [`OrientedNonInertialReferenceFrame`]: constant linear and angular acceleration
//!
//! Frames are immutable values. Switching frames always builds a new one.

pub mod centered;
pub mod manager;
pub mod non_inertial;
pub mod oriented;


pub use centered::{CenteredInertialReferenceFrame, CenteredReferenceFrame};
pub use manager::{
    ReferenceFrameStats, SceneReferenceFrameManager, SceneReferenceFrameSwitchData,
    SwitchListenerId, SwitchRecord, SwitchState,
};
pub use non_inertial::OrientedNonInertialReferenceFrame;
pub use oriented::{OrientedInertialReferenceFrame, OrientedReferenceFrame};

use glam::{DQuat, DVec3};
use serde::{Deserialize, Serialize};

/// Full double-precision kinematic state of an object
///
/// Used both for absolute state and for frame-local state expressed in f64.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AbsoluteState {
    pub position: DVec3,
    pub rotation: DQuat,
    pub velocity: DVec3,
    pub angular_velocity: DVec3,
    pub acceleration: DVec3,
    pub angular_acceleration: DVec3,
}

impl Default for AbsoluteState {
    fn default() -> Self {
        Self {
            position: DVec3::ZERO,
            rotation: DQuat::IDENTITY,
            velocity: DVec3::ZERO,
            angular_velocity: DVec3::ZERO,
            acceleration: DVec3::ZERO,
            angular_acceleration: DVec3::ZERO,
        }
    }
}

impl AbsoluteState {
    /// State at rest at the given position and rotation
    pub fn at_rest(position: DVec3, rotation: DQuat) -> Self {
        Self {
            position,
            rotation,
            ..Default::default()
        }
    }
}

/// A frame's own motion, extrapolated to a specific simulation time
///
/// All transforms are defined on this value so every frame variant shares the
/// same composition rules. Terms a variant does not carry are zero.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FrameMotion {
    pub origin: DVec3,
    pub velocity: DVec3,
    pub acceleration: DVec3,
    pub rotation: DQuat,
    pub angular_velocity: DVec3,
    pub angular_acceleration: DVec3,
}

impl FrameMotion {
    /// Motion of a frame that sits still at `origin` with `rotation`
    pub fn stationary(origin: DVec3, rotation: DQuat) -> Self {
        Self {
            origin,
            velocity: DVec3::ZERO,
            acceleration: DVec3::ZERO,
            rotation,
            angular_velocity: DVec3::ZERO,
            angular_acceleration: DVec3::ZERO,
        }
    }

    /// Rotation that takes absolute directions into frame-local directions
    fn inverse_rotation(&self) -> DQuat {
        self.rotation.conjugate()
    }

    pub fn transform_position(&self, position: DVec3) -> DVec3 {
        self.inverse_rotation() * (position - self.origin)
    }

    pub fn inverse_transform_position(&self, local_position: DVec3) -> DVec3 {
        self.rotation * local_position + self.origin
    }

    pub fn transform_rotation(&self, rotation: DQuat) -> DQuat {
        self.inverse_rotation() * rotation
    }

    pub fn inverse_transform_rotation(&self, local_rotation: DQuat) -> DQuat {
        self.rotation * local_rotation
    }

    pub fn transform_velocity(&self, velocity: DVec3) -> DVec3 {
        self.inverse_rotation() * (velocity - self.velocity)
    }

    pub fn inverse_transform_velocity(&self, local_velocity: DVec3) -> DVec3 {
        self.rotation * local_velocity + self.velocity
    }

    pub fn transform_angular_velocity(&self, angular_velocity: DVec3) -> DVec3 {
        self.inverse_rotation() * (angular_velocity - self.angular_velocity)
    }

    pub fn inverse_transform_angular_velocity(&self, local_angular_velocity: DVec3) -> DVec3 {
        self.rotation * local_angular_velocity + self.angular_velocity
    }

    pub fn transform_acceleration(&self, acceleration: DVec3) -> DVec3 {
        self.inverse_rotation() * (acceleration - self.acceleration)
    }

    pub fn inverse_transform_acceleration(&self, local_acceleration: DVec3) -> DVec3 {
        self.rotation * local_acceleration + self.acceleration
    }

    pub fn transform_angular_acceleration(&self, angular_acceleration: DVec3) -> DVec3 {
        self.inverse_rotation() * (angular_acceleration - self.angular_acceleration)
    }

    pub fn inverse_transform_angular_acceleration(
        &self,
        local_angular_acceleration: DVec3,
    ) -> DVec3 {
        self.rotation * local_angular_acceleration + self.angular_acceleration
    }
}

/// Behaviour shared by every concrete frame variant
pub trait ReferenceFrameModel: Copy {
    /// Simulation time at which the motion parameters were captured
    fn reference_ut(&self) -> f64;

    /// Extrapolate the frame's own motion to `ut`
    fn motion_at(&self, ut: f64) -> FrameMotion;

    /// A frame of the same kind whose origin (and velocity, where the kind has
    /// one) equals the given absolute values at `ut`
    ///
    /// Orientation, angular motion and acceleration terms are carried over
    /// from `self` as evaluated at `ut`. The new frame's reference time is `ut`.
    fn recentered(&self, ut: f64, position: DVec3, velocity: DVec3) -> Self;
}

/// Which variant a [`ReferenceFrame`] is
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum FrameKind {
    Centered,
    CenteredInertial,
    Oriented,
    OrientedInertial,
    OrientedNonInertial,
}

impl FrameKind {
    /// Whether frames of this kind translate, so a recenter can absorb velocity
    pub fn carries_velocity(self) -> bool {
        !matches!(self, Self::Centered | Self::Oriented)
    }
}

/// Any reference frame
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum ReferenceFrame {
    Centered(CenteredReferenceFrame),
    CenteredInertial(CenteredInertialReferenceFrame),
    Oriented(OrientedReferenceFrame),
    OrientedInertial(OrientedInertialReferenceFrame),
    OrientedNonInertial(OrientedNonInertialReferenceFrame),
}

impl Default for ReferenceFrame {
    /// A static frame at the absolute origin, captured at time zero
    fn default() -> Self {
        Self::centered(0.0, DVec3::ZERO)
    }
}

macro_rules! dispatch {
    ($self:expr, $frame:ident => $body:expr) => {
        match $self {
            ReferenceFrame::Centered($frame) => $body,
            ReferenceFrame::CenteredInertial($frame) => $body,
            ReferenceFrame::Oriented($frame) => $body,
            ReferenceFrame::OrientedInertial($frame) => $body,
            ReferenceFrame::OrientedNonInertial($frame) => $body,
        }
    };
}

impl ReferenceFrame {
    pub fn centered(reference_ut: f64, center: DVec3) -> Self {
        Self::Centered(CenteredReferenceFrame::new(reference_ut, center))
    }

    pub fn centered_inertial(reference_ut: f64, center: DVec3, velocity: DVec3) -> Self {
        Self::CenteredInertial(CenteredInertialReferenceFrame::new(
            reference_ut,
            center,
            velocity,
        ))
    }

    pub fn oriented(reference_ut: f64, center: DVec3, rotation: DQuat) -> Self {
        Self::Oriented(OrientedReferenceFrame::new(reference_ut, center, rotation))
    }

    pub fn oriented_inertial(
        reference_ut: f64,
        center: DVec3,
        velocity: DVec3,
        rotation: DQuat,
        angular_velocity: DVec3,
    ) -> Self {
        Self::OrientedInertial(OrientedInertialReferenceFrame::new(
            reference_ut,
            center,
            velocity,
            rotation,
            angular_velocity,
        ))
    }

    /// A fully general local frame around an object's complete state
    ///
    /// The frame's origin, orientation and all of their derivatives match the
    /// object's at `ut`, so the object is at rest at the frame origin.
    pub fn from_absolute_state(ut: f64, state: &AbsoluteState) -> Self {
        Self::OrientedNonInertial(OrientedNonInertialReferenceFrame::new(
            ut,
            state.position,
            state.velocity,
            state.acceleration,
            state.rotation,
            state.angular_velocity,
            state.angular_acceleration,
        ))
    }

    pub fn kind(&self) -> FrameKind {
        match self {
            Self::Centered(_) => FrameKind::Centered,
            Self::CenteredInertial(_) => FrameKind::CenteredInertial,
            Self::Oriented(_) => FrameKind::Oriented,
            Self::OrientedInertial(_) => FrameKind::OrientedInertial,
            Self::OrientedNonInertial(_) => FrameKind::OrientedNonInertial,
        }
    }

    pub fn reference_ut(&self) -> f64 {
        dispatch!(self, frame => frame.reference_ut())
    }

    pub fn motion_at(&self, ut: f64) -> FrameMotion {
        dispatch!(self, frame => frame.motion_at(ut))
    }

    /// See [`ReferenceFrameModel::recentered`]
    pub fn recentered(&self, ut: f64, position: DVec3, velocity: DVec3) -> Self {
        match self {
            Self::Centered(frame) => Self::Centered(frame.recentered(ut, position, velocity)),
            Self::CenteredInertial(frame) => {
                Self::CenteredInertial(frame.recentered(ut, position, velocity))
            }
            Self::Oriented(frame) => Self::Oriented(frame.recentered(ut, position, velocity)),
            Self::OrientedInertial(frame) => {
                Self::OrientedInertial(frame.recentered(ut, position, velocity))
            }
            Self::OrientedNonInertial(frame) => {
                Self::OrientedNonInertial(frame.recentered(ut, position, velocity))
            }
        }
    }

    /// The same trajectory re-anchored at `ut`
    ///
    /// Exact unless the frame has angular acceleration off its spin axis.
    pub fn rebased(&self, ut: f64) -> Self {
        let motion = self.motion_at(ut);
        self.recentered(ut, motion.origin, motion.velocity)
    }

    pub fn origin_at(&self, ut: f64) -> DVec3 {
        self.motion_at(ut).origin
    }

    pub fn velocity_at(&self, ut: f64) -> DVec3 {
        self.motion_at(ut).velocity
    }

    pub fn rotation_at(&self, ut: f64) -> DQuat {
        self.motion_at(ut).rotation
    }

    pub fn angular_velocity_at(&self, ut: f64) -> DVec3 {
        self.motion_at(ut).angular_velocity
    }

    pub fn transform_position(&self, ut: f64, position: DVec3) -> DVec3 {
        self.motion_at(ut).transform_position(position)
    }

    pub fn inverse_transform_position(&self, ut: f64, local_position: DVec3) -> DVec3 {
        self.motion_at(ut).inverse_transform_position(local_position)
    }

    pub fn transform_rotation(&self, ut: f64, rotation: DQuat) -> DQuat {
        self.motion_at(ut).transform_rotation(rotation)
    }

    pub fn inverse_transform_rotation(&self, ut: f64, local_rotation: DQuat) -> DQuat {
        self.motion_at(ut).inverse_transform_rotation(local_rotation)
    }

    pub fn transform_velocity(&self, ut: f64, velocity: DVec3) -> DVec3 {
        self.motion_at(ut).transform_velocity(velocity)
    }

    pub fn inverse_transform_velocity(&self, ut: f64, local_velocity: DVec3) -> DVec3 {
        self.motion_at(ut).inverse_transform_velocity(local_velocity)
    }

    pub fn transform_angular_velocity(&self, ut: f64, angular_velocity: DVec3) -> DVec3 {
        self.motion_at(ut).transform_angular_velocity(angular_velocity)
    }

    pub fn inverse_transform_angular_velocity(
        &self,
        ut: f64,
        local_angular_velocity: DVec3,
    ) -> DVec3 {
        self.motion_at(ut)
            .inverse_transform_angular_velocity(local_angular_velocity)
    }

    pub fn transform_acceleration(&self, ut: f64, acceleration: DVec3) -> DVec3 {
        self.motion_at(ut).transform_acceleration(acceleration)
    }

    pub fn inverse_transform_acceleration(&self, ut: f64, local_acceleration: DVec3) -> DVec3 {
        self.motion_at(ut)
            .inverse_transform_acceleration(local_acceleration)
    }

    pub fn transform_angular_acceleration(&self, ut: f64, angular_acceleration: DVec3) -> DVec3 {
        self.motion_at(ut)
            .transform_angular_acceleration(angular_acceleration)
    }

    pub fn inverse_transform_angular_acceleration(
        &self,
        ut: f64,
        local_angular_acceleration: DVec3,
    ) -> DVec3 {
        self.motion_at(ut)
            .inverse_transform_angular_acceleration(local_angular_acceleration)
    }

    /// Transform a complete absolute state into this frame at `ut`
    pub fn transform_state(&self, ut: f64, state: &AbsoluteState) -> AbsoluteState {
        let motion = self.motion_at(ut);
        AbsoluteState {
            position: motion.transform_position(state.position),
            rotation: motion.transform_rotation(state.rotation),
            velocity: motion.transform_velocity(state.velocity),
            angular_velocity: motion.transform_angular_velocity(state.angular_velocity),
            acceleration: motion.transform_acceleration(state.acceleration),
            angular_acceleration: motion.transform_angular_acceleration(state.angular_acceleration),
        }
    }

    /// Bring a complete frame-local state back into absolute space at `ut`
    pub fn inverse_transform_state(&self, ut: f64, local: &AbsoluteState) -> AbsoluteState {
        let motion = self.motion_at(ut);
        AbsoluteState {
            position: motion.inverse_transform_position(local.position),
            rotation: motion.inverse_transform_rotation(local.rotation),
            velocity: motion.inverse_transform_velocity(local.velocity),
            angular_velocity: motion.inverse_transform_angular_velocity(local.angular_velocity),
            acceleration: motion.inverse_transform_acceleration(local.acceleration),
            angular_acceleration: motion
                .inverse_transform_angular_acceleration(local.angular_acceleration),
        }
    }
}

impl From<CenteredReferenceFrame> for ReferenceFrame {
    fn from(frame: CenteredReferenceFrame) -> Self {
        Self::Centered(frame)
    }
}

impl From<CenteredInertialReferenceFrame> for ReferenceFrame {
    fn from(frame: CenteredInertialReferenceFrame) -> Self {
        Self::CenteredInertial(frame)
    }
}

impl From<OrientedReferenceFrame> for ReferenceFrame {
    fn from(frame: OrientedReferenceFrame) -> Self {
        Self::Oriented(frame)
    }
}

impl From<OrientedInertialReferenceFrame> for ReferenceFrame {
    fn from(frame: OrientedInertialReferenceFrame) -> Self {
        Self::OrientedInertial(frame)
    }
}

impl From<OrientedNonInertialReferenceFrame> for ReferenceFrame {
    fn from(frame: OrientedNonInertialReferenceFrame) -> Self {
        Self::OrientedNonInertial(frame)
    }
}

/// Rotation accumulated by turning at `angular_velocity` (world axis) for `dt`
/// with constant `angular_acceleration`, applied on top of `rotation`
pub(crate) fn extrapolate_rotation(
    rotation: DQuat,
    angular_velocity: DVec3,
    angular_acceleration: DVec3,
    dt: f64,
) -> DQuat {
    let turned = angular_velocity * dt + angular_acceleration * (0.5 * dt * dt);
    (DQuat::from_scaled_axis(turned) * rotation).normalize()
}

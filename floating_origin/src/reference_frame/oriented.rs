//! Reference frames that carry an orientation

use super::{extrapolate_rotation, FrameMotion, ReferenceFrameModel};
use glam::{DQuat, DVec3};
use serde::{Deserialize, Serialize};

/// A static frame at `center` whose axes are rotated by `rotation`
///
/// `rotation` maps frame-local directions into absolute directions.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct OrientedReferenceFrame {
    reference_ut: f64,
    center: DVec3,
    rotation: DQuat,
}

impl OrientedReferenceFrame {
    pub fn new(reference_ut: f64, center: DVec3, rotation: DQuat) -> Self {
        Self {
            reference_ut,
            center,
            rotation: rotation.normalize(),
        }
    }

    pub fn center(&self) -> DVec3 {
        self.center
    }

    pub fn rotation(&self) -> DQuat {
        self.rotation
    }
}

impl ReferenceFrameModel for OrientedReferenceFrame {
    fn reference_ut(&self) -> f64 {
        self.reference_ut
    }

    fn motion_at(&self, _ut: f64) -> FrameMotion {
        FrameMotion::stationary(self.center, self.rotation)
    }

    fn recentered(&self, ut: f64, position: DVec3, _velocity: DVec3) -> Self {
        Self::new(ut, position, self.rotation)
    }
}

/// A frame translating at constant `velocity` and spinning at constant
/// `angular_velocity` (absolute axis, radians per second)
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct OrientedInertialReferenceFrame {
    reference_ut: f64,
    center: DVec3,
    velocity: DVec3,
    rotation: DQuat,
    angular_velocity: DVec3,
}

impl OrientedInertialReferenceFrame {
    pub fn new(
        reference_ut: f64,
        center: DVec3,
        velocity: DVec3,
        rotation: DQuat,
        angular_velocity: DVec3,
    ) -> Self {
        Self {
            reference_ut,
            center,
            velocity,
            rotation: rotation.normalize(),
            angular_velocity,
        }
    }

    pub fn center(&self) -> DVec3 {
        self.center
    }

    pub fn velocity(&self) -> DVec3 {
        self.velocity
    }

    pub fn rotation(&self) -> DQuat {
        self.rotation
    }

    pub fn angular_velocity(&self) -> DVec3 {
        self.angular_velocity
    }
}

impl ReferenceFrameModel for OrientedInertialReferenceFrame {
    fn reference_ut(&self) -> f64 {
        self.reference_ut
    }

    fn motion_at(&self, ut: f64) -> FrameMotion {
        let dt = ut - self.reference_ut;
        FrameMotion {
            origin: self.center + self.velocity * dt,
            velocity: self.velocity,
            acceleration: DVec3::ZERO,
            rotation: extrapolate_rotation(self.rotation, self.angular_velocity, DVec3::ZERO, dt),
            angular_velocity: self.angular_velocity,
            angular_acceleration: DVec3::ZERO,
        }
    }

    fn recentered(&self, ut: f64, position: DVec3, velocity: DVec3) -> Self {
        let motion = self.motion_at(ut);
        Self::new(ut, position, velocity, motion.rotation, self.angular_velocity)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f64::consts::FRAC_PI_2;

    #[test]
    fn test_oriented_frame_rotates_local_axes() {
        let rotation = DQuat::from_rotation_z(FRAC_PI_2);
        let frame = OrientedReferenceFrame::new(0.0, DVec3::ZERO, rotation);
        let motion = frame.motion_at(0.0);

        // Absolute +Y is the frame's +X after a quarter turn about Z
        let local = motion.transform_position(DVec3::Y);
        assert!((local - DVec3::X).length() < 1e-12);
    }

    #[test]
    fn test_inertial_rotation_advances_with_time() {
        let frame = OrientedInertialReferenceFrame::new(
            2.0,
            DVec3::ZERO,
            DVec3::ZERO,
            DQuat::IDENTITY,
            DVec3::new(0.0, 0.0, FRAC_PI_2),
        );

        let rotation = frame.motion_at(3.0).rotation;
        assert!(rotation.abs_diff_eq(DQuat::from_rotation_z(FRAC_PI_2), 1e-12));
    }

    #[test]
    fn test_recentered_keeps_current_orientation() {
        let frame = OrientedInertialReferenceFrame::new(
            0.0,
            DVec3::ZERO,
            DVec3::ZERO,
            DQuat::IDENTITY,
            DVec3::new(0.0, 0.5, 0.0),
        );

        let recentered = frame.recentered(4.0, DVec3::splat(3.0), DVec3::X);
        assert_eq!(recentered.reference_ut(), 4.0);
        assert_eq!(recentered.rotation(), frame.motion_at(4.0).rotation.normalize());
        assert_eq!(recentered.angular_velocity(), frame.angular_velocity());
        assert_eq!(recentered.velocity(), DVec3::X);
    }
}

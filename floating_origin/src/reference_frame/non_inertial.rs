//! Accelerating, spinning-up reference frame

use super::{extrapolate_rotation, FrameMotion, ReferenceFrameModel};
use glam::{DQuat, DVec3};
use serde::{Deserialize, Serialize};

/// A frame with constant linear and angular acceleration
///
/// This is the most general frame and the one built around an object's full
/// state when a local frame for tangential effects is needed.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct OrientedNonInertialReferenceFrame {
    reference_ut: f64,
    center: DVec3,
    velocity: DVec3,
    acceleration: DVec3,
    rotation: DQuat,
    angular_velocity: DVec3,
    angular_acceleration: DVec3,
}

impl OrientedNonInertialReferenceFrame {
    pub fn new(
        reference_ut: f64,
        center: DVec3,
        velocity: DVec3,
        acceleration: DVec3,
        rotation: DQuat,
        angular_velocity: DVec3,
        angular_acceleration: DVec3,
    ) -> Self {
        Self {
            reference_ut,
            center,
            velocity,
            acceleration,
            rotation: rotation.normalize(),
            angular_velocity,
            angular_acceleration,
        }
    }

    pub fn center(&self) -> DVec3 {
        self.center
    }

    pub fn velocity(&self) -> DVec3 {
        self.velocity
    }

    pub fn acceleration(&self) -> DVec3 {
        self.acceleration
    }

    pub fn rotation(&self) -> DQuat {
        self.rotation
    }

    pub fn angular_velocity(&self) -> DVec3 {
        self.angular_velocity
    }

    pub fn angular_acceleration(&self) -> DVec3 {
        self.angular_acceleration
    }
}

impl ReferenceFrameModel for OrientedNonInertialReferenceFrame {
    fn reference_ut(&self) -> f64 {
        self.reference_ut
    }

    fn motion_at(&self, ut: f64) -> FrameMotion {
        let dt = ut - self.reference_ut;
        FrameMotion {
            origin: self.center + self.velocity * dt + self.acceleration * (0.5 * dt * dt),
            velocity: self.velocity + self.acceleration * dt,
            acceleration: self.acceleration,
            rotation: extrapolate_rotation(
                self.rotation,
                self.angular_velocity,
                self.angular_acceleration,
                dt,
            ),
            angular_velocity: self.angular_velocity + self.angular_acceleration * dt,
            angular_acceleration: self.angular_acceleration,
        }
    }

    /// Acceleration terms are kept; only the origin and velocity are replaced
    fn recentered(&self, ut: f64, position: DVec3, velocity: DVec3) -> Self {
        let motion = self.motion_at(ut);
        Self::new(
            ut,
            position,
            velocity,
            self.acceleration,
            motion.rotation,
            motion.angular_velocity,
            self.angular_acceleration,
        )
    }
}

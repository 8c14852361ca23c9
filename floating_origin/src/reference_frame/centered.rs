//! Translation-only reference frames

use super::{FrameMotion, ReferenceFrameModel};
use glam::{DQuat, DVec3};
use serde::{Deserialize, Serialize};

/// A frame whose origin sits still at `center`, axes aligned with absolute space
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CenteredReferenceFrame {
    reference_ut: f64,
    center: DVec3,
}

impl CenteredReferenceFrame {
    pub fn new(reference_ut: f64, center: DVec3) -> Self {
        Self {
            reference_ut,
            center,
        }
    }

    pub fn center(&self) -> DVec3 {
        self.center
    }
}

impl ReferenceFrameModel for CenteredReferenceFrame {
    fn reference_ut(&self) -> f64 {
        self.reference_ut
    }

    fn motion_at(&self, _ut: f64) -> FrameMotion {
        FrameMotion::stationary(self.center, DQuat::IDENTITY)
    }

    /// A static frame cannot carry velocity, so only the origin moves
    fn recentered(&self, ut: f64, position: DVec3, _velocity: DVec3) -> Self {
        Self::new(ut, position)
    }
}

/// A frame translating at constant `velocity`, axes aligned with absolute space
///
/// `center` is the origin at `reference_ut`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CenteredInertialReferenceFrame {
    reference_ut: f64,
    center: DVec3,
    velocity: DVec3,
}

impl CenteredInertialReferenceFrame {
    pub fn new(reference_ut: f64, center: DVec3, velocity: DVec3) -> Self {
        Self {
            reference_ut,
            center,
            velocity,
        }
    }

    pub fn center(&self) -> DVec3 {
        self.center
    }

    pub fn velocity(&self) -> DVec3 {
        self.velocity
    }
}

impl ReferenceFrameModel for CenteredInertialReferenceFrame {
    fn reference_ut(&self) -> f64 {
        self.reference_ut
    }

    fn motion_at(&self, ut: f64) -> FrameMotion {
        let dt = ut - self.reference_ut;
        FrameMotion {
            velocity: self.velocity,
            ..FrameMotion::stationary(self.center + self.velocity * dt, DQuat::IDENTITY)
        }
    }

    fn recentered(&self, ut: f64, position: DVec3, velocity: DVec3) -> Self {
        Self::new(ut, position, velocity)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_centered_frame_ignores_time() {
        let frame = CenteredReferenceFrame::new(10.0, DVec3::new(1.0, 2.0, 3.0));
        assert_eq!(frame.motion_at(10.0), frame.motion_at(1_000.0));
        assert_eq!(frame.motion_at(0.0).origin, DVec3::new(1.0, 2.0, 3.0));
    }

    #[test]
    fn test_inertial_frame_extrapolates_origin() {
        let frame = CenteredInertialReferenceFrame::new(
            5.0,
            DVec3::new(100.0, 0.0, 0.0),
            DVec3::new(10.0, 0.0, -2.0),
        );

        let motion = frame.motion_at(7.5);
        assert_eq!(motion.origin, DVec3::new(125.0, 0.0, -5.0));
        assert_eq!(motion.velocity, DVec3::new(10.0, 0.0, -2.0));
        assert_eq!(motion.rotation, DQuat::IDENTITY);
    }

    #[test]
    fn test_recentered_inertial_frame_takes_new_velocity() {
        let frame = CenteredInertialReferenceFrame::new(0.0, DVec3::ZERO, DVec3::X);
        let recentered = frame.recentered(3.0, DVec3::new(9.0, 9.0, 9.0), DVec3::Y);

        assert_eq!(recentered.reference_ut(), 3.0);
        assert_eq!(recentered.center(), DVec3::new(9.0, 9.0, 9.0));
        assert_eq!(recentered.velocity(), DVec3::Y);
    }
}

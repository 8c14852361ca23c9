//! Rigid body state held in scene-local, single-precision space

use crate::error::{FrameError, FrameResult};
use glam::{Mat3, Quat, Vec3};
use serde::{Deserialize, Serialize};

/// Scene-local rigid body, the physics collaborator's view of an object
///
/// All vectors are expressed in the current scene reference frame.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Rigidbody {
    /// Position in scene space
    pub position: Vec3,

    /// Rotation in scene space
    pub rotation: Quat,

    /// Linear velocity in scene space
    pub linear_velocity: Vec3,

    /// Angular velocity in scene space (axis times radians per second)
    pub angular_velocity: Vec3,

    /// Mass in kilograms
    pub mass: f32,

    /// Inertia tensor (3x3 matrix)
    pub inertia_tensor: Mat3,

    /// Linear damping coefficient
    pub linear_damping: f32,

    /// Angular damping coefficient
    pub angular_damping: f32,

    /// Acceleration applied every step regardless of forces
    pub constant_acceleration: Vec3,

    /// Linear acceleration applied during the most recent step
    pub acceleration: Vec3,

    /// Angular acceleration applied during the most recent step
    pub angular_acceleration: Vec3,

    /// Kinematic bodies are not affected by forces
    pub is_kinematic: bool,

    #[serde(skip)]
    accumulated_force: Vec3,

    #[serde(skip)]
    accumulated_torque: Vec3,
}

impl Default for Rigidbody {
    fn default() -> Self {
        Self {
            position: Vec3::ZERO,
            rotation: Quat::IDENTITY,
            linear_velocity: Vec3::ZERO,
            angular_velocity: Vec3::ZERO,
            mass: 1.0,
            inertia_tensor: Mat3::IDENTITY,
            linear_damping: 0.0,
            angular_damping: 0.0,
            constant_acceleration: Vec3::ZERO,
            acceleration: Vec3::ZERO,
            angular_acceleration: Vec3::ZERO,
            is_kinematic: false,
            accumulated_force: Vec3::ZERO,
            accumulated_torque: Vec3::ZERO,
        }
    }
}

impl Rigidbody {
    /// Create a dynamic rigidbody with the given mass
    ///
    /// `mass` must be positive and finite for the body to integrate; see
    /// [`Self::check_mass_properties`].
    pub fn dynamic(mass: f32) -> Self {
        Self {
            mass,
            ..Default::default()
        }
    }

    /// Create a kinematic rigidbody (not affected by forces)
    pub fn kinematic() -> Self {
        Self {
            is_kinematic: true,
            ..Default::default()
        }
    }

    /// Reject mass properties that would turn integrated state into NaN
    pub fn check_mass_properties(&self) -> FrameResult<()> {
        if !(self.mass.is_finite() && self.mass > 0.0) {
            return Err(FrameError::InvalidArgument(format!(
                "rigidbody mass must be positive and finite, got {}",
                self.mass
            )));
        }
        let determinant = self.inertia_tensor.determinant();
        if !(determinant.is_finite() && determinant != 0.0) {
            return Err(FrameError::InvalidArgument(format!(
                "rigidbody inertia tensor must be invertible, determinant is {determinant}"
            )));
        }
        Ok(())
    }

    /// Add a force to be applied during the next step
    pub fn apply_force(&mut self, force: Vec3) {
        if !self.is_kinematic {
            self.accumulated_force += force;
        }
    }

    /// Add a torque to be applied during the next step
    pub fn apply_torque(&mut self, torque: Vec3) {
        if !self.is_kinematic {
            self.accumulated_torque += torque;
        }
    }

    /// Take the accumulated force and torque, leaving them cleared
    pub(crate) fn take_loads(&mut self) -> (Vec3, Vec3) {
        let loads = (self.accumulated_force, self.accumulated_torque);
        self.accumulated_force = Vec3::ZERO;
        self.accumulated_torque = Vec3::ZERO;
        loads
    }

    /// Whether forces or torques are waiting for the next step
    pub fn has_pending_loads(&self) -> bool {
        self.accumulated_force != Vec3::ZERO || self.accumulated_torque != Vec3::ZERO
    }

    /// Zero every motion term, leaving pose and mass properties intact
    pub fn rest(&mut self) {
        self.linear_velocity = Vec3::ZERO;
        self.angular_velocity = Vec3::ZERO;
        self.constant_acceleration = Vec3::ZERO;
        self.acceleration = Vec3::ZERO;
        self.angular_acceleration = Vec3::ZERO;
        self.accumulated_force = Vec3::ZERO;
        self.accumulated_torque = Vec3::ZERO;
    }
}

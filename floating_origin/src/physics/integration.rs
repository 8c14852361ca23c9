//! Explicit rigid body integration
//!
//! Stands in for the physics engine. Dynamic bodies are advanced from their
//! accumulated loads; kinematic bodies only follow their own velocities.

use super::components::Rigidbody;
use glam::{Quat, Vec3};
use tracing::trace;

/// Advance a dynamic body by `dt` seconds of simulation time
///
/// Semi-implicit Euler: velocities first from forces, torques and the
/// constant acceleration, then pose from the new velocities.
pub fn integrate_dynamic_body(body: &mut Rigidbody, dt: f32) {
    if body.is_kinematic {
        return;
    }

    let (force, torque) = body.take_loads();

    let acceleration = body.constant_acceleration + force / body.mass;
    let angular_acceleration = body.inertia_tensor.inverse() * torque;

    let linear_damping_factor = (1.0 - body.linear_damping * dt).max(0.0);
    let angular_damping_factor = (1.0 - body.angular_damping * dt).max(0.0);

    body.linear_velocity = (body.linear_velocity + acceleration * dt) * linear_damping_factor;
    body.angular_velocity =
        (body.angular_velocity + angular_acceleration * dt) * angular_damping_factor;
    body.acceleration = acceleration;
    body.angular_acceleration = angular_acceleration;

    integrate_pose(body, dt);

    trace!(
        position = ?body.position,
        velocity = ?body.linear_velocity,
        dt,
        "Integrated dynamic body"
    );
}

/// Advance a body from its own velocities and constant acceleration only
///
/// Forces and torques are never read, so the motion is fully prescribed.
pub fn integrate_kinematic_body(body: &mut Rigidbody, dt: f32) {
    body.linear_velocity += body.constant_acceleration * dt;
    body.acceleration = body.constant_acceleration;
    integrate_pose(body, dt);
}

fn integrate_pose(body: &mut Rigidbody, dt: f32) {
    body.position += body.linear_velocity * dt;
    body.rotation = (rotation_delta(body.angular_velocity, dt) * body.rotation).normalize();
}

/// Rotation produced by turning at `angular_velocity` for `dt`
pub fn rotation_delta(angular_velocity: Vec3, dt: f32) -> Quat {
    Quat::from_scaled_axis(angular_velocity * dt)
}

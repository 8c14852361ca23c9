//! Conversions shared by the rigid body backed transforms
//!
//! For these variants the scene-local body is the authority and absolute
//! state is derived on every read.

use super::{FrameContext, SceneState, TransformEvent, TransformWrite};
use crate::physics::Rigidbody;
use crate::reference_frame::{AbsoluteState, SceneReferenceFrameSwitchData};

pub(crate) fn scene_state(body: &Rigidbody) -> SceneState {
    SceneState {
        position: body.position,
        rotation: body.rotation,
        velocity: body.linear_velocity,
        angular_velocity: body.angular_velocity,
        acceleration: body.acceleration,
    }
}

/// The body's frame-local state widened to f64
pub(crate) fn local_state(body: &Rigidbody) -> AbsoluteState {
    AbsoluteState {
        position: body.position.as_dvec3(),
        rotation: body.rotation.as_dquat(),
        velocity: body.linear_velocity.as_dvec3(),
        angular_velocity: body.angular_velocity.as_dvec3(),
        acceleration: body.acceleration.as_dvec3(),
        angular_acceleration: body.angular_acceleration.as_dvec3(),
    }
}

pub(crate) fn absolute_state(body: &Rigidbody, cx: &FrameContext) -> AbsoluteState {
    cx.frame.inverse_transform_state(cx.ut, &local_state(body))
}

pub(crate) fn write(
    body: &mut Rigidbody,
    cx: &FrameContext,
    write: TransformWrite,
) -> &'static [TransformEvent] {
    let (frame, ut) = (cx.frame, cx.ut);
    match write {
        TransformWrite::Position(value) => body.position = value,
        TransformWrite::AbsolutePosition(value) => {
            body.position = frame.transform_position(ut, value).as_vec3();
        }
        TransformWrite::Rotation(value) => body.rotation = value.normalize(),
        TransformWrite::AbsoluteRotation(value) => {
            body.rotation = frame.transform_rotation(ut, value).as_quat().normalize();
        }
        TransformWrite::Velocity(value) => body.linear_velocity = value,
        TransformWrite::AbsoluteVelocity(value) => {
            body.linear_velocity = frame.transform_velocity(ut, value).as_vec3();
        }
        TransformWrite::AngularVelocity(value) => body.angular_velocity = value,
        TransformWrite::AbsoluteAngularVelocity(value) => {
            body.angular_velocity = frame.transform_angular_velocity(ut, value).as_vec3();
        }
        TransformWrite::Acceleration(value) => set_acceleration(body, value),
        TransformWrite::AbsoluteAcceleration(value) => {
            set_acceleration(body, frame.transform_acceleration(ut, value).as_vec3());
        }
    }
    write.events()
}

fn set_acceleration(body: &mut Rigidbody, value: glam::Vec3) {
    body.constant_acceleration = value;
    body.acceleration = value;
}

/// Re-express the body in the new frame without moving it in absolute space
pub(crate) fn rebase(body: &mut Rigidbody, data: &SceneReferenceFrameSwitchData) {
    let ut = data.ut;
    let absolute = data.old_frame.inverse_transform_state(ut, &local_state(body));
    let local = data.new_frame.transform_state(ut, &absolute);

    let constant = data
        .old_frame
        .inverse_transform_acceleration(ut, body.constant_acceleration.as_dvec3());

    body.position = local.position.as_vec3();
    body.rotation = local.rotation.as_quat().normalize();
    body.linear_velocity = local.velocity.as_vec3();
    body.angular_velocity = local.angular_velocity.as_vec3();
    body.acceleration = local.acceleration.as_vec3();
    body.angular_acceleration = local.angular_acceleration.as_vec3();
    body.constant_acceleration = data
        .new_frame
        .transform_acceleration(ut, constant)
        .as_vec3();
}

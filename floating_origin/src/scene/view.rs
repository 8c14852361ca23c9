//! Entity-scoped access to scene transforms

use super::Scene;
use crate::error::FrameResult;
use crate::reference_frame::{AbsoluteState, ReferenceFrame};
use crate::transform::{
    FrameContext, SceneState, SceneTransform, TransformEvent, TransformKind, TransformListenerId,
    TransformWrite,
};
use glam::{DQuat, DVec3, Quat, Vec3};
use hecs::Entity;

/// Read access to one transform, evaluated in the scene's current frame
///
/// Holds a shared borrow of the component; drop it before writing.
pub struct TransformView<'a> {
    pub(super) entity: Entity,
    pub(super) transform: hecs::Ref<'a, SceneTransform>,
    pub(super) cx: FrameContext<'a>,
}

impl std::fmt::Debug for TransformView<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TransformView")
            .field("entity", &self.entity)
            .field("kind", &self.kind())
            .field("ut", &self.cx.ut)
            .finish()
    }
}

impl TransformView<'_> {
    pub fn entity(&self) -> Entity {
        self.entity
    }

    pub fn kind(&self) -> TransformKind {
        self.transform.kind()
    }

    pub fn is_fixed(&self) -> bool {
        self.transform.as_transform().is_fixed()
    }

    /// Entity this transform is pinned to
    pub fn pin_target(&self) -> Option<Entity> {
        self.transform.pin_target()
    }

    pub fn scene_state(&self) -> SceneState {
        self.transform.as_transform().scene_state(&self.cx)
    }

    pub fn absolute_state(&self) -> AbsoluteState {
        self.transform.as_transform().absolute_state(&self.cx)
    }

    pub fn position(&self) -> Vec3 {
        self.scene_state().position
    }

    pub fn rotation(&self) -> Quat {
        self.scene_state().rotation
    }

    pub fn velocity(&self) -> Vec3 {
        self.scene_state().velocity
    }

    pub fn angular_velocity(&self) -> Vec3 {
        self.scene_state().angular_velocity
    }

    pub fn acceleration(&self) -> Vec3 {
        self.scene_state().acceleration
    }

    pub fn absolute_position(&self) -> DVec3 {
        self.absolute_state().position
    }

    pub fn absolute_rotation(&self) -> DQuat {
        self.absolute_state().rotation
    }

    pub fn absolute_velocity(&self) -> DVec3 {
        self.absolute_state().velocity
    }

    pub fn absolute_angular_velocity(&self) -> DVec3 {
        self.absolute_state().angular_velocity
    }

    pub fn absolute_acceleration(&self) -> DVec3 {
        self.absolute_state().acceleration
    }

    /// Frame centered on this transform's current absolute state
    pub fn local_reference_frame(&self) -> ReferenceFrame {
        self.transform.as_transform().local_reference_frame(&self.cx)
    }
}

/// Write access to one transform
///
/// Every write is evaluated against the scene's current frame and simulation
/// time and fires the transform's change events before returning.
pub struct TransformViewMut<'a> {
    pub(super) scene: &'a mut Scene,
    pub(super) entity: Entity,
}

impl std::fmt::Debug for TransformViewMut<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TransformViewMut")
            .field("entity", &self.entity)
            .finish()
    }
}

impl TransformViewMut<'_> {
    pub fn entity(&self) -> Entity {
        self.entity
    }

    /// Read the transform while keeping write access
    pub fn read(&self) -> FrameResult<TransformView<'_>> {
        self.scene.transform(self.entity)
    }

    pub fn set(&mut self, write: TransformWrite) -> FrameResult<()> {
        self.scene.write_transform(self.entity, write)
    }

    pub fn set_position(&mut self, value: Vec3) -> FrameResult<()> {
        self.set(TransformWrite::Position(value))
    }

    pub fn set_rotation(&mut self, value: Quat) -> FrameResult<()> {
        self.set(TransformWrite::Rotation(value))
    }

    pub fn set_velocity(&mut self, value: Vec3) -> FrameResult<()> {
        self.set(TransformWrite::Velocity(value))
    }

    pub fn set_angular_velocity(&mut self, value: Vec3) -> FrameResult<()> {
        self.set(TransformWrite::AngularVelocity(value))
    }

    pub fn set_acceleration(&mut self, value: Vec3) -> FrameResult<()> {
        self.set(TransformWrite::Acceleration(value))
    }

    pub fn set_absolute_position(&mut self, value: DVec3) -> FrameResult<()> {
        self.set(TransformWrite::AbsolutePosition(value))
    }

    pub fn set_absolute_rotation(&mut self, value: DQuat) -> FrameResult<()> {
        self.set(TransformWrite::AbsoluteRotation(value))
    }

    pub fn set_absolute_velocity(&mut self, value: DVec3) -> FrameResult<()> {
        self.set(TransformWrite::AbsoluteVelocity(value))
    }

    pub fn set_absolute_angular_velocity(&mut self, value: DVec3) -> FrameResult<()> {
        self.set(TransformWrite::AbsoluteAngularVelocity(value))
    }

    pub fn set_absolute_acceleration(&mut self, value: DVec3) -> FrameResult<()> {
        self.set(TransformWrite::AbsoluteAcceleration(value))
    }

    /// Scene-local force for the next fixed step; free transforms only
    pub fn apply_force(&mut self, force: Vec3) -> FrameResult<()> {
        self.scene.apply_load(self.entity, force, Vec3::ZERO)
    }

    /// Scene-local torque for the next fixed step; free transforms only
    pub fn apply_torque(&mut self, torque: Vec3) -> FrameResult<()> {
        self.scene.apply_load(self.entity, Vec3::ZERO, torque)
    }

    /// Re-pin a pinned transform to `target` at the given offset
    pub fn set_reference(
        &mut self,
        target: Option<Entity>,
        local_position: DVec3,
        local_rotation: DQuat,
    ) -> FrameResult<()> {
        self.scene
            .set_pin_reference(self.entity, target, local_position, local_rotation)
    }

    pub fn subscribe(
        &mut self,
        event: TransformEvent,
        listener: impl FnMut(TransformEvent) + Send + Sync + 'static,
    ) -> FrameResult<TransformListenerId> {
        let mut transform = self.scene.component_mut(self.entity)?;
        let id = transform
            .as_transform_mut()
            .events_mut()
            .subscribe(event, listener);
        Ok(id)
    }

    pub fn unsubscribe(&mut self, id: TransformListenerId) -> FrameResult<bool> {
        let mut transform = self.scene.component_mut(self.entity)?;
        let removed = transform.as_transform_mut().events_mut().unsubscribe(id);
        Ok(removed)
    }
}

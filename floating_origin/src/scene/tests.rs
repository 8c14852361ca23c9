//! Tests for scene registration, views and pin bookkeeping

use super::*;
use crate::transform::{
    DummyTransform, FixedTransform, FreeTransform, KinematicTransform, PinnedTransform,
    TransformEvent,
};
use glam::Quat;
use std::cell::RefCell;
use std::rc::Rc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

fn scene() -> Scene {
    Scene::new(SimulationConfig::default()).unwrap()
}

fn dummy_at(scene: &mut Scene, position: DVec3) -> Entity {
    let entity = scene.spawn_transform(DummyTransform::new()).unwrap();
    scene
        .transform_mut(entity)
        .unwrap()
        .set_absolute_position(position)
        .unwrap();
    entity
}

#[test]
fn test_invalid_config_rejected() {
    let config = SimulationConfig {
        fixed_delta_time: 0.0,
        ..Default::default()
    };
    assert!(matches!(
        Scene::new(config),
        Err(FrameError::InvalidArgument(_))
    ));
}

#[test]
fn test_spawn_and_despawn() {
    let mut scene = scene();
    let entity = scene.spawn_transform(FixedTransform::new()).unwrap();
    assert_eq!(scene.transform_count(), 1);
    assert_eq!(scene.transform(entity).unwrap().kind(), TransformKind::Fixed);
    assert!(scene.transform(entity).unwrap().is_fixed());

    scene.despawn_transform(entity).unwrap();
    assert_eq!(scene.transform_count(), 0);
    assert!(matches!(
        scene.transform(entity),
        Err(FrameError::TransformNotFound(missing)) if missing == entity
    ));
    assert!(matches!(
        scene.despawn_transform(entity),
        Err(FrameError::TransformNotFound(_))
    ));
}

#[test]
fn test_entity_without_transform_not_found() {
    let mut scene = scene();
    let bare = scene.world_mut().spawn((42u32,));
    assert!(matches!(
        scene.transform_mut(bare),
        Err(FrameError::TransformNotFound(_))
    ));
    assert!(matches!(
        scene.set_target(Some(bare)),
        Err(FrameError::TransformNotFound(_))
    ));
}

#[test]
fn test_kinematic_requires_registration() {
    let mut scene = scene();
    assert!(matches!(
        scene.spawn_transform(KinematicTransform::new()),
        Err(FrameError::InvalidState(_))
    ));

    scene.register_kinematic_integration();
    scene.register_kinematic_integration();
    assert!(scene.is_kinematic_integration_registered());
    assert!(scene.spawn_transform(KinematicTransform::new()).is_ok());
}

#[test]
fn test_kinematic_transform_integrates_each_step() {
    let mut scene = scene();
    scene.register_kinematic_integration();
    let entity = scene.spawn_transform(KinematicTransform::new()).unwrap();
    scene
        .transform_mut(entity)
        .unwrap()
        .set_velocity(Vec3::new(0.0, 2.0, 0.0))
        .unwrap();

    assert_eq!(scene.tick(0.1).unwrap(), 5);
    let position = scene.transform(entity).unwrap().position();
    assert!((position - Vec3::new(0.0, 0.2, 0.0)).length() < 1e-5);
}

#[test]
fn test_forces_only_on_free_transforms() {
    let mut scene = scene();
    let free = scene.spawn_transform(FreeTransform::with_mass(1.0)).unwrap();
    let dummy = scene.spawn_transform(DummyTransform::new()).unwrap();

    scene
        .transform_mut(free)
        .unwrap()
        .apply_force(Vec3::new(50.0, 0.0, 0.0))
        .unwrap();
    assert!(matches!(
        scene.transform_mut(dummy).unwrap().apply_torque(Vec3::X),
        Err(FrameError::InvalidState(_))
    ));

    scene.tick(0.02).unwrap();
    let velocity = scene.transform(free).unwrap().velocity();
    assert!((velocity.x - 1.0).abs() < 1e-6);
}

#[test]
fn test_pin_cycle_rejected() {
    let mut scene = scene();
    let first = scene.spawn_transform(PinnedTransform::default()).unwrap();
    let second = scene
        .spawn_transform(PinnedTransform::new(Some(first), DVec3::X, DQuat::IDENTITY))
        .unwrap();

    let result = scene
        .transform_mut(first)
        .unwrap()
        .set_reference(Some(second), DVec3::ZERO, DQuat::IDENTITY);
    assert!(matches!(result, Err(FrameError::InvalidState(_))));

    let result = scene
        .transform_mut(first)
        .unwrap()
        .set_reference(Some(first), DVec3::ZERO, DQuat::IDENTITY);
    assert!(matches!(result, Err(FrameError::InvalidState(_))));
}

#[test]
fn test_pin_to_missing_target_rejected() {
    let mut scene = scene();
    let target = scene.spawn_transform(DummyTransform::new()).unwrap();
    scene.despawn_transform(target).unwrap();

    let result = scene.spawn_transform(PinnedTransform::new(
        Some(target),
        DVec3::ZERO,
        DQuat::IDENTITY,
    ));
    assert!(matches!(result, Err(FrameError::InvalidState(_))));
}

#[test]
fn test_set_reference_only_on_pinned() {
    let mut scene = scene();
    let free = scene.spawn_transform(FreeTransform::with_mass(1.0)).unwrap();
    let dummy = scene.spawn_transform(DummyTransform::new()).unwrap();

    let result = scene
        .transform_mut(free)
        .unwrap()
        .set_reference(Some(dummy), DVec3::ZERO, DQuat::IDENTITY);
    assert!(matches!(result, Err(FrameError::InvalidState(_))));
}

#[test]
fn test_pinned_chain_resolves() {
    let mut scene = scene();
    let base = dummy_at(&mut scene, DVec3::new(100.0, 0.0, 0.0));
    let middle = scene
        .spawn_transform(PinnedTransform::new(
            Some(base),
            DVec3::new(0.0, 10.0, 0.0),
            DQuat::IDENTITY,
        ))
        .unwrap();
    let tip = scene
        .spawn_transform(PinnedTransform::new(
            Some(middle),
            DVec3::new(0.0, 0.0, 1.0),
            DQuat::IDENTITY,
        ))
        .unwrap();

    assert_eq!(
        scene.transform(tip).unwrap().absolute_position(),
        DVec3::new(100.0, 10.0, 1.0)
    );
}

#[test]
fn test_despawn_unpins_followers_in_place() {
    let mut scene = scene();
    let target = dummy_at(&mut scene, DVec3::new(0.0, 0.0, 500.0));
    let pinned = scene
        .spawn_transform(PinnedTransform::new(
            Some(target),
            DVec3::new(1.0, 0.0, 0.0),
            DQuat::IDENTITY,
        ))
        .unwrap();
    scene.set_target(Some(target)).unwrap();

    scene.despawn_transform(target).unwrap();

    let view = scene.transform(pinned).unwrap();
    assert_eq!(view.pin_target(), None);
    assert_eq!(view.absolute_position(), DVec3::new(1.0, 0.0, 500.0));
    assert_eq!(scene.manager().target(), None);
}

#[test]
fn test_view_getters_idempotent() {
    let mut scene = scene();
    let entity = scene.spawn_transform(FreeTransform::with_mass(3.0)).unwrap();
    {
        let mut transform = scene.transform_mut(entity).unwrap();
        transform
            .set_absolute_position(DVec3::new(12.5, -4.0, 9.0))
            .unwrap();
        transform.set_rotation(Quat::from_rotation_y(0.3)).unwrap();
        transform.set_velocity(Vec3::new(1.0, 2.0, 3.0)).unwrap();
    }

    let view = scene.transform(entity).unwrap();
    assert_eq!(view.position(), view.position());
    assert_eq!(view.rotation(), view.rotation());
    assert_eq!(view.absolute_position(), view.absolute_position());
    assert_eq!(view.absolute_velocity(), view.absolute_velocity());
    assert_eq!(view.absolute_state(), view.absolute_state());
}

#[test]
fn test_subscribe_through_write_view() {
    let mut scene = scene();
    let entity = scene.spawn_transform(DummyTransform::new()).unwrap();
    let fired = Arc::new(AtomicUsize::new(0));

    let counter = fired.clone();
    let id = scene
        .transform_mut(entity)
        .unwrap()
        .subscribe(TransformEvent::AbsolutePositionChanged, move |_| {
            counter.fetch_add(1, Ordering::SeqCst);
        })
        .unwrap();

    let mut transform = scene.transform_mut(entity).unwrap();
    transform.set_position(Vec3::ONE).unwrap();
    transform.set_velocity(Vec3::ONE).unwrap();
    assert_eq!(fired.load(Ordering::SeqCst), 1);

    assert!(transform.unsubscribe(id).unwrap());
    transform.set_position(Vec3::ZERO).unwrap();
    assert_eq!(fired.load(Ordering::SeqCst), 1);
}

#[test]
fn test_systems_added_while_running_are_kept() {
    let mut scene = scene();
    let runs = Rc::new(RefCell::new(Vec::new()));

    let log = runs.clone();
    scene.add_fixed_step_system("spawner", move |scene| {
        log.borrow_mut().push("spawner");
        if scene.clock().fixed_steps() == 1 {
            let inner = log.clone();
            scene.add_fixed_step_system("late", move |_| inner.borrow_mut().push("late"));
        }
    });

    scene.tick(0.04).unwrap();
    assert_eq!(*runs.borrow(), vec!["spawner", "spawner", "late"]);
    assert_eq!(scene.fixed_schedule().system_names(), vec!["spawner", "late"]);
}

#[test]
fn test_time_scale_validated() {
    let mut scene = scene();
    assert!(scene.set_time_scale(-1.0).is_err());
    assert!(scene.set_time_scale(f64::NAN).is_err());
    scene.set_time_scale(4.0).unwrap();

    scene.tick(0.02).unwrap();
    assert!((scene.ut() - 0.08).abs() < 1e-12);
    assert_eq!(scene.old_ut(), 0.0);
}

#[test]
fn test_free_transform_needs_valid_mass() {
    let mut scene = scene();
    assert!(matches!(
        scene.spawn_transform(FreeTransform::with_mass(0.0)),
        Err(FrameError::InvalidArgument(_))
    ));
    assert!(scene.spawn_transform(FreeTransform::with_mass(f32::INFINITY)).is_err());
    assert_eq!(scene.transform_count(), 0);
}

#[test]
fn test_kinematic_integration_follows_fixed_systems() {
    let mut scene = scene();
    scene.register_kinematic_integration();
    assert!(scene.fixed_schedule().is_empty());

    let entity = scene.spawn_transform(KinematicTransform::new()).unwrap();
    scene
        .transform_mut(entity)
        .unwrap()
        .set_velocity(Vec3::new(0.0, 5.0, 0.0))
        .unwrap();

    let seen = Rc::new(RefCell::new(Vec::new()));
    let log = seen.clone();
    scene.add_fixed_step_system("observe_drone", move |scene| {
        let y = scene.transform(entity).unwrap().position().y;
        log.borrow_mut().push(y);
    });

    assert_eq!(scene.tick(0.06).unwrap(), 3);
    let seen = seen.borrow();
    assert_eq!(seen.len(), 3);
    for (step, y) in seen.iter().enumerate() {
        assert!((y - 0.1 * step as f32).abs() < 1e-5);
    }
    assert!((scene.transform(entity).unwrap().position().y - 0.3).abs() < 1e-5);
}

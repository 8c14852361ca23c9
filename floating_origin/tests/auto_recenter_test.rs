//! Integration tests for automatic recentering on a target transform

use floating_origin::prelude::*;

fn config(max_relative_position: f64, max_relative_velocity: f64) -> SimulationConfig {
    SimulationConfig {
        max_relative_position,
        max_relative_velocity,
        ..Default::default()
    }
}

#[test]
fn test_position_threshold_is_strict() {
    let mut scene = Scene::new(config(100.0, 1_000.0)).unwrap();
    let target = scene.spawn_transform(DummyTransform::new()).unwrap();
    scene
        .transform_mut(target)
        .unwrap()
        .set_absolute_position(DVec3::new(100.0, 0.0, 0.0))
        .unwrap();
    scene.set_target(Some(target)).unwrap();

    scene.tick(0.02).unwrap();
    assert_eq!(scene.reference_frame().origin_at(scene.ut()), DVec3::ZERO);
    assert!(scene.manager().switch_history().is_empty());

    scene
        .transform_mut(target)
        .unwrap()
        .set_absolute_position(DVec3::new(150.0, 0.0, 0.0))
        .unwrap();
    scene.tick(0.02).unwrap();

    assert_eq!(
        scene.reference_frame().origin_at(scene.ut()),
        DVec3::new(150.0, 0.0, 0.0)
    );
    let view = scene.transform(target).unwrap();
    assert_eq!(view.absolute_position(), DVec3::new(150.0, 0.0, 0.0));
    assert_eq!(view.position(), Vec3::ZERO);

    let stats = scene.manager().stats();
    assert_eq!(stats.automatic_switches, 1);
    assert!(stats.has_target);
}

#[test]
fn test_recenter_keeps_frame_kind() {
    let frame = ReferenceFrame::oriented(0.0, DVec3::ZERO, DQuat::from_rotation_x(0.5));
    let mut scene = Scene::with_frame(config(100.0, 1_000.0), frame).unwrap();
    let target = scene.spawn_transform(DummyTransform::new()).unwrap();
    scene
        .transform_mut(target)
        .unwrap()
        .set_absolute_position(DVec3::new(0.0, 400.0, 0.0))
        .unwrap();
    scene.set_target(Some(target)).unwrap();

    scene.tick(0.02).unwrap();

    let current = scene.reference_frame();
    assert_eq!(current.kind(), FrameKind::Oriented);
    assert!(current
        .rotation_at(scene.ut())
        .abs_diff_eq(DQuat::from_rotation_x(0.5), 1e-12));
    assert_eq!(current.reference_ut(), scene.ut());
}

#[test]
fn test_velocity_threshold_recenters_inertial_frame() {
    let frame = ReferenceFrame::centered_inertial(0.0, DVec3::ZERO, DVec3::ZERO);
    let mut scene = Scene::with_frame(config(10_000.0, 100.0), frame).unwrap();
    let craft = scene.spawn_transform(FreeTransform::with_mass(1.0)).unwrap();
    scene.set_target(Some(craft)).unwrap();

    scene
        .transform_mut(craft)
        .unwrap()
        .set_absolute_velocity(DVec3::new(100.0, 0.0, 0.0))
        .unwrap();
    scene.tick(0.02).unwrap();
    assert!(scene.manager().switch_history().is_empty());

    scene
        .transform_mut(craft)
        .unwrap()
        .set_absolute_velocity(DVec3::new(150.0, 0.0, 0.0))
        .unwrap();
    let before = scene.transform(craft).unwrap().absolute_position();
    scene.tick(0.02).unwrap();

    let view = scene.transform(craft).unwrap();
    let frame_velocity = scene.reference_frame().velocity_at(scene.ut());
    assert!((frame_velocity - DVec3::new(150.0, 0.0, 0.0)).length() < 1e-3);
    assert!(view.velocity().length() < 1e-3);
    assert!((view.absolute_velocity() - DVec3::new(150.0, 0.0, 0.0)).length() < 1e-3);
    assert!((view.absolute_position() - (before + DVec3::new(3.0, 0.0, 0.0))).length() < 1e-3);
    assert!(view.position().length() < 1e-3);
}

#[test]
fn test_recentered_frame_follows_target_without_further_switches() {
    let frame = ReferenceFrame::centered_inertial(0.0, DVec3::ZERO, DVec3::ZERO);
    let mut scene = Scene::with_frame(config(50.0, 20.0), frame).unwrap();
    let craft = scene.spawn_transform(FreeTransform::with_mass(1.0)).unwrap();
    scene
        .transform_mut(craft)
        .unwrap()
        .set_absolute_velocity(DVec3::new(0.0, 0.0, 40.0))
        .unwrap();
    scene.set_target(Some(craft)).unwrap();

    for _ in 0..100 {
        scene.tick(0.02).unwrap();
    }

    // Once the frame co-moves with the craft nothing drifts any more
    assert_eq!(scene.manager().switch_history().len(), 1);
    let view = scene.transform(craft).unwrap();
    assert!((view.absolute_position().z - 40.0 * scene.ut()).abs() < 1e-2);
}

#[test]
fn test_clearing_target_stops_recentering() {
    let mut scene = Scene::new(config(10.0, 1_000.0)).unwrap();
    let target = scene.spawn_transform(DummyTransform::new()).unwrap();
    scene
        .transform_mut(target)
        .unwrap()
        .set_absolute_position(DVec3::splat(500.0))
        .unwrap();
    scene.set_target(Some(target)).unwrap();
    scene.set_target(None).unwrap();

    scene.tick(0.1).unwrap();
    assert!(!scene.is_switch_requested());
    assert!(scene.manager().switch_history().is_empty());
}

#[test]
fn test_despawned_target_stops_recentering() {
    let mut scene = Scene::new(config(10.0, 1_000.0)).unwrap();
    let target = scene.spawn_transform(DummyTransform::new()).unwrap();
    scene.set_target(Some(target)).unwrap();
    scene.despawn_transform(target).unwrap();

    assert_eq!(scene.manager().target(), None);
    scene.tick(0.02).unwrap();
    assert!(scene.manager().switch_history().is_empty());
}

#[test]
fn test_static_frame_does_not_chase_fast_target() {
    let mut scene = Scene::new(config(5_000.0, 5.0)).unwrap();
    let craft = scene.spawn_transform(FreeTransform::with_mass(1.0)).unwrap();
    scene
        .transform_mut(craft)
        .unwrap()
        .set_absolute_velocity(DVec3::new(10.0, 0.0, 0.0))
        .unwrap();
    scene.set_target(Some(craft)).unwrap();

    for _ in 0..50 {
        scene.tick(0.02).unwrap();
    }

    assert!(scene.manager().switch_history().is_empty());
    assert!(!scene.is_switch_requested());
    let view = scene.transform(craft).unwrap();
    assert!((view.absolute_position().x - 10.0).abs() < 1e-3);
}

#[test]
fn test_static_frame_still_recenters_on_distance() {
    let mut scene = Scene::new(config(2.0, 5.0)).unwrap();
    let craft = scene.spawn_transform(FreeTransform::with_mass(1.0)).unwrap();
    scene
        .transform_mut(craft)
        .unwrap()
        .set_absolute_velocity(DVec3::new(10.0, 0.0, 0.0))
        .unwrap();
    scene.set_target(Some(craft)).unwrap();

    for _ in 0..50 {
        scene.tick(0.02).unwrap();
    }

    // Ten units travelled, recentered every time it drifts past two
    let switches = scene.manager().stats().automatic_switches;
    assert!((4..=5).contains(&switches), "{switches} switches");
    assert_eq!(scene.reference_frame().kind(), FrameKind::Centered);
    assert!(scene.transform(craft).unwrap().position().length() < 2.5);
}

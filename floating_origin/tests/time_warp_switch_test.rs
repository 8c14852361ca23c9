//! Regression tests for frame switches while time is warped

use floating_origin::prelude::*;
use std::cell::RefCell;
use std::rc::Rc;

fn warped_scene(frame: ReferenceFrame, time_scale: f64) -> Scene {
    let config = SimulationConfig {
        time_scale,
        max_relative_position: 100.0,
        max_relative_velocity: 1_000.0,
        ..Default::default()
    };
    Scene::with_frame(config, frame).unwrap()
}

/// Record the craft's absolute position at every presentation step
fn track(scene: &mut Scene, craft: Entity) -> Rc<RefCell<Vec<(f64, DVec3)>>> {
    let trajectory = Rc::new(RefCell::new(Vec::new()));
    let log = trajectory.clone();
    scene.add_presentation_system("track_craft", move |scene| {
        let position = scene.transform(craft).unwrap().absolute_position();
        log.borrow_mut().push((scene.ut(), position));
    });
    trajectory
}

#[test]
fn test_recentering_under_warp_keeps_trajectory_continuous() {
    let mut scene = warped_scene(ReferenceFrame::default(), 50.0);
    let start = DVec3::new(10.0, -20.0, 30.0);
    let velocity = DVec3::new(20.0, 0.0, 5.0);

    let craft = scene.spawn_transform(FreeTransform::with_mass(1.0)).unwrap();
    {
        let mut transform = scene.transform_mut(craft).unwrap();
        transform.set_absolute_position(start).unwrap();
        transform.set_absolute_velocity(velocity).unwrap();
    }
    scene.set_target(Some(craft)).unwrap();
    let trajectory = track(&mut scene, craft);

    for _ in 0..200 {
        scene.tick(0.02).unwrap();
    }

    let history = scene.manager().switch_history();
    assert!(history.len() > 20, "only {} switches", history.len());
    assert!(history.iter().all(|record| record.automatic));

    for &(ut, position) in trajectory.borrow().iter() {
        let expected = start + velocity * ut;
        assert!(
            (position - expected).length() < 1e-2,
            "at UT {ut}: expected {expected:?}, got {position:?}"
        );
    }

    let view = scene.transform(craft).unwrap();
    assert!(view.position().length() <= 100.0 + 21.0);
    assert!((view.absolute_velocity() - velocity).length() < 1e-4);
}

#[test]
fn test_manual_switch_between_warped_steps() {
    let mut scene = warped_scene(ReferenceFrame::default(), 100.0);
    let velocity = DVec3::new(0.0, 30.0, 0.0);

    let craft = scene.spawn_transform(FreeTransform::with_mass(1.0)).unwrap();
    scene
        .transform_mut(craft)
        .unwrap()
        .set_absolute_velocity(velocity)
        .unwrap();
    let trajectory = track(&mut scene, craft);

    for tick in 0..10 {
        if tick % 3 == 1 {
            // Centering on the craft at the current presentation time
            let state = scene.transform(craft).unwrap().absolute_state();
            let frame = ReferenceFrame::centered_inertial(scene.ut(), state.position, DVec3::ZERO);
            scene.request_scene_reference_frame_switch(frame).unwrap();
        }
        scene.tick(0.02).unwrap();
    }

    assert_eq!(scene.manager().switch_history().len(), 3);
    for &(ut, position) in trajectory.borrow().iter() {
        assert!((position - velocity * ut).length() < 1e-2);
    }
}

#[test]
fn test_switch_into_moving_frame_under_warp() {
    let mut scene = warped_scene(ReferenceFrame::default(), 20.0);
    let velocity = DVec3::new(-15.0, 0.0, 0.0);

    let craft = scene.spawn_transform(FreeTransform::with_mass(1.0)).unwrap();
    scene
        .transform_mut(craft)
        .unwrap()
        .set_absolute_velocity(velocity)
        .unwrap();
    let trajectory = track(&mut scene, craft);

    scene.tick(0.02).unwrap();
    let frame = ReferenceFrame::oriented_inertial(
        scene.ut(),
        DVec3::new(-6.0, 0.0, 0.0),
        DVec3::new(-10.0, 0.0, 0.0),
        DQuat::IDENTITY,
        DVec3::ZERO,
    );
    scene.request_scene_reference_frame_switch(frame).unwrap();
    for _ in 0..20 {
        scene.tick(0.02).unwrap();
    }

    for &(ut, position) in trajectory.borrow().iter() {
        assert!((position - velocity * ut).length() < 1e-2);
    }
    let view = scene.transform(craft).unwrap();
    assert!((view.velocity() - Vec3::new(-5.0, 0.0, 0.0)).length() < 1e-4);
}

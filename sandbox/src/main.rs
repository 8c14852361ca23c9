//! Scripted floating-origin demo
//!
//! A craft launched from a planetary-radius position accelerates away while
//! the scene frame keeps recentering on it. A marker pinned ahead of the
//! craft and a kinematic drone flying alongside show the other transform
//! kinds surviving the switches.

use anyhow::Context;
use floating_origin::prelude::*;
use std::cell::Cell;
use std::rc::Rc;
use tracing::{info, warn};

const TICKS: u32 = 3_000;
const CRAFT_MASS: f32 = 1_000.0;
/// Newtons along scene +X, applied every fixed step
const THRUST: f32 = 25_000.0;
const LAUNCH_SITE: DVec3 = DVec3::new(0.0, 0.0, 6_371_000.0);

fn main() -> anyhow::Result<()> {
    floating_origin::init_logging();

    let config = match std::env::args().nth(1) {
        Some(path) => SimulationConfig::from_file(&path)
            .with_context(|| format!("failed to load config from {path}"))?,
        None => SimulationConfig::default(),
    };
    info!(config = ?config, "Starting floating origin sandbox");

    let frame = ReferenceFrame::centered_inertial(config.start_ut, LAUNCH_SITE, DVec3::ZERO);
    let mut scene = Scene::with_frame(config, frame)?;
    scene.register_kinematic_integration();

    let craft = scene.spawn_transform(FreeTransform::with_mass(CRAFT_MASS))?;
    scene
        .transform_mut(craft)?
        .set_absolute_position(LAUNCH_SITE)?;
    scene.set_target(Some(craft))?;

    let marker = scene.spawn_transform(PinnedTransform::new(
        Some(craft),
        DVec3::new(0.0, 0.0, 50.0),
        DQuat::IDENTITY,
    ))?;

    let drone = scene.spawn_transform(KinematicTransform::new())?;
    {
        let mut transform = scene.transform_mut(drone)?;
        transform.set_absolute_position(LAUNCH_SITE + DVec3::new(0.0, 200.0, 0.0))?;
        transform.set_absolute_velocity(DVec3::new(40.0, 0.0, 0.0))?;
    }

    let switches = Rc::new(Cell::new(0u32));
    let counter = switches.clone();
    scene
        .manager_mut()
        .subscribe_switch(move |_| counter.set(counter.get() + 1));

    scene.add_fixed_step_system("thrust", move |scene| {
        let result = scene
            .transform_mut(craft)
            .and_then(|mut transform| transform.apply_force(Vec3::new(THRUST, 0.0, 0.0)));
        if let Err(error) = result {
            warn!(error = %error, "Thrust system could not reach the craft");
        }
    });

    let ticks = Rc::new(Cell::new(0u32));
    let presented = ticks.clone();
    scene.add_presentation_system("telemetry", move |scene| {
        presented.set(presented.get() + 1);
        if presented.get() % 500 != 0 {
            return;
        }
        if let Ok(view) = scene.transform(craft) {
            info!(
                ut = scene.ut(),
                absolute_position = ?view.absolute_position(),
                absolute_speed = view.absolute_velocity().length(),
                local_position = ?view.position(),
                local_speed = view.velocity().length(),
                "Craft telemetry"
            );
        }
    });

    let delta = scene.config().fixed_delta_time;
    for _ in 0..TICKS {
        scene.tick(delta)?;
    }

    let craft_view = scene.transform(craft)?;
    let marker_view = scene.transform(marker)?;
    let drone_view = scene.transform(drone)?;
    let stats = scene.manager().stats();

    info!(
        ut = scene.ut(),
        frame = ?stats.current_frame.kind(),
        switches = switches.get(),
        automatic = stats.automatic_switches,
        "Simulation finished"
    );
    info!(
        absolute_position = ?craft_view.absolute_position(),
        absolute_velocity = ?craft_view.absolute_velocity(),
        local_position = ?craft_view.position(),
        "Craft final state"
    );
    info!(
        offset = ?(marker_view.absolute_position() - craft_view.absolute_position()),
        "Marker offset from craft"
    );
    info!(
        absolute_position = ?drone_view.absolute_position(),
        local_position = ?drone_view.position(),
        "Drone final state"
    );

    Ok(())
}

/*
This Source Code Form is subject to the terms of the Mozilla Public License, v. 2.0.
If a copy of the MPL was not distributed with this file,
You can obtain one at https://mozilla.org/MPL/2.0/.
*/
//! A headless demo: a few agents chase a wandering target, using a pathfinder that
//! runs as a time-sliced System and answers a couple of requests per frame.
//!
//! Run with `cargo run --example chase --features testing`.

use core::time::Duration;

use bevy::prelude::*;
use waymark::prelude::*;

/// How many requests the 'pathfinder' handles per frame.
const PATHFINDER_BUDGET: usize = 2;

#[derive(Component)]
struct Wanderer {
    waypoints: Vec<Vec3>,
    next: usize,
    speed: f32,
}

fn setup(mut commands: Commands, pathfinder: Res<QueuedPathfinder>) {
    let target = commands.spawn((
        Transform::from_xyz(20., 0., 0.),
        Wanderer {
            waypoints: vec![Vec3::new(20., 0., 20.), Vec3::new(-10., 0., 25.), Vec3::new(-15., 0., -5.)],
            next: 0,
            speed: 2.,
        },
    )).id();

    for (idx, start) in [Vec3::ZERO, Vec3::new(-10., 0., 0.), Vec3::new(0., 0., -10.)].into_iter().enumerate() {
        let config = MovementConfig::builder()
            .set_turn_distance(1.5)
            .set_stopping_distance(3.)
            .set_path_update_move_threshold(1. + idx as f32)
            .build()
            .unwrap();

        commands.spawn((
            Transform::from_translation(start),
            MovementGoal::chase(target),
            pathfinder.gateway(),
            Locomotion { speed: 4. },
            config,
        ));
    }
}

/// Stands in for a real pathfinder: routes around an imaginary pillar at the origin.
fn detour_pathfinder(pathfinder: Res<QueuedPathfinder>) {
    for (request, completion) in pathfinder.drain(PATHFINDER_BUDGET) {
        let midpoint = (request.start + request.destination) * 0.5;
        let detour = match midpoint.length() < 3. {
            true => vec![midpoint + Vec3::new(4., 0., 4.), request.destination],
            false => StraightLineGateway::with_spacing(4.).waypoints(request.start, request.destination),
        };

        completion.succeed(&detour);
    }
}

fn wander(mut wanderers: Query<(Entity, &mut Transform, &mut Wanderer)>, time: Res<Time>, mut commands: Commands) {
    for (entity, mut transform, mut wanderer) in wanderers.iter_mut() {
        let Some(goal) = wanderer.waypoints.get(wanderer.next).copied() else {
            bevy::log::info!("Target finished wandering, letting the agents catch up");
            commands.entity(entity).remove::<Wanderer>();
            continue;
        };

        let to_goal = goal - transform.translation;
        let step = wanderer.speed * time.delta_secs();

        if to_goal.length() <= step {
            transform.translation = goal;
            wanderer.next += 1;
        } else {
            transform.translation += to_goal.normalize() * step;
        }
    }
}

fn log_path_ready(trigger: On<PathReady>) {
    let event = trigger.event();
    bevy::log::info!(
        "Agent {:?} got path #{:?} with {:?} look points",
        event.entity, event.request_id, event.corridor.len()
    );
}

fn main() {
    let mut app = App::new();

    app
    .add_plugins((
        WaymarkTestPlugin { step: Duration::from_millis(50), max_frames: 5000 },
        WaymarkPlugin,
    ))
    .init_resource::<QueuedPathfinder>()
    .add_observer(log_path_ready)
    .add_systems(Startup, setup)
    .add_systems(FixedUpdate, wander.before(WaymarkSystems::Control))
    .add_systems(Update, detour_pathfinder)
    ;

    app.run();
}

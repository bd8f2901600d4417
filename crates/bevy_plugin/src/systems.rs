/*
This Source Code Form is subject to the terms of the Mozilla Public License, v. 2.0.
If a copy of the MPL was not distributed with this file,
You can obtain one at https://mozilla.org/MPL/2.0/.
*/
use bevy::prelude::*;
use waymark_core::config::MovementConfig;
use waymark_core::controller::MovementController;
use waymark_core::events::trigger_tick_events;
use waymark_core::steering::turn_towards;

use crate::components::*;

/// Stops agents whose MovementGoal got removed.
pub fn cancel_removed_goals(
    mut removed: RemovedComponents<MovementGoal>,
    mut query: Query<(&mut MovementController, &mut SteeringOutput), Without<MovementGoal>>,
) {
    for agent in removed.read() {
        let Ok((mut controller, mut steering)) = query.get_mut(agent) else {
            continue;
        };

        #[cfg(feature = "logging")]
        bevy::log::debug!("MovementGoal removed from {:?}, stopping", agent);

        controller.cancel();
        *steering = SteeringOutput::default();
    }
}

/// Runs every agent's MovementController for this fixed tick and publishes the results.
pub fn tick_movement_controllers(
    mut agents: Query<(
        Entity,
        &Transform,
        &MovementGoal,
        &PathGateway,
        Option<&MovementConfig>,
        &mut MovementController,
        &mut SteeringOutput,
    )>,
    goal_transforms: Query<&Transform>,
    default_config: Res<DefaultMovementConfig>,
    game_timer: Res<Time>,
    mut commands: Commands,
) {
    let now = game_timer.elapsed();

    for (agent, transform, goal, gateway, config, mut controller, mut steering) in agents.iter_mut() {
        let config = config.unwrap_or(&default_config.0);

        if let Err(_err) = config.validate() {
            #[cfg(feature = "logging")]
            bevy::log::warn_once!("Agent {:?} has an invalid MovementConfig, skipping it - {}", agent, _err);
            continue;
        }

        let destination = match goal {
            MovementGoal::Position(position) => *position,
            MovementGoal::Entity(target) => match goal_transforms.get(*target) {
                Ok(target_transform) => target_transform.translation,
                Err(_err) => {
                    if controller.is_following() || controller.is_calculating() {
                        #[cfg(feature = "logging")]
                        bevy::log::debug!(
                            "Chase target {:?} of agent {:?} is gone, stopping - {:?}",
                            target, agent, _err
                        );

                        controller.cancel();
                    }
                    *steering = SteeringOutput::default();
                    continue;
                }
            },
        };

        let output = controller.tick(
            gateway.0.as_ref(),
            transform.translation,
            destination,
            config,
            now,
        );

        *steering = SteeringOutput {
            steer_target: output.steer_target,
            speed_scale: output.speed_scale,
            is_following_path: output.is_following_path,
            is_calculating_path: output.is_calculating_path,
        };

        if !output.events.is_empty() {
            trigger_tick_events(&mut commands, agent, output.events);
        }
    }
}

/// Turns and moves agents with a Locomotion component according to their SteeringOutput.
pub fn apply_locomotion(
    mut agents: Query<(&mut Transform, &SteeringOutput, &Locomotion, Option<&MovementConfig>)>,
    default_config: Res<DefaultMovementConfig>,
    game_timer: Res<Time>,
) {
    let delta_seconds = game_timer.delta_secs();

    for (mut transform, steering, locomotion, config) in agents.iter_mut() {
        let Some(steer_target) = steering.steer_target else {
            continue;
        };

        let turn_speed = config.unwrap_or(&default_config.0).turn_speed;

        transform.rotation = turn_towards(
            transform.rotation,
            transform.translation,
            steer_target,
            turn_speed,
            delta_seconds,
        );

        let step = locomotion.speed * steering.speed_scale * delta_seconds;
        let forward = transform.forward().as_vec3();
        transform.translation += forward * step;
    }
}

/// Draws the corridors of agents marked with CorridorDebugDraw (or all of them).
#[cfg(feature = "debug_draw")]
pub fn draw_corridors(
    mut gizmos: Gizmos,
    agents: Query<(&MovementController, Has<CorridorDebugDraw>)>,
    draw_all: Res<DrawAllCorridors>,
) {
    const LOOK_POINT_COLOR: Color = Color::srgb(0.2, 0.4, 1.);
    const BOUNDARY_COLOR: Color = Color::WHITE;
    const BOUNDARY_HALF_LENGTH: f32 = 5.;

    for (controller, marked) in agents.iter() {
        if !(marked || draw_all.0) {
            continue;
        }

        let Some(corridor) = controller.corridor() else {
            continue;
        };

        gizmos.linestrip(corridor.look_points().iter().copied(), LOOK_POINT_COLOR);

        for (boundary, look_point) in corridor.turn_boundaries().iter().zip(corridor.look_points()) {
            let (start, end) = boundary.segment(BOUNDARY_HALF_LENGTH);
            let height = look_point.y;

            gizmos.line(
                Vec3::new(start.x, height, start.y),
                Vec3::new(end.x, height, end.y),
                BOUNDARY_COLOR,
            );
        }
    }
}

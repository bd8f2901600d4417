/*
This Source Code Form is subject to the terms of the Mozilla Public License, v. 2.0.
If a copy of the MPL was not distributed with this file,
You can obtain one at https://mozilla.org/MPL/2.0/.
*/
//! Per-tick progress along a PathCorridor.
//!
//! The follower is a cursor into an (immutable, shared) corridor. Each tick it
//! checks whether the agent has crossed the current turn boundary, moves on to
//! the next look point if so, and works out how fast the agent should be going.
//!
//! This runs for every moving agent at simulation-tick frequency, so it is pure
//! geometry over the corridor; no searching and no allocations.

use bevy::reflect::Reflect;

use crate::corridor::PathCorridor;
use crate::types::{
    planar, SpeedScale, WorldPosition,
    ARRIVAL_SPEED_SCALE, MAX_SPEED_SCALE, MIN_SPEED_SCALE,
};

#[derive(Debug, Clone, Copy, PartialEq, Reflect)]
pub struct FollowResult {
    /// Where the agent should be heading, at the agent's own height.
    pub steer_target: WorldPosition,
    pub speed_scale: SpeedScale,
    pub arrived: bool,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Reflect)]
pub struct PathFollower {
    current_index: usize,
    is_following: bool,
}

impl PathFollower {
    pub fn new() -> Self {
        Self::default()
    }

    /// Starts following a fresh corridor from its first look point.
    pub fn start(&mut self) {
        self.current_index = 0;
        self.is_following = true;
    }

    pub fn stop(&mut self) {
        self.is_following = false;
    }

    pub fn current_index(&self) -> usize {
        self.current_index
    }

    pub fn is_following(&self) -> bool {
        self.is_following
    }

    /// Moves the cursor along `corridor` given the agent's current position.
    ///
    /// Crossing a turn boundary moves on to the next look point within the same
    /// call. Crossing the finish line, or slowing down to a near-standstill,
    /// counts as arriving and stops the follower.
    pub fn advance(&mut self, corridor: &PathCorridor, agent_position: WorldPosition) -> FollowResult {
        let finish_line_index = corridor.finish_line_index();
        let position = planar(agent_position);

        if !self.is_following {
            return FollowResult {
                steer_target: agent_position,
                speed_scale: MIN_SPEED_SCALE,
                arrived: false,
            };
        }

        let mut index = self.current_index.min(finish_line_index);
        let crossed = corridor.turn_boundaries()[index].has_crossed(position);

        if crossed {
            if index == finish_line_index {
                return self.arrive(corridor, agent_position);
            }
            index += 1;
        }

        self.current_index = index;

        let mut speed_scale = MAX_SPEED_SCALE;
        let stopping_distance = corridor.stopping_distance();

        if index >= corridor.slow_down_index() && stopping_distance > 0. {
            let remaining = corridor.finish_line().distance_from_point(position);
            speed_scale = (remaining / stopping_distance).clamp(MIN_SPEED_SCALE, MAX_SPEED_SCALE);

            if speed_scale < ARRIVAL_SPEED_SCALE {
                return self.arrive(corridor, agent_position);
            }
        }

        FollowResult {
            steer_target: level_with(corridor.look_points()[index], agent_position),
            speed_scale,
            arrived: false,
        }
    }

    fn arrive(&mut self, corridor: &PathCorridor, agent_position: WorldPosition) -> FollowResult {
        self.current_index = corridor.finish_line_index();
        self.is_following = false;

        #[cfg(feature = "logging")]
        bevy::log::debug!("Arrived at {:?}", corridor.destination());

        FollowResult {
            steer_target: level_with(corridor.destination(), agent_position),
            speed_scale: MIN_SPEED_SCALE,
            arrived: true,
        }
    }
}

/// Moves `target` to the agent's height, so planar movers do not pitch towards the ground.
#[inline]
fn level_with(target: WorldPosition, agent_position: WorldPosition) -> WorldPosition {
    WorldPosition::new(target.x, agent_position.y, target.z)
}

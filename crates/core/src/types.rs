/*
This Source Code Form is subject to the terms of the Mozilla Public License, v. 2.0.
If a copy of the MPL was not distributed with this file,
You can obtain one at https://mozilla.org/MPL/2.0/.
*/
//! Type aliases and shared constants.

use std::sync::Arc;

/// A position in world space. The world is Y-up; agents move in the XZ plane.
pub type WorldPosition = bevy::math::Vec3;

/// A position projected onto the movement plane, stored as `(x, z)`.
pub type PlanarPosition = bevy::math::Vec2;

/// Multiplier applied to the agent's nominal speed; always within `[0, 1]`.
pub type SpeedScale = f32;

pub const MIN_SPEED_SCALE: SpeedScale = 0.;
pub const MAX_SPEED_SCALE: SpeedScale = 1.;

/// Below this speed scale the agent is treated as having arrived,
/// instead of crawling towards the finish line forever.
pub const ARRIVAL_SPEED_SCALE: SpeedScale = 0.01;

/// Corridors are immutable once built, so they are shared rather than copied.
pub type SharedCorridor = Arc<crate::corridor::PathCorridor>;

/// Per-controller, monotonically increasing identifier of a path request.
pub type PathRequestId = u64;

// Type aliases - to express intent better.
pub type AgentEntity = bevy::prelude::Entity;

/// Projects a world position onto the movement plane.
#[inline]
pub fn planar(position: WorldPosition) -> PlanarPosition {
    bevy::math::Vec2::new(position.x, position.z)
}

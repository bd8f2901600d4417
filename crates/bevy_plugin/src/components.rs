/*
This Source Code Form is subject to the terms of the Mozilla Public License, v. 2.0.
If a copy of the MPL was not distributed with this file,
You can obtain one at https://mozilla.org/MPL/2.0/.
*/
use std::sync::Arc;

use bevy::prelude::*;
use waymark_core::config::MovementConfig;
use waymark_core::controller::MovementController;
use waymark_core::gateway::PathRequestGateway;
use waymark_core::types::{SpeedScale, WorldPosition};

/// Where an agent wants to go.
///
/// Adding this to an entity (along with a Transform and a PathGateway) makes it
/// an agent; removing it stops the agent and cancels any in-flight path request.
#[derive(Component, Debug, Clone, Copy, PartialEq, Reflect)]
#[require(MovementController, SteeringOutput)]
pub enum MovementGoal {
    /// A fixed point in the world.
    Position(WorldPosition),

    /// Chase another entity's Transform.
    /// If the entity goes away, the agent stops.
    Entity(Entity),
}

impl MovementGoal {
    pub fn position(position: WorldPosition) -> Self {
        Self::Position(position)
    }

    pub fn chase(target: Entity) -> Self {
        Self::Entity(target)
    }
}

impl From<WorldPosition> for MovementGoal {
    fn from(value: WorldPosition) -> Self {
        Self::Position(value)
    }
}

/// The agent's handle to whatever finds its paths.
///
/// Each agent holds its own handle, so different agents (e.g. walkers and
/// flyers) can use different pathfinders. Handles are cheap to clone.
#[derive(Component, Clone)]
pub struct PathGateway(pub Arc<dyn PathRequestGateway>);

impl PathGateway {
    pub fn new<G: PathRequestGateway + 'static>(gateway: G) -> Self {
        Self(Arc::new(gateway))
    }
}

impl core::fmt::Debug for PathGateway {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_tuple("PathGateway").finish_non_exhaustive()
    }
}

/// What the agent's MovementController wants it to do, updated every fixed tick.
///
/// Read this from your own locomotion code, or add a Locomotion component to
/// have the plugin move the agent for you.
#[derive(Component, Debug, Clone, Copy, Default, PartialEq, Reflect)]
pub struct SteeringOutput {
    /// Where to head; None means stand still.
    pub steer_target: Option<WorldPosition>,
    pub speed_scale: SpeedScale,
    pub is_following_path: bool,
    pub is_calculating_path: bool,
}

/// Opts an agent into the plugin's built-in movement.
///
/// The agent turns towards its steer target at its MovementConfig's turn speed
/// and moves along its forward (-Z) axis at `speed` times the speed scale.
#[derive(Component, Debug, Clone, Copy, PartialEq, Reflect)]
pub struct Locomotion {
    /// Nominal speed, in world units per second.
    pub speed: f32,
}

impl Default for Locomotion {
    fn default() -> Self {
        Self { speed: 5. }
    }
}

/// MovementConfig for agents that do not carry their own.
#[derive(Resource, Debug, Clone, Default, PartialEq, Deref, DerefMut)]
pub struct DefaultMovementConfig(pub MovementConfig);

/// Marker; draws this agent's corridor when the `debug_draw` feature is on.
#[derive(Component, Debug, Clone, Copy, Default, Reflect)]
pub struct CorridorDebugDraw;

/// Draws every agent's corridor when the `debug_draw` feature is on.
#[derive(Resource, Debug, Clone, Copy, Default, PartialEq, Eq, Deref, DerefMut)]
pub struct DrawAllCorridors(pub bool);

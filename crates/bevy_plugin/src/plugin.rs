/*
This Source Code Form is subject to the terms of the Mozilla Public License, v. 2.0.
If a copy of the MPL was not distributed with this file,
You can obtain one at https://mozilla.org/MPL/2.0/.
*/

use bevy::prelude::*;

use crate::components::{DefaultMovementConfig, DrawAllCorridors};
use crate::systems;

/// The ordering of Waymark's fixed-tick work.
#[derive(SystemSet, Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum WaymarkSystems {
    /// Repath decisions and corridor following.
    Control,

    /// Built-in Locomotion, consuming the SteeringOutput of Control.
    Locomotion,
}

pub struct WaymarkPlugin;

impl Plugin for WaymarkPlugin {
    fn build(&self, app: &mut App) {
        app
        .init_resource::<DefaultMovementConfig>()
        .init_resource::<DrawAllCorridors>()
        .configure_sets(
            FixedUpdate,
            (WaymarkSystems::Control, WaymarkSystems::Locomotion).chain()
        )
        .add_systems(
            FixedUpdate,
            (
                systems::cancel_removed_goals,
                systems::tick_movement_controllers,
            ).chain().in_set(WaymarkSystems::Control)
        )
        .add_systems(
            FixedUpdate,
            systems::apply_locomotion.in_set(WaymarkSystems::Locomotion)
        )
        ;

        #[cfg(feature = "debug_draw")]
        app.add_systems(Update, systems::draw_corridors);
    }
}

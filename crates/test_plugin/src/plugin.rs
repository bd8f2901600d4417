/*
This Source Code Form is subject to the terms of the Mozilla Public License, v. 2.0.
If a copy of the MPL was not distributed with this file,
You can obtain one at https://mozilla.org/MPL/2.0/.
*/
use core::time::Duration;

#[cfg(feature = "logging")]
use bevy::log::LogPlugin;
use bevy::{app::ScheduleRunnerPlugin, prelude::*, time::TimeUpdateStrategy};

use crate::helpers::*;

/// Headless runtime for tests and demos.
///
/// Game time advances by exactly `step` every frame regardless of how long the
/// frame actually took, so runs are repeatable. The App exits once every agent
/// that started moving has settled down, or with an error after `max_frames`.
pub struct WaymarkTestPlugin {
    pub step: Duration,
    pub max_frames: u32,
}

impl Default for WaymarkTestPlugin {
    fn default() -> Self {
        Self {
            step: Duration::from_millis(50),
            max_frames: 2000,
        }
    }
}

impl Plugin for WaymarkTestPlugin {
    fn build(&self, app: &mut App) {
        app
        .add_plugins((
            MinimalPlugins.set(ScheduleRunnerPlugin::run_loop(Duration::ZERO)),
            #[cfg(feature = "logging")]
            LogPlugin {
                level: bevy::log::Level::DEBUG,
                custom_layer: |_| None,
                filter: "wgpu=error,bevy_render=info,bevy_ecs=info".to_string(),
                fmt_layer: |_| None,
            }
        ))
        .insert_resource(TimeUpdateStrategy::ManualDuration(self.step))
        .insert_resource(Time::<Fixed>::from_duration(self.step))
        .insert_resource(FrameLimit(self.max_frames))
        .init_resource::<TestArrivals>()
        .add_observer(record_arrival)
        .add_systems(
            Last,
            (
                exit_on_all_agents_settled,
                exit_on_frame_limit,
            ).chain()
        )
        ;
    }
}

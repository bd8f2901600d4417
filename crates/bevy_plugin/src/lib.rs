/*
This Source Code Form is subject to the terms of the Mozilla Public License, v. 2.0.
If a copy of the MPL was not distributed with this file,
You can obtain one at https://mozilla.org/MPL/2.0/.
*/

//! This crate extends the Waymark movement library with a plugin that streamlines the integration
//! of Waymark into an existing Bevy application.
//!
//! The plugin runs every agent's MovementController once per fixed tick, publishes the results as
//! a SteeringOutput Component, and turns whatever happened along the way (paths requested, found,
//! failed; destinations reached) into Entity Events you can observe.
//!
//! What's left for you to do after adding it in is giving your agents a PathGateway to get their
//! paths from, and either reading the SteeringOutput yourself or adding a Locomotion Component.

mod components;
mod plugin;
mod queued;
mod systems;

pub use components::*;
pub use plugin::{WaymarkPlugin, WaymarkSystems};
pub use queued::QueuedPathfinder;

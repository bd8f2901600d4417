/*
This Source Code Form is subject to the terms of the Mozilla Public License, v. 2.0.
If a copy of the MPL was not distributed with this file,
You can obtain one at https://mozilla.org/MPL/2.0/.
*/
//! Core logic of the Waymark movement library: turning a pathfinder's waypoints into
//! smooth, anticipatory movement, and deciding when a new path is worth asking for.
//!
//! Everything here is engine-agnostic plain data and functions, plus a handful of
//! Bevy Components and Events for the plugin crate to build on.

pub mod config;
pub mod controller;
pub mod corridor;
pub mod errors;
pub mod events;
pub mod follower;
pub mod gateway;
pub mod repath;
pub mod steering;
pub mod turn_boundary;
pub mod types;

/*
This Source Code Form is subject to the terms of the Mozilla Public License, v. 2.0.
If a copy of the MPL was not distributed with this file,
You can obtain one at https://mozilla.org/MPL/2.0/.
*/
//! Per-agent movement tunables.
//!
//! The defaults are a reasonable starting point for a human-sized agent on a
//! unit-scale grid; expect to tweak them per agent archetype.

use core::time::Duration;

use bevy::prelude::*;

#[cfg(feature = "serialize")]
use serde::{Deserialize, Serialize};

use crate::corridor::CorridorSettings;
use crate::errors::MovementConfigError;

pub const DEFAULT_MIN_PATH_UPDATE_TIME: Duration = Duration::from_millis(200);
pub const DEFAULT_PATH_UPDATE_MOVE_THRESHOLD: f32 = 0.5;
pub const DEFAULT_TURN_DISTANCE: f32 = 5.;
pub const DEFAULT_STOPPING_DISTANCE: f32 = 10.;
pub const DEFAULT_TURN_SPEED: f32 = 3.;

/// Tunables for a single agent's MovementController.
///
/// Lives as a Component on the agent; agents without one use the
/// `DefaultMovementConfig` Resource from the plugin crate.
#[derive(Component, Debug, Clone, PartialEq, Reflect)]
#[cfg_attr(feature = "serialize", derive(Serialize, Deserialize))]
pub struct MovementConfig {
    /// Minimum time between two path requests caused by the destination moving.
    pub min_path_update_time: Duration,

    /// How far the destination has to move away from where it was when the
    /// current path was requested before we bother asking for a new one.
    pub path_update_move_threshold: f32,

    /// How far ahead of a corner the agent starts turning towards the next waypoint.
    pub turn_distance: f32,

    /// Distance from the destination at which the agent starts slowing down.
    /// Zero disables the slow-down ramp altogether.
    pub stopping_distance: f32,

    /// How quickly the agent rotates towards its steer target, per second.
    pub turn_speed: f32,
}

impl Default for MovementConfig {
    fn default() -> Self {
        Self {
            min_path_update_time: DEFAULT_MIN_PATH_UPDATE_TIME,
            path_update_move_threshold: DEFAULT_PATH_UPDATE_MOVE_THRESHOLD,
            turn_distance: DEFAULT_TURN_DISTANCE,
            stopping_distance: DEFAULT_STOPPING_DISTANCE,
            turn_speed: DEFAULT_TURN_SPEED,
        }
    }
}

impl MovementConfig {
    pub fn builder() -> MovementConfigBuilder {
        MovementConfigBuilder::default()
    }

    /// Checks that every distance and speed is a finite, non-negative number.
    pub fn validate(&self) -> Result<(), MovementConfigError> {
        let fields = [
            ("path_update_move_threshold", self.path_update_move_threshold),
            ("turn_distance", self.turn_distance),
            ("stopping_distance", self.stopping_distance),
            ("turn_speed", self.turn_speed),
        ];

        for (name, value) in fields {
            if !value.is_finite() {
                return Err(MovementConfigError::NotFinite(name));
            }
            if value < 0. {
                return Err(MovementConfigError::NegativeValue(name));
            }
        }

        Ok(())
    }

    /// The subset of the config baked into each PathCorridor at construction.
    pub fn corridor_settings(&self) -> CorridorSettings {
        CorridorSettings {
            turn_distance: self.turn_distance,
            stopping_distance: self.stopping_distance,
        }
    }
}


/// Builder pattern for MovementConfig.
///
/// Any value left unset falls back to the library default.
#[derive(Default, Debug, Clone)]
pub struct MovementConfigBuilder {
    min_path_update_time: Option<Duration>,
    path_update_move_threshold: Option<f32>,
    turn_distance: Option<f32>,
    stopping_distance: Option<f32>,
    turn_speed: Option<f32>,
}

impl MovementConfigBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds the config, rejecting negative or non-finite values.
    pub fn build(self) -> Result<MovementConfig, MovementConfigError> {
        let config = self.build_unchecked();
        config.validate()?;
        Ok(config)
    }

    /// Builds the config without validating it.
    pub fn build_unchecked(self) -> MovementConfig {
        let defaults = MovementConfig::default();

        MovementConfig {
            min_path_update_time: self.min_path_update_time.unwrap_or(defaults.min_path_update_time),
            path_update_move_threshold: self.path_update_move_threshold.unwrap_or(defaults.path_update_move_threshold),
            turn_distance: self.turn_distance.unwrap_or(defaults.turn_distance),
            stopping_distance: self.stopping_distance.unwrap_or(defaults.stopping_distance),
            turn_speed: self.turn_speed.unwrap_or(defaults.turn_speed),
        }
    }

    pub fn set_min_path_update_time(mut self, val: Duration) -> Self {
        self.min_path_update_time = Some(val); self
    }

    pub fn set_path_update_move_threshold(mut self, val: f32) -> Self {
        self.path_update_move_threshold = Some(val); self
    }

    pub fn set_turn_distance(mut self, val: f32) -> Self {
        self.turn_distance = Some(val); self
    }

    pub fn set_stopping_distance(mut self, val: f32) -> Self {
        self.stopping_distance = Some(val); self
    }

    pub fn set_turn_speed(mut self, val: f32) -> Self {
        self.turn_speed = Some(val); self
    }

    /// Creates a new builder using an existing config as a starting point.
    pub fn from_reference_config(config: &MovementConfig) -> Self {
        Self {
            min_path_update_time: Some(config.min_path_update_time),
            path_update_move_threshold: Some(config.path_update_move_threshold),
            turn_distance: Some(config.turn_distance),
            stopping_distance: Some(config.stopping_distance),
            turn_speed: Some(config.turn_speed),
        }
    }
}

impl From<&MovementConfig> for MovementConfigBuilder {
    fn from(value: &MovementConfig) -> Self {
        Self::from_reference_config(value)
    }
}

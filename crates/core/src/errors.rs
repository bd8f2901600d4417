/*
This Source Code Form is subject to the terms of the Mozilla Public License, v. 2.0.
If a copy of the MPL was not distributed with this file,
You can obtain one at https://mozilla.org/MPL/2.0/.
*/
use bevy::reflect::Reflect;

#[cfg(feature = "serialize")]
use serde::{Deserialize, Serialize};

/// Why a path request did not produce a corridor.
///
/// None of these are fatal. The controller surfaces them as
/// 'not currently following a path' and re-evaluates on the next tick.
#[derive(Debug, Clone, Copy, Hash, PartialEq, Eq, Reflect)]
#[cfg_attr(feature = "serialize", derive(Serialize, Deserialize))]
pub enum PathFailure {
    /// The pathfinder completed the request and reported that no path exists.
    NotFound,

    /// The pathfinder dropped the completion callback without ever firing it.
    Abandoned,
}

impl core::fmt::Display for PathFailure {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::NotFound => write!(f, "no path to the destination was found"),
            Self::Abandoned => write!(f, "the pathfinder abandoned the request"),
        }
    }
}

impl core::error::Error for PathFailure {}


/// A MovementConfig value that the controller cannot work with.
///
/// The payload is the name of the offending field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MovementConfigError {
    NegativeValue(&'static str),
    NotFinite(&'static str),
}

impl core::fmt::Display for MovementConfigError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::NegativeValue(field) => write!(f, "movement config field `{}` must not be negative", field),
            Self::NotFinite(field) => write!(f, "movement config field `{}` must be a finite number", field),
        }
    }
}

impl core::error::Error for MovementConfigError {}

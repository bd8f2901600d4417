/*
This Source Code Form is subject to the terms of the Mozilla Public License, v. 2.0.
If a copy of the MPL was not distributed with this file,
You can obtain one at https://mozilla.org/MPL/2.0/.
*/
use bevy::prelude::*;

use crate::controller::{PathResolution, TickEvents};
use crate::errors::PathFailure;
use crate::types::{self, PathRequestId, SharedCorridor, WorldPosition};

/// An Event that signals an agent has asked its gateway for a new path.
///
/// Raised on the tick the request is issued, before any result is known.
#[derive(EntityEvent, Debug, Clone)]
pub struct PathRequested {
    /// The agent that issued the request.
    pub entity: types::AgentEntity,
    pub request_id: PathRequestId,
    pub start: WorldPosition,
    pub destination: WorldPosition,
}

/// An Event that signals a path request has produced a corridor and the agent
/// has started following it.
#[derive(EntityEvent, Debug, Clone)]
pub struct PathReady {
    pub entity: types::AgentEntity,
    pub request_id: PathRequestId,

    /// The new corridor. Shared with the controller; cloning it is cheap.
    pub corridor: SharedCorridor,
}

/// An Event that signals a path request did not produce a corridor.
///
/// This is informational; the controller will retry on its own once
/// the backoff expires or the destination changes.
#[derive(EntityEvent, Debug, Clone)]
pub struct PathFailed {
    pub entity: types::AgentEntity,
    pub request_id: PathRequestId,
    pub reason: PathFailure,
}

/// An Event that signals an agent got to the end of its corridor.
#[derive(EntityEvent, Debug, Clone)]
pub struct DestinationReached {
    pub entity: types::AgentEntity,
    pub destination: WorldPosition,
}

/// Turns a tick's worth of controller happenings into Events for `agent`,
/// in the order they happened: resolutions of older requests first.
pub fn trigger_tick_events(commands: &mut Commands, agent: types::AgentEntity, events: TickEvents) {
    let TickEvents { requested, resolved, arrived } = events;

    let mut resolved = resolved.into_iter().peekable();

    // A synchronous gateway resolves the new request in the same tick,
    // so only the resolutions that were already pending go before it.
    let new_request_id = requested.map(|request| request.id);
    while let Some(resolution) = resolved.next_if(|res| Some(resolution_id(res)) != new_request_id) {
        trigger_resolution(commands, agent, resolution);
    }

    if let Some(request) = requested {
        #[cfg(feature = "logging")]
        bevy::log::debug!("Triggering PathRequested #{:?} for {:?}", request.id, agent);

        commands.trigger(PathRequested {
            entity: agent,
            request_id: request.id,
            start: request.start,
            destination: request.destination,
        });
    }

    for resolution in resolved {
        trigger_resolution(commands, agent, resolution);
    }

    if let Some(destination) = arrived {
        #[cfg(feature = "logging")]
        bevy::log::debug!("Triggering DestinationReached for {:?}", agent);

        commands.trigger(DestinationReached { entity: agent, destination });
    }
}

fn resolution_id(resolution: &PathResolution) -> PathRequestId {
    match resolution {
        PathResolution::Ready { request_id, .. } => *request_id,
        PathResolution::Failed { request_id, .. } => *request_id,
    }
}

fn trigger_resolution(commands: &mut Commands, agent: types::AgentEntity, resolution: PathResolution) {
    match resolution {
        PathResolution::Ready { request_id, corridor } => {
            commands.trigger(PathReady { entity: agent, request_id, corridor });
        },
        PathResolution::Failed { request_id, reason } => {
            #[cfg(feature = "logging")]
            bevy::log::info!("Path request #{:?} for {:?} failed: {}", request_id, agent, reason);

            commands.trigger(PathFailed { entity: agent, request_id, reason });
        },
    }
}

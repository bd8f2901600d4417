/*
This Source Code Form is subject to the terms of the Mozilla Public License, v. 2.0.
If a copy of the MPL was not distributed with this file,
You can obtain one at https://mozilla.org/MPL/2.0/.
*/
//! The seam between Waymark and whatever actually searches for paths.
//!
//! Waymark does not do pathfinding itself. Instead, each agent holds a handle
//! to a PathRequestGateway - something that accepts a PathRequest and promises
//! to eventually fire the accompanying PathCompletion exactly once.
//!
//! The gateway is free to answer synchronously from inside `request_path()`,
//! from a worker thread, or from a time-sliced system many frames later.
//!
//! The handoff back to the controller goes through a write-once slot.
//! The controller owns the slot; the completion only holds a weak reference
//! to it, so if the controller gave up on the request (agent despawned, request
//! cancelled) the late result is simply dropped on the floor.

use std::sync::{Arc, OnceLock, Weak};

use crate::corridor::{CorridorSettings, PathCorridor};
use crate::errors::PathFailure;
use crate::types::{PathRequestId, SharedCorridor, WorldPosition};

/// A request for a path, as seen by the pathfinder.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PathRequest {
    pub id: PathRequestId,
    pub start: WorldPosition,
    pub destination: WorldPosition,
}

/// Anything that can find paths for a MovementController.
///
/// Implementations must eventually consume the completion, either by firing it
/// or by dropping it (which reports the request as abandoned).
pub trait PathRequestGateway: Send + Sync {
    fn request_path(&self, request: PathRequest, completion: PathCompletion);
}

impl<F> PathRequestGateway for F
where
    F: Fn(PathRequest, PathCompletion) + Send + Sync,
{
    fn request_path(&self, request: PathRequest, completion: PathCompletion) {
        (self)(request, completion)
    }
}

/// The resolved result of a path request.
#[derive(Debug, Clone)]
pub enum PathOutcome {
    Found(SharedCorridor),
    Failed(PathFailure),
}

type OutcomeSlot = OnceLock<PathOutcome>;

/// One-shot callback handed to the gateway along with a PathRequest.
///
/// Consuming it (`complete()`, `succeed()` or `fail()`) delivers the result;
/// dropping it unfired delivers `PathFailure::Abandoned`. Either way, the
/// controller hears back exactly once.
///
/// The corridor is built by whoever fires the completion, so if that happens
/// on a worker thread, so does the (comparatively cheap) corridor processing.
#[derive(Debug)]
pub struct PathCompletion {
    request_id: PathRequestId,
    start: WorldPosition,
    settings: CorridorSettings,
    slot: Weak<OutcomeSlot>,
    fired: bool,
}

impl PathCompletion {
    pub fn request_id(&self) -> PathRequestId {
        self.request_id
    }

    /// Whether the requester has stopped waiting for this result.
    pub fn is_stale(&self) -> bool {
        self.slot.strong_count() == 0
    }

    /// Reports the pathfinder's result.
    ///
    /// A successful result with no waypoints means the agent is already there.
    /// The waypoints of a failed result are ignored.
    ///
    /// Returns false if the result was stale and got discarded.
    pub fn complete(mut self, waypoints: &[WorldPosition], success: bool) -> bool {
        self.fired = true;

        if self.is_stale() {
            #[cfg(feature = "logging")]
            bevy::log::debug!("Discarding stale result for path request #{:?}", self.request_id);
            return false;
        }

        let outcome = match success {
            true => PathOutcome::Found(Arc::new(PathCorridor::new(waypoints, self.start, self.settings))),
            false => PathOutcome::Failed(PathFailure::NotFound),
        };

        self.deliver(outcome)
    }

    pub fn succeed(self, waypoints: &[WorldPosition]) -> bool {
        self.complete(waypoints, true)
    }

    pub fn fail(self) -> bool {
        self.complete(&[], false)
    }

    fn deliver(&self, outcome: PathOutcome) -> bool {
        match self.slot.upgrade() {
            None => false,
            Some(slot) => slot.set(outcome).is_ok(),
        }
    }
}

impl Drop for PathCompletion {
    fn drop(&mut self) {
        if self.fired {
            return;
        }

        #[cfg(feature = "logging")]
        bevy::log::warn!("Path request #{:?} was dropped without a result", self.request_id);

        self.deliver(PathOutcome::Failed(PathFailure::Abandoned));
    }
}


/// The controller's side of an in-flight request.
///
/// Dropping this is how a request gets cancelled - any later result is discarded.
#[derive(Debug)]
pub struct PendingPath {
    request: PathRequest,
    slot: Arc<OutcomeSlot>,
}

impl PendingPath {
    /// Creates a linked pending-request/completion pair.
    pub fn new(request: PathRequest, settings: CorridorSettings) -> (Self, PathCompletion) {
        let slot = Arc::new(OutcomeSlot::new());

        let completion = PathCompletion {
            request_id: request.id,
            start: request.start,
            settings,
            slot: Arc::downgrade(&slot),
            fired: false,
        };

        (Self { request, slot }, completion)
    }

    pub fn request(&self) -> &PathRequest {
        &self.request
    }

    pub fn request_id(&self) -> PathRequestId {
        self.request.id
    }

    /// The result, if it has landed yet.
    pub fn poll(&self) -> Option<&PathOutcome> {
        self.slot.get()
    }
}

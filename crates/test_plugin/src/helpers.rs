/*
This Source Code Form is subject to the terms of the Mozilla Public License, v. 2.0.
If a copy of the MPL was not distributed with this file,
You can obtain one at https://mozilla.org/MPL/2.0/.
*/
use std::sync::{Arc, Mutex, MutexGuard};

use bevy::prelude::*;
use waymark_core::controller::{MovementController, MovementState};
use waymark_core::events::DestinationReached;
use waymark_core::gateway::{PathCompletion, PathRequest, PathRequestGateway};
use waymark_core::types::WorldPosition;

/// Answers every request on the spot with a path of evenly spaced waypoints
/// on the straight line from start to destination.
#[derive(Debug, Clone, Copy)]
pub struct StraightLineGateway {
    /// Distance between consecutive waypoints; zero or less means a single waypoint.
    pub spacing: f32,
}

impl Default for StraightLineGateway {
    fn default() -> Self {
        Self { spacing: 0. }
    }
}

impl StraightLineGateway {
    pub fn with_spacing(spacing: f32) -> Self {
        Self { spacing }
    }

    pub fn waypoints(&self, start: WorldPosition, destination: WorldPosition) -> Vec<WorldPosition> {
        let length = start.distance(destination);

        if self.spacing <= 0. || length <= self.spacing {
            return vec![destination];
        }

        let segments = (length / self.spacing).ceil() as usize;
        (1..=segments)
            .map(|idx| start.lerp(destination, idx as f32 / segments as f32))
            .collect()
    }
}

impl PathRequestGateway for StraightLineGateway {
    fn request_path(&self, request: PathRequest, completion: PathCompletion) {
        completion.succeed(&self.waypoints(request.start, request.destination));
    }
}

/// Reports every request as unreachable.
#[derive(Debug, Clone, Copy, Default)]
pub struct FailingGateway;

impl PathRequestGateway for FailingGateway {
    fn request_path(&self, _request: PathRequest, completion: PathCompletion) {
        completion.fail();
    }
}

/// Parks requests until the test decides to answer them.
///
/// Clones share the same parking lot, so keep one clone in the test
/// and hand the other to the agent.
#[derive(Clone, Default)]
pub struct DeferredGateway {
    parked: Arc<Mutex<Vec<(PathRequest, PathCompletion)>>>,
}

impl DeferredGateway {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, Vec<(PathRequest, PathCompletion)>> {
        match self.parked.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        }
    }

    pub fn parked(&self) -> usize {
        self.lock().len()
    }

    /// Takes every parked request, leaving the lot empty.
    pub fn take(&self) -> Vec<(PathRequest, PathCompletion)> {
        core::mem::take(&mut *self.lock())
    }

    /// Answers every parked request using `answer`; None means 'no path'.
    pub fn resolve_all<F>(&self, mut answer: F) -> usize
    where
        F: FnMut(&PathRequest) -> Option<Vec<WorldPosition>>,
    {
        let parked = self.take();
        let count = parked.len();

        for (request, completion) in parked {
            match answer(&request) {
                Some(waypoints) => completion.succeed(&waypoints),
                None => completion.fail(),
            };
        }

        count
    }
}

impl PathRequestGateway for DeferredGateway {
    fn request_path(&self, request: PathRequest, completion: PathCompletion) {
        self.lock().push((request, completion));
    }
}

impl core::fmt::Debug for DeferredGateway {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("DeferredGateway").field("parked", &self.parked()).finish()
    }
}


/// Agents that reached their destination, in order of arrival.
#[derive(Resource, Debug, Default, Deref, DerefMut)]
pub struct TestArrivals(pub Vec<Entity>);

#[derive(Resource, Debug, Clone, Copy)]
pub(crate) struct FrameLimit(pub u32);

pub(crate) fn record_arrival(
    trigger: On<DestinationReached>,
    mut arrivals: ResMut<TestArrivals>,
) {
    let event = trigger.event();

    #[cfg(feature = "logging")]
    bevy::log::info!("Agent {:?} reached {:?}", event.entity, event.destination);

    arrivals.push(event.entity);
}

/// Exits once at least one agent arrived and no agent is still on the move.
pub(crate) fn exit_on_all_agents_settled(
    controllers: Query<&MovementController>,
    arrivals: Res<TestArrivals>,
    mut exit: MessageWriter<AppExit>,
) {
    if arrivals.is_empty() {
        return;
    }

    let all_settled = controllers.iter().all(|controller| controller.state() == MovementState::Idle);

    if all_settled {
        #[cfg(feature = "logging")]
        bevy::log::info!("All agents settled, exiting");

        exit.write(AppExit::Success);
    }
}

pub(crate) fn exit_on_frame_limit(
    limit: Res<FrameLimit>,
    mut frames: Local<u32>,
    mut exit: MessageWriter<AppExit>,
) {
    *frames += 1;

    if *frames > limit.0 {
        #[cfg(feature = "logging")]
        bevy::log::error!("Hit the frame limit of {:?} before all agents settled, quitting!", limit.0);

        exit.write(AppExit::from_code(1));
    }
}

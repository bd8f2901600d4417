/*
This Source Code Form is subject to the terms of the Mozilla Public License, v. 2.0.
If a copy of the MPL was not distributed with this file,
You can obtain one at https://mozilla.org/MPL/2.0/.
*/
//! The MovementController ties the rest of the core together.
//!
//! Once per tick, the owner hands it the agent's position, where the agent wants
//! to go, its MovementConfig and a gateway to ask for paths. The controller:
//!
//! 1) Picks up the result of the in-flight path request, if it has landed.
//! 2) Asks the RepathPolicy whether a new path is needed.
//! 3) Issues a request through the gateway if so.
//! 4) Advances the PathFollower along the current corridor.
//!
//! ...and reports back where to steer, how fast, and what happened this tick.
//!
//! A repath never pauses the agent. While a new path is being calculated, the
//! agent keeps following the old corridor until the new one replaces it.

use core::time::Duration;

use bevy::prelude::*;

use crate::config::MovementConfig;
use crate::errors::PathFailure;
use crate::follower::PathFollower;
use crate::gateway::{PathOutcome, PathRequest, PathRequestGateway, PendingPath};
use crate::repath::{RepathDecision, RepathInputs, RepathPolicy};
use crate::types::{planar, PathRequestId, SharedCorridor, SpeedScale, WorldPosition, MIN_SPEED_SCALE};

#[derive(Debug, Clone, Copy, Hash, PartialEq, Eq, Reflect)]
pub enum MovementState {
    Idle,
    Calculating,
    Following,
}

/// How a path request that landed this tick turned out.
#[derive(Debug, Clone, PartialEq)]
pub enum PathResolution {
    Ready {
        request_id: PathRequestId,
        corridor: SharedCorridor,
    },
    Failed {
        request_id: PathRequestId,
        reason: PathFailure,
    },
}

/// Everything noteworthy that happened during a single tick.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TickEvents {
    /// The path request issued this tick, if any.
    pub requested: Option<PathRequest>,

    /// Path requests that resolved this tick, in the order they were picked up.
    pub resolved: Vec<PathResolution>,

    /// The destination of the corridor we finished this tick, if we did.
    pub arrived: Option<WorldPosition>,
}

impl TickEvents {
    pub fn is_empty(&self) -> bool {
        self.requested.is_none() && self.resolved.is_empty() && self.arrived.is_none()
    }
}

/// The per-tick output for the agent's locomotion layer.
#[derive(Debug, Clone, PartialEq)]
pub struct MovementOutput {
    pub decision: RepathDecision,

    /// Where to head. None if the agent should stand still.
    pub steer_target: Option<WorldPosition>,

    /// Fraction of the agent's nominal speed to move at, in [0, 1].
    pub speed_scale: SpeedScale,

    pub is_following_path: bool,
    pub is_calculating_path: bool,
    pub events: TickEvents,
}

/// Why the controller is deliberately not asking for a path.
#[derive(Debug, Clone, Copy, PartialEq)]
enum Hold {
    /// We got where we were going; stay put until either the destination
    /// or the agent moves away from it.
    Arrived { target: WorldPosition },

    /// The last request failed; back off before retrying.
    Failed { retry_at: Duration },
}

/// Per-agent movement state machine.
///
/// The state is never stored directly; it follows from whether a request is
/// in flight and whether the follower is active. Both can be true at once,
/// in which case the agent is following a stale corridor while a fresh one
/// is being calculated.
#[derive(Component, Debug, Default)]
pub struct MovementController {
    policy: RepathPolicy,
    follower: PathFollower,
    corridor: Option<SharedCorridor>,
    pending: Option<PendingPath>,
    hold: Option<Hold>,
    last_request_id: PathRequestId,
}

impl MovementController {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> MovementState {
        match (self.is_calculating(), self.is_following()) {
            (true, _) => MovementState::Calculating,
            (false, true) => MovementState::Following,
            (false, false) => MovementState::Idle,
        }
    }

    pub fn is_calculating(&self) -> bool {
        self.pending.is_some()
    }

    pub fn is_following(&self) -> bool {
        self.follower.is_following()
    }

    /// The corridor currently being followed (or last followed), for visualization.
    pub fn corridor(&self) -> Option<&SharedCorridor> {
        self.corridor.as_ref()
    }

    pub fn follower(&self) -> &PathFollower {
        &self.follower
    }

    pub fn policy(&self) -> &RepathPolicy {
        &self.policy
    }

    /// The request currently in flight, if any.
    pub fn pending_request(&self) -> Option<&PathRequest> {
        self.pending.as_ref().map(|pending| pending.request())
    }

    /// Stops the agent and forgets about any in-flight request.
    /// A result for the forgotten request is discarded when it lands.
    pub fn cancel(&mut self) {
        #[cfg(feature = "logging")]
        if let Some(pending) = &self.pending {
            bevy::log::debug!("Cancelling in-flight path request #{:?}", pending.request_id());
        }

        self.pending = None;
        self.corridor = None;
        self.hold = None;
        self.follower.stop();
        self.policy = RepathPolicy::default();
    }

    /// Runs one tick of the controller.
    pub fn tick<G: PathRequestGateway + ?Sized>(
        &mut self,
        gateway: &G,
        agent_position: WorldPosition,
        destination: WorldPosition,
        config: &MovementConfig,
        now: Duration,
    ) -> MovementOutput {
        let mut events = TickEvents::default();

        self.poll_pending(config, now, &mut events);

        let decision = match self.is_holding(agent_position, destination, config, now) {
            true => RepathDecision::None,
            false => self.policy.should_repath(&RepathInputs {
                target: destination,
                is_calculating: self.is_calculating(),
                is_following: self.is_following(),
                min_path_update_time: config.min_path_update_time,
                now,
            }),
        };

        match decision {
            RepathDecision::Calculate => {
                self.request_path(gateway, agent_position, destination, config, now, &mut events);
                // Synchronous gateways have already answered by now.
                self.poll_pending(config, now, &mut events);
                self.follow(decision, agent_position, events)
            },
            RepathDecision::Follow => self.follow(decision, agent_position, events),
            RepathDecision::None => self.idle_output(decision, events),
        }
    }

    fn is_holding(
        &mut self,
        agent_position: WorldPosition,
        destination: WorldPosition,
        config: &MovementConfig,
        now: Duration,
    ) -> bool {
        let holding = match self.hold {
            None => false,
            Some(Hold::Arrived { target }) => {
                let threshold = config.path_update_move_threshold;
                let rest_radius = threshold.max(config.stopping_distance);
                let destination_moved = destination.distance_squared(target) > threshold * threshold;
                let agent_displaced = planar(agent_position).distance_squared(planar(target)) > rest_radius * rest_radius;

                !(destination_moved || agent_displaced)
            },
            Some(Hold::Failed { retry_at }) => now < retry_at,
        };

        if !holding {
            self.hold = None;
        }

        holding
    }

    fn request_path<G: PathRequestGateway + ?Sized>(
        &mut self,
        gateway: &G,
        agent_position: WorldPosition,
        destination: WorldPosition,
        config: &MovementConfig,
        now: Duration,
        events: &mut TickEvents,
    ) {
        self.last_request_id += 1;

        let request = PathRequest {
            id: self.last_request_id,
            start: agent_position,
            destination,
        };

        #[cfg(feature = "logging")]
        bevy::log::debug!(
            "Requesting path #{:?} from {:?} to {:?}",
            request.id, request.start, request.destination
        );

        let (pending, completion) = PendingPath::new(request, config.corridor_settings());

        // Record before handing off, so a synchronous answer sees the new baseline.
        self.pending = Some(pending);
        self.policy.record_request(destination, config.path_update_move_threshold, now);
        events.requested = Some(request);

        gateway.request_path(request, completion);
    }

    fn poll_pending(&mut self, config: &MovementConfig, now: Duration, events: &mut TickEvents) {
        let landed = self.pending.as_ref().and_then(
            |pending| pending.poll().cloned().map(|outcome| (pending.request_id(), outcome))
        );

        let Some((request_id, outcome)) = landed else {
            return;
        };

        self.pending = None;

        match outcome {
            PathOutcome::Found(corridor) => {
                #[cfg(feature = "logging")]
                bevy::log::debug!(
                    "Path #{:?} ready with {:?} look points",
                    request_id, corridor.len()
                );

                self.corridor = Some(corridor.clone());
                self.follower.start();
                self.hold = None;
                events.resolved.push(PathResolution::Ready { request_id, corridor });
            },
            PathOutcome::Failed(reason) => {
                #[cfg(feature = "logging")]
                bevy::log::debug!("Path #{:?} failed: {}", request_id, reason);

                if !self.is_following() {
                    self.hold = Some(Hold::Failed { retry_at: now.saturating_add(config.min_path_update_time) });
                }
                events.resolved.push(PathResolution::Failed { request_id, reason });
            },
        }
    }

    fn follow(&mut self, decision: RepathDecision, agent_position: WorldPosition, mut events: TickEvents) -> MovementOutput {
        let Some(corridor) = self.corridor.as_ref().filter(|_| self.follower.is_following()) else {
            return self.idle_output(decision, events);
        };

        let result = self.follower.advance(corridor, agent_position);

        if result.arrived {
            let destination = corridor.destination();
            events.arrived = Some(destination);
            // The policy's baseline is the destination we asked for, which may
            // differ slightly from where the pathfinder ended the path.
            let target = self.policy.last_request_target().unwrap_or(destination);
            self.hold = Some(Hold::Arrived { target });
        }

        MovementOutput {
            decision,
            steer_target: match result.arrived {
                true => None,
                false => Some(result.steer_target),
            },
            speed_scale: result.speed_scale,
            is_following_path: self.is_following(),
            is_calculating_path: self.is_calculating(),
            events,
        }
    }

    fn idle_output(&self, decision: RepathDecision, events: TickEvents) -> MovementOutput {
        MovementOutput {
            decision,
            steer_target: None,
            speed_scale: MIN_SPEED_SCALE,
            is_following_path: self.is_following(),
            is_calculating_path: self.is_calculating(),
            events,
        }
    }
}


#[cfg(test)]
mod tests {
    use std::sync::Mutex;
    use bevy::math::Vec3;
    use crate::gateway::PathCompletion;
    use super::*;

    fn xz(x: f32, z: f32) -> Vec3 {
        Vec3::new(x, 0., z)
    }

    fn config() -> MovementConfig {
        MovementConfig::builder()
            .set_turn_distance(1.)
            .set_stopping_distance(2.)
            .set_path_update_move_threshold(2.)
            .set_min_path_update_time(Duration::from_millis(200))
            .build()
            .unwrap()
    }

    fn ms(millis: u64) -> Duration {
        Duration::from_millis(millis)
    }

    /// Answers with a straight line to the destination, on the spot.
    fn straight_line(request: PathRequest, completion: PathCompletion) {
        completion.succeed(&[request.destination]);
    }

    /// Holds on to completions for the test to fire by hand.
    #[derive(Default)]
    struct Parked(Mutex<Vec<(PathRequest, PathCompletion)>>);

    impl PathRequestGateway for Parked {
        fn request_path(&self, request: PathRequest, completion: PathCompletion) {
            self.0.lock().unwrap().push((request, completion));
        }
    }

    impl Parked {
        fn take(&self) -> Vec<(PathRequest, PathCompletion)> {
            core::mem::take(&mut *self.0.lock().unwrap())
        }
    }

    #[test]
    fn test_synchronous_gateway_follows_on_the_first_tick() {
        let mut controller = MovementController::new();

        let output = controller.tick(&straight_line, xz(0., 0.), xz(10., 0.), &config(), ms(0));

        assert_eq!(output.decision, RepathDecision::Calculate);
        assert_eq!(output.steer_target, Some(xz(10., 0.)));
        assert_eq!(output.speed_scale, 1.);
        assert!(output.is_following_path);
        assert!(!output.is_calculating_path);
        assert_eq!(output.events.requested.map(|r| r.id), Some(1));
        assert_eq!(output.events.resolved.len(), 1);
        assert_eq!(controller.state(), MovementState::Following);
    }

    #[test]
    fn test_walks_to_the_destination_and_stays_put() {
        let mut controller = MovementController::new();
        let destination = xz(10., 0.);
        let mut position = xz(0., 0.);
        let mut arrivals = 0;

        for tick in 0..40 {
            let output = controller.tick(&straight_line, position, destination, &config(), ms(tick * 100));
            arrivals += output.events.arrived.is_some() as u32;

            if let Some(target) = output.steer_target {
                let step = (target - position).clamp_length_max(0.5 * output.speed_scale.max(0.1));
                position += step;
            }
        }

        assert_eq!(arrivals, 1);
        assert_eq!(controller.state(), MovementState::Idle);
        assert!(position.distance(destination) < 0.1);

        // No fresh requests while resting at the destination.
        let output = controller.tick(&straight_line, position, destination, &config(), ms(10_000));
        assert_eq!(output.decision, RepathDecision::None);
        assert!(output.events.requested.is_none());
    }

    fn walk_to(
        controller: &mut MovementController,
        mut position: Vec3,
        destination: Vec3,
        ticks: core::ops::Range<u64>,
    ) -> (Vec3, u32) {
        let mut requests = 0;

        for tick in ticks {
            let output = controller.tick(&straight_line, position, destination, &config(), ms(tick * 100));
            requests += output.events.requested.is_some() as u32;

            if let Some(target) = output.steer_target {
                position += (target - position).clamp_length_max(0.5 * output.speed_scale.max(0.1));
            }
        }

        (position, requests)
    }

    #[test]
    fn test_walks_back_after_being_pushed_off_the_destination() {
        let mut controller = MovementController::new();
        let destination = xz(10., 0.);

        let (position, _) = walk_to(&mut controller, xz(0., 0.), destination, 0..40);
        assert!(position.distance(destination) < 0.1);
        assert_eq!(controller.state(), MovementState::Idle);

        // Nudges within the rest radius do not trigger a repath...
        let output = controller.tick(&straight_line, xz(11.5, 0.), destination, &config(), ms(4_000));
        assert!(output.events.requested.is_none());

        // ...but being knocked far away does.
        let (position, requests) = walk_to(&mut controller, xz(60., 0.), destination, 41..200);
        assert!(requests >= 1);
        assert!(position.distance(destination) < 0.1, "Agent ended up at {:?}", position);
    }

    #[test]
    fn test_rest_ends_when_the_destination_moves() {
        let mut controller = MovementController::new();

        let (position, _) = walk_to(&mut controller, xz(0., 0.), xz(10., 0.), 0..40);

        let output = controller.tick(&straight_line, position, xz(11., 0.), &config(), ms(4_000));
        assert!(output.events.requested.is_none());

        let output = controller.tick(&straight_line, position, xz(10., 5.), &config(), ms(4_100));
        assert_eq!(output.decision, RepathDecision::Calculate);
        assert_eq!(output.events.requested.map(|r| r.destination), Some(xz(10., 5.)));
        assert!(output.is_following_path);
    }

    #[test]
    fn test_huge_backoff_does_not_overflow() {
        let failing = |_request: PathRequest, completion: PathCompletion| {
            completion.fail();
        };
        let config = MovementConfig::builder()
            .set_min_path_update_time(Duration::MAX)
            .build_unchecked();
        let mut controller = MovementController::new();

        controller.tick(&failing, xz(0., 0.), xz(10., 0.), &config, ms(1_000));
        let output = controller.tick(&failing, xz(0., 0.), xz(10., 0.), &config, ms(2_000));

        assert!(output.events.requested.is_none());
        assert_eq!(controller.state(), MovementState::Idle);
    }

    #[test]
    fn test_no_duplicate_requests_while_calculating() {
        let gateway = Parked::default();
        let mut controller = MovementController::new();

        controller.tick(&gateway, xz(0., 0.), xz(10., 0.), &config(), ms(0));
        assert_eq!(controller.state(), MovementState::Calculating);

        for tick in 1..10 {
            let destination = xz(10. + tick as f32 * 5., 0.);
            let output = controller.tick(&gateway, xz(0., 0.), destination, &config(), ms(tick * 1000));
            assert_eq!(output.decision, RepathDecision::None);
            assert_eq!(output.steer_target, None);
            assert!(output.is_calculating_path);
        }

        assert_eq!(gateway.take().len(), 1);
    }

    #[test]
    fn test_deferred_result_is_picked_up_on_the_next_tick() {
        let gateway = Parked::default();
        let mut controller = MovementController::new();

        controller.tick(&gateway, xz(0., 0.), xz(10., 0.), &config(), ms(0));

        for (request, completion) in gateway.take() {
            completion.succeed(&[xz(5., 0.), request.destination]);
        }

        let output = controller.tick(&gateway, xz(0., 0.), xz(10., 0.), &config(), ms(100));
        assert_eq!(output.decision, RepathDecision::Follow);
        assert_eq!(output.steer_target, Some(xz(5., 0.)));
        assert!(matches!(output.events.resolved[..], [PathResolution::Ready { request_id: 1, .. }]));
        assert_eq!(controller.corridor().map(|c| c.len()), Some(2));
    }

    #[test]
    fn test_keeps_following_the_old_corridor_during_a_repath() {
        let gateway = Parked::default();
        let mut controller = MovementController::new();

        controller.tick(&gateway, xz(0., 0.), xz(10., 0.), &config(), ms(0));
        for (request, completion) in gateway.take() {
            completion.succeed(&[request.destination]);
        }
        controller.tick(&gateway, xz(0., 0.), xz(10., 0.), &config(), ms(100));

        // The destination jumps away; a new request goes out, but we keep moving.
        let output = controller.tick(&gateway, xz(1., 0.), xz(10., 10.), &config(), ms(500));
        assert_eq!(output.decision, RepathDecision::Calculate);
        assert!(output.events.requested.is_some());
        assert_eq!(output.steer_target, Some(xz(10., 0.)));
        assert!(output.is_following_path && output.is_calculating_path);
        assert_eq!(controller.state(), MovementState::Calculating);

        let output = controller.tick(&gateway, xz(2., 0.), xz(10., 10.), &config(), ms(600));
        assert_eq!(output.decision, RepathDecision::Follow);
        assert_eq!(output.steer_target, Some(xz(10., 0.)));
        assert_eq!(gateway.take().len(), 1);
    }

    #[test]
    fn test_failure_returns_to_idle_and_backs_off() {
        let failing = |_request: PathRequest, completion: PathCompletion| {
            completion.fail();
        };
        let mut controller = MovementController::new();

        let output = controller.tick(&failing, xz(0., 0.), xz(10., 0.), &config(), ms(0));
        assert!(matches!(
            output.events.resolved[..],
            [PathResolution::Failed { reason: PathFailure::NotFound, .. }]
        ));
        assert_eq!(output.steer_target, None);
        assert_eq!(controller.state(), MovementState::Idle);

        let output = controller.tick(&failing, xz(0., 0.), xz(10., 0.), &config(), ms(100));
        assert!(output.events.requested.is_none());

        let output = controller.tick(&failing, xz(0., 0.), xz(10., 0.), &config(), ms(200));
        assert!(output.events.requested.is_some());
    }

    #[test]
    fn test_abandoned_request_counts_as_failed() {
        let abandoning = |_request: PathRequest, _completion: PathCompletion| {};
        let mut controller = MovementController::new();

        let output = controller.tick(&abandoning, xz(0., 0.), xz(10., 0.), &config(), ms(0));
        assert!(matches!(
            output.events.resolved[..],
            [PathResolution::Failed { reason: PathFailure::Abandoned, .. }]
        ));
        assert_eq!(controller.state(), MovementState::Idle);
    }

    #[test]
    fn test_result_landing_after_cancel_is_discarded() {
        let gateway = Parked::default();
        let mut controller = MovementController::new();

        controller.tick(&gateway, xz(0., 0.), xz(10., 0.), &config(), ms(0));
        controller.cancel();
        assert_eq!(controller.state(), MovementState::Idle);

        for (request, completion) in gateway.take() {
            assert!(!completion.succeed(&[request.destination]));
        }

        assert!(controller.corridor().is_none());
        assert!(controller.pending_request().is_none());
    }

    #[test]
    fn test_request_ids_increase() {
        let gateway = Parked::default();
        let mut controller = MovementController::new();

        controller.tick(&gateway, xz(0., 0.), xz(10., 0.), &config(), ms(0));
        controller.cancel();
        controller.tick(&gateway, xz(0., 0.), xz(10., 0.), &config(), ms(100));

        let ids: Vec<_> = gateway.take().into_iter().map(|(request, _)| request.id).collect();
        assert_eq!(ids, vec![1, 2]);
    }
}

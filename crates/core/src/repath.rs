/*
This Source Code Form is subject to the terms of the Mozilla Public License, v. 2.0.
If a copy of the MPL was not distributed with this file,
You can obtain one at https://mozilla.org/MPL/2.0/.
*/
//! The RepathPolicy decides, once per tick, whether an agent needs a new path.
//!
//! Path searches are expensive, so we do not want to ask for one every tick.
//! At the same time, an agent chasing a moving target should not keep walking
//! to where the target *used to be*.
//!
//! The policy is a hysteresis filter over the target position: it remembers where
//! the target was when we last asked for a path and only requests a new one once
//! the target has moved further than a threshold from that snapshot (and not more
//! often than the configured minimum update time).

use core::time::Duration;

use bevy::reflect::Reflect;

use crate::types::WorldPosition;

/// What the controller should do this tick.
#[derive(Debug, Clone, Copy, Hash, PartialEq, Eq, Reflect)]
pub enum RepathDecision {
    /// Issue a new path request.
    Calculate,
    /// Keep following the current corridor.
    Follow,
    /// Nothing to do; waiting on a request already in flight.
    None,
}

/// A snapshot of the controller state the policy decides over.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RepathInputs {
    /// Where the agent wants to get to right now.
    pub target: WorldPosition,
    pub is_calculating: bool,
    pub is_following: bool,
    /// Minimum time between two stale-target repaths.
    pub min_path_update_time: Duration,
    pub now: Duration,
}

#[derive(Debug, Clone, Default, PartialEq, Reflect)]
pub struct RepathPolicy {
    last_request_target: Option<WorldPosition>,
    move_threshold_squared: f32,
    last_request_time: Option<Duration>,
}

impl RepathPolicy {
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshots the baseline for staleness checks. Call whenever a request is issued.
    ///
    /// The threshold is squared once here and held until the next request.
    pub fn record_request(&mut self, target: WorldPosition, move_threshold: f32, now: Duration) {
        self.last_request_target = Some(target);
        self.move_threshold_squared = move_threshold * move_threshold;
        self.last_request_time = Some(now);
    }

    pub fn last_request_target(&self) -> Option<WorldPosition> {
        self.last_request_target
    }

    pub fn move_threshold_squared(&self) -> f32 {
        self.move_threshold_squared
    }

    pub fn last_request_time(&self) -> Option<Duration> {
        self.last_request_time
    }

    /// Whether the target has drifted far enough from the last request's target
    /// to make the current corridor stale.
    pub fn is_target_stale(&self, target: WorldPosition) -> bool {
        match self.last_request_target {
            None => true,
            Some(baseline) => target.distance_squared(baseline) > self.move_threshold_squared,
        }
    }

    fn is_throttled(&self, min_path_update_time: Duration, now: Duration) -> bool {
        match self.last_request_time {
            None => false,
            Some(requested_at) => now.saturating_sub(requested_at) < min_path_update_time,
        }
    }

    pub fn should_repath(&self, inputs: &RepathInputs) -> RepathDecision {
        match (inputs.is_calculating, inputs.is_following) {
            (false, false) => RepathDecision::Calculate,
            (false, true) => {
                let wants_new_path = self.is_target_stale(inputs.target)
                    && !self.is_throttled(inputs.min_path_update_time, inputs.now);

                match wants_new_path {
                    true => RepathDecision::Calculate,
                    false => RepathDecision::Follow,
                }
            },
            // Keep moving along the old corridor until the new one lands.
            (true, true) => RepathDecision::Follow,
            (true, false) => RepathDecision::None,
        }
    }
}


#[cfg(test)]
mod tests {
    use bevy::math::Vec3;
    use super::*;

    fn inputs(target: Vec3, is_calculating: bool, is_following: bool, now_secs: u64) -> RepathInputs {
        RepathInputs {
            target,
            is_calculating,
            is_following,
            min_path_update_time: Duration::from_millis(200),
            now: Duration::from_secs(now_secs),
        }
    }

    #[test]
    fn test_idle_agent_calculates() {
        let policy = RepathPolicy::new();
        let decision = policy.should_repath(&inputs(Vec3::ZERO, false, false, 0));
        assert_eq!(decision, RepathDecision::Calculate);
    }

    #[test]
    fn test_no_duplicate_requests_while_one_is_outstanding() {
        let mut policy = RepathPolicy::new();
        policy.record_request(Vec3::ZERO, 0.5, Duration::ZERO);

        for (idx, target) in [Vec3::ZERO, Vec3::new(1., 0., 1.), Vec3::new(100., 5., -40.)].into_iter().enumerate() {
            let decision = policy.should_repath(&inputs(target, true, false, idx as u64 + 10));
            assert_eq!(decision, RepathDecision::None);
        }
    }

    #[test]
    fn test_stale_corridor_is_followed_while_repath_is_in_flight() {
        let mut policy = RepathPolicy::new();
        policy.record_request(Vec3::ZERO, 0.5, Duration::ZERO);

        let decision = policy.should_repath(&inputs(Vec3::new(50., 0., 0.), true, true, 10));
        assert_eq!(decision, RepathDecision::Follow);
    }

    #[test]
    fn test_move_threshold_hysteresis() {
        let mut policy = RepathPolicy::new();
        policy.record_request(Vec3::ZERO, 2., Duration::ZERO);

        // 1^2 + 1^2 = 2 < 4
        let decision = policy.should_repath(&inputs(Vec3::new(1., 0., 1.), false, true, 1));
        assert_eq!(decision, RepathDecision::Follow);

        // 2^2 + 2^2 = 8 > 4
        let decision = policy.should_repath(&inputs(Vec3::new(2., 0., 2.), false, true, 1));
        assert_eq!(decision, RepathDecision::Calculate);
    }

    #[test]
    fn test_baseline_is_the_last_request_not_the_previous_tick() {
        let mut policy = RepathPolicy::new();
        policy.record_request(Vec3::ZERO, 2., Duration::ZERO);

        // Creeping in sub-threshold steps still trips the threshold eventually.
        let mut decisions = Vec::new();
        for step in 1..=5 {
            let target = Vec3::new(step as f32 * 0.5, 0., 0.);
            decisions.push(policy.should_repath(&inputs(target, false, true, 1)));
        }

        assert_eq!(decisions[..4], [RepathDecision::Follow; 4]);
        assert_eq!(decisions[4], RepathDecision::Calculate);
    }

    #[test]
    fn test_stale_target_repaths_are_throttled() {
        let mut policy = RepathPolicy::new();
        policy.record_request(Vec3::ZERO, 0.5, Duration::from_millis(1000));

        let mut tick = inputs(Vec3::new(10., 0., 0.), false, true, 0);

        tick.now = Duration::from_millis(1100);
        assert_eq!(policy.should_repath(&tick), RepathDecision::Follow);

        tick.now = Duration::from_millis(1200);
        assert_eq!(policy.should_repath(&tick), RepathDecision::Calculate);
    }

    #[test]
    fn test_record_request_resets_the_baseline() {
        let mut policy = RepathPolicy::new();
        policy.record_request(Vec3::ZERO, 1., Duration::ZERO);
        assert!(policy.is_target_stale(Vec3::new(3., 0., 0.)));

        policy.record_request(Vec3::new(3., 0., 0.), 1., Duration::from_secs(1));
        assert!(!policy.is_target_stale(Vec3::new(3., 0., 0.5)));
        assert_eq!(policy.move_threshold_squared(), 1.);
    }
}

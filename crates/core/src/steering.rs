/*
This Source Code Form is subject to the terms of the Mozilla Public License, v. 2.0.
If a copy of the MPL was not distributed with this file,
You can obtain one at https://mozilla.org/MPL/2.0/.
*/
//! Small helpers for turning a steer target into an orientation.

use bevy::math::Quat;

use crate::types::WorldPosition;

/// Below this planar distance the agent is considered to be on top of the target.
const MIN_FACING_DISTANCE_SQUARED: f32 = 1e-6;

/// The yaw-only rotation that makes a -Z-forward agent at `from` face `target`.
///
/// Returns None if the target is (near enough) straight above or below the agent.
pub fn facing(from: WorldPosition, target: WorldPosition) -> Option<Quat> {
    let dx = target.x - from.x;
    let dz = target.z - from.z;

    if dx * dx + dz * dz < MIN_FACING_DISTANCE_SQUARED {
        return None;
    }

    Some(Quat::from_rotation_y(f32::atan2(-dx, -dz)))
}

/// Rotates `current` towards facing `target`, at `turn_speed` per second.
///
/// The target is levelled with the agent first, so the agent never pitches.
pub fn turn_towards(
    current: Quat,
    from: WorldPosition,
    target: WorldPosition,
    turn_speed: f32,
    delta_seconds: f32,
) -> Quat {
    match facing(from, target) {
        None => current,
        Some(desired) => current.slerp(desired, (turn_speed * delta_seconds).clamp(0., 1.)),
    }
}


#[cfg(test)]
mod tests {
    use bevy::math::Vec3;
    use super::*;

    #[test]
    fn test_facing_points_forward_at_target() {
        let from = Vec3::new(1., 0., 1.);

        for target in [Vec3::new(5., 0., 1.), Vec3::new(1., 7., -3.), Vec3::new(-2., -1., 4.)] {
            let rotation = facing(from, target).unwrap();
            let forward = rotation * Vec3::NEG_Z;

            let mut expected = target - from;
            expected.y = 0.;
            assert!(forward.distance(expected.normalize()) < 1e-5, "{:?} vs {:?}", forward, expected);
        }
    }

    #[test]
    fn test_target_overhead_keeps_orientation() {
        let current = Quat::from_rotation_y(0.3);
        let turned = turn_towards(current, Vec3::ZERO, Vec3::new(0., 5., 0.), 3., 0.1);
        assert_eq!(turned, current);
    }

    #[test]
    fn test_turning_is_gradual_then_complete() {
        let from = Vec3::ZERO;
        let target = Vec3::new(10., 0., 0.);

        let partial = turn_towards(Quat::IDENTITY, from, target, 1., 0.25);
        let full = turn_towards(Quat::IDENTITY, from, target, 10., 1.);

        assert!((partial * Vec3::NEG_Z).distance(Vec3::X) > 0.1);
        assert!((full * Vec3::NEG_Z).distance(Vec3::X) < 1e-4);
    }
}

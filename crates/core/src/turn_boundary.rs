/*
This Source Code Form is subject to the terms of the Mozilla Public License, v. 2.0.
If a copy of the MPL was not distributed with this file,
You can obtain one at https://mozilla.org/MPL/2.0/.
*/
//! Turn boundaries - the lines an agent has to cross before it aims at the next waypoint.

use bevy::math::Vec2;
use bevy::reflect::Reflect;

use crate::types::PlanarPosition;

/// An oriented line on the movement plane.
///
/// The line passes through `point` and is perpendicular to `normal`.
/// `normal` points in the direction of travel, so any position on the far
/// side of the line (or on the line itself) counts as crossed.
///
/// A boundary with a zero normal is degenerate: it sits on a waypoint the
/// agent started on, so it counts as crossed from everywhere.
#[derive(Debug, Clone, Copy, PartialEq, Reflect)]
pub struct TurnBoundary {
    point: PlanarPosition,
    normal: Vec2,
}

impl TurnBoundary {
    /// Creates a boundary through `point`, facing `direction`.
    /// The direction does not need to be normalized; a zero direction
    /// produces a degenerate boundary.
    pub fn new(point: PlanarPosition, direction: Vec2) -> Self {
        Self {
            point,
            normal: direction.normalize_or_zero(),
        }
    }

    pub fn point(&self) -> PlanarPosition {
        self.point
    }

    pub fn normal(&self) -> Vec2 {
        self.normal
    }

    pub fn is_degenerate(&self) -> bool {
        self.normal == Vec2::ZERO
    }

    /// Signed distance of `position` past the line; negative while approaching.
    #[inline]
    fn signed_distance(&self, position: PlanarPosition) -> f32 {
        (position - self.point).dot(self.normal)
    }

    /// Whether `position` lies on the line or beyond it.
    #[inline]
    pub fn has_crossed(&self, position: PlanarPosition) -> bool {
        self.is_degenerate() || self.signed_distance(position) >= 0.
    }

    /// Unsigned distance from `position` to the line.
    ///
    /// For a degenerate boundary this is the distance to its point instead.
    #[inline]
    pub fn distance_from_point(&self, position: PlanarPosition) -> f32 {
        match self.is_degenerate() {
            true => position.distance(self.point),
            false => self.signed_distance(position).abs(),
        }
    }

    /// A drawable segment of this boundary, `half_length` to either side of its point.
    pub fn segment(&self, half_length: f32) -> (PlanarPosition, PlanarPosition) {
        let along = self.normal.perp() * half_length;
        (self.point - along, self.point + along)
    }
}


#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_crossing_is_inclusive() {
        let boundary = TurnBoundary::new(Vec2::new(9., 0.), Vec2::X);

        assert!(!boundary.has_crossed(Vec2::new(8.99, 0.)));
        assert!(boundary.has_crossed(Vec2::new(9., 0.)));
        assert!(boundary.has_crossed(Vec2::new(9., 50.)));
        assert!(boundary.has_crossed(Vec2::new(12., -3.)));
    }

    #[test]
    fn test_direction_is_normalized() {
        let boundary = TurnBoundary::new(Vec2::ZERO, Vec2::new(0., 4.));
        assert_eq!(boundary.normal(), Vec2::Y);
        assert!((boundary.distance_from_point(Vec2::new(7., -3.)) - 3.).abs() < 1e-6);
    }

    #[test]
    fn test_degenerate_boundary_is_always_crossed() {
        let boundary = TurnBoundary::new(Vec2::new(1., 1.), Vec2::ZERO);

        assert!(boundary.is_degenerate());
        assert!(boundary.has_crossed(Vec2::new(-100., -100.)));
        assert!((boundary.distance_from_point(Vec2::new(4., 5.)) - 5.).abs() < 1e-6);
    }

    #[test]
    fn test_segment_is_perpendicular_to_normal() {
        let boundary = TurnBoundary::new(Vec2::new(2., 0.), Vec2::X);
        let (a, b) = boundary.segment(1.);

        assert!((b - a).dot(boundary.normal()).abs() < 1e-6);
        assert!((a.distance(b) - 2.).abs() < 1e-6);
    }
}

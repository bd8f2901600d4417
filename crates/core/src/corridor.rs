/*
This Source Code Form is subject to the terms of the Mozilla Public License, v. 2.0.
If a copy of the MPL was not distributed with this file,
You can obtain one at https://mozilla.org/MPL/2.0/.
*/
//! PathCorridors - the processed, immutable form of a pathfinder's waypoint list.
//!
//! A raw waypoint list is not particularly pleasant to follow. Snapping to each
//! waypoint in turn makes agents walk in jagged lines and stop dead at every corner.
//!
//! The corridor enriches the waypoints with two pieces of derived geometry:
//!
//! 1) A TurnBoundary per waypoint, pulled back along the incoming segment by
//!    the turn distance and facing the bisector of the corner. Once the agent
//!    crosses it, it starts aiming at the next waypoint. This produces turning
//!    *before* the corner rather than point-snapping on top of it.
//!
//! 2) A slow-down index, past which the agent ramps its speed down towards the
//!    final destination over the configured stopping distance.
//!
//! Corridors are built once per successful path result (potentially off the main
//! thread, inside the pathfinder's completion callback) and never mutated again.
//! A newer result replaces the whole corridor.

use bevy::math::Vec2;

use crate::turn_boundary::TurnBoundary;
use crate::types::{planar, PlanarPosition, WorldPosition};

/// If the incoming direction and the bisector are less aligned than this
/// (a turn sharper than ~168 degrees), the boundary faces the incoming direction.
const MIN_BISECTOR_ALIGNMENT: f32 = 0.1;

/// The parts of the agent's MovementConfig that shape a corridor.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CorridorSettings {
    pub turn_distance: f32,
    pub stopping_distance: f32,
}

#[derive(Debug, Clone, PartialEq)]
pub struct PathCorridor {
    look_points: Vec<WorldPosition>,
    turn_boundaries: Vec<TurnBoundary>,
    slow_down_index: usize,
    finish_line_index: usize,
    settings: CorridorSettings,
}

impl PathCorridor {
    /// Builds a corridor from a pathfinder's waypoints.
    ///
    /// `start` is where the agent stood when it requested the path. It is not
    /// part of the corridor, but orients the first boundary.
    ///
    /// An empty waypoint list is treated as 'already there' and produces a
    /// single-point corridor at `start`.
    pub fn new(waypoints: &[WorldPosition], start: WorldPosition, settings: CorridorSettings) -> Self {
        let look_points = match waypoints.is_empty() {
            true => vec![start],
            false => waypoints.to_vec(),
        };

        let finish_line_index = look_points.len() - 1;
        let turn_boundaries = build_turn_boundaries(&look_points, planar(start), settings.turn_distance);
        let slow_down_index = find_slow_down_index(&look_points, settings.stopping_distance);

        Self {
            look_points,
            turn_boundaries,
            slow_down_index,
            finish_line_index,
            settings,
        }
    }

    pub fn look_points(&self) -> &[WorldPosition] {
        &self.look_points
    }

    pub fn turn_boundaries(&self) -> &[TurnBoundary] {
        &self.turn_boundaries
    }

    pub fn look_point(&self, index: usize) -> Option<WorldPosition> {
        self.look_points.get(index).copied()
    }

    pub fn turn_boundary(&self, index: usize) -> Option<&TurnBoundary> {
        self.turn_boundaries.get(index)
    }

    /// The boundary through the destination; crossing it means arrival.
    pub fn finish_line(&self) -> &TurnBoundary {
        &self.turn_boundaries[self.finish_line_index]
    }

    pub fn destination(&self) -> WorldPosition {
        self.look_points[self.finish_line_index]
    }

    pub fn slow_down_index(&self) -> usize {
        self.slow_down_index
    }

    pub fn finish_line_index(&self) -> usize {
        self.finish_line_index
    }

    pub fn stopping_distance(&self) -> f32 {
        self.settings.stopping_distance
    }

    pub fn turn_distance(&self) -> f32 {
        self.settings.turn_distance
    }

    /// Number of look points (and, equivalently, turn boundaries).
    pub fn len(&self) -> usize {
        self.look_points.len()
    }

    /// Always false; a corridor holds at least one point.
    pub fn is_empty(&self) -> bool {
        self.look_points.is_empty()
    }
}

fn build_turn_boundaries(
    look_points: &[WorldPosition],
    start: PlanarPosition,
    turn_distance: f32,
) -> Vec<TurnBoundary> {
    let finish_line_index = look_points.len() - 1;
    let mut boundaries = Vec::with_capacity(look_points.len());
    let mut previous = start;
    let mut last_heading = Vec2::ZERO;

    for (idx, look_point) in look_points.iter().enumerate() {
        let current = planar(*look_point);
        let dir_in = (current - previous).normalize_or_zero();

        if dir_in != Vec2::ZERO {
            last_heading = dir_in;
        }

        let boundary = match idx == finish_line_index {
            // The finish line sits right on the destination, facing the last real
            // approach; repeated or stacked end points would otherwise leave it degenerate.
            true => TurnBoundary::new(current, last_heading),
            false => {
                let next = planar(look_points[idx + 1]);
                let dir_out = (next - current).normalize_or_zero();
                TurnBoundary::new(
                    current - dir_in * turn_distance,
                    boundary_facing(dir_in, dir_out),
                )
            }
        };

        boundaries.push(boundary);
        previous = current;
    }

    boundaries
}

/// The direction a corner's boundary faces: the bisector of the turn.
fn boundary_facing(dir_in: Vec2, dir_out: Vec2) -> Vec2 {
    if dir_in == Vec2::ZERO {
        return dir_out;
    }

    let bisector = (dir_in + dir_out).normalize_or_zero();
    match bisector.dot(dir_in) < MIN_BISECTOR_ALIGNMENT {
        true => dir_in,
        false => bisector,
    }
}

/// Walks back from the destination until the accumulated path length exceeds
/// the stopping distance. Paths shorter than that slow down from the very start.
fn find_slow_down_index(look_points: &[WorldPosition], stopping_distance: f32) -> usize {
    let mut distance_from_end = 0.;

    for idx in (1..look_points.len()).rev() {
        distance_from_end += look_points[idx].distance(look_points[idx - 1]);
        if distance_from_end > stopping_distance {
            return idx;
        }
    }

    0
}

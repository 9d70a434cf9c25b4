//! Candidate generation for the route search.

use super::{segment_is_walkable, NodeGrid};
use crate::{Direction, PassabilityMap, Point};

/// Neighbour order on the lattice. Later entries win ties in the open list.
pub const LATTICE_ORDER: [Direction; 8] = [
    Direction::West,
    Direction::East,
    Direction::South,
    Direction::North,
    Direction::Southwest,
    Direction::Northeast,
    Direction::Southeast,
    Direction::Northwest,
];

/// Produces the points reachable from one search point.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum CandidateGenerator {
    /// The point is on the lattice: try all 8 lattice neighbours.
    GridAligned,
    /// The point is inside a lattice cell: try that cell's corners.
    CellCorners { base: Point },
}

impl CandidateGenerator {
    /// Picks the generator for `point`.
    pub fn for_point(point: Point, grid: &NodeGrid) -> Self {
        if grid.is_aligned(point) {
            CandidateGenerator::GridAligned
        } else {
            CandidateGenerator::CellCorners {
                base: grid.cell_base(point),
            }
        }
    }

    /// Walkable candidates from `point`, followed by `goal` when it is in
    /// plain sight.
    pub fn candidates(
        &self,
        point: Point,
        grid: &NodeGrid,
        map: &PassabilityMap,
        goal: Point,
    ) -> Vec<Point> {
        let step = grid.step();
        let raw: Vec<Point> = match *self {
            CandidateGenerator::GridAligned => LATTICE_ORDER
                .iter()
                .map(|direction| {
                    let delta = direction.to_delta();
                    point.translate(delta.x as f32 * step.x, delta.y as f32 * step.y)
                })
                .collect(),
            CandidateGenerator::CellCorners { base } => vec![
                base,
                base.translate(step.x, 0.0),
                base.translate(0.0, step.y),
                base.translate(step.x, step.y),
            ],
        };

        let mut out: Vec<Point> = raw
            .into_iter()
            .filter(|&candidate| segment_is_walkable(map, point, candidate))
            .collect();

        if segment_is_walkable(map, point, goal) {
            out.push(goal);
        }
        out
    }
}

//! # Search Module
//!
//! Best-first route search over a [`PassabilityMap`] with moves that jump a
//! whole node separation at a time.
//!
//! Search points are floats: a pursuer standing between lattice points first
//! heads for a corner of the lattice cell it is in, then continues along the
//! lattice. Any point with a clear straight line to the goal may jump to it
//! directly.

pub mod astar;
pub mod candidates;

pub use astar::*;
pub use candidates::*;

use crate::{PassabilityMap, Point, Position, Rect};
use serde::{Deserialize, Serialize};

/// Lattice the search moves on: node separation plus the lattice anchor.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NodeGrid {
    pub separation: Position,
    pub origin: Point,
}

impl NodeGrid {
    /// Creates a lattice anchored at `(0, 0)`.
    pub fn new(separation: Position) -> Self {
        Self {
            separation: separation.at_least(1),
            origin: Point::new(0.0, 0.0),
        }
    }

    /// Moves the lattice anchor.
    pub fn with_origin(mut self, origin: Point) -> Self {
        self.origin = origin;
        self
    }

    /// Separation as float deltas.
    pub fn step(&self) -> Point {
        Point::from(self.separation)
    }

    /// Whether `point` sits exactly on a lattice point.
    pub fn is_aligned(&self, point: Point) -> bool {
        let step = self.step();
        ((point.x - self.origin.x) / step.x).fract() == 0.0
            && ((point.y - self.origin.y) / step.y).fract() == 0.0
    }

    /// Bottom-left lattice point of the cell containing `point`.
    pub fn cell_base(&self, point: Point) -> Point {
        let step = self.step();
        let rx = (point.x - self.origin.x).rem_euclid(step.x);
        let ry = (point.y - self.origin.y).rem_euclid(step.y);
        Point::new(point.x - rx, point.y - ry)
    }
}

/// Flags a search point can carry.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NodeFlags {
    pub is_exit: bool,
    pub is_dead_end: bool,
}

/// One entry of the per-search arena.
///
/// `parent` indexes the same arena; the start node is its own parent.
#[derive(Debug, Clone, PartialEq)]
pub struct SearchNode {
    pub point: Point,
    /// Hops from the start
    pub g: u32,
    /// Squared distance to the goal
    pub h: f32,
    /// `g² + h`
    pub f: f32,
    pub parent: usize,
    pub flags: NodeFlags,
}

impl SearchNode {
    /// Creates a node and computes its `f`.
    pub fn new(point: Point, g: u32, goal: Point, parent: usize) -> Self {
        let h = point.distance_squared(goal);
        Self {
            point,
            g,
            h,
            f: (g as f32) * (g as f32) + h,
            parent,
            flags: NodeFlags::default(),
        }
    }
}

/// Result of one search.
///
/// A route that did not reach its goal still leads to the last node the
/// search expanded; check [`Route::reached_goal`] before trusting the
/// final waypoint.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Route {
    waypoints: Vec<Point>,
    reached_goal: bool,
    cost: u32,
    expanded: usize,
    ends_at_exit: bool,
}

impl Route {
    /// A route that needs no movement.
    pub fn already_there() -> Self {
        Self {
            reached_goal: true,
            ..Self::default()
        }
    }

    pub(crate) fn from_parts(
        waypoints: Vec<Point>,
        reached_goal: bool,
        cost: u32,
        expanded: usize,
        ends_at_exit: bool,
    ) -> Self {
        Self {
            waypoints,
            reached_goal,
            cost,
            expanded,
            ends_at_exit,
        }
    }

    /// Waypoints from the first move to the end, start excluded.
    pub fn waypoints(&self) -> &[Point] {
        &self.waypoints
    }

    /// Consumes the route, returning its waypoints.
    pub fn into_waypoints(self) -> Vec<Point> {
        self.waypoints
    }

    /// Whether the final waypoint is the requested goal.
    pub fn reached_goal(&self) -> bool {
        self.reached_goal
    }

    /// Hops to the final node (`g` of that node).
    pub fn cost(&self) -> u32 {
        self.cost
    }

    /// Nodes popped from the open list.
    pub fn expanded(&self) -> usize {
        self.expanded
    }

    /// Whether the final waypoint is a marked exit.
    pub fn ends_at_exit(&self) -> bool {
        self.ends_at_exit
    }

    pub fn len(&self) -> usize {
        self.waypoints.len()
    }

    pub fn is_empty(&self) -> bool {
        self.waypoints.is_empty()
    }

    pub fn last(&self) -> Option<Point> {
        self.waypoints.last().copied()
    }
}

/// Whether every cell in the box spanned by `a` and `b` is walkable.
///
/// For moves along one axis this is exactly the straight segment; diagonal
/// moves need the whole box clear so they never cut a wall corner.
///
/// # Examples
///
/// ```
/// use mazechase::{segment_is_walkable, PassabilityMap, Point, Position, Rect};
///
/// let mut map = PassabilityMap::new();
/// map.carve_rect(Rect::from_corners(Position::new(0, 0), Position::new(2, 0)));
///
/// assert!(segment_is_walkable(&map, Point::new(0.0, 0.0), Point::new(2.0, 0.0)));
/// assert!(!segment_is_walkable(&map, Point::new(0.0, 0.0), Point::new(2.0, 1.0)));
/// ```
pub fn segment_is_walkable(map: &PassabilityMap, a: Point, b: Point) -> bool {
    map.is_rect_walkable(Rect::from_corners(a.cell(), b.cell()))
}

/// Searches `map` on a lattice anchored at `(0, 0)`.
///
/// # Examples
///
/// ```
/// use mazechase::{find_route, PassabilityMap, Point, Position, Rect};
///
/// let mut map = PassabilityMap::new();
/// map.carve_rect(Rect::from_corners(Position::new(0, 0), Position::new(4, 4)));
///
/// let route = find_route(&map, Position::new(2, 2), Point::new(0.0, 0.0), Point::new(4.0, 4.0));
/// assert!(route.reached_goal());
/// assert_eq!(route.waypoints(), &[Point::new(4.0, 4.0)]);
/// ```
pub fn find_route(map: &PassabilityMap, separation: Position, start: Point, goal: Point) -> Route {
    AStarPathfinder::new(map, separation).find_route(start, goal)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_alignment_respects_origin() {
        let grid = NodeGrid::new(Position::new(2, 3)).with_origin(Point::new(0.5, 0.5));
        assert!(grid.is_aligned(Point::new(0.5, 0.5)));
        assert!(grid.is_aligned(Point::new(4.5, 6.5)));
        assert!(!grid.is_aligned(Point::new(1.5, 0.5)));
        assert!(!grid.is_aligned(Point::new(0.0, 0.0)));
    }

    #[test]
    fn test_cell_base_handles_negative_offsets() {
        let grid = NodeGrid::new(Position::new(2, 2));
        assert_eq!(grid.cell_base(Point::new(3.0, 1.5)), Point::new(2.0, 0.0));
        assert_eq!(grid.cell_base(Point::new(-0.5, -3.0)), Point::new(-2.0, -4.0));
    }

    #[test]
    fn test_search_node_costs() {
        let node = SearchNode::new(Point::new(1.0, 1.0), 3, Point::new(4.0, 5.0), 0);
        assert_eq!(node.h, 25.0);
        assert_eq!(node.f, 34.0);
    }

    #[test]
    fn test_segment_box_check() {
        let mut map = PassabilityMap::new();
        map.carve_rect(Rect::from_corners(Position::new(0, 0), Position::new(2, 2)));
        map.insert(crate::TileRecord::new(Position::new(1, 1), false));

        assert!(segment_is_walkable(&map, Point::new(0.0, 0.0), Point::new(0.0, 2.0)));
        assert!(!segment_is_walkable(&map, Point::new(0.0, 0.0), Point::new(2.0, 2.0)));
        // Fractional points floor into their cells
        assert!(segment_is_walkable(&map, Point::new(0.5, 0.5), Point::new(2.5, 0.5)));
    }
}

//! A* search over the node lattice.

use super::{CandidateGenerator, NodeFlags, NodeGrid, Route, SearchNode};
use crate::{PassabilityMap, Point, Position};
use log::{trace, warn};
use std::collections::{HashMap, HashSet};

/// Best-first route search on a passability map.
///
/// The open list is a vector sorted by descending `f` and popped from the
/// tail, so among equal scores the most recently added node is expanded
/// first. Costs are hop counts: `g` grows by one per move and `f = g² + h`
/// with `h` the squared distance to the goal.
///
/// # Examples
///
/// ```
/// use mazechase::{AStarPathfinder, PassabilityMap, Point, Position, Rect, TileRecord};
///
/// let mut map = PassabilityMap::new();
/// map.carve_rect(Rect::from_corners(Position::new(0, 0), Position::new(4, 4)));
/// map.insert(TileRecord::new(Position::new(2, 2), false));
///
/// let pathfinder = AStarPathfinder::new(&map, Position::new(2, 2));
/// let route = pathfinder.find_route(Point::new(0.0, 0.0), Point::new(4.0, 4.0));
///
/// assert!(route.reached_goal());
/// assert!(route.len() > 1);
/// assert_eq!(route.cost() as usize, route.len());
/// ```
#[derive(Debug, Clone)]
pub struct AStarPathfinder<'a> {
    map: &'a PassabilityMap,
    grid: NodeGrid,
    markers: HashMap<(u32, u32), NodeFlags>,
}

impl<'a> AStarPathfinder<'a> {
    /// Creates a pathfinder with the lattice anchored at `(0, 0)`.
    pub fn new(map: &'a PassabilityMap, separation: Position) -> Self {
        Self {
            map,
            grid: NodeGrid::new(separation),
            markers: HashMap::new(),
        }
    }

    /// Anchors the lattice at `origin`.
    pub fn with_origin(mut self, origin: Point) -> Self {
        self.grid = self.grid.with_origin(origin);
        self
    }

    /// Attaches exit and dead-end flags to specific points.
    pub fn with_markers(mut self, markers: impl IntoIterator<Item = (Point, NodeFlags)>) -> Self {
        self.markers = markers
            .into_iter()
            .map(|(point, flags)| (point.key(), flags))
            .collect();
        self
    }

    pub fn grid(&self) -> &NodeGrid {
        &self.grid
    }

    fn node(&self, point: Point, g: u32, goal: Point, parent: usize) -> SearchNode {
        let mut node = SearchNode::new(point, g, goal, parent);
        if let Some(flags) = self.markers.get(&point.key()) {
            node.flags = *flags;
        }
        node
    }

    /// Finds a route from `start` to `goal`.
    ///
    /// Never fails: when the goal cannot be reached the route leads to the
    /// last node expanded and [`Route::reached_goal`] is false.
    pub fn find_route(&self, start: Point, goal: Point) -> Route {
        if start.key() == goal.key() {
            return Route::already_there();
        }

        let mut arena = vec![self.node(start, 0, goal, 0)];
        let mut index: HashMap<(u32, u32), usize> = HashMap::new();
        index.insert(start.key(), 0);
        let mut closed: HashSet<(u32, u32)> = HashSet::new();
        let mut open: Vec<usize> = vec![0];
        let mut last = 0;
        let mut expanded = 0;

        while let Some(current) = open.pop() {
            let point = arena[current].point;
            closed.insert(point.key());
            last = current;
            expanded += 1;

            if point.key() == goal.key() {
                return Self::retrace(&arena, current, true, expanded);
            }

            let g = arena[current].g + 1;
            let generator = CandidateGenerator::for_point(point, &self.grid);

            for candidate in generator.candidates(point, &self.grid, self.map, goal) {
                let key = candidate.key();
                if closed.contains(&key) {
                    continue;
                }

                match index.get(&key) {
                    Some(&existing) => {
                        // f keeps its first value; only the cheaper parent is taken
                        if g < arena[existing].g {
                            arena[existing].g = g;
                            arena[existing].parent = current;
                        }
                    }
                    None => {
                        arena.push(self.node(candidate, g, goal, current));
                        let added = arena.len() - 1;
                        index.insert(key, added);
                        open.push(added);
                    }
                }
            }

            open.sort_by(|&a, &b| arena[b].f.total_cmp(&arena[a].f));
            trace!(
                "Expanded {} (g {}), {} open, {} closed",
                point,
                arena[current].g,
                open.len(),
                closed.len()
            );
        }

        warn!(
            "No route from {} to {}; stopping at {} after {} expansions",
            start, goal, arena[last].point, expanded
        );
        Self::retrace(&arena, last, false, expanded)
    }

    fn retrace(arena: &[SearchNode], end: usize, reached_goal: bool, expanded: usize) -> Route {
        let mut waypoints = Vec::new();
        let mut current = end;
        while current != 0 {
            waypoints.push(arena[current].point);
            current = arena[current].parent;
        }
        waypoints.reverse();

        Route::from_parts(
            waypoints,
            reached_goal,
            arena[end].g,
            expanded,
            arena[end].flags.is_exit,
        )
    }
}

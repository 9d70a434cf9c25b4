//! # Topology Carving
//!
//! Randomized iterative depth-first carving of the connected path skeleton.
//!
//! Candidates are one node separation away from the current cell. A candidate
//! is accepted only when the straight walk to it stays in bounds and crosses no
//! visited cell, which lets a walk pass next to an existing corridor without
//! being rejected just because its target was seen before. When a cell is
//! finally popped unvisited, the segment back to the cell it was reached from
//! is committed.

use super::{utils, BuildStage, MazeCanvas, MazeNode};
use crate::{Cell, Direction, MazeError, MazeResult, Position};
use log::debug;
use rand::rngs::StdRng;

/// Carves the base skeleton from a seed cell.
#[derive(Debug, Clone, Default)]
pub struct TopologyBuilder {
    /// Fixed seed cell; a random in-bounds cell is used when `None`
    pub start: Option<Position>,
}

impl TopologyBuilder {
    /// Creates a builder that picks a random seed cell.
    pub fn new() -> Self {
        Self { start: None }
    }

    /// Creates a builder that starts from a fixed cell (clamped into bounds).
    pub fn with_start(start: Position) -> Self {
        Self { start: Some(start) }
    }

    /// Whether the straight walk from `from` to `to` leaves the bounds or hits
    /// a visited cell. The starting cell itself is not checked.
    fn collides(
        &self,
        canvas: &MazeCanvas,
        from: Position,
        to: Position,
        direction: Direction,
    ) -> bool {
        let mut current = from;
        while current != to {
            current = current.step(direction, 1);
            if !canvas.is_in_bounds(current) || canvas.visited.is_set(current) {
                return true;
            }
        }
        false
    }

    /// Runs the carving loop from `start`.
    pub fn carve(&self, canvas: &mut MazeCanvas, start: Position, rng: &mut StdRng) {
        let mut stack = vec![Cell::new(start)];
        let mut directions = Direction::CARDINAL;
        let extent = canvas.corridor_extent();

        while let Some(current) = stack.pop() {
            utils::shuffle(&mut directions, rng);

            for &direction in &directions {
                let distance = direction.axis_length(canvas.separation);
                let next = current.position.step(direction, distance);

                if canvas.is_in_bounds(next)
                    && !self.collides(canvas, current.position, next, direction)
                {
                    stack.push(Cell::reached_from(next, current.position));
                }
            }

            if !canvas.visited.is_set(current.position) {
                canvas.carve(current.segment(extent));
                canvas.nodes.push(MazeNode::new(current.position));
                canvas.extend_extents(current.position);
            }

            canvas.visited.set(current.position);
        }
    }

    fn seed_cell(&self, canvas: &MazeCanvas, rng: &mut StdRng) -> Position {
        let size = canvas.config.maze_size;
        match self.start {
            Some(start) => start
                .max(Position::origin())
                .min(size - Position::splat(1)),
            None => utils::random_cell(size, rng),
        }
    }
}

impl BuildStage for TopologyBuilder {
    fn apply(&self, canvas: &mut MazeCanvas, rng: &mut StdRng) -> MazeResult<()> {
        let start = self.seed_cell(canvas, rng);
        canvas.seed_cell = Some(start);
        self.carve(canvas, start, rng);

        debug!(
            "Carved skeleton from {}: {} nodes, extents {}..{}",
            start,
            canvas.nodes.len(),
            canvas.bottom_left,
            canvas.top_right
        );
        Ok(())
    }

    fn validate(&self, canvas: &MazeCanvas) -> MazeResult<()> {
        if canvas.nodes.is_empty() {
            return Err(MazeError::GenerationFailed(
                "Topology carving produced no nodes".to_string(),
            ));
        }
        utils::validate_canvas(canvas)
    }

    fn stage_name(&self) -> &'static str {
        "TopologyBuilder"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{MazeConfig, Rect};
    use rand::SeedableRng;
    use std::collections::HashSet;

    fn carve(config: &MazeConfig, start: Position, seed: u64) -> MazeCanvas {
        let mut canvas = MazeCanvas::new(config);
        let mut rng = StdRng::seed_from_u64(seed);
        TopologyBuilder::with_start(start)
            .apply(&mut canvas, &mut rng)
            .unwrap();
        canvas
    }

    #[test]
    fn test_single_cell_maze() {
        let mut config = MazeConfig::for_testing(1);
        config.maze_size = Position::new(1, 1);
        let canvas = carve(&config, Position::new(0, 0), 1);

        assert_eq!(canvas.nodes.len(), 1);
        assert!(canvas.map.is_path(0, 0));
        assert_eq!(canvas.bottom_left, Position::new(0, 0));
        assert_eq!(canvas.top_right, Position::new(0, 0));
    }

    #[test]
    fn test_every_lattice_point_is_carved() {
        let config = MazeConfig::for_testing(3);
        let start = Position::new(4, 6);
        let canvas = carve(&config, start, 3);

        // Separation is 2 on both axes, so the lattice is every even cell here
        let mut expected = HashSet::new();
        for y in (0..11).filter(|y| y % 2 == 0) {
            for x in (0..11).filter(|x| x % 2 == 0) {
                expected.insert(Position::new(x, y));
            }
        }
        let nodes: HashSet<_> = canvas.nodes.iter().map(|n| n.position).collect();
        assert_eq!(nodes, expected);
        assert_eq!(canvas.nodes.len(), expected.len());
    }

    #[test]
    fn test_skeleton_is_a_spanning_tree() {
        let config = MazeConfig::for_testing(11);
        let canvas = carve(&config, Position::new(0, 0), 11);

        // Width-1 corridors on a 6x6 lattice: a tree has nodes + (nodes - 1) cells
        let nodes = canvas.nodes.len();
        assert_eq!(nodes, 36);
        assert_eq!(canvas.map.path_count(), nodes + nodes - 1);
    }

    #[test]
    fn test_wide_corridors_fill_segments() {
        let mut config = MazeConfig::for_testing(5);
        config.path_width = Position::new(2, 2);
        let canvas = carve(&config, Position::new(0, 0), 5);

        // Each node owns a 2x2 corridor block
        for node in &canvas.nodes {
            let block = Rect::from_corners(node.position, node.position + Position::splat(1));
            assert!(canvas.map.is_rect_walkable(block));
        }
    }

    #[test]
    fn test_same_seed_same_skeleton() {
        let config = MazeConfig::for_testing(8);
        let a = carve(&config, Position::new(2, 2), 99);
        let b = carve(&config, Position::new(2, 2), 99);
        assert_eq!(a.map, b.map);
        assert_eq!(a.nodes, b.nodes);
    }

    #[test]
    fn test_start_is_clamped_into_bounds() {
        let config = MazeConfig::for_testing(2);
        let canvas = carve(&config, Position::new(50, -3), 2);
        assert_eq!(canvas.seed_cell, Some(Position::new(10, 0)));
    }

    #[test]
    fn test_collision_check_walks_every_cell() {
        let config = MazeConfig::for_testing(1);
        let mut canvas = MazeCanvas::new(&config);
        canvas.visited.set(Position::new(1, 0));
        let builder = TopologyBuilder::new();

        assert!(builder.collides(&canvas, Position::new(0, 0), Position::new(2, 0), Direction::East));
        assert!(!builder.collides(&canvas, Position::new(0, 0), Position::new(0, 2), Direction::North));
        assert!(builder.collides(&canvas, Position::new(0, 0), Position::new(0, -2), Direction::South));
    }
}

//! # Extra Solutions
//!
//! Punches additional corridors between adjacent carved nodes so the maze has
//! more than one route between most points.

use super::{utils, BuildStage, MazeCanvas};
use crate::{Direction, MazeResult, Position};
use log::{debug, warn};
use rand::rngs::StdRng;
use rand::Rng;
use std::collections::HashSet;

/// Random attempts per node before falling back to a scan.
const ATTEMPTS_PER_NODE: usize = 8;

/// Upper bound on extra connections for `node_count` nodes: `floor(n / 2.5)`.
///
/// # Examples
///
/// ```
/// use mazechase::max_connections;
///
/// assert_eq!(max_connections(4), 1);
/// assert_eq!(max_connections(10), 4);
/// assert_eq!(max_connections(0), 0);
/// ```
pub fn max_connections(node_count: usize) -> usize {
    node_count * 2 / 5
}

/// Adds extra connections between node pairs.
///
/// Each node takes part in at most one extra connection.
#[derive(Debug, Clone, Default)]
pub struct SolutionAugmenter;

impl SolutionAugmenter {
    /// Creates a new augmenter.
    pub fn new() -> Self {
        Self
    }

    /// Number of connections this canvas will receive.
    pub fn target(canvas: &MazeCanvas) -> usize {
        let requested = canvas.config.extra_solutions.max(0) as usize;
        requested.min(max_connections(canvas.nodes.len()))
    }

    fn neighbor(
        canvas: &MazeCanvas,
        nodes: &HashSet<Position>,
        from: Position,
        direction: Direction,
    ) -> Option<Position> {
        let next = from.step(direction, direction.axis_length(canvas.separation));
        (canvas.is_in_bounds(next) && nodes.contains(&next)).then_some(next)
    }

    fn random_pair(
        canvas: &MazeCanvas,
        nodes: &HashSet<Position>,
        used: &HashSet<Position>,
        rng: &mut StdRng,
    ) -> Option<(Position, Position)> {
        let a = canvas.nodes[rng.gen_range(0..canvas.nodes.len())].position;
        if used.contains(&a) {
            return None;
        }

        let mut directions = Direction::CARDINAL;
        utils::shuffle(&mut directions, rng);
        let b = directions
            .iter()
            .find_map(|&direction| Self::neighbor(canvas, nodes, a, direction))?;

        (!used.contains(&b)).then_some((a, b))
    }

    fn scan_pair(
        canvas: &MazeCanvas,
        nodes: &HashSet<Position>,
        used: &HashSet<Position>,
    ) -> Option<(Position, Position)> {
        canvas
            .nodes
            .iter()
            .map(|node| node.position)
            .filter(|a| !used.contains(a))
            .find_map(|a| {
                Direction::CARDINAL.iter().find_map(|&direction| {
                    Self::neighbor(canvas, nodes, a, direction)
                        .filter(|b| !used.contains(b))
                        .map(|b| (a, b))
                })
            })
    }
}

impl BuildStage for SolutionAugmenter {
    fn apply(&self, canvas: &mut MazeCanvas, rng: &mut StdRng) -> MazeResult<()> {
        let target = Self::target(canvas);
        if target == 0 {
            canvas.extra_connections = 0;
            return Ok(());
        }

        let nodes: HashSet<Position> = canvas.nodes.iter().map(|n| n.position).collect();
        let mut used = HashSet::new();
        let mut attempts = canvas.nodes.len() * ATTEMPTS_PER_NODE;
        let mut made = 0;

        while made < target {
            let pair = if attempts > 0 {
                attempts -= 1;
                match Self::random_pair(canvas, &nodes, &used, rng) {
                    Some(pair) => Some(pair),
                    None => continue,
                }
            } else {
                Self::scan_pair(canvas, &nodes, &used)
            };

            let Some((a, b)) = pair else {
                warn!(
                    "Only {} of {} extra connections fit; no free node pair left",
                    made, target
                );
                break;
            };

            used.insert(a);
            used.insert(b);
            let corridor = canvas.corridor_between(a, b);
            canvas.carve(corridor);
            made += 1;
        }

        canvas.extra_connections = made;
        debug!("Added {} extra connections (target {})", made, target);
        Ok(())
    }

    fn stage_name(&self) -> &'static str {
        "SolutionAugmenter"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{MazeConfig, TopologyBuilder};
    use rand::SeedableRng;

    fn augmented(config: &MazeConfig, seed: u64) -> MazeCanvas {
        let mut canvas = MazeCanvas::new(config);
        let mut rng = StdRng::seed_from_u64(seed);
        TopologyBuilder::with_start(Position::new(0, 0))
            .apply(&mut canvas, &mut rng)
            .unwrap();
        SolutionAugmenter::new().apply(&mut canvas, &mut rng).unwrap();
        canvas
    }

    #[test]
    fn test_max_connections() {
        assert_eq!(max_connections(1), 0);
        assert_eq!(max_connections(2), 0);
        assert_eq!(max_connections(3), 1);
        assert_eq!(max_connections(36), 14);
    }

    #[test]
    fn test_request_is_capped_by_node_count() {
        let mut config = MazeConfig::for_testing(3);
        config.maze_size = Position::new(3, 3);
        config.extra_solutions = 100;
        let canvas = augmented(&config, 3);

        assert_eq!(canvas.nodes.len(), 4);
        assert_eq!(canvas.extra_connections, 1);
    }

    #[test]
    fn test_zero_request_leaves_tree_untouched() {
        let mut config = MazeConfig::for_testing(4);
        config.extra_solutions = 0;
        let canvas = augmented(&config, 4);

        assert_eq!(canvas.extra_connections, 0);
        assert_eq!(canvas.map.path_count(), 71);
    }

    #[test]
    fn test_large_request_never_exceeds_cap() {
        let mut config = MazeConfig::for_testing(9);
        config.extra_solutions = 500;
        let canvas = augmented(&config, 9);

        assert_eq!(SolutionAugmenter::target(&canvas), 14);
        assert!(canvas.extra_connections >= 1);
        assert!(canvas.extra_connections <= 14);
    }

    #[test]
    fn test_connections_open_corridors() {
        let mut config = MazeConfig::for_testing(12);
        config.extra_solutions = 5;
        let canvas = augmented(&config, 12);

        // Each connection opens at most one extra wall cell
        assert_eq!(canvas.extra_connections, 5);
        assert!(canvas.map.path_count() >= 71);
        assert!(canvas.map.path_count() <= 71 + 5);
    }
}

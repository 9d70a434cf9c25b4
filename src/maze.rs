//! # Maze
//!
//! Runs the build stages in order and exposes the finished maze read-only.
//!
//! A maze is rebuilt from scratch by [`Maze::generate`]; nothing carries over
//! between builds.

use crate::generation::utils;
use crate::{
    AStarPathfinder, BuildStage, ExitFootprint, ExitPlacer, ExitPlan, MazeCanvas, MazeConfig,
    MazeError, MazeNode, MazeResult, NodeFlags, PassabilityMap, Point, Position, Rect, Route,
    RouteSource, SideCounts, SolutionAugmenter, SpawnAreaCarver, TopologyBuilder, VisitedGrid,
};
use log::{debug, info};
use pathfinding::prelude::bfs_reach;
use rand::rngs::StdRng;
use rand::Rng;
use serde::{Deserialize, Serialize};

/// Build-time geometry of a maze.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MazeGeometry {
    pub maze_size: Position,
    /// Effective path width (corridor plus the wall it replaces)
    pub step: Position,
    pub wall: Position,
    pub separation: Position,
    pub border_width: i32,
    pub vertical_padding: i32,
    pub bottom_left: Position,
    pub top_right: Position,
    pub exit_plan: ExitPlan,
    pub exit_footprints: Vec<ExitFootprint>,
}

/// Serializable overview of a generated maze.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MazeSummary {
    pub seed: Option<u64>,
    pub seed_cell: Position,
    pub bottom_left: Position,
    pub top_right: Position,
    pub inner_size: Position,
    pub outer_size: Position,
    pub separation: Position,
    pub path_cells: usize,
    pub node_count: usize,
    pub dead_ends: usize,
    pub extra_connections: usize,
    pub exits: SideCounts,
    pub exit_footprints: Vec<ExitFootprint>,
    pub spawn_area: Rect,
    pub spawn_centre: Point,
}

/// A generated maze.
///
/// # Examples
///
/// ```
/// use mazechase::{Maze, MazeConfig};
///
/// let maze = Maze::generate(&MazeConfig::for_testing(42)).unwrap();
/// assert!(maze.map().path_count() > 0);
/// assert!(maze.is_path(maze.seed_cell().x, maze.seed_cell().y));
/// ```
#[derive(Debug, Clone)]
pub struct Maze {
    config: MazeConfig,
    geometry: MazeGeometry,
    visited: VisitedGrid,
    map: PassabilityMap,
    /// Map as it was right after topology carving
    skeleton: PassabilityMap,
    /// Topology nodes in commit order, then exit nodes
    nodes: Vec<MazeNode>,
    seed_cell: Position,
    spawn_area: Rect,
    spawn_centre: Point,
    extra_connections: usize,
}

impl Maze {
    /// Builds a maze, seeding the generator from `config.seed`.
    pub fn generate(config: &MazeConfig) -> MazeResult<Self> {
        let mut rng = utils::create_rng(config);
        Self::generate_with_rng(config, &mut rng)
    }

    /// Builds a maze with an injected generator.
    pub fn generate_with_rng(config: &MazeConfig, rng: &mut StdRng) -> MazeResult<Self> {
        Self::build(config, TopologyBuilder::new(), rng)
    }

    /// Builds a maze whose carving starts at `start` (clamped into bounds).
    pub fn generate_from(config: &MazeConfig, start: Position, rng: &mut StdRng) -> MazeResult<Self> {
        Self::build(config, TopologyBuilder::with_start(start), rng)
    }

    fn build(config: &MazeConfig, topology: TopologyBuilder, rng: &mut StdRng) -> MazeResult<Self> {
        let mut canvas = MazeCanvas::new(config);

        Self::run_stage(&topology, &mut canvas, rng)?;
        let skeleton = canvas.map.clone();

        let exits = ExitPlacer::new();
        let solutions = SolutionAugmenter::new();
        let spawn = SpawnAreaCarver::new();
        let stages: [&dyn BuildStage; 3] = [&exits, &solutions, &spawn];
        for stage in stages {
            Self::run_stage(stage, &mut canvas, rng)?;
        }

        let maze = Self::from_canvas(canvas, skeleton)?;
        if maze.config.validate_connectivity {
            maze.validate_connectivity()?;
        }

        info!(
            "Generated {}x{} maze: {} nodes, {} exits, {} extra connections",
            maze.config.maze_size.x,
            maze.config.maze_size.y,
            maze.topology_nodes().count(),
            maze.geometry.exit_footprints.len(),
            maze.extra_connections
        );
        Ok(maze)
    }

    fn run_stage(
        stage: &dyn BuildStage,
        canvas: &mut MazeCanvas,
        rng: &mut StdRng,
    ) -> MazeResult<()> {
        debug!("Running {}", stage.stage_name());
        stage.apply(canvas, rng)?;
        stage.validate(canvas)
    }

    fn from_canvas(canvas: MazeCanvas, skeleton: PassabilityMap) -> MazeResult<Self> {
        let seed_cell = canvas.seed_cell.ok_or_else(|| {
            MazeError::GenerationFailed("Topology stage did not record a seed cell".to_string())
        })?;
        let spawn_area = canvas.spawn_area.ok_or_else(|| {
            MazeError::GenerationFailed("Spawn stage did not record a spawn area".to_string())
        })?;

        let mut nodes = canvas.nodes;
        for node in nodes.iter_mut() {
            node.is_dead_end = Self::is_dead_end(&canvas.map, canvas.separation, node.position);
        }
        nodes.extend(canvas.exit_nodes);

        Ok(Self {
            geometry: MazeGeometry {
                maze_size: canvas.config.maze_size,
                step: canvas.step,
                wall: canvas.wall,
                separation: canvas.separation,
                border_width: canvas.config.border_width,
                vertical_padding: canvas.config.vertical_padding,
                bottom_left: canvas.bottom_left,
                top_right: canvas.top_right,
                exit_plan: canvas.exit_plan,
                exit_footprints: canvas.exit_footprints,
            },
            config: canvas.config,
            visited: canvas.visited,
            map: canvas.map,
            skeleton,
            nodes,
            seed_cell,
            spawn_area,
            spawn_centre: canvas.spawn_centre,
            extra_connections: canvas.extra_connections,
        })
    }

    /// A node with exactly one open corridor to a lattice neighbour.
    fn is_dead_end(map: &PassabilityMap, separation: Position, node: Position) -> bool {
        node.cardinal_neighbors(separation)
            .iter()
            .filter(|&&neighbor| map.is_rect_walkable(Rect::from_corners(node, neighbor)))
            .count()
            == 1
    }

    /// Checks that every cell of the carved skeleton is reachable from the
    /// seed cell.
    pub fn validate_connectivity(&self) -> MazeResult<()> {
        let skeleton = &self.skeleton;
        let reached = bfs_reach(self.seed_cell, |pos: &Position| {
            pos.cardinal_neighbors(Position::splat(1))
                .into_iter()
                .filter(|next| skeleton.is_path_at(*next))
                .collect::<Vec<_>>()
        })
        .count();

        let total = skeleton.path_count();
        if reached != total {
            return Err(MazeError::GenerationFailed(format!(
                "Only {} of {} skeleton cells are reachable from {}",
                reached, total, self.seed_cell
            )));
        }
        Ok(())
    }

    /// Configuration after clamping.
    pub fn config(&self) -> &MazeConfig {
        &self.config
    }

    pub fn geometry(&self) -> &MazeGeometry {
        &self.geometry
    }

    /// Carving grid, sized `maze_size + step`.
    pub fn visited(&self) -> &VisitedGrid {
        &self.visited
    }

    pub fn map(&self) -> &PassabilityMap {
        &self.map
    }

    /// Passability right after topology carving, before exits and loops.
    pub fn skeleton(&self) -> &PassabilityMap {
        &self.skeleton
    }

    /// Whether `(x, y)` is walkable. Unknown coordinates are not.
    pub fn is_path(&self, x: i32, y: i32) -> bool {
        self.map.is_path(x, y)
    }

    /// Whether a cell lies inside the carving area.
    pub fn is_in_bounds(&self, pos: Position) -> bool {
        pos.x >= 0
            && pos.y >= 0
            && pos.x < self.geometry.maze_size.x
            && pos.y < self.geometry.maze_size.y
    }

    /// All nodes: topology nodes in commit order, then exits.
    pub fn nodes(&self) -> &[MazeNode] {
        &self.nodes
    }

    pub fn topology_nodes(&self) -> impl Iterator<Item = &MazeNode> {
        self.nodes.iter().filter(|node| !node.is_exit)
    }

    pub fn exit_nodes(&self) -> impl Iterator<Item = &MazeNode> {
        self.nodes.iter().filter(|node| node.is_exit)
    }

    pub fn exit_footprints(&self) -> &[ExitFootprint] {
        &self.geometry.exit_footprints
    }

    /// Exits actually placed on each side.
    pub fn exits_per_side(&self) -> SideCounts {
        self.geometry.exit_plan.placed
    }

    pub fn exit_plan(&self) -> &ExitPlan {
        &self.geometry.exit_plan
    }

    pub fn bottom_left(&self) -> Position {
        self.geometry.bottom_left
    }

    pub fn top_right(&self) -> Position {
        self.geometry.top_right
    }

    pub fn seed_cell(&self) -> Position {
        self.seed_cell
    }

    pub fn spawn_area(&self) -> Rect {
        self.spawn_area
    }

    pub fn spawn_centre(&self) -> Point {
        self.spawn_centre
    }

    pub fn extra_connections(&self) -> usize {
        self.extra_connections
    }

    /// Distance between adjacent nodes.
    pub fn separation(&self) -> Position {
        self.geometry.separation
    }

    /// Offset from a node to the middle of its corridor block.
    pub fn node_offset(&self) -> Point {
        let extent = self.geometry.step - self.geometry.wall;
        Point::new(extent.x as f32 / 2.0, extent.y as f32 / 2.0)
    }

    /// Where a walker stands when it is "at" a node: the node cell plus the
    /// node offset, in the middle of the cell.
    pub fn navigation_point(&self, node: Position) -> Point {
        let offset = self.node_offset();
        Point::from(node).translate(offset.x + 0.5, offset.y + 0.5)
    }

    /// Navigation points of every node, in node order.
    pub fn navigation_points(&self) -> Vec<Point> {
        self.nodes
            .iter()
            .map(|node| self.navigation_point(node.position))
            .collect()
    }

    /// Lattice anchor for route search: the per-axis minimum navigation point
    /// over the carved nodes.
    pub fn node_origin(&self) -> Point {
        let lowest = self
            .topology_nodes()
            .map(|node| node.position)
            .reduce(Position::min)
            .unwrap_or(self.geometry.bottom_left);
        self.navigation_point(lowest)
    }

    /// Navigation point of a random topology node.
    pub fn random_navigation_point(&self, rng: &mut StdRng) -> Option<Point> {
        let nodes: Vec<&MazeNode> = self.topology_nodes().collect();
        if nodes.is_empty() {
            return None;
        }
        let node = nodes[rng.gen_range(0..nodes.len())];
        Some(self.navigation_point(node.position))
    }

    /// Extent of the carved interior in cells.
    pub fn inner_size(&self) -> Position {
        self.geometry.top_right - self.geometry.bottom_left + Position::splat(1)
    }

    /// Interior plus the border on every side and the vertical padding.
    pub fn outer_size(&self) -> Position {
        let border = self.geometry.border_width;
        self.inner_size()
            + Position::new(2 * border, 2 * border + self.geometry.vertical_padding)
    }

    /// Middle of the carved extents.
    pub fn centre(&self) -> Point {
        let bl = self.geometry.bottom_left;
        let tr = self.geometry.top_right;
        Point::new(
            (tr.x - bl.x) as f32 / 2.0 + bl.x as f32,
            (tr.y - bl.y) as f32 / 2.0 + bl.y as f32,
        )
    }

    /// A pathfinder over this maze, anchored on the node lattice and aware
    /// of exits and dead ends.
    pub fn pathfinder(&self) -> AStarPathfinder<'_> {
        let markers: Vec<(Point, NodeFlags)> = self
            .nodes
            .iter()
            .map(|node| {
                (
                    self.navigation_point(node.position),
                    NodeFlags {
                        is_exit: node.is_exit,
                        is_dead_end: node.is_dead_end,
                    },
                )
            })
            .collect();

        AStarPathfinder::new(&self.map, self.geometry.separation)
            .with_origin(self.node_origin())
            .with_markers(markers)
    }

    /// Finds a route between two points in the maze.
    pub fn find_route(&self, start: Point, goal: Point) -> Route {
        self.pathfinder().find_route(start, goal)
    }

    pub fn summary(&self) -> MazeSummary {
        MazeSummary {
            seed: self.config.seed,
            seed_cell: self.seed_cell,
            bottom_left: self.geometry.bottom_left,
            top_right: self.geometry.top_right,
            inner_size: self.inner_size(),
            outer_size: self.outer_size(),
            separation: self.geometry.separation,
            path_cells: self.map.path_count(),
            node_count: self.nodes.len(),
            dead_ends: self.nodes.iter().filter(|node| node.is_dead_end).count(),
            extra_connections: self.extra_connections,
            exits: self.exits_per_side(),
            exit_footprints: self.geometry.exit_footprints.clone(),
            spawn_area: self.spawn_area,
            spawn_centre: self.spawn_centre,
        }
    }

    /// Summary as pretty JSON.
    pub fn summary_json(&self) -> MazeResult<String> {
        Ok(serde_json::to_string_pretty(&self.summary())?)
    }

    /// Text rendering, top row first.
    ///
    /// `.` floor, `#` anything else, `E` exit node, `S` spawn centre.
    pub fn to_ascii(&self) -> String {
        let Some(bounds) = self.map.bounds() else {
            return String::new();
        };
        let lo = bounds.bottom_left - Position::splat(1);
        let hi = bounds.top_right + Position::splat(1);
        let spawn = self.spawn_centre.cell();

        let mut out = String::new();
        for y in (lo.y..=hi.y).rev() {
            for x in lo.x..=hi.x {
                let pos = Position::new(x, y);
                let glyph = if self.exit_nodes().any(|node| node.position == pos) {
                    'E'
                } else if pos == spawn {
                    'S'
                } else if self.map.is_path_at(pos) {
                    '.'
                } else {
                    '#'
                };
                out.push(glyph);
            }
            out.push('\n');
        }
        out
    }
}

impl RouteSource for Maze {
    fn route(&self, from: Point, to: Point) -> Route {
        self.find_route(from, to)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;

    fn small(seed: u64) -> Maze {
        Maze::generate(&MazeConfig::for_testing(seed)).unwrap()
    }

    #[test]
    fn test_generation_is_reproducible() {
        let a = small(77);
        let b = small(77);
        assert_eq!(a.map(), b.map());
        assert_eq!(a.nodes(), b.nodes());
        assert_eq!(a.seed_cell(), b.seed_cell());
    }

    #[test]
    fn test_skeleton_is_connected() {
        for seed in 0..10 {
            let maze = small(seed);
            maze.validate_connectivity().unwrap();
        }
    }

    #[test]
    fn test_disconnected_skeleton_is_reported() {
        let mut maze = small(3);
        maze.skeleton.insert(crate::TileRecord::path(Position::new(100, 100)));
        assert!(matches!(
            maze.validate_connectivity(),
            Err(MazeError::GenerationFailed(_))
        ));
    }

    #[test]
    fn test_nodes_list_topology_then_exits() {
        let maze = small(5);
        let first_exit = maze.nodes().iter().position(|n| n.is_exit).unwrap();
        assert!(maze.nodes()[first_exit..].iter().all(|n| n.is_exit));
        assert_eq!(maze.exit_nodes().count(), maze.exit_footprints().len());
        assert_eq!(maze.exits_per_side().total() as usize, maze.exit_footprints().len());
    }

    #[test]
    fn test_dead_ends_have_one_open_side() {
        let mut config = MazeConfig::for_testing(21);
        config.extra_solutions = 0;
        config.exits.count = 0;
        let maze = Maze::generate(&config).unwrap();

        // A spanning tree on more than one node always has leaves
        assert!(maze.nodes().iter().any(|n| n.is_dead_end));
        for node in maze.topology_nodes().filter(|n| n.is_dead_end) {
            let open = node
                .position
                .cardinal_neighbors(maze.separation())
                .iter()
                .filter(|&&nb| maze.map().is_rect_walkable(Rect::from_corners(node.position, nb)))
                .count();
            assert_eq!(open, 1);
        }
    }

    #[test]
    fn test_navigation_points_and_origin() {
        let mut config = MazeConfig::for_testing(1);
        config.path_width = Position::new(3, 1);
        config.vertical_padding = 2;
        let mut rng = StdRng::seed_from_u64(1);
        let maze = Maze::generate_from(&config, Position::new(0, 0), &mut rng).unwrap();

        // step (3, 3), wall (1, 1): corridor extent (2, 2), offset (1, 1)
        assert_eq!(maze.node_offset(), Point::new(1.0, 1.0));
        assert_eq!(maze.navigation_point(Position::new(4, 4)), Point::new(5.5, 5.5));

        let points = maze.navigation_points();
        assert_eq!(points.len(), maze.nodes().len());
        assert_eq!(points[0], maze.navigation_point(maze.nodes()[0].position));

        let origin = maze.node_origin();
        for node in maze.topology_nodes() {
            let point = maze.navigation_point(node.position);
            assert!(point.x >= origin.x && point.y >= origin.y);
        }
        for node in maze.topology_nodes() {
            let cell = maze.navigation_point(node.position).cell();
            assert!(maze.is_path(cell.x, cell.y));
        }
    }

    #[test]
    fn test_sizes_and_centre() {
        let maze = small(8);
        let inner = maze.inner_size();
        assert_eq!(inner, maze.top_right() - maze.bottom_left() + Position::splat(1));
        assert_eq!(maze.outer_size(), inner + Position::new(2, 2));

        let centre = maze.centre();
        assert!(centre.x >= maze.bottom_left().x as f32 && centre.x <= maze.top_right().x as f32);
        assert!(centre.y >= maze.bottom_left().y as f32 && centre.y <= maze.top_right().y as f32);
    }

    #[test]
    fn test_routes_between_random_nodes_complete() {
        let maze = small(13);
        let mut rng = StdRng::seed_from_u64(13);
        for _ in 0..20 {
            let a = maze.random_navigation_point(&mut rng).unwrap();
            let b = maze.random_navigation_point(&mut rng).unwrap();
            let route = maze.find_route(a, b);
            assert!(route.reached_goal(), "no route from {} to {}", a, b);
            if a != b {
                assert_eq!(route.last(), Some(b));
            }
        }
    }

    #[test]
    fn test_route_from_spawn_to_an_exit() {
        let maze = small(31);
        let exit = maze.exit_nodes().next().unwrap().position;
        let route = maze.find_route(maze.navigation_point(maze.seed_cell()), maze.navigation_point(exit));
        assert!(route.reached_goal());
        assert!(route.ends_at_exit());
    }

    #[test]
    fn test_summary_and_ascii() {
        let maze = small(2);
        let summary = maze.summary();
        assert_eq!(summary.path_cells, maze.map().path_count());
        assert_eq!(summary.node_count, maze.nodes().len());

        let json = maze.summary_json().unwrap();
        let parsed: MazeSummary = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, summary);

        let ascii = maze.to_ascii();
        let rows: Vec<&str> = ascii.lines().collect();
        let bounds = maze.map().bounds().unwrap();
        assert_eq!(rows.len() as i32, bounds.height() + 2);
        assert!(rows.iter().all(|row| row.len() as i32 == bounds.width() + 2));
        assert!(ascii.contains('E'));
        assert!(ascii.contains('S'));
    }
}

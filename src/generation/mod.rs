//! # Generation Module
//!
//! Procedural maze construction: topology carving, exit placement, extra
//! solutions and the spawn clearing.
//!
//! Every stage works on a shared [`MazeCanvas`] and draws randomness from an
//! injected [`StdRng`], so a fixed seed reproduces the same maze. The stages
//! are run in order by [`crate::Maze::generate`].

pub mod exits;
pub mod solutions;
pub mod spawn;
pub mod topology;

pub use exits::*;
pub use solutions::*;
pub use spawn::*;
pub use topology::*;

use crate::{config, MazeError, MazeResult, PassabilityMap, Point, Position, Rect, VisitedGrid};
use rand::rngs::StdRng;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// One side of the maze perimeter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Side {
    North,
    South,
    East,
    West,
}

impl Side {
    /// All four sides in canonical order.
    pub const ALL: [Side; 4] = [Side::North, Side::South, Side::East, Side::West];

    /// Whether exits on this side are spaced along the x axis.
    pub fn runs_along_x(self) -> bool {
        matches!(self, Side::North | Side::South)
    }
}

/// Per-side exit counts.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SideCounts {
    pub north: i32,
    pub south: i32,
    pub east: i32,
    pub west: i32,
}

impl SideCounts {
    /// Creates counts in north, south, east, west order.
    pub fn new(north: i32, south: i32, east: i32, west: i32) -> Self {
        Self {
            north,
            south,
            east,
            west,
        }
    }

    /// Count for one side.
    pub fn get(&self, side: Side) -> i32 {
        match side {
            Side::North => self.north,
            Side::South => self.south,
            Side::East => self.east,
            Side::West => self.west,
        }
    }

    /// Mutable count for one side.
    pub fn get_mut(&mut self, side: Side) -> &mut i32 {
        match side {
            Side::North => &mut self.north,
            Side::South => &mut self.south,
            Side::East => &mut self.east,
            Side::West => &mut self.west,
        }
    }

    /// Sum over all sides.
    pub fn total(&self) -> i32 {
        self.north + self.south + self.east + self.west
    }

    fn non_negative(self) -> Self {
        Self::new(
            self.north.max(0),
            self.south.max(0),
            self.east.max(0),
            self.west.max(0),
        )
    }
}

/// Per-side enable flags for exits.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SideFlags {
    pub north: bool,
    pub south: bool,
    pub east: bool,
    pub west: bool,
}

impl SideFlags {
    /// Flag for one side.
    pub fn get(&self, side: Side) -> bool {
        match side {
            Side::North => self.north,
            Side::South => self.south,
            Side::East => self.east,
            Side::West => self.west,
        }
    }

    /// Whether at least one side is enabled.
    pub fn any(&self) -> bool {
        Side::ALL.iter().any(|&side| self.get(side))
    }
}

impl Default for SideFlags {
    fn default() -> Self {
        Self {
            north: true,
            south: true,
            east: true,
            west: true,
        }
    }
}

/// Exit request: either a total to spread automatically or explicit per-side counts.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExitConfig {
    /// Spread `count` exits randomly over enabled sides
    pub auto_distribute: bool,
    /// Total exits when auto-distributing
    pub count: i32,
    /// Explicit counts used when not auto-distributing
    pub per_side: SideCounts,
    /// Sides that may receive exits when auto-distributing
    pub enabled: SideFlags,
}

impl Default for ExitConfig {
    fn default() -> Self {
        Self {
            auto_distribute: true,
            count: config::DEFAULT_EXITS,
            per_side: SideCounts::default(),
            enabled: SideFlags::default(),
        }
    }
}

/// Configuration for maze generation.
///
/// Values below their minimum are clamped by [`MazeConfig::sanitized`] rather
/// than rejected, so generation always produces a maze.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct MazeConfig {
    /// Random seed for reproducible generation; `None` seeds from entropy
    pub seed: Option<u64>,
    /// Carving area in cells
    pub maze_size: Position,
    /// Wall thickness in cells per axis
    pub wall_width: Position,
    /// Corridor width in cells per axis
    pub path_width: Position,
    /// Thickness of the enclosing border, also the length exits reach outward
    pub border_width: i32,
    /// Spawn clearing size in node steps
    pub spawn_width: i32,
    /// Extra connections to punch between carved nodes
    pub extra_solutions: i32,
    /// Extra floor rows added to each vertical step (room for tall wall caps)
    pub vertical_padding: i32,
    /// Exit request
    pub exits: ExitConfig,
    /// Fail generation if the base skeleton is not fully connected
    pub validate_connectivity: bool,
}

impl MazeConfig {
    /// Creates a default configuration with a fixed seed.
    ///
    /// # Examples
    ///
    /// ```
    /// use mazechase::MazeConfig;
    ///
    /// let config = MazeConfig::new(7);
    /// assert_eq!(config.seed, Some(7));
    /// assert!(config.maze_size.x >= 1);
    /// ```
    pub fn new(seed: u64) -> Self {
        Self {
            seed: Some(seed),
            ..Self::default()
        }
    }

    /// Creates a configuration for testing with a small, symmetric maze.
    pub fn for_testing(seed: u64) -> Self {
        Self {
            seed: Some(seed),
            maze_size: Position::new(11, 11),
            wall_width: Position::splat(1),
            path_width: Position::splat(1),
            border_width: 1,
            spawn_width: 1,
            extra_solutions: 1,
            vertical_padding: 0,
            exits: ExitConfig {
                count: 2,
                ..ExitConfig::default()
            },
            validate_connectivity: true,
        }
    }

    /// Returns a copy with every value clamped to its minimum.
    ///
    /// # Examples
    ///
    /// ```
    /// use mazechase::{MazeConfig, Position};
    ///
    /// let mut config = MazeConfig::new(1);
    /// config.maze_size = Position::new(0, -4);
    /// config.extra_solutions = -3;
    ///
    /// let clean = config.sanitized();
    /// assert_eq!(clean.maze_size, Position::new(1, 1));
    /// assert_eq!(clean.extra_solutions, 0);
    /// ```
    pub fn sanitized(&self) -> Self {
        Self {
            seed: self.seed,
            maze_size: self.maze_size.at_least(1),
            wall_width: self.wall_width.at_least(1),
            path_width: self.path_width.at_least(1),
            border_width: self.border_width.max(1),
            spawn_width: self.spawn_width.max(1),
            extra_solutions: self.extra_solutions.max(0),
            vertical_padding: self.vertical_padding.max(0),
            exits: ExitConfig {
                auto_distribute: self.exits.auto_distribute,
                count: self.exits.count.max(0),
                per_side: self.exits.per_side.non_negative(),
                enabled: self.exits.enabled,
            },
            validate_connectivity: self.validate_connectivity,
        }
    }

    /// Parses a configuration from JSON. Missing fields take their defaults.
    pub fn from_json_str(json: &str) -> MazeResult<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Loads a configuration from a JSON file.
    pub fn from_json_file(path: impl AsRef<Path>) -> MazeResult<Self> {
        let path = path.as_ref();
        let contents = std::fs::read_to_string(path)?;
        Self::from_json_str(&contents).map_err(|e| match e {
            MazeError::Serde(inner) => {
                MazeError::InvalidConfig(format!("{}: {}", path.display(), inner))
            }
            other => other,
        })
    }

    /// Serializes the configuration to pretty JSON.
    pub fn to_json(&self) -> MazeResult<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

impl Default for MazeConfig {
    fn default() -> Self {
        Self {
            seed: None,
            maze_size: Position::splat(config::DEFAULT_MAZE_SIZE),
            wall_width: Position::splat(1),
            path_width: Position::splat(1),
            border_width: config::DEFAULT_BORDER_WIDTH,
            spawn_width: config::DEFAULT_SPAWN_WIDTH,
            extra_solutions: config::DEFAULT_EXTRA_SOLUTIONS,
            vertical_padding: config::DEFAULT_VERTICAL_PADDING,
            exits: ExitConfig::default(),
            validate_connectivity: true,
        }
    }
}

/// A carved graph vertex: a carving decision point or an exit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct MazeNode {
    pub position: Position,
    pub is_exit: bool,
    pub is_dead_end: bool,
    /// Side the exit opens onto; `None` for interior nodes
    pub side: Option<Side>,
}

impl MazeNode {
    /// Creates an interior node.
    pub fn new(position: Position) -> Self {
        Self {
            position,
            is_exit: false,
            is_dead_end: false,
            side: None,
        }
    }

    /// Creates an exit node outside the given side.
    pub fn exit(position: Position, side: Side) -> Self {
        Self {
            position,
            is_exit: true,
            is_dead_end: false,
            side: Some(side),
        }
    }
}

/// Footprint of one perimeter opening.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExitFootprint {
    pub side: Side,
    /// Opening area, from the boundary cell outward through the border
    pub area: Rect,
    /// Exit node one path step outside the boundary
    pub node: Position,
}

/// Outcome of exit placement.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExitPlan {
    /// Requested total after the perimeter cap
    pub requested_total: i32,
    /// Counts handed to placement (auto-distributed or manual)
    pub distributed: SideCounts,
    /// Counts actually placed after the spacing clamp
    pub placed: SideCounts,
    /// Spacing between exits on each side, in node steps (0 when unused)
    pub spacing: SideCounts,
}

/// Mutable state shared by the build stages.
///
/// Holds the sanitized configuration, the derived widths, the visited grid,
/// the passability map and everything discovered while carving.
#[derive(Debug, Clone)]
pub struct MazeCanvas {
    pub config: MazeConfig,
    /// Effective path width: corridor plus the wall it replaces
    pub step: Position,
    pub wall: Position,
    /// Distance between adjacent nodes
    pub separation: Position,
    pub visited: VisitedGrid,
    pub map: PassabilityMap,
    /// Topology nodes in commit order
    pub nodes: Vec<MazeNode>,
    pub exit_nodes: Vec<MazeNode>,
    pub exit_footprints: Vec<ExitFootprint>,
    pub exit_plan: ExitPlan,
    pub seed_cell: Option<Position>,
    pub bottom_left: Position,
    pub top_right: Position,
    pub extra_connections: usize,
    pub spawn_area: Option<Rect>,
    pub spawn_centre: Point,
}

impl MazeCanvas {
    /// Creates an empty canvas for the (sanitized) configuration.
    pub fn new(config: &MazeConfig) -> Self {
        let config = config.sanitized();
        let wall = config.wall_width;
        let step = Position::new(
            config.path_width.x + wall.x - 1,
            config.path_width.y + wall.y - 1 + config.vertical_padding,
        );
        let separation = step + Position::splat(1);
        let grid_size = config.maze_size + step;

        Self {
            visited: VisitedGrid::new(grid_size.x, grid_size.y),
            map: PassabilityMap::new(),
            nodes: Vec::new(),
            exit_nodes: Vec::new(),
            exit_footprints: Vec::new(),
            exit_plan: ExitPlan::default(),
            seed_cell: None,
            bottom_left: grid_size,
            top_right: Position::origin(),
            extra_connections: 0,
            spawn_area: None,
            spawn_centre: Point::new(0.0, 0.0),
            step,
            wall,
            separation,
            config,
        }
    }

    /// How far a corridor extends past its node towards the top-right.
    pub fn corridor_extent(&self) -> Position {
        self.step - self.wall
    }

    /// Whether a cell lies inside the carving area.
    pub fn is_in_bounds(&self, pos: Position) -> bool {
        pos.x >= 0
            && pos.y >= 0
            && pos.x < self.config.maze_size.x
            && pos.y < self.config.maze_size.y
    }

    /// Marks a rectangle visited (clamped to the grid) and open in the map (unclamped).
    pub fn carve(&mut self, rect: Rect) {
        self.visited.fill_rect(rect);
        self.map.carve_rect(rect);
    }

    /// The rectangle joining two nodes, widened to the corridor width.
    pub fn corridor_between(&self, a: Position, b: Position) -> Rect {
        Rect::from_corners(a.min(b), a.max(b) + self.corridor_extent())
    }

    /// Grows the discovered extents to include a committed node.
    pub fn extend_extents(&mut self, node: Position) {
        self.bottom_left = self.bottom_left.min(node);
        self.top_right = self.top_right.max(node + self.corridor_extent());
    }
}

/// A single step of maze construction.
///
/// Stages are applied in order to one [`MazeCanvas`]; each draws its
/// randomness from the injected generator.
pub trait BuildStage {
    /// Applies the stage to the canvas.
    fn apply(&self, canvas: &mut MazeCanvas, rng: &mut StdRng) -> MazeResult<()>;

    /// Checks the canvas after the stage ran.
    fn validate(&self, canvas: &MazeCanvas) -> MazeResult<()> {
        let _ = canvas;
        Ok(())
    }

    /// Gets the stage name for logging and debugging.
    fn stage_name(&self) -> &'static str;
}

/// Utility functions for generation algorithms.
pub mod utils {
    use super::*;
    use rand::seq::SliceRandom;
    use rand::{Rng, SeedableRng};

    /// Creates the random generator for a configuration.
    pub fn create_rng(config: &MazeConfig) -> StdRng {
        match config.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        }
    }

    /// Uniform random permutation in place.
    pub fn shuffle<T>(items: &mut [T], rng: &mut StdRng) {
        items.shuffle(rng);
    }

    /// Picks a random cell inside `0..size` on both axes.
    pub fn random_cell(size: Position, rng: &mut StdRng) -> Position {
        let size = size.at_least(1);
        Position::new(rng.gen_range(0..size.x), rng.gen_range(0..size.y))
    }

    /// Fails if the canvas has no open floor at all.
    pub fn validate_canvas(canvas: &MazeCanvas) -> MazeResult<()> {
        if canvas.map.path_count() == 0 {
            return Err(MazeError::GenerationFailed(
                "Maze has no walkable cells".to_string(),
            ));
        }
        Ok(())
    }
}

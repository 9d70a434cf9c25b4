//! # Mazechase
//!
//! Procedural maze generation with a pursuit pathfinder.
//!
//! ## Architecture Overview
//!
//! A maze is built in four stages that all write into one sparse
//! passability map:
//!
//! - **Topology**: randomized depth-first carving of a connected skeleton
//! - **Exits**: openings through the perimeter, spread over the four sides
//! - **Extra solutions**: a bounded number of extra corridors that add loops
//! - **Spawn**: a cleared square around the centre of the carved area
//!
//! The finished [`Maze`] is read-only. Routes over it come from
//! [`AStarPathfinder`], which moves a whole node separation per step, and a
//! [`Pursuer`] uses those routes to chase a moving target.
//!
//! ```
//! use mazechase::{Maze, MazeConfig};
//!
//! let maze = Maze::generate(&MazeConfig::for_testing(7)).unwrap();
//! let from = maze.navigation_point(maze.seed_cell());
//! let to = maze.navigation_point(maze.nodes()[maze.nodes().len() / 2].position);
//!
//! let route = maze.find_route(from, to);
//! assert!(route.reached_goal());
//! ```

pub mod generation;
pub mod grid;
pub mod maze;
pub mod passability;
pub mod pursuit;
pub mod search;

// Core module re-exports
pub use generation::*;
pub use grid::*;
pub use maze::*;
pub use passability::*;
pub use pursuit::*;
pub use search::*;

/// Core error type for maze generation and I/O around it.
#[derive(thiserror::Error, Debug)]
pub enum MazeError {
    /// I/O operation failed
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization/deserialization error
    #[error("Serialization error: {0}")]
    Serde(#[from] serde_json::Error),

    /// Configuration could not be used
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// Generation failed
    #[error("Generation failed: {0}")]
    GenerationFailed(String),

    /// A caller-supplied value could not be parsed or used
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),
}

/// Result type used throughout the crate.
pub type MazeResult<T> = Result<T, MazeError>;

/// Version information for the crate.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Default configuration constants.
pub mod config {
    /// Default carving area per axis, in cells
    pub const DEFAULT_MAZE_SIZE: i32 = 41;

    /// Default border thickness in cells
    pub const DEFAULT_BORDER_WIDTH: i32 = 2;

    /// Default spawn clearing width in node steps
    pub const DEFAULT_SPAWN_WIDTH: i32 = 3;

    /// Default number of extra connections
    pub const DEFAULT_EXTRA_SOLUTIONS: i32 = 10;

    /// Extra floor rows per vertical step, reserved for tall wall caps
    pub const DEFAULT_VERTICAL_PADDING: i32 = 2;

    /// Default number of auto-distributed exits
    pub const DEFAULT_EXITS: i32 = 4;

    /// Seconds between pursuer queue drops
    pub const DEFAULT_REPATH_INTERVAL: f32 = 0.5;

    /// Pursuer speed in cells per second
    pub const DEFAULT_PURSUER_SPEED: f32 = 4.0;
}

//! # Grid Primitives
//!
//! Coordinate types and the direction vocabulary shared by maze carving and
//! route search.
//!
//! The maze uses a y-up convention: `North` increases `y`, `South` decreases it.
//! Integer [`Position`]s address grid cells, float [`Point`]s address search
//! nodes that may sit between cells.

pub mod cell;
pub mod visited;

pub use cell::*;
pub use visited::*;

use serde::{Deserialize, Serialize};

/// Integer grid coordinate, also used as an integer 2D vector (sizes, widths).
///
/// # Examples
///
/// ```
/// use mazechase::{Direction, Position};
///
/// let pos = Position::new(4, 4);
/// assert_eq!(pos.step(Direction::North, 2), Position::new(4, 6));
/// assert_eq!(pos.step(Direction::West, 3), Position::new(1, 4));
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Position {
    pub x: i32,
    pub y: i32,
}

impl Position {
    /// Creates a new position with the given coordinates.
    pub fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    /// Returns the origin position (0, 0).
    pub fn origin() -> Self {
        Self::new(0, 0)
    }

    /// Returns a position with both components set to `value`.
    pub fn splat(value: i32) -> Self {
        Self::new(value, value)
    }

    /// Offsets the position by raw deltas.
    pub fn translate(self, dx: i32, dy: i32) -> Self {
        Self::new(self.x + dx, self.y + dy)
    }

    /// Moves `magnitude` cells in `direction`.
    pub fn step(self, direction: Direction, magnitude: i32) -> Self {
        let delta = direction.to_delta();
        Self::new(self.x + delta.x * magnitude, self.y + delta.y * magnitude)
    }

    /// Component-wise minimum.
    pub fn min(self, other: Position) -> Self {
        Self::new(self.x.min(other.x), self.y.min(other.y))
    }

    /// Component-wise maximum.
    pub fn max(self, other: Position) -> Self {
        Self::new(self.x.max(other.x), self.y.max(other.y))
    }

    /// Clamps both components to at least `floor`.
    pub fn at_least(self, floor: i32) -> Self {
        Self::new(self.x.max(floor), self.y.max(floor))
    }

    /// Returns the four cardinal neighbours at the given distance.
    pub fn cardinal_neighbors(self, separation: Position) -> [Position; 4] {
        [
            self.step(Direction::North, separation.y),
            self.step(Direction::South, separation.y),
            self.step(Direction::East, separation.x),
            self.step(Direction::West, separation.x),
        ]
    }
}

impl std::ops::Add for Position {
    type Output = Self;

    fn add(self, other: Self) -> Self {
        Self::new(self.x + other.x, self.y + other.y)
    }
}

impl std::ops::Sub for Position {
    type Output = Self;

    fn sub(self, other: Self) -> Self {
        Self::new(self.x - other.x, self.y - other.y)
    }
}

impl std::fmt::Display for Position {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "({}, {})", self.x, self.y)
    }
}

/// Float coordinate used by the route search.
///
/// Search points can be offset from the raw grid (node centring adds a half
/// cell), so they are kept as floats and mapped back to cells with
/// [`Point::cell`].
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Point {
    pub x: f32,
    pub y: f32,
}

impl Point {
    /// Creates a new point.
    pub fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    /// Offsets the point by raw deltas.
    pub fn translate(self, dx: f32, dy: f32) -> Self {
        Self::new(self.x + dx, self.y + dy)
    }

    /// Squared Euclidean distance. This is the search heuristic.
    ///
    /// # Examples
    ///
    /// ```
    /// use mazechase::Point;
    ///
    /// assert_eq!(Point::new(0.0, 0.0).distance_squared(Point::new(3.0, 4.0)), 25.0);
    /// ```
    pub fn distance_squared(self, other: Point) -> f32 {
        let dx = self.x - other.x;
        let dy = self.y - other.y;
        dx * dx + dy * dy
    }

    /// Euclidean distance.
    pub fn distance(self, other: Point) -> f32 {
        self.distance_squared(other).sqrt()
    }

    /// The grid cell containing this point.
    pub fn cell(self) -> Position {
        Position::new(self.x.floor() as i32, self.y.floor() as i32)
    }

    /// Bit-exact key for hashing; `-0.0` and `0.0` map to the same key.
    pub fn key(self) -> (u32, u32) {
        ((self.x + 0.0).to_bits(), (self.y + 0.0).to_bits())
    }
}

impl From<Position> for Point {
    fn from(pos: Position) -> Self {
        Self::new(pos.x as f32, pos.y as f32)
    }
}

impl std::fmt::Display for Point {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "({}, {})", self.x, self.y)
    }
}

/// Directions for carving and search moves.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Direction {
    North,
    South,
    East,
    West,
    Northeast,
    Northwest,
    Southeast,
    Southwest,
}

impl Direction {
    /// The four cardinal directions in their canonical order.
    pub const CARDINAL: [Direction; 4] = [
        Direction::North,
        Direction::South,
        Direction::East,
        Direction::West,
    ];

    /// Converts a direction to a unit position delta (y-up).
    ///
    /// # Examples
    ///
    /// ```
    /// use mazechase::{Direction, Position};
    ///
    /// assert_eq!(Direction::North.to_delta(), Position::new(0, 1));
    /// assert_eq!(Direction::Southwest.to_delta(), Position::new(-1, -1));
    /// ```
    pub fn to_delta(self) -> Position {
        match self {
            Direction::North => Position::new(0, 1),
            Direction::South => Position::new(0, -1),
            Direction::East => Position::new(1, 0),
            Direction::West => Position::new(-1, 0),
            Direction::Northeast => Position::new(1, 1),
            Direction::Northwest => Position::new(-1, 1),
            Direction::Southeast => Position::new(1, -1),
            Direction::Southwest => Position::new(-1, -1),
        }
    }

    /// Whether this direction moves along the y axis only.
    pub fn is_vertical(self) -> bool {
        matches!(self, Direction::North | Direction::South)
    }

    /// The separation component this direction travels along.
    ///
    /// Diagonals use both components, so this is only meaningful for cardinals.
    pub fn axis_length(self, separation: Position) -> i32 {
        if self.is_vertical() {
            separation.y
        } else {
            separation.x
        }
    }
}

/// Axis-aligned inclusive rectangle of cells.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Rect {
    pub bottom_left: Position,
    pub top_right: Position,
}

impl Rect {
    /// Builds a rectangle from any two opposite corners.
    ///
    /// # Examples
    ///
    /// ```
    /// use mazechase::{Position, Rect};
    ///
    /// let rect = Rect::from_corners(Position::new(3, 0), Position::new(1, 2));
    /// assert_eq!(rect.bottom_left, Position::new(1, 0));
    /// assert_eq!(rect.top_right, Position::new(3, 2));
    /// assert_eq!(rect.cells().count(), 9);
    /// ```
    pub fn from_corners(a: Position, b: Position) -> Self {
        Self {
            bottom_left: a.min(b),
            top_right: a.max(b),
        }
    }

    /// Width in cells (inclusive).
    pub fn width(&self) -> i32 {
        self.top_right.x - self.bottom_left.x + 1
    }

    /// Height in cells (inclusive).
    pub fn height(&self) -> i32 {
        self.top_right.y - self.bottom_left.y + 1
    }

    /// Checks if a position lies inside the rectangle.
    pub fn contains(&self, pos: Position) -> bool {
        pos.x >= self.bottom_left.x
            && pos.x <= self.top_right.x
            && pos.y >= self.bottom_left.y
            && pos.y <= self.top_right.y
    }

    /// All covered cells, row by row from the bottom.
    pub fn cells(&self) -> impl Iterator<Item = Position> + '_ {
        (self.bottom_left.y..=self.top_right.y).flat_map(move |y| {
            (self.bottom_left.x..=self.top_right.x).map(move |x| Position::new(x, y))
        })
    }
}

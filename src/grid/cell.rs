//! # Carving Cells
//!
//! A cell remembers the cell it was reached from so the carver can fill the
//! segment between the two once the cell is committed.

use super::{Position, Rect};

/// Integer grid coordinate plus the coordinate it was reached from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Cell {
    pub position: Position,
    prior: Position,
}

impl Cell {
    /// Creates a cell that is its own prior (a carving seed).
    pub fn new(position: Position) -> Self {
        Self {
            position,
            prior: position,
        }
    }

    /// Creates a cell reached from `origin`.
    pub fn reached_from(position: Position, origin: Position) -> Self {
        Self {
            position,
            prior: origin,
        }
    }

    /// The rectangle joining this cell to its prior, widened by `extent`
    /// towards the top-right.
    ///
    /// # Examples
    ///
    /// ```
    /// use mazechase::{Cell, Position};
    ///
    /// let cell = Cell::reached_from(Position::new(4, 2), Position::new(2, 2));
    /// let rect = cell.segment(Position::new(0, 1));
    /// assert_eq!(rect.bottom_left, Position::new(2, 2));
    /// assert_eq!(rect.top_right, Position::new(4, 3));
    /// ```
    pub fn segment(&self, extent: Position) -> Rect {
        Rect::from_corners(
            self.position.min(self.prior),
            self.position.max(self.prior) + extent,
        )
    }
}

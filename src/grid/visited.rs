//! # Visited Grid
//!
//! Dense boolean grid recording which cells the carver has claimed.

use super::{Position, Rect};

/// Fixed-size boolean grid. Queries outside the grid read as unvisited.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VisitedGrid {
    width: i32,
    height: i32,
    cells: Vec<bool>,
}

impl VisitedGrid {
    /// Creates a zeroed grid. Negative dimensions become empty.
    pub fn new(width: i32, height: i32) -> Self {
        let width = width.max(0);
        let height = height.max(0);
        Self {
            width,
            height,
            cells: vec![false; (width as usize) * (height as usize)],
        }
    }

    /// Grid width in cells.
    pub fn width(&self) -> i32 {
        self.width
    }

    /// Grid height in cells.
    pub fn height(&self) -> i32 {
        self.height
    }

    /// Whether a position lies inside the grid.
    pub fn contains(&self, pos: Position) -> bool {
        pos.x >= 0 && pos.y >= 0 && pos.x < self.width && pos.y < self.height
    }

    fn index(&self, pos: Position) -> Option<usize> {
        if self.contains(pos) {
            Some(pos.y as usize * self.width as usize + pos.x as usize)
        } else {
            None
        }
    }

    /// Reads a cell; out-of-grid positions are `false`.
    pub fn is_set(&self, pos: Position) -> bool {
        self.index(pos).map(|i| self.cells[i]).unwrap_or(false)
    }

    /// Marks a cell. Returns false if the position was outside the grid.
    pub fn set(&mut self, pos: Position) -> bool {
        match self.index(pos) {
            Some(i) => {
                self.cells[i] = true;
                true
            }
            None => false,
        }
    }

    /// Marks every in-grid cell of `rect`; the rest is silently dropped.
    pub fn fill_rect(&mut self, rect: Rect) {
        let lo = rect.bottom_left.max(Position::origin());
        let hi = rect
            .top_right
            .min(Position::new(self.width - 1, self.height - 1));
        for y in lo.y..=hi.y {
            for x in lo.x..=hi.x {
                self.set(Position::new(x, y));
            }
        }
    }

    /// Number of marked cells.
    pub fn count(&self) -> usize {
        self.cells.iter().filter(|&&c| c).count()
    }
}

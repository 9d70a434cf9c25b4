//! # Passability Map
//!
//! Sparse record of which coordinates are walkable, keyed by `(x, y)` and
//! independent of any array bounds (exit corridors reach outside the carving
//! grid).
//!
//! A coordinate that is present with `is_path == false` is distinct from an
//! absent coordinate: absence means "never touched by carving", not "wall".

use crate::{Position, Rect};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Passability record for one coordinate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TileRecord {
    pub position: Position,
    pub is_path: bool,
}

impl TileRecord {
    /// Creates a record.
    pub fn new(position: Position, is_path: bool) -> Self {
        Self { position, is_path }
    }

    /// Creates an open-floor record.
    pub fn path(position: Position) -> Self {
        Self::new(position, true)
    }
}

/// Ordered sparse map from coordinate to [`TileRecord`].
///
/// # Examples
///
/// ```
/// use mazechase::{PassabilityMap, Position, TileRecord};
///
/// let mut map = PassabilityMap::new();
/// map.insert(TileRecord::path(Position::new(2, 3)));
/// map.insert(TileRecord::new(Position::new(4, 4), false));
///
/// assert!(map.is_path(2, 3));
/// assert!(map.contains(4, 4));
/// assert!(!map.is_path(4, 4));
/// assert!(!map.contains(9, 9));
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PassabilityMap {
    tiles: BTreeMap<(i32, i32), TileRecord>,
}

impl PassabilityMap {
    /// Creates an empty map.
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts or replaces the record at its own position.
    pub fn insert(&mut self, record: TileRecord) {
        self.tiles
            .insert((record.position.x, record.position.y), record);
    }

    /// Whether any record exists at `(x, y)`.
    pub fn contains(&self, x: i32, y: i32) -> bool {
        self.tiles.contains_key(&(x, y))
    }

    /// Record lookup.
    pub fn get(&self, x: i32, y: i32) -> Option<&TileRecord> {
        self.tiles.get(&(x, y))
    }

    /// Whether `(x, y)` is present and walkable. Missing coordinates are `false`.
    pub fn is_path(&self, x: i32, y: i32) -> bool {
        self.get(x, y).map(|t| t.is_path).unwrap_or(false)
    }

    /// Same as [`PassabilityMap::is_path`] for a [`Position`].
    pub fn is_path_at(&self, pos: Position) -> bool {
        self.is_path(pos.x, pos.y)
    }

    /// Updates the walkable flag of an existing record. Absent coordinates are
    /// left absent; returns whether a record was updated.
    pub fn set_path(&mut self, x: i32, y: i32, is_path: bool) -> bool {
        match self.tiles.get_mut(&(x, y)) {
            Some(record) => {
                record.is_path = is_path;
                true
            }
            None => false,
        }
    }

    /// Unions a rectangle of open floor into the map.
    pub fn carve_rect(&mut self, rect: Rect) {
        for pos in rect.cells() {
            if !self.set_path(pos.x, pos.y, true) {
                self.insert(TileRecord::path(pos));
            }
        }
    }

    /// Whether every cell of `rect` is present and walkable.
    pub fn is_rect_walkable(&self, rect: Rect) -> bool {
        rect.cells().all(|pos| self.is_path_at(pos))
    }

    /// Number of records (walkable or not).
    pub fn len(&self) -> usize {
        self.tiles.len()
    }

    /// Whether the map has no records.
    pub fn is_empty(&self) -> bool {
        self.tiles.is_empty()
    }

    /// Number of walkable records.
    pub fn path_count(&self) -> usize {
        self.tiles.values().filter(|t| t.is_path).count()
    }

    /// All records in `(x, y)` order.
    pub fn iter(&self) -> impl Iterator<Item = &TileRecord> {
        self.tiles.values()
    }

    /// All recorded coordinates in `(x, y)` order.
    pub fn positions(&self) -> impl Iterator<Item = Position> + '_ {
        self.tiles.keys().map(|&(x, y)| Position::new(x, y))
    }

    /// Bounding rectangle of all records, if any.
    pub fn bounds(&self) -> Option<Rect> {
        let mut positions = self.positions();
        let first = positions.next()?;
        let (lo, hi) = positions.fold((first, first), |(lo, hi), p| (lo.min(p), hi.max(p)));
        Some(Rect::from_corners(lo, hi))
    }
}

impl FromIterator<TileRecord> for PassabilityMap {
    fn from_iter<I: IntoIterator<Item = TileRecord>>(iter: I) -> Self {
        let mut map = PassabilityMap::new();
        for record in iter {
            map.insert(record);
        }
        map
    }
}

//! # Spawn Clearing
//!
//! Opens a square of `spawn_width` node steps around the centre of the carved
//! extents, snapped to the node lattice.

use super::{BuildStage, MazeCanvas};
use crate::{MazeError, MazeResult, Point, Position, Rect};
use log::debug;
use rand::rngs::StdRng;

/// Carves the central spawn area.
#[derive(Debug, Clone, Default)]
pub struct SpawnAreaCarver;

impl SpawnAreaCarver {
    /// Creates a new spawn carver.
    pub fn new() -> Self {
        Self
    }

    /// Spawn width in node steps, reduced to what the extents can hold.
    pub fn effective_width(canvas: &MazeCanvas) -> i32 {
        let extent = canvas.top_right - canvas.bottom_left;
        let sep = canvas.separation;
        canvas
            .config
            .spawn_width
            .min(extent.x / sep.x)
            .min(extent.y / sep.y)
            .max(1)
    }

    /// The rectangle the spawn clearing occupies.
    pub fn spawn_rect(canvas: &MazeCanvas) -> Rect {
        let extent = canvas.top_right - canvas.bottom_left;
        let sep = canvas.separation;
        let wall = canvas.wall;
        let width = Self::effective_width(canvas);

        // Even widths lean towards the bottom-left by one step less
        let shift = if width % 2 == 0 { width / 2 - 1 } else { width / 2 };
        let tx = sep.x * (extent.x / sep.x / 2) - sep.x * shift;
        let ty = sep.y * (extent.y / sep.y / 2) - sep.y * shift;

        let origin = canvas.bottom_left + Position::new(tx, ty);
        let span = Position::new(width * sep.x - wall.x - 1, width * sep.y - wall.y - 1);
        Rect::from_corners(origin, origin + span)
    }
}

impl BuildStage for SpawnAreaCarver {
    fn apply(&self, canvas: &mut MazeCanvas, _rng: &mut StdRng) -> MazeResult<()> {
        let rect = Self::spawn_rect(canvas);
        canvas.carve(rect);
        canvas.spawn_area = Some(rect);

        let bl = rect.bottom_left;
        let tr = rect.top_right;
        canvas.spawn_centre = Point::new(
            bl.x as f32 + (tr.x - bl.x) as f32 / 2.0,
            bl.y as f32 + (tr.y - bl.y) as f32 / 2.0,
        );

        debug!(
            "Spawn area {}..{} centred on {}",
            bl, tr, canvas.spawn_centre
        );
        Ok(())
    }

    fn validate(&self, canvas: &MazeCanvas) -> MazeResult<()> {
        match canvas.spawn_area {
            Some(rect) if canvas.map.is_rect_walkable(rect) => Ok(()),
            Some(_) => Err(MazeError::GenerationFailed(
                "Spawn area is not fully walkable".to_string(),
            )),
            None => Err(MazeError::GenerationFailed(
                "Spawn area was not carved".to_string(),
            )),
        }
    }

    fn stage_name(&self) -> &'static str {
        "SpawnAreaCarver"
    }
}

//! # Exit Placement
//!
//! Opens the carved skeleton onto the outside through the perimeter.
//!
//! Each side holds at most `side length / node separation` exits. A request
//! larger than the whole perimeter is cut down to half the perimeter, and the
//! spacing between exits on a side is never less than two node steps.

use super::{utils, BuildStage, ExitFootprint, ExitPlan, MazeCanvas, MazeNode, Side, SideCounts};
use crate::{MazeError, MazeResult, Position, Rect};
use log::{debug, warn};
use rand::rngs::StdRng;

/// Minimum spacing between two exits on the same side, in node steps.
pub const MIN_EXIT_SPACING: i32 = 2;

/// Places perimeter exits and their exit nodes.
#[derive(Debug, Clone, Default)]
pub struct ExitPlacer;

impl ExitPlacer {
    /// Creates a new exit placer.
    pub fn new() -> Self {
        Self
    }

    /// How many exits fit on one side.
    pub fn side_capacity(canvas: &MazeCanvas, side: Side) -> i32 {
        let size = canvas.config.maze_size;
        if side.runs_along_x() {
            size.x / canvas.separation.x
        } else {
            size.y / canvas.separation.y
        }
    }

    /// Total exits the perimeter admits.
    pub fn perimeter_capacity(canvas: &MazeCanvas) -> i32 {
        Side::ALL
            .iter()
            .map(|&side| Self::side_capacity(canvas, side))
            .sum()
    }

    /// Applies the perimeter cap to a requested total.
    ///
    /// Requests above the perimeter capacity fall back to half of it.
    pub fn capped_total(canvas: &MazeCanvas, requested: i32) -> i32 {
        let capacity = Self::perimeter_capacity(canvas);
        if requested > capacity {
            debug!(
                "Requested {} exits but the perimeter holds {}; capping to {}",
                requested,
                capacity,
                capacity / 2
            );
            capacity / 2
        } else {
            requested.max(0)
        }
    }

    /// Spreads `total` exits over enabled sides by repeatedly visiting the
    /// sides in random order and adding one exit to each side with room left.
    ///
    /// Stops early if no side can take another exit.
    pub fn distribute(canvas: &MazeCanvas, total: i32, rng: &mut StdRng) -> SideCounts {
        let enabled = canvas.config.exits.enabled;
        let mut counts = SideCounts::default();
        let mut created = 0;
        let mut sides = Side::ALL;

        while created < total {
            utils::shuffle(&mut sides, rng);
            let mut progressed = false;

            for &side in &sides {
                if enabled.get(side) && counts.get(side) < Self::side_capacity(canvas, side) {
                    *counts.get_mut(side) += 1;
                    created += 1;
                    progressed = true;
                }
                if created >= total {
                    break;
                }
            }

            if !progressed {
                warn!(
                    "Only {} of {} exits could be distributed; no eligible side left",
                    created, total
                );
                break;
            }
        }

        counts
    }

    /// Lattice steps between the first and last carved node along a side.
    pub fn lattice_span(canvas: &MazeCanvas, side: Side) -> i32 {
        let far = canvas.top_right - canvas.corridor_extent();
        let span = if side.runs_along_x() {
            (far.x - canvas.bottom_left.x) / canvas.separation.x
        } else {
            (far.y - canvas.bottom_left.y) / canvas.separation.y
        };
        span.max(0)
    }

    /// Spacing and the count that fits with it for one side.
    ///
    /// Returns `(spacing, count)` in node steps. When the even spacing would
    /// fall below [`MIN_EXIT_SPACING`], the spacing is raised to it and the
    /// count is cut to what still lands on the carved lattice. A side asked
    /// for any exit keeps at least one.
    pub fn side_spacing(canvas: &MazeCanvas, side: Side, count: i32) -> (i32, i32) {
        let capacity = Self::side_capacity(canvas, side);
        let count = count.max(0);
        let spacing = capacity / (count + 1);

        if spacing < MIN_EXIT_SPACING {
            let fitted = (Self::lattice_span(canvas, side) / MIN_EXIT_SPACING)
                .max(1)
                .min(count);
            (MIN_EXIT_SPACING, fitted)
        } else {
            (spacing, count)
        }
    }

    /// Lattice steps from the bottom-left extent to exit number `index`
    /// (1-based). Never past the last carved node, so a short side still
    /// opens onto its far node.
    pub fn exit_offset(canvas: &MazeCanvas, side: Side, index: i32, spacing: i32) -> i32 {
        (index * spacing).min(Self::lattice_span(canvas, side))
    }

    /// Computes the footprint, the carved area and the exit node for exit
    /// number `index` (1-based) on `side`.
    fn exit_geometry(
        canvas: &MazeCanvas,
        side: Side,
        index: i32,
        spacing: i32,
    ) -> (ExitFootprint, Rect) {
        let bl = canvas.bottom_left;
        let tr = canvas.top_right;
        let sep = canvas.separation;
        let wall = canvas.wall;
        let extent = canvas.corridor_extent();
        let border = canvas.config.border_width;
        let padding = canvas.config.vertical_padding;
        let offset = Self::exit_offset(canvas, side, index, spacing);

        let (near, far, node, carved_far) = match side {
            Side::North => {
                let near = Position::new(bl.x + offset * sep.x, tr.y - extent.y);
                let far = near + Position::new(extent.x, extent.y + border);
                let node = near.translate(0, sep.y);
                (near, far, node, far.translate(0, wall.y))
            }
            Side::South => {
                let near = Position::new(bl.x + offset * sep.x, bl.y);
                let far = Position::new(near.x + extent.x, near.y - border - padding);
                let node = near.translate(0, -sep.y);
                (near, far, node, far.translate(0, -wall.y))
            }
            Side::East => {
                let near = Position::new(tr.x - extent.x, bl.y + offset * sep.y);
                let far = near + Position::new(extent.x + border, extent.y);
                let node = near.translate(sep.x, 0);
                (near, far, node, far.translate(wall.x, 0))
            }
            Side::West => {
                let near = Position::new(bl.x, bl.y + offset * sep.y);
                let far = Position::new(near.x - border, near.y + extent.y);
                let node = near.translate(-sep.x, 0);
                (near, far, node, far.translate(-wall.x, 0))
            }
        };

        let footprint = ExitFootprint {
            side,
            area: Rect::from_corners(near, far),
            node,
        };
        (footprint, Rect::from_corners(near, carved_far))
    }

    /// Places up to `count` exits on one side. Returns `(spacing, placed)`.
    pub fn place_side(canvas: &mut MazeCanvas, side: Side, count: i32) -> (i32, i32) {
        let (spacing, placed) = Self::side_spacing(canvas, side, count);
        if placed < count {
            debug!(
                "{:?} side: spacing clamped to {}, placing {} of {} exits",
                side, spacing, placed, count
            );
        }

        for index in 1..=placed {
            let (footprint, carved) = Self::exit_geometry(canvas, side, index, spacing);
            canvas.map.carve_rect(carved);
            canvas.exit_nodes.push(MazeNode::exit(footprint.node, side));
            canvas.exit_footprints.push(footprint);
        }

        (spacing, placed)
    }
}

impl BuildStage for ExitPlacer {
    fn apply(&self, canvas: &mut MazeCanvas, rng: &mut StdRng) -> MazeResult<()> {
        let exits = canvas.config.exits.clone();

        let (requested_total, distributed) = if exits.auto_distribute {
            let total = Self::capped_total(canvas, exits.count);
            (total, Self::distribute(canvas, total, rng))
        } else {
            (exits.per_side.total(), exits.per_side)
        };

        let mut placed = SideCounts::default();
        let mut spacing = SideCounts::default();
        for side in Side::ALL {
            let count = distributed.get(side);
            if count == 0 {
                continue;
            }
            let (side_spacing, side_placed) = Self::place_side(canvas, side, count);
            *placed.get_mut(side) = side_placed;
            *spacing.get_mut(side) = side_spacing;
        }

        canvas.exit_plan = ExitPlan {
            requested_total,
            distributed,
            placed,
            spacing,
        };

        debug!(
            "Placed {} exits (N{} S{} E{} W{})",
            placed.total(),
            placed.north,
            placed.south,
            placed.east,
            placed.west
        );
        Ok(())
    }

    fn validate(&self, canvas: &MazeCanvas) -> MazeResult<()> {
        let plan = &canvas.exit_plan;
        if plan.placed.total() as usize != canvas.exit_footprints.len() {
            return Err(MazeError::GenerationFailed(format!(
                "Exit plan lists {} exits but {} footprints were recorded",
                plan.placed.total(),
                canvas.exit_footprints.len()
            )));
        }
        Ok(())
    }

    fn stage_name(&self) -> &'static str {
        "ExitPlacer"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{MazeConfig, SideFlags, TopologyBuilder};
    use rand::SeedableRng;

    fn carved_canvas(config: &MazeConfig, seed: u64) -> (MazeCanvas, StdRng) {
        carved_from(config, Position::new(0, 0), seed)
    }

    fn carved_from(config: &MazeConfig, start: Position, seed: u64) -> (MazeCanvas, StdRng) {
        let mut canvas = MazeCanvas::new(config);
        let mut rng = StdRng::seed_from_u64(seed);
        TopologyBuilder::with_start(start)
            .apply(&mut canvas, &mut rng)
            .unwrap();
        (canvas, rng)
    }

    fn small_manual(per_side: SideCounts, padding: i32) -> MazeConfig {
        let mut config = MazeConfig::for_testing(1);
        config.maze_size = Position::new(5, 5);
        config.vertical_padding = padding;
        config.exits.auto_distribute = false;
        config.exits.per_side = per_side;
        config
    }

    #[test]
    fn test_capacities() {
        // 11 / 2 = 5 per side
        let canvas = MazeCanvas::new(&MazeConfig::for_testing(1));
        assert_eq!(ExitPlacer::side_capacity(&canvas, Side::North), 5);
        assert_eq!(ExitPlacer::side_capacity(&canvas, Side::West), 5);
        assert_eq!(ExitPlacer::perimeter_capacity(&canvas), 20);
    }

    #[test]
    fn test_excess_request_is_halved() {
        let canvas = MazeCanvas::new(&MazeConfig::for_testing(1));
        assert_eq!(ExitPlacer::capped_total(&canvas, 21), 10);
        assert_eq!(ExitPlacer::capped_total(&canvas, 20), 20);
        assert_eq!(ExitPlacer::capped_total(&canvas, 3), 3);
        assert_eq!(ExitPlacer::capped_total(&canvas, -3), 0);
    }

    #[test]
    fn test_distribution_respects_capacity_and_flags() {
        let mut config = MazeConfig::for_testing(1);
        config.exits.enabled = SideFlags {
            north: true,
            south: false,
            east: true,
            west: false,
        };
        let canvas = MazeCanvas::new(&config);
        let mut rng = StdRng::seed_from_u64(4);

        let counts = ExitPlacer::distribute(&canvas, 8, &mut rng);
        assert_eq!(counts.total(), 8);
        assert_eq!(counts.south, 0);
        assert_eq!(counts.west, 0);
        assert!(counts.north <= 5 && counts.east <= 5);

        // Only 10 slots exist on the enabled sides
        let counts = ExitPlacer::distribute(&canvas, 15, &mut rng);
        assert_eq!(counts.total(), 10);
    }

    #[test]
    fn test_distribution_with_all_sides_disabled_terminates() {
        let mut config = MazeConfig::for_testing(1);
        config.exits.enabled = SideFlags {
            north: false,
            south: false,
            east: false,
            west: false,
        };
        let canvas = MazeCanvas::new(&config);
        let mut rng = StdRng::seed_from_u64(4);
        assert_eq!(ExitPlacer::distribute(&canvas, 4, &mut rng).total(), 0);
    }

    #[test]
    fn test_spacing_clamp() {
        let (canvas, _) = carved_canvas(&MazeConfig::for_testing(1), 1);
        // lattice 0..=10 step 2 spans 5 steps
        assert_eq!(ExitPlacer::lattice_span(&canvas, Side::North), 5);
        // capacity 5: one exit -> 5 / 2 = 2
        assert_eq!(ExitPlacer::side_spacing(&canvas, Side::North, 1), (2, 1));
        // four exits -> 5 / 5 = 1 < 2, refit to 5 / 2 = 2
        assert_eq!(ExitPlacer::side_spacing(&canvas, Side::North, 4), (2, 2));
        // none requested keeps none
        assert_eq!(ExitPlacer::side_spacing(&canvas, Side::East, 0), (5, 0));
    }

    #[test]
    fn test_small_maze_fits_one_exit() {
        let mut config = MazeConfig::for_testing(3);
        config.maze_size = Position::new(5, 5);
        config.exits.count = 1;
        let (mut canvas, mut rng) = carved_canvas(&config, 3);

        // capacity 2: spacing 2 / 2 = 1 is clamped, one exit still lands on x = 4
        ExitPlacer::new().apply(&mut canvas, &mut rng).unwrap();
        assert_eq!(canvas.exit_footprints.len(), 1);
        assert_eq!(canvas.exit_plan.spacing.total(), 2);
    }

    #[test]
    fn test_odd_start_still_gets_one_exit() {
        // Starting at (1, 1) leaves the lattice at {1, 3}: a single step
        let config = small_manual(SideCounts::new(1, 0, 0, 0), 0);
        let (mut canvas, mut rng) = carved_from(&config, Position::new(1, 1), 4);
        assert_eq!(ExitPlacer::lattice_span(&canvas, Side::North), 1);
        assert_eq!(ExitPlacer::side_spacing(&canvas, Side::North, 1), (2, 1));
        assert_eq!(ExitPlacer::exit_offset(&canvas, Side::North, 1, 2), 1);

        ExitPlacer::new().apply(&mut canvas, &mut rng).unwrap();
        assert_eq!(canvas.exit_footprints.len(), 1);
        let footprint = canvas.exit_footprints[0];
        assert_eq!(footprint.area.bottom_left, Position::new(3, 3));
        assert_eq!(footprint.area.top_right, Position::new(3, 4));
        assert_eq!(footprint.node, Position::new(3, 5));
        assert!(canvas.map.is_rect_walkable(footprint.area));
    }

    #[test]
    fn test_single_row_side_gets_one_exit() {
        // Padding 2 makes the vertical separation 4, so a start at y = 2 has
        // only one row of nodes
        let config = small_manual(SideCounts::new(0, 0, 1, 1), 2);
        let (mut canvas, mut rng) = carved_from(&config, Position::new(1, 2), 9);
        assert_eq!(ExitPlacer::lattice_span(&canvas, Side::East), 0);
        assert_eq!(ExitPlacer::side_capacity(&canvas, Side::East), 1);
        assert_eq!(ExitPlacer::side_spacing(&canvas, Side::East, 1), (2, 1));

        ExitPlacer::new().apply(&mut canvas, &mut rng).unwrap();
        assert_eq!(canvas.exit_footprints.len(), 2);
        for footprint in &canvas.exit_footprints {
            assert_eq!(footprint.area.bottom_left.y, 2);
            assert!(canvas.map.is_path_at(footprint.area.bottom_left));
            assert!(canvas.map.is_rect_walkable(footprint.area));
        }
    }

    #[test]
    fn test_clamped_exits_keep_their_spacing() {
        let (canvas, _) = carved_canvas(&MazeConfig::for_testing(1), 1);
        let (spacing, placed) = ExitPlacer::side_spacing(&canvas, Side::West, 4);
        let offsets: Vec<i32> = (1..=placed)
            .map(|index| ExitPlacer::exit_offset(&canvas, Side::West, index, spacing))
            .collect();
        assert_eq!(offsets, vec![2, 4]);
    }

    #[test]
    fn test_manual_exits_open_onto_the_skeleton() {
        let mut config = MazeConfig::for_testing(6);
        config.exits.auto_distribute = false;
        config.exits.per_side = SideCounts::new(1, 1, 1, 1);
        let (mut canvas, mut rng) = carved_canvas(&config, 6);

        ExitPlacer::new().apply(&mut canvas, &mut rng).unwrap();
        ExitPlacer::new().validate(&canvas).unwrap();

        assert_eq!(canvas.exit_footprints.len(), 4);
        assert_eq!(canvas.exit_nodes.len(), 4);
        for footprint in &canvas.exit_footprints {
            assert!(canvas.map.is_rect_walkable(footprint.area));
            assert!(canvas.map.is_path_at(footprint.node));
        }
        assert!(canvas.exit_nodes.iter().all(|n| n.is_exit));

        // Lattice 0..=10 step 2, exit 1 with spacing 2 sits 4 cells in
        let north = canvas
            .exit_footprints
            .iter()
            .find(|f| f.side == Side::North)
            .unwrap();
        assert_eq!(north.area.bottom_left, Position::new(4, 10));
        assert_eq!(north.area.top_right, Position::new(4, 11));
        assert_eq!(north.node, Position::new(4, 12));

        let west = canvas
            .exit_footprints
            .iter()
            .find(|f| f.side == Side::West)
            .unwrap();
        assert_eq!(west.area, Rect::from_corners(Position::new(-1, 4), Position::new(0, 4)));
        assert_eq!(west.node, Position::new(-2, 4));
    }

    #[test]
    fn test_auto_plan_records_counts() {
        let mut config = MazeConfig::for_testing(2);
        config.exits.count = 100;
        let (mut canvas, mut rng) = carved_canvas(&config, 2);

        ExitPlacer::new().apply(&mut canvas, &mut rng).unwrap();
        let plan = canvas.exit_plan;
        assert_eq!(plan.requested_total, 10);
        assert_eq!(plan.distributed.total(), 10);
        for side in Side::ALL {
            assert!(plan.placed.get(side) <= plan.distributed.get(side));
            if plan.placed.get(side) > 0 {
                assert!(plan.spacing.get(side) >= MIN_EXIT_SPACING);
            }
        }
        assert_eq!(plan.placed.total() as usize, canvas.exit_footprints.len());
    }
}

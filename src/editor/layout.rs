// Default "river town" layout.
//
//   GRASS | STONE bank | WATER river | STONE bank | GRASS
//
// The river runs along Z through the middle of the grid. Two stone plazas
// jut out from the outer edge of each bank a third of the way down.
// Deterministic: the same grid size always yields the same cells.

use glam::Vec3;

use crate::engine::terrain::{CELL_SIZE, TerrainCell, TerrainGrid};

/// River width as a fraction of the grid side (truncated to whole cells).
const RIVER_FRACTION: f32 = 0.25;
const BANK_WIDTH: i32 = 3;
const PLAZA_WIDTH: i32 = 3;
/// Initial hull height before the first buoyancy sync.
const BOAT_START_HEIGHT: f32 = 0.2;

/// Where the river ended up and where the boat starts.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RiverLayout {
    /// First water column (inclusive).
    pub start_column: i32,
    /// One past the last water column.
    pub end_column: i32,
    pub boat_position: Vec3,
    /// Bow along +Z, down the river.
    pub boat_rotation: f32,
}

impl RiverLayout {
    /// World X of the river's center line.
    pub fn center_world_x(&self, grid_size: i32) -> f32 {
        let center_column = (self.start_column + self.end_column) as f32 * 0.5;
        (center_column - grid_size as f32 / 2.0) * CELL_SIZE
    }
}

/// Overwrite every cell of `grid` with the default layout.
pub fn generate_default_layout(grid: &mut TerrainGrid) -> RiverLayout {
    let size = grid.size();
    let river_width = (size as f32 * RIVER_FRACTION) as i32;
    let start = size / 2 - river_width / 2;
    let end = start + river_width;

    for x in 0..size {
        let cell = if (start..end).contains(&x) {
            TerrainCell::Water
        } else if (start - BANK_WIDTH..start).contains(&x) || (end..end + BANK_WIDTH).contains(&x) {
            TerrainCell::Stone
        } else {
            TerrainCell::Grass
        };
        for z in 0..size {
            grid.set(x, z, cell);
        }
    }

    // Off-grid plaza cells fall away in `set`.
    let plaza_z = size / 3;
    let plaza_depth = size / 5;
    let left = start - BANK_WIDTH - PLAZA_WIDTH..start - BANK_WIDTH;
    let right = end + BANK_WIDTH..end + BANK_WIDTH + PLAZA_WIDTH;
    for z in plaza_z..plaza_z + plaza_depth {
        for x in left.clone().chain(right.clone()) {
            grid.set(x, z, TerrainCell::Stone);
        }
    }

    let mut layout = RiverLayout {
        start_column: start,
        end_column: end,
        boat_position: Vec3::ZERO,
        boat_rotation: 0.0,
    };
    layout.boat_position = Vec3::new(layout.center_world_x(size), BOAT_START_HEIGHT, 0.0);
    layout
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::terrain::GRID_SIZE;

    #[test]
    fn river_band_banks_and_grass() {
        let mut grid = TerrainGrid::new(GRID_SIZE);
        let layout = generate_default_layout(&mut grid);
        assert_eq!((layout.start_column, layout.end_column), (19, 31));

        // Row 0 is outside the plazas.
        for x in 0..GRID_SIZE {
            let expected = match x {
                19..=30 => TerrainCell::Water,
                16..=18 | 31..=33 => TerrainCell::Stone,
                _ => TerrainCell::Grass,
            };
            assert_eq!(grid.get(x, 0), expected, "column {x}");
        }
    }

    #[test]
    fn plazas_extend_from_the_banks() {
        let mut grid = TerrainGrid::new(GRID_SIZE);
        generate_default_layout(&mut grid);
        for z in 16..26 {
            for x in (13..16).chain(34..37) {
                assert_eq!(grid.get(x, z), TerrainCell::Stone, "({x}, {z})");
            }
        }
        assert_eq!(grid.get(13, 15), TerrainCell::Grass);
        assert_eq!(grid.get(13, 26), TerrainCell::Grass);
        assert_eq!(grid.get(12, 20), TerrainCell::Grass);
    }

    #[test]
    fn boat_starts_mid_river() {
        let mut grid = TerrainGrid::new(GRID_SIZE);
        let layout = generate_default_layout(&mut grid);
        assert_eq!(layout.center_world_x(GRID_SIZE), 0.0);
        let p = layout.boat_position;
        assert!(grid.is_water_at_world(p.x, p.z));
        assert_eq!(grid.world_to_cell(p.x, p.z).0, 25);
    }

    #[test]
    fn generation_is_idempotent() {
        let mut a = TerrainGrid::new(GRID_SIZE);
        generate_default_layout(&mut a);
        let mut b = a.clone();
        b.set(0, 0, TerrainCell::Water);
        generate_default_layout(&mut b);
        assert_eq!(a, b);
    }
}

// Grid terrain model for the water town diorama.
//
// Layer 1 of the scene: a fixed-size square grid of terrain cells.
// Pure data + accessors. Policy (undo, water-mesh invalidation, object
// pruning) lives in the scene editor, not here.
//
// Grid coordinates are signed so that callers can ask about any (x, z),
// including negatives; out-of-range reads return TerrainCell::Empty and
// out-of-range writes are ignored.

use glam::{Vec2, Vec3};

// ============================================================================
// CONSTANTS
// ============================================================================

/// Number of cells along each side of the grid. The save format validates
/// against this value, so it is a compile-time constant.
pub const GRID_SIZE: i32 = 50;
/// World units per cell. Cell (cx, cz) covers
/// [(cx - GRID_SIZE/2) * CELL_SIZE .. (cx + 1 - GRID_SIZE/2) * CELL_SIZE].
pub const CELL_SIZE: f32 = 0.5;

// ============================================================================
// TERRAIN CELL
// ============================================================================

/// Terrain type of one grid cell.
///
/// The integer codes are written to scene files. Reordering the variants
/// breaks old saves.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum TerrainCell {
    #[default]
    Empty,
    Grass,
    Water,
    Stone,
}

impl TerrainCell {
    pub const ALL: [TerrainCell; 4] = [
        TerrainCell::Empty,
        TerrainCell::Grass,
        TerrainCell::Water,
        TerrainCell::Stone,
    ];

    /// Stable integer code used by the scene file.
    pub fn code(self) -> u8 {
        self as u8
    }

    pub fn from_code(code: u8) -> Option<Self> {
        Self::ALL.get(code as usize).copied()
    }

    pub fn label(self) -> &'static str {
        match self {
            TerrainCell::Empty => "Empty",
            TerrainCell::Grass => "Grass",
            TerrainCell::Water => "Water",
            TerrainCell::Stone => "Stone",
        }
    }
}

// ============================================================================
// WATER QUAD
// ============================================================================

/// One water cell's footprint on the XZ plane, handed to the water surface
/// when its mesh is regenerated.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WaterQuad {
    pub min: Vec2,
    pub max: Vec2,
}

// ============================================================================
// TERRAIN GRID
// ============================================================================

/// Square grid of terrain cells, row-major by z.
#[derive(Debug, Clone, PartialEq)]
pub struct TerrainGrid {
    cells: Vec<TerrainCell>,
    size: i32,
}

impl TerrainGrid {
    /// All cells empty.
    pub fn new(size: i32) -> Self {
        let size = size.max(0);
        Self {
            cells: vec![TerrainCell::Empty; (size * size) as usize],
            size,
        }
    }

    pub fn size(&self) -> i32 {
        self.size
    }

    #[inline]
    pub fn in_bounds(&self, x: i32, z: i32) -> bool {
        x >= 0 && z >= 0 && x < self.size && z < self.size
    }

    #[inline]
    fn idx(&self, x: i32, z: i32) -> usize {
        (z * self.size + x) as usize
    }

    /// Stored type, or Empty for anything off the grid.
    pub fn get(&self, x: i32, z: i32) -> TerrainCell {
        if !self.in_bounds(x, z) {
            return TerrainCell::Empty;
        }
        self.cells[self.idx(x, z)]
    }

    /// Overwrite one cell. Silently ignored off the grid.
    pub fn set(&mut self, x: i32, z: i32, cell: TerrainCell) {
        if !self.in_bounds(x, z) {
            return;
        }
        let idx = self.idx(x, z);
        self.cells[idx] = cell;
    }

    pub fn fill(&mut self, cell: TerrainCell) {
        self.cells.fill(cell);
    }

    pub fn is_water(&self, x: i32, z: i32) -> bool {
        self.get(x, z) == TerrainCell::Water
    }

    /// Grid cell containing a world-space XZ position. May be off the grid;
    /// check with `in_bounds` or use `cell_at_world`.
    pub fn world_to_cell(&self, x: f32, z: f32) -> (i32, i32) {
        let half = self.size as f32 / 2.0;
        (
            (x / CELL_SIZE + half).floor() as i32,
            (z / CELL_SIZE + half).floor() as i32,
        )
    }

    /// Like `world_to_cell` but returns `None` off the grid.
    pub fn cell_at_world(&self, pos: Vec3) -> Option<(i32, i32)> {
        let (x, z) = self.world_to_cell(pos.x, pos.z);
        self.in_bounds(x, z).then_some((x, z))
    }

    /// World-space center of a grid cell (y = 0).
    pub fn cell_center(&self, x: i32, z: i32) -> Vec3 {
        let half = self.size as f32 / 2.0;
        Vec3::new(
            (x as f32 - half) * CELL_SIZE + CELL_SIZE * 0.5,
            0.0,
            (z as f32 - half) * CELL_SIZE + CELL_SIZE * 0.5,
        )
    }

    /// Half the grid's side length in world units.
    pub fn half_extent(&self) -> f32 {
        self.size as f32 * CELL_SIZE * 0.5
    }

    /// True if the world position lies on a water cell. Off-grid counts as unsafe.
    pub fn is_water_at_world(&self, x: f32, z: f32) -> bool {
        let (cx, cz) = self.world_to_cell(x, z);
        self.is_water(cx, cz)
    }

    /// Footprints of every water cell, in row-major order.
    pub fn water_quads(&self) -> Vec<WaterQuad> {
        let half = self.size as f32 / 2.0;
        let mut quads = Vec::new();
        for z in 0..self.size {
            for x in 0..self.size {
                if self.cells[self.idx(x, z)] != TerrainCell::Water {
                    continue;
                }
                let min = Vec2::new((x as f32 - half) * CELL_SIZE, (z as f32 - half) * CELL_SIZE);
                quads.push(WaterQuad { min, max: min + Vec2::splat(CELL_SIZE) });
            }
        }
        quads
    }

    /// Cell totals indexed by `TerrainCell::code()`.
    pub fn counts(&self) -> [usize; 4] {
        let mut counts = [0; 4];
        for cell in &self.cells {
            counts[cell.code() as usize] += 1;
        }
        counts
    }

    /// Iterate `(x, z, cell)` over the whole grid, row-major by z.
    pub fn iter(&self) -> impl Iterator<Item = (i32, i32, TerrainCell)> + '_ {
        let size = self.size;
        self.cells
            .iter()
            .enumerate()
            .map(move |(i, &cell)| (i as i32 % size, i as i32 / size, cell))
    }
}

impl Default for TerrainGrid {
    fn default() -> Self {
        Self::new(GRID_SIZE)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn out_of_range_reads_are_empty() {
        let mut grid = TerrainGrid::new(GRID_SIZE);
        grid.fill(TerrainCell::Grass);
        for &(x, z) in &[(-1, 0), (0, -1), (GRID_SIZE, 0), (0, GRID_SIZE), (i32::MIN, i32::MAX)] {
            assert_eq!(grid.get(x, z), TerrainCell::Empty, "({x}, {z})");
        }
        assert_eq!(grid.get(0, 0), TerrainCell::Grass);
    }

    #[test]
    fn out_of_range_writes_are_ignored() {
        let mut grid = TerrainGrid::new(4);
        let before = grid.clone();
        grid.set(-1, 2, TerrainCell::Water);
        grid.set(4, 0, TerrainCell::Water);
        grid.set(0, 4, TerrainCell::Water);
        assert_eq!(grid, before);
    }

    #[test]
    fn world_cell_mapping_round_trips_through_centers() {
        let grid = TerrainGrid::new(GRID_SIZE);
        for &(x, z) in &[(0, 0), (25, 25), (49, 0), (13, 37)] {
            let c = grid.cell_center(x, z);
            assert_eq!(grid.world_to_cell(c.x, c.z), (x, z));
        }
        // Origin sits on the corner shared by cells 24 and 25.
        assert_eq!(grid.world_to_cell(0.0, 0.0), (25, 25));
        assert_eq!(grid.world_to_cell(-0.01, -0.01), (24, 24));
        assert_eq!(grid.cell_at_world(Vec3::new(100.0, 0.0, 0.0)), None);
    }

    #[test]
    fn water_quads_cover_only_water_cells() {
        let mut grid = TerrainGrid::new(4);
        grid.set(1, 2, TerrainCell::Water);
        grid.set(3, 3, TerrainCell::Water);
        let quads = grid.water_quads();
        assert_eq!(quads.len(), 2);
        assert_eq!(quads[0].min, Vec2::new(-0.5, 0.0));
        assert_eq!(quads[0].max, Vec2::new(0.0, 0.5));
    }

    #[test]
    fn counts_match_contents() {
        let mut grid = TerrainGrid::new(3);
        grid.fill(TerrainCell::Grass);
        grid.set(0, 0, TerrainCell::Water);
        grid.set(1, 1, TerrainCell::Stone);
        assert_eq!(grid.counts(), [0, 7, 1, 1]);
    }

    #[test]
    fn codes_are_stable() {
        assert_eq!(TerrainCell::Water.code(), 2);
        assert_eq!(TerrainCell::from_code(3), Some(TerrainCell::Stone));
        assert_eq!(TerrainCell::from_code(4), None);
    }
}

use crate::cell::VoxelCell;
use cubecast_core::constants::MAX_GRID_DIM;
use cubecast_core::error::WorldError;
use cubecast_core::math::{in_bounds, linear_index};
use cubecast_core::types::{CellCoord, CoverageBox, ObjectId};

/// Outcome of placing one object's coverage box.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Placement {
    /// In-bounds, non-solid cells now listing the object.
    pub cells: u32,
    /// Cells that had no room left; the reference was dropped.
    pub dropped: u32,
}

/// Fixed-size cubic array of cells. Cells hold object ids as non-owning
/// back-references into the registry.
pub struct VoxelGrid {
    dim: u32,
    cells: Vec<VoxelCell>,
}

impl VoxelGrid {
    /// Allocate `dim^3` empty cells. Panics if `dim` is 0 or above
    /// `MAX_GRID_DIM`; validate configuration before calling.
    pub fn new(dim: u32) -> Self {
        assert!(
            dim > 0 && dim <= MAX_GRID_DIM,
            "grid dimension must be within 1..={MAX_GRID_DIM}, got {dim}"
        );
        let len = dim as usize * dim as usize * dim as usize;
        Self {
            dim,
            cells: vec![VoxelCell::EMPTY; len],
        }
    }

    pub fn dim(&self) -> u32 {
        self.dim
    }

    /// Total number of cells.
    pub fn len(&self) -> usize {
        self.cells.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    pub fn contains(&self, cell: CellCoord) -> bool {
        in_bounds(cell, self.dim)
    }

    /// Bounds-checked linear index of `cell`.
    pub fn index(&self, cell: CellCoord) -> Result<usize, WorldError> {
        if !self.contains(cell) {
            return Err(WorldError::OutOfBounds {
                coord: cell,
                dim: self.dim,
            });
        }
        Ok(linear_index(cell, self.dim))
    }

    pub fn cell(&self, cell: CellCoord) -> Result<&VoxelCell, WorldError> {
        let i = self.index(cell)?;
        Ok(&self.cells[i])
    }

    /// All cells in linear-index order.
    pub fn cells(&self) -> &[VoxelCell] {
        &self.cells
    }

    /// Raw bytes of the whole grid for staging.
    pub fn as_bytes(&self) -> &[u8] {
        bytemuck::cast_slice(&self.cells)
    }

    pub fn size_in_bytes(&self) -> u64 {
        (self.cells.len() * std::mem::size_of::<VoxelCell>()) as u64
    }

    /// Mark `cell` fully solid with `color`. Any listed occupants are dropped.
    pub fn set_voxel(&mut self, cell: CellCoord, color: u32) -> Result<(), WorldError> {
        let i = self.index(cell)?;
        self.cells[i] = VoxelCell::solid(color);
        Ok(())
    }

    /// List `id` in every in-bounds, non-solid cell of `coverage`.
    /// Out-of-grid cells are skipped. Full cells drop the reference.
    pub fn place(&mut self, id: ObjectId, coverage: &CoverageBox) -> Placement {
        let mut placement = Placement::default();
        for c in coverage.cells_within(self.dim) {
            let cell = &mut self.cells[linear_index(c, self.dim)];
            if cell.is_solid() {
                continue;
            }
            if cell.contains(id.0) {
                placement.cells += 1;
                continue;
            }
            if cell.push(id.0) {
                placement.cells += 1;
            } else {
                placement.dropped += 1;
            }
        }

        if placement.dropped > 0 {
            log::warn!(
                "object {} hit the per-cell occupant limit in {} cells around {}",
                id,
                placement.dropped,
                coverage.center
            );
        }
        placement
    }

    /// Swap-remove `id` from every cell of `coverage`. Returns how many
    /// cells listed it.
    pub fn remove(&mut self, id: ObjectId, coverage: &CoverageBox) -> u32 {
        let mut removed = 0;
        for c in coverage.cells_within(self.dim) {
            if self.cells[linear_index(c, self.dim)].swap_remove(id.0) {
                removed += 1;
            }
        }
        removed
    }

    /// Ids listed in `cell`.
    pub fn occupants(&self, cell: CellCoord) -> Result<&[u32], WorldError> {
        Ok(self.cell(cell)?.occupants())
    }

    /// Number of cells anywhere in the grid that list `id`.
    pub fn count_listing(&self, id: ObjectId) -> usize {
        self.cells.iter().filter(|c| c.contains(id.0)).count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use cubecast_core::constants::{FULL_SOLID, MAX_PER_CELL};
    use glam::IVec3;

    fn unit_box(center: IVec3) -> CoverageBox {
        CoverageBox::new(center, IVec3::ONE)
    }

    #[test]
    fn test_set_voxel_marks_solid() {
        let mut grid = VoxelGrid::new(8);
        grid.set_voxel(IVec3::new(1, 2, 3), 0xAABBCCFF).unwrap();
        let cell = grid.cell(IVec3::new(1, 2, 3)).unwrap();
        assert_eq!(cell.count, FULL_SOLID);
        assert_eq!(cell.color, 0xAABBCCFF);
    }

    #[test]
    fn test_set_voxel_out_of_bounds() {
        let mut grid = VoxelGrid::new(8);
        let err = grid.set_voxel(IVec3::new(8, 0, 0), 1).unwrap_err();
        assert_eq!(
            err,
            WorldError::OutOfBounds {
                coord: IVec3::new(8, 0, 0),
                dim: 8
            }
        );
        assert!(grid.set_voxel(IVec3::new(0, -1, 0), 1).is_err());
    }

    #[test]
    fn test_place_lists_id_in_every_box_cell() {
        let mut grid = VoxelGrid::new(8);
        let b = unit_box(IVec3::new(4, 4, 4));
        let placement = grid.place(ObjectId(3), &b);
        assert_eq!(placement, Placement { cells: 27, dropped: 0 });

        for c in b.cells() {
            assert_eq!(grid.occupants(c).unwrap(), &[3]);
        }
        assert_eq!(grid.count_listing(ObjectId(3)), 27);
        assert!(grid.occupants(IVec3::new(6, 4, 4)).unwrap().is_empty());
    }

    #[test]
    fn test_place_clips_at_grid_edge() {
        let mut grid = VoxelGrid::new(8);
        let placement = grid.place(ObjectId(0), &unit_box(IVec3::ZERO));
        assert_eq!(placement.cells, 8);
        assert_eq!(grid.count_listing(ObjectId(0)), 8);
    }

    #[test]
    fn test_place_skips_solid_cells() {
        let mut grid = VoxelGrid::new(8);
        grid.set_voxel(IVec3::new(4, 3, 4), 1).unwrap();
        let placement = grid.place(ObjectId(1), &unit_box(IVec3::new(4, 4, 4)));
        assert_eq!(placement.cells, 26);
        assert!(grid.cell(IVec3::new(4, 3, 4)).unwrap().is_solid());
    }

    #[test]
    fn test_place_twice_lists_once() {
        let mut grid = VoxelGrid::new(8);
        let b = unit_box(IVec3::new(4, 4, 4));
        grid.place(ObjectId(2), &b);
        grid.place(ObjectId(2), &b);
        assert_eq!(grid.occupants(IVec3::new(4, 4, 4)).unwrap(), &[2]);
    }

    #[test]
    fn test_place_then_remove_restores_grid() {
        let mut grid = VoxelGrid::new(8);
        grid.place(ObjectId(1), &unit_box(IVec3::new(3, 3, 3)));
        let before = grid.cells().to_vec();

        let b = unit_box(IVec3::new(4, 4, 4));
        grid.place(ObjectId(2), &b);
        assert_eq!(grid.remove(ObjectId(2), &b), 27);
        assert_eq!(grid.cells(), before.as_slice());
    }

    #[test]
    fn test_remove_missing_id_is_noop() {
        let mut grid = VoxelGrid::new(8);
        let b = unit_box(IVec3::new(4, 4, 4));
        grid.place(ObjectId(1), &b);
        assert_eq!(grid.remove(ObjectId(9), &b), 0);
        assert_eq!(grid.count_listing(ObjectId(1)), 27);
    }

    #[test]
    fn test_overflow_drops_extra_reference() {
        let mut grid = VoxelGrid::new(8);
        let shared = IVec3::new(4, 4, 4);
        for id in 0..MAX_PER_CELL as u32 {
            let p = grid.place(ObjectId(id), &unit_box(shared));
            assert_eq!(p.dropped, 0);
        }
        let extra = grid.place(ObjectId(MAX_PER_CELL as u32), &unit_box(shared));
        assert_eq!(extra.dropped, 27);

        let occupants = grid.occupants(shared).unwrap();
        assert_eq!(occupants.len(), MAX_PER_CELL);
        assert!(!occupants.contains(&(MAX_PER_CELL as u32)));
        for id in 0..MAX_PER_CELL as u32 {
            assert!(occupants.contains(&id));
        }
    }

    #[test]
    fn test_oversized_box_lists_whole_grid_once() {
        let mut grid = VoxelGrid::new(4);
        let b = CoverageBox::new(IVec3::splat(2), IVec3::splat(i32::MAX));
        assert_eq!(grid.place(ObjectId(1), &b), Placement { cells: 64, dropped: 0 });
        assert_eq!(grid.count_listing(ObjectId(1)), 64);
        assert_eq!(grid.remove(ObjectId(1), &b), 64);
        assert_eq!(grid.count_listing(ObjectId(1)), 0);
    }

    #[test]
    fn test_box_outside_grid_touches_nothing() {
        let mut grid = VoxelGrid::new(8);
        let b = CoverageBox::new(IVec3::splat(i32::MAX - 1), IVec3::splat(3));
        assert_eq!(grid.place(ObjectId(4), &b), Placement::default());
        assert_eq!(grid.count_listing(ObjectId(4)), 0);
        assert_eq!(grid.remove(ObjectId(4), &b), 0);
    }

    #[test]
    #[should_panic]
    fn test_zero_dim_is_fatal() {
        let _ = VoxelGrid::new(0);
    }
}

use cubecast_core::constants::{FULL_SOLID, MAX_PER_CELL};

/// One grid cell, laid out exactly as the WGSL `Voxel` struct.
///
/// `count` is either the number of valid entries in `ids` (0..=MAX_PER_CELL)
/// or [`FULL_SOLID`] for static geometry, in which case `ids` is unused and
/// `color` holds the packed RGBA of the voxel.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct VoxelCell {
    pub count: u32,
    pub color: u32,
    pub ids: [u32; MAX_PER_CELL],
}

impl Default for VoxelCell {
    fn default() -> Self {
        Self::EMPTY
    }
}

impl VoxelCell {
    pub const EMPTY: VoxelCell = VoxelCell {
        count: 0,
        color: 0,
        ids: [0; MAX_PER_CELL],
    };

    pub fn solid(color: u32) -> Self {
        Self {
            count: FULL_SOLID,
            color,
            ids: [0; MAX_PER_CELL],
        }
    }

    pub fn is_solid(&self) -> bool {
        self.count == FULL_SOLID
    }

    pub fn is_empty(&self) -> bool {
        self.count == 0
    }

    /// No room left for another occupant.
    pub fn is_full(&self) -> bool {
        !self.is_solid() && self.count as usize >= MAX_PER_CELL
    }

    /// Listed occupant ids. Always empty for a solid cell.
    pub fn occupants(&self) -> &[u32] {
        if self.is_solid() {
            &[]
        } else {
            &self.ids[..self.count as usize]
        }
    }

    pub fn contains(&self, id: u32) -> bool {
        self.occupants().contains(&id)
    }

    /// Append `id`. Returns false when the cell is solid or full.
    pub fn push(&mut self, id: u32) -> bool {
        if self.is_solid() || self.is_full() {
            return false;
        }
        self.ids[self.count as usize] = id;
        self.count += 1;
        true
    }

    /// Unordered O(1) removal: the last occupant takes the removed slot.
    /// Returns false when `id` is not listed.
    pub fn swap_remove(&mut self, id: u32) -> bool {
        let Some(pos) = self.occupants().iter().position(|&o| o == id) else {
            return false;
        };
        let last = self.count as usize - 1;
        self.ids[pos] = self.ids[last];
        self.ids[last] = 0;
        self.count -= 1;
        true
    }
}

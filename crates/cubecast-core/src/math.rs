use crate::types::{CellCoord, CoverageBox};
use glam::{IVec3, Vec3};

/// Cell containing a cell-space position.
pub fn cell_of(position: Vec3) -> CellCoord {
    position.floor().as_ivec3()
}

/// Per-axis cell extent of an object's box, inflated by one cell and
/// truncated toward zero. A half extent of 0.5 covers `center ± 1`.
pub fn coverage_extent(half_extent: Vec3) -> IVec3 {
    (half_extent + Vec3::ONE).max(Vec3::ZERO).as_ivec3()
}

/// Inflated coverage box for an object at `position` with `half_extent`.
pub fn coverage_box(position: Vec3, half_extent: Vec3) -> CoverageBox {
    CoverageBox::new(cell_of(position), coverage_extent(half_extent))
}

/// Whether `cell` lies inside `[0, dim)` on every axis.
pub fn in_bounds(cell: CellCoord, dim: u32) -> bool {
    let d = dim as i32;
    cell.x >= 0 && cell.x < d && cell.y >= 0 && cell.y < d && cell.z >= 0 && cell.z < d
}

/// Linear index `x + y*dim + z*dim^2`. Callers bounds-check first.
pub fn linear_index(cell: CellCoord, dim: u32) -> usize {
    let d = dim as usize;
    cell.x as usize + cell.y as usize * d + cell.z as usize * d * d
}

/// Inverse of [`linear_index`].
pub fn cell_from_index(index: usize, dim: u32) -> CellCoord {
    let d = dim as usize;
    IVec3::new((index % d) as i32, ((index / d) % d) as i32, (index / (d * d)) as i32)
}

/// Rotate `v` around the X axis by `angle` radians.
pub fn rotate_x(v: Vec3, angle: f32) -> Vec3 {
    let (s, c) = angle.sin_cos();
    Vec3::new(v.x, v.y * c - v.z * s, v.y * s + v.z * c)
}

/// Rotate `v` around the Y axis by `angle` radians.
pub fn rotate_y(v: Vec3, angle: f32) -> Vec3 {
    let (s, c) = angle.sin_cos();
    Vec3::new(v.x * c + v.z * s, v.y, -v.x * s + v.z * c)
}

/// Center of a cell in cell space.
pub fn cell_center(cell: CellCoord) -> Vec3 {
    cell.as_vec3() + Vec3::splat(0.5)
}

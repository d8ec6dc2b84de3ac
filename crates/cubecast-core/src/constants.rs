//! Single source of truth for shared constants.
//! These values are used by both Rust and WGSL. `cubecast_render::shader`
//! injects them into the ray march shader preamble.

/// Default side length of the cubic voxel grid.
pub const DEFAULT_GRID_DIM: u32 = 64;

/// Largest grid side accepted at construction (1024^3 cells).
pub const MAX_GRID_DIM: u32 = 1024;

/// Maximum number of object ids a single cell can list.
pub const MAX_PER_CELL: usize = 26;

/// Sentinel stored in a cell's occupant count when the cell is fully solid.
pub const FULL_SOLID: u32 = u32::MAX;

/// Default number of registry slots (and GPU mirror records).
pub const DEFAULT_OBJECT_CAPACITY: u32 = 4096;

/// Default ray march reach for interaction, in cell advances.
pub const DEFAULT_MAX_MARCH_STEPS: u32 = 10;

/// Bytes per GPU vec3 record (std430 stride of vec3<f32>).
pub const GPU_VEC3_BYTES: u64 = 16;

/// Default packed RGBA for a freshly created material slot.
pub const DEFAULT_COLOR: u32 = 0xFFFF_FFFF;

/// Default reflection factor for a freshly created material slot.
pub const DEFAULT_REFLECTION: f32 = 0.25;

/// Upper bound of the reflection factor.
pub const MAX_REFLECTION: f32 = 0.5;

/// Default roughness for a freshly created material slot.
pub const DEFAULT_ROUGHNESS: f32 = 0.08;

/// Upper bound of the roughness.
pub const MAX_ROUGHNESS: f32 = 0.25;

/// Degrees to radians.
pub const DEG_TO_RAD: f32 = 0.017_453_29;

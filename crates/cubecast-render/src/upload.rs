//! Staged upload of world mirrors. The planning half is pure and decides
//! which mirrors a drained [`Changes`] mask requires; [`GpuMirrors`] owns one
//! storage buffer per mirror and writes only the planned ones.

use cubecast_core::constants::GPU_VEC3_BYTES;
use cubecast_world::{Changes, VoxelCell, World};

use crate::gpu_types::{pack_vec3, GpuVec3};

/// One GPU-resident copy of world state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Mirror {
    Grid,
    Positions,
    Rotations,
    HalfExtents,
    Colors,
    Reflections,
    Roughness,
}

/// All mirrors in binding order.
pub const ALL_MIRRORS: [Mirror; 7] = [
    Mirror::Grid,
    Mirror::Positions,
    Mirror::Rotations,
    Mirror::HalfExtents,
    Mirror::Colors,
    Mirror::Reflections,
    Mirror::Roughness,
];

impl Mirror {
    /// Dirty bit that requires this mirror to be re-staged.
    pub fn trigger(self) -> Changes {
        match self {
            Mirror::Grid => Changes::GRID,
            Mirror::Positions => Changes::POSITION,
            Mirror::Rotations => Changes::ROTATION,
            Mirror::HalfExtents => Changes::HALF_SIZE,
            Mirror::Colors | Mirror::Reflections | Mirror::Roughness => Changes::MATERIAL,
        }
    }

    /// Bind slot in group 1 of ray_march.wgsl.
    pub fn binding(self) -> u32 {
        self as u32
    }

    pub fn label(self) -> &'static str {
        match self {
            Mirror::Grid => "mirror-grid",
            Mirror::Positions => "mirror-positions",
            Mirror::Rotations => "mirror-rotations",
            Mirror::HalfExtents => "mirror-half-extents",
            Mirror::Colors => "mirror-colors",
            Mirror::Reflections => "mirror-reflections",
            Mirror::Roughness => "mirror-roughness",
        }
    }

    /// Buffer size. Object mirrors are sized to registry capacity so they
    /// never need reallocation.
    pub fn size_in_bytes(self, grid_dim: u32, object_capacity: u32) -> u64 {
        let cap = object_capacity as u64;
        match self {
            Mirror::Grid => {
                let d = grid_dim as u64;
                d * d * d * std::mem::size_of::<VoxelCell>() as u64
            }
            Mirror::Positions | Mirror::Rotations | Mirror::HalfExtents => cap * GPU_VEC3_BYTES,
            Mirror::Colors => cap * std::mem::size_of::<u32>() as u64,
            Mirror::Reflections | Mirror::Roughness => cap * std::mem::size_of::<f32>() as u64,
        }
    }
}

/// Mirrors to re-stage for one drained change mask.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UploadPlan {
    mirrors: Vec<Mirror>,
}

impl UploadPlan {
    pub fn from_changes(changes: Changes) -> Self {
        let mirrors = ALL_MIRRORS
            .iter()
            .copied()
            .filter(|m| changes.intersects(m.trigger()))
            .collect();
        Self { mirrors }
    }

    pub fn mirrors(&self) -> &[Mirror] {
        &self.mirrors
    }

    pub fn includes(&self, mirror: Mirror) -> bool {
        self.mirrors.contains(&mirror)
    }

    pub fn is_empty(&self) -> bool {
        self.mirrors.is_empty()
    }

    /// Total bytes the plan will transfer.
    pub fn byte_count(&self, grid_dim: u32, object_capacity: u32) -> u64 {
        self.mirrors
            .iter()
            .map(|m| m.size_in_bytes(grid_dim, object_capacity))
            .sum()
    }
}

/// GPU storage buffers for every mirror, created once at init.
pub struct GpuMirrors {
    buffers: Vec<wgpu::Buffer>,
    grid_dim: u32,
    object_capacity: u32,
    /// Reused vec3 packing scratch.
    staging: Vec<GpuVec3>,
}

impl GpuMirrors {
    pub fn new(device: &wgpu::Device, world: &World) -> Self {
        let grid_dim = world.dim();
        let object_capacity = world.registry().capacity();
        let buffers = ALL_MIRRORS
            .iter()
            .map(|m| {
                device.create_buffer(&wgpu::BufferDescriptor {
                    label: Some(m.label()),
                    size: m.size_in_bytes(grid_dim, object_capacity),
                    usage: wgpu::BufferUsages::STORAGE | wgpu::BufferUsages::COPY_DST,
                    mapped_at_creation: false,
                })
            })
            .collect();

        log::info!(
            "GPU mirrors: {} bytes total",
            UploadPlan::from_changes(Changes::ALL).byte_count(grid_dim, object_capacity)
        );

        Self {
            buffers,
            grid_dim,
            object_capacity,
            staging: Vec::with_capacity(object_capacity as usize),
        }
    }

    pub fn buffer(&self, mirror: Mirror) -> &wgpu::Buffer {
        &self.buffers[mirror.binding() as usize]
    }

    /// Drain the world's tracker and write every mirror it requires.
    /// Must run after the previous frame's dispatch has been submitted;
    /// `write_buffer` is ordered before the next submission.
    pub fn sync(&mut self, queue: &wgpu::Queue, world: &World) -> UploadPlan {
        let plan = UploadPlan::from_changes(world.get_changed_and_clear());
        self.write(queue, world, &plan);
        plan
    }

    pub fn write(&mut self, queue: &wgpu::Queue, world: &World, plan: &UploadPlan) {
        debug_assert_eq!(world.dim(), self.grid_dim, "world resized under its mirrors");
        debug_assert_eq!(world.registry().capacity(), self.object_capacity);

        for &mirror in plan.mirrors() {
            let buffer = &self.buffers[mirror.binding() as usize];
            let registry = world.registry();
            let materials = world.materials();
            match mirror {
                Mirror::Grid => queue.write_buffer(buffer, 0, world.grid().as_bytes()),
                Mirror::Positions => {
                    pack_vec3(registry.positions(), &mut self.staging);
                    queue.write_buffer(buffer, 0, bytemuck::cast_slice(&self.staging));
                }
                Mirror::Rotations => {
                    pack_vec3(registry.rotations(), &mut self.staging);
                    queue.write_buffer(buffer, 0, bytemuck::cast_slice(&self.staging));
                }
                Mirror::HalfExtents => {
                    pack_vec3(registry.half_extents(), &mut self.staging);
                    queue.write_buffer(buffer, 0, bytemuck::cast_slice(&self.staging));
                }
                Mirror::Colors => {
                    queue.write_buffer(buffer, 0, bytemuck::cast_slice(materials.colors()))
                }
                Mirror::Reflections => {
                    queue.write_buffer(buffer, 0, bytemuck::cast_slice(materials.reflections()))
                }
                Mirror::Roughness => {
                    queue.write_buffer(buffer, 0, bytemuck::cast_slice(materials.roughness()))
                }
            }
        }
    }
}

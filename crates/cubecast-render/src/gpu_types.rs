use glam::Vec3;

/// One vec3 record in a storage mirror. Must match the `array<vec3<f32>>`
/// stride in ray_march.wgsl.
#[repr(C)]
#[derive(Clone, Copy, Debug, Default, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct GpuVec3 {
    pub xyz: [f32; 3],
    pub _pad: f32,
}

impl From<Vec3> for GpuVec3 {
    fn from(v: Vec3) -> Self {
        Self {
            xyz: v.to_array(),
            _pad: 0.0,
        }
    }
}

/// Per-dispatch constants. Must match `MarchParams` in ray_march.wgsl.
/// Every vec3 is followed by a scalar that fills its padding slot.
#[repr(C)]
#[derive(Clone, Copy, Debug, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct MarchPushConstants {
    pub camera_pos: [f32; 3],
    pub grid_size: u32,
    pub look_dir: [f32; 3],
    /// Vertical field of view in radians.
    pub fov: f32,
    pub right: [f32; 3],
    /// 0 = shaded, 1 = step-count heatmap.
    pub mode: u32,
    pub up: [f32; 3],
    pub max_steps: u32,
}

impl MarchPushConstants {
    pub const SIZE: u32 = std::mem::size_of::<Self>() as u32;
}

/// Pack host vectors into GPU records, reusing `out`'s allocation.
pub fn pack_vec3(src: &[Vec3], out: &mut Vec<GpuVec3>) {
    out.clear();
    out.extend(src.iter().copied().map(GpuVec3::from));
}

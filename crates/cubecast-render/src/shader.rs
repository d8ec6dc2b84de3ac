use cubecast_core::constants::{FULL_SOLID, MAX_PER_CELL};

/// Upper bound on in-shader cell advances per primary ray.
pub const MAX_STEPS: u32 = 512;

const RAY_MARCH_WGSL: &str = include_str!("../../../shaders/ray_march.wgsl");

/// Constants shared with the shader, generated from the Rust values.
pub fn preamble(grid_dim: u32) -> String {
    format!(
        "const GRID_DIM: u32 = {grid_dim}u;\n\
         const MAX_PER_CELL: u32 = {MAX_PER_CELL}u;\n\
         const FULL_SOLID: u32 = {FULL_SOLID}u;\n\
         const MAX_STEPS: u32 = {MAX_STEPS}u;\n"
    )
}

/// Full ray march source: preamble + shader body.
pub fn compose(grid_dim: u32) -> String {
    format!("{}\n{RAY_MARCH_WGSL}", preamble(grid_dim))
}

pub fn create_module(device: &wgpu::Device, grid_dim: u32) -> wgpu::ShaderModule {
    device.create_shader_module(wgpu::ShaderModuleDescriptor {
        label: Some("ray-march-shader"),
        source: wgpu::ShaderSource::Wgsl(compose(grid_dim).into()),
    })
}

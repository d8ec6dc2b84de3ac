use cubecast_core::config::WorldConfig;
use cubecast_render::Camera;
use glam::{IVec3, Vec3};

use crate::hash::bench_hash;

/// Configuration for a single benchmark scene.
#[derive(Debug, Clone)]
pub struct SceneConfig {
    pub name: &'static str,
    pub grid_dim: u32,
    pub object_count: u32,
    /// Primary rays per frame as (columns, rows).
    pub ray_fan: (u32, u32),
}

impl SceneConfig {
    /// World settings for this scene. Capacity leaves room for every
    /// requested object.
    pub fn world_config(&self) -> WorldConfig {
        WorldConfig {
            grid_dim: self.grid_dim,
            object_capacity: self.object_count.max(1),
            max_march_steps: self.grid_dim * 3,
            ..WorldConfig::default()
        }
    }

    /// Viewer outside the -Z face, above the floor, pitched down.
    pub fn camera(&self) -> Camera {
        let d = self.grid_dim as f32;
        Camera {
            position: Vec3::new(d * 0.5, d * 0.6, -2.0),
            rotation: Vec3::new(0.45, 0.0, 0.0),
            fov_degrees: 70.0,
        }
    }
}

/// Standard suite. `object_override` replaces each scene's object count.
pub fn standard_scenes(object_override: Option<u32>) -> Vec<SceneConfig> {
    let scenes = [
        ("small-32", 32, 256),
        ("medium-64", 64, 1024),
        ("large-96", 96, 4096),
    ];
    scenes
        .iter()
        .map(|&(name, grid_dim, objects)| SceneConfig {
            name,
            grid_dim,
            object_count: object_override.unwrap_or(objects),
            ray_fan: (80, 60),
        })
        .collect()
}

/// Distinct spawn cells above `floor_layers`, picked deterministically.
/// Returns fewer than `count` when the space above the floor runs out.
pub fn spawn_cells(grid_dim: u32, floor_layers: u32, count: u32) -> Vec<IVec3> {
    let d = grid_dim as i32;
    let floor = floor_layers.min(grid_dim) as i32;
    let open = (d - floor).max(0) as usize * (d * d) as usize;
    let want = (count as usize).min(open);

    let layer = (d - floor).max(1) as usize;
    let mut taken = vec![false; open];
    let mut cells = Vec::with_capacity(want);
    for attempt in 0..want as u32 {
        let mut i = bench_hash(attempt as i32, d, floor, 0x5EED) as usize % open;
        // Linear probe to the next free slot.
        while taken[i] {
            i = (i + 1) % open;
        }
        taken[i] = true;
        let du = d as usize;
        cells.push(IVec3::new(
            (i % du) as i32,
            floor + ((i / du) % layer) as i32,
            (i / (du * layer)) as i32,
        ));
    }
    cells
}

use std::time::Instant;

use cubecast_core::math::cell_center;
use cubecast_render::gpu_types::{pack_vec3, GpuVec3};
use cubecast_render::{march, Mirror, UploadPlan};
use cubecast_sim::{BodyTable, KinematicPhysics, PhysicsBridge};
use cubecast_world::World;
use glam::Vec3;

use crate::hash::{bench_hash, signed_float};
use crate::scenes::{spawn_cells, SceneConfig};

const TICK_DT: f32 = 1.0 / 60.0;

/// Timing data for a single benchmark run.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct TimingSeries {
    pub mean_ms: f64,
    pub median_ms: f64,
    pub p95_ms: f64,
    pub p99_ms: f64,
    pub min_ms: f64,
    pub max_ms: f64,
}

/// Mean time per frame phase.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct PhaseTimings {
    pub sim_ms: f64,
    pub upload_ms: f64,
    pub march_ms: f64,
}

/// Result of a single scene benchmark.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct BenchmarkResult {
    pub scene_name: String,
    pub grid_dim: u32,
    pub object_count: u32,
    pub tick_count: u32,
    /// Frames in which the grid mirror had to be re-staged.
    pub grid_uploads: u32,
    pub mean_upload_bytes: f64,
    pub rays_per_frame: u32,
    /// Fraction of primary rays that hit something, over all frames.
    pub hit_ratio: f64,
    pub timings: TimingSeries,
    pub phases: PhaseTimings,
}

/// Host-side stand-in for the GPU mirrors: the same planning and packing
/// as `GpuMirrors`, written into reusable vectors.
struct HostStaging {
    grid: Vec<u8>,
    vec3: Vec<GpuVec3>,
    scalars: Vec<u8>,
}

impl HostStaging {
    fn new(world: &World) -> Self {
        Self {
            grid: Vec::with_capacity(world.grid().size_in_bytes() as usize),
            vec3: Vec::with_capacity(world.registry().capacity() as usize),
            scalars: Vec::new(),
        }
    }

    /// Returns bytes staged.
    fn stage(&mut self, world: &World, plan: &UploadPlan) -> u64 {
        let mut bytes = 0u64;
        for &mirror in plan.mirrors() {
            match mirror {
                Mirror::Grid => {
                    self.grid.clear();
                    self.grid.extend_from_slice(world.grid().as_bytes());
                    bytes += self.grid.len() as u64;
                }
                Mirror::Positions | Mirror::Rotations | Mirror::HalfExtents => {
                    let registry = world.registry();
                    let src = match mirror {
                        Mirror::Positions => registry.positions(),
                        Mirror::Rotations => registry.rotations(),
                        _ => registry.half_extents(),
                    };
                    pack_vec3(src, &mut self.vec3);
                    bytes += std::mem::size_of_val(self.vec3.as_slice()) as u64;
                }
                Mirror::Colors | Mirror::Reflections | Mirror::Roughness => {
                    let materials = world.materials();
                    self.scalars.clear();
                    let src: &[u8] = match mirror {
                        Mirror::Colors => bytemuck::cast_slice(materials.colors()),
                        Mirror::Reflections => bytemuck::cast_slice(materials.reflections()),
                        _ => bytemuck::cast_slice(materials.roughness()),
                    };
                    self.scalars.extend_from_slice(src);
                    bytes += self.scalars.len() as u64;
                }
            }
        }
        bytes
    }
}

/// Runs CPU-side frames: physics sync, upload staging and a primary ray fan.
pub struct BenchmarkRunner {
    tick_count: u32,
}

impl BenchmarkRunner {
    pub fn new(tick_count: u32) -> Self {
        Self { tick_count }
    }

    /// Run a single benchmark scene and return timing results.
    pub fn run_scene(&self, scene: &SceneConfig) -> BenchmarkResult {
        log::info!(
            "Running scene '{}' ({}^3 grid, {} objects)...",
            scene.name,
            scene.grid_dim,
            scene.object_count
        );

        let config = scene.world_config();
        let mut world = match World::from_config(&config) {
            Ok(world) => world,
            Err(e) => {
                log::error!("scene '{}' has an invalid config: {}", scene.name, e);
                return empty_result(scene, self.tick_count);
            }
        };
        let mut physics = KinematicPhysics::new(config.floor_layers.min(config.grid_dim) as f32);
        let mut bodies = BodyTable::new();

        let half_extent = Vec3::splat(config.cube_half_extent);
        for cell in spawn_cells(config.grid_dim, config.floor_layers, scene.object_count) {
            match world.spawn_object(cell, half_extent, Vec3::ZERO) {
                Ok(id) => {
                    if let Err(e) = world.set_color(id, config.cube_color) {
                        log::warn!("coloring object {} failed: {}", id, e);
                    }
                    bodies.insert(id, physics.create_box(cell_center(cell), half_extent));
                }
                Err(e) => {
                    log::warn!("spawn at {} failed: {}", cell, e);
                    break;
                }
            }
        }
        log::info!("  Spawned {} objects", world.registry().len());

        let mut staging = HostStaging::new(&world);
        let camera = scene.camera();
        let (cols, rows) = scene.ray_fan;
        let aspect = cols as f32 / rows.max(1) as f32;
        let ids: Vec<_> = world.registry().iter().collect();

        let mut frame_times = Vec::with_capacity(self.tick_count as usize);
        let (mut sim_total, mut upload_total, mut march_total) = (0.0, 0.0, 0.0);
        let mut grid_uploads = 0u32;
        let mut upload_bytes = 0u64;
        let mut hits = 0u64;

        for tick in 0..self.tick_count {
            let frame_start = Instant::now();

            // Kick and spin an eighth of the bodies, then let physics settle them.
            for (n, &id) in ids.iter().enumerate() {
                let h = bench_hash(n as i32, id.0 as i32, 0, tick);
                if h % 8 != 0 {
                    continue;
                }
                if let Some(body) = bodies.get(id) {
                    let kick = Vec3::new(
                        signed_float(h),
                        signed_float(h.rotate_left(11)).abs() * 4.0,
                        signed_float(h.rotate_left(22)),
                    );
                    physics.push(body, kick);
                    physics.spin(body, Vec3::new(0.0, signed_float(h) * 6.0, 0.0));
                }
            }
            physics.step(TICK_DT);
            bodies.sync_from_physics(&mut world, &physics);
            let sim_done = Instant::now();

            let plan = UploadPlan::from_changes(world.get_changed_and_clear());
            if plan.includes(Mirror::Grid) {
                grid_uploads += 1;
            }
            upload_bytes += staging.stage(&world, &plan);
            let upload_done = Instant::now();

            for row in 0..rows {
                for col in 0..cols {
                    let x = (col as f32 + 0.5) / cols as f32 * 2.0 - 1.0;
                    let y = (row as f32 + 0.5) / rows as f32 * 2.0 - 1.0;
                    let dir = camera.ray_direction(x, y, aspect);
                    if march(&world, camera.position, dir, config.max_march_steps).hit {
                        hits += 1;
                    }
                }
            }
            let march_done = Instant::now();

            sim_total += (sim_done - frame_start).as_secs_f64() * 1000.0;
            upload_total += (upload_done - sim_done).as_secs_f64() * 1000.0;
            march_total += (march_done - upload_done).as_secs_f64() * 1000.0;
            frame_times.push((march_done - frame_start).as_secs_f64() * 1000.0);
        }

        let timings = compute_timings(&frame_times);
        log::info!(
            "  Done: mean={:.2}ms, p95={:.2}ms, p99={:.2}ms",
            timings.mean_ms,
            timings.p95_ms,
            timings.p99_ms
        );

        let ticks = self.tick_count.max(1) as f64;
        let rays = cols * rows;
        BenchmarkResult {
            scene_name: scene.name.to_string(),
            grid_dim: scene.grid_dim,
            object_count: world.registry().len(),
            tick_count: self.tick_count,
            grid_uploads,
            mean_upload_bytes: upload_bytes as f64 / ticks,
            rays_per_frame: rays,
            hit_ratio: hits as f64 / (rays as f64 * ticks).max(1.0),
            timings,
            phases: PhaseTimings {
                sim_ms: sim_total / ticks,
                upload_ms: upload_total / ticks,
                march_ms: march_total / ticks,
            },
        }
    }
}

fn empty_result(scene: &SceneConfig, tick_count: u32) -> BenchmarkResult {
    BenchmarkResult {
        scene_name: scene.name.to_string(),
        grid_dim: scene.grid_dim,
        object_count: 0,
        tick_count,
        grid_uploads: 0,
        mean_upload_bytes: 0.0,
        rays_per_frame: 0,
        hit_ratio: 0.0,
        timings: compute_timings(&[]),
        phases: PhaseTimings {
            sim_ms: 0.0,
            upload_ms: 0.0,
            march_ms: 0.0,
        },
    }
}

/// Compute timing statistics from a list of frame times in milliseconds.
pub fn compute_timings(times: &[f64]) -> TimingSeries {
    if times.is_empty() {
        return TimingSeries {
            mean_ms: 0.0,
            median_ms: 0.0,
            p95_ms: 0.0,
            p99_ms: 0.0,
            min_ms: 0.0,
            max_ms: 0.0,
        };
    }

    let mut sorted = times.to_vec();
    sorted.sort_by(|a, b| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal));

    let n = sorted.len();
    let mean = sorted.iter().sum::<f64>() / n as f64;
    let median = if n % 2 == 0 {
        (sorted[n / 2 - 1] + sorted[n / 2]) / 2.0
    } else {
        sorted[n / 2]
    };
    let p95_idx = ((n as f64) * 0.95).ceil() as usize;
    let p99_idx = ((n as f64) * 0.99).ceil() as usize;

    TimingSeries {
        mean_ms: mean,
        median_ms: median,
        p95_ms: sorted[p95_idx.min(n - 1)],
        p99_ms: sorted[p99_idx.min(n - 1)],
        min_ms: sorted[0],
        max_ms: sorted[n - 1],
    }
}

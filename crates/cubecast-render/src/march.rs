//! CPU grid DDA. Mirrors `march_grid` in ray_march.wgsl step for step so
//! picking agrees with what is drawn.
use cubecast_core::direction::{Axis, Face, ALL_AXES};
use cubecast_core::math::in_bounds;
use cubecast_core::types::{CellCoord, ObjectId};
use cubecast_world::{Probe, World};
use glam::{IVec3, Vec3};

/// First occupied cell along a ray.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HitResult {
    pub hit: bool,
    pub cell: CellCoord,
    /// Occupant that produced the hit. None for solid voxels and misses.
    pub object: Option<ObjectId>,
    /// Ray parameter from the origin to the entry point of `cell`.
    pub distance: f32,
    /// Outward normal of the face the ray entered `cell` through.
    pub normal: Vec3,
    /// `origin + dir * distance`.
    pub position: Vec3,
}

impl HitResult {
    pub const fn miss() -> Self {
        HitResult {
            hit: false,
            cell: IVec3::ZERO,
            object: None,
            distance: 0.0,
            normal: Vec3::ZERO,
            position: Vec3::ZERO,
        }
    }

    /// Cell on the near side of the hit face, where a new block goes.
    pub fn adjacent_cell(&self) -> CellCoord {
        self.cell + self.normal.as_ivec3()
    }
}

/// Parametric interval where the ray overlaps `[0, dim]^3`, plus the
/// axis whose slab was entered last. `None` if the ray never touches it.
fn clip_to_grid(origin: Vec3, dir: Vec3, dim: f32) -> Option<(f32, f32, Option<Axis>)> {
    let mut t_enter = 0.0_f32;
    let mut t_exit = f32::INFINITY;
    let mut entry_axis = None;

    for axis in ALL_AXES {
        let a = axis.index();
        let (o, d) = (origin[a], dir[a]);
        if d == 0.0 {
            if o < 0.0 || o >= dim {
                return None;
            }
            continue;
        }
        let t0 = (0.0 - o) / d;
        let t1 = (dim - o) / d;
        let (near, far) = if t0 < t1 { (t0, t1) } else { (t1, t0) };
        if near > t_enter {
            t_enter = near;
            entry_axis = Some(axis);
        }
        t_exit = t_exit.min(far);
    }

    if t_enter > t_exit || t_exit <= 0.0 {
        None
    } else {
        Some((t_enter, t_exit, entry_axis))
    }
}

fn step_of(d: f32) -> i32 {
    if d > 0.0 {
        1
    } else if d < 0.0 {
        -1
    } else {
        0
    }
}

fn entered_normal(axis: Axis, dir: Vec3) -> Vec3 {
    Face::entered(axis, dir[axis.index()] > 0.0).normal()
}

/// Step `origin + t * direction` cell by cell and return the first cell
/// `World::probe` reports as hit.
///
/// The start cell (or entry cell, for origins outside the grid) is checked
/// first; `max_steps` then bounds the number of further cell advances.
/// Running out of steps or leaving the grid is a miss.
pub fn march(world: &World, origin: Vec3, direction: Vec3, max_steps: u32) -> HitResult {
    let dir = direction.normalize_or_zero();
    if dir == Vec3::ZERO {
        return HitResult::miss();
    }

    let dim = world.dim();
    let Some((t_enter, _t_exit, entry_axis)) = clip_to_grid(origin, dir, dim as f32) else {
        return HitResult::miss();
    };

    let mut normal = match entry_axis {
        Some(axis) => entered_normal(axis, dir),
        None => entered_normal(Axis::dominant(dir), dir),
    };

    let entry = origin + dir * t_enter;
    let max_cell = dim as i32 - 1;
    let mut cell = entry.floor().as_ivec3().clamp(IVec3::ZERO, IVec3::splat(max_cell));
    // Cell chosen by the entry axis, not by rounding on the boundary plane.
    if let Some(axis) = entry_axis {
        let a = axis.index();
        cell[a] = if dir[a] > 0.0 { 0 } else { max_cell };
    }

    let step = IVec3::new(step_of(dir.x), step_of(dir.y), step_of(dir.z));
    let mut t_max = Vec3::INFINITY;
    let mut t_delta = Vec3::INFINITY;
    for axis in ALL_AXES {
        let a = axis.index();
        if step[a] == 0 {
            continue;
        }
        let boundary = if step[a] > 0 { cell[a] + 1 } else { cell[a] } as f32;
        t_max[a] = (boundary - origin[a]) / dir[a];
        t_delta[a] = 1.0 / dir[a].abs();
    }

    let mut t = t_enter;
    let mut advances = 0;
    loop {
        if !in_bounds(cell, dim) {
            return HitResult::miss();
        }

        // in_bounds checked above, so probe cannot fail
        let found = world.probe(cell).unwrap_or(Probe::Empty);
        if found.is_hit() {
            let object = match found {
                Probe::Object(id) => Some(id),
                _ => None,
            };
            return HitResult {
                hit: true,
                cell,
                object,
                distance: t,
                normal,
                position: origin + dir * t,
            };
        }

        if advances == max_steps {
            return HitResult::miss();
        }
        advances += 1;

        let axis = if t_max.x <= t_max.y && t_max.x <= t_max.z {
            Axis::X
        } else if t_max.y <= t_max.z {
            Axis::Y
        } else {
            Axis::Z
        };
        let a = axis.index();
        t = t_max[a];
        cell[a] += step[a];
        t_max[a] += t_delta[a];
        normal = entered_normal(axis, dir);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn world_with_solid(dim: u32, cell: IVec3) -> World {
        let mut world = World::new(dim, 16);
        world.set_voxel(cell, 0xFF00_00FF).unwrap();
        world
    }

    #[test]
    fn test_hit_solid_from_outside_faces_origin() {
        let world = world_with_solid(16, IVec3::new(8, 8, 8));
        let origin = Vec3::new(-5.0, 8.5, 8.5);
        let hit = march(&world, origin, Vec3::X, 64);

        assert!(hit.hit, "ray along +X should hit the solid cell");
        assert_eq!(hit.cell, IVec3::new(8, 8, 8));
        assert_eq!(hit.normal, Vec3::new(-1.0, 0.0, 0.0));
        assert_eq!(hit.object, None);
        assert!((hit.distance - 13.0).abs() < 1e-4, "distance {}", hit.distance);
        assert!((hit.position - Vec3::new(8.0, 8.5, 8.5)).length() < 1e-4);
        assert_eq!(hit.adjacent_cell(), IVec3::new(7, 8, 8));
    }

    #[test]
    fn test_hit_from_each_side() {
        let world = world_with_solid(16, IVec3::new(8, 8, 8));
        let center = Vec3::splat(8.5);
        for face in cubecast_core::direction::ALL_FACES {
            let origin = center + face.normal() * 20.0;
            let hit = march(&world, origin, center - origin, 64);
            assert!(hit.hit, "{face:?}");
            assert_eq!(hit.normal, face.normal(), "{face:?}");
        }
    }

    #[test]
    fn test_max_steps_too_short_is_miss() {
        let world = world_with_solid(16, IVec3::new(10, 2, 2));
        let origin = Vec3::new(2.5, 2.5, 2.5);
        assert!(!march(&world, origin, Vec3::X, 7).hit);
        assert!(march(&world, origin, Vec3::X, 8).hit);
    }

    #[test]
    fn test_leaving_grid_is_miss() {
        let world = World::new(8, 4);
        let hit = march(&world, Vec3::splat(4.5), Vec3::new(0.3, 1.0, -0.2), 1000);
        assert!(!hit.hit);
    }

    #[test]
    fn test_ray_missing_grid() {
        let world = world_with_solid(8, IVec3::new(0, 0, 0));
        assert!(!march(&world, Vec3::new(-1.0, 20.0, -1.0), Vec3::X, 100).hit);
        assert!(!march(&world, Vec3::new(-1.0, 0.5, 0.5), -Vec3::X, 100).hit);
    }

    #[test]
    fn test_zero_direction_is_miss() {
        let world = world_with_solid(8, IVec3::new(1, 1, 1));
        assert_eq!(march(&world, Vec3::splat(1.5), Vec3::ZERO, 10), HitResult::miss());
    }

    #[test]
    fn test_start_cell_reports_zero_distance() {
        let world = world_with_solid(8, IVec3::new(3, 3, 3));
        let hit = march(&world, Vec3::splat(3.5), Vec3::new(0.0, -1.0, 0.2), 0);
        assert!(hit.hit);
        assert_eq!(hit.distance, 0.0);
        assert_eq!(hit.normal, Vec3::Y);
    }

    #[test]
    fn test_corner_graze_steps_x_first() {
        // Diagonal from a cell center crosses the x and y boundaries at once.
        let mut world = World::new(8, 4);
        world.set_voxel(IVec3::new(2, 1, 1), 1).unwrap();
        world.set_voxel(IVec3::new(1, 2, 1), 2).unwrap();
        let hit = march(&world, Vec3::new(1.5, 1.5, 1.5), Vec3::new(1.0, 1.0, 0.0), 4);
        assert!(hit.hit);
        assert_eq!(hit.cell, IVec3::new(2, 1, 1));
        assert_eq!(hit.normal, Vec3::new(-1.0, 0.0, 0.0));
    }

    #[test]
    fn test_hits_object_center_not_inflated_neighbors() {
        let mut world = World::new(16, 8);
        let id = world
            .spawn_object(IVec3::new(8, 4, 4), Vec3::splat(0.5), Vec3::ZERO)
            .unwrap();
        let hit = march(&world, Vec3::new(2.5, 4.5, 4.5), Vec3::X, 20);
        assert!(hit.hit);
        assert_eq!(hit.cell, IVec3::new(8, 4, 4));
        assert_eq!(hit.object, Some(id));
        assert_eq!(hit.adjacent_cell(), IVec3::new(7, 4, 4));
    }

    #[test]
    fn test_negative_direction_entry_cell() {
        let world = world_with_solid(8, IVec3::new(7, 3, 3));
        let hit = march(&world, Vec3::new(20.0, 3.5, 3.5), -Vec3::X, 1);
        assert!(hit.hit);
        assert_eq!(hit.cell, IVec3::new(7, 3, 3));
        assert_eq!(hit.normal, Vec3::X);
    }
}

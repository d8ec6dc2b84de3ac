//! Player actions resolved by marching the view ray: place a cube against
//! the hit face, remove the hit cube, or push it.

use cubecast_core::config::WorldConfig;
use cubecast_core::error::WorldError;
use cubecast_core::math::cell_center;
use cubecast_core::types::ObjectId;
use cubecast_render::{look_direction, march, HitResult};
use cubecast_world::World;
use glam::Vec3;

use crate::physics::{BodyTable, PhysicsBridge};

/// Push strength levels, indexing `WorldConfig::push_forces`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PushStrength {
    Low = 0,
    Medium = 1,
    High = 2,
}

impl PushStrength {
    pub fn force(self, config: &WorldConfig) -> f32 {
        config.push_forces[self as usize]
    }
}

fn view_hit(world: &World, config: &WorldConfig, eye: Vec3, rotation: Vec3) -> HitResult {
    march(world, eye, look_direction(rotation), config.max_march_steps)
}

/// Spawn a cube in the cell in front of the hit face. Returns None when
/// nothing is in reach or the target cell is outside the grid or taken.
pub fn place_block(
    world: &mut World,
    physics: &mut dyn PhysicsBridge,
    bodies: &mut BodyTable,
    config: &WorldConfig,
    eye: Vec3,
    rotation: Vec3,
) -> Result<Option<ObjectId>, WorldError> {
    let hit = view_hit(world, config, eye, rotation);
    if !hit.hit {
        return Ok(None);
    }

    let cell = hit.adjacent_cell();
    if !world.grid().contains(cell) || world.occupied(cell)? {
        log::debug!("place rejected at {}", cell);
        return Ok(None);
    }

    let half_extent = Vec3::splat(config.cube_half_extent);
    let id = world.spawn_object(cell, half_extent, Vec3::ZERO)?;
    world.set_color(id, config.cube_color)?;
    let body = physics.create_box(cell_center(cell), half_extent);
    bodies.insert(id, body);
    Ok(Some(id))
}

/// Remove the cube under the view ray. Solid voxels are not removable.
pub fn remove_block(
    world: &mut World,
    physics: &mut dyn PhysicsBridge,
    bodies: &mut BodyTable,
    config: &WorldConfig,
    eye: Vec3,
    rotation: Vec3,
) -> Result<Option<ObjectId>, WorldError> {
    let hit = view_hit(world, config, eye, rotation);
    let Some(id) = hit.object else {
        return Ok(None);
    };

    world.remove_object(id)?;
    match bodies.remove(id) {
        Some(body) => physics.destroy_box(body),
        None => log::warn!("removed object {} had no physics body", id),
    }
    Ok(Some(id))
}

/// Push the cube under the view ray into the hit face.
pub fn push_block(
    world: &World,
    physics: &mut dyn PhysicsBridge,
    bodies: &BodyTable,
    config: &WorldConfig,
    eye: Vec3,
    rotation: Vec3,
    strength: PushStrength,
) -> Option<ObjectId> {
    let hit = view_hit(world, config, eye, rotation);
    let id = hit.object?;
    let Some(body) = bodies.get(id) else {
        log::warn!("push target {} has no physics body", id);
        return None;
    };
    physics.push(body, -hit.normal * strength.force(config));
    Some(id)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::physics::{BodyHandle, BodyTransform};
    use glam::IVec3;

    #[derive(Default)]
    struct RecordingPhysics {
        created: Vec<(Vec3, Vec3)>,
        destroyed: Vec<BodyHandle>,
        pushes: Vec<(BodyHandle, Vec3)>,
    }

    impl PhysicsBridge for RecordingPhysics {
        fn create_box(&mut self, center: Vec3, half_extent: Vec3) -> BodyHandle {
            self.created.push((center, half_extent));
            BodyHandle(self.created.len() as u64 - 1)
        }
        fn destroy_box(&mut self, body: BodyHandle) {
            self.destroyed.push(body);
        }
        fn body_transform(&self, body: BodyHandle) -> Option<BodyTransform> {
            self.created.get(body.0 as usize).map(|&(center, _)| BodyTransform {
                center,
                rotation: Vec3::ZERO,
            })
        }
        fn push(&mut self, body: BodyHandle, impulse: Vec3) {
            self.pushes.push((body, impulse));
        }
    }

    fn setup() -> (World, RecordingPhysics, BodyTable, WorldConfig) {
        let config = WorldConfig {
            grid_dim: 16,
            object_capacity: 32,
            ..WorldConfig::default()
        };
        let world = World::from_config(&config).unwrap();
        (world, RecordingPhysics::default(), BodyTable::new(), config)
    }

    /// Looking straight down (+pi/2 pitch) from above the floor.
    fn looking_down() -> Vec3 {
        Vec3::new(std::f32::consts::FRAC_PI_2, 0.0, 0.0)
    }

    #[test]
    fn test_place_on_floor() {
        let (mut world, mut physics, mut bodies, config) = setup();
        let eye = Vec3::new(5.5, 6.5, 5.5);
        let id = place_block(&mut world, &mut physics, &mut bodies, &config, eye, looking_down())
            .unwrap()
            .expect("floor is within reach");

        assert_eq!(world.registry().position(id).unwrap(), Vec3::new(5.0, 2.0, 5.0));
        assert_eq!(world.material(id).unwrap().color, 0x992112FF);
        assert_eq!(physics.created, vec![(Vec3::new(5.5, 2.5, 5.5), Vec3::splat(0.5))]);
        assert!(bodies.get(id).is_some());
    }

    #[test]
    fn test_place_stacks_on_cube() {
        let (mut world, mut physics, mut bodies, config) = setup();
        let eye = Vec3::new(5.5, 8.5, 5.5);
        place_block(&mut world, &mut physics, &mut bodies, &config, eye, looking_down()).unwrap();
        let second = place_block(&mut world, &mut physics, &mut bodies, &config, eye, looking_down())
            .unwrap()
            .unwrap();
        assert_eq!(world.object_at(IVec3::new(5, 3, 5)), Some(second));
    }

    #[test]
    fn test_place_out_of_reach() {
        let (mut world, mut physics, mut bodies, config) = setup();
        let eye = Vec3::new(5.5, 15.5, 5.5);
        let placed =
            place_block(&mut world, &mut physics, &mut bodies, &config, eye, looking_down()).unwrap();
        assert_eq!(placed, None);
        assert!(physics.created.is_empty());
    }

    #[test]
    fn test_remove_only_objects() {
        let (mut world, mut physics, mut bodies, config) = setup();
        let eye = Vec3::new(5.5, 6.5, 5.5);

        let removed =
            remove_block(&mut world, &mut physics, &mut bodies, &config, eye, looking_down()).unwrap();
        assert_eq!(removed, None, "floor voxels are not removable");

        let id = place_block(&mut world, &mut physics, &mut bodies, &config, eye, looking_down())
            .unwrap()
            .unwrap();
        let removed =
            remove_block(&mut world, &mut physics, &mut bodies, &config, eye, looking_down()).unwrap();
        assert_eq!(removed, Some(id));
        assert_eq!(physics.destroyed.len(), 1);
        assert!(bodies.is_empty());
        assert_eq!(world.grid().count_listing(id), 0);
    }

    #[test]
    fn test_push_into_hit_face() {
        let (mut world, mut physics, mut bodies, config) = setup();
        let eye = Vec3::new(5.5, 6.5, 5.5);
        let id = place_block(&mut world, &mut physics, &mut bodies, &config, eye, looking_down())
            .unwrap()
            .unwrap();

        let pushed = push_block(
            &world,
            &mut physics,
            &bodies,
            &config,
            eye,
            looking_down(),
            PushStrength::Medium,
        );
        assert_eq!(pushed, Some(id));
        let (_, impulse) = physics.pushes[0];
        assert!((impulse - Vec3::new(0.0, -50.0, 0.0)).length() < 1e-3, "got {impulse}");
    }
}

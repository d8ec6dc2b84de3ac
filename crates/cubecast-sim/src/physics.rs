use std::collections::BTreeMap;

use cubecast_core::types::ObjectId;
use cubecast_world::World;
use glam::Vec3;

/// Offset from an object's stored position (cell corner) to its body center.
pub const BODY_CENTER_OFFSET: Vec3 = Vec3::splat(0.5);

/// Opaque handle into the physics engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct BodyHandle(pub u64);

/// Body pose as reported by the physics engine.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BodyTransform {
    pub center: Vec3,
    /// Euler angles in radians.
    pub rotation: Vec3,
}

/// Seam to the rigid body engine that owns object motion.
pub trait PhysicsBridge {
    fn create_box(&mut self, center: Vec3, half_extent: Vec3) -> BodyHandle;
    fn destroy_box(&mut self, body: BodyHandle);
    /// None when `body` is unknown to the engine.
    fn body_transform(&self, body: BodyHandle) -> Option<BodyTransform>;
    fn push(&mut self, body: BodyHandle, impulse: Vec3);
}

/// Counts from one [`BodyTable::sync_from_physics`] pass.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SyncReport {
    pub moved: u32,
    pub rotated: u32,
    /// Bodies or objects that no longer exist on the other side.
    pub stale: u32,
}

/// Object to body mapping, iterated in ascending id order so syncs are
/// reproducible.
#[derive(Debug, Default)]
pub struct BodyTable {
    bodies: BTreeMap<ObjectId, BodyHandle>,
}

impl BodyTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, id: ObjectId, body: BodyHandle) -> Option<BodyHandle> {
        self.bodies.insert(id, body)
    }

    pub fn remove(&mut self, id: ObjectId) -> Option<BodyHandle> {
        self.bodies.remove(&id)
    }

    pub fn get(&self, id: ObjectId) -> Option<BodyHandle> {
        self.bodies.get(&id).copied()
    }

    pub fn len(&self) -> usize {
        self.bodies.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bodies.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (ObjectId, BodyHandle)> + '_ {
        self.bodies.iter().map(|(&id, &body)| (id, body))
    }

    /// Copy every body's pose into the world, lowest id first. Bodies at
    /// rest produce no dirty bits because unchanged poses are no-ops.
    pub fn sync_from_physics(&self, world: &mut World, physics: &dyn PhysicsBridge) -> SyncReport {
        let mut report = SyncReport::default();
        for (id, body) in self.iter() {
            let Some(transform) = physics.body_transform(body) else {
                log::warn!("object {} has no physics body {:?}", id, body);
                report.stale += 1;
                continue;
            };
            match world.move_object(id, transform.center - BODY_CENTER_OFFSET) {
                Ok(true) => report.moved += 1,
                Ok(false) => {}
                Err(e) => {
                    log::warn!("sync skipped object {}: {}", id, e);
                    report.stale += 1;
                    continue;
                }
            }
            if let Ok(true) = world.set_rotation(id, transform.rotation) {
                report.rotated += 1;
            }
        }
        report
    }
}

#[derive(Debug, Clone, Copy)]
struct KinematicBody {
    center: Vec3,
    half_extent: Vec3,
    velocity: Vec3,
    rotation: Vec3,
    /// Radians per second around each axis.
    angular_velocity: Vec3,
}

/// Minimal integrator for headless runs: gravity, linear damping and a
/// resting plane. No body-body contacts.
#[derive(Debug)]
pub struct KinematicPhysics {
    bodies: Vec<Option<KinematicBody>>,
    pub gravity: Vec3,
    pub damping: f32,
    /// Height of the resting plane, in cells.
    pub floor_y: f32,
}

impl KinematicPhysics {
    pub fn new(floor_y: f32) -> Self {
        Self {
            bodies: Vec::new(),
            gravity: Vec3::new(0.0, -9.81, 0.0),
            damping: 0.98,
            floor_y,
        }
    }

    pub fn body_count(&self) -> usize {
        self.bodies.iter().filter(|b| b.is_some()).count()
    }

    pub fn step(&mut self, dt: f32) {
        for body in self.bodies.iter_mut().flatten() {
            body.velocity = (body.velocity + self.gravity * dt) * self.damping;
            body.center += body.velocity * dt;
            body.angular_velocity *= self.damping;
            body.rotation += body.angular_velocity * dt;
            let rest = self.floor_y + body.half_extent.y;
            if body.center.y < rest {
                body.center.y = rest;
                body.velocity.y = 0.0;
            }
        }
    }

    /// Add angular velocity, in radians per second, to `body`.
    pub fn spin(&mut self, body: BodyHandle, delta: Vec3) {
        if let Some(Some(b)) = self.bodies.get_mut(body.0 as usize) {
            b.angular_velocity += delta;
        }
    }

    fn slot(&self, body: BodyHandle) -> Option<&KinematicBody> {
        self.bodies.get(body.0 as usize).and_then(|b| b.as_ref())
    }
}

impl PhysicsBridge for KinematicPhysics {
    fn create_box(&mut self, center: Vec3, half_extent: Vec3) -> BodyHandle {
        self.bodies.push(Some(KinematicBody {
            center,
            half_extent,
            velocity: Vec3::ZERO,
            rotation: Vec3::ZERO,
            angular_velocity: Vec3::ZERO,
        }));
        BodyHandle(self.bodies.len() as u64 - 1)
    }

    fn destroy_box(&mut self, body: BodyHandle) {
        if let Some(slot) = self.bodies.get_mut(body.0 as usize) {
            *slot = None;
        }
    }

    fn body_transform(&self, body: BodyHandle) -> Option<BodyTransform> {
        self.slot(body).map(|b| BodyTransform {
            center: b.center,
            rotation: b.rotation,
        })
    }

    fn push(&mut self, body: BodyHandle, impulse: Vec3) {
        if let Some(Some(b)) = self.bodies.get_mut(body.0 as usize) {
            b.velocity += impulse;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::IVec3;

    #[test]
    fn test_resting_body_sync_is_clean() {
        let mut world = World::new(16, 8);
        let mut physics = KinematicPhysics::new(2.0);
        let mut table = BodyTable::new();

        let id = world.spawn_object(IVec3::new(4, 2, 4), Vec3::splat(0.5), Vec3::ZERO).unwrap();
        let body = physics.create_box(Vec3::new(4.5, 2.5, 4.5), Vec3::splat(0.5));
        table.insert(id, body);
        world.get_changed_and_clear();

        let report = table.sync_from_physics(&mut world, &physics);
        assert_eq!(report, SyncReport::default());
        assert!(world.get_changed_and_clear().is_empty());
    }

    #[test]
    fn test_falling_body_moves_object() {
        let mut world = World::new(16, 8);
        let mut physics = KinematicPhysics::new(0.0);
        let mut table = BodyTable::new();

        let id = world.spawn_object(IVec3::new(4, 10, 4), Vec3::splat(0.5), Vec3::ZERO).unwrap();
        table.insert(id, physics.create_box(Vec3::new(4.5, 10.5, 4.5), Vec3::splat(0.5)));

        for _ in 0..240 {
            physics.step(1.0 / 60.0);
            table.sync_from_physics(&mut world, &physics);
        }
        let position = world.registry().position(id).unwrap();
        assert!((position.y - 0.0).abs() < 1e-4, "landed at {position}");
        assert_eq!(world.object_at(IVec3::new(4, 0, 4)), Some(id));
        assert_eq!(world.grid().count_listing(id), 3 * 2 * 3);
    }

    #[test]
    fn test_destroyed_body_is_stale() {
        let mut world = World::new(8, 4);
        let mut physics = KinematicPhysics::new(0.0);
        let mut table = BodyTable::new();
        let id = world.spawn_object(IVec3::splat(2), Vec3::splat(0.5), Vec3::ZERO).unwrap();
        let body = physics.create_box(Vec3::splat(2.5), Vec3::splat(0.5));
        table.insert(id, body);
        physics.destroy_box(body);

        assert_eq!(table.sync_from_physics(&mut world, &physics).stale, 1);
        assert_eq!(physics.body_count(), 0);
    }

    #[test]
    fn test_sync_applies_moves_in_id_order() {
        use cubecast_core::constants::MAX_PER_CELL;

        let mut world = World::new(32, 32);
        let physics_target = Vec3::new(16.5, 16.5, 20.5);
        let mut physics = KinematicPhysics::new(0.0);
        let mut table = BodyTable::new();

        let count = MAX_PER_CELL as i32 + 1;
        for i in 0..count {
            let cell = IVec3::new(1 + 3 * (i % 9), 1 + 3 * (i / 9), 1);
            let id = world.spawn_object(cell, Vec3::splat(0.5), Vec3::ZERO).unwrap();
            table.insert(id, physics.create_box(physics_target, Vec3::splat(0.5)));
        }
        let ids: Vec<_> = table.iter().map(|(id, _)| id.0).collect();
        assert!(ids.windows(2).all(|w| w[0] < w[1]), "table iterates by id");

        let report = table.sync_from_physics(&mut world, &physics);
        assert_eq!(report.moved, count as u32);

        // The shared cell fills up in id order; the last id is the one dropped.
        let occupants = world.grid().occupants(IVec3::new(16, 16, 20)).unwrap();
        assert_eq!(occupants.len(), MAX_PER_CELL);
        assert!(!occupants.contains(&(count as u32 - 1)));
        assert_eq!(world.object_at(IVec3::new(16, 16, 20)), Some(ObjectId(0)));
    }

    #[test]
    fn test_spin_rotation_survives_sync() {
        let mut world = World::new(16, 8);
        let mut physics = KinematicPhysics::new(2.0);
        let mut table = BodyTable::new();

        let id = world.spawn_object(IVec3::new(4, 2, 4), Vec3::splat(0.5), Vec3::ZERO).unwrap();
        let body = physics.create_box(Vec3::new(4.5, 2.5, 4.5), Vec3::splat(0.5));
        table.insert(id, body);
        physics.damping = 1.0;
        physics.spin(body, Vec3::new(0.0, 6.0, 0.0));

        let mut rotated = 0;
        for _ in 0..10 {
            physics.step(1.0 / 60.0);
            rotated += table.sync_from_physics(&mut world, &physics).rotated;
        }
        assert_eq!(rotated, 10);
        let rotation = world.registry().rotation(id).unwrap();
        assert!((rotation.y - 1.0).abs() < 1e-4, "rotation {rotation}");
        assert_eq!(rotation.x, 0.0);
    }

    #[test]
    fn test_push_adds_velocity() {
        let mut physics = KinematicPhysics::new(-100.0);
        physics.gravity = Vec3::ZERO;
        physics.damping = 1.0;
        let body = physics.create_box(Vec3::ZERO, Vec3::splat(0.5));
        physics.push(body, Vec3::new(2.0, 0.0, 0.0));
        physics.step(0.5);
        let t = physics.body_transform(body).unwrap();
        assert_eq!(t.center, Vec3::new(1.0, 0.0, 0.0));
    }
}

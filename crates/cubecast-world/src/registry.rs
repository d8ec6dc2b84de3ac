use cubecast_core::error::WorldError;
use cubecast_core::types::ObjectId;
use glam::Vec3;

/// Flat per-object attribute arrays addressed by [`ObjectId`].
///
/// Arrays are allocated to `capacity` up front so their GPU mirrors keep a
/// stable size. Removed ids go on a LIFO free-list and are handed out again
/// by the next `add`.
pub struct ObjectRegistry {
    positions: Vec<Vec3>,
    rotations: Vec<Vec3>,
    half_extents: Vec<Vec3>,
    live: Vec<bool>,
    free: Vec<u32>,
    /// Slots ever handed out (high-water mark).
    slot_count: u32,
    live_count: u32,
}

impl ObjectRegistry {
    pub fn with_capacity(capacity: u32) -> Self {
        let n = capacity as usize;
        Self {
            positions: vec![Vec3::ZERO; n],
            rotations: vec![Vec3::ZERO; n],
            half_extents: vec![Vec3::ZERO; n],
            live: vec![false; n],
            free: Vec::new(),
            slot_count: 0,
            live_count: 0,
        }
    }

    pub fn capacity(&self) -> u32 {
        self.positions.len() as u32
    }

    /// Number of live objects.
    pub fn len(&self) -> u32 {
        self.live_count
    }

    pub fn is_empty(&self) -> bool {
        self.live_count == 0
    }

    /// Slots handed out so far, live or freed.
    pub fn slot_count(&self) -> u32 {
        self.slot_count
    }

    /// Claim a slot. Position and rotation start at zero; the caller sets
    /// the half extent.
    pub fn add(&mut self) -> Result<ObjectId, WorldError> {
        let slot = match self.free.pop() {
            Some(slot) => slot,
            None if self.slot_count < self.capacity() => {
                self.slot_count += 1;
                self.slot_count - 1
            }
            None => {
                return Err(WorldError::RegistryFull {
                    capacity: self.capacity(),
                })
            }
        };

        let i = slot as usize;
        self.positions[i] = Vec3::ZERO;
        self.rotations[i] = Vec3::ZERO;
        self.half_extents[i] = Vec3::ZERO;
        self.live[i] = true;
        self.live_count += 1;
        Ok(ObjectId(slot))
    }

    /// Free a slot. Its attributes are zeroed and the id becomes reusable.
    pub fn remove(&mut self, id: ObjectId) -> Result<(), WorldError> {
        let i = self.check(id)?;
        self.positions[i] = Vec3::ZERO;
        self.rotations[i] = Vec3::ZERO;
        self.half_extents[i] = Vec3::ZERO;
        self.live[i] = false;
        self.live_count -= 1;
        self.free.push(id.0);
        Ok(())
    }

    pub fn is_live(&self, id: ObjectId) -> bool {
        self.live.get(id.index()).copied().unwrap_or(false)
    }

    /// `InvalidId` unless `id` is live.
    pub fn check_live(&self, id: ObjectId) -> Result<(), WorldError> {
        self.check(id).map(|_| ())
    }

    /// Slot index of a live id.
    fn check(&self, id: ObjectId) -> Result<usize, WorldError> {
        if self.is_live(id) {
            Ok(id.index())
        } else {
            Err(WorldError::InvalidId(id))
        }
    }

    pub fn position(&self, id: ObjectId) -> Result<Vec3, WorldError> {
        Ok(self.positions[self.check(id)?])
    }

    pub fn rotation(&self, id: ObjectId) -> Result<Vec3, WorldError> {
        Ok(self.rotations[self.check(id)?])
    }

    pub fn half_extent(&self, id: ObjectId) -> Result<Vec3, WorldError> {
        Ok(self.half_extents[self.check(id)?])
    }

    pub fn set_position(&mut self, id: ObjectId, position: Vec3) -> Result<(), WorldError> {
        let i = self.check(id)?;
        self.positions[i] = position;
        Ok(())
    }

    pub fn set_rotation(&mut self, id: ObjectId, rotation: Vec3) -> Result<(), WorldError> {
        let i = self.check(id)?;
        self.rotations[i] = rotation;
        Ok(())
    }

    pub fn set_half_extent(&mut self, id: ObjectId, half_extent: Vec3) -> Result<(), WorldError> {
        let i = self.check(id)?;
        self.half_extents[i] = half_extent;
        Ok(())
    }

    pub fn add_position(&mut self, id: ObjectId, delta: Vec3) -> Result<(), WorldError> {
        let i = self.check(id)?;
        self.positions[i] += delta;
        Ok(())
    }

    pub fn add_rotation(&mut self, id: ObjectId, delta: Vec3) -> Result<(), WorldError> {
        let i = self.check(id)?;
        self.rotations[i] += delta;
        Ok(())
    }

    /// Full-capacity position array (GPU mirror source).
    pub fn positions(&self) -> &[Vec3] {
        &self.positions
    }

    pub fn rotations(&self) -> &[Vec3] {
        &self.rotations
    }

    pub fn half_extents(&self) -> &[Vec3] {
        &self.half_extents
    }

    /// Live ids in slot order.
    pub fn iter(&self) -> impl Iterator<Item = ObjectId> + '_ {
        self.live
            .iter()
            .enumerate()
            .filter(|(_, live)| **live)
            .map(|(i, _)| ObjectId(i as u32))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_add_assigns_slot_indices() {
        let mut reg = ObjectRegistry::with_capacity(8);
        assert_eq!(reg.add().unwrap(), ObjectId(0));
        assert_eq!(reg.add().unwrap(), ObjectId(1));
        assert_eq!(reg.len(), 2);
        assert_eq!(reg.position(ObjectId(1)).unwrap(), Vec3::ZERO);
        assert_eq!(reg.rotation(ObjectId(1)).unwrap(), Vec3::ZERO);
    }

    #[test]
    fn test_removed_id_is_reclaimed() {
        let mut reg = ObjectRegistry::with_capacity(8);
        let a = reg.add().unwrap();
        let b = reg.add().unwrap();
        reg.set_position(a, Vec3::new(1.0, 2.0, 3.0)).unwrap();
        reg.remove(a).unwrap();

        assert!(!reg.is_live(a));
        assert!(reg.is_live(b));
        let c = reg.add().unwrap();
        assert_eq!(c, a);
        assert_eq!(reg.position(c).unwrap(), Vec3::ZERO);
        assert_eq!(reg.slot_count(), 2);
    }

    #[test]
    fn test_registry_full() {
        let mut reg = ObjectRegistry::with_capacity(2);
        reg.add().unwrap();
        reg.add().unwrap();
        assert_eq!(reg.add().unwrap_err(), WorldError::RegistryFull { capacity: 2 });
    }

    #[test]
    fn test_invalid_ids_rejected() {
        let mut reg = ObjectRegistry::with_capacity(4);
        let a = reg.add().unwrap();
        assert_eq!(reg.position(ObjectId(3)).unwrap_err(), WorldError::InvalidId(ObjectId(3)));
        assert_eq!(reg.position(ObjectId(400)).unwrap_err(), WorldError::InvalidId(ObjectId(400)));
        assert_eq!(reg.check_live(a), Ok(()));
        assert_eq!(reg.check_live(ObjectId(400)), Err(WorldError::InvalidId(ObjectId(400))));
        reg.remove(a).unwrap();
        assert_eq!(reg.check_live(a), Err(WorldError::InvalidId(a)));
        assert!(reg.set_rotation(a, Vec3::ONE).is_err());
        assert!(reg.remove(a).is_err());
    }

    #[test]
    fn test_accumulating_deltas() {
        let mut reg = ObjectRegistry::with_capacity(4);
        let a = reg.add().unwrap();
        reg.add_position(a, Vec3::X).unwrap();
        reg.add_position(a, Vec3::X).unwrap();
        reg.add_rotation(a, Vec3::new(0.0, 0.5, 0.0)).unwrap();
        assert_eq!(reg.position(a).unwrap(), Vec3::new(2.0, 0.0, 0.0));
        assert_eq!(reg.rotation(a).unwrap(), Vec3::new(0.0, 0.5, 0.0));
    }

    #[test]
    fn test_mirrors_are_capacity_sized() {
        let mut reg = ObjectRegistry::with_capacity(16);
        reg.add().unwrap();
        assert_eq!(reg.positions().len(), 16);
        assert_eq!(reg.rotations().len(), 16);
        assert_eq!(reg.half_extents().len(), 16);
        assert_eq!(reg.iter().collect::<Vec<_>>(), vec![ObjectId(0)]);
    }
}

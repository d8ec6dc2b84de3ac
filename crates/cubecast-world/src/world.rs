use std::sync::Arc;

use cubecast_core::config::{ConfigError, WorldConfig};
use cubecast_core::error::WorldError;
use cubecast_core::math::{cell_of, coverage_box};
use cubecast_core::types::{CellCoord, CoverageBox, ObjectId};
use glam::{IVec3, Vec3};

use crate::grid::{Placement, VoxelGrid};
use crate::material::{MaterialProps, MaterialStore};
use crate::registry::ObjectRegistry;
use crate::tracker::{Changes, UploadTracker};

/// What a ray or lookup finds in one cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Probe {
    Empty,
    Solid { color: u32 },
    Object(ObjectId),
}

impl Probe {
    pub fn is_hit(self) -> bool {
        !matches!(self, Probe::Empty)
    }
}

fn require_finite(v: Vec3, what: &'static str) -> Result<(), WorldError> {
    if v.is_finite() {
        Ok(())
    } else {
        Err(WorldError::NonFinite { what })
    }
}

/// Grid, registry and material stores kept mutually consistent, with every
/// GPU-visible mutation reported to the shared [`UploadTracker`].
pub struct World {
    grid: VoxelGrid,
    registry: ObjectRegistry,
    materials: MaterialStore,
    /// Box each live object was last placed with, indexed by slot.
    coverage: Vec<Option<CoverageBox>>,
    tracker: Arc<UploadTracker>,
}

impl World {
    /// Empty world. Panics on an invalid `grid_dim`; use [`World::from_config`]
    /// for validated construction.
    pub fn new(grid_dim: u32, object_capacity: u32) -> Self {
        Self {
            grid: VoxelGrid::new(grid_dim),
            registry: ObjectRegistry::with_capacity(object_capacity),
            materials: MaterialStore::with_capacity(object_capacity),
            coverage: vec![None; object_capacity as usize],
            tracker: Arc::new(UploadTracker::new()),
        }
    }

    /// Validate `config`, build the world and lay down its floor.
    pub fn from_config(config: &WorldConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        let mut world = Self::new(config.grid_dim, config.object_capacity);
        world.generate_floor(config.floor_layers, config.floor_color);
        log::info!(
            "World: {}^3 cells, {} object slots, {} floor layers",
            config.grid_dim,
            config.object_capacity,
            config.floor_layers.min(config.grid_dim)
        );
        Ok(world)
    }

    pub fn dim(&self) -> u32 {
        self.grid.dim()
    }

    pub fn grid(&self) -> &VoxelGrid {
        &self.grid
    }

    pub fn registry(&self) -> &ObjectRegistry {
        &self.registry
    }

    pub fn materials(&self) -> &MaterialStore {
        &self.materials
    }

    /// Shared handle to the dirty-bit tracker for the uploader side.
    pub fn tracker(&self) -> Arc<UploadTracker> {
        Arc::clone(&self.tracker)
    }

    /// Drain pending changes. Shorthand for the tracker's read-and-clear.
    pub fn get_changed_and_clear(&self) -> Changes {
        self.tracker.get_changed_and_clear()
    }

    // -- Static geometry --

    /// Mark `cell` fully solid and force a grid re-stage.
    pub fn set_voxel(&mut self, cell: CellCoord, color: u32) -> Result<(), WorldError> {
        self.grid.set_voxel(cell, color)?;
        self.tracker.force_upload();
        Ok(())
    }

    /// Fill the bottom `layers` y-slices with solid voxels.
    pub fn generate_floor(&mut self, layers: u32, color: u32) {
        let dim = self.dim() as i32;
        let layers = layers.min(self.dim()) as i32;
        for z in 0..dim {
            for y in 0..layers {
                for x in 0..dim {
                    // in bounds by construction
                    let _ = self.grid.set_voxel(IVec3::new(x, y, z), color);
                }
            }
        }
        if layers > 0 {
            self.tracker.force_upload();
        }
    }

    // -- Object lifecycle --

    /// Create an object whose position is the corner of `cell`, place its
    /// coverage box and mark every mirror dirty.
    pub fn spawn_object(
        &mut self,
        cell: CellCoord,
        half_extent: Vec3,
        rotation: Vec3,
    ) -> Result<ObjectId, WorldError> {
        if !self.grid.contains(cell) {
            return Err(WorldError::OutOfBounds {
                coord: cell,
                dim: self.dim(),
            });
        }
        require_finite(half_extent, "half extent")?;
        require_finite(rotation, "rotation")?;

        let id = self.registry.add()?;
        let position = cell.as_vec3();
        self.registry.set_position(id, position)?;
        self.registry.set_rotation(id, rotation)?;
        self.registry.set_half_extent(id, half_extent)?;
        self.materials.reset(id)?;

        let placement = self.place(id, coverage_box(position, half_extent));
        log::debug!(
            "spawned object {} at {} ({} cells, {} dropped)",
            id,
            cell,
            placement.cells,
            placement.dropped
        );

        self.tracker.mark(Changes::ALL);
        Ok(id)
    }

    /// Scrub every back-reference to `id` and free its slot.
    pub fn remove_object(&mut self, id: ObjectId) -> Result<(), WorldError> {
        if !self.registry.is_live(id) {
            return Err(WorldError::InvalidId(id));
        }
        self.unplace(id);
        self.registry.remove(id)?;
        self.materials.reset(id)?;
        log::debug!("removed object {}", id);

        self.tracker.mark(Changes::ALL);
        Ok(())
    }

    /// Move an object, re-placing it when its coverage box changes.
    /// Returns false when `new_position` equals the current one.
    ///
    /// POSITION is always marked. GRID is marked only when the box changes:
    /// a sub-cell move leaves the grid bytes identical, so the grid mirror
    /// is not forced to re-stage.
    pub fn move_object(&mut self, id: ObjectId, new_position: Vec3) -> Result<bool, WorldError> {
        let old_position = self.registry.position(id)?;
        if old_position == new_position {
            return Ok(false);
        }
        require_finite(new_position, "position")?;

        let half_extent = self.registry.half_extent(id)?;
        let new_box = coverage_box(new_position, half_extent);
        self.registry.set_position(id, new_position)?;

        let mut changes = Changes::POSITION;
        if self.coverage[id.index()] != Some(new_box) {
            self.unplace(id);
            self.place(id, new_box);
            changes |= Changes::GRID;
        }
        self.tracker.mark(changes);
        Ok(true)
    }

    /// Rotation never affects occupancy; only the rotation mirror is dirtied.
    pub fn set_rotation(&mut self, id: ObjectId, rotation: Vec3) -> Result<bool, WorldError> {
        if self.registry.rotation(id)? == rotation {
            return Ok(false);
        }
        require_finite(rotation, "rotation")?;
        self.registry.set_rotation(id, rotation)?;
        self.tracker.mark(Changes::ROTATION);
        Ok(true)
    }

    /// Resize an object and re-place it with the new box.
    pub fn set_half_extent(&mut self, id: ObjectId, half_extent: Vec3) -> Result<bool, WorldError> {
        if self.registry.half_extent(id)? == half_extent {
            return Ok(false);
        }
        require_finite(half_extent, "half extent")?;
        let position = self.registry.position(id)?;
        self.registry.set_half_extent(id, half_extent)?;

        let mut changes = Changes::HALF_SIZE;
        let new_box = coverage_box(position, half_extent);
        if self.coverage[id.index()] != Some(new_box) {
            self.unplace(id);
            self.place(id, new_box);
            changes |= Changes::GRID;
        }
        self.tracker.mark(changes);
        Ok(true)
    }

    pub fn add_position(&mut self, id: ObjectId, delta: Vec3) -> Result<bool, WorldError> {
        let position = self.registry.position(id)?;
        self.move_object(id, position + delta)
    }

    pub fn add_rotation(&mut self, id: ObjectId, delta: Vec3) -> Result<bool, WorldError> {
        let rotation = self.registry.rotation(id)?;
        self.set_rotation(id, rotation + delta)
    }

    fn place(&mut self, id: ObjectId, coverage: CoverageBox) -> Placement {
        let placement = self.grid.place(id, &coverage);
        self.coverage[id.index()] = Some(coverage);
        placement
    }

    fn unplace(&mut self, id: ObjectId) {
        if let Some(previous) = self.coverage[id.index()].take() {
            self.grid.remove(id, &previous);
        }
    }

    /// Box `id` is currently listed under.
    pub fn coverage_of(&self, id: ObjectId) -> Option<CoverageBox> {
        self.coverage.get(id.index()).copied().flatten()
    }

    // -- Materials --

    pub fn material(&self, id: ObjectId) -> Result<MaterialProps, WorldError> {
        self.registry.check_live(id)?;
        self.materials.get(id)
    }

    pub fn set_color(&mut self, id: ObjectId, rgb: u32) -> Result<(), WorldError> {
        self.registry.check_live(id)?;
        self.materials.set_color(id, rgb)?;
        self.tracker.mark(Changes::MATERIAL);
        Ok(())
    }

    /// Replace only the alpha byte of the packed color.
    pub fn set_alpha(&mut self, id: ObjectId, alpha: u32) -> Result<(), WorldError> {
        self.registry.check_live(id)?;
        self.materials.set_alpha(id, alpha)?;
        self.tracker.mark(Changes::MATERIAL);
        Ok(())
    }

    pub fn set_color_and_alpha(&mut self, id: ObjectId, rgba: u32) -> Result<(), WorldError> {
        self.registry.check_live(id)?;
        self.materials.set_color_and_alpha(id, rgba)?;
        self.tracker.mark(Changes::MATERIAL);
        Ok(())
    }

    pub fn set_reflection(&mut self, id: ObjectId, reflection: f32) -> Result<(), WorldError> {
        self.registry.check_live(id)?;
        self.materials.set_reflection(id, reflection)?;
        self.tracker.mark(Changes::MATERIAL);
        Ok(())
    }

    pub fn set_roughness(&mut self, id: ObjectId, roughness: f32) -> Result<(), WorldError> {
        self.registry.check_live(id)?;
        self.materials.set_roughness(id, roughness)?;
        self.tracker.mark(Changes::MATERIAL);
        Ok(())
    }

    // -- Queries --

    /// Classify `cell`. A listed object only counts when its registry
    /// position rounds to `cell`; stale or neighboring entries are ignored.
    pub fn probe(&self, cell: CellCoord) -> Result<Probe, WorldError> {
        let voxel = self.grid.cell(cell)?;
        if voxel.is_solid() {
            return Ok(Probe::Solid { color: voxel.color });
        }
        for &raw in voxel.occupants() {
            let id = ObjectId(raw);
            if let Ok(position) = self.registry.position(id) {
                if cell_of(position) == cell {
                    return Ok(Probe::Object(id));
                }
            }
        }
        Ok(Probe::Empty)
    }

    pub fn occupied(&self, cell: CellCoord) -> Result<bool, WorldError> {
        Ok(self.probe(cell)?.is_hit())
    }

    /// Object whose position rounds to `cell`, if any.
    pub fn object_at(&self, cell: CellCoord) -> Option<ObjectId> {
        match self.probe(cell) {
            Ok(Probe::Object(id)) => Some(id),
            _ => None,
        }
    }
}

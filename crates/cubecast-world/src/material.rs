use cubecast_core::constants::*;
use cubecast_core::error::WorldError;
use cubecast_core::types::ObjectId;

/// Material attributes of one object, read back from the stores.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MaterialProps {
    /// Packed RGBA8, alpha in the low byte.
    pub color: u32,
    pub reflection: f32,
    pub roughness: f32,
}

impl Default for MaterialProps {
    fn default() -> Self {
        Self {
            color: DEFAULT_COLOR,
            reflection: DEFAULT_REFLECTION,
            roughness: DEFAULT_ROUGHNESS,
        }
    }
}

/// Independent attribute tables keyed by the registry's object ids.
/// Each table is capacity-sized and mirrored to the GPU as a whole.
pub struct MaterialStore {
    colors: Vec<u32>,
    reflections: Vec<f32>,
    roughness: Vec<f32>,
}

impl MaterialStore {
    pub fn with_capacity(capacity: u32) -> Self {
        let n = capacity as usize;
        Self {
            colors: vec![DEFAULT_COLOR; n],
            reflections: vec![DEFAULT_REFLECTION; n],
            roughness: vec![DEFAULT_ROUGHNESS; n],
        }
    }

    fn slot(&self, id: ObjectId) -> Result<usize, WorldError> {
        if id.index() < self.colors.len() {
            Ok(id.index())
        } else {
            Err(WorldError::InvalidId(id))
        }
    }

    /// Restore defaults for a freshly claimed id.
    pub fn reset(&mut self, id: ObjectId) -> Result<(), WorldError> {
        let i = self.slot(id)?;
        let d = MaterialProps::default();
        self.colors[i] = d.color;
        self.reflections[i] = d.reflection;
        self.roughness[i] = d.roughness;
        Ok(())
    }

    pub fn get(&self, id: ObjectId) -> Result<MaterialProps, WorldError> {
        let i = self.slot(id)?;
        Ok(MaterialProps {
            color: self.colors[i],
            reflection: self.reflections[i],
            roughness: self.roughness[i],
        })
    }

    /// Replace the RGB bytes, keeping the current alpha.
    pub fn set_color(&mut self, id: ObjectId, rgb: u32) -> Result<(), WorldError> {
        let i = self.slot(id)?;
        self.colors[i] = (rgb & 0xFFFF_FF00) | (self.colors[i] & 0x0000_00FF);
        Ok(())
    }

    /// Replace only the alpha byte.
    pub fn set_alpha(&mut self, id: ObjectId, alpha: u32) -> Result<(), WorldError> {
        let i = self.slot(id)?;
        self.colors[i] = (alpha & 0x0000_00FF) | (self.colors[i] & 0xFFFF_FF00);
        Ok(())
    }

    pub fn set_color_and_alpha(&mut self, id: ObjectId, rgba: u32) -> Result<(), WorldError> {
        let i = self.slot(id)?;
        self.colors[i] = rgba;
        Ok(())
    }

    /// Stored reflection is half the input, saturating at `MAX_REFLECTION`.
    pub fn set_reflection(&mut self, id: ObjectId, reflection: f32) -> Result<(), WorldError> {
        let i = self.slot(id)?;
        self.reflections[i] = if reflection >= MAX_REFLECTION {
            MAX_REFLECTION
        } else {
            reflection * MAX_REFLECTION
        };
        Ok(())
    }

    /// Stored roughness is a quarter of the input, saturating at `MAX_ROUGHNESS`.
    pub fn set_roughness(&mut self, id: ObjectId, roughness: f32) -> Result<(), WorldError> {
        let i = self.slot(id)?;
        self.roughness[i] = if roughness >= MAX_ROUGHNESS {
            MAX_ROUGHNESS
        } else {
            roughness * MAX_ROUGHNESS
        };
        Ok(())
    }

    pub fn colors(&self) -> &[u32] {
        &self.colors
    }

    pub fn reflections(&self) -> &[f32] {
        &self.reflections
    }

    pub fn roughness(&self) -> &[f32] {
        &self.roughness
    }
}

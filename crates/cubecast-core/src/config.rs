use crate::constants::*;
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to parse world config RON: {0}")]
    ParseError(String),
    #[error("grid_dim must be within 1..={max}, got {got}")]
    InvalidGridDim { got: u32, max: u32 },
    #[error("object_capacity must be at least 1")]
    ZeroObjectCapacity,
}

/// World construction and interaction settings, loaded from RON.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WorldConfig {
    /// Side length of the cubic grid in cells.
    pub grid_dim: u32,
    /// Registry slots; also the record count of every per-object GPU mirror.
    pub object_capacity: u32,
    /// Interaction reach in cell advances.
    pub max_march_steps: u32,
    /// Number of bottom y-slices filled with solid floor voxels.
    pub floor_layers: u32,
    /// Packed RGBA of floor voxels.
    pub floor_color: u32,
    /// Packed RGBA of cubes spawned by the interaction layer.
    pub cube_color: u32,
    /// Half extent of spawned cubes, in cells.
    pub cube_half_extent: f32,
    /// Push strengths for the low, medium and high push actions.
    pub push_forces: [f32; 3],
}

impl Default for WorldConfig {
    fn default() -> Self {
        Self {
            grid_dim: DEFAULT_GRID_DIM,
            object_capacity: DEFAULT_OBJECT_CAPACITY,
            max_march_steps: DEFAULT_MAX_MARCH_STEPS,
            floor_layers: 2,
            floor_color: 0x1010_10FF,
            cube_color: 0x9921_1200,
            cube_half_extent: 0.5,
            push_forces: [10.0, 50.0, 100.0],
        }
    }
}

impl WorldConfig {
    /// Parse a RON document. Missing fields take their defaults.
    pub fn from_ron_str(ron_str: &str) -> Result<Self, ConfigError> {
        let options = ron::Options::default();
        let config: WorldConfig = options
            .from_str(ron_str)
            .map_err(|e| ConfigError::ParseError(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Check construction-time invariants.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.grid_dim == 0 || self.grid_dim > MAX_GRID_DIM {
            return Err(ConfigError::InvalidGridDim {
                got: self.grid_dim,
                max: MAX_GRID_DIM,
            });
        }
        if self.object_capacity == 0 {
            return Err(ConfigError::ZeroObjectCapacity);
        }
        if self.floor_layers > self.grid_dim {
            log::warn!(
                "floor_layers {} exceeds grid_dim {}; floor fills the whole grid",
                self.floor_layers,
                self.grid_dim
            );
        }
        Ok(())
    }
}

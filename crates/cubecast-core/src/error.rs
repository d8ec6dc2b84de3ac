use crate::types::{CellCoord, ObjectId};
use thiserror::Error;

/// Recoverable failures of world mutations and queries.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum WorldError {
    #[error("cell {coord} is outside the grid (dim {dim})")]
    OutOfBounds { coord: CellCoord, dim: u32 },

    #[error("object id {0} is not live in the registry")]
    InvalidId(ObjectId),

    #[error("object registry is full ({capacity} slots)")]
    RegistryFull { capacity: u32 },

    #[error("{what} must be finite")]
    NonFinite { what: &'static str },
}

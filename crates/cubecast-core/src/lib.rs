pub mod config;
pub mod constants;
pub mod direction;
pub mod error;
pub mod math;
pub mod types;

pub use config::{ConfigError, WorldConfig};
pub use error::WorldError;
pub use types::{CellCoord, CoverageBox, ObjectId};

pub mod cell;
pub mod grid;
pub mod material;
pub mod registry;
pub mod tracker;
pub mod world;

pub use cell::VoxelCell;
pub use grid::{Placement, VoxelGrid};
pub use material::{MaterialProps, MaterialStore};
pub use registry::ObjectRegistry;
pub use tracker::{Changes, UploadTracker};
pub use world::{Probe, World};

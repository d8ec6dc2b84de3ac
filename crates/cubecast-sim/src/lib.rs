pub mod interaction;
pub mod physics;

pub use interaction::{place_block, push_block, remove_block, PushStrength};
pub use physics::{BodyHandle, BodyTable, BodyTransform, KinematicPhysics, PhysicsBridge, SyncReport};

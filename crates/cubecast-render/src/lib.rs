pub mod camera;
pub mod gpu_types;
pub mod march;
pub mod shader;
pub mod upload;

pub use camera::{look_direction, Camera, CameraBasis};
pub use gpu_types::{GpuVec3, MarchPushConstants};
pub use march::{march, HitResult};
pub use upload::{GpuMirrors, Mirror, UploadPlan};

use cubecast_core::constants::DEG_TO_RAD;
use cubecast_core::math::{rotate_x, rotate_y};
use glam::Vec3;

use crate::gpu_types::MarchPushConstants;

/// View direction for Euler `rotation` (x = pitch, y = yaw, radians).
/// Zero rotation looks down +Z.
pub fn look_direction(rotation: Vec3) -> Vec3 {
    rotate_y(rotate_x(Vec3::Z, rotation.x), rotation.y).normalize()
}

/// Orthonormal view basis. `up` follows screen rows, so it is -Y when
/// looking along +Z.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CameraBasis {
    pub look: Vec3,
    pub right: Vec3,
    pub up: Vec3,
}

impl CameraBasis {
    pub fn from_rotation(rotation: Vec3) -> Self {
        let look = look_direction(rotation);
        // Straight up or down has no horizontal right; fall back to +X.
        let right = look
            .cross(Vec3::NEG_Y)
            .try_normalize()
            .unwrap_or(Vec3::X);
        let up = right.cross(look);
        Self { look, right, up }
    }
}

/// Viewer state shared by interaction and the shader.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Camera {
    pub position: Vec3,
    pub rotation: Vec3,
    pub fov_degrees: f32,
}

impl Default for Camera {
    fn default() -> Self {
        Self {
            position: Vec3::ZERO,
            rotation: Vec3::ZERO,
            fov_degrees: 90.0,
        }
    }
}

impl Camera {
    pub fn basis(&self) -> CameraBasis {
        CameraBasis::from_rotation(self.rotation)
    }

    pub fn look(&self) -> Vec3 {
        look_direction(self.rotation)
    }

    /// Ray direction through normalized screen coordinates in `[-1, 1]`,
    /// with `y` increasing down the screen. Matches `primary_ray` in the
    /// shader.
    pub fn ray_direction(&self, ndc_x: f32, ndc_y: f32, aspect: f32) -> Vec3 {
        let basis = self.basis();
        let half = (self.fov_degrees * DEG_TO_RAD * 0.5).tan();
        (basis.look + basis.right * (ndc_x * half * aspect) + basis.up * (ndc_y * half)).normalize()
    }

    /// Per-dispatch constant block for the ray march shader.
    pub fn push_constants(&self, grid_dim: u32, max_steps: u32, mode: u32) -> MarchPushConstants {
        let basis = self.basis();
        MarchPushConstants {
            camera_pos: self.position.to_array(),
            grid_size: grid_dim,
            look_dir: basis.look.to_array(),
            fov: self.fov_degrees * DEG_TO_RAD,
            right: basis.right.to_array(),
            mode,
            up: basis.up.to_array(),
            max_steps,
        }
    }
}

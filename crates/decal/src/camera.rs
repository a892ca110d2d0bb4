use atelier_config::ProductConfig;
use glam::{Mat4, Vec2, Vec3, Vec4};

use crate::types::Ray;

/// Vertical field of view of the product viewport
pub const DEFAULT_FOV_Y_DEGREES: f32 = 35.0;

/// Perspective camera mirroring the viewport's orbit camera.
///
/// The orbit controls live in the host; it reports the pose and the engine
/// only needs it to turn pointer positions into rays.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Camera {
    pub position: Vec3,
    pub target: Vec3,
    pub up: Vec3,
    /// Vertical field of view, radians
    pub fov_y: f32,
    /// Viewport width / height
    pub aspect: f32,
    pub near: f32,
    pub far: f32,
}

impl Default for Camera {
    fn default() -> Self {
        Self {
            position: Vec3::new(0.0, 0.0, 1.5),
            target: Vec3::ZERO,
            up: Vec3::Y,
            fov_y: DEFAULT_FOV_Y_DEGREES.to_radians(),
            aspect: 1.0,
            near: 0.01,
            far: 100.0,
        }
    }
}

impl Camera {
    /// Initial camera for a product, looking at the origin
    pub fn for_product(product: &ProductConfig) -> Self {
        Self {
            position: Vec3::from_array(product.camera_position),
            ..Default::default()
        }
    }

    pub fn set_pose(&mut self, position: Vec3, target: Vec3) {
        self.position = position;
        self.target = target;
    }

    pub fn set_aspect(&mut self, width: f32, height: f32) {
        if width > 0.0 && height > 0.0 {
            self.aspect = width / height;
        }
    }

    pub fn view_matrix(&self) -> Mat4 {
        Mat4::look_at_rh(self.position, self.target, self.up)
    }

    pub fn projection_matrix(&self) -> Mat4 {
        Mat4::perspective_rh(self.fov_y, self.aspect, self.near, self.far)
    }

    /// Ray through a viewport point in normalized device coordinates
    /// (x, y in -1..1, +y up).
    pub fn ray_from_ndc(&self, ndc: Vec2) -> Ray {
        let inv_view_proj = (self.projection_matrix() * self.view_matrix()).inverse();

        // Depth range is 0..1 for perspective_rh
        let near = inv_view_proj * Vec4::new(ndc.x, ndc.y, 0.0, 1.0);
        let far = inv_view_proj * Vec4::new(ndc.x, ndc.y, 1.0, 1.0);
        let near = near.truncate() / near.w;
        let far = far.truncate() / far.w;

        Ray::new(near, far - near)
    }

    /// Ray through the center of the viewport
    pub fn center_ray(&self) -> Ray {
        self.ray_from_ndc(Vec2::ZERO)
    }
}

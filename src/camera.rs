use glam::{Mat4, Vec2, Vec3};

use crate::math::Ray;

pub const DEFAULT_FOV_DEGREES: f32 = 75.0;
pub const DEFAULT_NEAR: f32 = 0.1;
pub const DEFAULT_FAR: f32 = 100.0;

/// Right-handed perspective camera looking from `position` at `target`.
/// Projection uses the 0..1 depth range of wgpu.
#[derive(Debug, Clone)]
pub struct PerspectiveCamera {
    pub fov_y_degrees: f32,
    pub near: f32,
    pub far: f32,
    pub position: Vec3,
    pub target: Vec3,
    pub up: Vec3,
    aspect: f32,
    projection: Mat4,
}

impl PerspectiveCamera {
    pub fn new(fov_y_degrees: f32, aspect: f32, near: f32, far: f32) -> Self {
        let mut camera = Self {
            fov_y_degrees,
            near,
            far,
            position: Vec3::new(0.0, 0.0, 3.0),
            target: Vec3::ZERO,
            up: Vec3::Y,
            aspect,
            projection: Mat4::IDENTITY,
        };
        camera.update_projection_matrix();
        camera
    }

    pub fn aspect(&self) -> f32 {
        self.aspect
    }

    /// Sets the aspect ratio and rebuilds the projection
    pub fn set_aspect(&mut self, aspect: f32) {
        self.aspect = aspect;
        self.update_projection_matrix();
    }

    /// Call after changing `fov_y_degrees`, `near` or `far` directly
    pub fn update_projection_matrix(&mut self) {
        self.projection =
            Mat4::perspective_rh(self.fov_y_degrees.to_radians(), self.aspect, self.near, self.far);
    }

    pub fn projection_matrix(&self) -> Mat4 {
        self.projection
    }

    pub fn view_matrix(&self) -> Mat4 {
        Mat4::look_at_rh(self.position, self.target, self.up)
    }

    pub fn view_projection(&self) -> Mat4 {
        self.projection * self.view_matrix()
    }

    pub fn forward(&self) -> Vec3 {
        (self.target - self.position).normalize_or_zero()
    }

    /// World-space ray from the camera through a point in normalized device
    /// coordinates. Points outside [-1, 1] are extrapolated, not clamped.
    pub fn ray_through(&self, ndc: Vec2) -> Ray {
        let inverse = self.view_projection().inverse();
        let through = inverse.project_point3(Vec3::new(ndc.x, ndc.y, 0.5));
        Ray::new(self.position, through - self.position)
    }

    /// Inverse of the rotation-only view-projection, for skybox lookups
    pub fn inverse_view_rotation_projection(&self) -> Mat4 {
        let mut view = self.view_matrix();
        view.w_axis = glam::Vec4::W;
        (self.projection * view).inverse()
    }
}

impl Default for PerspectiveCamera {
    fn default() -> Self {
        Self::new(DEFAULT_FOV_DEGREES, 1.0, DEFAULT_NEAR, DEFAULT_FAR)
    }
}

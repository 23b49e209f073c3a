//! Orbit controls: rotate around, dolly towards, and pan the camera target,
//! optionally easing every motion with damping.

use std::f32::consts::PI;

use glam::Vec3;

use crate::camera::PerspectiveCamera;

const EPS: f32 = 1e-6;

#[derive(Debug, Clone, Copy, Default, PartialEq)]
struct SphericalDelta {
    theta: f32,
    phi: f32,
}

#[derive(Debug, Clone)]
pub struct OrbitControls {
    pub enable_damping: bool,
    /// Fraction of the pending motion applied per update
    pub damping_factor: f32,
    pub rotate_speed: f32,
    pub zoom_speed: f32,
    pub pan_speed: f32,
    pub min_distance: f32,
    pub max_distance: f32,
    pub min_polar_angle: f32,
    pub max_polar_angle: f32,
    delta: SphericalDelta,
    scale: f32,
    pan_offset: Vec3,
}

impl OrbitControls {
    pub fn new() -> Self {
        Self {
            enable_damping: false,
            damping_factor: 0.05,
            rotate_speed: 1.0,
            zoom_speed: 1.0,
            pan_speed: 1.0,
            min_distance: 0.0,
            max_distance: f32::INFINITY,
            min_polar_angle: 0.0,
            max_polar_angle: PI,
            delta: SphericalDelta::default(),
            scale: 1.0,
            pan_offset: Vec3::ZERO,
        }
    }

    pub fn with_damping(mut self, enabled: bool) -> Self {
        self.enable_damping = enabled;
        self
    }

    /// Whether any rotation, zoom or pan is still waiting to be applied
    pub fn has_pending_motion(&self) -> bool {
        self.delta.theta.abs() > EPS
            || self.delta.phi.abs() > EPS
            || (self.scale - 1.0).abs() > EPS
            || self.pan_offset.length_squared() > EPS * EPS
    }

    /// Pointer drag in pixels. A drag across the full viewport height is one
    /// full turn.
    pub fn rotate(&mut self, dx: f32, dy: f32, viewport_height: f32) {
        if viewport_height <= 0.0 {
            return;
        }
        self.delta.theta -= 2.0 * PI * dx / viewport_height * self.rotate_speed;
        self.delta.phi -= 2.0 * PI * dy / viewport_height * self.rotate_speed;
    }

    /// Wheel input. Negative `scroll_y` (wheel up) moves the camera closer.
    pub fn dolly(&mut self, scroll_y: f32) {
        let step = 0.95_f32.powf(self.zoom_speed);
        if scroll_y < 0.0 {
            self.scale *= step;
        } else if scroll_y > 0.0 {
            self.scale /= step;
        }
    }

    /// Pointer drag in pixels, moving the target in the camera's screen plane
    pub fn pan(&mut self, dx: f32, dy: f32, viewport_height: f32, camera: &PerspectiveCamera) {
        if viewport_height <= 0.0 {
            return;
        }
        let offset = camera.position - camera.target;
        let target_distance = offset.length() * (camera.fov_y_degrees.to_radians() * 0.5).tan();

        let camera_world = camera.view_matrix().inverse();
        let right = camera_world.x_axis.truncate();
        let up = camera_world.y_axis.truncate();

        let left_amount = 2.0 * dx * target_distance / viewport_height * self.pan_speed;
        let up_amount = 2.0 * dy * target_distance / viewport_height * self.pan_speed;

        self.pan_offset += -right * left_amount + up * up_amount;
    }

    /// Applies pending motion to the camera. Returns true if the camera moved.
    pub fn update(&mut self, camera: &mut PerspectiveCamera) -> bool {
        let offset = camera.position - camera.target;
        let radius = offset.length();
        let mut theta = offset.x.atan2(offset.z);
        let mut phi = if radius > 0.0 {
            (offset.y / radius).clamp(-1.0, 1.0).acos()
        } else {
            0.0
        };

        let blend = if self.enable_damping {
            self.damping_factor
        } else {
            1.0
        };

        theta += self.delta.theta * blend;
        phi += self.delta.phi * blend;

        phi = phi
            .clamp(self.min_polar_angle, self.max_polar_angle)
            .clamp(EPS, PI - EPS);

        let new_radius = (radius * self.scale).clamp(self.min_distance, self.max_distance);

        let old_position = camera.position;
        let old_target = camera.target;

        camera.target += self.pan_offset * blend;

        let sin_phi_radius = phi.sin() * new_radius;
        let new_offset = Vec3::new(
            sin_phi_radius * theta.sin(),
            phi.cos() * new_radius,
            sin_phi_radius * theta.cos(),
        );
        camera.position = camera.target + new_offset;

        if self.enable_damping {
            self.delta.theta *= 1.0 - self.damping_factor;
            self.delta.phi *= 1.0 - self.damping_factor;
            self.pan_offset *= 1.0 - self.damping_factor;
        } else {
            self.delta = SphericalDelta::default();
            self.pan_offset = Vec3::ZERO;
        }
        self.scale = 1.0;

        (camera.position - old_position).length_squared() > EPS
            || (camera.target - old_target).length_squared() > EPS
    }
}

impl Default for OrbitControls {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn camera() -> PerspectiveCamera {
        PerspectiveCamera::new(75.0, 1.0, 0.1, 100.0)
    }

    #[test]
    fn update_without_input_keeps_camera() {
        let mut camera = camera();
        let mut controls = OrbitControls::new().with_damping(true);
        assert!(!controls.update(&mut camera));
        assert!((camera.position - Vec3::new(0.0, 0.0, 3.0)).length() < 1e-5);
    }

    #[test]
    fn rotation_keeps_distance() {
        let mut camera = camera();
        let mut controls = OrbitControls::new();
        controls.rotate(100.0, 0.0, 600.0);
        assert!(controls.update(&mut camera));
        assert!((camera.position.length() - 3.0).abs() < 1e-4);
        assert!(camera.position.x.abs() > 0.1);
        assert!(!controls.has_pending_motion());
    }

    #[test]
    fn damping_eases_towards_the_full_rotation() {
        let mut damped_camera = camera();
        let mut damped = OrbitControls::new().with_damping(true);
        damped.rotate(60.0, 0.0, 600.0);

        let mut steps = Vec::new();
        let mut previous = damped_camera.position;
        for _ in 0..200 {
            damped.update(&mut damped_camera);
            steps.push((damped_camera.position - previous).length());
            previous = damped_camera.position;
        }

        // Steps shrink geometrically
        assert!(steps[1] < steps[0]);
        assert!(steps[50] < steps[10]);
        assert!(steps[199] < 1e-4);

        let mut instant_camera = camera();
        let mut instant = OrbitControls::new();
        instant.rotate(60.0, 0.0, 600.0);
        instant.update(&mut instant_camera);

        assert!((damped_camera.position - instant_camera.position).length() < 1e-2);
    }

    #[test]
    fn dolly_in_and_out() {
        let mut camera = camera();
        let mut controls = OrbitControls::new().with_damping(true);

        controls.dolly(-1.0);
        controls.update(&mut camera);
        assert!((camera.position.length() - 3.0 * 0.95).abs() < 1e-4);

        controls.dolly(1.0);
        controls.update(&mut camera);
        assert!((camera.position.length() - 3.0).abs() < 1e-4);
    }

    #[test]
    fn distance_limits_clamp() {
        let mut camera = camera();
        let mut controls = OrbitControls::new();
        controls.min_distance = 2.9;
        for _ in 0..10 {
            controls.dolly(-1.0);
        }
        controls.update(&mut camera);
        assert!((camera.position.length() - 2.9).abs() < 1e-4);
    }

    #[test]
    fn polar_angle_never_flips() {
        let mut camera = camera();
        let mut controls = OrbitControls::new();
        controls.rotate(0.0, -10_000.0, 600.0);
        controls.update(&mut camera);
        // Pinned just short of the bottom pole
        assert!(camera.position.y < -2.99);
        assert!(camera.position.is_finite());
    }

    #[test]
    fn pan_moves_target_and_position_together() {
        let mut camera = camera();
        let mut controls = OrbitControls::new();
        controls.pan(100.0, 0.0, 600.0, &camera);
        controls.update(&mut camera);
        assert!(camera.target.x < 0.0);
        assert!((camera.position - camera.target - Vec3::new(0.0, 0.0, 3.0)).length() < 1e-4);
    }
}

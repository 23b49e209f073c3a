use glam::{Mat4, Vec3};

use super::AABB;

/// Half-line in world or local space. `direction` is kept normalized.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Ray {
    pub origin: Vec3,
    pub direction: Vec3,
}

impl Ray {
    pub fn new(origin: Vec3, direction: Vec3) -> Self {
        Self {
            origin,
            direction: direction.normalize_or_zero(),
        }
    }

    pub fn at(&self, t: f32) -> Vec3 {
        self.origin + self.direction * t
    }

    pub fn is_finite(&self) -> bool {
        self.origin.is_finite() && self.direction.is_finite() && self.direction != Vec3::ZERO
    }

    /// Ray in the space described by `matrix`. The direction is renormalized, so
    /// distances along the result are not comparable to distances along `self`.
    pub fn transform(&self, matrix: &Mat4) -> Ray {
        Ray::new(
            matrix.transform_point3(self.origin),
            matrix.transform_vector3(self.direction),
        )
    }

    /// Slab test. Returns the entry distance, or the exit distance when the
    /// origin is inside the box.
    pub fn intersect_aabb(&self, aabb: &AABB) -> Option<f32> {
        const EPSILON: f32 = 1e-8;

        if aabb.is_empty() {
            return None;
        }

        // Clamp near-zero components so the inverse stays finite
        let inv = |d: f32| {
            if d.abs() < EPSILON {
                1.0 / EPSILON.copysign(d)
            } else {
                1.0 / d
            }
        };
        let inv_dir = Vec3::new(inv(self.direction.x), inv(self.direction.y), inv(self.direction.z));

        let t_min = (aabb.min - self.origin) * inv_dir;
        let t_max = (aabb.max - self.origin) * inv_dir;

        let t1 = t_min.min(t_max);
        let t2 = t_min.max(t_max);

        let t_near = t1.x.max(t1.y).max(t1.z);
        let t_far = t2.x.min(t2.y).min(t2.z);

        if t_near > t_far || t_far < 0.0 {
            return None;
        }

        Some(if t_near < 0.0 { t_far } else { t_near })
    }
}

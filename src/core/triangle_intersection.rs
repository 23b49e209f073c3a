use glam::Vec3;

/// Result of triangle intersection test
#[derive(Debug, Clone, Copy)]
pub struct TriangleIntersection {
    pub t: f32,           // Distance along ray
    pub u: f32,           // Barycentric coordinate u
    pub v: f32,           // Barycentric coordinate v
    pub normal: Vec3,     // Geometric normal, counter-clockwise winding
}

impl TriangleIntersection {
    /// Get barycentric coordinates (u, v, w) where w = 1 - u - v
    pub fn barycentric(&self) -> (f32, f32, f32) {
        (self.u, self.v, 1.0 - self.u - self.v)
    }

    /// Interpolate UV coordinates using barycentric coordinates
    pub fn interpolate_uv(&self, uv0: [f32; 2], uv1: [f32; 2], uv2: [f32; 2]) -> [f32; 2] {
        let (u, v, w) = self.barycentric();
        [
            w * uv0[0] + u * uv1[0] + v * uv2[0],
            w * uv0[1] + u * uv1[1] + v * uv2[1],
        ]
    }
}

/// Which triangle faces a ray may hit
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Culling {
    /// Only faces wound counter-clockwise as seen from the ray origin
    Back,
    /// Only faces wound clockwise as seen from the ray origin
    Front,
    None,
}

/// Möller-Trumbore ray-triangle intersection algorithm
pub fn moller_trumbore_intersect(
    ray_origin: Vec3,
    ray_dir: Vec3,
    v0: Vec3,
    v1: Vec3,
    v2: Vec3,
    culling: Culling,
) -> Option<TriangleIntersection> {
    const EPSILON: f32 = 1e-7;

    // Find vectors for two edges sharing v0
    let edge1 = v1 - v0;
    let edge2 = v2 - v0;

    // Calculate determinant
    let h = ray_dir.cross(edge2);
    let a = edge1.dot(h);

    // Ray is parallel to triangle, or the triangle is degenerate
    if a.abs() < EPSILON || !a.is_finite() {
        return None;
    }

    // a > 0 means the ray meets the counter-clockwise (front) side
    match culling {
        Culling::Back if a < 0.0 => return None,
        Culling::Front if a > 0.0 => return None,
        _ => {}
    }

    let f = 1.0 / a;
    let s = ray_origin - v0;
    let u = f * s.dot(h);

    // Intersection outside triangle
    if !(0.0..=1.0).contains(&u) {
        return None;
    }

    let q = s.cross(edge1);
    let v = f * ray_dir.dot(q);

    if v < 0.0 || u + v > 1.0 {
        return None;
    }

    let t = f * edge2.dot(q);

    // Ray intersection behind origin
    if t < EPSILON {
        return None;
    }

    let normal = edge1.cross(edge2).normalize();

    Some(TriangleIntersection { t, u, v, normal })
}

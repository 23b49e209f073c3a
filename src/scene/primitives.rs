//! Procedural geometry for helper meshes.

use std::f32::consts::PI;

use glam::Vec3;

use super::Geometry;

/// UV sphere centred on the origin. Segment counts are clamped to the
/// smallest values that still close the surface.
pub fn sphere(radius: f32, width_segments: u32, height_segments: u32) -> Geometry {
    let width_segments = width_segments.max(3);
    let height_segments = height_segments.max(2);

    let mut positions = Vec::new();
    let mut normals = Vec::new();
    let mut uvs = Vec::new();

    for iy in 0..=height_segments {
        let v = iy as f32 / height_segments as f32;
        let theta = v * PI;
        for ix in 0..=width_segments {
            let u = ix as f32 / width_segments as f32;
            let phi = u * 2.0 * PI;

            let normal = Vec3::new(-phi.cos() * theta.sin(), theta.cos(), phi.sin() * theta.sin());
            positions.push(normal * radius);
            normals.push(normal);
            uvs.push([u, 1.0 - v]);
        }
    }

    let row = width_segments + 1;
    let mut indices = Vec::new();
    for iy in 0..height_segments {
        for ix in 0..width_segments {
            let a = iy * row + ix + 1;
            let b = iy * row + ix;
            let c = (iy + 1) * row + ix;
            let d = (iy + 1) * row + ix + 1;

            if iy != 0 {
                indices.extend_from_slice(&[a, b, d]);
            }
            if iy != height_segments - 1 {
                indices.extend_from_slice(&[b, c, d]);
            }
        }
    }

    Geometry::new(positions, normals, uvs, Some(indices))
}

/// Horizontal plane in XZ facing +Y
pub fn plane(width: f32, depth: f32) -> Geometry {
    let (hw, hd) = (width * 0.5, depth * 0.5);
    let positions = vec![
        Vec3::new(-hw, 0.0, hd),
        Vec3::new(hw, 0.0, hd),
        Vec3::new(hw, 0.0, -hd),
        Vec3::new(-hw, 0.0, -hd),
    ];
    let normals = vec![Vec3::Y; 4];
    let uvs = vec![[0.0, 0.0], [1.0, 0.0], [1.0, 1.0], [0.0, 1.0]];

    Geometry::new(positions, normals, uvs, Some(vec![0, 1, 2, 0, 2, 3]))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sphere_vertices_lie_on_radius() {
        let g = sphere(0.5, 16, 16);
        assert_eq!(g.positions.len(), 17 * 17);
        for p in &g.positions {
            assert!((p.length() - 0.5).abs() < 1e-5);
        }
        assert!((g.bounds.max.y - 0.5).abs() < 1e-5);
    }

    #[test]
    fn sphere_triangles_face_outwards() {
        let g = sphere(1.0, 8, 6);
        for tri in g.indices.chunks_exact(3) {
            let [a, b, c] = [
                g.positions[tri[0] as usize],
                g.positions[tri[1] as usize],
                g.positions[tri[2] as usize],
            ];
            let normal = (b - a).cross(c - a);
            let centroid = (a + b + c) / 3.0;
            assert!(normal.dot(centroid) > 0.0);
        }
    }

    #[test]
    fn plane_faces_up() {
        let g = plane(10.0, 10.0);
        assert_eq!(g.triangle_count(), 2);
        let [a, b, c] = [g.positions[0], g.positions[1], g.positions[2]];
        assert!((b - a).cross(c - a).y > 0.0);
    }
}

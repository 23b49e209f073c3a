use glam::{Mat4, Vec3, Vec4};

use super::{MaterialId, NodeId, Offsets};
use crate::math::AABB;

/// Indexed triangle list. `normals`, `uvs`, `joints` and `weights` are either
/// empty or one entry per position.
#[derive(Debug, Clone, Default)]
pub struct Geometry {
    pub positions: Vec<Vec3>,
    pub normals: Vec<Vec3>,
    pub uvs: Vec<[f32; 2]>,
    pub indices: Vec<u32>,
    pub joints: Vec<[u16; 4]>,
    pub weights: Vec<[f32; 4]>,
    pub bounds: AABB,
}

impl Geometry {
    /// Builds an indexed geometry; a missing index list becomes `0..n`, and
    /// missing normals are computed from the faces.
    pub fn new(
        positions: Vec<Vec3>,
        normals: Vec<Vec3>,
        uvs: Vec<[f32; 2]>,
        indices: Option<Vec<u32>>,
    ) -> Self {
        let indices = indices.unwrap_or_else(|| (0..positions.len() as u32).collect());
        let bounds = AABB::from_points(&positions);

        let mut geometry = Self {
            positions,
            normals,
            uvs,
            indices,
            joints: Vec::new(),
            weights: Vec::new(),
            bounds,
        };

        if geometry.normals.len() != geometry.positions.len() {
            geometry.compute_normals();
        }

        geometry
    }

    pub fn with_skinning(mut self, joints: Vec<[u16; 4]>, weights: Vec<[f32; 4]>) -> Self {
        self.joints = joints;
        self.weights = weights;
        self
    }

    pub fn is_skinned(&self) -> bool {
        !self.joints.is_empty() && self.joints.len() == self.positions.len()
    }

    pub fn triangle_count(&self) -> usize {
        self.indices.len() / 3
    }

    /// Area-weighted vertex normals
    pub fn compute_normals(&mut self) {
        let mut normals = vec![Vec3::ZERO; self.positions.len()];

        for tri in self.indices.chunks_exact(3) {
            let [a, b, c] = [tri[0] as usize, tri[1] as usize, tri[2] as usize];
            if a >= normals.len() || b >= normals.len() || c >= normals.len() {
                continue;
            }
            let face = (self.positions[b] - self.positions[a])
                .cross(self.positions[c] - self.positions[a]);
            normals[a] += face;
            normals[b] += face;
            normals[c] += face;
        }

        self.normals = normals
            .into_iter()
            .map(|n| n.try_normalize().unwrap_or(Vec3::Y))
            .collect();
    }
}

/// CPU-skinned copy of a primitive's vertices, in mesh-local space
#[derive(Debug, Clone, Default)]
pub struct Deformed {
    pub positions: Vec<Vec3>,
    pub normals: Vec<Vec3>,
    pub bounds: AABB,
}

#[derive(Debug, Clone)]
pub struct Primitive {
    pub geometry: Geometry,
    pub material: MaterialId,
    pub deformed: Option<Deformed>,
}

impl Primitive {
    pub fn new(geometry: Geometry, material: MaterialId) -> Self {
        Self {
            geometry,
            material,
            deformed: None,
        }
    }

    /// Current pose positions: skinned if deformed, otherwise the bind pose
    pub fn positions(&self) -> &[Vec3] {
        match &self.deformed {
            Some(d) => &d.positions,
            None => &self.geometry.positions,
        }
    }

    pub fn normals(&self) -> &[Vec3] {
        match &self.deformed {
            Some(d) => &d.normals,
            None => &self.geometry.normals,
        }
    }

    pub fn bounds(&self) -> AABB {
        match &self.deformed {
            Some(d) => d.bounds,
            None => self.geometry.bounds,
        }
    }

    /// Linear blend skinning. `joint_matrices` map bind-pose mesh-local
    /// positions to posed mesh-local positions, one per skin joint.
    pub fn deform(&mut self, joint_matrices: &[Mat4]) {
        let geometry = &self.geometry;
        if !geometry.is_skinned() {
            return;
        }

        let mut positions = Vec::with_capacity(geometry.positions.len());
        let mut normals = Vec::with_capacity(geometry.positions.len());

        for (i, &p) in geometry.positions.iter().enumerate() {
            let joints = geometry.joints[i];
            let weights = geometry.weights.get(i).copied().unwrap_or([1.0, 0.0, 0.0, 0.0]);

            let mut skin = Mat4::ZERO;
            let mut total = 0.0;
            for k in 0..4 {
                let w = weights[k];
                if w == 0.0 {
                    continue;
                }
                if let Some(m) = joint_matrices.get(joints[k] as usize) {
                    skin += *m * w;
                    total += w;
                }
            }
            if total <= f32::EPSILON {
                skin = Mat4::IDENTITY;
            } else if (total - 1.0).abs() > 1e-4 {
                skin *= 1.0 / total;
            }

            positions.push((skin * Vec4::from((p, 1.0))).truncate());
            let n = geometry.normals.get(i).copied().unwrap_or(Vec3::Y);
            normals.push(skin.transform_vector3(n).try_normalize().unwrap_or(n));
        }

        let bounds = AABB::from_points(&positions);
        self.deformed = Some(Deformed {
            positions,
            normals,
            bounds,
        });
    }
}

#[derive(Debug, Clone, Default)]
pub struct Mesh {
    pub name: Option<String>,
    pub primitives: Vec<Primitive>,
}

impl Mesh {
    pub fn new(name: Option<String>, primitives: Vec<Primitive>) -> Self {
        Self { name, primitives }
    }

    pub fn single(geometry: Geometry, material: MaterialId) -> Self {
        Self::new(None, vec![Primitive::new(geometry, material)])
    }

    /// Union of the current bounds of every primitive
    pub fn bounds(&self) -> AABB {
        self.primitives
            .iter()
            .fold(AABB::empty(), |acc, p| acc.union(&p.bounds()))
    }

    pub(crate) fn shift(&mut self, offsets: &Offsets) {
        for primitive in &mut self.primitives {
            primitive.material = primitive.material.shifted(offsets.material);
        }
    }
}

/// Joint nodes and their inverse bind matrices
#[derive(Debug, Clone, Default)]
pub struct Skin {
    pub joints: Vec<NodeId>,
    pub inverse_bind: Vec<Mat4>,
}

impl Skin {
    pub(crate) fn shift(&mut self, offsets: &Offsets) {
        for joint in &mut self.joints {
            *joint = joint.shifted(offsets.node);
        }
    }
}

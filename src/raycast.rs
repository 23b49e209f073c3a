//! Ray casting against the scene graph.

use glam::{Vec2, Vec3};

use crate::camera::PerspectiveCamera;
use crate::core::moller_trumbore_intersect;
use crate::math::Ray;
use crate::scene::{MeshId, NodeId, NodeKind, SceneGraph};

/// One ray/triangle hit, in world space
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Intersection {
    pub distance: f32,
    pub point: Vec3,
    pub normal: Vec3,
    pub node: NodeId,
    pub mesh: MeshId,
    pub primitive: usize,
    pub face: usize,
    /// Interpolated texture coordinate, if the primitive has UVs
    pub uv: Option<[f32; 2]>,
}

#[derive(Debug, Clone, Copy)]
pub struct Raycaster {
    pub ray: Ray,
    pub near: f32,
    pub far: f32,
}

impl Default for Raycaster {
    fn default() -> Self {
        Self::new(Ray::new(Vec3::ZERO, Vec3::NEG_Z))
    }
}

impl Raycaster {
    pub fn new(ray: Ray) -> Self {
        Self {
            ray,
            near: 0.0,
            far: f32::INFINITY,
        }
    }

    /// Ray from the camera through a pointer position in NDC
    pub fn from_camera(ndc: Vec2, camera: &PerspectiveCamera) -> Self {
        Self::new(camera.ray_through(ndc))
    }

    pub fn set_from_camera(&mut self, ndc: Vec2, camera: &PerspectiveCamera) {
        self.ray = camera.ray_through(ndc);
    }

    /// Every hit on meshes under `root` (inclusive), nearest first. World
    /// matrices must be current.
    pub fn intersect_object(&self, graph: &SceneGraph, root: NodeId) -> Vec<Intersection> {
        let mut hits = Vec::new();
        self.walk(graph, root, &mut |hit| {
            hits.push(hit);
            false
        });
        hits.sort_by(|a, b| a.distance.total_cmp(&b.distance));
        hits
    }

    /// Whether anything under `root` is hit; stops at the first hit found
    pub fn hits_object(&self, graph: &SceneGraph, root: NodeId) -> bool {
        let mut found = false;
        self.walk(graph, root, &mut |_| {
            found = true;
            true
        });
        found
    }

    /// Visits hits until `visit` returns true
    fn walk(&self, graph: &SceneGraph, root: NodeId, visit: &mut dyn FnMut(Intersection) -> bool) {
        if !self.ray.is_finite() {
            return;
        }

        for id in graph.descendants(root) {
            let node = graph.node(id);
            let NodeKind::Mesh(mesh_id) = node.kind else {
                continue;
            };
            let mesh = graph.mesh(mesh_id);
            let world = node.world_matrix();

            // Cheap reject against the world-space bounds
            if self.ray.intersect_aabb(&mesh.bounds().transform(&world)).is_none() {
                continue;
            }

            let inverse = world.inverse();
            let local = self.ray.transform(&inverse);
            if !local.is_finite() {
                continue;
            }
            let normal_matrix = inverse.transpose();

            for (primitive_index, primitive) in mesh.primitives.iter().enumerate() {
                let culling = graph
                    .materials
                    .get(primitive.material.index())
                    .map(|m| m.side.culling())
                    .unwrap_or(crate::core::Culling::Back);
                let positions = primitive.positions();

                for (face, tri) in primitive.geometry.indices.chunks_exact(3).enumerate() {
                    let (Some(&v0), Some(&v1), Some(&v2)) = (
                        positions.get(tri[0] as usize),
                        positions.get(tri[1] as usize),
                        positions.get(tri[2] as usize),
                    ) else {
                        continue;
                    };

                    let Some(hit) =
                        moller_trumbore_intersect(local.origin, local.direction, v0, v1, v2, culling)
                    else {
                        continue;
                    };

                    let point = world.transform_point3(local.at(hit.t));
                    let distance = point.distance(self.ray.origin);
                    if distance < self.near || distance > self.far {
                        continue;
                    }

                    let uvs = &primitive.geometry.uvs;
                    let uv = match (
                        uvs.get(tri[0] as usize),
                        uvs.get(tri[1] as usize),
                        uvs.get(tri[2] as usize),
                    ) {
                        (Some(&a), Some(&b), Some(&c)) => Some(hit.interpolate_uv(a, b, c)),
                        _ => None,
                    };

                    let intersection = Intersection {
                        distance,
                        point,
                        normal: normal_matrix
                            .transform_vector3(hit.normal)
                            .normalize_or_zero(),
                        node: id,
                        mesh: mesh_id,
                        primitive: primitive_index,
                        face,
                        uv,
                    };
                    if visit(intersection) {
                        return;
                    }
                }
            }
        }
    }
}

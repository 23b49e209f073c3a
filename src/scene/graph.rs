use glam::{Mat4, Quat, Vec3};

use super::{
    Light, Material, MaterialId, Mesh, MeshId, NodeId, Offsets, Skin, SkinId, TextureData,
    TextureId,
};
use crate::math::AABB;

/// Local translation / rotation / scale of a node
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Transform {
    pub translation: Vec3,
    pub rotation: Quat,
    pub scale: Vec3,
}

impl Transform {
    pub const IDENTITY: Self = Self {
        translation: Vec3::ZERO,
        rotation: Quat::IDENTITY,
        scale: Vec3::ONE,
    };

    pub fn from_translation(translation: Vec3) -> Self {
        Self {
            translation,
            ..Self::IDENTITY
        }
    }

    pub fn matrix(&self) -> Mat4 {
        Mat4::from_scale_rotation_translation(self.scale, self.rotation, self.translation)
    }
}

impl Default for Transform {
    fn default() -> Self {
        Self::IDENTITY
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum NodeKind {
    Group,
    Mesh(MeshId),
    Light(Light),
}

#[derive(Debug, Clone)]
pub struct Node {
    pub name: Option<String>,
    pub transform: Transform,
    pub kind: NodeKind,
    pub skin: Option<SkinId>,
    pub visible: bool,
    pub(crate) parent: Option<NodeId>,
    pub(crate) children: Vec<NodeId>,
    pub(crate) world: Mat4,
}

impl Node {
    pub fn new(kind: NodeKind) -> Self {
        Self {
            name: None,
            transform: Transform::IDENTITY,
            kind,
            skin: None,
            visible: true,
            parent: None,
            children: Vec::new(),
            world: Mat4::IDENTITY,
        }
    }

    pub fn group() -> Self {
        Self::new(NodeKind::Group)
    }

    pub fn named(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn at(mut self, translation: Vec3) -> Self {
        self.transform.translation = translation;
        self
    }

    pub fn parent(&self) -> Option<NodeId> {
        self.parent
    }

    pub fn children(&self) -> &[NodeId] {
        &self.children
    }

    /// World matrix as of the last `update_world_matrices`
    pub fn world_matrix(&self) -> Mat4 {
        self.world
    }

    pub(crate) fn shift(&mut self, offsets: &Offsets) {
        self.parent = self.parent.map(|p| p.shifted(offsets.node));
        for child in &mut self.children {
            *child = child.shifted(offsets.node);
        }
        if let NodeKind::Mesh(mesh) = &mut self.kind {
            *mesh = mesh.shifted(offsets.mesh);
        }
        self.skin = self.skin.map(|s| s.shifted(offsets.skin));
    }
}

/// Arena scene graph. Node 0 is the root group and always exists.
#[derive(Debug, Clone)]
pub struct SceneGraph {
    nodes: Vec<Node>,
    pub meshes: Vec<Mesh>,
    pub materials: Vec<Material>,
    pub textures: Vec<TextureData>,
    pub skins: Vec<Skin>,
}

impl SceneGraph {
    pub fn new() -> Self {
        Self {
            nodes: vec![Node::group().named("Scene")],
            meshes: Vec::new(),
            materials: Vec::new(),
            textures: Vec::new(),
            skins: Vec::new(),
        }
    }

    pub fn root(&self) -> NodeId {
        NodeId(0)
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.len() <= 1
    }

    pub fn node(&self, id: NodeId) -> &Node {
        &self.nodes[id.0]
    }

    pub fn node_mut(&mut self, id: NodeId) -> &mut Node {
        &mut self.nodes[id.0]
    }

    pub fn get(&self, id: NodeId) -> Option<&Node> {
        self.nodes.get(id.0)
    }

    pub fn nodes(&self) -> impl Iterator<Item = (NodeId, &Node)> {
        self.nodes.iter().enumerate().map(|(i, n)| (NodeId(i), n))
    }

    pub fn mesh(&self, id: MeshId) -> &Mesh {
        &self.meshes[id.0]
    }

    pub fn material(&self, id: MaterialId) -> &Material {
        &self.materials[id.0]
    }

    pub fn material_mut(&mut self, id: MaterialId) -> &mut Material {
        &mut self.materials[id.0]
    }

    pub fn add_mesh(&mut self, mesh: Mesh) -> MeshId {
        self.meshes.push(mesh);
        MeshId(self.meshes.len() - 1)
    }

    pub fn add_material(&mut self, material: Material) -> MaterialId {
        self.materials.push(material);
        MaterialId(self.materials.len() - 1)
    }

    pub fn add_texture(&mut self, texture: TextureData) -> TextureId {
        self.textures.push(texture);
        TextureId(self.textures.len() - 1)
    }

    /// Appends `node` under `parent`
    pub fn add(&mut self, parent: NodeId, mut node: Node) -> NodeId {
        let id = NodeId(self.nodes.len());
        node.parent = Some(parent);
        node.children.clear();
        self.nodes.push(node);
        self.nodes[parent.0].children.push(id);
        id
    }

    /// Appends another graph's contents (everything except its root) and
    /// reparents the fragment's top-level nodes under `parent`. Returns the
    /// offsets that were applied to the fragment's ids.
    pub fn merge(&mut self, parent: NodeId, fragment: SceneGraph) -> Offsets {
        let offsets = Offsets {
            // Fragment root is dropped, so fragment node i lands at node + i
            node: self.nodes.len() - 1,
            mesh: self.meshes.len(),
            material: self.materials.len(),
            texture: self.textures.len(),
            skin: self.skins.len(),
        };

        let SceneGraph {
            nodes,
            meshes,
            materials,
            textures,
            skins,
        } = fragment;

        let fragment_root = NodeId(0);
        let top_level: Vec<NodeId> = nodes[0].children.clone();

        for mut node in nodes.into_iter().skip(1) {
            let was_top = node.parent == Some(fragment_root);
            node.shift(&offsets);
            if was_top {
                node.parent = Some(parent);
            }
            self.nodes.push(node);
        }
        for id in top_level {
            self.nodes[parent.0].children.push(id.shifted(offsets.node));
        }

        self.meshes.extend(meshes.into_iter().map(|mut m| {
            m.shift(&offsets);
            m
        }));
        self.materials.extend(materials.into_iter().map(|mut m| {
            m.shift(&offsets);
            m
        }));
        self.textures.extend(textures);
        self.skins.extend(skins.into_iter().map(|mut s| {
            s.shift(&offsets);
            s
        }));

        offsets
    }

    /// `id` followed by all of its descendants, depth first
    pub fn descendants(&self, id: NodeId) -> Vec<NodeId> {
        let mut out = Vec::new();
        let mut stack = vec![id];
        while let Some(current) = stack.pop() {
            out.push(current);
            stack.extend(self.nodes[current.0].children.iter().rev());
        }
        out
    }

    pub fn find_by_name(&self, name: &str) -> Option<NodeId> {
        self.nodes
            .iter()
            .position(|n| n.name.as_deref() == Some(name))
            .map(NodeId)
    }

    /// Recomputes every world matrix from the root down
    pub fn update_world_matrices(&mut self) {
        let mut stack = vec![(NodeId(0), Mat4::IDENTITY)];
        while let Some((id, parent_world)) = stack.pop() {
            let node = &mut self.nodes[id.0];
            node.world = parent_world * node.transform.matrix();
            let world = node.world;
            for &child in &node.children {
                stack.push((child, world));
            }
        }
    }

    /// CPU skinning for every skinned mesh node. Needs fresh world matrices.
    pub fn update_skins(&mut self) {
        let mut jobs: Vec<(usize, Vec<Mat4>)> = Vec::new();

        for node in &self.nodes {
            let (NodeKind::Mesh(mesh), Some(skin)) = (&node.kind, node.skin) else {
                continue;
            };
            let Some(skin) = self.skins.get(skin.0) else {
                continue;
            };

            let inverse_mesh = node.world.inverse();
            let matrices = skin
                .joints
                .iter()
                .enumerate()
                .map(|(i, joint)| {
                    let bind = skin.inverse_bind.get(i).copied().unwrap_or(Mat4::IDENTITY);
                    inverse_mesh * self.nodes[joint.0].world * bind
                })
                .collect();
            jobs.push((mesh.0, matrices));
        }

        for (mesh, matrices) in jobs {
            for primitive in &mut self.meshes[mesh].primitives {
                primitive.deform(&matrices);
            }
        }
    }

    /// Lights with their world matrices
    pub fn lights(&self) -> impl Iterator<Item = (&Light, Mat4)> {
        self.nodes.iter().filter(|n| n.visible).filter_map(|n| match &n.kind {
            NodeKind::Light(light) => Some((light, n.world)),
            _ => None,
        })
    }

    pub fn light_mut(&mut self, id: NodeId) -> Option<&mut Light> {
        match &mut self.nodes.get_mut(id.0)?.kind {
            NodeKind::Light(light) => Some(light),
            _ => None,
        }
    }

    /// World-space bounds of every mesh under `id`
    pub fn world_bounds(&self, id: NodeId) -> AABB {
        self.descendants(id)
            .into_iter()
            .filter_map(|n| {
                let node = &self.nodes[n.0];
                match node.kind {
                    NodeKind::Mesh(mesh) => Some(self.meshes[mesh.0].bounds().transform(&node.world)),
                    _ => None,
                }
            })
            .fold(AABB::empty(), |acc, b| acc.union(&b))
    }
}

impl Default for SceneGraph {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scene::{Geometry, Primitive};

    fn triangle_mesh() -> Mesh {
        Mesh::new(
            None,
            vec![Primitive::new(
                Geometry::new(vec![Vec3::ZERO, Vec3::X, Vec3::Y], Vec::new(), Vec::new(), None),
                MaterialId(0),
            )],
        )
    }

    #[test]
    fn world_matrices_compose_down_the_tree() {
        let mut graph = SceneGraph::new();
        let parent = graph.add(graph.root(), Node::group().at(Vec3::new(0.0, -1.2, 0.0)));
        let child = graph.add(parent, Node::group().at(Vec3::new(1.0, 0.0, 0.0)));

        graph.node_mut(parent).transform.scale = Vec3::splat(2.0);
        graph.update_world_matrices();

        let p = graph.node(child).world_matrix().transform_point3(Vec3::ZERO);
        assert!((p - Vec3::new(2.0, -1.2, 0.0)).length() < 1e-6);
    }

    #[test]
    fn descendants_are_depth_first() {
        let mut graph = SceneGraph::new();
        let a = graph.add(graph.root(), Node::group().named("a"));
        let b = graph.add(a, Node::group().named("b"));
        let c = graph.add(graph.root(), Node::group().named("c"));

        assert_eq!(graph.descendants(graph.root()), vec![NodeId(0), a, b, c]);
        assert_eq!(graph.find_by_name("c"), Some(c));
        assert_eq!(graph.find_by_name("missing"), None);
    }

    #[test]
    fn merge_shifts_fragment_ids() {
        let mut graph = SceneGraph::new();
        graph.add_material(Material::basic([1.0, 0.0, 0.0]));
        let holder = graph.add(graph.root(), Node::group().named("holder"));

        let mut fragment = SceneGraph::new();
        fragment.add_material(Material::standard([1.0; 4]));
        let mesh = fragment.add_mesh(triangle_mesh());
        let top = fragment.add(fragment.root(), Node::group().named("top"));
        fragment.add(top, Node::new(NodeKind::Mesh(mesh)).named("leaf"));

        let offsets = graph.merge(holder, fragment);

        let top_id = graph.find_by_name("top").unwrap();
        let leaf_id = graph.find_by_name("leaf").unwrap();
        assert_eq!(top_id, NodeId(offsets.node + 1));
        assert_eq!(graph.node(top_id).parent(), Some(holder));
        assert_eq!(graph.node(holder).children(), &[top_id]);
        assert_eq!(graph.node(leaf_id).parent(), Some(top_id));

        let NodeKind::Mesh(merged_mesh) = graph.node(leaf_id).kind else {
            panic!("leaf should be a mesh");
        };
        assert_eq!(graph.mesh(merged_mesh).primitives[0].material, MaterialId(1));
    }

    #[test]
    fn world_bounds_follow_transform() {
        let mut graph = SceneGraph::new();
        let mesh = graph.add_mesh(triangle_mesh());
        let node = graph.add(
            graph.root(),
            Node::new(NodeKind::Mesh(mesh)).at(Vec3::new(0.0, 0.0, -5.0)),
        );
        graph.update_world_matrices();

        let bounds = graph.world_bounds(node);
        assert_eq!(bounds.min.z, -5.0);
        assert_eq!(bounds.max, Vec3::new(1.0, 1.0, -5.0));
    }
}

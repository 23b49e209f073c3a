//! Scene graph: an arena of nodes plus the meshes, materials, textures and
//! skins they reference. Ids are plain indices into the arena vectors.

mod graph;
mod light;
mod material;
mod mesh;
pub mod primitives;

pub use graph::{Node, NodeKind, SceneGraph, Transform};
pub use light::{Light, LightKind};
pub use material::{update_all_materials, Material, Shading, Side, TextureData};
pub use mesh::{Deformed, Geometry, Mesh, Primitive, Skin};

macro_rules! arena_id {
    ($($name:ident),*) => {
        $(
            #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
            pub struct $name(pub usize);

            impl $name {
                pub fn index(self) -> usize {
                    self.0
                }

                pub(crate) fn shifted(self, by: usize) -> Self {
                    Self(self.0 + by)
                }
            }
        )*
    };
}

arena_id!(NodeId, MeshId, MaterialId, TextureId, SkinId);

/// Arena lengths at the moment a fragment is appended; every id inside the
/// fragment is shifted by the matching field.
#[derive(Debug, Clone, Copy, Default)]
pub struct Offsets {
    pub node: usize,
    pub mesh: usize,
    pub material: usize,
    pub texture: usize,
    pub skin: usize,
}

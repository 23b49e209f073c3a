use super::{Offsets, SceneGraph, TextureId};
use crate::core::Culling;

/// Lighting model of a material
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Shading {
    /// Unlit flat colour, ignores lights and environment
    Basic,
    /// Lit metallic-roughness material that accepts an environment map
    Standard,
}

/// Which faces are drawn and hit by rays
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Side {
    #[default]
    Front,
    Back,
    Double,
}

impl Side {
    pub fn culling(self) -> Culling {
        match self {
            Side::Front => Culling::Back,
            Side::Back => Culling::Front,
            Side::Double => Culling::None,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Material {
    pub name: Option<String>,
    pub shading: Shading,
    /// Linear RGBA factor
    pub base_color: [f32; 4],
    pub base_color_texture: Option<TextureId>,
    pub metallic: f32,
    pub roughness: f32,
    pub side: Side,
    pub env_map_intensity: f32,
}

impl Material {
    pub fn basic(color: [f32; 3]) -> Self {
        Self {
            name: None,
            shading: Shading::Basic,
            base_color: [color[0], color[1], color[2], 1.0],
            base_color_texture: None,
            metallic: 0.0,
            roughness: 1.0,
            side: Side::Front,
            env_map_intensity: 1.0,
        }
    }

    pub fn standard(color: [f32; 4]) -> Self {
        Self {
            shading: Shading::Standard,
            base_color: color,
            ..Self::basic([0.0; 3])
        }
    }

    pub fn supports_env_map(&self) -> bool {
        self.shading == Shading::Standard
    }

    pub(crate) fn shift(&mut self, offsets: &Offsets) {
        self.base_color_texture = self.base_color_texture.map(|t| t.shifted(offsets.texture));
    }
}

/// Decoded texture, always RGBA8
#[derive(Debug, Clone, PartialEq)]
pub struct TextureData {
    pub width: u32,
    pub height: u32,
    pub data: Vec<u8>,
}

/// Pushes `intensity` into every material that can take an environment map.
/// Returns how many materials were touched.
pub fn update_all_materials(graph: &mut SceneGraph, intensity: f32) -> usize {
    let mut touched = 0;
    for material in graph.materials.iter_mut().filter(|m| m.supports_env_map()) {
        material.env_map_intensity = intensity;
        touched += 1;
    }
    touched
}

use glam::{Mat4, Vec3};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LightKind {
    /// Uniform light from every direction
    Ambient,
    /// Parallel rays from the node position towards the world origin
    Directional,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Light {
    pub kind: LightKind,
    /// Linear RGB
    pub color: [f32; 3],
    pub intensity: f32,
}

impl Light {
    pub fn ambient(color: [f32; 3], intensity: f32) -> Self {
        Self {
            kind: LightKind::Ambient,
            color,
            intensity,
        }
    }

    pub fn directional(color: [f32; 3], intensity: f32) -> Self {
        Self {
            kind: LightKind::Directional,
            color,
            intensity,
        }
    }

    /// Radiance scaled by intensity
    pub fn radiance(&self) -> Vec3 {
        Vec3::from_array(self.color) * self.intensity
    }

    /// Direction the light travels, given the light node's world matrix.
    /// `None` for ambient lights or a light sitting on its target.
    pub fn direction(&self, world: &Mat4) -> Option<Vec3> {
        match self.kind {
            LightKind::Ambient => None,
            LightKind::Directional => {
                let position = world.transform_point3(Vec3::ZERO);
                let dir = -position;
                (dir.length_squared() > f32::EPSILON).then(|| dir.normalize())
            }
        }
    }
}

//! Everything the frame loop, the loaders and the debug panel share. One
//! instance lives on the event-loop thread and is passed by reference.

use glam::{Quat, Vec3};

use crate::animation::{AnimationMixer, Locomotion};
use crate::camera::{PerspectiveCamera, DEFAULT_FAR, DEFAULT_NEAR};
use crate::config::{linear_color, ModelPlacement, SceneConfig};
use crate::controls::OrbitControls;
use crate::error::ConfigError;
use crate::input::{InputTracker, Viewport};
use crate::loaders::{CubeImages, ModelAsset};
use crate::scene::{
    primitives, update_all_materials, Light, Material, Mesh, Node, NodeId, NodeKind, SceneGraph,
    Transform,
};
use crate::traits::OutputSurface;

/// The loaded model's group node and the scale it was placed at
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ModelHandle {
    pub node: NodeId,
    pub base_scale: Vec3,
}

pub struct SceneContext {
    pub graph: SceneGraph,
    pub camera: PerspectiveCamera,
    pub controls: OrbitControls,
    pub input: InputTracker,
    pub viewport: Viewport,
    pub mixer: Option<AnimationMixer>,
    pub ambient_light: NodeId,
    pub directional_light: NodeId,
    pub env_map_intensity: f32,
    pub model_rotation_y: f32,
    model: Option<ModelHandle>,
    placement: ModelPlacement,
    initial_action: Option<Locomotion>,
    skybox: Option<CubeImages>,
}

impl SceneContext {
    pub fn new(config: &SceneConfig, viewport: Viewport) -> Result<Self, ConfigError> {
        let mut graph = SceneGraph::new();
        let root = graph.root();

        let ambient = Light::ambient(config.ambient.linear_color()?, config.ambient.intensity);
        let ambient_light = graph.add(root, Node::new(NodeKind::Light(ambient)).named("AmbientLight"));

        let directional = Light::directional(
            config.directional.linear_color()?,
            config.directional.intensity,
        );
        let directional_light = graph.add(
            root,
            Node::new(NodeKind::Light(directional))
                .named("DirectionalLight")
                .at(Vec3::from_array(config.directional.position)),
        );

        if let Some(floor) = &config.floor {
            let [r, g, b] = linear_color(&floor.color)?;
            let mut material = Material::standard([r, g, b, 1.0]);
            material.metallic = 0.0;
            material.roughness = 0.5;
            let material = graph.add_material(material);
            let mesh = graph.add_mesh(Mesh::single(primitives::plane(floor.size, floor.size), material));
            graph.add(root, Node::new(NodeKind::Mesh(mesh)).named("Floor"));
        }

        let mut camera = PerspectiveCamera::new(config.fov, viewport.aspect(), DEFAULT_NEAR, DEFAULT_FAR);
        camera.position = config.camera_position();
        camera.target = config.camera_target();

        graph.update_world_matrices();

        Ok(Self {
            graph,
            camera,
            controls: OrbitControls::new().with_damping(config.damping),
            input: InputTracker::new(),
            viewport,
            mixer: None,
            ambient_light,
            directional_light,
            env_map_intensity: config.env_map_intensity,
            model_rotation_y: config.placement.rotation_y,
            model: None,
            placement: config.placement.clone(),
            initial_action: config.initial_action,
            skybox: None,
        })
    }

    pub fn model(&self) -> Option<ModelHandle> {
        self.model
    }

    /// Inserts a loaded model under the scene root. Only the first model is
    /// accepted; later calls are logged and return `None`.
    pub fn set_model(&mut self, asset: ModelAsset) -> Option<NodeId> {
        if self.model.is_some() {
            log::warn!("A model is already loaded, ignoring the new one");
            return None;
        }

        let ModelAsset {
            graph: fragment,
            mut clips,
        } = asset;

        let base_scale = Vec3::splat(self.placement.scale);
        let mut group = Node::group().named("Model");
        group.transform = Transform {
            translation: Vec3::from_array(self.placement.position),
            rotation: Quat::from_rotation_y(self.model_rotation_y),
            scale: base_scale,
        };
        let root = self.graph.root();
        let node = self.graph.add(root, group);
        let offsets = self.graph.merge(node, fragment);

        let touched = update_all_materials(&mut self.graph, self.env_map_intensity);
        log::debug!("Set env-map intensity on {} materials", touched);

        if !clips.is_empty() {
            for clip in &mut clips {
                clip.shift(&offsets);
            }
            let mut mixer = AnimationMixer::new(clips);
            if let Some(action) = self.initial_action {
                mixer.activate(action);
            }
            self.mixer = Some(mixer);
        }

        self.graph.update_world_matrices();
        self.graph.update_skins();
        self.model = Some(ModelHandle { node, base_scale });
        let bounds = self.graph.world_bounds(node);
        log::info!(
            "Model added to scene ({} nodes total, bounds {:?} to {:?})",
            self.graph.len(),
            bounds.min,
            bounds.max
        );
        Some(node)
    }

    /// Applies a new viewport to the camera and the output surface. Zero or
    /// negative sizes (minimised windows) are ignored. Returns whether the
    /// viewport changed.
    pub fn resize(
        &mut self,
        width: f32,
        height: f32,
        device_pixel_ratio: f32,
        surface: &mut dyn OutputSurface,
    ) -> bool {
        let viewport = Viewport::new(width, height, device_pixel_ratio);
        if viewport.is_degenerate() {
            log::debug!("Ignoring resize to {}x{}", width, height);
            return false;
        }

        self.viewport = viewport;
        self.camera.set_aspect(viewport.aspect());
        surface.set_size(width.round() as u32, height.round() as u32);
        surface.set_pixel_ratio(viewport.pixel_ratio);
        true
    }

    pub fn skybox(&self) -> Option<&CubeImages> {
        self.skybox.as_ref()
    }

    pub fn set_skybox(&mut self, images: CubeImages) {
        self.skybox = Some(images);
    }

    /// Stores the intensity and pushes it into every env-capable material
    pub fn set_env_map_intensity(&mut self, intensity: f32) -> usize {
        self.env_map_intensity = intensity;
        update_all_materials(&mut self.graph, intensity)
    }

    /// Rotates the model group about Y, or remembers the angle until a model
    /// arrives
    pub fn set_model_rotation_y(&mut self, angle: f32) {
        self.model_rotation_y = angle;
        if let Some(model) = self.model {
            self.graph.node_mut(model.node).transform.rotation = Quat::from_rotation_y(angle);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Variant;
    use crate::scene::Shading;

    struct RecordingSurface {
        size: (u32, u32),
        ratio: f32,
    }

    impl OutputSurface for RecordingSurface {
        fn set_size(&mut self, width: u32, height: u32) {
            self.size = (width, height);
        }

        fn set_pixel_ratio(&mut self, ratio: f32) {
            self.ratio = ratio;
        }

        fn buffer_size(&self) -> (u32, u32) {
            (
                (self.size.0 as f32 * self.ratio) as u32,
                (self.size.1 as f32 * self.ratio) as u32,
            )
        }
    }

    fn sphere_asset() -> ModelAsset {
        let mut graph = SceneGraph::new();
        let material = graph.add_material(Material::standard([1.0; 4]));
        let mesh = graph.add_mesh(Mesh::single(primitives::sphere(0.5, 16, 16), material));
        let root = graph.root();
        graph.add(root, Node::new(NodeKind::Mesh(mesh)).named("Sphere"));
        ModelAsset {
            graph,
            clips: Vec::new(),
        }
    }

    fn context(variant: Variant) -> SceneContext {
        SceneContext::new(&SceneConfig::preset(variant), Viewport::new(800.0, 600.0, 1.0)).unwrap()
    }

    #[test]
    fn lights_follow_config() {
        let ctx = context(Variant::Hover);
        let lights: Vec<_> = ctx.graph.lights().map(|(l, _)| l.intensity).collect();
        assert_eq!(lights, vec![0.3, 0.7]);
        assert_eq!(
            ctx.graph.node(ctx.directional_light).transform.translation,
            Vec3::new(1.0, 2.0, 3.0)
        );
    }

    #[test]
    fn animated_variant_has_floor() {
        let ctx = context(Variant::Animated);
        let floor = ctx.graph.find_by_name("Floor");
        assert!(floor.is_some());
        assert_eq!(ctx.graph.materials[0].shading, Shading::Standard);
    }

    #[test]
    fn model_is_placed_once() {
        let mut ctx = context(Variant::Hover);
        let node = ctx.set_model(sphere_asset()).expect("first model accepted");
        assert_eq!(ctx.graph.node(node).transform.translation, Vec3::new(0.0, -1.2, 0.0));
        assert_eq!(ctx.model().map(|m| m.base_scale), Some(Vec3::ONE));

        let before = ctx.graph.len();
        assert!(ctx.set_model(sphere_asset()).is_none());
        assert_eq!(ctx.graph.len(), before, "second model must not be merged");
    }

    #[test]
    fn resize_updates_camera_and_surface() {
        let mut ctx = context(Variant::Hover);
        let mut surface = RecordingSurface { size: (0, 0), ratio: 1.0 };

        assert!(ctx.resize(1024.0, 512.0, 3.0, &mut surface));
        assert_eq!(ctx.camera.aspect(), 2.0);
        assert_eq!(surface.size, (1024, 512));
        assert_eq!(surface.ratio, 2.0);

        assert!(!ctx.resize(0.0, 512.0, 1.0, &mut surface));
        assert_eq!(ctx.camera.aspect(), 2.0);
        assert_eq!(surface.size, (1024, 512));
    }

    #[test]
    fn rotation_applies_before_and_after_load() {
        let mut ctx = context(Variant::Hover);
        ctx.set_model_rotation_y(1.0);
        let node = ctx.set_model(sphere_asset()).unwrap();
        let rotation = ctx.graph.node(node).transform.rotation;
        assert!(rotation.angle_between(Quat::from_rotation_y(1.0)) < 1e-5);

        ctx.set_model_rotation_y(-0.5);
        let rotation = ctx.graph.node(node).transform.rotation;
        assert!(rotation.angle_between(Quat::from_rotation_y(-0.5)) < 1e-5);
    }
}

use hover_scene::config::{SceneConfig, Variant};
use hover_scene::context::SceneContext;
use hover_scene::debug_panel::{DebugPanel, SliderBinding};
use hover_scene::input::Viewport;
use hover_scene::loaders::ModelAsset;
use hover_scene::scene::{primitives, Material, Mesh, Node, NodeKind, SceneGraph, Shading};

/// Two lit materials and one unlit one
fn helmet_asset() -> ModelAsset {
    let mut graph = SceneGraph::new();
    let root = graph.root();
    for material in [
        Material::standard([0.8, 0.8, 0.8, 1.0]),
        Material::standard([0.2, 0.3, 0.4, 1.0]),
        Material::basic([1.0, 0.0, 0.0]),
    ] {
        let material = graph.add_material(material);
        let mesh = graph.add_mesh(Mesh::single(primitives::sphere(0.5, 8, 6), material));
        graph.add(root, Node::new(NodeKind::Mesh(mesh)));
    }
    ModelAsset {
        graph,
        clips: Vec::new(),
    }
}

fn environment() -> (SceneContext, DebugPanel) {
    let config = SceneConfig::preset(Variant::Environment);
    let mut ctx = SceneContext::new(&config, Viewport::new(800.0, 600.0, 1.0)).unwrap();
    ctx.set_model(helmet_asset()).expect("model accepted");
    (ctx, DebugPanel::for_config(&config))
}

fn env_intensities(ctx: &SceneContext, shading: Shading) -> Vec<f32> {
    ctx.graph
        .materials
        .iter()
        .filter(|m| m.shading == shading)
        .map(|m| m.env_map_intensity)
        .collect()
}

#[cfg(test)]
mod debug_panel_tests {
    use super::*;

    #[test]
    fn test_loaded_materials_take_configured_intensity() {
        let (ctx, _) = environment();
        assert_eq!(env_intensities(&ctx, Shading::Standard), vec![2.5, 2.5]);
    }

    #[test]
    fn test_env_slider_updates_every_material() {
        let (mut ctx, panel) = environment();

        let written = panel.set_binding(&mut ctx, SliderBinding::EnvMapIntensity, 4.0);

        assert_eq!(written, Some(4.0));
        assert_eq!(ctx.env_map_intensity, 4.0);
        assert_eq!(env_intensities(&ctx, Shading::Standard), vec![4.0, 4.0]);
        assert_eq!(env_intensities(&ctx, Shading::Basic), vec![1.0]);
    }

    #[test]
    fn test_slider_values_are_clamped() {
        let (mut ctx, panel) = environment();

        assert_eq!(panel.set_binding(&mut ctx, SliderBinding::EnvMapIntensity, 25.0), Some(10.0));
        assert_eq!(env_intensities(&ctx, Shading::Standard), vec![10.0, 10.0]);

        assert_eq!(panel.set_binding(&mut ctx, SliderBinding::DirectionalX, -9.0), Some(-5.0));
        assert_eq!(SliderBinding::DirectionalX.get(&ctx), -5.0);
    }

    #[test]
    fn test_light_sliders_write_scene() {
        let (mut ctx, panel) = environment();

        panel.set_binding(&mut ctx, SliderBinding::AmbientIntensity, 1.5);
        panel.set_binding(&mut ctx, SliderBinding::DirectionalIntensity, 6.0);
        panel.set_binding(&mut ctx, SliderBinding::DirectionalY, 4.0);

        assert_eq!(SliderBinding::AmbientIntensity.get(&ctx), 1.5);
        assert_eq!(SliderBinding::DirectionalIntensity.get(&ctx), 6.0);
        let position = ctx.graph.node(ctx.directional_light).transform.translation;
        assert_eq!(position.y, 4.0);
    }

    #[test]
    fn test_hover_variant_has_no_env_slider() {
        let config = SceneConfig::preset(Variant::Hover);
        let mut ctx = SceneContext::new(&config, Viewport::new(800.0, 600.0, 1.0)).unwrap();
        let panel = DebugPanel::for_config(&config);

        assert!(panel.find(SliderBinding::EnvMapIntensity).is_none());
        assert!(panel.actions().is_empty());
        assert_eq!(panel.set_binding(&mut ctx, SliderBinding::EnvMapIntensity, 3.0), None);
    }
}

use glam::{Vec2, Vec3};
use hover_scene::config::{SceneConfig, Variant};
use hover_scene::context::SceneContext;
use hover_scene::error::RenderError;
use hover_scene::input::Viewport;
use hover_scene::loaders::ModelAsset;
use hover_scene::scene::{primitives, Material, Mesh, Node, NodeKind, SceneGraph};
use hover_scene::traits::SceneDrawer;
use hover_scene::updater::{FrameUpdater, HOVER_SCALE};

const WIDTH: f32 = 800.0;
const HEIGHT: f32 = 600.0;
/// Just off the placed model's centre so the ray never grazes a mesh seam
const MODEL_CENTER_NUDGED: Vec3 = Vec3::new(0.03, -1.17, 0.02);

/// Counts draws and remembers the model scale it was handed
#[derive(Default)]
struct MockDrawer {
    draws: usize,
    last_scale: Option<Vec3>,
}

impl SceneDrawer for MockDrawer {
    fn draw(&mut self, scene: &SceneContext) -> Result<(), RenderError> {
        self.draws += 1;
        self.last_scale = scene
            .model()
            .map(|m| scene.graph.node(m.node).transform.scale);
        Ok(())
    }
}

fn sphere_asset() -> ModelAsset {
    let mut graph = SceneGraph::new();
    let material = graph.add_material(Material::standard([1.0; 4]));
    let mesh = graph.add_mesh(Mesh::single(primitives::sphere(0.5, 24, 16), material));
    let root = graph.root();
    graph.add(root, Node::new(NodeKind::Mesh(mesh)).named("Sphere"));
    ModelAsset {
        graph,
        clips: Vec::new(),
    }
}

fn context() -> SceneContext {
    SceneContext::new(
        &SceneConfig::preset(Variant::Hover),
        Viewport::new(WIDTH, HEIGHT, 1.0),
    )
    .expect("hover preset is valid")
}

/// Moves the pointer to the client position that projects onto `world`
fn point_at(ctx: &mut SceneContext, world: Vec3) {
    let ndc = ctx.camera.view_projection().project_point3(world);
    let client = Vec2::new((ndc.x + 1.0) * 0.5 * WIDTH, (1.0 - ndc.y) * 0.5 * HEIGHT);
    let viewport = ctx.viewport;
    ctx.input.pointer_moved(client.x, client.y, &viewport);
}

fn model_scale(ctx: &SceneContext) -> Vec3 {
    let model = ctx.model().expect("model loaded");
    ctx.graph.node(model.node).transform.scale
}

#[cfg(test)]
mod hover_tests {
    use super::*;

    #[test]
    fn test_without_model_nothing_changes() {
        let mut ctx = context();
        let mut updater = FrameUpdater::new();
        let mut drawer = MockDrawer::default();
        point_at(&mut ctx, Vec3::ZERO);

        let scales_before: Vec<Vec3> = ctx.graph.nodes().map(|(_, n)| n.transform.scale).collect();

        assert!(updater.update_hover(&mut ctx).is_none());
        updater
            .tick(&mut ctx, 1.0 / 60.0, &mut drawer)
            .expect("tick succeeds without a model");

        let scales_after: Vec<Vec3> = ctx.graph.nodes().map(|(_, n)| n.transform.scale).collect();
        assert_eq!(scales_before, scales_after);
        assert_eq!(drawer.draws, 1);
        assert_eq!(drawer.last_scale, None);
        assert!(!updater.is_hovered());
    }

    #[test]
    fn test_pointer_over_model_scales_up() {
        let mut ctx = context();
        ctx.set_model(sphere_asset()).expect("model accepted");
        let mut updater = FrameUpdater::new();
        let mut drawer = MockDrawer::default();

        point_at(&mut ctx, MODEL_CENTER_NUDGED);
        updater.tick(&mut ctx, 1.0 / 60.0, &mut drawer).unwrap();

        assert!(updater.is_hovered());
        assert_eq!(model_scale(&ctx), Vec3::splat(HOVER_SCALE));
        assert_eq!(drawer.last_scale, Some(Vec3::splat(1.2)));
    }

    #[test]
    fn test_pointer_off_model_keeps_unit_scale() {
        let mut ctx = context();
        ctx.set_model(sphere_asset()).expect("model accepted");
        let mut updater = FrameUpdater::new();
        let mut drawer = MockDrawer::default();

        let viewport = ctx.viewport;
        ctx.input.pointer_moved(0.0, 0.0, &viewport);
        updater.tick(&mut ctx, 1.0 / 60.0, &mut drawer).unwrap();

        assert!(!updater.is_hovered());
        assert_eq!(model_scale(&ctx), Vec3::ONE);
    }

    #[test]
    fn test_leaving_model_restores_scale() {
        let mut ctx = context();
        ctx.set_model(sphere_asset()).expect("model accepted");
        let mut updater = FrameUpdater::new();
        let mut drawer = MockDrawer::default();

        point_at(&mut ctx, MODEL_CENTER_NUDGED);
        updater.tick(&mut ctx, 1.0 / 60.0, &mut drawer).unwrap();
        assert_eq!(model_scale(&ctx), Vec3::splat(1.2));

        // Still over the model while enlarged
        updater.tick(&mut ctx, 1.0 / 60.0, &mut drawer).unwrap();
        assert_eq!(model_scale(&ctx), Vec3::splat(1.2));

        point_at(&mut ctx, Vec3::new(2.5, 1.5, 0.0));
        updater.tick(&mut ctx, 1.0 / 60.0, &mut drawer).unwrap();
        assert_eq!(model_scale(&ctx), Vec3::ONE);
        assert_eq!(drawer.draws, 3);
    }

    #[test]
    fn test_hover_scale_is_relative_to_placement() {
        let mut config = SceneConfig::preset(Variant::Hover);
        config.placement.scale = 0.5;
        let mut ctx = SceneContext::new(&config, Viewport::new(WIDTH, HEIGHT, 1.0)).unwrap();
        ctx.set_model(sphere_asset()).unwrap();
        let mut updater = FrameUpdater::new();

        point_at(&mut ctx, MODEL_CENTER_NUDGED);
        assert_eq!(updater.update_hover(&mut ctx), Some(true));
        assert_eq!(model_scale(&ctx), Vec3::splat(0.5) * HOVER_SCALE);

        let viewport = ctx.viewport;
        ctx.input.pointer_moved(WIDTH, HEIGHT, &viewport);
        assert_eq!(updater.update_hover(&mut ctx), Some(false));
        assert_eq!(model_scale(&ctx), Vec3::splat(0.5));
    }
}

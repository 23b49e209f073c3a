use glam::Vec3;
use hover_scene::animation::{AnimationClip, Channel, ChannelValues, Interpolation, Locomotion};
use hover_scene::config::{SceneConfig, Variant};
use hover_scene::context::SceneContext;
use hover_scene::debug_panel::DebugPanel;
use hover_scene::input::Viewport;
use hover_scene::loaders::ModelAsset;
use hover_scene::scene::{NodeId, Node, SceneGraph};

/// A one-bone rig with gaze, walk and run clips. Each clip slides the bone
/// along its own axis over one second.
fn rigged_asset() -> ModelAsset {
    let mut graph = SceneGraph::new();
    let root = graph.root();
    let bone = graph.add(root, Node::group().named("Bone"));

    let slide = |name: &str, target: NodeId, to: Vec3| {
        AnimationClip::new(
            name,
            vec![Channel {
                target,
                interpolation: Interpolation::Linear,
                times: vec![0.0, 1.0],
                values: ChannelValues::Translation(vec![Vec3::ZERO, to]),
            }],
        )
    };

    ModelAsset {
        clips: vec![
            slide("Survey", bone, Vec3::Y),
            slide("Walk", bone, Vec3::X),
            slide("Run", bone, Vec3::Z),
        ],
        graph,
    }
}

fn animated_context() -> SceneContext {
    let config = SceneConfig::preset(Variant::Animated);
    let mut ctx = SceneContext::new(&config, Viewport::new(800.0, 600.0, 1.0)).unwrap();
    ctx.set_model(rigged_asset()).expect("model accepted");
    ctx
}

fn bone_translation(ctx: &SceneContext) -> Vec3 {
    let bone = ctx.graph.find_by_name("Bone").expect("bone merged");
    ctx.graph.node(bone).transform.translation
}

#[cfg(test)]
mod locomotion_tests {
    use super::*;

    #[test]
    fn test_initial_action_is_gaze() {
        let ctx = animated_context();
        let mixer = ctx.mixer.as_ref().expect("clips create a mixer");
        assert_eq!(mixer.playing(), vec![Locomotion::Gaze.clip_index()]);
    }

    #[test]
    fn test_walk_stops_gaze_and_run() {
        let mut ctx = animated_context();
        let mixer = ctx.mixer.as_mut().unwrap();

        assert!(mixer.activate(Locomotion::Run));
        assert!(mixer.activate(Locomotion::Walk));

        assert_eq!(mixer.playing(), vec![1]);
        assert!(!mixer.action_for(Locomotion::Gaze).unwrap().is_playing());
        assert!(!mixer.action_for(Locomotion::Run).unwrap().is_playing());
    }

    #[test]
    fn test_at_most_one_action_plays() {
        let mut ctx = animated_context();
        let panel = DebugPanel::for_config(&SceneConfig::preset(Variant::Animated));

        for kind in [Locomotion::Walk, Locomotion::Gaze, Locomotion::Run, Locomotion::Run] {
            assert!(panel.trigger(&mut ctx, kind));
            let playing = ctx.mixer.as_ref().unwrap().playing();
            assert_eq!(playing, vec![kind.clip_index()]);
        }
    }

    #[test]
    fn test_mixer_poses_merged_bone() {
        let mut ctx = animated_context();
        let mixer = ctx.mixer.as_mut().unwrap();
        mixer.activate(Locomotion::Walk);
        mixer.update(0.5, &mut ctx.graph);

        let translation = bone_translation(&ctx);
        assert!((translation - Vec3::new(0.5, 0.0, 0.0)).length() < 1e-5);
    }

    #[test]
    fn test_switching_rewinds_previous_action() {
        let mut ctx = animated_context();
        let mixer = ctx.mixer.as_mut().unwrap();
        mixer.update(0.25, &mut ctx.graph);
        assert!(mixer.action_for(Locomotion::Gaze).unwrap().time > 0.0);

        mixer.activate(Locomotion::Run);
        assert_eq!(mixer.action_for(Locomotion::Gaze).unwrap().time, 0.0);
    }

    #[test]
    fn test_trigger_without_model_is_ignored() {
        let config = SceneConfig::preset(Variant::Animated);
        let mut ctx = SceneContext::new(&config, Viewport::new(800.0, 600.0, 1.0)).unwrap();
        let panel = DebugPanel::for_config(&config);

        assert!(!panel.trigger(&mut ctx, Locomotion::Walk));
        assert!(ctx.mixer.is_none());
    }
}

use serde::{Deserialize, Serialize};

use crate::scene::SceneGraph;

use super::AnimationClip;

/// Named locomotion actions of the animated model, in clip order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Locomotion {
    Gaze,
    Walk,
    Run,
}

impl Locomotion {
    pub const ALL: [Locomotion; 3] = [Locomotion::Gaze, Locomotion::Walk, Locomotion::Run];

    pub fn clip_index(self) -> usize {
        match self {
            Locomotion::Gaze => 0,
            Locomotion::Walk => 1,
            Locomotion::Run => 2,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Locomotion::Gaze => "gaze",
            Locomotion::Walk => "walk",
            Locomotion::Run => "run",
        }
    }
}

/// Playback state of one clip
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AnimationAction {
    pub time: f32,
    pub time_scale: f32,
    playing: bool,
}

impl AnimationAction {
    fn new() -> Self {
        Self {
            time: 0.0,
            time_scale: 1.0,
            playing: false,
        }
    }

    pub fn is_playing(&self) -> bool {
        self.playing
    }

    pub fn play(&mut self) {
        self.playing = true;
    }

    /// Stops and rewinds
    pub fn stop(&mut self) {
        self.playing = false;
        self.time = 0.0;
    }
}

/// Owns the model's clips and one action per clip
#[derive(Debug, Clone, Default)]
pub struct AnimationMixer {
    clips: Vec<AnimationClip>,
    actions: Vec<AnimationAction>,
}

impl AnimationMixer {
    pub fn new(clips: Vec<AnimationClip>) -> Self {
        let actions = vec![AnimationAction::new(); clips.len()];
        Self { clips, actions }
    }

    pub fn clips(&self) -> &[AnimationClip] {
        &self.clips
    }

    pub fn action(&self, index: usize) -> Option<&AnimationAction> {
        self.actions.get(index)
    }

    pub fn action_for(&self, kind: Locomotion) -> Option<&AnimationAction> {
        self.action(kind.clip_index())
    }

    /// Indices of the actions currently playing
    pub fn playing(&self) -> Vec<usize> {
        self.actions
            .iter()
            .enumerate()
            .filter(|(_, a)| a.playing)
            .map(|(i, _)| i)
            .collect()
    }

    /// Stops every other locomotion action and plays `kind`. Returns false
    /// when the model has no clip for it, in which case nothing changes.
    pub fn activate(&mut self, kind: Locomotion) -> bool {
        let index = kind.clip_index();
        if index >= self.actions.len() {
            log::warn!("no clip for {} action (model has {})", kind.label(), self.clips.len());
            return false;
        }

        for other in Locomotion::ALL {
            if other != kind {
                if let Some(action) = self.actions.get_mut(other.clip_index()) {
                    action.stop();
                }
            }
        }
        self.actions[index].play();
        log::debug!("activated {} ({})", kind.label(), self.clips[index].name);
        true
    }

    /// Advances playing actions by `delta` seconds, looping over each clip's
    /// duration, and poses the graph.
    pub fn update(&mut self, delta: f32, graph: &mut SceneGraph) {
        for (clip, action) in self.clips.iter().zip(self.actions.iter_mut()) {
            if !action.playing {
                continue;
            }
            action.time += delta * action.time_scale;
            if clip.duration > 0.0 {
                action.time = action.time.rem_euclid(clip.duration);
            } else {
                action.time = 0.0;
            }
            clip.apply(action.time, graph);
        }
    }
}

//! Keyframe animation clips and the mixer that plays them onto the scene graph.

mod clip;
mod mixer;

pub use clip::{AnimationClip, Channel, ChannelValues, Interpolation};
pub use mixer::{AnimationAction, AnimationMixer, Locomotion};

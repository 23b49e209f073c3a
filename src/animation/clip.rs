use std::ops::{Add, Mul};

use glam::{Quat, Vec3};

use crate::scene::{NodeId, Offsets, SceneGraph, Transform};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Interpolation {
    Linear,
    Step,
    /// Hermite spline; values are stored as (in-tangent, value, out-tangent)
    /// triplets per keyframe
    CubicSpline,
}

#[derive(Debug, Clone, PartialEq)]
pub enum ChannelValues {
    Translation(Vec<Vec3>),
    Rotation(Vec<Quat>),
    Scale(Vec<Vec3>),
}

/// Keyframes driving one transform property of one node
#[derive(Debug, Clone, PartialEq)]
pub struct Channel {
    pub target: NodeId,
    pub interpolation: Interpolation,
    pub times: Vec<f32>,
    pub values: ChannelValues,
}

impl Channel {
    pub fn duration(&self) -> f32 {
        self.times.last().copied().unwrap_or(0.0)
    }

    /// Writes the sampled value at time `t` into `transform`
    pub fn apply(&self, t: f32, transform: &mut Transform) {
        match &self.values {
            ChannelValues::Translation(values) => {
                if let Some(v) = self.sample(values, t, Vec3::lerp) {
                    transform.translation = v;
                }
            }
            ChannelValues::Scale(values) => {
                if let Some(v) = self.sample(values, t, Vec3::lerp) {
                    transform.scale = v;
                }
            }
            ChannelValues::Rotation(values) => {
                if let Some(q) = self.sample(values, t, Quat::slerp) {
                    transform.rotation = q.normalize();
                }
            }
        }
    }

    fn sample<T>(&self, values: &[T], t: f32, lerp: fn(T, T, f32) -> T) -> Option<T>
    where
        T: Copy + Add<Output = T> + Mul<f32, Output = T>,
    {
        let count = self.times.len();
        let stride = if self.interpolation == Interpolation::CubicSpline {
            3
        } else {
            1
        };
        if count == 0 || values.len() < count * stride {
            return None;
        }

        let value = |k: usize| values[k * stride + stride / 2];

        if t <= self.times[0] {
            return Some(value(0));
        }
        if t >= self.times[count - 1] {
            return Some(value(count - 1));
        }

        // times[k] <= t < times[k + 1]
        let k = self.times.partition_point(|&time| time <= t) - 1;
        let (t0, t1) = (self.times[k], self.times[k + 1]);
        let dt = t1 - t0;
        let s = if dt > 0.0 { (t - t0) / dt } else { 0.0 };

        Some(match self.interpolation {
            Interpolation::Step => value(k),
            Interpolation::Linear => lerp(value(k), value(k + 1), s),
            Interpolation::CubicSpline => {
                let out_tangent = values[k * 3 + 2];
                let in_tangent = values[(k + 1) * 3];
                let (s2, s3) = (s * s, s * s * s);
                value(k) * (2.0 * s3 - 3.0 * s2 + 1.0)
                    + out_tangent * ((s3 - 2.0 * s2 + s) * dt)
                    + value(k + 1) * (-2.0 * s3 + 3.0 * s2)
                    + in_tangent * ((s3 - s2) * dt)
            }
        })
    }

    pub(crate) fn shift(&mut self, offsets: &Offsets) {
        self.target = self.target.shifted(offsets.node);
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct AnimationClip {
    pub name: String,
    pub duration: f32,
    pub channels: Vec<Channel>,
}

impl AnimationClip {
    /// Duration is the latest keyframe time over all channels
    pub fn new(name: impl Into<String>, channels: Vec<Channel>) -> Self {
        let duration = channels.iter().map(Channel::duration).fold(0.0, f32::max);
        Self {
            name: name.into(),
            duration,
            channels,
        }
    }

    /// Poses the targeted nodes at clip time `t`. Channels whose target is not
    /// in the graph are skipped.
    pub fn apply(&self, t: f32, graph: &mut SceneGraph) {
        for channel in &self.channels {
            if channel.target.index() < graph.len() {
                channel.apply(t, &mut graph.node_mut(channel.target).transform);
            }
        }
    }

    /// Rebases channel targets after the owning model was merged into a graph
    pub fn shift(&mut self, offsets: &Offsets) {
        for channel in &mut self.channels {
            channel.shift(offsets);
        }
    }
}

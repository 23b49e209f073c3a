//! Debug panel: sliders bound to scene fields and, for animated models, one
//! button per locomotion action.

use std::f32::consts::PI;

use crate::animation::Locomotion;
use crate::config::{SceneConfig, Variant};
use crate::context::SceneContext;
use crate::scene::{update_all_materials, NodeKind};

/// Scene field a slider reads and writes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SliderBinding {
    AmbientIntensity,
    DirectionalIntensity,
    DirectionalX,
    DirectionalY,
    DirectionalZ,
    ModelRotationY,
    EnvMapIntensity,
}

impl SliderBinding {
    pub fn get(self, ctx: &SceneContext) -> f32 {
        let light = |id| match ctx.graph.get(id).map(|n| &n.kind) {
            Some(NodeKind::Light(light)) => light.intensity,
            _ => 0.0,
        };
        let position = ctx.graph.node(ctx.directional_light).transform.translation;

        match self {
            SliderBinding::AmbientIntensity => light(ctx.ambient_light),
            SliderBinding::DirectionalIntensity => light(ctx.directional_light),
            SliderBinding::DirectionalX => position.x,
            SliderBinding::DirectionalY => position.y,
            SliderBinding::DirectionalZ => position.z,
            SliderBinding::ModelRotationY => ctx.model_rotation_y,
            SliderBinding::EnvMapIntensity => ctx.env_map_intensity,
        }
    }

    fn write(self, ctx: &mut SceneContext, value: f32) {
        let directional = ctx.directional_light;
        match self {
            SliderBinding::AmbientIntensity => {
                if let Some(light) = ctx.graph.light_mut(ctx.ambient_light) {
                    light.intensity = value;
                }
            }
            SliderBinding::DirectionalIntensity => {
                if let Some(light) = ctx.graph.light_mut(directional) {
                    light.intensity = value;
                }
            }
            SliderBinding::DirectionalX => ctx.graph.node_mut(directional).transform.translation.x = value,
            SliderBinding::DirectionalY => ctx.graph.node_mut(directional).transform.translation.y = value,
            SliderBinding::DirectionalZ => ctx.graph.node_mut(directional).transform.translation.z = value,
            SliderBinding::ModelRotationY => ctx.set_model_rotation_y(value),
            SliderBinding::EnvMapIntensity => ctx.env_map_intensity = value,
        }
    }
}

/// Runs synchronously after a slider writes its field
pub type ChangeHook = fn(&mut SceneContext, f32);

#[derive(Clone, Copy)]
pub struct Slider {
    pub label: &'static str,
    pub binding: SliderBinding,
    pub min: f32,
    pub max: f32,
    pub step: f32,
    pub on_change: Option<ChangeHook>,
}

impl Slider {
    pub fn new(label: &'static str, binding: SliderBinding, min: f32, max: f32, step: f32) -> Self {
        Self {
            label,
            binding,
            min,
            max,
            step,
            on_change: None,
        }
    }

    pub fn on_change(mut self, hook: ChangeHook) -> Self {
        self.on_change = Some(hook);
        self
    }

    pub fn clamp(&self, value: f32) -> f32 {
        value.clamp(self.min, self.max)
    }
}

/// Pushes the env-map intensity into every material that takes one
pub fn apply_env_map_intensity(ctx: &mut SceneContext, intensity: f32) {
    let touched = update_all_materials(&mut ctx.graph, intensity);
    log::debug!("env-map intensity {:.3} applied to {} materials", intensity, touched);
}

pub struct DebugPanel {
    sliders: Vec<Slider>,
    actions: Vec<Locomotion>,
    visible: bool,
}

impl DebugPanel {
    pub fn new(sliders: Vec<Slider>, actions: Vec<Locomotion>, visible: bool) -> Self {
        Self {
            sliders,
            actions,
            visible,
        }
    }

    /// Sliders and buttons for the config's variant
    pub fn for_config(config: &SceneConfig) -> Self {
        let mut sliders = vec![
            Slider::new("ambient intensity", SliderBinding::AmbientIntensity, 0.0, 10.0, 0.001),
            Slider::new("light intensity", SliderBinding::DirectionalIntensity, 0.0, 10.0, 0.001),
            Slider::new("light x", SliderBinding::DirectionalX, -5.0, 5.0, 0.001),
            Slider::new("light y", SliderBinding::DirectionalY, -5.0, 5.0, 0.001),
            Slider::new("light z", SliderBinding::DirectionalZ, -5.0, 5.0, 0.001),
            Slider::new("rotation", SliderBinding::ModelRotationY, -PI, PI, 0.001),
        ];
        if config.skybox.is_some() {
            sliders.push(
                Slider::new("envMapIntensity", SliderBinding::EnvMapIntensity, 0.0, 10.0, 0.001)
                    .on_change(apply_env_map_intensity),
            );
        }

        let actions = match config.variant {
            Variant::Animated => Locomotion::ALL.to_vec(),
            _ => Vec::new(),
        };

        Self::new(sliders, actions, config.show_debug)
    }

    pub fn sliders(&self) -> &[Slider] {
        &self.sliders
    }

    pub fn actions(&self) -> &[Locomotion] {
        &self.actions
    }

    pub fn is_visible(&self) -> bool {
        self.visible
    }

    pub fn toggle(&mut self) {
        self.visible = !self.visible;
    }

    pub fn find(&self, binding: SliderBinding) -> Option<usize> {
        self.sliders.iter().position(|s| s.binding == binding)
    }

    /// Clamps, writes the bound field, then runs the change hook. Returns the
    /// value written, or `None` for an unknown slider.
    pub fn set(&self, ctx: &mut SceneContext, index: usize, value: f32) -> Option<f32> {
        let slider = self.sliders.get(index)?;
        let value = slider.clamp(value);
        slider.binding.write(ctx, value);
        if let Some(hook) = slider.on_change {
            hook(ctx, value);
        }
        Some(value)
    }

    pub fn set_binding(&self, ctx: &mut SceneContext, binding: SliderBinding, value: f32) -> Option<f32> {
        self.set(ctx, self.find(binding)?, value)
    }

    /// Plays `kind`, stopping the other locomotion actions
    pub fn trigger(&self, ctx: &mut SceneContext, kind: Locomotion) -> bool {
        match &mut ctx.mixer {
            Some(mixer) => mixer.activate(kind),
            None => {
                log::warn!("No animation loaded for {}", kind.label());
                false
            }
        }
    }

    pub fn show(&self, egui_ctx: &egui::Context, scene: &mut SceneContext) {
        if !self.visible {
            return;
        }

        egui::Window::new("Debug")
            .title_bar(true)
            .resizable(false)
            .default_pos(egui::pos2(scene.viewport.width - 300.0, 10.0))
            .default_width(280.0)
            .show(egui_ctx, |ui| {
                for (index, slider) in self.sliders.iter().enumerate() {
                    let mut value = slider.binding.get(scene);
                    let response = ui.add(
                        egui::Slider::new(&mut value, slider.min..=slider.max)
                            .step_by(slider.step as f64)
                            .text(slider.label),
                    );
                    if response.changed() {
                        self.set(scene, index, value);
                    }
                }

                if !self.actions.is_empty() {
                    ui.add_space(5.0);
                    ui.separator();
                    ui.horizontal(|ui| {
                        for &kind in &self.actions {
                            if ui.button(kind.label()).clicked() {
                                self.trigger(scene, kind);
                            }
                        }
                    });
                }
            });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::input::Viewport;

    fn scene(variant: Variant) -> (SceneConfig, SceneContext) {
        let config = SceneConfig::preset(variant);
        let ctx = SceneContext::new(&config, Viewport::default()).unwrap();
        (config, ctx)
    }

    #[test]
    fn hover_panel_is_hidden_without_env_slider() {
        let (config, _) = scene(Variant::Hover);
        let panel = DebugPanel::for_config(&config);
        assert!(!panel.is_visible());
        assert!(panel.find(SliderBinding::EnvMapIntensity).is_none());
        assert!(panel.actions().is_empty());
    }

    #[test]
    fn set_clamps_and_writes() {
        let (config, mut ctx) = scene(Variant::Hover);
        let panel = DebugPanel::for_config(&config);

        let written = panel.set_binding(&mut ctx, SliderBinding::DirectionalX, 12.0);
        assert_eq!(written, Some(5.0));
        assert_eq!(SliderBinding::DirectionalX.get(&ctx), 5.0);

        panel.set_binding(&mut ctx, SliderBinding::AmbientIntensity, 0.55);
        assert_eq!(SliderBinding::AmbientIntensity.get(&ctx), 0.55);
    }

    #[test]
    fn env_slider_runs_hook() {
        let (config, mut ctx) = scene(Variant::Environment);
        let panel = DebugPanel::for_config(&config);
        ctx.graph.add_material(crate::scene::Material::standard([1.0; 4]));

        panel.set_binding(&mut ctx, SliderBinding::EnvMapIntensity, 4.0);
        assert_eq!(ctx.env_map_intensity, 4.0);
        assert!(ctx.graph.materials.iter().all(|m| m.env_map_intensity == 4.0));
    }

    #[test]
    fn trigger_without_mixer_is_noop() {
        let (config, mut ctx) = scene(Variant::Animated);
        let panel = DebugPanel::for_config(&config);
        assert_eq!(panel.actions().len(), 3);
        assert!(!panel.trigger(&mut ctx, Locomotion::Walk));
    }

    #[test]
    fn toggle_flips_visibility() {
        let (config, _) = scene(Variant::Hover);
        let mut panel = DebugPanel::for_config(&config);
        panel.toggle();
        assert!(panel.is_visible());
    }
}

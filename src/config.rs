//! Scene presets per variant, optionally overridden by a JSON file.
//!
//! A config file only needs the fields it changes:
//!
//! ```json
//! { "model": "models/Duck/glTF/Duck.gltf", "ambient": { "intensity": 0.5 } }
//! ```

use std::path::{Path, PathBuf};

use glam::Vec3;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::animation::Locomotion;
use crate::error::ConfigError;
use crate::math::{parse_hex_color, srgb_to_linear};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum Variant {
    /// Duck that grows under the pointer
    #[default]
    Hover,
    /// Helmet lit by a skybox environment
    Environment,
    /// Fox with gaze, walk and run clips
    Animated,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LightConfig {
    /// `#rrggbb`, sRGB
    pub color: String,
    pub intensity: f32,
    pub position: [f32; 3],
}

impl LightConfig {
    fn white(intensity: f32, position: [f32; 3]) -> Self {
        Self {
            color: "#ffffff".to_owned(),
            intensity,
            position,
        }
    }

    /// Linear RGB
    pub fn linear_color(&self) -> Result<[f32; 3], ConfigError> {
        linear_color(&self.color)
    }
}

impl Default for LightConfig {
    fn default() -> Self {
        Self::white(1.0, [0.0, 0.0, 0.0])
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ModelPlacement {
    pub position: [f32; 3],
    pub scale: f32,
    pub rotation_y: f32,
}

impl Default for ModelPlacement {
    fn default() -> Self {
        Self {
            position: [0.0; 3],
            scale: 1.0,
            rotation_y: 0.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FloorConfig {
    pub size: f32,
    pub color: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SceneConfig {
    pub variant: Variant,
    pub model: PathBuf,
    pub placement: ModelPlacement,
    pub ambient: LightConfig,
    pub directional: LightConfig,
    pub camera_position: [f32; 3],
    pub camera_target: [f32; 3],
    pub fov: f32,
    pub damping: bool,
    /// Directory holding px/nx/py/ny/pz/nz images
    pub skybox: Option<PathBuf>,
    pub skybox_extension: String,
    pub env_map_intensity: f32,
    pub floor: Option<FloorConfig>,
    pub initial_action: Option<Locomotion>,
    pub show_debug: bool,
}

impl Default for SceneConfig {
    fn default() -> Self {
        Self::preset(Variant::Hover)
    }
}

impl SceneConfig {
    pub fn preset(variant: Variant) -> Self {
        let hover = Self {
            variant,
            model: PathBuf::from("models/Duck/glTF-Binary/Duck.glb"),
            placement: ModelPlacement {
                position: [0.0, -1.2, 0.0],
                ..Default::default()
            },
            ambient: LightConfig::white(0.3, [0.0; 3]),
            directional: LightConfig::white(0.7, [1.0, 2.0, 3.0]),
            camera_position: [0.0, 0.0, 3.0],
            camera_target: [0.0; 3],
            fov: 75.0,
            damping: true,
            skybox: None,
            skybox_extension: "jpg".to_owned(),
            env_map_intensity: 1.0,
            floor: None,
            initial_action: None,
            show_debug: false,
        };

        match variant {
            Variant::Hover => hover,
            Variant::Environment => Self {
                model: PathBuf::from("models/FlightHelmet/glTF/FlightHelmet.gltf"),
                placement: ModelPlacement {
                    position: [0.0, -4.0, 0.0],
                    scale: 10.0,
                    rotation_y: std::f32::consts::FRAC_PI_2,
                },
                ambient: LightConfig::white(0.0, [0.0; 3]),
                directional: LightConfig::white(3.0, [0.25, 3.0, -2.25]),
                camera_position: [4.0, 1.0, -4.0],
                skybox: Some(PathBuf::from("textures/environmentMaps/0")),
                env_map_intensity: 2.5,
                show_debug: true,
                ..hover
            },
            Variant::Animated => Self {
                model: PathBuf::from("models/Fox/glTF/Fox.gltf"),
                placement: ModelPlacement {
                    scale: 0.025,
                    ..Default::default()
                },
                ambient: LightConfig::white(0.8, [0.0; 3]),
                directional: LightConfig::white(0.6, [5.0, 5.0, 5.0]),
                camera_position: [2.0, 2.0, 2.0],
                camera_target: [0.0, 0.75, 0.0],
                floor: Some(FloorConfig {
                    size: 10.0,
                    color: "#444444".to_owned(),
                }),
                initial_action: Some(Locomotion::Gaze),
                show_debug: true,
                ..hover
            },
        }
    }

    /// Applies the JSON file at `path` on top of `self`. Fields missing from
    /// the file keep their current value.
    pub fn merge_file(self, path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        self.merge_json(&text).map_err(|source| ConfigError::Json {
            path: path.to_path_buf(),
            source,
        })
    }

    pub fn merge_json(self, text: &str) -> Result<Self, serde_json::Error> {
        let overrides: Value = serde_json::from_str(text)?;
        let mut base = serde_json::to_value(self)?;
        merge_values(&mut base, overrides);
        serde_json::from_value(base)
    }

    pub fn camera_position(&self) -> Vec3 {
        Vec3::from_array(self.camera_position)
    }

    pub fn camera_target(&self) -> Vec3 {
        Vec3::from_array(self.camera_target)
    }

    /// Fails on the first colour that is not valid hex
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.ambient.linear_color()?;
        self.directional.linear_color()?;
        if let Some(floor) = &self.floor {
            linear_color(&floor.color)?;
        }
        Ok(())
    }
}

pub fn linear_color(hex: &str) -> Result<[f32; 3], ConfigError> {
    parse_hex_color(hex)
        .map(|c| c.map(srgb_to_linear))
        .ok_or_else(|| ConfigError::Color(hex.to_owned()))
}

fn merge_values(base: &mut Value, overrides: Value) {
    match (base, overrides) {
        (Value::Object(base), Value::Object(overrides)) => {
            for (key, value) in overrides {
                match base.get_mut(&key) {
                    Some(slot) => merge_values(slot, value),
                    None => {
                        base.insert(key, value);
                    }
                }
            }
        }
        (slot, value) => *slot = value,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hover_preset_matches_duck_scene() {
        let config = SceneConfig::preset(Variant::Hover);
        assert_eq!(config.placement.position, [0.0, -1.2, 0.0]);
        assert_eq!(config.ambient.intensity, 0.3);
        assert_eq!(config.directional.position, [1.0, 2.0, 3.0]);
        assert!(!config.show_debug);
        assert!(config.skybox.is_none());
    }

    #[test]
    fn json_overrides_only_named_fields() {
        let config = SceneConfig::preset(Variant::Hover)
            .merge_json(r#"{ "ambient": { "intensity": 0.9 }, "show_debug": true }"#)
            .unwrap();
        assert_eq!(config.ambient.intensity, 0.9);
        assert_eq!(config.ambient.color, "#ffffff");
        assert!(config.show_debug);
        assert_eq!(config.directional.intensity, 0.7);
    }

    #[test]
    fn json_can_select_action_and_clear_skybox() {
        let config = SceneConfig::preset(Variant::Environment)
            .merge_json(r#"{ "skybox": null, "initial_action": "Run" }"#)
            .unwrap();
        assert!(config.skybox.is_none());
        assert_eq!(config.initial_action, Some(Locomotion::Run));
    }

    #[test]
    fn bad_json_is_an_error() {
        assert!(SceneConfig::default().merge_json("{ nope").is_err());
        assert!(SceneConfig::default().merge_json(r#"{ "fov": "wide" }"#).is_err());
    }

    #[test]
    fn colours_are_validated() {
        let mut config = SceneConfig::preset(Variant::Animated);
        assert!(config.validate().is_ok());
        config.directional.color = "white".to_owned();
        assert!(matches!(config.validate(), Err(ConfigError::Color(_))));
    }

    #[test]
    fn missing_file_reports_path() {
        let err = SceneConfig::default().merge_file("nowhere/scene.json").unwrap_err();
        assert!(err.to_string().contains("nowhere"));
    }
}

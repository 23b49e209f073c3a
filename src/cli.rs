// cli.rs - Command-line interface configuration
use clap::Parser;
use std::path::PathBuf;

use crate::config::{SceneConfig, Variant};
use crate::error::ConfigError;

#[derive(Parser, Debug, Clone)]
#[command(name = "hover-scene")]
#[command(about = "glTF model viewer with pointer hover picking", long_about = None)]
pub struct Cli {
    /// Scene preset to start from
    #[arg(long, value_enum, default_value_t = Variant::Hover)]
    pub variant: Variant,

    /// Model file (.gltf or .glb), replaces the preset's model
    #[arg(long)]
    pub model: Option<PathBuf>,

    /// Directory with px/nx/py/ny/pz/nz skybox images
    #[arg(long)]
    pub skybox: Option<PathBuf>,

    /// JSON file overriding preset fields
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Show the debug panel on startup
    #[arg(long, default_value = "false")]
    pub debug: bool,

    /// Disable UI elements and console output
    #[arg(long = "no-ui", default_value = "false")]
    pub no_ui: bool,
}

impl Cli {
    /// Preset, then config file, then command-line flags
    pub fn scene_config(&self) -> Result<SceneConfig, ConfigError> {
        let mut config = SceneConfig::preset(self.variant);
        if let Some(path) = &self.config {
            config = config.merge_file(path)?;
        }
        if let Some(model) = &self.model {
            config.model = model.clone();
        }
        if let Some(skybox) = &self.skybox {
            config.skybox = Some(skybox.clone());
        }
        if self.debug {
            config.show_debug = true;
        }
        config.validate()?;
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_to_hover_preset() {
        let cli = Cli::parse_from(["hover-scene"]);
        let config = cli.scene_config().unwrap();
        assert_eq!(config, SceneConfig::preset(Variant::Hover));
    }

    #[test]
    fn flags_override_preset() {
        let cli = Cli::parse_from([
            "hover-scene",
            "--variant",
            "animated",
            "--model",
            "other.glb",
            "--debug",
        ]);
        let config = cli.scene_config().unwrap();
        assert_eq!(config.variant, Variant::Animated);
        assert_eq!(config.model, PathBuf::from("other.glb"));
        assert!(config.show_debug);
        assert!(config.floor.is_some());
    }
}

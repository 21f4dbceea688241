//! JSON configuration.
//!
//! Every section falls back to its defaults, so a config file only needs
//! the values it changes:
//!
//! ```json
//! {
//!   "scene": { "light_count": 600 },
//!   "memory": { "model": "gemini-2.5-pro" }
//! }
//! ```

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

use crate::error::ConfigError;
use crate::layout::TreeShape;
use crate::memory::MemoryConfig;
use crate::morph::MorphConfig;

/// Full application configuration.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct WishtreeConfig {
    #[serde(default)]
    pub scene: SceneConfig,
    #[serde(default)]
    pub morph: MorphConfig,
    #[serde(default)]
    pub memory: MemoryConfig,
    #[serde(default)]
    pub photos: PhotosConfig,
}

impl WishtreeConfig {
    /// Save configuration as pretty-printed JSON.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<(), ConfigError> {
        let json = serde_json::to_string_pretty(self)?;
        fs::write(path, json)?;
        Ok(())
    }

    /// Load a configuration from a JSON file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let json = fs::read_to_string(path)?;
        Self::from_json(&json)
    }

    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        Ok(serde_json::from_str(json)?)
    }
}

fn default_box_count() -> u32 {
    450
}

fn default_ball_count() -> u32 {
    650
}

fn default_light_count() -> u32 {
    400
}

fn default_chaos_radius() -> f32 {
    9.0
}

fn default_photo_offset() -> f32 {
    0.35
}

fn default_particle_size() -> f32 {
    0.12
}

fn default_seed() -> u64 {
    2512
}

/// Structural particles and tree geometry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SceneConfig {
    #[serde(default = "default_box_count")]
    pub box_count: u32,
    #[serde(default = "default_ball_count")]
    pub ball_count: u32,
    #[serde(default = "default_light_count")]
    pub light_count: u32,
    #[serde(default)]
    pub tree: TreeShape,
    /// Radius of the ball particles scatter into.
    #[serde(default = "default_chaos_radius")]
    pub chaos_radius: f32,
    /// How far photos hang outside the cone surface.
    #[serde(default = "default_photo_offset")]
    pub photo_offset: f32,
    /// Base size of a structural particle.
    #[serde(default = "default_particle_size")]
    pub particle_size: f32,
    #[serde(default = "default_seed")]
    pub seed: u64,
}

impl SceneConfig {
    pub fn structural_count(&self) -> u32 {
        self.box_count + self.ball_count + self.light_count
    }
}

impl Default for SceneConfig {
    fn default() -> Self {
        Self {
            box_count: default_box_count(),
            ball_count: default_ball_count(),
            light_count: default_light_count(),
            tree: TreeShape::default(),
            chaos_radius: default_chaos_radius(),
            photo_offset: default_photo_offset(),
            particle_size: default_particle_size(),
            seed: default_seed(),
        }
    }
}

fn default_builtin() -> Vec<String> {
    (1..=12)
        .map(|i| format!("https://picsum.photos/seed/wishtree-{i}/512/512"))
        .collect()
}

/// Built-in photo ornaments.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PhotosConfig {
    /// Image URLs hung on the tree at start-up.
    #[serde(default = "default_builtin")]
    pub builtin: Vec<String>,
}

impl Default for PhotosConfig {
    fn default() -> Self {
        Self {
            builtin: default_builtin(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_json_fills_defaults() {
        let config = WishtreeConfig::from_json(
            r#"{ "scene": { "light_count": 7, "tree": { "height": 9.0 } }, "photos": { "builtin": [] } }"#,
        )
        .unwrap();
        assert_eq!(config.scene.light_count, 7);
        assert_eq!(config.scene.box_count, default_box_count());
        assert_eq!(config.scene.tree.height, 9.0);
        assert_eq!(config.scene.tree.radius, TreeShape::default().radius);
        assert!(config.photos.builtin.is_empty());
        assert_eq!(config.morph, MorphConfig::default());
        assert_eq!(config.memory, MemoryConfig::default());
    }

    #[test]
    fn test_empty_object_is_default() {
        assert_eq!(WishtreeConfig::from_json("{}").unwrap(), WishtreeConfig::default());
    }

    #[test]
    fn test_save_load_round_trip() {
        let mut config = WishtreeConfig::default();
        config.scene.seed = 99;
        config.memory.fallback = "Merry Christmas".into();

        let path = std::env::temp_dir().join(format!("wishtree-config-{}.json", std::process::id()));
        config.save(&path).unwrap();
        let loaded = WishtreeConfig::load(&path).unwrap();
        std::fs::remove_file(&path).ok();

        assert_eq!(loaded, config);
    }

    #[test]
    fn test_invalid_json() {
        assert!(matches!(
            WishtreeConfig::from_json("{ scene: 1 }"),
            Err(ConfigError::Json(_))
        ));
        assert!(matches!(
            WishtreeConfig::load("/nonexistent/wishtree.json"),
            Err(ConfigError::Io(_))
        ));
    }
}

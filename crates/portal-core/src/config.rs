//! Scene configuration loading and validation

use serde::{Deserialize, Serialize};
use std::path::Path;
use thiserror::Error;
use tracing::info;

use crate::color::Rgb;
use crate::params::{ParamError, FIREFLY_SIZE_RANGE, FOG_DENSITY_RANGE};
use crate::particles::FireflyConfig;
use crate::postprocess::PostProcessing;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read config: {0}")]
    Io(#[from] std::io::Error),
    #[error("Failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("Failed to serialize config: {0}")]
    Serialize(#[from] toml::ser::Error),
    #[error("Invalid config: {0}")]
    Invalid(#[from] ParamError),
}

/// Main configuration structure
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PortalConfig {
    #[serde(default)]
    pub scene: SceneConfig,
    #[serde(default)]
    pub renderer: RendererConfig,
    #[serde(default)]
    pub pole_light: PoleLightConfig,
    #[serde(default)]
    pub portal: PortalEmissionConfig,
    #[serde(default)]
    pub fireflies: FireflyConfig,
    #[serde(default)]
    pub camera: CameraConfig,
    #[serde(default)]
    pub assets: AssetsConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SceneConfig {
    #[serde(default = "default_background")]
    pub fog_color: Rgb,
    #[serde(default = "default_fog_density")]
    pub fog_density: f32,
}

impl Default for SceneConfig {
    fn default() -> Self {
        Self {
            fog_color: default_background(),
            fog_density: default_fog_density(),
        }
    }
}

fn default_background() -> Rgb {
    Rgb::from_u8(0x00, 0x11, 0x15)
}

fn default_fog_density() -> f32 {
    0.05
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RendererConfig {
    #[serde(default = "default_background")]
    pub clear_color: Rgb,
    /// Multisample anti-aliasing
    #[serde(default = "default_true")]
    pub antialias: bool,
    #[serde(default)]
    pub post: PostProcessing,
}

impl Default for RendererConfig {
    fn default() -> Self {
        Self {
            clear_color: default_background(),
            antialias: true,
            post: PostProcessing::default(),
        }
    }
}

fn default_true() -> bool {
    true
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PoleLightConfig {
    #[serde(default = "default_pole_light_color")]
    pub color: Rgb,
}

impl Default for PoleLightConfig {
    fn default() -> Self {
        Self {
            color: default_pole_light_color(),
        }
    }
}

fn default_pole_light_color() -> Rgb {
    Rgb::from_u8(0xff, 0xff, 0xe5)
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PortalEmissionConfig {
    #[serde(default = "default_color_start")]
    pub color_start: Rgb,
    #[serde(default = "default_color_end")]
    pub color_end: Rgb,
}

impl Default for PortalEmissionConfig {
    fn default() -> Self {
        Self {
            color_start: default_color_start(),
            color_end: default_color_end(),
        }
    }
}

fn default_color_start() -> Rgb {
    Rgb::from_u8(0x6a, 0x79, 0xff)
}

fn default_color_end() -> Rgb {
    Rgb::from_u8(0xdd, 0xe0, 0xff)
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CameraConfig {
    /// Vertical field of view in degrees
    #[serde(default = "default_fov")]
    pub fov_degrees: f32,
    #[serde(default = "default_near")]
    pub near: f32,
    #[serde(default = "default_far")]
    pub far: f32,
    #[serde(default = "default_eye")]
    pub position: [f32; 3],
    /// Orbit damping strength; higher settles faster
    #[serde(default = "default_damping")]
    pub damping: f32,
}

impl Default for CameraConfig {
    fn default() -> Self {
        Self {
            fov_degrees: default_fov(),
            near: default_near(),
            far: default_far(),
            position: default_eye(),
            damping: default_damping(),
        }
    }
}

fn default_fov() -> f32 {
    45.0
}

fn default_near() -> f32 {
    0.1
}

fn default_far() -> f32 {
    100.0
}

fn default_eye() -> [f32; 3] {
    [4.0, 2.0, 4.0]
}

fn default_damping() -> f32 {
    0.05
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AssetsConfig {
    /// Compressed scene bundle, relative to the asset root
    #[serde(default = "default_scene_path")]
    pub scene: String,
    /// Baked color texture
    #[serde(default = "default_baked_path")]
    pub baked_texture: String,
}

impl Default for AssetsConfig {
    fn default() -> Self {
        Self {
            scene: default_scene_path(),
            baked_texture: default_baked_path(),
        }
    }
}

fn default_scene_path() -> String {
    "portal/scene.glb".to_string()
}

fn default_baked_path() -> String {
    "portal/baked.jpg".to_string()
}

impl PortalConfig {
    pub fn from_toml(content: &str) -> Result<Self, ConfigError> {
        let config: PortalConfig = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    pub fn to_toml(&self) -> Result<String, ConfigError> {
        Ok(toml::to_string_pretty(self)?)
    }

    /// Reject values the tweak panel could never produce
    pub fn validate(&self) -> Result<(), ParamError> {
        FOG_DENSITY_RANGE.validate("scene.fog_density", self.scene.fog_density)?;
        FIREFLY_SIZE_RANGE.validate("fireflies.size", self.fireflies.size)?;
        for (name, value) in [
            ("fireflies.spread", self.fireflies.spread),
            ("fireflies.height", self.fireflies.height),
            ("camera.damping", self.camera.damping),
        ] {
            if !value.is_finite() || value < 0.0 {
                return Err(ParamError::OutOfRange {
                    param: name.to_string(),
                    value,
                    min: 0.0,
                    max: f32::INFINITY,
                });
            }
        }
        Ok(())
    }
}

/// Load configuration from file, falling back to defaults if it is absent
pub fn load_config(path: &Path) -> Result<PortalConfig, ConfigError> {
    if path.exists() {
        let content = std::fs::read_to_string(path)?;
        let config = PortalConfig::from_toml(&content)?;
        info!(path = %path.display(), "Loaded configuration");
        Ok(config)
    } else {
        info!(
            path = %path.display(),
            "Configuration file not found, using defaults"
        );
        Ok(PortalConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_partial_config_uses_defaults() {
        let toml = r##"
[scene]
fog_density = 0.2

[fireflies]
count = 64
"##;
        let config = PortalConfig::from_toml(toml).unwrap();
        assert_eq!(config.scene.fog_density, 0.2);
        assert_eq!(config.scene.fog_color.to_hex(), "#001115");
        assert_eq!(config.fireflies.count, 64);
        assert_eq!(config.fireflies.spread, 4.0);
        assert_eq!(config.portal.color_start.to_hex(), "#6a79ff");
        assert_eq!(config.camera.position, [4.0, 2.0, 4.0]);
    }

    #[test]
    fn test_round_trip() {
        let config = PortalConfig::default();
        let text = config.to_toml().unwrap();
        let back = PortalConfig::from_toml(&text).unwrap();
        assert_eq!(back, config);
    }

    #[test]
    fn test_rejects_out_of_range() {
        let err = PortalConfig::from_toml("[scene]\nfog_density = 0.9\n").unwrap_err();
        assert!(matches!(
            err,
            ConfigError::Invalid(ParamError::OutOfRange { .. })
        ));

        let err = PortalConfig::from_toml("[portal]\ncolor_start = \"blue\"\n").unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
    }

    #[test]
    fn test_load_config_file() {
        let dir = TempDir::new().unwrap();
        let missing = load_config(&dir.path().join("absent.toml")).unwrap();
        assert_eq!(missing, PortalConfig::default());

        let path = dir.path().join("portal.toml");
        std::fs::write(&path, "[renderer]\nclear_color = \"#101010\"\n").unwrap();
        let config = load_config(&path).unwrap();
        assert_eq!(config.renderer.clear_color.to_hex(), "#101010");
    }
}

//! Server configuration loading

use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::info;

/// Main configuration structure
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ServerConfig {
    #[serde(default)]
    pub server: HttpConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HttpConfig {
    /// Bind address for web server
    #[serde(default = "default_bind")]
    pub bind: String,
    /// Built web bundle (index.html, wasm, js)
    #[serde(default = "default_root")]
    pub root: PathBuf,
    /// Scene assets, served under /assets
    #[serde(default = "default_assets")]
    pub assets: PathBuf,
    /// Scene configuration checked at startup and exposed at /api/config
    #[serde(default = "default_scene_config")]
    pub scene_config: PathBuf,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            bind: default_bind(),
            root: default_root(),
            assets: default_assets(),
            scene_config: default_scene_config(),
        }
    }
}

fn default_bind() -> String {
    "0.0.0.0:8080".to_string()
}

fn default_root() -> PathBuf {
    PathBuf::from("web")
}

fn default_assets() -> PathBuf {
    PathBuf::from("assets")
}

fn default_scene_config() -> PathBuf {
    PathBuf::from("portal.toml")
}

/// Load configuration from file
pub fn load_config(path: &Path) -> Result<ServerConfig> {
    if path.exists() {
        let content = std::fs::read_to_string(path)?;
        let config: ServerConfig = toml::from_str(&content)?;
        info!(path = %path.display(), "Loaded configuration");
        Ok(config)
    } else {
        info!(
            path = %path.display(),
            "Configuration file not found, using defaults"
        );
        Ok(ServerConfig::default())
    }
}

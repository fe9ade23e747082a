//! Configuration loading

use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::info;

use crate::bootstrap::SceneOptions;
use crate::error::{Error, Result};

/// Main configuration structure
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub scene: SceneOptions,
    #[serde(default)]
    pub terminal: TerminalOptions,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TerminalOptions {
    /// Target frames per second
    #[serde(default = "default_fps")]
    pub fps: u32,
    /// Draw with an ASCII luminosity ramp instead of coloured half blocks
    #[serde(default)]
    pub ascii: bool,
}

impl Default for TerminalOptions {
    fn default() -> Self {
        Self {
            fps: default_fps(),
            ascii: false,
        }
    }
}

fn default_fps() -> u32 {
    30
}

/// Load configuration from a TOML file, falling back to defaults when the
/// file does not exist
pub fn load_config(path: &Path) -> Result<Config> {
    if !path.exists() {
        info!(path = %path.display(), "Config file not found, using defaults");
        return Ok(Config::default());
    }

    let content = std::fs::read_to_string(path)?;
    let config: Config = toml::from_str(&content).map_err(|e| Error::Config(e.to_string()))?;
    if config.terminal.fps == 0 {
        return Err(Error::Config("terminal.fps must be at least 1".to_string()));
    }

    info!(path = %path.display(), "Configuration loaded");
    Ok(config)
}

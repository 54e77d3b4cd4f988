//! Settings management

use ballpit_core::{ConfigError, SimConfig};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum SettingsError {
    #[error("failed to access settings file {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("malformed settings: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("invalid simulation settings: {0}")]
    Invalid(#[from] ConfigError),
}

/// Persisted host settings
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub window: WindowSettings,
    pub simulation: SimConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WindowSettings {
    pub width: f32,
    pub height: f32,
    pub fullscreen_width: f32,
    pub fullscreen_height: f32,
    pub fullscreen: bool,
}

impl Default for WindowSettings {
    fn default() -> Self {
        Self {
            width: 800.0,
            height: 800.0,
            fullscreen_width: 1920.0,
            fullscreen_height: 1080.0,
            fullscreen: false,
        }
    }
}

impl WindowSettings {
    /// Dimensions for the current mode.
    pub fn active_size(&self) -> (f32, f32) {
        if self.fullscreen {
            (self.fullscreen_width, self.fullscreen_height)
        } else {
            (self.width, self.height)
        }
    }

    /// Flip between windowed and fullscreen; returns the new dimensions.
    pub fn toggle_fullscreen(&mut self) -> (f32, f32) {
        self.fullscreen = !self.fullscreen;
        self.active_size()
    }
}

impl Settings {
    /// Read and validate settings from a JSON file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, SettingsError> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|source| SettingsError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let settings = Self::from_json(&text)?;
        tracing::info!(path = %path.display(), "loaded settings");
        Ok(settings)
    }

    pub fn save(&self, path: impl AsRef<Path>) -> Result<(), SettingsError> {
        let path = path.as_ref();
        std::fs::write(path, self.to_json()?).map_err(|source| SettingsError::Io {
            path: path.to_path_buf(),
            source,
        })
    }

    pub fn from_json(text: &str) -> Result<Self, SettingsError> {
        let settings: Self = serde_json::from_str(text)?;
        settings.simulation_config().validate()?;
        Ok(settings)
    }

    pub fn to_json(&self) -> Result<String, SettingsError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Simulation config sized to the active window mode.
    pub fn simulation_config(&self) -> SimConfig {
        let (width, height) = self.window.active_size();
        SimConfig {
            width,
            height,
            ..self.simulation.clone()
        }
    }
}

use crate::types::ThemeMode;
use serde::{Deserialize, Serialize};

#[cfg(not(target_arch = "wasm32"))]
use anyhow::{Result, anyhow};
#[cfg(not(target_arch = "wasm32"))]
use std::{fs, path::PathBuf};

pub const DEFAULT_TOP_K: u32 = 6;
pub const DEFAULT_CHUNK_SIZE: u32 = 900;
pub const DEFAULT_CHUNK_OVERLAP: u32 = 120;

/// Client-side preferences. Backend configuration (keys, models) lives in the
/// backend's own environment, not here.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
pub struct Preferences {
    #[serde(default = "default_top_k")]
    pub default_top_k: u32,
    #[serde(default)]
    pub theme: ThemeMode,
}

fn default_top_k() -> u32 {
    DEFAULT_TOP_K
}

impl Default for Preferences {
    fn default() -> Self {
        Self {
            default_top_k: DEFAULT_TOP_K,
            theme: ThemeMode::Dark,
        }
    }
}

impl Preferences {
    #[cfg(not(target_arch = "wasm32"))]
    pub fn load() -> Self {
        let Ok(path) = Self::config_path() else {
            return Self::default();
        };
        if !path.exists() {
            return Self::default();
        }
        fs::read_to_string(&path)
            .ok()
            .and_then(|content| serde_json::from_str(&content).ok())
            .unwrap_or_default()
    }

    #[cfg(target_arch = "wasm32")]
    pub fn load() -> Self {
        Self::default()
    }

    #[cfg(not(target_arch = "wasm32"))]
    pub fn save(&self) -> Result<()> {
        let path = Self::config_path()?;
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(&path, serde_json::to_string_pretty(self)?)?;
        Ok(())
    }

    #[cfg(target_arch = "wasm32")]
    pub fn save(&self) -> anyhow::Result<()> {
        Ok(())
    }

    #[cfg(not(target_arch = "wasm32"))]
    fn config_path() -> Result<PathBuf> {
        let config_dir =
            dirs::config_dir().ok_or_else(|| anyhow!("Could not determine config directory"))?;
        Ok(config_dir.join("ragstudio").join("config.json"))
    }
}

#[cfg(test)]
mod tests {
    use super::Preferences;
    use crate::types::ThemeMode;

    #[test]
    fn preferences_round_trip() {
        let prefs = Preferences {
            default_top_k: 9,
            theme: ThemeMode::Light,
        };
        let json = serde_json::to_string(&prefs).expect("serialize");
        let back: Preferences = serde_json::from_str(&json).expect("deserialize");
        assert_eq!(back, prefs);
    }

    #[test]
    fn missing_fields_fall_back_to_defaults() {
        let prefs: Preferences = serde_json::from_str("{}").expect("deserialize");
        assert_eq!(prefs, Preferences::default());
    }
}

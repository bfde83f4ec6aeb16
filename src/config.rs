//! App Config Module
//! Small persisted configuration: which files to load and what the
//! selection control selects. Saved as pretty JSON next to the working
//! directory so a session reopens where the last one left off.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use crate::profile::SelectionMode;

/// Default config file name, resolved against the working directory.
pub const CONFIG_FILE: &str = "cityscope.json";

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub projection_csv: PathBuf,
    pub features_csv: PathBuf,
    pub mode: SelectionMode,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            projection_csv: PathBuf::from("tsne_data.csv"),
            features_csv: PathBuf::from("radar_data.csv"),
            mode: SelectionMode::default(),
        }
    }
}

impl AppConfig {
    /// Load from `path`, falling back to defaults when the file is absent.
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let raw = fs::read_to_string(path)
            .with_context(|| format!("failed to read config {}", path.display()))?;
        serde_json::from_str(&raw)
            .with_context(|| format!("failed to parse config {}", path.display()))
    }

    /// Write to `path` as pretty JSON.
    pub fn save(&self, path: &Path) -> Result<()> {
        let raw = serde_json::to_string_pretty(self).context("failed to serialize config")?;
        fs::write(path, raw)
            .with_context(|| format!("failed to write config {}", path.display()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn round_trips_through_json() {
        let config = AppConfig {
            projection_csv: PathBuf::from("cities.csv"),
            features_csv: PathBuf::from("profiles.csv"),
            mode: SelectionMode::ByCity,
        };
        let raw = serde_json::to_string(&config).unwrap();
        let back: AppConfig = serde_json::from_str(&raw).unwrap();
        assert_eq!(back.projection_csv, config.projection_csv);
        assert_eq!(back.mode, SelectionMode::ByCity);
    }

    #[test]
    fn missing_file_yields_defaults() {
        let config = AppConfig::load(Path::new("definitely_not_here.json")).unwrap();
        assert_eq!(config.projection_csv, PathBuf::from("tsne_data.csv"));
        assert_eq!(config.mode, SelectionMode::ByCluster);
    }
}

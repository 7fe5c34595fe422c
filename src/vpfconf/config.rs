//! # Configuration
//!
//! User defaults for new layers, stored as `config.json` in the user config
//! directory (via the `directories` crate). `VPFCONF_CONFIG_DIR` points it
//! somewhere else, which the tests rely on.
//!
//! | Key | Default | Description |
//! |-----|---------|-------------|
//! | `search-by-feature` | `true` | Written as `searchByFeature` on new layers |
//! | `show-all` | `false` | Keep empty coverages of tiled libraries |
//! | `layer-marker` | unset | Prefix for printed properties (`<marker>.<key>`) |
//! | `line-color`, `fill-color`, `select-color`, `line-width`, `dash-pattern` | see [`StyleAttributes`] | Style for added features |

use crate::error::{Result, VpfError};
use crate::style::StyleAttributes;
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::env;
use std::fs;
use std::path::{Path, PathBuf};

const CONFIG_FILENAME: &str = "config.json";
pub const CONFIG_DIR_ENV_VAR: &str = "VPFCONF_CONFIG_DIR";

pub const CONFIG_KEYS: [&str; 8] = [
    "search-by-feature",
    "show-all",
    "layer-marker",
    "line-color",
    "fill-color",
    "select-color",
    "line-width",
    "dash-pattern",
];

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct VpfConfConfig {
    #[serde(default)]
    pub style: StyleAttributes,

    #[serde(default = "default_search_by_feature")]
    pub search_by_feature: bool,

    #[serde(default)]
    pub show_all: bool,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub layer_marker: Option<String>,
}

fn default_search_by_feature() -> bool {
    true
}

impl Default for VpfConfConfig {
    fn default() -> Self {
        Self {
            style: StyleAttributes::default(),
            search_by_feature: default_search_by_feature(),
            show_all: false,
            layer_marker: None,
        }
    }
}

/// Where `config.json` lives: `$VPFCONF_CONFIG_DIR`, else the platform config dir.
pub fn config_dir() -> Result<PathBuf> {
    if let Some(dir) = env::var_os(CONFIG_DIR_ENV_VAR).filter(|d| !d.is_empty()) {
        return Ok(PathBuf::from(dir));
    }
    ProjectDirs::from("org", "openmap", "vpfconf")
        .map(|dirs| dirs.config_dir().to_path_buf())
        .ok_or_else(|| VpfError::Config("Could not determine config dir".to_string()))
}

impl VpfConfConfig {
    /// Load config from the given directory, or return defaults if not found
    pub fn load<P: AsRef<Path>>(config_dir: P) -> Result<Self> {
        let config_path = config_dir.as_ref().join(CONFIG_FILENAME);

        if !config_path.exists() {
            return Ok(Self::default());
        }

        let content = fs::read_to_string(&config_path)?;
        Ok(serde_json::from_str(&content)?)
    }

    pub fn save<P: AsRef<Path>>(&self, config_dir: P) -> Result<()> {
        let config_dir = config_dir.as_ref();
        fs::create_dir_all(config_dir)?;

        let content = serde_json::to_string_pretty(self)?;
        fs::write(config_dir.join(CONFIG_FILENAME), content)?;
        Ok(())
    }

    /// Marker to print properties under, if one is configured.
    pub fn marker(&self) -> Option<&str> {
        self.layer_marker.as_deref().filter(|m| !m.is_empty())
    }

    pub fn get(&self, key: &str) -> Option<String> {
        match key {
            "search-by-feature" => Some(self.search_by_feature.to_string()),
            "show-all" => Some(self.show_all.to_string()),
            "layer-marker" => Some(self.layer_marker.clone().unwrap_or_default()),
            other => self.style.get(other),
        }
    }

    pub fn set(&mut self, key: &str, value: &str) -> Result<()> {
        match key {
            "search-by-feature" => self.search_by_feature = parse_bool(key, value)?,
            "show-all" => self.show_all = parse_bool(key, value)?,
            "layer-marker" => {
                let marker = value.trim();
                if marker.contains(char::is_whitespace) || marker.contains('=') {
                    return Err(VpfError::Config(format!("Invalid layer marker: {}", value)));
                }
                self.layer_marker = (!marker.is_empty()).then(|| marker.to_string());
            }
            other => self.style.set(other, value)?,
        }
        Ok(())
    }

    /// All keys with their current values, in display order.
    pub fn entries(&self) -> Vec<(&'static str, String)> {
        CONFIG_KEYS
            .iter()
            .map(|k| (*k, self.get(k).unwrap_or_default()))
            .collect()
    }
}

fn parse_bool(key: &str, value: &str) -> Result<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "true" | "yes" | "on" | "1" => Ok(true),
        "false" | "no" | "off" | "0" => Ok(false),
        _ => Err(VpfError::Config(format!(
            "Invalid value for {}: {} (expected true or false)",
            key, value
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::style::Color;
    use tempfile::tempdir;

    #[test]
    fn test_default_config() {
        let config = VpfConfConfig::default();
        assert!(config.search_by_feature);
        assert!(!config.show_all);
        assert_eq!(config.marker(), None);
        assert_eq!(config.style, StyleAttributes::default());
    }

    #[test]
    fn test_load_missing_config() {
        let temp = tempdir().unwrap();
        let config = VpfConfConfig::load(temp.path().join("missing")).unwrap();
        assert_eq!(config, VpfConfConfig::default());
    }

    #[test]
    fn test_save_creates_dir_and_loads_back() {
        let temp = tempdir().unwrap();
        let dir = temp.path().join("nested").join("vpfconf");

        let mut config = VpfConfConfig::default();
        config.set("show-all", "yes").unwrap();
        config.set("line-color", "ff0000").unwrap();
        config.set("layer-marker", "political").unwrap();
        config.save(&dir).unwrap();

        let loaded = VpfConfConfig::load(&dir).unwrap();
        assert!(loaded.show_all);
        assert_eq!(loaded.style.line_color, Color(0xffff0000));
        assert_eq!(loaded.marker(), Some("political"));
    }

    #[test]
    fn test_partial_file_fills_defaults() {
        let temp = tempdir().unwrap();
        fs::write(temp.path().join(CONFIG_FILENAME), r#"{"show_all": true}"#).unwrap();
        let config = VpfConfConfig::load(temp.path()).unwrap();
        assert!(config.show_all);
        assert!(config.search_by_feature);
    }

    #[test]
    fn test_corrupt_file_is_error() {
        let temp = tempdir().unwrap();
        fs::write(temp.path().join(CONFIG_FILENAME), "{not json").unwrap();
        assert!(matches!(
            VpfConfConfig::load(temp.path()),
            Err(VpfError::Serialization(_))
        ));
    }

    #[test]
    fn test_set_rejects_bad_values() {
        let mut config = VpfConfConfig::default();
        assert!(config.set("show-all", "maybe").is_err());
        assert!(config.set("layer-marker", "two words").is_err());
        assert!(config.set("line-color", "blue").is_err());
        assert!(config.set("nonexistent-key", "1").is_err());
    }

    #[test]
    fn test_blank_marker_unsets() {
        let mut config = VpfConfConfig::default();
        config.set("layer-marker", "roads").unwrap();
        config.set("layer-marker", "").unwrap();
        assert_eq!(config.layer_marker, None);
    }

    #[test]
    fn test_entries_cover_all_keys() {
        let config = VpfConfConfig::default();
        let entries = config.entries();
        assert_eq!(entries.len(), CONFIG_KEYS.len());
        assert_eq!(entries[0], ("search-by-feature", "true".to_string()));
        assert_eq!(entries[3], ("line-color", "ff000000".to_string()));
    }
}

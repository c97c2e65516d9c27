//! Config and map file IO.
//!
//! The format is picked from the file extension: `.ron` or `.json`.

use std::fs;
use std::path::Path;

use hexdice_core::map_generation::{GeneratedMap, MapConfig};
use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::debug;

use crate::error::{Result, ToolError};

/// Supported file formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileFormat {
    /// Rusty Object Notation.
    Ron,
    /// JSON.
    Json,
}

impl FileFormat {
    /// Detect the format from a path's extension.
    pub fn from_path(path: &Path) -> Result<Self> {
        match path.extension().and_then(|e| e.to_str()) {
            Some(ext) if ext.eq_ignore_ascii_case("ron") => Ok(Self::Ron),
            Some(ext) if ext.eq_ignore_ascii_case("json") => Ok(Self::Json),
            _ => Err(ToolError::UnsupportedFormat(path.to_path_buf())),
        }
    }

    /// Serialize a value in this format.
    pub fn serialize<T: Serialize>(self, value: &T) -> Result<String> {
        Ok(match self {
            Self::Ron => ron::ser::to_string_pretty(value, ron::ser::PrettyConfig::default())?,
            Self::Json => serde_json::to_string_pretty(value)?,
        })
    }

    /// Deserialize a value in this format.
    pub fn deserialize<T: DeserializeOwned>(self, text: &str) -> Result<T> {
        Ok(match self {
            Self::Ron => ron::from_str(text)?,
            Self::Json => serde_json::from_str(text)?,
        })
    }
}

fn read(path: &Path) -> Result<String> {
    fs::read_to_string(path).map_err(|source| ToolError::Io {
        path: path.to_path_buf(),
        source,
    })
}

fn write(path: &Path, contents: &str) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent).map_err(|source| ToolError::Io {
            path: parent.to_path_buf(),
            source,
        })?;
    }
    fs::write(path, contents).map_err(|source| ToolError::Io {
        path: path.to_path_buf(),
        source,
    })
}

/// Load a value from a RON or JSON file.
pub fn load<T: DeserializeOwned>(path: &Path) -> Result<T> {
    let format = FileFormat::from_path(path)?;
    let text = read(path)?;
    debug!(path = %path.display(), ?format, "Loading file");
    format.deserialize(&text)
}

/// Save a value to a RON or JSON file.
pub fn save<T: Serialize>(value: &T, path: &Path) -> Result<()> {
    let format = FileFormat::from_path(path)?;
    let text = format.serialize(value)?;
    write(path, &text)?;
    debug!(path = %path.display(), ?format, "Saved file");
    Ok(())
}

/// Load a map configuration file.
///
/// Missing fields take their defaults.
pub fn load_config(path: &Path) -> Result<MapConfig> {
    load(path)
}

/// Load a generated map file.
pub fn load_map(path: &Path) -> Result<GeneratedMap> {
    load(path)
}

/// Command-line overrides applied on top of a base config.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ConfigOverrides {
    /// Grid width.
    pub width: Option<u32>,
    /// Grid height.
    pub height: Option<u32>,
    /// Territory limit.
    pub max_territories: Option<u16>,
    /// Player count.
    pub player_count: Option<u8>,
    /// Average dice per territory.
    pub average_dice: Option<u8>,
    /// Core territory size.
    pub base_territory_size: Option<u32>,
    /// Size variance.
    pub size_variance: Option<f32>,
    /// RNG seed.
    pub seed: Option<u64>,
    /// Generation attempts.
    pub max_attempts: Option<u32>,
}

impl ConfigOverrides {
    /// Apply every set field to `config`.
    #[must_use]
    pub fn apply(&self, mut config: MapConfig) -> MapConfig {
        if let Some(width) = self.width {
            config.width = width;
        }
        if let Some(height) = self.height {
            config.height = height;
        }
        if let Some(max) = self.max_territories {
            config.max_territories = max;
        }
        if let Some(players) = self.player_count {
            config.player_count = players;
        }
        if let Some(dice) = self.average_dice {
            config.average_dice = dice;
        }
        if let Some(size) = self.base_territory_size {
            config.base_territory_size = size;
        }
        if let Some(variance) = self.size_variance {
            config.size_variance = variance;
        }
        if self.seed.is_some() {
            config.seed = self.seed;
        }
        if let Some(attempts) = self.max_attempts {
            config.max_attempts = attempts;
        }
        config
    }
}

/// Build a config from an optional file plus overrides, then validate it.
pub fn resolve_config(file: Option<&Path>, overrides: &ConfigOverrides) -> Result<MapConfig> {
    let base = match file {
        Some(path) => load_config(path)?,
        None => MapConfig::standard(),
    };
    let config = overrides.apply(base);
    config.validate()?;
    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;
    use hexdice_core::map_generation::generate_seeded;
    use std::path::PathBuf;

    #[test]
    fn test_format_detection() {
        assert_eq!(FileFormat::from_path(Path::new("map.ron")).unwrap(), FileFormat::Ron);
        assert_eq!(FileFormat::from_path(Path::new("out/MAP.JSON")).unwrap(), FileFormat::Json);
        assert!(matches!(
            FileFormat::from_path(Path::new("map.toml")),
            Err(ToolError::UnsupportedFormat(_))
        ));
        assert!(FileFormat::from_path(Path::new("map")).is_err());
    }

    #[test]
    fn test_partial_ron_config_uses_defaults() {
        let config: MapConfig = FileFormat::Ron
            .deserialize("(width: 20, height: 15, player_count: 4)")
            .unwrap();
        assert_eq!(config.width, 20);
        assert_eq!(config.player_count, 4);
        assert_eq!(config.average_dice, MapConfig::default().average_dice);
    }

    #[test]
    fn test_overrides_apply() {
        let overrides = ConfigOverrides {
            player_count: Some(3),
            seed: Some(77),
            ..Default::default()
        };
        let config = overrides.apply(MapConfig::small());
        assert_eq!(config.player_count, 3);
        assert_eq!(config.seed, Some(77));
        assert_eq!(config.width, 20);
    }

    #[test]
    fn test_resolve_rejects_invalid() {
        let overrides = ConfigOverrides {
            player_count: Some(12),
            ..Default::default()
        };
        assert!(matches!(
            resolve_config(None, &overrides),
            Err(ToolError::Game(_))
        ));
    }

    #[test]
    fn test_map_save_load_both_formats() {
        let dir = tempfile::tempdir().unwrap();
        let map = generate_seeded(&MapConfig::small().with_seed(3)).unwrap();

        for name in ["map.ron", "nested/map.json"] {
            let path: PathBuf = dir.path().join(name);
            save(&map, &path).unwrap();
            let loaded = load_map(&path).unwrap();
            assert_eq!(loaded, map);
        }
    }

    #[test]
    fn test_missing_file_reports_path() {
        let err = load_config(Path::new("/nonexistent/config.ron")).unwrap_err();
        assert!(err.to_string().contains("/nonexistent/config.ron"));
    }
}

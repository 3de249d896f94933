//! Map presentation settings and synchronizer tunables.
//!
//! The default map settings are embedded from `map.toml` at compile time.
//! A user-supplied TOML file with the same shape replaces them wholesale.

use std::path::Path;
use std::sync::LazyLock;
use std::time::Duration;

use disaster_map_disaster_models::{DEFAULT_MAX_AGE_DAYS, LatLng};
use serde::{Deserialize, Serialize};
use strum_macros::{AsRefStr, Display, EnumString};

const DEFAULT_MAP_TOML: &str = include_str!("../map.toml");

/// Period of the background refresh.
pub const DEFAULT_REFRESH_PERIOD: Duration = Duration::from_secs(300);

/// Delay before the single retry of a refresh that found the map not ready.
pub const DEFAULT_MAP_RETRY_DELAY: Duration = Duration::from_secs(1);

static EMBEDDED: LazyLock<MapConfig> = LazyLock::new(|| {
    MapConfig::from_toml_str(DEFAULT_MAP_TOML)
        .unwrap_or_else(|e| panic!("embedded map.toml is invalid: {e}"))
});

/// Errors loading a map configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// The file could not be read.
    #[error("Failed to read {path}: {source}")]
    Io {
        /// File path.
        path: String,
        /// Underlying error.
        source: std::io::Error,
    },

    /// The file is not valid TOML for [`MapConfig`].
    #[error("Invalid map config: {0}")]
    Toml(#[from] toml::de::Error),

    /// The values are inconsistent.
    #[error("Invalid map config: {message}")]
    Invalid {
        /// What is inconsistent.
        message: String,
    },
}

/// Base tile theme.
#[derive(
    Debug,
    Clone,
    Copy,
    Default,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    AsRefStr,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
pub enum MapTheme {
    /// Light street tiles.
    #[default]
    Light,
    /// Dark tiles.
    Dark,
}

/// A tile layer the map can display.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TileSource {
    /// URL template with `{z}`, `{x}`, `{y}` placeholders.
    pub url_template: String,
    /// Attribution HTML.
    pub attribution: String,
    /// Highest zoom the provider serves.
    pub max_zoom: u8,
}

/// Light and dark tile layers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TileThemes {
    /// Layer for [`MapTheme::Light`].
    pub light: TileSource,
    /// Layer for [`MapTheme::Dark`].
    pub dark: TileSource,
}

/// Rectangle the map may not be panned outside of.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PanBounds {
    /// South-west corner.
    pub south_west: LatLng,
    /// North-east corner.
    pub north_east: LatLng,
}

/// Map presentation settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MapConfig {
    /// Center of the initial view.
    pub initial_center: LatLng,
    /// Zoom of the initial view.
    pub initial_zoom: u8,
    /// Lowest zoom the user can reach.
    pub min_zoom: u8,
    /// Highest zoom the user can reach.
    pub max_zoom: u8,
    /// Zoom used when focusing a single record.
    pub focus_zoom: u8,
    /// Pan limit, if any.
    #[serde(default)]
    pub max_bounds: Option<PanBounds>,
    /// Tile layers per theme.
    pub tiles: TileThemes,
}

impl MapConfig {
    /// The settings embedded in the binary.
    ///
    /// # Panics
    ///
    /// * If the embedded `map.toml` is malformed (caught by tests).
    #[must_use]
    pub fn embedded() -> Self {
        EMBEDDED.clone()
    }

    /// Parses and checks settings from TOML text.
    ///
    /// # Errors
    ///
    /// * If the text is not valid TOML for this type
    /// * If the zoom levels are inconsistent
    pub fn from_toml_str(text: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::de::from_str(text)?;
        config.check()?;
        Ok(config)
    }

    /// Loads settings from a TOML file.
    ///
    /// # Errors
    ///
    /// * If the file cannot be read
    /// * If its contents are invalid
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.display().to_string(),
            source,
        })?;
        log::info!("Loading map config from {}", path.display());
        Self::from_toml_str(&text)
    }

    /// Tile layer for `theme`.
    #[must_use]
    pub const fn tile_source(&self, theme: MapTheme) -> &TileSource {
        match theme {
            MapTheme::Light => &self.tiles.light,
            MapTheme::Dark => &self.tiles.dark,
        }
    }

    fn check(&self) -> Result<(), ConfigError> {
        if self.min_zoom > self.max_zoom {
            return Err(ConfigError::Invalid {
                message: format!(
                    "min_zoom {} exceeds max_zoom {}",
                    self.min_zoom, self.max_zoom
                ),
            });
        }
        for (name, zoom) in [
            ("initial_zoom", self.initial_zoom),
            ("focus_zoom", self.focus_zoom),
        ] {
            if !(self.min_zoom..=self.max_zoom).contains(&zoom) {
                return Err(ConfigError::Invalid {
                    message: format!(
                        "{name} {zoom} is outside {}..={}",
                        self.min_zoom, self.max_zoom
                    ),
                });
            }
        }
        if let Some(bounds) = self.max_bounds
            && (bounds.south_west.lat >= bounds.north_east.lat
                || bounds.south_west.lng >= bounds.north_east.lng)
        {
            return Err(ConfigError::Invalid {
                message: "max_bounds south_west must be below and left of north_east".to_string(),
            });
        }
        Ok(())
    }
}

impl Default for MapConfig {
    fn default() -> Self {
        Self::embedded()
    }
}

/// Synchronizer tunables.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SyncConfig {
    /// Period of the background refresh.
    pub refresh_period: Duration,
    /// Delay before re-checking a map that was not ready.
    pub map_retry_delay: Duration,
    /// Age window used when the age control is absent.
    pub default_max_age_days: u32,
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self {
            refresh_period: DEFAULT_REFRESH_PERIOD,
            map_retry_delay: DEFAULT_MAP_RETRY_DELAY,
            default_max_age_days: DEFAULT_MAX_AGE_DAYS,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn embedded_config_parses() {
        let config = MapConfig::embedded();
        assert_eq!(config.min_zoom, 2);
        assert_eq!(config.focus_zoom, 8);
        assert!(config.max_bounds.is_some());
        assert!(config.tile_source(MapTheme::Dark).url_template.contains("dark"));
        assert_ne!(
            config.tile_source(MapTheme::Light),
            config.tile_source(MapTheme::Dark)
        );
    }

    #[test]
    fn rejects_inverted_zoom_range() {
        let text = DEFAULT_MAP_TOML.replace("min_zoom = 2", "min_zoom = 19");
        let err = MapConfig::from_toml_str(&text).unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { .. }), "{err}");
    }

    #[test]
    fn rejects_focus_zoom_out_of_range() {
        let text = DEFAULT_MAP_TOML.replace("focus_zoom = 8", "focus_zoom = 30");
        assert!(MapConfig::from_toml_str(&text).is_err());
    }

    #[test]
    fn rejects_garbage() {
        let err = MapConfig::from_toml_str("initial_zoom = \"far\"").unwrap_err();
        assert!(matches!(err, ConfigError::Toml(_)));
    }

    #[test]
    fn theme_parses_case_insensitively() {
        assert_eq!("DARK".parse::<MapTheme>().unwrap(), MapTheme::Dark);
        assert_eq!(MapTheme::default(), MapTheme::Light);
    }

    #[test]
    fn default_tunables() {
        let config = SyncConfig::default();
        assert_eq!(config.refresh_period, Duration::from_secs(300));
        assert_eq!(config.map_retry_delay, Duration::from_secs(1));
        assert_eq!(config.default_max_age_days, 7);
    }
}

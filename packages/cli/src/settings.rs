//! Startup settings from the environment and command-line flags.
//!
//! Flags win over environment variables, which win over the defaults.

use std::path::{Path, PathBuf};
use std::time::Duration;

use disaster_map_sync::config::{ConfigError, DEFAULT_REFRESH_PERIOD};
use disaster_map_sync::{MapConfig, SyncConfig};

/// Backend used when nothing else is configured.
pub const DEFAULT_API_URL: &str = "http://127.0.0.1:5000";

/// Resolved settings for one run.
#[derive(Debug, Clone)]
pub struct Settings {
    pub api_url: String,
    pub sync: SyncConfig,
    pub map: MapConfig,
}

/// Flag values that override the environment.
#[derive(Debug, Clone, Default)]
pub struct Overrides {
    pub api_url: Option<String>,
    pub refresh_secs: Option<u64>,
    pub map_config: Option<PathBuf>,
}

impl Settings {
    /// Resolves settings from flags and the process environment.
    ///
    /// # Errors
    ///
    /// * If a map config file was given and cannot be loaded
    pub fn resolve(overrides: Overrides) -> Result<Self, ConfigError> {
        Self::resolve_with(overrides, |key| std::env::var(key).ok())
    }

    fn resolve_with(
        overrides: Overrides,
        env: impl Fn(&str) -> Option<String>,
    ) -> Result<Self, ConfigError> {
        let api_url = overrides
            .api_url
            .or_else(|| env("DISASTER_MAP_API_URL"))
            .filter(|url| !url.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_API_URL.to_string());

        let refresh_period = overrides
            .refresh_secs
            .or_else(|| env("DISASTER_MAP_REFRESH_SECS").and_then(|s| s.trim().parse().ok()))
            .filter(|secs| *secs > 0)
            .map_or(DEFAULT_REFRESH_PERIOD, Duration::from_secs);

        let map = match overrides
            .map_config
            .or_else(|| env("DISASTER_MAP_CONFIG").map(PathBuf::from))
        {
            Some(path) => MapConfig::load(Path::new(&path))?,
            None => MapConfig::embedded(),
        };

        Ok(Self {
            api_url,
            sync: SyncConfig {
                refresh_period,
                ..SyncConfig::default()
            },
            map,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn env_of(pairs: &[(&'static str, &str)]) -> impl Fn(&str) -> Option<String> + use<> {
        let pairs: Vec<(&'static str, String)> =
            pairs.iter().map(|(k, v)| (*k, (*v).to_string())).collect();
        move |key: &str| {
            pairs
                .iter()
                .find(|(k, _)| *k == key)
                .map(|(_, v)| v.clone())
        }
    }

    #[test]
    fn defaults_without_env_or_flags() {
        let settings = Settings::resolve_with(Overrides::default(), env_of(&[])).unwrap();
        assert_eq!(settings.api_url, DEFAULT_API_URL);
        assert_eq!(settings.sync.refresh_period, Duration::from_secs(300));
        assert_eq!(settings.map, MapConfig::embedded());
    }

    #[test]
    fn env_is_read_and_flags_win() {
        let env = env_of(&[
            ("DISASTER_MAP_API_URL", "http://env:5000"),
            ("DISASTER_MAP_REFRESH_SECS", "60"),
        ]);
        let settings = Settings::resolve_with(Overrides::default(), &env).unwrap();
        assert_eq!(settings.api_url, "http://env:5000");
        assert_eq!(settings.sync.refresh_period, Duration::from_secs(60));

        let flags = Overrides {
            api_url: Some("http://flag:8000".to_string()),
            refresh_secs: Some(30),
            map_config: None,
        };
        let settings = Settings::resolve_with(flags, &env).unwrap();
        assert_eq!(settings.api_url, "http://flag:8000");
        assert_eq!(settings.sync.refresh_period, Duration::from_secs(30));
    }

    #[test]
    fn bad_refresh_period_falls_back() {
        for value in ["soon", "0", "-5"] {
            let env = env_of(&[("DISASTER_MAP_REFRESH_SECS", value)]);
            let settings = Settings::resolve_with(Overrides::default(), env).unwrap();
            assert_eq!(settings.sync.refresh_period, DEFAULT_REFRESH_PERIOD, "{value}");
        }
    }

    #[test]
    fn missing_map_config_file_is_an_error() {
        let flags = Overrides {
            map_config: Some(PathBuf::from("/nonexistent/map.toml")),
            ..Overrides::default()
        };
        let err = Settings::resolve_with(flags, env_of(&[])).unwrap_err();
        assert!(matches!(err, ConfigError::Io { .. }));
    }
}

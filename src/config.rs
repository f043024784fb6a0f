//! Service configuration.
//!
//! Settings come from an optional TOML file, then environment variables
//! (after loading `.env`) override individual keys. Everything has a default,
//! so running with no file and no environment talks to the public SWPC feeds.
//!
//! ```toml
//! [feeds]
//! base_url = "https://services.swpc.noaa.gov"
//! timeout_secs = 10
//!
//! [logging]
//! level = "info"
//! file = "/var/log/swmon.log"
//!
//! [imaging]
//! enabled = true
//!
//! [monitoring]
//! stale_after_minutes = 60
//! ```

use std::path::Path;

use serde::Deserialize;

use crate::ingest::swpc::{DEFAULT_TIMEOUT_SECS, SWPC_BASE_URL};

pub const DEFAULT_CONFIG_PATH: &str = "swmon.toml";

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read {path}: {source}")]
    Io {
        path: String,
        source: std::io::Error,
    },
    #[error("invalid TOML: {0}")]
    Toml(#[from] toml::de::Error),
    #[error("invalid value for {key}: {value:?}")]
    InvalidValue { key: &'static str, value: String },
}

// ============================================================================
// Sections
// ============================================================================

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct Config {
    pub feeds: FeedConfig,
    pub logging: LoggingConfig,
    pub imaging: ImagingConfig,
    pub monitoring: MonitoringConfig,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct FeedConfig {
    pub base_url: String,
    pub timeout_secs: u64,
    pub user_agent: String,
}

impl Default for FeedConfig {
    fn default() -> Self {
        Self {
            base_url: SWPC_BASE_URL.to_string(),
            timeout_secs: DEFAULT_TIMEOUT_SECS,
            user_agent: concat!("swmon_service/", env!("CARGO_PKG_VERSION")).to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    pub level: String,
    pub file: Option<String>,
    pub timestamps: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            file: None,
            timestamps: true,
        }
    }
}

impl LoggingConfig {
    pub fn level_filter(&self) -> Result<log::LevelFilter, ConfigError> {
        self.level
            .parse::<log::LevelFilter>()
            .map_err(|_| ConfigError::InvalidValue {
                key: "logging.level",
                value: self.level.clone(),
            })
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct ImagingConfig {
    pub enabled: bool,
}

impl Default for ImagingConfig {
    fn default() -> Self {
        Self { enabled: true }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct MonitoringConfig {
    /// Latest feed sample older than this is reported as stale in the log.
    pub stale_after_minutes: u64,
}

impl Default for MonitoringConfig {
    fn default() -> Self {
        Self {
            stale_after_minutes: 60,
        }
    }
}

// ============================================================================
// Loading
// ============================================================================

impl Config {
    pub fn from_toml_str(text: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(text)?)
    }

    /// Reads `path` if it exists (defaults otherwise), then applies the
    /// process environment, including anything in `.env`.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        dotenv::dotenv().ok();
        Self::load_with(path, |key| std::env::var(key).ok())
    }

    /// `load` with the environment supplied by `lookup`.
    pub fn load_with<F>(path: &Path, lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = if path.exists() {
            let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
                path: path.display().to_string(),
                source,
            })?;
            Self::from_toml_str(&text)?
        } else {
            Self::default()
        };

        config.apply_env(lookup)?;
        Ok(config)
    }

    /// Overrides settings from `SWMON_*` variables supplied by `lookup`.
    pub fn apply_env<F>(&mut self, lookup: F) -> Result<(), ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(url) = lookup("SWMON_BASE_URL") {
            self.feeds.base_url = url;
        }
        if let Some(raw) = lookup("SWMON_TIMEOUT_SECS") {
            self.feeds.timeout_secs = parse_value("SWMON_TIMEOUT_SECS", &raw)?;
        }
        if let Some(level) = lookup("SWMON_LOG_LEVEL") {
            self.logging.level = level;
        }
        if let Some(file) = lookup("SWMON_LOG_FILE") {
            self.logging.file = (!file.trim().is_empty()).then_some(file);
        }
        if let Some(raw) = lookup("SWMON_IMAGING_ENABLED") {
            self.imaging.enabled = parse_value("SWMON_IMAGING_ENABLED", &raw)?;
        }
        if let Some(raw) = lookup("SWMON_STALE_AFTER_MINUTES") {
            self.monitoring.stale_after_minutes = parse_value("SWMON_STALE_AFTER_MINUTES", &raw)?;
        }
        self.validate()
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.feeds.timeout_secs == 0 {
            return Err(ConfigError::InvalidValue {
                key: "feeds.timeout_secs",
                value: "0".to_string(),
            });
        }
        if !self.feeds.base_url.starts_with("http://") && !self.feeds.base_url.starts_with("https://") {
            return Err(ConfigError::InvalidValue {
                key: "feeds.base_url",
                value: self.feeds.base_url.clone(),
            });
        }
        self.logging.level_filter()?;
        Ok(())
    }
}

fn parse_value<T: std::str::FromStr>(key: &'static str, raw: &str) -> Result<T, ConfigError> {
    raw.trim().parse().map_err(|_| ConfigError::InvalidValue {
        key,
        value: raw.to_string(),
    })
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn env(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_defaults_point_at_public_swpc() {
        let config = Config::default();
        assert_eq!(config.feeds.base_url, "https://services.swpc.noaa.gov");
        assert_eq!(config.feeds.timeout_secs, 10);
        assert!(config.imaging.enabled);
        assert_eq!(config.monitoring.stale_after_minutes, 60);
    }

    #[test]
    fn test_partial_toml_keeps_other_defaults() {
        let config = Config::from_toml_str("[feeds]\ntimeout_secs = 5\n").expect("valid toml");
        assert_eq!(config.feeds.timeout_secs, 5);
        assert_eq!(config.feeds.base_url, SWPC_BASE_URL);
        assert_eq!(config.logging.level, "info");
    }

    #[test]
    fn test_env_overrides_file_values() {
        let mut config = Config::from_toml_str("[imaging]\nenabled = true\n").unwrap();
        config
            .apply_env(env(&[
                ("SWMON_BASE_URL", "http://localhost:8080"),
                ("SWMON_IMAGING_ENABLED", "false"),
                ("SWMON_LOG_FILE", ""),
            ]))
            .expect("valid overrides");
        assert_eq!(config.feeds.base_url, "http://localhost:8080");
        assert!(!config.imaging.enabled);
        assert_eq!(config.logging.file, None);
    }

    #[test]
    fn test_invalid_env_value_names_the_key() {
        let mut config = Config::default();
        let err = config
            .apply_env(env(&[("SWMON_TIMEOUT_SECS", "soon")]))
            .unwrap_err();
        assert!(err.to_string().contains("SWMON_TIMEOUT_SECS"), "got: {}", err);
    }

    #[test]
    fn test_zero_timeout_and_bad_level_are_rejected() {
        let mut config = Config::default();
        assert!(config.apply_env(env(&[("SWMON_TIMEOUT_SECS", "0")])).is_err());

        let mut config = Config::default();
        assert!(config.apply_env(env(&[("SWMON_LOG_LEVEL", "chatty")])).is_err());
    }

    #[test]
    fn test_load_reads_file_from_disk() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("swmon.toml");
        std::fs::write(&path, "[monitoring]\nstale_after_minutes = 20\n").unwrap();

        let config = Config::load_with(&path, env(&[])).expect("config should load");
        assert_eq!(config.monitoring.stale_after_minutes, 20);

        let config = Config::load_with(&path, env(&[("SWMON_STALE_AFTER_MINUTES", "5")])).unwrap();
        assert_eq!(config.monitoring.stale_after_minutes, 5);
    }

    #[test]
    fn test_missing_file_falls_back_to_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let config = Config::load_with(&dir.path().join("absent.toml"), env(&[])).unwrap();
        assert_eq!(config.monitoring.stale_after_minutes, 60);
    }

    #[test]
    fn test_malformed_toml_is_error() {
        assert!(matches!(
            Config::from_toml_str("[feeds\nbase_url = 1"),
            Err(ConfigError::Toml(_))
        ));
    }
}

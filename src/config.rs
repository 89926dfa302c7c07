// SPDX-License-Identifier: MPL-2.0

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use thiserror::Error;

pub const APP_ID: &str = "io.github.sethcottle.ContentPlanner";
pub const APP_NAME: &str = "Content Planner";

#[cfg(feature = "devel")]
pub const IS_DEVEL: bool = true;
#[cfg(not(feature = "devel"))]
pub const IS_DEVEL: bool = false;

/// Maximum post length accepted by the composer
pub const MAX_POST_CHARS: usize = 500;

/// Number of entries shown in the dashboard's upcoming list
pub const DEFAULT_UPCOMING_LIMIT: usize = 5;

/// Token written on a simulated sign-in. Any non-empty value counts as a session.
pub const SIMULATED_TOKEN: &str = "fake-jwt-token";

/// Environment variable holding a tracing filter directive
pub const LOG_ENV: &str = "PLANNER_LOG";

const DEFAULT_LOG_FILTER: &str = "content_planner=info";
const DEFAULT_WATCH_INTERVAL_MS: u64 = 500;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("could not determine {0} directory")]
    NoDirectory(&'static str),
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Persistent application configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Overrides the directory holding the local store database
    pub data_dir: Option<PathBuf>,
    /// Tracing filter used when `PLANNER_LOG` is unset
    pub log_filter: String,
    pub upcoming_limit: usize,
    /// How often `planner watch` polls the store for changes made elsewhere
    pub watch_interval_ms: u64,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            data_dir: None,
            log_filter: DEFAULT_LOG_FILTER.to_string(),
            upcoming_limit: DEFAULT_UPCOMING_LIMIT,
            watch_interval_ms: DEFAULT_WATCH_INTERVAL_MS,
        }
    }
}

impl AppConfig {
    /// Get the config file path (~/.config/io.github.sethcottle.ContentPlanner/config.json)
    fn config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|mut p| {
            p.push(APP_ID);
            p.push("config.json");
            p
        })
    }

    /// Load configuration from disk, or return defaults if not found
    pub fn load() -> Self {
        let Some(path) = Self::config_path() else {
            return Self::default();
        };

        match std::fs::read_to_string(&path) {
            Ok(contents) => Self::from_json(&contents),
            Err(_) => Self::default(),
        }
    }

    /// Parse configuration, falling back to defaults on malformed input
    pub fn from_json(contents: &str) -> Self {
        serde_json::from_str(contents).unwrap_or_default()
    }

    /// Save configuration to disk
    pub fn save(&self) -> Result<(), ConfigError> {
        let path = Self::config_path().ok_or(ConfigError::NoDirectory("config"))?;

        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let json = serde_json::to_string_pretty(self)?;
        std::fs::write(&path, json)?;

        Ok(())
    }

    /// Location of the local store database
    /// Default: ~/.local/share/content-planner/local_storage.db
    pub fn store_path(&self) -> Result<PathBuf, ConfigError> {
        let dir = match &self.data_dir {
            Some(dir) => dir.clone(),
            None => dirs::data_dir()
                .ok_or(ConfigError::NoDirectory("data"))?
                .join("content-planner"),
        };
        Ok(dir.join("local_storage.db"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_config_keeps_defaults() {
        let config = AppConfig::from_json(r#"{"upcoming_limit": 3}"#);
        assert_eq!(config.upcoming_limit, 3);
        assert_eq!(config.log_filter, DEFAULT_LOG_FILTER);
        assert_eq!(config.watch_interval_ms, DEFAULT_WATCH_INTERVAL_MS);
    }

    #[test]
    fn test_malformed_config_falls_back() {
        assert_eq!(AppConfig::from_json("{not json"), AppConfig::default());
    }

    #[test]
    fn test_store_path_uses_override() {
        let config = AppConfig {
            data_dir: Some(PathBuf::from("/tmp/planner")),
            ..AppConfig::default()
        };
        let path = config.store_path().unwrap();
        assert_eq!(path, PathBuf::from("/tmp/planner/local_storage.db"));
    }
}

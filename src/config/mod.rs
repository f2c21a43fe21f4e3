//! Configuration management for Runnel.
//!
//! Configuration is read from `~/.config/runnel/config.toml`.
//! If the file doesn't exist, a default configuration with comments is created.

use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::parser::DEFAULT_REFRESH_MINS;
use crate::updater::parallel::DEFAULT_WORKERS;
use crate::updater::DEFAULT_STALE_AFTER_HOURS;

/// Main configuration struct.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    pub fetch: FetchConfig,
    pub parser: ParserConfig,
    pub update: UpdateConfig,
}

/// HTTP transport settings.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct FetchConfig {
    pub timeout_secs: u64,
    pub user_agent: String,
    /// Accept gzip and brotli encoded responses.
    pub gzip: bool,
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self {
            timeout_secs: 30,
            user_agent: concat!("runnel/", env!("CARGO_PKG_VERSION")).to_string(),
            gzip: true,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ParserConfig {
    /// Minutes before a feed without its own refresh hint may be polled again.
    pub default_refresh_mins: u64,
    /// Remember every parsed item id process-wide.
    pub cache_item_ids: bool,
}

impl Default for ParserConfig {
    fn default() -> Self {
        Self {
            default_refresh_mins: DEFAULT_REFRESH_MINS as u64,
            cache_item_ids: true,
        }
    }
}

impl ParserConfig {
    pub fn default_refresh(&self) -> chrono::Duration {
        chrono::Duration::minutes(self.default_refresh_mins.min(i64::MAX as u64) as i64)
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct UpdateConfig {
    /// Items dated further back than this are re-dated to the fetch time by `get_new`.
    pub stale_after_hours: u64,
    /// Maximum feeds updated at once.
    pub workers: usize,
}

impl Default for UpdateConfig {
    fn default() -> Self {
        Self {
            stale_after_hours: DEFAULT_STALE_AFTER_HOURS as u64,
            workers: DEFAULT_WORKERS,
        }
    }
}

impl UpdateConfig {
    pub fn stale_after(&self) -> chrono::Duration {
        chrono::Duration::hours(self.stale_after_hours.min(i32::MAX as u64) as i64)
    }
}

impl Config {
    /// Load configuration from the default path.
    ///
    /// If the config file doesn't exist, creates a default one with comments.
    /// If the config file exists but is invalid, returns an error.
    /// Missing fields in the config file will use default values.
    pub fn load() -> Result<Self, ConfigError> {
        let config_path = Self::default_config_path()?;

        if !config_path.exists() {
            Self::create_default_config(&config_path)?;
            return Ok(Self::default());
        }

        Self::load_from(&config_path)
    }

    /// Load configuration from an explicit path, which must exist.
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path).map_err(|e| ConfigError::Io {
            path: path.to_path_buf(),
            source: e,
        })?;

        toml::from_str(&content).map_err(|e| ConfigError::Parse {
            path: path.to_path_buf(),
            source: e,
        })
    }

    /// Get the default config file path: `~/.config/runnel/config.toml`
    pub fn default_config_path() -> Result<PathBuf, ConfigError> {
        let config_dir = dirs::config_dir().ok_or(ConfigError::NoConfigDir)?;
        Ok(config_dir.join("runnel").join("config.toml"))
    }

    /// Create a default config file with comments.
    fn create_default_config(path: &Path) -> Result<(), ConfigError> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(|e| ConfigError::Io {
                path: parent.to_path_buf(),
                source: e,
            })?;
        }

        let mut file = fs::File::create(path).map_err(|e| ConfigError::Io {
            path: path.to_path_buf(),
            source: e,
        })?;

        file.write_all(Self::default_config_content().as_bytes())
            .map_err(|e| ConfigError::Io {
                path: path.to_path_buf(),
                source: e,
            })?;

        Ok(())
    }

    /// Generate the default config file content with comments.
    fn default_config_content() -> String {
        r##"# Runnel Configuration

[fetch]
# Request timeout in seconds
timeout_secs = 30

# User-Agent header sent with every request
user_agent = "runnel/0.1.0"

# Accept compressed (gzip/brotli) responses
gzip = true

[parser]
# Minutes to wait before re-polling a feed that gives no refresh hint
# (RSS <ttl> or the syndication module override this)
default_refresh_mins = 10

# Remember every parsed item id process-wide; the set is saved with the
# state file so items stay "seen" across restarts
cache_item_ids = true

[update]
# `update --new` re-dates items older than this to the fetch time
stale_after_hours = 24

# Maximum number of feeds updated concurrently
workers = 10
"##
        .to_string()
    }
}

/// Configuration errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Could not determine config directory")]
    NoConfigDir,

    #[error("Failed to read/write config file at {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Failed to parse config file at {path}: {source}")]
    Parse {
        path: PathBuf,
        source: toml::de::Error,
    },
}

//! Configuration management.
//!
//! Configuration is read from `~/.config/gondola/config.toml` at startup.
//! If the file doesn't exist, a default configuration with comments is created.

use serde::Deserialize;
use std::fs;
use std::io::Write;
use std::path::PathBuf;

use crate::crawler::CrawlConfig;

/// Main configuration struct.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    pub crawl: CrawlConfig,
    pub server: ServerConfig,
    /// Override for the SQLite database path. Defaults to the platform data
    /// directory when unset.
    pub db_path: Option<PathBuf>,
}

/// Web server settings.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 5000,
        }
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

        let content = fs::read_to_string(&config_path).map_err(|e| ConfigError::Io {
            path: config_path.clone(),
            source: e,
        })?;

        let config: Config = toml::from_str(&content).map_err(|e| ConfigError::Parse {
            path: config_path,
            source: e,
        })?;

        Ok(config)
    }

    /// Get the default config file path: `~/.config/gondola/config.toml`
    pub fn default_config_path() -> Result<PathBuf, ConfigError> {
        let config_dir = dirs::config_dir().ok_or(ConfigError::NoConfigDir)?;
        Ok(config_dir.join("gondola").join("config.toml"))
    }

    /// Create a default config file with comments.
    fn create_default_config(path: &PathBuf) -> Result<(), ConfigError> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(|e| ConfigError::Io {
                path: parent.to_path_buf(),
                source: e,
            })?;
        }

        let default_config = Self::default_config_content();

        let mut file = fs::File::create(path).map_err(|e| ConfigError::Io {
            path: path.clone(),
            source: e,
        })?;

        file.write_all(default_config.as_bytes())
            .map_err(|e| ConfigError::Io {
                path: path.clone(),
                source: e,
            })?;

        Ok(())
    }

    /// Generate the default config file content with comments.
    fn default_config_content() -> String {
        r##"# Gondola Configuration
#
# Every key is optional; anything left out falls back to the built-in
# default shown here.

# Override the SQLite database location.
# db_path = "/var/lib/gondola/gondola.db"

[crawl]
# Collection page to crawl.
listing_url = "https://apniroots.com/collections/all"

# Stop collecting once this many products have been gathered.
max_products = 400

# Give up scrolling after this many consecutive scrolls where neither the
# page height nor the visible product count changed.
max_stalled_scrolls = 5

# How long to wait for network activity to settle after each scroll
# (milliseconds). Reaching the timeout is not an error.
settle_timeout_ms = 10000

# Fixed pause after each scroll for lazy-load rendering (milliseconds).
scroll_pause_ms = 1000

# Page navigation timeout (seconds).
navigation_timeout_secs = 60

# How long to wait for the newsletter popup before assuming there is none
# (milliseconds).
popup_wait_ms = 7000

# Run the browser without a visible window.
headless = true

[server]
host = "127.0.0.1"
port = 5000
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

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_deserializes() {
        let content = Config::default_config_content();
        let config: Config = toml::from_str(&content).expect("Default config should be valid TOML");

        assert_eq!(config.crawl.max_products, 400);
        assert_eq!(config.server.port, 5000);
        assert!(config.db_path.is_none());
    }

    #[test]
    fn test_partial_config() {
        let content = r##"
[crawl]
max_products = 50

[server]
port = 8080
"##;
        let config: Config = toml::from_str(content).expect("Partial config should work");

        // Custom values
        assert_eq!(config.crawl.max_products, 50);
        assert_eq!(config.server.port, 8080);
        // Default values
        assert_eq!(config.crawl.max_stalled_scrolls, 5);
        assert_eq!(config.server.host, "127.0.0.1");
    }

    #[test]
    fn test_empty_config() {
        let content = "";
        let config: Config = toml::from_str(content).expect("Empty config should work");

        assert_eq!(config.crawl.max_products, 400);
        assert_eq!(config.server.host, "127.0.0.1");
    }
}

//! Bridge configuration (.devbridge.toml + environment)

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Config file looked up in the bridge root
pub const CONFIG_FILE_NAME: &str = ".devbridge.toml";

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to determine working directory: {0}")]
    WorkingDir(std::io::Error),
    #[error("Failed to read config: {0}")]
    ReadError(String),
    #[error("Failed to parse config: {0}")]
    ParseError(String),
}

/// Effective bridge configuration
#[derive(Debug, Clone, PartialEq)]
pub struct BridgeConfig {
    pub host: String,
    pub port: u16,
    /// Directory every request path and git call is resolved against
    pub root: PathBuf,
    pub watch: WatchSection,
}

/// On-disk shape of .devbridge.toml
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct ConfigFile {
    #[serde(default)]
    pub server: ServerSection,
    #[serde(default)]
    pub watch: WatchSection,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerSection {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
}

impl Default for ServerSection {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

fn default_host() -> String {
    "127.0.0.1".to_string()
}

fn default_port() -> u16 {
    8080
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WatchSection {
    /// Glob patterns relative to the root
    #[serde(default = "default_globs")]
    pub globs: Vec<String>,
    /// Path fragments that suppress a change notification
    #[serde(default = "default_ignore")]
    pub ignore: Vec<String>,
    #[serde(default = "default_debounce_ms")]
    pub debounce_ms: u64,
}

impl Default for WatchSection {
    fn default() -> Self {
        Self {
            globs: default_globs(),
            ignore: default_ignore(),
            debounce_ms: default_debounce_ms(),
        }
    }
}

fn default_globs() -> Vec<String> {
    vec!["src/**/*".to_string(), "public/**/*".to_string()]
}

fn default_ignore() -> Vec<String> {
    vec!["node_modules".to_string(), "dist".to_string()]
}

fn default_debounce_ms() -> u64 {
    500
}

impl BridgeConfig {
    /// Defaults for a given root, no file or environment applied
    pub fn with_root(root: PathBuf) -> Self {
        let file = ConfigFile::default();
        Self {
            host: file.server.host,
            port: file.server.port,
            root,
            watch: file.watch,
        }
    }

    /// Load config for the current working directory
    pub fn load() -> Result<Self, ConfigError> {
        let root = std::env::current_dir().map_err(ConfigError::WorkingDir)?;
        let mut config = Self::load_from(&root)?;
        config.apply_env(|key| std::env::var(key).ok());
        Ok(config)
    }

    /// Load config from `<root>/.devbridge.toml`, falling back to defaults
    pub fn load_from(root: &Path) -> Result<Self, ConfigError> {
        let config_path = root.join(CONFIG_FILE_NAME);
        if !config_path.exists() {
            return Ok(Self::with_root(root.to_path_buf()));
        }

        let content = fs::read_to_string(&config_path)
            .map_err(|e| ConfigError::ReadError(e.to_string()))?;
        let file: ConfigFile =
            toml::from_str(&content).map_err(|e| ConfigError::ParseError(e.to_string()))?;

        Ok(Self {
            host: file.server.host,
            port: file.server.port,
            root: root.to_path_buf(),
            watch: file.watch,
        })
    }

    /// Apply `DEVBRIDGE_PORT` / `DEVBRIDGE_HOST` overrides
    ///
    /// An unparsable port is ignored and the previous value kept.
    pub fn apply_env<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(port) = lookup("DEVBRIDGE_PORT").and_then(|p| p.parse::<u16>().ok()) {
            self.port = port;
        }
        if let Some(host) = lookup("DEVBRIDGE_HOST").filter(|h| !h.trim().is_empty()) {
            self.host = host;
        }
    }

    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

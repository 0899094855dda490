//! Configuration module for treefind.
//!
//! This module provides a layered configuration system that supports:
//! - Default values
//! - TOML configuration file
//! - Environment variable overrides
//! - CLI argument overrides (applied by the command layer)
//!
//! # Environment Variables
//!
//! Environment variables must be prefixed with `TREEFIND_` and use double
//! underscores to separate nested levels:
//! - `TREEFIND_ROOT=/srv/data` sets `root`
//! - `TREEFIND_SERVER__MAX_QUERY_BYTES=1024` sets `server.max_query_bytes`
//! - `TREEFIND_LOGGING__DEFAULT=debug` sets `logging.default`

use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Directory holding the workspace configuration.
pub const CONFIG_DIR: &str = ".treefind";

/// Settings file name inside [`CONFIG_DIR`].
pub const CONFIG_FILE: &str = "settings.toml";

/// Prefix for environment overrides.
const ENV_PREFIX: &str = "TREEFIND_";

#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct Settings {
    /// Version of the configuration schema
    #[serde(default = "default_version")]
    pub version: u32,

    /// Root directory to monitor
    #[serde(default = "default_root")]
    pub root: PathBuf,

    /// Filesystem path of the query socket
    #[serde(default = "default_socket_path")]
    pub socket_path: PathBuf,

    /// Startup walk settings
    #[serde(default)]
    pub walk: WalkConfig,

    /// File watcher settings
    #[serde(default)]
    pub watcher: WatcherConfig,

    /// Query server settings
    #[serde(default)]
    pub server: ServerConfig,

    /// Logging settings
    #[serde(default)]
    pub logging: LoggingConfig,
}

#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct WalkConfig {
    /// Follow symbolic links during the startup walk
    #[serde(default = "default_false")]
    pub follow_links: bool,

    /// Do not descend into directories on other filesystems
    #[serde(default = "default_true")]
    pub same_file_system: bool,
}

#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct WatcherConfig {
    /// Capacity of the channel between the OS watcher and the index mutator
    #[serde(default = "default_channel_capacity")]
    pub channel_capacity: usize,
}

#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct ServerConfig {
    /// Longest accepted query line in bytes, newline excluded
    #[serde(default = "default_max_query_bytes")]
    pub max_query_bytes: usize,

    /// Per-connection read timeout in milliseconds (0 disables)
    #[serde(default = "default_timeout_ms")]
    pub read_timeout_ms: u64,

    /// Per-connection write timeout in milliseconds (0 disables)
    #[serde(default = "default_timeout_ms")]
    pub write_timeout_ms: u64,
}

#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct LoggingConfig {
    /// Default level for every target
    #[serde(default = "default_log_level")]
    pub default: String,

    /// Per-target level overrides, e.g. `treefind::server = "debug"`
    #[serde(default)]
    pub modules: HashMap<String, String>,
}

// Default value functions
fn default_version() -> u32 {
    1
}
fn default_root() -> PathBuf {
    PathBuf::from(".")
}
fn default_socket_path() -> PathBuf {
    dirs::runtime_dir()
        .unwrap_or_else(std::env::temp_dir)
        .join("treefind.sock")
}
fn default_true() -> bool {
    true
}
fn default_false() -> bool {
    false
}
fn default_channel_capacity() -> usize {
    1024
}
fn default_max_query_bytes() -> usize {
    64 * 1024
}
fn default_timeout_ms() -> u64 {
    5_000
}
fn default_log_level() -> String {
    "info".to_string()
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            version: default_version(),
            root: default_root(),
            socket_path: default_socket_path(),
            walk: WalkConfig::default(),
            watcher: WatcherConfig::default(),
            server: ServerConfig::default(),
            logging: LoggingConfig::default(),
        }
    }
}

impl Default for WalkConfig {
    fn default() -> Self {
        Self {
            follow_links: false,
            same_file_system: true,
        }
    }
}

impl Default for WatcherConfig {
    fn default() -> Self {
        Self {
            channel_capacity: default_channel_capacity(),
        }
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            max_query_bytes: default_max_query_bytes(),
            read_timeout_ms: default_timeout_ms(),
            write_timeout_ms: default_timeout_ms(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            default: default_log_level(),
            modules: HashMap::new(),
        }
    }
}

impl ServerConfig {
    pub fn read_timeout(&self) -> Option<Duration> {
        millis(self.read_timeout_ms)
    }

    pub fn write_timeout(&self) -> Option<Duration> {
        millis(self.write_timeout_ms)
    }
}

fn millis(ms: u64) -> Option<Duration> {
    (ms > 0).then(|| Duration::from_millis(ms))
}

impl Settings {
    /// Load configuration from all sources
    ///
    /// The settings file is looked up in the `.treefind` directory of the
    /// current directory or its closest ancestor that has one.
    pub fn load() -> Result<Self, Box<figment::Error>> {
        let config_path = Self::find_workspace_config()
            .unwrap_or_else(|| PathBuf::from(CONFIG_DIR).join(CONFIG_FILE));
        Self::load_from(config_path)
    }

    /// Load configuration from a specific file, still honoring `TREEFIND_` overrides
    ///
    /// A missing file is not an error; defaults and environment apply.
    pub fn load_from(path: impl AsRef<Path>) -> Result<Self, Box<figment::Error>> {
        Figment::new()
            .merge(Serialized::defaults(Settings::default()))
            .merge(Toml::file(path.as_ref()))
            // Double underscore separates nested levels, single underscore
            // stays inside field names
            .merge(Env::prefixed(ENV_PREFIX).split("__"))
            .extract()
            .map_err(Box::new)
    }

    /// Find the settings file by looking for a `.treefind` directory
    /// from the current directory up to the filesystem root
    fn find_workspace_config() -> Option<PathBuf> {
        let current = std::env::current_dir().ok()?;

        for ancestor in current.ancestors() {
            let config_dir = ancestor.join(CONFIG_DIR);
            if config_dir.is_dir() {
                return Some(config_dir.join(CONFIG_FILE));
            }
        }

        None
    }

    /// Save current configuration to file
    pub fn save(&self, path: impl AsRef<Path>) -> Result<(), Box<dyn std::error::Error>> {
        let parent = path.as_ref().parent().ok_or("Invalid path")?;
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)?;
        }

        let toml_string = toml::to_string_pretty(self)?;
        std::fs::write(path, toml_string)?;

        Ok(())
    }

    /// Write a default settings file at `path`
    ///
    /// Refuses to overwrite an existing file unless `force` is set.
    pub fn init_config_file(
        path: impl AsRef<Path>,
        force: bool,
    ) -> Result<PathBuf, Box<dyn std::error::Error>> {
        let config_path = path.as_ref().to_path_buf();

        if !force && config_path.exists() {
            return Err("Configuration file already exists. Use --force to overwrite".into());
        }

        Settings::default().save(&config_path)?;
        Ok(config_path)
    }
}

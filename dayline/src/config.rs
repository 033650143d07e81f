//! Configuration for the timeline engine.
//!
//! Supports layered configuration with the following priority (highest
//! first):
//! 1. TOML config file (`~/.config/dayline/config.toml`)
//! 2. Compiled defaults
//!
//! A missing default config file is not an error (defaults are used).
//! An explicit path that doesn't exist is an error.

use std::path::PathBuf;
use std::time::Duration;

use crate::resolve::{GridMetrics, MetricsError};
use crate::sync::SyncPolicy;

/// Errors that can occur when loading configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// Failed to read the configuration file.
    #[error("failed to read config file {path}: {source}")]
    ReadFile {
        /// Path that was attempted.
        path: PathBuf,
        /// Underlying I/O error.
        source: std::io::Error,
    },

    /// Failed to parse the TOML configuration.
    #[error("failed to parse config file: {0}")]
    ParseToml(#[from] toml::de::Error),

    /// The configured grid dimensions are invalid.
    #[error("invalid grid configuration: {0}")]
    InvalidGrid(#[from] MetricsError),
}

// ---------------------------------------------------------------------------
// TOML file structs (all fields Option for partial overrides)
// ---------------------------------------------------------------------------

/// Top-level TOML config file structure.
#[derive(Debug, Default, serde::Deserialize)]
#[serde(default)]
struct ConfigFile {
    grid: GridFileConfig,
    sync: SyncFileConfig,
}

/// `[grid]` section of the config file.
#[derive(Debug, Default, serde::Deserialize)]
#[serde(default)]
struct GridFileConfig {
    bucket_width: Option<f32>,
    row_height: Option<f32>,
    visible_buckets: Option<usize>,
}

/// `[sync]` section of the config file.
#[derive(Debug, Default, serde::Deserialize)]
#[serde(default)]
struct SyncFileConfig {
    commit_timeout_secs: Option<u64>,
    event_buffer: Option<usize>,
}

// ---------------------------------------------------------------------------
// Resolved configuration (concrete types, all fields populated)
// ---------------------------------------------------------------------------

/// Fully resolved engine configuration.
#[derive(Debug, Clone)]
pub struct EngineConfig {
    // -- Grid --
    /// Width of one day column, in layout units.
    pub bucket_width: f32,
    /// Height of one task row, in layout units.
    pub row_height: f32,
    /// Number of day columns in the visible window.
    pub visible_buckets: usize,

    // -- Sync --
    /// How long a commit waits for the store before rolling back.
    pub commit_timeout: Duration,
    /// Capacity of the engine event channel.
    pub event_buffer: usize,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            bucket_width: 160.0,
            row_height: 48.0,
            visible_buckets: 7,
            commit_timeout: Duration::from_secs(10),
            event_buffer: 64,
        }
    }
}

impl EngineConfig {
    /// Load configuration from a TOML file merged over compiled
    /// defaults.
    ///
    /// If `path` is given, the file must exist. If not, the default
    /// path (`~/.config/dayline/config.toml`) is tried and silently
    /// ignored if missing.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] if an explicit config file cannot be
    /// read, or if either file fails to parse.
    pub fn load(path: Option<&std::path::Path>) -> Result<Self, ConfigError> {
        let file = load_config_file(path)?;
        Ok(Self::resolve(&file))
    }

    /// Resolve an `EngineConfig` from a parsed config file.
    ///
    /// Priority: file > default. Separated from `load()` to enable unit
    /// testing without touching the filesystem.
    #[must_use]
    fn resolve(file: &ConfigFile) -> Self {
        let defaults = Self::default();

        Self {
            bucket_width: file.grid.bucket_width.unwrap_or(defaults.bucket_width),
            row_height: file.grid.row_height.unwrap_or(defaults.row_height),
            visible_buckets: file
                .grid
                .visible_buckets
                .unwrap_or(defaults.visible_buckets),
            commit_timeout: file
                .sync
                .commit_timeout_secs
                .map_or(defaults.commit_timeout, Duration::from_secs),
            event_buffer: file.sync.event_buffer.unwrap_or(defaults.event_buffer),
        }
    }

    /// Build validated [`GridMetrics`] from this configuration.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidGrid`] if the configured
    /// dimensions fail validation.
    pub fn grid_metrics(&self) -> Result<GridMetrics, ConfigError> {
        Ok(GridMetrics::new(
            self.bucket_width,
            self.row_height,
            self.visible_buckets,
        )?)
    }

    /// Build a [`SyncPolicy`] from this configuration.
    #[must_use]
    pub const fn sync_policy(&self) -> SyncPolicy {
        SyncPolicy {
            commit_timeout: self.commit_timeout,
            event_buffer: self.event_buffer,
        }
    }
}

// ---------------------------------------------------------------------------
// Internal helpers
// ---------------------------------------------------------------------------

/// Load and parse a TOML config file.
///
/// If `explicit_path` is `Some`, the file must exist (error if not).
/// If `explicit_path` is `None`, the default path is tried and a missing
/// file is treated as empty config.
fn load_config_file(explicit_path: Option<&std::path::Path>) -> Result<ConfigFile, ConfigError> {
    let path = if let Some(p) = explicit_path {
        let contents = std::fs::read_to_string(p).map_err(|e| ConfigError::ReadFile {
            path: p.to_path_buf(),
            source: e,
        })?;
        return Ok(toml::from_str(&contents)?);
    } else {
        let Some(config_dir) = dirs::config_dir() else {
            // No config dir available — use defaults.
            return Ok(ConfigFile::default());
        };
        config_dir.join("dayline").join("config.toml")
    };

    match std::fs::read_to_string(&path) {
        Ok(contents) => Ok(toml::from_str(&contents)?),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(ConfigFile::default()),
        Err(e) => Err(ConfigError::ReadFile { path, source: e }),
    }
}

//! Configuration for CinderKV
//!
//! Centralized configuration with sensible defaults.

use std::path::PathBuf;

/// Main configuration for a CinderKV instance
#[derive(Debug, Clone)]
pub struct Config {
    // -------------------------------------------------------------------------
    // Storage Configuration
    // -------------------------------------------------------------------------
    /// Directory holding the store's files
    /// Internal structure:
    ///   {data_dir}/
    ///     ├── DATA          (primary log)
    ///     └── DATA.MER      (only while a vacuum runs)
    pub data_dir: PathBuf,

    /// Create `data_dir` on open if it does not exist
    pub create_if_missing: bool,

    // -------------------------------------------------------------------------
    // Lifecycle Configuration
    // -------------------------------------------------------------------------
    /// Run a best-effort vacuum when the engine is closed
    pub vacuum_on_close: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from("./cinderkv_data"),
            create_if_missing: true,
            vacuum_on_close: true,
        }
    }
}

impl Config {
    /// Create a new config builder
    pub fn builder() -> ConfigBuilder {
        ConfigBuilder::default()
    }
}

/// Builder for Config
#[derive(Default)]
pub struct ConfigBuilder {
    config: Config,
}

impl ConfigBuilder {
    /// Set the data directory
    pub fn data_dir(mut self, path: impl Into<PathBuf>) -> Self {
        self.config.data_dir = path.into();
        self
    }

    /// Whether a missing data directory is created on open
    pub fn create_if_missing(mut self, create: bool) -> Self {
        self.config.create_if_missing = create;
        self
    }

    /// Whether `close` compacts the log before releasing it
    pub fn vacuum_on_close(mut self, vacuum: bool) -> Self {
        self.config.vacuum_on_close = vacuum;
        self
    }

    pub fn build(self) -> Config {
        self.config
    }
}

//! Runtime Configuration
//!
//! Handles parsing and management of halide.toml configuration files.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use thiserror::Error;

/// Name of the configuration file searched for by [`RuntimeConfig::find_and_load`].
pub const CONFIG_FILE: &str = "halide.toml";

/// Configuration errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Failed to serialize config: {0}")]
    Serialize(#[from] toml::ser::Error),

    #[error("Config file not found: {0}")]
    NotFound(String),
}

/// Result type for configuration operations.
pub type ConfigResult<T> = Result<T, ConfigError>;

/// Root configuration structure matching halide.toml.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct RuntimeConfig {
    /// Compiled filter libraries
    #[serde(default)]
    pub filters: FiltersConfig,

    /// GPU device selection
    #[serde(default)]
    pub gpu: GpuConfig,
}

impl RuntimeConfig {
    /// Load configuration from a file path.
    pub fn load(path: &Path) -> ConfigResult<Self> {
        if !path.exists() {
            return Err(ConfigError::NotFound(path.display().to_string()));
        }
        let content = std::fs::read_to_string(path)?;
        content.parse()
    }

    /// Load configuration from the current directory or parents.
    pub fn load_from_cwd() -> ConfigResult<Self> {
        let cwd = std::env::current_dir()?;
        Self::find_and_load(&cwd)
    }

    /// Find and load configuration by searching up from the given directory.
    pub fn find_and_load(start_dir: &Path) -> ConfigResult<Self> {
        let mut dir = start_dir.to_path_buf();
        loop {
            let config_path = dir.join(CONFIG_FILE);
            if config_path.exists() {
                return Self::load(&config_path);
            }
            if !dir.pop() {
                return Ok(Self::default());
            }
        }
    }

    /// Save configuration to a file.
    pub fn save(&self, path: &Path) -> ConfigResult<()> {
        let content = toml::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        Ok(())
    }
}

impl FromStr for RuntimeConfig {
    type Err = ConfigError;

    /// Parse configuration from TOML text.
    fn from_str(content: &str) -> ConfigResult<Self> {
        Ok(toml::from_str(content)?)
    }
}

/// Filter library configuration.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct FiltersConfig {
    /// Directories searched before the default search paths
    #[serde(default)]
    pub search_paths: Vec<PathBuf>,

    /// Named filters
    #[serde(default)]
    pub entries: BTreeMap<String, FilterEntry>,
}

/// A filter declared in configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FilterEntry {
    /// Library file name, stem (`brighter` -> `libbrighter.so`) or path
    pub library: String,

    /// Exported pipeline symbol; defaults to the entry name
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub symbol: Option<String>,
}

/// GPU configuration.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct GpuConfig {
    /// Device index passed to the runtime; the runtime picks one when unset
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub device: Option<i32>,
}

impl GpuConfig {
    /// Select the configured device in the runtime. Returns whether a device
    /// was configured.
    #[cfg(feature = "gpu")]
    pub fn apply(&self) -> bool {
        self.apply_with(crate::gpu::set_gpu_device)
    }

    #[cfg_attr(not(feature = "gpu"), allow(dead_code))]
    fn apply_with(&self, select: impl FnOnce(i32)) -> bool {
        match self.device {
            Some(device) => {
                tracing::debug!(device, "selecting gpu device");
                select(device);
                true
            }
            None => false,
        }
    }
}

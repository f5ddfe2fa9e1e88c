//! Configuration schema for iconcache
//!
//! Configuration is stored at `~/.config/iconcache/config.toml`

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Root configuration structure
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// General settings
    pub general: GeneralConfig,

    /// Cache storage settings
    pub cache: CacheConfig,

    /// Icon rendering settings
    pub icons: IconsConfig,

    /// Background worker settings
    pub worker: WorkerConfig,
}

/// General application settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneralConfig {
    /// Log format: "text" or "json"
    pub log_format: String,
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            log_format: "text".to_string(),
        }
    }
}

/// Cache storage configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CacheConfig {
    /// Icon database path (defaults to the state directory)
    pub db_path: Option<PathBuf>,

    /// Keep resolved entries in memory in front of the database
    pub in_memory_cache: bool,

    /// Route shortcut icons through the cache instead of loading them each time
    pub shortcut_icon_cache: bool,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            db_path: None,
            in_memory_cache: true,
            shortcut_icon_cache: true,
        }
    }
}

/// Icon rendering configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct IconsConfig {
    /// Edge length of cached icons in pixels
    pub icon_size: u32,

    /// Badge edge length as a fraction of the icon edge
    pub badge_scale: f32,
}

impl Default for IconsConfig {
    fn default() -> Self {
        Self {
            icon_size: 192,
            badge_scale: 0.444,
        }
    }
}

/// Background worker configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct WorkerConfig {
    /// Name of the worker thread
    pub thread_name: String,

    /// Apply priority changes to the OS thread (Linux only)
    pub apply_os_priority: bool,

    /// Nice value while icon requests are pending
    pub foreground_nice: i32,

    /// Nice value when idle
    pub background_nice: i32,
}

impl Default for WorkerConfig {
    fn default() -> Self {
        Self {
            thread_name: "icon-cache-worker".to_string(),
            apply_os_priority: true,
            foreground_nice: -2,
            background_nice: 10,
        }
    }
}

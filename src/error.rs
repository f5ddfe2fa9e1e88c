//! Error types for iconcache
//!
//! All fallible modules use `IconCacheResult<T>` as their return type.
//! Lookups themselves never surface storage errors to callers; the engine
//! logs them and treats the entry as missing.

use std::path::PathBuf;
use thiserror::Error;

/// Result type alias for iconcache operations
pub type IconCacheResult<T> = Result<T, IconCacheError>;

/// All errors that can occur in iconcache
#[derive(Error, Debug)]
pub enum IconCacheError {
    // Storage errors
    #[error("Icon database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("Corrupt cache row for {component}: {reason}")]
    CorruptRow { component: String, reason: String },

    #[error("Icon database schema version {found} is newer than supported version {supported}")]
    SchemaTooNew { found: i64, supported: i64 },

    // Icon errors
    #[error("Image error: {0}")]
    Image(#[from] image::ImageError),

    #[error("Invalid component name: {0}")]
    InvalidComponent(String),

    // Configuration errors
    #[error("Invalid configuration at {path}: {reason}")]
    ConfigInvalid { path: PathBuf, reason: String },

    #[error("Failed to create config directory {path}: {source}")]
    ConfigDirCreate {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    // IO errors
    #[error("IO error: {context}")]
    Io {
        context: String,
        #[source]
        source: std::io::Error,
    },

    // Worker errors
    #[error("Icon worker unavailable: {0}")]
    WorkerUnavailable(String),

    // Serialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("TOML serialize error: {0}")]
    TomlSerialize(#[from] toml::ser::Error),

    // General errors
    #[error("Internal error: {0}")]
    Internal(String),

    #[error("{0}")]
    User(String),
}

impl IconCacheError {
    /// Create an IO error with context
    pub fn io(context: impl Into<String>, source: std::io::Error) -> Self {
        Self::Io {
            context: context.into(),
            source,
        }
    }

    /// Create a corrupt row error
    pub fn corrupt_row(component: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::CorruptRow {
            component: component.into(),
            reason: reason.into(),
        }
    }

    /// Get actionable hint for the error
    pub fn hint(&self) -> Option<&'static str> {
        match self {
            Self::Database(_) | Self::CorruptRow { .. } => {
                Some("Run: iconcache clear --yes to rebuild the icon database")
            }
            Self::SchemaTooNew { .. } => Some("Upgrade iconcache or point --db at a fresh file"),
            Self::ConfigInvalid { .. } => Some("Run: iconcache config init --force"),
            _ => None,
        }
    }
}

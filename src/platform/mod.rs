//! Platform package catalog abstraction
//!
//! The cache never talks to the host OS directly. Everything it needs to
//! know about installed packages goes through [`PackageCatalog`], which hosts
//! implement on top of their package manager. [`StaticCatalog`] is an
//! in-memory implementation for snapshots and tests.

pub mod memory;

pub use memory::StaticCatalog;

use crate::model::{ComponentName, UserHandle};
use chrono::{DateTime, Utc};
use image::RgbaImage;
use sha2::{Digest, Sha256};

/// A launchable activity as reported by the platform
#[derive(Debug, Clone)]
pub struct ActivityInfo {
    pub component: ComponentName,
    pub user: UserHandle,
    pub label: String,
    /// Raw icon, `None` when the activity declares none
    pub icon: Option<RgbaImage>,
}

/// Installed package metadata
#[derive(Debug, Clone)]
pub struct ApplicationInfo {
    pub package: String,
    pub user: UserHandle,
    pub label: String,
    pub icon: Option<RgbaImage>,
    pub version_code: i64,
    pub last_update_time: DateTime<Utc>,
}

/// A pinned or dynamic shortcut published by a package
#[derive(Debug, Clone)]
pub struct ShortcutInfo {
    pub id: String,
    pub package: String,
    pub user: UserHandle,
    /// Activity the shortcut was published from, if declared
    pub activity: Option<ComponentName>,
    pub short_label: String,
    pub long_label: Option<String>,
    pub icon: Option<RgbaImage>,
}

impl ShortcutInfo {
    /// Component identity used to cache this shortcut
    pub fn component(&self) -> ComponentName {
        ComponentName::new(self.package.clone(), self.id.clone())
    }
}

/// Component that only needs a label (widgets, settings entries)
#[derive(Debug, Clone)]
pub struct ComponentWithLabel {
    pub component: ComponentName,
    pub user: UserHandle,
    pub label: String,
}

/// Source of installed component information
pub trait PackageCatalog: Send + Sync {
    /// Resolve a component to a live activity, `None` if it no longer exists
    fn resolve_activity(&self, component: &ComponentName, user: UserHandle)
        -> Option<ActivityInfo>;

    /// All launchable activities of a package for a user
    fn activity_list(&self, package: &str, user: UserHandle) -> Vec<ActivityInfo>;

    /// Package metadata, `None` if the package is not installed
    fn application_info(&self, package: &str, user: UserHandle) -> Option<ApplicationInfo>;

    /// Fingerprint of the package's installed state.
    ///
    /// Cached entries whose freshness token differs from this are stale.
    fn system_state(&self, package: &str) -> String;

    /// Stable serial number used as the durable user key
    fn user_serial(&self, user: UserHandle) -> i64 {
        i64::from(user.0)
    }

    /// Label with the user's profile marker, used as the content description
    fn badged_label(&self, label: &str, user: UserHandle) -> String {
        if user.is_system() {
            label.to_string()
        } else {
            format!("Work {}", label)
        }
    }

    /// Display title of a widget section, if the category is known
    fn widget_section_title(&self, _category: i32) -> Option<String> {
        None
    }
}

/// Compute a system-state fingerprint for a package.
///
/// `icon_state` carries global inputs that affect every icon (locale, icon
/// shape, theme); changing it invalidates all entries.
pub fn system_state_fingerprint(info: &ApplicationInfo, icon_state: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(info.package.as_bytes());
    hasher.update(info.version_code.to_be_bytes());
    hasher.update(info.last_update_time.timestamp_millis().to_be_bytes());
    hasher.update(icon_state.as_bytes());
    hex::encode(hasher.finalize())
}

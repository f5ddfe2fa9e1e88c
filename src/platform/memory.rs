//! In-memory package catalog

use crate::model::{ComponentName, UserHandle};
use crate::platform::{system_state_fingerprint, ActivityInfo, ApplicationInfo, PackageCatalog};
use parking_lot::RwLock;
use std::collections::HashMap;

#[derive(Debug, Clone)]
struct PackageRecord {
    info: ApplicationInfo,
    activities: Vec<ActivityInfo>,
}

/// Catalog backed by an in-memory snapshot of installed packages
#[derive(Debug, Default)]
pub struct StaticCatalog {
    packages: RwLock<HashMap<(String, UserHandle), PackageRecord>>,
    widget_sections: RwLock<HashMap<i32, String>>,
    icon_state: RwLock<String>,
}

impl StaticCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Install or replace a package for the user in `info`
    pub fn install(&self, info: ApplicationInfo, activities: Vec<ActivityInfo>) {
        let key = (info.package.clone(), info.user);
        self.packages
            .write()
            .insert(key, PackageRecord { info, activities });
    }

    /// Remove a package for one user; returns whether it was installed
    pub fn uninstall(&self, package: &str, user: UserHandle) -> bool {
        self.packages
            .write()
            .remove(&(package.to_string(), user))
            .is_some()
    }

    pub fn set_widget_section(&self, category: i32, title: impl Into<String>) {
        self.widget_sections.write().insert(category, title.into());
    }

    /// Change the global icon state, invalidating every fingerprint
    pub fn set_icon_state(&self, state: impl Into<String>) {
        *self.icon_state.write() = state.into();
    }
}

impl PackageCatalog for StaticCatalog {
    fn resolve_activity(
        &self,
        component: &ComponentName,
        user: UserHandle,
    ) -> Option<ActivityInfo> {
        let packages = self.packages.read();
        let record = packages.get(&(component.package().to_string(), user))?;
        record
            .activities
            .iter()
            .find(|a| &a.component == component)
            .cloned()
    }

    fn activity_list(&self, package: &str, user: UserHandle) -> Vec<ActivityInfo> {
        self.packages
            .read()
            .get(&(package.to_string(), user))
            .map(|r| r.activities.clone())
            .unwrap_or_default()
    }

    fn application_info(&self, package: &str, user: UserHandle) -> Option<ApplicationInfo> {
        self.packages
            .read()
            .get(&(package.to_string(), user))
            .map(|r| r.info.clone())
    }

    fn system_state(&self, package: &str) -> String {
        let icon_state = self.icon_state.read().clone();
        let packages = self.packages.read();
        // Lowest user wins so the result does not depend on map order
        packages
            .iter()
            .filter(|((name, _), _)| name == package)
            .min_by_key(|((_, user), _)| *user)
            .map(|(_, record)| system_state_fingerprint(&record.info, &icon_state))
            .unwrap_or_default()
    }

    fn widget_section_title(&self, category: i32) -> Option<String> {
        self.widget_sections.read().get(&category).cloned()
    }
}

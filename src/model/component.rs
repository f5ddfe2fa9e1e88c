//! Component identity and cache keys

use crate::error::{IconCacheError, IconCacheResult};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Class name used for package-level entries
pub const PACKAGE_CLASS_NAME: &str = ".";

/// Owning user (profile) of a component
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct UserHandle(pub u32);

impl UserHandle {
    /// The primary device user
    pub const SYSTEM: UserHandle = UserHandle(0);

    /// Check if this is the primary user
    pub fn is_system(&self) -> bool {
        *self == Self::SYSTEM
    }
}

impl fmt::Display for UserHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Package plus class name of an installable component
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ComponentName {
    package: String,
    class: String,
}

impl ComponentName {
    /// Create a component name
    pub fn new(package: impl Into<String>, class: impl Into<String>) -> Self {
        Self {
            package: package.into(),
            class: class.into(),
        }
    }

    /// Component standing in for the package itself
    pub fn package_component(package: impl Into<String>) -> Self {
        Self::new(package, PACKAGE_CLASS_NAME)
    }

    pub fn package(&self) -> &str {
        &self.package
    }

    pub fn class(&self) -> &str {
        &self.class
    }

    /// Check if this is a package-level component
    pub fn is_package_component(&self) -> bool {
        self.class == PACKAGE_CLASS_NAME
    }

    /// Flatten to the `package/class` form used as the durable key
    pub fn flatten(&self) -> String {
        format!("{}/{}", self.package, self.class)
    }

    /// Parse the `package/class` form.
    ///
    /// A class starting with `.` is relative to the package, so
    /// `com.example/.Main` yields `com.example.Main`.
    pub fn unflatten(flat: &str) -> Option<Self> {
        let (package, class) = flat.split_once('/')?;
        if package.is_empty() || class.is_empty() {
            return None;
        }

        let class = if class != PACKAGE_CLASS_NAME && class.starts_with('.') {
            format!("{}{}", package, class)
        } else {
            class.to_string()
        };

        Some(Self::new(package, class))
    }
}

impl fmt::Display for ComponentName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.package, self.class)
    }
}

impl FromStr for ComponentName {
    type Err = IconCacheError;

    fn from_str(s: &str) -> IconCacheResult<Self> {
        Self::unflatten(s).ok_or_else(|| IconCacheError::InvalidComponent(s.to_string()))
    }
}

/// Identity of one cacheable subject: component plus owning user
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct EntityKey {
    pub component: ComponentName,
    pub user: UserHandle,
}

impl EntityKey {
    pub fn new(component: ComponentName, user: UserHandle) -> Self {
        Self { component, user }
    }

    /// Key of the package-level entry
    pub fn package(package: impl Into<String>, user: UserHandle) -> Self {
        Self::new(ComponentName::package_component(package), user)
    }

    pub fn package_name(&self) -> &str {
        self.component.package()
    }
}

impl fmt::Display for EntityKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}#{}", self.component, self.user)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn flatten_and_parse() {
        let cn = ComponentName::new("com.example", "com.example.Main");
        assert_eq!(cn.flatten(), "com.example/com.example.Main");
        assert_eq!(ComponentName::unflatten(&cn.flatten()), Some(cn));
    }

    #[test]
    fn relative_class_expands() {
        let cn: ComponentName = "com.example/.Main".parse().unwrap();
        assert_eq!(cn.class(), "com.example.Main");
    }

    #[test]
    fn package_marker_kept() {
        let cn = ComponentName::unflatten("com.example/.").unwrap();
        assert!(cn.is_package_component());
        assert_eq!(cn, ComponentName::package_component("com.example"));
    }

    #[test]
    fn malformed_rejected() {
        assert!(ComponentName::unflatten("no-slash").is_none());
        assert!(ComponentName::unflatten("/Main").is_none());
        assert!(ComponentName::unflatten("pkg/").is_none());
        assert!("garbage".parse::<ComponentName>().is_err());
    }

    #[test]
    fn entity_key_package() {
        let key = EntityKey::package("com.example", UserHandle(10));
        assert_eq!(key.package_name(), "com.example");
        assert_eq!(key.to_string(), "com.example/.#10");
    }
}

//! Destination objects populated by the cache

use crate::model::bitmap::{BitmapInfo, IconQuality};
use crate::model::component::{ComponentName, UserHandle};
use crate::platform::ActivityInfo;

/// Shape of the item being resolved
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ItemKind {
    /// All-apps entry backed by a launchable activity
    Application,

    /// Workspace item (pinned app or shortcut)
    Workspace,

    /// Package-level item, optionally grouped under a widget category
    Package {
        package_name: String,
        widget_category: Option<i32>,
    },
}

/// An item with a title, description and icon that the cache fills in place
#[derive(Debug, Clone)]
pub struct ItemInfoWithIcon {
    pub title: String,
    pub content_description: String,
    pub bitmap: Option<BitmapInfo>,
    pub user: UserHandle,
    pub component: Option<ComponentName>,
    pub kind: ItemKind,
}

impl ItemInfoWithIcon {
    fn empty(user: UserHandle, component: Option<ComponentName>, kind: ItemKind) -> Self {
        Self {
            title: String::new(),
            content_description: String::new(),
            bitmap: None,
            user,
            component,
            kind,
        }
    }

    pub fn application(component: ComponentName, user: UserHandle) -> Self {
        Self::empty(user, Some(component), ItemKind::Application)
    }

    /// Workspace item; `component` is `None` when its intent has no target
    pub fn workspace(component: Option<ComponentName>, user: UserHandle) -> Self {
        Self::empty(user, component, ItemKind::Workspace)
    }

    pub fn package(package_name: impl Into<String>, user: UserHandle) -> Self {
        Self::empty(
            user,
            None,
            ItemKind::Package {
                package_name: package_name.into(),
                widget_category: None,
            },
        )
    }

    /// Package item listed under a widget category
    pub fn widget_package(
        package_name: impl Into<String>,
        user: UserHandle,
        widget_category: i32,
    ) -> Self {
        Self::empty(
            user,
            None,
            ItemKind::Package {
                package_name: package_name.into(),
                widget_category: Some(widget_category),
            },
        )
    }

    /// Component this item launches, if any
    pub fn target_component(&self) -> Option<&ComponentName> {
        self.component.as_ref()
    }

    /// Package this item belongs to
    pub fn package_name(&self) -> Option<&str> {
        match &self.kind {
            ItemKind::Package { package_name, .. } => Some(package_name),
            _ => self.component.as_ref().map(ComponentName::package),
        }
    }

    pub fn widget_category(&self) -> Option<i32> {
        match &self.kind {
            ItemKind::Package {
                widget_category, ..
            } => *widget_category,
            _ => None,
        }
    }

    pub fn is_package_item(&self) -> bool {
        matches!(self.kind, ItemKind::Package { .. })
    }

    /// Check if the item currently shows a low-res placeholder
    pub fn uses_low_res_icon(&self) -> bool {
        self.bitmap.as_ref().is_some_and(BitmapInfo::is_low_res)
    }
}

/// One element of a bulk lookup
#[derive(Debug)]
pub struct IconRequestInfo<'a> {
    /// Destination populated in place
    pub item: &'a mut ItemInfoWithIcon,

    /// Live activity descriptor, if the caller already has it
    pub activity_info: Option<ActivityInfo>,

    pub quality: IconQuality,
}

impl<'a> IconRequestInfo<'a> {
    pub fn new(item: &'a mut ItemInfoWithIcon, quality: IconQuality) -> Self {
        Self {
            item,
            activity_info: None,
            quality,
        }
    }

    pub fn with_activity(mut self, activity_info: ActivityInfo) -> Self {
        self.activity_info = Some(activity_info);
        self
    }
}

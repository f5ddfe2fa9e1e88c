//! Per-entity resolution strategies
//!
//! A [`CachingLogic`] knows how to turn one kind of live platform entity into
//! the title, description and icon stored in a cache entry. Callers pick the
//! strategy; the engine never inspects entity types at runtime.

use crate::icons::IconFactory;
use crate::model::{BitmapInfo, ComponentName, UserHandle};
use crate::platform::{
    ActivityInfo, ApplicationInfo, ComponentWithLabel, PackageCatalog, ShortcutInfo,
};

/// Strategy deriving fresh cache content for one entity shape
pub trait CachingLogic {
    type Entity;

    fn component(&self, entity: &Self::Entity) -> ComponentName;

    fn user(&self, entity: &Self::Entity) -> UserHandle;

    fn label(&self, entity: &Self::Entity) -> String;

    /// Content description for the entity, given its label
    fn description(
        &self,
        entity: &Self::Entity,
        label: &str,
        catalog: &dyn PackageCatalog,
    ) -> String {
        catalog.badged_label(label, self.user(entity))
    }

    /// Load the full-resolution icon; `None` means the entity has no icon
    fn load_icon(&self, factory: &IconFactory, entity: &Self::Entity) -> Option<BitmapInfo>;

    /// Whether resolved entries are kept in the in-memory layer
    fn add_to_mem_cache(&self) -> bool {
        true
    }
}

/// Launchable activities
#[derive(Debug, Clone, Copy, Default)]
pub struct ActivityCachingLogic;

impl CachingLogic for ActivityCachingLogic {
    type Entity = ActivityInfo;

    fn component(&self, entity: &ActivityInfo) -> ComponentName {
        entity.component.clone()
    }

    fn user(&self, entity: &ActivityInfo) -> UserHandle {
        entity.user
    }

    fn label(&self, entity: &ActivityInfo) -> String {
        entity.label.clone()
    }

    fn load_icon(&self, factory: &IconFactory, entity: &ActivityInfo) -> Option<BitmapInfo> {
        Some(match &entity.icon {
            Some(icon) => factory.create_icon(icon),
            None => factory.default_icon(entity.user),
        })
    }
}

/// Package-level entries
#[derive(Debug, Clone, Copy, Default)]
pub struct ApplicationCachingLogic;

impl CachingLogic for ApplicationCachingLogic {
    type Entity = ApplicationInfo;

    fn component(&self, entity: &ApplicationInfo) -> ComponentName {
        ComponentName::package_component(entity.package.clone())
    }

    fn user(&self, entity: &ApplicationInfo) -> UserHandle {
        entity.user
    }

    fn label(&self, entity: &ApplicationInfo) -> String {
        entity.label.clone()
    }

    fn load_icon(&self, factory: &IconFactory, entity: &ApplicationInfo) -> Option<BitmapInfo> {
        Some(match &entity.icon {
            Some(icon) => factory.create_icon(icon),
            None => factory.default_icon(entity.user),
        })
    }
}

/// Deep shortcuts; entries live only in the durable layer
#[derive(Debug, Clone, Copy, Default)]
pub struct ShortcutCachingLogic;

impl CachingLogic for ShortcutCachingLogic {
    type Entity = ShortcutInfo;

    fn component(&self, entity: &ShortcutInfo) -> ComponentName {
        entity.component()
    }

    fn user(&self, entity: &ShortcutInfo) -> UserHandle {
        entity.user
    }

    fn label(&self, entity: &ShortcutInfo) -> String {
        entity.short_label.clone()
    }

    fn description(
        &self,
        entity: &ShortcutInfo,
        label: &str,
        catalog: &dyn PackageCatalog,
    ) -> String {
        let text = entity.long_label.as_deref().unwrap_or(label);
        catalog.badged_label(text, entity.user)
    }

    fn load_icon(&self, factory: &IconFactory, entity: &ShortcutInfo) -> Option<BitmapInfo> {
        entity.icon.as_ref().map(|icon| factory.create_icon(icon))
    }

    fn add_to_mem_cache(&self) -> bool {
        false
    }
}

/// Label-only components; nothing is ever published
#[derive(Debug, Clone, Copy, Default)]
pub struct ComponentWithLabelCachingLogic;

impl CachingLogic for ComponentWithLabelCachingLogic {
    type Entity = ComponentWithLabel;

    fn component(&self, entity: &ComponentWithLabel) -> ComponentName {
        entity.component.clone()
    }

    fn user(&self, entity: &ComponentWithLabel) -> UserHandle {
        entity.user
    }

    fn label(&self, entity: &ComponentWithLabel) -> String {
        entity.label.clone()
    }

    fn load_icon(&self, _factory: &IconFactory, _entity: &ComponentWithLabel) -> Option<BitmapInfo> {
        None
    }

    fn add_to_mem_cache(&self) -> bool {
        false
    }
}

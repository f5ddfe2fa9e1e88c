//! Resolution engine
//!
//! [`IconCache`] is a read-through, write-back cache in front of an
//! [`IconStore`]. Every public entry point takes the single engine lock, so a
//! read-check-recompute-write sequence is never interleaved with another.
//! Internal `*_locked` helpers receive the locked [`CacheState`] instead of
//! re-locking, which lets nested resolutions (shortcut badge → activity →
//! package) share one critical section.

use crate::cache::entry::CacheEntry;
use crate::cache::logic::{
    ActivityCachingLogic, ApplicationCachingLogic, CachingLogic, ComponentWithLabelCachingLogic,
};
use crate::cache::sqlite::SqliteIconStore;
use crate::cache::store::{IconStore, StoredRow};
use crate::config::{Config, ConfigManager};
use crate::error::{IconCacheError, IconCacheResult};
use crate::icons::IconFactory;
use crate::model::{BitmapInfo, EntityKey, IconQuality, ItemInfoWithIcon, UserHandle};
use crate::platform::{ActivityInfo, ComponentWithLabel, PackageCatalog};
use image::RgbaImage;
use parking_lot::{Mutex, MutexGuard};
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tracing::{debug, info, warn};

/// What the caller already knows about the durable row of a key
#[derive(Debug)]
pub(crate) enum Prefetch {
    /// No read was made; look the key up
    NotQueried,
    /// A successful range query returned no row for the key
    Absent,
    Row(StoredRow),
}

/// Both cache layers, guarded together by the engine lock
pub(crate) struct CacheState {
    pub(super) memory: HashMap<EntityKey, CacheEntry>,
    pub(super) store: Box<dyn IconStore>,
}

/// Cache of titles and icons for components, shortcuts and packages
pub struct IconCache {
    state: Mutex<CacheState>,
    pub(super) catalog: Arc<dyn PackageCatalog>,
    pub(super) factory: Arc<IconFactory>,
    in_memory_cache: bool,
    pub(super) shortcut_icon_cache: bool,
    resolutions: AtomicU64,
}

impl IconCache {
    /// Create a cache over an existing store
    pub fn new(
        store: Box<dyn IconStore>,
        catalog: Arc<dyn PackageCatalog>,
        config: &Config,
    ) -> Self {
        Self {
            state: Mutex::new(CacheState {
                memory: HashMap::new(),
                store,
            }),
            catalog,
            factory: Arc::new(IconFactory::new(&config.icons)),
            in_memory_cache: config.cache.in_memory_cache,
            shortcut_icon_cache: config.cache.shortcut_icon_cache,
            resolutions: AtomicU64::new(0),
        }
    }

    /// Open the SQLite database named by the configuration
    pub fn open(config: &Config, catalog: Arc<dyn PackageCatalog>) -> IconCacheResult<Self> {
        let path = ConfigManager::db_path(config);
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| {
                IconCacheError::io(format!("creating directory {}", parent.display()), e)
            })?;
        }
        let store = SqliteIconStore::open(&path)?;
        info!("Icon cache opened at {}", path.display());
        Ok(Self::new(Box::new(store), catalog, config))
    }

    pub fn catalog(&self) -> &dyn PackageCatalog {
        self.catalog.as_ref()
    }

    pub fn factory(&self) -> &IconFactory {
        &self.factory
    }

    /// Number of times a strategy was invoked to derive fresh content
    pub fn resolution_count(&self) -> u64 {
        self.resolutions.load(Ordering::Relaxed)
    }

    pub(super) fn lock(&self) -> MutexGuard<'_, CacheState> {
        self.state.lock()
    }

    /// Resolve `key` with `logic`, serving stored content when it is fresh.
    ///
    /// `supplier` is only called when the entry has to be recomputed.
    pub fn resolve<L, F>(
        &self,
        key: &EntityKey,
        logic: &L,
        supplier: F,
        quality: IconQuality,
    ) -> CacheEntry
    where
        L: CachingLogic,
        F: FnOnce() -> Option<L::Entity>,
    {
        let mut state = self.lock();
        self.cache_locked(
            &mut state,
            key,
            logic,
            supplier,
            false,
            quality,
            Prefetch::NotQueried,
        )
    }

    /// Core lookup: memory, then durable row, then recompute.
    ///
    /// `prefetched` carries the outcome of a range query the caller already
    /// made for this key (bulk loads); the durable layer is only queried
    /// again for [`Prefetch::NotQueried`].
    #[allow(clippy::too_many_arguments)]
    pub(super) fn cache_locked<L, F>(
        &self,
        state: &mut CacheState,
        key: &EntityKey,
        logic: &L,
        supplier: F,
        use_package_icon: bool,
        quality: IconQuality,
        prefetched: Prefetch,
    ) -> CacheEntry
    where
        L: CachingLogic,
        F: FnOnce() -> Option<L::Entity>,
    {
        let fingerprint = self.catalog.system_state(key.package_name());

        if self.in_memory_cache {
            if let Some(entry) = state.memory.get(key) {
                if entry.is_valid_for(&fingerprint, quality) {
                    return entry.clone();
                }
            }
        }

        let row = match prefetched {
            Prefetch::Row(row) => Some(row),
            Prefetch::Absent => None,
            Prefetch::NotQueried => self.read_row_locked(state, key, quality),
        };

        if let Some(row) = row {
            match row.into_entry() {
                Ok(entry) if entry.is_valid_for(&fingerprint, quality) => {
                    if self.in_memory_cache && logic.add_to_mem_cache() {
                        state.memory.insert(key.clone(), entry.clone());
                    }
                    return entry;
                }
                Ok(_) => debug!("Stored icon for {} is stale", key),
                Err(e) => warn!("Ignoring unreadable icon entry for {}: {}", key, e),
            }
        }

        self.compute_locked(state, key, logic, supplier, use_package_icon, quality, fingerprint)
    }

    fn read_row_locked(
        &self,
        state: &CacheState,
        key: &EntityKey,
        quality: IconQuality,
    ) -> Option<StoredRow> {
        let serial = self.catalog.user_serial(key.user);
        match state
            .store
            .query(&key.component.flatten(), serial, quality.into())
        {
            Ok(row) => row,
            Err(e) => {
                warn!("Error reading icon cache for {}: {}", key, e);
                None
            }
        }
    }

    #[allow(clippy::too_many_arguments)]
    fn compute_locked<L, F>(
        &self,
        state: &mut CacheState,
        key: &EntityKey,
        logic: &L,
        supplier: F,
        use_package_icon: bool,
        quality: IconQuality,
        fingerprint: String,
    ) -> CacheEntry
    where
        L: CachingLogic,
        F: FnOnce() -> Option<L::Entity>,
    {
        match supplier() {
            Some(entity) => {
                self.resolutions.fetch_add(1, Ordering::Relaxed);
                let entry = self.build_entry(logic, &entity, fingerprint);
                if entry.bitmap.is_some() {
                    self.publish_locked(state, key, &entry, logic.add_to_mem_cache());
                }
                entry
            }
            None if use_package_icon && !key.component.is_package_component() => {
                debug!("{} not found, using package icon", key);
                let package_entry =
                    self.entry_for_package_locked(state, key.package_name(), key.user, quality);
                CacheEntry {
                    freshness: fingerprint,
                    ..package_entry
                }
            }
            None => {
                debug!("{} not found", key);
                CacheEntry {
                    freshness: fingerprint,
                    ..CacheEntry::default()
                }
            }
        }
    }

    fn build_entry<L: CachingLogic>(
        &self,
        logic: &L,
        entity: &L::Entity,
        fingerprint: String,
    ) -> CacheEntry {
        let title = logic.label(entity);
        CacheEntry {
            content_description: logic.description(entity, &title, self.catalog.as_ref()),
            bitmap: logic.load_icon(&self.factory, entity),
            title,
            freshness: fingerprint,
        }
    }

    /// Write an entry to both layers
    fn publish_locked(
        &self,
        state: &mut CacheState,
        key: &EntityKey,
        entry: &CacheEntry,
        add_to_mem_cache: bool,
    ) {
        let serial = self.catalog.user_serial(key.user);
        match StoredRow::from_entry(key.component.flatten(), serial, entry) {
            Ok(row) => {
                if let Err(e) = state.store.upsert(&row) {
                    warn!("Failed to persist icon for {}: {}", key, e);
                }
            }
            Err(e) => warn!("Failed to encode icon for {}: {}", key, e),
        }

        if self.in_memory_cache && add_to_mem_cache {
            state.memory.insert(key.clone(), entry.clone());
        }
    }

    pub(super) fn entry_for_package_locked(
        &self,
        state: &mut CacheState,
        package: &str,
        user: UserHandle,
        quality: IconQuality,
    ) -> CacheEntry {
        let key = EntityKey::package(package, user);
        self.cache_locked(
            state,
            &key,
            &ApplicationCachingLogic,
            || self.catalog.application_info(package, user),
            false,
            quality,
            Prefetch::NotQueried,
        )
    }

    /// Copy an entry into a destination item
    pub(super) fn apply_cache_entry(&self, entry: &CacheEntry, item: &mut ItemInfoWithIcon) {
        item.title = entry.title.trim().to_string();
        item.content_description = entry.content_description.clone();
        item.bitmap = Some(
            entry
                .bitmap
                .clone()
                .unwrap_or_else(|| self.factory.default_icon(item.user)),
        );
    }

    fn apply_default(&self, item: &mut ItemInfoWithIcon) {
        item.bitmap = Some(self.factory.default_icon(item.user));
        item.title.clear();
        item.content_description.clear();
    }

    /// Fill in `item` from its target activity.
    ///
    /// Falls back to the package icon when the activity no longer exists and
    /// to the default icon when the item has no target at all.
    pub fn get_title_and_icon(&self, item: &mut ItemInfoWithIcon, quality: IconQuality) {
        let mut state = self.lock();
        self.title_and_icon_locked(&mut state, item, quality);
    }

    pub(super) fn title_and_icon_locked(
        &self,
        state: &mut CacheState,
        item: &mut ItemInfoWithIcon,
        quality: IconQuality,
    ) {
        let Some(component) = item.target_component().cloned() else {
            self.apply_default(item);
            return;
        };

        let user = item.user;
        let key = EntityKey::new(component, user);
        let entry = self.cache_locked(
            state,
            &key,
            &ActivityCachingLogic,
            || self.catalog.resolve_activity(&key.component, user),
            true,
            quality,
            Prefetch::NotQueried,
        );
        self.apply_cache_entry(&entry, item);
    }

    /// Fill in `item` using a caller-provided activity supplier
    pub fn get_title_and_icon_with<F>(
        &self,
        item: &mut ItemInfoWithIcon,
        supplier: F,
        use_package_icon: bool,
        quality: IconQuality,
    ) where
        F: FnOnce() -> Option<ActivityInfo>,
    {
        let Some(component) = item.target_component().cloned() else {
            self.apply_default(item);
            return;
        };

        let mut state = self.lock();
        let key = EntityKey::new(component, item.user);
        let entry = self.cache_locked(
            &mut state,
            &key,
            &ActivityCachingLogic,
            supplier,
            use_package_icon,
            quality,
            Prefetch::NotQueried,
        );
        self.apply_cache_entry(&entry, item);
    }

    /// Fill in `item` from an activity the caller already holds
    pub fn get_title_and_icon_for_activity(
        &self,
        item: &mut ItemInfoWithIcon,
        activity: ActivityInfo,
        quality: IconQuality,
    ) {
        // The activity is known, so no package icon fallback
        self.get_title_and_icon_with(item, move || Some(activity), false, quality);
    }

    /// Refresh `item` only if a valid, non-default entry exists.
    ///
    /// Never fetches the live activity.
    pub fn update_title_and_icon(&self, item: &mut ItemInfoWithIcon) {
        let Some(component) = item.target_component().cloned() else {
            return;
        };

        let mut state = self.lock();
        let key = EntityKey::new(component, item.user);
        let quality = IconQuality::from_low_res(item.uses_low_res_icon());
        let entry = self.cache_locked(
            &mut state,
            &key,
            &ActivityCachingLogic,
            || None,
            false,
            quality,
            Prefetch::NotQueried,
        );

        if let Some(bitmap) = &entry.bitmap {
            if !self.factory.is_default_icon(bitmap, item.user) {
                self.apply_cache_entry(&entry, item);
            }
        }
    }

    /// Fill in a package item with the package-level icon and label
    pub fn get_title_and_icon_for_app(&self, item: &mut ItemInfoWithIcon, quality: IconQuality) {
        let mut state = self.lock();
        self.title_and_icon_for_app_locked(&mut state, item, quality);
    }

    pub(super) fn title_and_icon_for_app_locked(
        &self,
        state: &mut CacheState,
        item: &mut ItemInfoWithIcon,
        quality: IconQuality,
    ) {
        let Some(package) = item.package_name().map(str::to_string) else {
            self.apply_default(item);
            return;
        };

        let entry = self.entry_for_package_locked(state, &package, item.user, quality);
        self.apply_cache_entry(&entry, item);

        if let Some(category) = item.widget_category() {
            if let Some(title) = self.catalog.widget_section_title(category) {
                item.content_description = self.catalog.badged_label(&title, item.user);
                item.title = title;
            }
        }
    }

    /// Title of a label-only component, never publishing a new entry
    pub fn get_title_no_cache(&self, info: &ComponentWithLabel) -> String {
        let mut state = self.lock();
        let key = EntityKey::new(info.component.clone(), info.user);
        let entry = self.cache_locked(
            &mut state,
            &key,
            &ComponentWithLabelCachingLogic,
            || Some(info.clone()),
            false,
            IconQuality::Low,
            Prefetch::NotQueried,
        );
        entry.title.trim().to_string()
    }

    /// Purge a package for one user, then re-resolve its current activities.
    ///
    /// An unknown package leaves only the purge.
    pub fn update_icons_for_pkg(&self, package: &str, user: UserHandle) {
        let mut state = self.lock();
        self.remove_icons_for_pkg_locked(&mut state, package, user);

        if self.catalog.application_info(package, user).is_none() {
            debug!("Package not found: {}", package);
            return;
        }

        let fingerprint = self.catalog.system_state(package);
        let activities = self.catalog.activity_list(package, user);
        let count = activities.len();
        for activity in activities {
            self.add_icon_locked(&mut state, &ActivityCachingLogic, &activity, &fingerprint);
        }

        info!("Refreshed {} icon(s) for {} (user {})", count, package, user);
    }

    fn add_icon_locked<L: CachingLogic>(
        &self,
        state: &mut CacheState,
        logic: &L,
        entity: &L::Entity,
        fingerprint: &str,
    ) {
        let key = EntityKey::new(logic.component(entity), logic.user(entity));
        self.resolutions.fetch_add(1, Ordering::Relaxed);
        let entry = self.build_entry(logic, entity, fingerprint.to_string());
        if entry.bitmap.is_some() {
            self.publish_locked(state, &key, &entry, logic.add_to_mem_cache());
        }
    }

    /// Remove every entry of a package for one user from both layers
    pub fn remove_icons_for_pkg(&self, package: &str, user: UserHandle) {
        let mut state = self.lock();
        self.remove_icons_for_pkg_locked(&mut state, package, user);
    }

    fn remove_icons_for_pkg_locked(&self, state: &mut CacheState, package: &str, user: UserHandle) {
        state
            .memory
            .retain(|key, _| !(key.user == user && key.package_name() == package));

        let serial = self.catalog.user_serial(user);
        match state.store.delete_package(package, serial) {
            Ok(deleted) => debug!("Removed {} stored icon(s) for {}", deleted, package),
            Err(e) => warn!("Failed to remove stored icons for {}: {}", package, e),
        }
    }

    /// Record the icon and label of a package that is still being installed.
    ///
    /// The entry lives in memory only; once the package is installed its
    /// fingerprint changes and the real icon replaces it.
    pub fn update_session_cache(
        &self,
        package: &str,
        user: UserHandle,
        icon: Option<&RgbaImage>,
        label: Option<&str>,
    ) {
        if !self.in_memory_cache {
            debug!("In-memory cache disabled, ignoring session info for {}", package);
            return;
        }

        let mut state = self.lock();
        state
            .memory
            .retain(|key, _| !(key.user == user && key.package_name() == package));

        let key = EntityKey::package(package, user);
        let fingerprint = self.catalog.system_state(package);
        let entry = state.memory.entry(key).or_default();

        if let Some(label) = label.filter(|l| !l.trim().is_empty()) {
            entry.title = label.to_string();
            entry.content_description = self.catalog.badged_label(label, user);
        }
        if let Some(icon) = icon {
            entry.bitmap = Some(self.factory.create_icon(icon));
        }
        if entry.bitmap.is_none() {
            entry.bitmap = Some(self.factory.default_icon(user));
        }
        entry.freshness = fingerprint;
    }

    /// Drop every entry from both layers
    pub fn clear(&self) -> IconCacheResult<usize> {
        let mut state = self.lock();
        state.memory.clear();
        let deleted = state.store.clear()?;
        info!("Cleared {} stored icon(s)", deleted);
        Ok(deleted)
    }

    /// Placeholder icon for a user
    pub fn default_icon(&self, user: UserHandle) -> BitmapInfo {
        self.factory.default_icon(user)
    }

    pub fn is_default_icon(&self, bitmap: &BitmapInfo, user: UserHandle) -> bool {
        self.factory.is_default_icon(bitmap, user)
    }

    /// Check if `item` shows something worth keeping over the default icon:
    /// a placeholder still waiting for its high-res upgrade, or a real icon.
    pub fn is_using_fallback_or_non_default_icon(&self, item: &ItemInfoWithIcon) -> bool {
        item.bitmap.as_ref().is_some_and(|bitmap| {
            bitmap.is_null_or_low_res() || !self.factory.is_default_icon(bitmap, item.user)
        })
    }
}

//! Fixtures shared by the cache unit tests

use crate::cache::engine::IconCache;
use crate::cache::sqlite::SqliteIconStore;
use crate::cache::store::{ColumnSet, IconStore, StoredRow};
use crate::config::Config;
use crate::error::{IconCacheError, IconCacheResult};
use crate::model::{ComponentName, UserHandle};
use crate::platform::{ActivityInfo, ApplicationInfo, StaticCatalog};
use chrono::DateTime;
use image::{Rgba, RgbaImage};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;

pub(crate) struct Fixture {
    pub catalog: Arc<StaticCatalog>,
    pub cache: IconCache,
}

pub(crate) fn test_config() -> Config {
    let mut config = Config::default();
    config.icons.icon_size = 8;
    config.worker.apply_os_priority = false;
    config
}

pub(crate) fn fixture() -> Fixture {
    let catalog = Arc::new(StaticCatalog::new());
    let cache = cache_over(
        Box::new(SqliteIconStore::open_in_memory().unwrap()),
        catalog.clone(),
    );
    Fixture { catalog, cache }
}

pub(crate) fn cache_over(store: Box<dyn IconStore>, catalog: Arc<StaticCatalog>) -> IconCache {
    IconCache::new(store, catalog, &test_config())
}

/// `package/package.class`
pub(crate) fn component(package: &str, class: &str) -> ComponentName {
    ComponentName::new(package, format!("{}.{}", package, class))
}

/// Solid icon whose colour is derived from `name`
pub(crate) fn solid_icon(name: &str) -> RgbaImage {
    let seed = name
        .bytes()
        .fold(7u32, |acc, b| acc.wrapping_mul(31).wrapping_add(u32::from(b)));
    let [r, g, b, _] = seed.to_be_bytes();
    RgbaImage::from_pixel(8, 8, Rgba([r, g, b, 255]))
}

/// Install `package` at `version` with one activity per class
pub(crate) fn install(
    catalog: &StaticCatalog,
    package: &str,
    version: i64,
    classes: &[&str],
    user: UserHandle,
) {
    let info = ApplicationInfo {
        package: package.to_string(),
        user,
        label: format!("{} app", package),
        icon: Some(solid_icon(package)),
        version_code: version,
        last_update_time: DateTime::from_timestamp(1_700_000_000 + version, 0).unwrap(),
    };
    let activities = classes
        .iter()
        .map(|class| ActivityInfo {
            component: component(package, class),
            user,
            label: class.to_string(),
            icon: Some(solid_icon(&format!("{}/{}", package, class))),
        })
        .collect();
    catalog.install(info, activities);
}

/// Switches for injecting storage faults, and counters of issued reads
#[derive(Debug, Clone, Default)]
pub(crate) struct Faults {
    reads: Arc<AtomicBool>,
    writes: Arc<AtomicBool>,
    bulk: Arc<AtomicBool>,
    point_queries: Arc<AtomicUsize>,
    bulk_queries: Arc<AtomicUsize>,
}

impl Faults {
    pub fn fail_reads(&self, on: bool) {
        self.reads.store(on, Ordering::SeqCst);
    }

    pub fn fail_writes(&self, on: bool) {
        self.writes.store(on, Ordering::SeqCst);
    }

    pub fn fail_bulk(&self, on: bool) {
        self.bulk.store(on, Ordering::SeqCst);
    }

    pub fn point_queries(&self) -> usize {
        self.point_queries.load(Ordering::SeqCst)
    }

    pub fn bulk_queries(&self) -> usize {
        self.bulk_queries.load(Ordering::SeqCst)
    }

    fn check(flag: &AtomicBool) -> IconCacheResult<()> {
        if flag.load(Ordering::SeqCst) {
            return Err(IconCacheError::Database(rusqlite::Error::InvalidQuery));
        }
        Ok(())
    }
}

/// In-memory SQLite store that fails on demand
pub(crate) struct FaultyStore {
    inner: SqliteIconStore,
    faults: Faults,
}

impl FaultyStore {
    pub fn new(faults: Faults) -> Self {
        Self {
            inner: SqliteIconStore::open_in_memory().unwrap(),
            faults,
        }
    }
}

impl IconStore for FaultyStore {
    fn query(
        &self,
        component: &str,
        user_serial: i64,
        columns: ColumnSet,
    ) -> IconCacheResult<Option<StoredRow>> {
        self.faults.point_queries.fetch_add(1, Ordering::SeqCst);
        Faults::check(&self.faults.reads)?;
        self.inner.query(component, user_serial, columns)
    }

    fn query_bulk(
        &self,
        components: &[String],
        user_serial: i64,
        columns: ColumnSet,
    ) -> IconCacheResult<Vec<IconCacheResult<StoredRow>>> {
        self.faults.bulk_queries.fetch_add(1, Ordering::SeqCst);
        Faults::check(&self.faults.bulk)?;
        self.inner.query_bulk(components, user_serial, columns)
    }

    fn upsert(&mut self, row: &StoredRow) -> IconCacheResult<()> {
        Faults::check(&self.faults.writes)?;
        self.inner.upsert(row)
    }

    fn delete_package(&mut self, package: &str, user_serial: i64) -> IconCacheResult<usize> {
        Faults::check(&self.faults.writes)?;
        self.inner.delete_package(package, user_serial)
    }

    fn clear(&mut self) -> IconCacheResult<usize> {
        Faults::check(&self.faults.writes)?;
        self.inner.clear()
    }

    fn list(
        &self,
        package: Option<&str>,
        user_serial: Option<i64>,
    ) -> IconCacheResult<Vec<StoredRow>> {
        self.inner.list(package, user_serial)
    }

    fn count(&self) -> IconCacheResult<usize> {
        self.inner.count()
    }
}

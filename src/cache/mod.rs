//! Two-level icon cache
//!
//! An in-memory map sits in front of a durable [`IconStore`]. Entries are
//! keyed by [`EntityKey`](crate::model::EntityKey) and carry the system-state
//! fingerprint of their package; a fingerprint mismatch means the entry is
//! stale and gets recomputed from the [`PackageCatalog`](crate::platform::PackageCatalog).
//!
//! # Layers
//!
//! | Layer | Holds | Lifetime |
//! |-------|-------|----------|
//! | memory | activity and package entries, session entries | process |
//! | store | activity, package and shortcut rows | until purged |
//!
//! Entries whose entity could not be found are never stored in either layer.

mod bulk;
pub mod engine;
pub mod entry;
pub mod logic;
mod shortcut;
pub mod sqlite;
pub mod store;

#[cfg(test)]
pub(crate) mod testing;

pub use engine::IconCache;
pub use entry::CacheEntry;
pub use logic::{
    ActivityCachingLogic, ApplicationCachingLogic, CachingLogic, ComponentWithLabelCachingLogic,
    ShortcutCachingLogic,
};
pub use sqlite::{SqliteIconStore, SCHEMA_VERSION};
pub use store::{ColumnSet, IconStore, StoredRow};

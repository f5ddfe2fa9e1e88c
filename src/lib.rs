//! iconcache - titles and icons for installed app components
//!
//! A two-level cache (memory over SQLite) resolving the visual identity of
//! activities, shortcuts and packages, with a bulk loader and a background
//! request queue for high-resolution upgrades.

pub mod cache;
pub mod cli;
pub mod config;
pub mod error;
pub mod icons;
pub mod model;
pub mod platform;
pub mod queue;
pub mod ui;

pub use cache::{CacheEntry, IconCache, IconStore, SqliteIconStore};
pub use error::{IconCacheError, IconCacheResult};
pub use icons::IconFactory;
pub use model::{
    BitmapInfo, ComponentName, EntityKey, IconQuality, IconRequestInfo, ItemInfoWithIcon,
    ItemKind, UserHandle,
};
pub use platform::{PackageCatalog, StaticCatalog};
pub use queue::{ForegroundExecutor, IconRequestQueue, ItemInfoUpdateReceiver};

//! Keys, bitmaps and destination items shared across the cache

pub mod bitmap;
pub mod component;
pub mod item;

pub use bitmap::{BitmapInfo, IconQuality};
pub use component::{ComponentName, EntityKey, UserHandle};
pub use item::{IconRequestInfo, ItemInfoWithIcon, ItemKind};

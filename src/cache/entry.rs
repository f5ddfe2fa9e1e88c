//! Cache entries served by the resolution engine

use crate::model::{BitmapInfo, IconQuality};

/// Resolved title, description and icon for one entity key
#[derive(Debug, Clone, PartialEq, Default)]
pub struct CacheEntry {
    pub title: String,
    pub content_description: String,

    /// `None` when the entity could not be found
    pub bitmap: Option<BitmapInfo>,

    /// System-state fingerprint of the package when this entry was computed
    pub freshness: String,
}

impl CacheEntry {
    /// Quality of the stored bitmap, if any
    pub fn quality(&self) -> Option<IconQuality> {
        self.bitmap.as_ref().map(BitmapInfo::quality)
    }

    /// Check if this entry can be served without recomputation
    pub fn is_valid_for(&self, fingerprint: &str, requested: IconQuality) -> bool {
        self.freshness == fingerprint
            && self
                .quality()
                .is_some_and(|quality| quality.satisfies(requested))
    }
}

//! Durable store abstraction
//!
//! The engine talks to persistence only through [`IconStore`]. Rows are keyed
//! by the flattened component name and the user serial; at most one row
//! exists per key.

use crate::cache::entry::CacheEntry;
use crate::error::{IconCacheError, IconCacheResult};
use crate::model::{BitmapInfo, IconQuality};
use chrono::Utc;
use image::ImageFormat;
use std::io::Cursor;

/// Which columns a query projects
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColumnSet {
    /// Everything except the icon bytes
    LowRes,
    /// Everything including the icon bytes
    HighRes,
}

impl From<IconQuality> for ColumnSet {
    fn from(quality: IconQuality) -> Self {
        match quality {
            IconQuality::Low => Self::LowRes,
            IconQuality::High => Self::HighRes,
        }
    }
}

/// One durable row
#[derive(Debug, Clone, PartialEq)]
pub struct StoredRow {
    /// Flattened component name
    pub component: String,
    pub user_serial: i64,
    pub title: String,
    pub content_description: String,
    /// Dominant colour as packed ARGB
    pub color: u32,
    /// PNG bytes; absent for low-res projections and label-only rows
    pub icon: Option<Vec<u8>>,
    pub freshness: String,
    /// Milliseconds since the epoch
    pub last_updated: i64,
}

impl StoredRow {
    /// Build a row from an entry, encoding the icon as PNG
    pub fn from_entry(
        component: String,
        user_serial: i64,
        entry: &CacheEntry,
    ) -> IconCacheResult<Self> {
        let (color, icon) = match &entry.bitmap {
            Some(bitmap) => (bitmap.color(), bitmap.icon().map(encode_png).transpose()?),
            None => (0, None),
        };

        Ok(Self {
            component,
            user_serial,
            title: entry.title.clone(),
            content_description: entry.content_description.clone(),
            color,
            icon,
            freshness: entry.freshness.clone(),
            last_updated: Utc::now().timestamp_millis(),
        })
    }

    /// Rebuild the entry, decoding icon bytes when present
    pub fn into_entry(self) -> IconCacheResult<CacheEntry> {
        let bitmap = match self.icon {
            Some(bytes) => {
                let icon = image::load_from_memory_with_format(&bytes, ImageFormat::Png)
                    .map_err(|e| IconCacheError::corrupt_row(&self.component, e.to_string()))?
                    .into_rgba8();
                BitmapInfo::high_res(icon, self.color)
            }
            None => BitmapInfo::low_res(self.color),
        };

        Ok(CacheEntry {
            title: self.title,
            content_description: self.content_description,
            bitmap: Some(bitmap),
            freshness: self.freshness,
        })
    }
}

fn encode_png(icon: &image::RgbaImage) -> IconCacheResult<Vec<u8>> {
    let mut bytes = Vec::new();
    icon.write_to(&mut Cursor::new(&mut bytes), ImageFormat::Png)?;
    Ok(bytes)
}

/// Persistent key-value table behind the in-memory cache
pub trait IconStore: Send {
    /// Point lookup
    fn query(
        &self,
        component: &str,
        user_serial: i64,
        columns: ColumnSet,
    ) -> IconCacheResult<Option<StoredRow>>;

    /// Range lookup: `component IN (components) AND user = user_serial`.
    ///
    /// The outer error means the query itself failed; inner errors are
    /// per-row decode failures that callers skip.
    fn query_bulk(
        &self,
        components: &[String],
        user_serial: i64,
        columns: ColumnSet,
    ) -> IconCacheResult<Vec<IconCacheResult<StoredRow>>>;

    /// Insert or replace the row for its key
    fn upsert(&mut self, row: &StoredRow) -> IconCacheResult<()>;

    /// Delete every row of a package for one user; returns the row count
    fn delete_package(&mut self, package: &str, user_serial: i64) -> IconCacheResult<usize>;

    /// Delete every row; returns the row count
    fn clear(&mut self) -> IconCacheResult<usize>;

    /// Low-res projection of all rows, optionally filtered
    fn list(&self, package: Option<&str>, user_serial: Option<i64>)
        -> IconCacheResult<Vec<StoredRow>>;

    fn count(&self) -> IconCacheResult<usize>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{Rgba, RgbaImage};

    #[test]
    fn row_roundtrip_keeps_pixels() {
        let entry = CacheEntry {
            title: "Example".to_string(),
            content_description: "Example app".to_string(),
            bitmap: Some(BitmapInfo::high_res(
                RgbaImage::from_pixel(4, 4, Rgba([10, 20, 30, 255])),
                0xff0a_141e,
            )),
            freshness: "abc".to_string(),
        };

        let row = StoredRow::from_entry("com.example/.Main".to_string(), 0, &entry).unwrap();
        assert!(row.icon.is_some());
        assert_eq!(row.into_entry().unwrap(), entry);
    }

    #[test]
    fn row_without_icon_is_low_res() {
        let row = StoredRow {
            component: "com.example/.Main".to_string(),
            user_serial: 0,
            title: "Example".to_string(),
            content_description: String::new(),
            color: 0xff00_0000,
            icon: None,
            freshness: "abc".to_string(),
            last_updated: 0,
        };
        let entry = row.into_entry().unwrap();
        assert!(entry.bitmap.unwrap().is_low_res());
    }

    #[test]
    fn garbage_icon_bytes_are_corrupt() {
        let row = StoredRow {
            component: "com.example/.Main".to_string(),
            user_serial: 0,
            title: String::new(),
            content_description: String::new(),
            color: 0,
            icon: Some(vec![1, 2, 3]),
            freshness: String::new(),
            last_updated: 0,
        };
        assert!(matches!(
            row.into_entry(),
            Err(IconCacheError::CorruptRow { .. })
        ));
    }

    #[test]
    fn column_set_from_quality() {
        assert_eq!(ColumnSet::from(IconQuality::Low), ColumnSet::LowRes);
        assert_eq!(ColumnSet::from(IconQuality::High), ColumnSet::HighRes);
    }
}

//! Resolved icon bitmaps

use image::RgbaImage;
use std::sync::Arc;

/// Quality tier of a cached bitmap
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum IconQuality {
    /// Dominant colour only, no pixels
    Low,
    /// Full icon pixels
    High,
}

impl IconQuality {
    pub fn from_low_res(use_low_res: bool) -> Self {
        if use_low_res {
            Self::Low
        } else {
            Self::High
        }
    }

    /// Check if a bitmap of this quality can serve a request for `requested`
    pub fn satisfies(self, requested: IconQuality) -> bool {
        self >= requested
    }
}

/// A resolved icon plus its quality marker.
///
/// Pixels are shared behind an `Arc` and never mutated once published, so
/// cloning a `BitmapInfo` is cheap and callers cannot corrupt each other's
/// view.
#[derive(Debug, Clone)]
pub struct BitmapInfo {
    icon: Option<Arc<RgbaImage>>,
    color: u32,
    quality: IconQuality,
}

impl BitmapInfo {
    pub fn high_res(icon: RgbaImage, color: u32) -> Self {
        Self::from_shared(Arc::new(icon), color)
    }

    pub fn from_shared(icon: Arc<RgbaImage>, color: u32) -> Self {
        Self {
            icon: Some(icon),
            color,
            quality: IconQuality::High,
        }
    }

    pub fn low_res(color: u32) -> Self {
        Self {
            icon: None,
            color,
            quality: IconQuality::Low,
        }
    }

    pub fn icon(&self) -> Option<&RgbaImage> {
        self.icon.as_deref()
    }

    pub fn shared_icon(&self) -> Option<&Arc<RgbaImage>> {
        self.icon.as_ref()
    }

    /// Dominant colour as packed ARGB
    pub fn color(&self) -> u32 {
        self.color
    }

    pub fn quality(&self) -> IconQuality {
        self.quality
    }

    pub fn is_low_res(&self) -> bool {
        self.quality == IconQuality::Low
    }

    pub fn is_null_or_low_res(&self) -> bool {
        self.icon.is_none() || self.is_low_res()
    }
}

impl PartialEq for BitmapInfo {
    fn eq(&self, other: &Self) -> bool {
        if self.quality != other.quality || self.color != other.color {
            return false;
        }
        match (&self.icon, &other.icon) {
            (Some(a), Some(b)) => Arc::ptr_eq(a, b) || a == b,
            (None, None) => true,
            _ => false,
        }
    }
}

/// Pack RGBA channels into ARGB
pub fn pack_argb(rgba: [u8; 4]) -> u32 {
    let [r, g, b, a] = rgba;
    u32::from_be_bytes([a, r, g, b])
}

/// Unpack ARGB into RGBA channels
pub fn unpack_argb(argb: u32) -> [u8; 4] {
    let [a, r, g, b] = argb.to_be_bytes();
    [r, g, b, a]
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Rgba;

    #[test]
    fn quality_ordering() {
        assert!(IconQuality::High.satisfies(IconQuality::Low));
        assert!(IconQuality::High.satisfies(IconQuality::High));
        assert!(!IconQuality::Low.satisfies(IconQuality::High));
        assert_eq!(IconQuality::from_low_res(true), IconQuality::Low);
    }

    #[test]
    fn low_res_has_no_pixels() {
        let info = BitmapInfo::low_res(0xff00_ff00);
        assert!(info.is_null_or_low_res());
        assert!(info.icon().is_none());
        assert_eq!(info.color(), 0xff00_ff00);
    }

    #[test]
    fn equality_compares_pixels() {
        let a = BitmapInfo::high_res(RgbaImage::from_pixel(2, 2, Rgba([1, 2, 3, 255])), 7);
        let b = BitmapInfo::high_res(RgbaImage::from_pixel(2, 2, Rgba([1, 2, 3, 255])), 7);
        let c = BitmapInfo::high_res(RgbaImage::from_pixel(2, 2, Rgba([9, 2, 3, 255])), 7);
        assert_eq!(a, b);
        assert_ne!(a, c);
        assert_ne!(a, BitmapInfo::low_res(7));
    }

    #[test]
    fn argb_packing() {
        assert_eq!(pack_argb([0x11, 0x22, 0x33, 0xff]), 0xff11_2233);
        assert_eq!(unpack_argb(0xff11_2233), [0x11, 0x22, 0x33, 0xff]);
    }
}

//! Icon normalisation, default icons and badge composition

use crate::config::schema::IconsConfig;
use crate::model::bitmap::{pack_argb, unpack_argb};
use crate::model::{BitmapInfo, UserHandle};
use image::imageops::{self, FilterType};
use image::{Rgba, RgbaImage};
use parking_lot::Mutex;
use std::collections::HashMap;

const DEFAULT_ICON_COLOR: Rgba<u8> = Rgba([0x9e, 0x9e, 0x9e, 0xff]);
const WORK_BADGE_COLOR: Rgba<u8> = Rgba([0xff, 0x6d, 0x00, 0xff]);

/// Produces normalised icons, per-user default icons and badged composites
#[derive(Debug)]
pub struct IconFactory {
    icon_size: u32,
    badge_scale: f32,
    default_icons: Mutex<HashMap<UserHandle, BitmapInfo>>,
}

impl IconFactory {
    pub fn new(config: &IconsConfig) -> Self {
        Self {
            icon_size: config.icon_size.max(1),
            badge_scale: config.badge_scale.clamp(0.05, 1.0),
            default_icons: Mutex::new(HashMap::new()),
        }
    }

    /// Normalise a raw platform icon to the cache's icon size
    pub fn create_icon(&self, source: &RgbaImage) -> BitmapInfo {
        let icon = if source.dimensions() == (self.icon_size, self.icon_size) {
            source.clone()
        } else {
            imageops::resize(source, self.icon_size, self.icon_size, FilterType::Triangle)
        };
        let color = dominant_color(&icon);
        BitmapInfo::high_res(icon, color)
    }

    /// Placeholder icon for a user, memoized so identity checks are cheap
    pub fn default_icon(&self, user: UserHandle) -> BitmapInfo {
        let mut icons = self.default_icons.lock();
        icons
            .entry(user)
            .or_insert_with(|| self.render_default_icon(user))
            .clone()
    }

    /// Check if `bitmap` is the placeholder for `user`
    pub fn is_default_icon(&self, bitmap: &BitmapInfo, user: UserHandle) -> bool {
        let default = self.default_icon(user);
        if let (Some(a), Some(b)) = (bitmap.shared_icon(), default.shared_icon()) {
            if std::sync::Arc::ptr_eq(a, b) {
                return true;
            }
        }
        *bitmap == default
    }

    /// Composite `badge` into the bottom-right corner of `base`
    pub fn badge(&self, base: &BitmapInfo, badge: &BitmapInfo) -> BitmapInfo {
        let mut canvas = match base.icon() {
            Some(icon) => icon.clone(),
            None => solid(self.icon_size, self.icon_size, Rgba(unpack_argb(base.color()))),
        };
        let (width, height) = canvas.dimensions();

        let badge_size = ((width.min(height) as f32) * self.badge_scale).round().max(1.0) as u32;
        let badge_icon = match badge.icon() {
            Some(icon) => imageops::resize(icon, badge_size, badge_size, FilterType::Triangle),
            None => solid(badge_size, badge_size, Rgba(unpack_argb(badge.color()))),
        };

        imageops::overlay(
            &mut canvas,
            &badge_icon,
            i64::from(width - badge_size),
            i64::from(height - badge_size),
        );
        BitmapInfo::high_res(canvas, base.color())
    }

    fn render_default_icon(&self, user: UserHandle) -> BitmapInfo {
        let size = self.icon_size;
        let mut icon = RgbaImage::new(size, size);
        let center = (size as f32 - 1.0) / 2.0;
        let radius = size as f32 / 2.0;

        for (x, y, pixel) in icon.enumerate_pixels_mut() {
            let dx = x as f32 - center;
            let dy = y as f32 - center;
            if dx * dx + dy * dy <= radius * radius {
                *pixel = DEFAULT_ICON_COLOR;
            }
        }

        if !user.is_system() {
            let stripe = (size / 4).max(1);
            let badge = solid(stripe, stripe, WORK_BADGE_COLOR);
            imageops::overlay(
                &mut icon,
                &badge,
                i64::from(size - stripe),
                i64::from(size - stripe),
            );
        }

        let color = dominant_color(&icon);
        BitmapInfo::high_res(icon, color)
    }
}

fn solid(width: u32, height: u32, color: Rgba<u8>) -> RgbaImage {
    RgbaImage::from_pixel(width, height, color)
}

/// Average colour of the mostly-opaque pixels, packed as ARGB
fn dominant_color(icon: &RgbaImage) -> u32 {
    let (mut r, mut g, mut b, mut n) = (0u64, 0u64, 0u64, 0u64);
    for pixel in icon.pixels() {
        let [pr, pg, pb, pa] = pixel.0;
        if pa >= 128 {
            r += u64::from(pr);
            g += u64::from(pg);
            b += u64::from(pb);
            n += 1;
        }
    }
    if n == 0 {
        return 0;
    }
    pack_argb([(r / n) as u8, (g / n) as u8, (b / n) as u8, 0xff])
}

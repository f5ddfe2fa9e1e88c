//! Shortcut icons and badges

use crate::cache::engine::{CacheState, IconCache, Prefetch};
use crate::cache::logic::{CachingLogic, ShortcutCachingLogic};
use crate::model::{BitmapInfo, EntityKey, IconQuality, ItemInfoWithIcon};
use crate::platform::ShortcutInfo;
use tracing::debug;

impl IconCache {
    /// Assign the badged shortcut icon, keeping a real icon the item already
    /// shows over a default one.
    pub fn get_shortcut_icon(&self, item: &mut ItemInfoWithIcon, shortcut: &ShortcutInfo) {
        self.get_shortcut_icon_with(item, shortcut, |item| {
            self.is_using_fallback_or_non_default_icon(item)
        });
    }

    /// Like [`get_shortcut_icon`](Self::get_shortcut_icon) without the badge
    pub fn get_unbadged_shortcut_icon(&self, item: &mut ItemInfoWithIcon, shortcut: &ShortcutInfo) {
        let mut state = self.lock();
        self.shortcut_icon_locked(&mut state, item, shortcut, false, |item| {
            self.is_using_fallback_or_non_default_icon(item)
        });
    }

    /// Assign the badged shortcut icon.
    ///
    /// When the resolved icon is the default and `fallback_check` holds for
    /// the item, the item is left untouched.
    pub fn get_shortcut_icon_with<P>(
        &self,
        item: &mut ItemInfoWithIcon,
        shortcut: &ShortcutInfo,
        fallback_check: P,
    ) where
        P: FnOnce(&ItemInfoWithIcon) -> bool,
    {
        let mut state = self.lock();
        self.shortcut_icon_locked(&mut state, item, shortcut, true, fallback_check);
    }

    fn shortcut_icon_locked<P>(
        &self,
        state: &mut CacheState,
        item: &mut ItemInfoWithIcon,
        shortcut: &ShortcutInfo,
        badged: bool,
        fallback_check: P,
    ) where
        P: FnOnce(&ItemInfoWithIcon) -> bool,
    {
        let resolved = if self.shortcut_icon_cache {
            let key = EntityKey::new(shortcut.component(), shortcut.user);
            self.cache_locked(
                state,
                &key,
                &ShortcutCachingLogic,
                || Some(shortcut.clone()),
                false,
                IconQuality::High,
                Prefetch::NotQueried,
            )
            .bitmap
        } else {
            ShortcutCachingLogic.load_icon(&self.factory, shortcut)
        };

        let bitmap = match resolved {
            Some(bitmap) if !bitmap.is_null_or_low_res() => bitmap,
            _ => self.factory.default_icon(shortcut.user),
        };

        if self.factory.is_default_icon(&bitmap, shortcut.user) && fallback_check(item) {
            debug!("Keeping current icon for shortcut {}", shortcut.id);
            return;
        }

        item.bitmap = Some(if badged {
            let badge = self.shortcut_badge_locked(state, shortcut);
            self.factory.badge(&bitmap, &badge)
        } else {
            bitmap
        });
    }

    /// Badge source for a shortcut: its declared activity's icon, or the
    /// package icon when no activity is declared.
    pub fn get_shortcut_info_badge(&self, shortcut: &ShortcutInfo) -> BitmapInfo {
        let mut state = self.lock();
        self.shortcut_badge_locked(&mut state, shortcut)
    }

    fn shortcut_badge_locked(&self, state: &mut CacheState, shortcut: &ShortcutInfo) -> BitmapInfo {
        let mut source = match &shortcut.activity {
            Some(activity) => {
                let mut app = ItemInfoWithIcon::application(activity.clone(), shortcut.user);
                self.title_and_icon_locked(state, &mut app, IconQuality::High);
                app
            }
            None => {
                let mut package = ItemInfoWithIcon::package(&shortcut.package, shortcut.user);
                self.title_and_icon_for_app_locked(state, &mut package, IconQuality::High);
                package
            }
        };

        source
            .bitmap
            .take()
            .unwrap_or_else(|| self.factory.default_icon(shortcut.user))
    }
}

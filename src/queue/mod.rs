//! Background icon requests
//!
//! Foreground callers hand items to [`IconRequestQueue`], which resolves them
//! at high resolution on the [`ModelWorker`] and posts the updated item back
//! through the [`ForegroundHandle`]. While requests are pending the worker
//! runs at [`WorkerPriority::Foreground`].

pub mod foreground;
pub mod request;
pub mod worker;

pub use foreground::{ForegroundExecutor, ForegroundHandle};
pub use request::IconRequestHandle;
pub use worker::{ModelWorker, WorkerPriority};

use crate::cache::IconCache;
use crate::config::schema::WorkerConfig;
use crate::error::IconCacheResult;
use crate::model::{IconQuality, ItemInfoWithIcon};
use request::PendingGuard;
use std::sync::Arc;
use tracing::{debug, warn};

/// Destination for items refreshed in the background
pub trait ItemInfoUpdateReceiver: Send + Sync {
    fn reapply_item_info(&self, item: ItemInfoWithIcon);
}

impl<F> ItemInfoUpdateReceiver for F
where
    F: Fn(ItemInfoWithIcon) + Send + Sync,
{
    fn reapply_item_info(&self, item: ItemInfoWithIcon) {
        self(item)
    }
}

/// Queue of high-resolution icon upgrades
pub struct IconRequestQueue {
    cache: Arc<IconCache>,
    worker: ModelWorker,
    foreground: ForegroundHandle,
}

impl IconRequestQueue {
    /// Spawn the worker and bind delivery to `foreground`
    pub fn new(
        cache: Arc<IconCache>,
        foreground: ForegroundHandle,
        config: &WorkerConfig,
    ) -> IconCacheResult<Self> {
        Ok(Self {
            cache,
            worker: ModelWorker::spawn(config)?,
            foreground,
        })
    }

    pub fn cache(&self) -> &Arc<IconCache> {
        &self.cache
    }

    pub fn priority(&self) -> WorkerPriority {
        self.worker.priority()
    }

    /// Requests queued or awaiting delivery
    pub fn pending(&self) -> usize {
        self.worker.pending()
    }

    /// Resolve `item` at high resolution on the worker and hand it to
    /// `receiver` on the foreground thread.
    ///
    /// Must be called from the foreground thread.
    pub fn update_icon_in_background<R>(&self, receiver: R, item: ItemInfoWithIcon) -> IconRequestHandle
    where
        R: ItemInfoUpdateReceiver + 'static,
    {
        debug_assert!(
            self.foreground.is_current(),
            "icon requests must be queued from the foreground thread"
        );

        let handle = IconRequestHandle::new();
        let guard = PendingGuard::acquire(self.worker.gauge());
        let cache = Arc::clone(&self.cache);
        let foreground = self.foreground.clone();
        let request = handle.clone();

        let job = Box::new(move || {
            if request.is_cancelled() {
                debug!("Icon request cancelled before it ran");
                return;
            }

            let mut item = item;
            if item.is_package_item() {
                cache.get_title_and_icon_for_app(&mut item, IconQuality::High);
            } else {
                cache.get_title_and_icon(&mut item, IconQuality::High);
            }

            foreground.post(move || {
                let _guard = guard;
                if request.is_cancelled() {
                    debug!("Icon request cancelled before delivery");
                    return;
                }
                receiver.reapply_item_info(item);
            });
        });

        if let Err(e) = self.worker.submit(job) {
            warn!("Dropping icon request: {}", e);
        }
        handle
    }

    /// Run arbitrary cache work on the worker, behind queued requests
    pub fn execute<F>(&self, task: F) -> IconCacheResult<()>
    where
        F: FnOnce(&IconCache) + Send + 'static,
    {
        let cache = Arc::clone(&self.cache);
        self.worker.submit(Box::new(move || task(&cache)))
    }
}

//! Request handles

use crate::queue::worker::PriorityGauge;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// Cancellable handle for a queued icon request
#[derive(Debug, Clone)]
pub struct IconRequestHandle {
    cancelled: Arc<AtomicBool>,
}

impl IconRequestHandle {
    pub(crate) fn new() -> Self {
        Self {
            cancelled: Arc::new(AtomicBool::new(false)),
        }
    }

    /// Skip the remaining work and the delivery callback.
    ///
    /// Work already running on the worker is not interrupted; its result is
    /// discarded.
    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::SeqCst)
    }
}

/// Holds one unit of the pending gauge until dropped
pub(crate) struct PendingGuard {
    gauge: Arc<PriorityGauge>,
}

impl PendingGuard {
    pub(crate) fn acquire(gauge: &Arc<PriorityGauge>) -> Self {
        gauge.acquire();
        Self {
            gauge: Arc::clone(gauge),
        }
    }
}

impl Drop for PendingGuard {
    fn drop(&mut self) {
        self.gauge.release();
    }
}

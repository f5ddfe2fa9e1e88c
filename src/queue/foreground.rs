//! Foreground execution context
//!
//! The foreground thread owns a [`ForegroundExecutor`] and drains it from its
//! own loop. Other threads post closures through a [`ForegroundHandle`].

use std::thread::ThreadId;
use tokio::sync::mpsc;
use tracing::debug;

type Task = Box<dyn FnOnce() + Send + 'static>;

/// Task queue bound to the thread that created it
pub struct ForegroundExecutor {
    thread: ThreadId,
    sender: mpsc::UnboundedSender<Task>,
    receiver: mpsc::UnboundedReceiver<Task>,
}

impl ForegroundExecutor {
    /// Create an executor owned by the current thread
    pub fn new() -> Self {
        let (sender, receiver) = mpsc::unbounded_channel();
        Self {
            thread: std::thread::current().id(),
            sender,
            receiver,
        }
    }

    pub fn handle(&self) -> ForegroundHandle {
        ForegroundHandle {
            thread: self.thread,
            sender: self.sender.clone(),
        }
    }

    /// Run every task posted so far; returns how many ran
    pub fn run_pending(&mut self) -> usize {
        debug_assert!(self.is_owner(), "foreground tasks drained off-thread");
        let mut ran = 0;
        while let Ok(task) = self.receiver.try_recv() {
            task();
            ran += 1;
        }
        ran
    }

    /// Wait for the next posted task and run it
    pub async fn run_next(&mut self) {
        debug_assert!(self.is_owner(), "foreground tasks drained off-thread");
        if let Some(task) = self.receiver.recv().await {
            task();
        }
    }

    fn is_owner(&self) -> bool {
        std::thread::current().id() == self.thread
    }
}

impl Default for ForegroundExecutor {
    fn default() -> Self {
        Self::new()
    }
}

/// Cloneable handle for posting work to the foreground thread
#[derive(Clone)]
pub struct ForegroundHandle {
    thread: ThreadId,
    sender: mpsc::UnboundedSender<Task>,
}

impl ForegroundHandle {
    /// Post a task; returns false if the executor is gone
    pub fn post<F>(&self, task: F) -> bool
    where
        F: FnOnce() + Send + 'static,
    {
        if self.sender.send(Box::new(task)).is_err() {
            debug!("Foreground executor dropped, discarding task");
            return false;
        }
        true
    }

    /// Check if the calling thread is the foreground thread
    pub fn is_current(&self) -> bool {
        std::thread::current().id() == self.thread
    }
}

impl std::fmt::Debug for ForegroundHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ForegroundHandle")
            .field("thread", &self.thread)
            .finish()
    }
}

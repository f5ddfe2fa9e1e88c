//! Dedicated model worker thread
//!
//! All deferred cache work runs on one named thread. Its scheduling priority
//! follows a pending-request gauge: raised while foreground callers are
//! waiting, lowered once the gauge drains.

use crate::config::schema::WorkerConfig;
use crate::error::{IconCacheError, IconCacheResult};
use parking_lot::Mutex;
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::Arc;
use std::thread::JoinHandle;
use tokio::sync::mpsc;
use tracing::{debug, trace, warn};

pub(crate) type Job = Box<dyn FnOnce() + Send + 'static>;

/// Scheduling hint for the worker thread
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum WorkerPriority {
    #[default]
    Background,
    Foreground,
}

impl std::fmt::Display for WorkerPriority {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            WorkerPriority::Background => write!(f, "background"),
            WorkerPriority::Foreground => write!(f, "foreground"),
        }
    }
}

#[derive(Debug, Default)]
struct GaugeState {
    pending: usize,
    priority: WorkerPriority,
    /// Kernel thread id of the worker, once it has started
    tid: Option<i32>,
}

/// Pending-request counter driving the worker priority
#[derive(Debug)]
pub(crate) struct PriorityGauge {
    state: Mutex<GaugeState>,
    apply_os_priority: bool,
    foreground_nice: i32,
    background_nice: i32,
}

impl PriorityGauge {
    pub(crate) fn new(config: &WorkerConfig) -> Self {
        Self {
            state: Mutex::new(GaugeState::default()),
            apply_os_priority: config.apply_os_priority,
            foreground_nice: config.foreground_nice,
            background_nice: config.background_nice,
        }
    }

    /// Count one more pending request; the first raises the priority
    pub(crate) fn acquire(&self) {
        let mut state = self.state.lock();
        state.pending += 1;
        if state.pending == 1 {
            self.set_priority(&mut state, WorkerPriority::Foreground);
        }
    }

    /// Count one request as done; the last lowers the priority
    pub(crate) fn release(&self) {
        let mut state = self.state.lock();
        state.pending = state.pending.saturating_sub(1);
        if state.pending == 0 {
            self.set_priority(&mut state, WorkerPriority::Background);
        }
    }

    pub(crate) fn pending(&self) -> usize {
        self.state.lock().pending
    }

    pub(crate) fn priority(&self) -> WorkerPriority {
        self.state.lock().priority
    }

    fn register_worker_thread(&self) {
        if !self.apply_os_priority {
            return;
        }
        let mut state = self.state.lock();
        state.tid = current_tid();
        let priority = state.priority;
        self.apply_os(&state, priority);
    }

    fn set_priority(&self, state: &mut GaugeState, priority: WorkerPriority) {
        if state.priority == priority {
            return;
        }
        trace!("Worker priority {} -> {}", state.priority, priority);
        state.priority = priority;
        if self.apply_os_priority {
            self.apply_os(state, priority);
        }
    }

    fn apply_os(&self, state: &GaugeState, priority: WorkerPriority) {
        let Some(tid) = state.tid else {
            return;
        };
        let nice = match priority {
            WorkerPriority::Foreground => self.foreground_nice,
            WorkerPriority::Background => self.background_nice,
        };
        if let Err(e) = set_thread_nice(tid, nice) {
            debug!("Failed to set worker nice value to {}: {}", nice, e);
        }
    }
}

#[cfg(target_os = "linux")]
fn current_tid() -> Option<i32> {
    // SAFETY: gettid has no preconditions
    let tid = unsafe { libc::syscall(libc::SYS_gettid) };
    i32::try_from(tid).ok().filter(|tid| *tid > 0)
}

#[cfg(not(target_os = "linux"))]
fn current_tid() -> Option<i32> {
    None
}

#[cfg(target_os = "linux")]
fn set_thread_nice(tid: i32, nice: i32) -> std::io::Result<()> {
    // SAFETY: PRIO_PROCESS with a thread id only changes that thread's nice value
    let rc = unsafe { libc::setpriority(libc::PRIO_PROCESS, tid as libc::id_t, nice) };
    if rc == 0 {
        Ok(())
    } else {
        Err(std::io::Error::last_os_error())
    }
}

#[cfg(not(target_os = "linux"))]
fn set_thread_nice(_tid: i32, _nice: i32) -> std::io::Result<()> {
    Ok(())
}

/// Single background thread executing queued jobs in order
pub struct ModelWorker {
    sender: Option<mpsc::UnboundedSender<Job>>,
    thread: Option<JoinHandle<()>>,
    gauge: Arc<PriorityGauge>,
    name: String,
}

impl ModelWorker {
    /// Spawn the worker thread
    pub fn spawn(config: &WorkerConfig) -> IconCacheResult<Self> {
        let (sender, mut receiver) = mpsc::unbounded_channel::<Job>();
        let gauge = Arc::new(PriorityGauge::new(config));
        let thread_gauge = Arc::clone(&gauge);

        let thread = std::thread::Builder::new()
            .name(config.thread_name.clone())
            .spawn(move || {
                thread_gauge.register_worker_thread();
                while let Some(job) = receiver.blocking_recv() {
                    if catch_unwind(AssertUnwindSafe(job)).is_err() {
                        warn!("Icon worker job panicked");
                    }
                }
                debug!("Icon worker stopped");
            })
            .map_err(|e| IconCacheError::io("spawning icon worker thread", e))?;

        debug!("Spawned icon worker '{}'", config.thread_name);
        Ok(Self {
            sender: Some(sender),
            thread: Some(thread),
            gauge,
            name: config.thread_name.clone(),
        })
    }

    /// Queue a job behind everything already submitted
    pub(crate) fn submit(&self, job: Job) -> IconCacheResult<()> {
        self.sender
            .as_ref()
            .ok_or_else(|| IconCacheError::WorkerUnavailable(self.name.clone()))?
            .send(job)
            .map_err(|_| IconCacheError::WorkerUnavailable(self.name.clone()))
    }

    pub(crate) fn gauge(&self) -> &Arc<PriorityGauge> {
        &self.gauge
    }

    pub fn priority(&self) -> WorkerPriority {
        self.gauge.priority()
    }

    /// Requests counted but not yet delivered
    pub fn pending(&self) -> usize {
        self.gauge.pending()
    }

    /// Stop accepting jobs, finish queued ones and join the thread
    pub fn shutdown(&mut self) {
        self.sender.take();
        if let Some(thread) = self.thread.take() {
            if thread.join().is_err() {
                warn!("Icon worker thread panicked");
            }
        }
    }
}

impl Drop for ModelWorker {
    fn drop(&mut self) {
        self.shutdown();
    }
}

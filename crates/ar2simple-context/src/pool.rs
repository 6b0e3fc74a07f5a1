//! Lane worker pool.
//!
//! Each worker slot owns one OS thread and a private bounded(1) wake
//! channel. A worker blocks on its channel, runs the received lane
//! function, marks itself idle in the shared [`ReadinessTracker`], and goes
//! back to waiting. An `Exit` task (or a disconnected channel) ends the
//! loop.
//!
//! A lane function that panics is caught on the worker. The panic is
//! recorded as a sticky [`SlotFault`] on the slot, the slot is marked idle
//! so barriers still complete, and the worker exits. Every later dispatch
//! to that slot and every later [`join`](WorkerPool::join) reports the same
//! fault.

use std::any::Any;
use std::io;
use std::panic::{self, AssertUnwindSafe};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, OnceLock};
use std::thread::{self, JoinHandle};

use ar2simple_core::{Job, PoolError, SlotFault};
use crossbeam_channel::{bounded, Receiver, Sender};

use crate::config::ContextConfig;
use crate::readiness::{ReadinessTracker, ReadyThreads};

/// The body a spawned worker thread runs.
pub(crate) type WorkerBody = Box<dyn FnOnce() + Send + 'static>;

pub(crate) enum Task {
    Run(Job),
    Exit,
}

// ── Shared state ────────────────────────────────────────────────

struct Shared {
    tracker: ReadinessTracker,
    faults: Box<[OnceLock<SlotFault>]>,
    live: AtomicUsize,
}

impl Shared {
    fn new(slots: usize) -> Self {
        Self {
            tracker: ReadinessTracker::new(slots),
            faults: (0..slots).map(|_| OnceLock::new()).collect(),
            live: AtomicUsize::new(0),
        }
    }

    /// Store `fault` unless one is already recorded; returns the stored one.
    fn record_fault(&self, index: usize, fault: SlotFault) -> SlotFault {
        let cell = &self.faults[index];
        if cell.set(fault.clone()).is_ok() {
            tracing::warn!(worker = index, %fault, "worker slot faulted");
        }
        cell.get().cloned().unwrap_or(fault)
    }

    fn fault(&self, index: usize) -> Option<&SlotFault> {
        self.faults.get(index).and_then(OnceLock::get)
    }
}

struct LiveGuard<'a>(&'a AtomicUsize);

impl<'a> LiveGuard<'a> {
    fn enter(counter: &'a AtomicUsize) -> Self {
        counter.fetch_add(1, Ordering::AcqRel);
        Self(counter)
    }
}

impl Drop for LiveGuard<'_> {
    fn drop(&mut self) {
        self.0.fetch_sub(1, Ordering::AcqRel);
    }
}

pub(crate) fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "non-string panic payload".to_string()
    }
}

fn worker_loop(index: usize, wake: Receiver<Task>, shared: Arc<Shared>) {
    let _live = LiveGuard::enter(&shared.live);
    tracing::trace!(worker = index, "worker started");
    while let Ok(task) = wake.recv() {
        let job = match task {
            Task::Run(job) => job,
            Task::Exit => break,
        };
        let panicked = panic::catch_unwind(AssertUnwindSafe(|| job.run())).err();
        if let Some(payload) = &panicked {
            shared.record_fault(
                index,
                SlotFault::Panicked {
                    message: panic_message(payload.as_ref()),
                },
            );
        }
        if shared.tracker.mark_idle(index).is_err() {
            shared.record_fault(index, SlotFault::LockPoisoned);
            break;
        }
        if panicked.is_some() {
            break;
        }
    }
    tracing::trace!(worker = index, "worker exiting");
}

// ── WorkerPool ──────────────────────────────────────────────────

struct WorkerSlot {
    wake: Sender<Task>,
    thread: Option<JoinHandle<()>>,
}

/// A fixed-size pool of lane workers.
///
/// Created empty (no slots) or with `n` workers. Dropping the pool shuts it
/// down; call [`shutdown`](Self::shutdown) directly to observe errors.
pub struct WorkerPool {
    slots: Vec<WorkerSlot>,
    shared: Arc<Shared>,
}

impl WorkerPool {
    /// A pool with no workers. Readiness queries return nothing.
    pub fn empty() -> Self {
        Self {
            slots: Vec::new(),
            shared: Arc::new(Shared::new(0)),
        }
    }

    /// Spawn `count` named worker threads.
    ///
    /// If any thread fails to start, the workers already started are shut
    /// down and joined before the error is returned.
    pub fn spawn(count: usize, config: &ContextConfig) -> Result<Self, PoolError> {
        let prefix = config.thread_name_prefix.as_str();
        let stack_size = config.stack_size;
        Self::spawn_with(count, |index, body| {
            let mut builder = thread::Builder::new().name(format!("{prefix}-{index}"));
            if let Some(size) = stack_size {
                builder = builder.stack_size(size);
            }
            builder.spawn(body)
        })
    }

    /// Spawn `count` workers through a caller-supplied thread spawner.
    pub(crate) fn spawn_with<F>(count: usize, mut spawner: F) -> Result<Self, PoolError>
    where
        F: FnMut(usize, WorkerBody) -> io::Result<JoinHandle<()>>,
    {
        let shared = Arc::new(Shared::new(count));
        let mut slots = Vec::with_capacity(count);
        for index in 0..count {
            let (wake, inbox) = bounded(1);
            let worker_shared = Arc::clone(&shared);
            let body: WorkerBody = Box::new(move || worker_loop(index, inbox, worker_shared));
            match spawner(index, body) {
                Ok(handle) => slots.push(WorkerSlot {
                    wake,
                    thread: Some(handle),
                }),
                Err(e) => {
                    tracing::warn!(
                        worker = index,
                        requested = count,
                        error = %e,
                        "worker spawn failed, unwinding pool"
                    );
                    let mut partial = Self { slots, shared };
                    if let Err(unwind) = partial.shutdown() {
                        tracing::warn!(error = %unwind, "error while unwinding partial pool");
                    }
                    return Err(PoolError::ThreadSpawn {
                        index,
                        os_code: e.raw_os_error(),
                        reason: e.to_string(),
                    });
                }
            }
        }
        tracing::debug!(workers = count, "worker pool started");
        Ok(Self { slots, shared })
    }

    /// Number of worker slots.
    pub fn len(&self) -> usize {
        self.slots.len()
    }

    /// Whether the pool has no workers.
    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    /// Number of worker threads currently inside their run loop.
    pub fn live_workers(&self) -> usize {
        self.shared.live.load(Ordering::Acquire)
    }

    /// The sticky fault recorded on `index`, if any.
    pub fn fault(&self, index: usize) -> Option<SlotFault> {
        self.shared.fault(index).cloned()
    }

    /// Whether slot `index` is currently idle.
    pub fn is_idle(&self, index: usize) -> bool {
        index < self.slots.len() && self.shared.tracker.is_idle(index)
    }

    /// Block until some workers are idle and unclaimed; claim and return up
    /// to `max_count` of them. Empty pools return an empty list at once.
    pub fn ready(&self, max_count: usize) -> Result<ReadyThreads, PoolError> {
        self.shared.tracker.wait_ready(max_count)
    }

    /// Hand `job` to worker `index`. The worker must have been returned by
    /// [`ready`](Self::ready) and not dispatched to since.
    pub fn run(&self, index: usize, job: Job) -> Result<(), PoolError> {
        self.dispatch(index, Task::Run(job))
    }

    /// Block until every worker is idle, then reset all claims. Reports the
    /// lowest-indexed sticky fault, if any slot has one.
    pub fn join(&self) -> Result<(), PoolError> {
        self.shared.tracker.wait_all()?;
        match self.first_fault() {
            Some((index, fault)) => Err(PoolError::Slot { index, fault }),
            None => Ok(()),
        }
    }

    /// Wait for in-flight work, stop every worker, and join the threads.
    ///
    /// Idempotent: a second call, or a call on an empty pool, is a no-op.
    /// Threads are always joined, even when an error is returned.
    pub fn shutdown(&mut self) -> Result<(), PoolError> {
        if self.slots.is_empty() {
            return Ok(());
        }
        let mut first_err = self.shared.tracker.wait_all().err();
        for index in 0..self.slots.len() {
            if self.shared.fault(index).is_some() {
                continue;
            }
            if let Err(e) = self.dispatch(index, Task::Exit) {
                first_err.get_or_insert(e);
            }
        }
        let workers = self.slots.len();
        for (index, slot) in self.slots.drain(..).enumerate() {
            // Closing the channel also stops a worker that missed its Exit.
            drop(slot.wake);
            if let Some(handle) = slot.thread {
                if handle.join().is_err() {
                    tracing::warn!(worker = index, "worker thread panicked outside a lane");
                }
            }
        }
        tracing::debug!(workers, "worker pool shut down");
        match first_err {
            Some(e) => Err(e),
            None => Ok(()),
        }
    }

    fn first_fault(&self) -> Option<(usize, SlotFault)> {
        (0..self.slots.len())
            .find_map(|index| self.shared.fault(index).map(|f| (index, f.clone())))
    }

    fn dispatch(&self, index: usize, task: Task) -> Result<(), PoolError> {
        let slot = self.slots.get(index).ok_or(PoolError::IndexOutOfRange {
            index,
            slots: self.slots.len(),
        })?;
        if let Some(fault) = self.shared.fault(index) {
            return Err(PoolError::Slot {
                index,
                fault: fault.clone(),
            });
        }
        self.shared.tracker.mark_busy(index)?;
        if slot.wake.send(task).is_err() {
            let fault = self.shared.record_fault(index, SlotFault::WorkerGone);
            self.shared.tracker.mark_idle(index)?;
            return Err(PoolError::Slot { index, fault });
        }
        Ok(())
    }
}

impl Drop for WorkerPool {
    fn drop(&mut self) {
        if let Err(e) = self.shutdown() {
            tracing::warn!(error = %e, "worker pool shutdown during drop reported an error");
        }
    }
}

impl std::fmt::Debug for WorkerPool {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WorkerPool")
            .field("slots", &self.slots.len())
            .field("live", &self.live_workers())
            .finish()
    }
}

// Compile-time assertion: the pool can move into a context owned by
// another thread (the C ABI keeps contexts behind a global lock).
const _: () = {
    fn _assert_send<T: Send>() {}
    fn _check() {
        _assert_send::<WorkerPool>();
    }
};

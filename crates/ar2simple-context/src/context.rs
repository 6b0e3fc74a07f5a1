//! The execution-context facade an Argon2 engine calls back into.

use std::error::Error;
use std::fmt;

use ar2simple_alloc::{AllocError, SecureAllocator, SecureBuf};
use ar2simple_core::{Job, PoolError, SlotFault};

use crate::config::{ConfigError, ContextConfig};
use crate::cpu::{self, CpuCounter, OsCpus, Parallelism};
use crate::pool::WorkerPool;
use crate::readiness::ReadyThreads;

/// The seven callbacks an Argon2 engine drives a hashing operation with.
///
/// The expected call sequence for one operation is:
///
/// 1. `init_thread_pool(lanes)` once;
/// 2. per segment: `get_ready_threads` / `run_thread` until every lane is
///    dispatched, then `join_thread_pool`;
/// 3. `destroy_thread_pool` once.
///
/// `allocate` and `deallocate` may be called at any point in between.
pub trait ExecutionContext {
    /// Size the worker pool for `desired_threads` lanes. Returns the number
    /// of workers created; `0` means lanes run on the calling thread.
    fn init_thread_pool(&mut self, desired_threads: usize) -> Result<usize, ContextError>;

    /// Block until at least one worker is ready, then claim and return up
    /// to `max_count` ready worker indices. With no pool, returns nothing.
    fn get_ready_threads(&mut self, max_count: usize) -> Result<ReadyThreads, ContextError>;

    /// Dispatch `job` to a worker previously returned by
    /// [`get_ready_threads`](Self::get_ready_threads).
    fn run_thread(&mut self, index: usize, job: Job) -> Result<(), ContextError>;

    /// Block until every worker is idle; the barrier between segments.
    fn join_thread_pool(&mut self) -> Result<(), ContextError>;

    /// Stop and join all workers. A no-op when no pool exists.
    fn destroy_thread_pool(&mut self) -> Result<(), ContextError>;

    /// Zeroed buffer of `count * element_size` bytes aligned to at least
    /// `alignment` (`0` means the platform default).
    fn allocate(
        &mut self,
        count: usize,
        element_size: usize,
        alignment: usize,
    ) -> Result<SecureBuf, ContextError>;

    /// Erase and release a buffer from [`allocate`](Self::allocate).
    fn deallocate(&mut self, buf: SecureBuf);
}

/// Errors surfaced through [`ExecutionContext`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ContextError {
    /// Worker pool lifecycle or dispatch failure.
    Pool(PoolError),
    /// Secure allocation failure.
    Alloc(AllocError),
}

impl ContextError {
    /// The OS-style error number for this error.
    pub fn os_code(&self) -> i32 {
        match self {
            Self::Pool(e) => e.os_code(),
            Self::Alloc(e) => e.os_code(),
        }
    }
}

impl fmt::Display for ContextError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Pool(e) => write!(f, "thread pool: {e}"),
            Self::Alloc(e) => write!(f, "allocation: {e}"),
        }
    }
}

impl Error for ContextError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Pool(e) => Some(e),
            Self::Alloc(e) => Some(e),
        }
    }
}

impl From<PoolError> for ContextError {
    fn from(e: PoolError) -> Self {
        Self::Pool(e)
    }
}

impl From<AllocError> for ContextError {
    fn from(e: AllocError) -> Self {
        Self::Alloc(e)
    }
}

/// The default execution context: OS threads plus the secure allocator.
pub struct Context {
    config: ContextConfig,
    cpus: Box<dyn CpuCounter>,
    allocator: SecureAllocator,
    pool: WorkerPool,
}

impl Context {
    /// Build a context from a validated configuration.
    pub fn new(config: ContextConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self {
            config,
            cpus: Box::new(OsCpus),
            allocator: SecureAllocator::new(),
            pool: WorkerPool::empty(),
        })
    }

    /// Replace the processor counter.
    pub fn with_cpus(mut self, cpus: impl CpuCounter + 'static) -> Self {
        self.cpus = Box::new(cpus);
        self
    }

    /// Replace the allocator.
    pub fn with_allocator(mut self, allocator: SecureAllocator) -> Self {
        self.allocator = allocator;
        self
    }

    /// The active configuration.
    pub fn config(&self) -> &ContextConfig {
        &self.config
    }

    /// Number of workers in the current pool (`0` when inline).
    pub fn thread_count(&self) -> usize {
        self.pool.len()
    }

    /// Number of worker threads currently alive.
    pub fn live_workers(&self) -> usize {
        self.pool.live_workers()
    }

    /// Whether worker `index` is idle.
    pub fn is_idle(&self, index: usize) -> bool {
        self.pool.is_idle(index)
    }

    /// The sticky fault recorded on worker `index`, if any.
    pub fn slot_fault(&self, index: usize) -> Option<SlotFault> {
        self.pool.fault(index)
    }
}

impl Default for Context {
    fn default() -> Self {
        Self {
            config: ContextConfig::default(),
            cpus: Box::new(OsCpus),
            allocator: SecureAllocator::new(),
            pool: WorkerPool::empty(),
        }
    }
}

impl fmt::Debug for Context {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Context")
            .field("config", &self.config)
            .field("pool", &self.pool)
            .finish_non_exhaustive()
    }
}

impl ExecutionContext for Context {
    fn init_thread_pool(&mut self, desired_threads: usize) -> Result<usize, ContextError> {
        if !self.pool.is_empty() {
            tracing::debug!("replacing existing worker pool");
            self.destroy_thread_pool()?;
        }
        let usable = cpu::usable_cpus(self.cpus.as_ref(), desired_threads, &self.config);
        match Parallelism::resolve(desired_threads, usable) {
            Parallelism::Inline => {
                tracing::debug!(desired_threads, usable, "running lanes inline");
                Ok(0)
            }
            Parallelism::Threads(n) => {
                self.pool = WorkerPool::spawn(n, &self.config)?;
                tracing::debug!(desired_threads, usable, workers = n, "thread pool ready");
                Ok(n)
            }
        }
    }

    fn get_ready_threads(&mut self, max_count: usize) -> Result<ReadyThreads, ContextError> {
        Ok(self.pool.ready(max_count)?)
    }

    fn run_thread(&mut self, index: usize, job: Job) -> Result<(), ContextError> {
        Ok(self.pool.run(index, job)?)
    }

    fn join_thread_pool(&mut self) -> Result<(), ContextError> {
        Ok(self.pool.join()?)
    }

    fn destroy_thread_pool(&mut self) -> Result<(), ContextError> {
        let result = self.pool.shutdown();
        self.pool = WorkerPool::empty();
        Ok(result?)
    }

    fn allocate(
        &mut self,
        count: usize,
        element_size: usize,
        alignment: usize,
    ) -> Result<SecureBuf, ContextError> {
        Ok(self.allocator.allocate(count, element_size, alignment)?)
    }

    fn deallocate(&mut self, buf: SecureBuf) {
        self.allocator.deallocate(buf);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cpu::FixedCpus;
    use ar2simple_alloc::RetainingArena;

    fn ctx(cpus: usize) -> Context {
        Context::default().with_cpus(FixedCpus(cpus))
    }

    #[test]
    fn invalid_config_rejected() {
        let config = ContextConfig {
            max_threads: 0,
            ..ContextConfig::default()
        };
        assert_eq!(Context::new(config).err(), Some(ConfigError::MaxThreadsZero));
    }

    #[test]
    fn degenerate_requests_run_inline() {
        let mut c = ctx(8);
        assert_eq!(c.init_thread_pool(0).unwrap(), 0);
        assert_eq!(c.init_thread_pool(1).unwrap(), 0);
        assert!(c.get_ready_threads(4).unwrap().is_empty());
        c.join_thread_pool().unwrap();
        c.destroy_thread_pool().unwrap();
        assert_eq!(c.live_workers(), 0);
    }

    #[test]
    fn single_cpu_runs_inline() {
        let mut c = ctx(1);
        assert_eq!(c.init_thread_pool(8).unwrap(), 0);
        assert_eq!(c.thread_count(), 0);
    }

    #[test]
    fn pool_sized_to_usable_cpus() {
        let mut c = ctx(4);
        assert_eq!(c.init_thread_pool(16).unwrap(), 4);
        assert_eq!(c.thread_count(), 4);
        c.destroy_thread_pool().unwrap();
        assert_eq!(c.thread_count(), 0);
        assert_eq!(c.live_workers(), 0);
    }

    #[test]
    fn reinit_replaces_pool() {
        let mut c = ctx(8);
        assert_eq!(c.init_thread_pool(6).unwrap(), 6);
        assert_eq!(c.init_thread_pool(3).unwrap(), 3);
        assert_eq!(c.thread_count(), 3);
        c.destroy_thread_pool().unwrap();
        assert_eq!(c.live_workers(), 0);
    }

    #[test]
    fn allocation_goes_through_configured_allocator() {
        let arena = RetainingArena::new();
        let mut c = ctx(2).with_allocator(SecureAllocator::with_source(arena.clone()));
        let buf = c.allocate(16, 64, 64).unwrap();
        assert_eq!(buf.len(), 1024);
        assert_eq!(buf.as_ptr() as usize % 64, 0);
        assert_eq!(arena.live_allocations(), 1);
        c.deallocate(buf);
        assert_eq!(arena.live_allocations(), 0);
    }

    #[test]
    fn allocation_errors_carry_os_codes() {
        let mut c = ctx(2);
        let err = c.allocate(usize::MAX, 2, 0).unwrap_err();
        assert_eq!(err.os_code(), ar2simple_core::errno::ENOMEM);
        let err = c.allocate(1, 1, 3).unwrap_err();
        assert_eq!(err.os_code(), ar2simple_core::errno::EINVAL);
    }
}

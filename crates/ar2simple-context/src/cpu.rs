//! Usable-parallelism detection.
//!
//! The chain is: online processor count from the OS; failing that, count
//! per-processor entries `0, 1, …` until the first missing one (bounded by
//! the desired thread count); failing that, the configured fallback. The
//! result is clamped to the configured thread ceiling.

use crate::config::ContextConfig;

/// Source of processor-count information.
pub trait CpuCounter: Send + Sync {
    /// Number of online processors, if the OS reports a positive one.
    fn online(&self) -> Option<usize>;

    /// Whether the processor with identifier `id` is exposed by the OS.
    fn processor_present(&self, id: usize) -> bool;
}

/// Queries the running operating system.
#[derive(Clone, Copy, Debug, Default)]
pub struct OsCpus;

impl CpuCounter for OsCpus {
    fn online(&self) -> Option<usize> {
        std::thread::available_parallelism()
            .ok()
            .map(|n| n.get())
    }

    #[cfg(target_os = "linux")]
    fn processor_present(&self, id: usize) -> bool {
        std::path::Path::new(&format!("/sys/devices/system/cpu/cpu{id}")).exists()
    }

    #[cfg(not(target_os = "linux"))]
    fn processor_present(&self, _id: usize) -> bool {
        false
    }
}

/// A machine with a fixed processor count. `FixedCpus(0)` reports nothing,
/// which forces the configured fallback.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct FixedCpus(pub usize);

impl CpuCounter for FixedCpus {
    fn online(&self) -> Option<usize> {
        (self.0 > 0).then_some(self.0)
    }

    fn processor_present(&self, id: usize) -> bool {
        id < self.0
    }
}

/// Number of processors usable for a request of `desired` threads.
pub fn usable_cpus(machine: &dyn CpuCounter, desired: usize, config: &ContextConfig) -> usize {
    let mut count = machine.online().unwrap_or(0);
    if count == 0 {
        count = (0..desired)
            .take_while(|&id| machine.processor_present(id))
            .count();
    }
    if count == 0 {
        count = config.fallback_cpus;
    }
    count.min(config.max_threads)
}

/// How a hashing operation should run.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Parallelism {
    /// Run every lane on the calling thread; no pool is created.
    Inline,
    /// Create a pool of exactly this many workers (always at least 2).
    Threads(usize),
}

impl Parallelism {
    /// Decide between inline execution and a pool of
    /// `min(desired, usable)` workers.
    pub fn resolve(desired: usize, usable: usize) -> Self {
        let n = desired.min(usable);
        if n < 2 {
            Self::Inline
        } else {
            Self::Threads(n)
        }
    }
}

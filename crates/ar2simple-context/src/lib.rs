//! Execution context that an external Argon2 engine calls back into.
//!
//! The engine drives everything through the seven entry points of
//! [`ExecutionContext`]: it sizes a worker pool, repeatedly asks for ready
//! workers and dispatches one lane function to each, waits at a barrier,
//! tears the pool down, and allocates all of its memory through the
//! secure allocator.
//!
//! # Architecture
//!
//! ```text
//! Context (facade, implements ExecutionContext)
//! ├── CpuCounter → usable_cpus → Parallelism (Inline | Threads(n))
//! ├── SecureAllocator (ar2simple-alloc)
//! └── WorkerPool
//!     ├── WorkerSlot × n (thread + private wake channel)
//!     └── Shared
//!         ├── ReadinessTracker (idle/claimed bitmasks + idle semaphore)
//!         └── sticky faults (one write-once cell per slot)
//! ```

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

pub mod config;
pub mod context;
pub mod cpu;
pub mod engine;
pub mod pool;
pub mod readiness;
mod semaphore;

pub use config::{ConfigError, ContextConfig};
pub use context::{Context, ContextError, ExecutionContext};
pub use cpu::{CpuCounter, FixedCpus, OsCpus, Parallelism};
pub use engine::{dispatch_lanes, Argon2Engine, EngineError};
pub use pool::WorkerPool;
pub use readiness::{ReadinessTracker, ReadyThreads};

//! Error types shared across the execution context.
//!
//! [`PoolError`] covers everything the worker pool and readiness tracker
//! can report; [`SlotFault`] is the sticky per-worker fault stored on a
//! slot; [`ParamError`] is returned by [`Argon2Params::validate`].
//!
//! [`Argon2Params::validate`]: crate::Argon2Params::validate

use std::error::Error;
use std::fmt;

use crate::errno;

/// A fault recorded on a single worker slot.
///
/// Once recorded the fault is permanent: the slot is never dispatched to
/// again and every later access reports this exact value.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum SlotFault {
    /// The lane function panicked while running on the worker.
    Panicked {
        /// Panic payload rendered as text, if it was a string.
        message: String,
    },
    /// The worker thread is no longer receiving tasks.
    WorkerGone,
    /// The worker could not publish its idle state because the
    /// coordination lock was poisoned.
    LockPoisoned,
}

impl SlotFault {
    /// The OS-style error number for this fault.
    pub fn os_code(&self) -> i32 {
        match self {
            Self::Panicked { .. } => errno::ENOTRECOVERABLE,
            Self::WorkerGone => errno::ESRCH,
            Self::LockPoisoned => errno::EOWNERDEAD,
        }
    }
}

impl fmt::Display for SlotFault {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Panicked { message } => write!(f, "lane function panicked: {message}"),
            Self::WorkerGone => write!(f, "worker thread is gone"),
            Self::LockPoisoned => write!(f, "coordination lock poisoned"),
        }
    }
}

impl Error for SlotFault {}

/// Errors from worker pool lifecycle and dispatch.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum PoolError {
    /// A worker thread could not be created. The pool was unwound.
    ThreadSpawn {
        /// Index of the slot whose thread failed to start.
        index: usize,
        /// Raw OS error from the spawn attempt, if the OS reported one.
        os_code: Option<i32>,
        /// Human-readable description of the failure.
        reason: String,
    },
    /// A slot carries a sticky fault.
    Slot {
        /// Index of the faulted slot.
        index: usize,
        /// The recorded fault.
        fault: SlotFault,
    },
    /// A slot index outside `0..slots` was passed in.
    IndexOutOfRange {
        /// The rejected index.
        index: usize,
        /// Number of slots in the pool.
        slots: usize,
    },
    /// The coordination lock guarding the readiness bitmasks is poisoned.
    LockPoisoned,
    /// The idle-availability signal was closed while waiting on it.
    SignalClosed,
}

impl PoolError {
    /// The OS-style error number for this error.
    pub fn os_code(&self) -> i32 {
        match self {
            Self::ThreadSpawn { os_code, .. } => os_code.unwrap_or(errno::EAGAIN),
            Self::Slot { fault, .. } => fault.os_code(),
            Self::IndexOutOfRange { .. } => errno::EINVAL,
            Self::LockPoisoned => errno::EOWNERDEAD,
            Self::SignalClosed => errno::EIDRM,
        }
    }
}

impl fmt::Display for PoolError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ThreadSpawn { index, reason, .. } => {
                write!(f, "failed to spawn worker {index}: {reason}")
            }
            Self::Slot { index, fault } => write!(f, "worker {index} faulted: {fault}"),
            Self::IndexOutOfRange { index, slots } => {
                write!(f, "worker index {index} out of range for {slots} slots")
            }
            Self::LockPoisoned => write!(f, "readiness lock poisoned"),
            Self::SignalClosed => write!(f, "idle signal closed"),
        }
    }
}

impl Error for PoolError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Slot { fault, .. } => Some(fault),
            _ => None,
        }
    }
}

/// Hashing parameters outside the ranges Argon2 accepts.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ParamError {
    /// Lane count is zero or above `2^24 - 1`.
    LanesOutOfRange {
        /// The configured lane count.
        lanes: u32,
    },
    /// Memory cost is below `8 * lanes` KiB.
    MemoryTooSmall {
        /// The configured memory cost.
        m_cost: u32,
        /// The smallest accepted memory cost for this lane count.
        minimum: u64,
    },
    /// Time cost (pass count) is zero.
    TimeCostZero,
    /// Tag length is below the 4-byte minimum.
    HashTooShort {
        /// The configured tag length.
        hash_len: usize,
    },
    /// Salt is shorter than the 8-byte minimum.
    SaltTooShort {
        /// The salt length.
        salt_len: usize,
    },
}

impl ParamError {
    /// The OS-style error number for this error.
    pub fn os_code(&self) -> i32 {
        errno::EINVAL
    }
}

impl fmt::Display for ParamError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::LanesOutOfRange { lanes } => {
                write!(f, "lane count {lanes} outside 1..=16777215")
            }
            Self::MemoryTooSmall { m_cost, minimum } => {
                write!(f, "memory cost {m_cost} below minimum of {minimum}")
            }
            Self::TimeCostZero => write!(f, "time cost must be at least 1"),
            Self::HashTooShort { hash_len } => {
                write!(f, "tag length {hash_len} below minimum of 4")
            }
            Self::SaltTooShort { salt_len } => {
                write!(f, "salt length {salt_len} below minimum of 8")
            }
        }
    }
}

impl Error for ParamError {}

//! C-compatible status codes.
//!
//! Every entry point returns `0` or a negated Linux errno. [`Ar2sStatus`]
//! names the values the context itself produces; a failed thread spawn
//! passes the OS's own error number through, so callers should treat any
//! negative value as an error and hand its absolute value to `strerror`.

use ar2simple_context::ContextError;
use ar2simple_core::errno;

/// Named status codes returned by the C ABI. Values are ABI-stable.
#[repr(i32)]
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Ar2sStatus {
    /// Success.
    Ok = 0,
    /// The worker behind a slot is gone (`-ESRCH`).
    WorkerGone = -3,
    /// Handle is invalid or was already destroyed (`-EBADF`).
    InvalidHandle = -9,
    /// A worker thread could not be created (`-EAGAIN`).
    ThreadUnavailable = -11,
    /// Allocation failed or its size overflowed (`-ENOMEM`).
    OutOfMemory = -12,
    /// A required pointer argument is null (`-EFAULT`).
    NullPointer = -14,
    /// An argument is out of range or otherwise invalid (`-EINVAL`).
    InvalidArgument = -22,
    /// An internal signal was torn down (`-EIDRM`).
    SignalClosed = -43,
    /// A coordination lock was poisoned (`-EOWNERDEAD`).
    LockPoisoned = -130,
    /// A lane function or the library itself panicked
    /// (`-ENOTRECOVERABLE`).
    NotRecoverable = -131,
}

const _: () = assert!(Ar2sStatus::WorkerGone as i32 == -errno::ESRCH);
const _: () = assert!(Ar2sStatus::InvalidHandle as i32 == -errno::EBADF);
const _: () = assert!(Ar2sStatus::ThreadUnavailable as i32 == -errno::EAGAIN);
const _: () = assert!(Ar2sStatus::OutOfMemory as i32 == -errno::ENOMEM);
const _: () = assert!(Ar2sStatus::NullPointer as i32 == -errno::EFAULT);
const _: () = assert!(Ar2sStatus::InvalidArgument as i32 == -errno::EINVAL);
const _: () = assert!(Ar2sStatus::SignalClosed as i32 == -errno::EIDRM);
const _: () = assert!(Ar2sStatus::LockPoisoned as i32 == -errno::EOWNERDEAD);
const _: () = assert!(Ar2sStatus::NotRecoverable as i32 == -errno::ENOTRECOVERABLE);

/// The C return value for a context error.
pub(crate) fn status_of(e: &ContextError) -> i32 {
    -e.os_code()
}

/// Map a `Result` to a C return value, logging failures.
pub(crate) fn status_from(result: Result<(), ContextError>) -> i32 {
    match result {
        Ok(()) => Ar2sStatus::Ok as i32,
        Err(e) => {
            tracing::debug!(error = %e, "C ABI call failed");
            status_of(&e)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ar2simple_alloc::AllocError;
    use ar2simple_core::{PoolError, SlotFault};

    #[test]
    fn context_errors_map_to_negated_errno() {
        let e = ContextError::Pool(PoolError::Slot {
            index: 1,
            fault: SlotFault::WorkerGone,
        });
        assert_eq!(status_of(&e), Ar2sStatus::WorkerGone as i32);

        let e = ContextError::Alloc(AllocError::OutOfMemory { bytes: 1 << 40 });
        assert_eq!(status_of(&e), Ar2sStatus::OutOfMemory as i32);

        let e = ContextError::Pool(PoolError::ThreadSpawn {
            index: 0,
            os_code: Some(1),
            reason: "not permitted".into(),
        });
        assert_eq!(status_of(&e), -1);
    }

    #[test]
    fn ok_is_zero() {
        assert_eq!(status_from(Ok(())), 0);
    }
}

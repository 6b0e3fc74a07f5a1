//! OS-style error numbers reported across the C boundary.
//!
//! Values follow Linux numbering so that a C engine can hand them to
//! `strerror(3)` unchanged. Every fallible operation in the workspace
//! maps its error to one of these through an `os_code()` method.

/// No such process: the worker thread behind a slot is gone.
pub const ESRCH: i32 = 3;
/// Bad file descriptor: a C-ABI handle is stale or was never issued.
pub const EBADF: i32 = 9;
/// Resource temporarily unavailable: a thread could not be created.
pub const EAGAIN: i32 = 11;
/// Out of memory, including size-computation overflow.
pub const ENOMEM: i32 = 12;
/// Bad address: a required C-ABI pointer argument is null.
pub const EFAULT: i32 = 14;
/// Invalid argument.
pub const EINVAL: i32 = 22;
/// Result not representable (a decimal field overflowed).
pub const ERANGE: i32 = 34;
/// Identifier removed: a wake or idle signal was torn down.
pub const EIDRM: i32 = 43;
/// Owner died: a coordination lock was poisoned by a panicking holder.
pub const EOWNERDEAD: i32 = 130;
/// State not recoverable: a lane function panicked inside a worker.
pub const ENOTRECOVERABLE: i32 = 131;

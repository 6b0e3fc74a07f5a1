//! C ABI for the ar2simple execution context.
//!
//! A C Argon2 core creates a context handle, then drives the same seven
//! calls as [`ExecutionContext`](ar2simple_context::ExecutionContext)
//! through it. Every function returns `0` on success or a negated
//! Linux errno (see [`Ar2sStatus`]). Panics never cross the boundary.
//!
//! This crate is one of two that may contain `unsafe` code (along with
//! `ar2simple-alloc`); each entry point opts in individually.

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![deny(unsafe_code)]

/// Run an entry-point body, converting a panic into
/// [`Ar2sStatus::NotRecoverable`].
macro_rules! ffi_guard {
    ($body:block) => {
        match ::std::panic::catch_unwind(::std::panic::AssertUnwindSafe(|| -> i32 { $body })) {
            Ok(status) => status,
            Err(_) => {
                ::tracing::error!("panic caught at C ABI boundary");
                $crate::status::Ar2sStatus::NotRecoverable as i32
            }
        }
    };
}

/// Lock a mutex inside [`ffi_guard!`], returning
/// [`Ar2sStatus::LockPoisoned`] from the body if it is poisoned.
macro_rules! ffi_lock {
    ($mutex:expr) => {
        match $mutex.lock() {
            Ok(guard) => guard,
            Err(_) => return $crate::status::Ar2sStatus::LockPoisoned as i32,
        }
    };
}

pub mod context;
mod handle;
pub mod memory;
pub mod status;

pub use context::{
    ar2s_context_create, ar2s_context_destroy, ar2s_destroy_thread_pool, ar2s_get_ready_threads,
    ar2s_init_thread_pool, ar2s_join_thread_pool, ar2s_run_thread, Ar2sLaneFn,
};
pub use memory::{ar2s_allocate, ar2s_deallocate};
pub use status::Ar2sStatus;

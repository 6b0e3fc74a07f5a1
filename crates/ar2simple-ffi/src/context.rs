//! Context lifecycle and thread-pool entry points.
//!
//! Contexts live in a global handle table as `Arc<Mutex<FfiContext>>`, so
//! the table lock is held only for the lookup. Calls on one context are
//! serialized by its own mutex; `ar2s_get_ready_threads` and
//! `ar2s_join_thread_pool` block while holding it, so a lane function must
//! not call back into the context that dispatched it.

use std::collections::HashMap;
use std::ffi::c_void;
use std::sync::{Arc, Mutex};

use ar2simple_alloc::SecureBuf;
use ar2simple_context::{Context, ExecutionContext};
use ar2simple_core::Job;

use crate::handle::HandleTable;
use crate::status::{status_from, status_of, Ar2sStatus};

/// A lane function: called once on a worker thread with the `data`
/// pointer given to [`ar2s_run_thread`].
pub type Ar2sLaneFn = unsafe extern "C" fn(data: *mut c_void);

pub(crate) struct FfiContext {
    pub(crate) ctx: Context,
    /// Buffers handed out by `ar2s_allocate`, keyed by address.
    pub(crate) live: HashMap<usize, SecureBuf>,
}

type ContextArc = Arc<Mutex<FfiContext>>;

static CONTEXTS: Mutex<HandleTable<ContextArc>> = Mutex::new(HandleTable::new());

/// Clone the `Arc` behind a handle, briefly locking the global table.
pub(crate) fn get_context(handle: u64) -> Option<ContextArc> {
    CONTEXTS.lock().ok()?.get(handle).cloned()
}

/// Moves the caller's opaque pointer onto the worker thread.
struct LaneData(*mut c_void);

// SAFETY: the C ABI contract requires `data` to be usable from the worker
// thread the lane runs on until the next join.
#[allow(unsafe_code)]
unsafe impl Send for LaneData {}

impl LaneData {
    fn into_raw(self) -> *mut c_void {
        self.0
    }
}

/// Create a context with default configuration and write its handle to
/// `handle_out`.
#[no_mangle]
#[allow(unsafe_code)]
pub extern "C" fn ar2s_context_create(handle_out: *mut u64) -> i32 {
    ffi_guard!({
        if handle_out.is_null() {
            return Ar2sStatus::NullPointer as i32;
        }
        let state = FfiContext {
            ctx: Context::default(),
            live: HashMap::new(),
        };
        let mut table = ffi_lock!(CONTEXTS);
        let handle = table.insert(Arc::new(Mutex::new(state)));
        tracing::debug!(handle, contexts = table.len(), "context created");
        drop(table);
        // SAFETY: handle_out is non-null and valid per caller contract.
        unsafe { *handle_out = handle };
        Ar2sStatus::Ok as i32
    })
}

/// Destroy a context: tear down its pool and erase and free every buffer
/// still allocated through it.
#[no_mangle]
#[allow(unsafe_code)]
pub extern "C" fn ar2s_context_destroy(handle: u64) -> i32 {
    ffi_guard!({
        let removed = ffi_lock!(CONTEXTS).remove(handle);
        let Some(arc) = removed else {
            return Ar2sStatus::InvalidHandle as i32;
        };
        let mut state = ffi_lock!(arc);
        let outstanding = state.live.len();
        if outstanding > 0 {
            tracing::debug!(handle, outstanding, "releasing buffers left by caller");
        }
        state.live.clear();
        let result = state.ctx.destroy_thread_pool();
        status_from(result)
    })
}

/// Size the worker pool for `desired` lanes. Writes the number of workers
/// created (`0` means run lanes inline) to `created_out` when non-null.
#[no_mangle]
#[allow(unsafe_code)]
pub extern "C" fn ar2s_init_thread_pool(handle: u64, desired: usize, created_out: *mut usize) -> i32 {
    ffi_guard!({
        let Some(arc) = get_context(handle) else {
            return Ar2sStatus::InvalidHandle as i32;
        };
        let mut state = ffi_lock!(arc);
        match state.ctx.init_thread_pool(desired) {
            Ok(created) => {
                if !created_out.is_null() {
                    // SAFETY: created_out is non-null and valid per caller contract.
                    unsafe { *created_out = created };
                }
                Ar2sStatus::Ok as i32
            }
            Err(e) => status_of(&e),
        }
    })
}

/// Block until a worker is ready, then write up to `max_count` ready
/// worker indices to `indices_out` and their number to `count_out`.
///
/// With no pool, writes `0` to `count_out` without blocking.
#[no_mangle]
#[allow(unsafe_code)]
pub extern "C" fn ar2s_get_ready_threads(
    handle: u64,
    indices_out: *mut usize,
    max_count: usize,
    count_out: *mut usize,
) -> i32 {
    ffi_guard!({
        if count_out.is_null() || (max_count > 0 && indices_out.is_null()) {
            return Ar2sStatus::NullPointer as i32;
        }
        let Some(arc) = get_context(handle) else {
            return Ar2sStatus::InvalidHandle as i32;
        };
        let mut state = ffi_lock!(arc);
        let ready = match state.ctx.get_ready_threads(max_count) {
            Ok(ready) => ready,
            Err(e) => return status_of(&e),
        };
        if !ready.is_empty() {
            // SAFETY: indices_out points to at least max_count writable
            // elements per caller contract, and ready.len() <= max_count.
            let out = unsafe { std::slice::from_raw_parts_mut(indices_out, ready.len()) };
            out.copy_from_slice(&ready);
        }
        // SAFETY: count_out is non-null and valid per caller contract.
        unsafe { *count_out = ready.len() };
        Ar2sStatus::Ok as i32
    })
}

/// Dispatch `func(data)` to worker `index`, which must have been returned
/// by [`ar2s_get_ready_threads`] since the last dispatch to it.
#[no_mangle]
#[allow(unsafe_code)]
pub extern "C" fn ar2s_run_thread(
    handle: u64,
    index: usize,
    func: Option<Ar2sLaneFn>,
    data: *mut c_void,
) -> i32 {
    ffi_guard!({
        let Some(func) = func else {
            return Ar2sStatus::InvalidArgument as i32;
        };
        let Some(arc) = get_context(handle) else {
            return Ar2sStatus::InvalidHandle as i32;
        };
        let data = LaneData(data);
        let job = Job::new(move || {
            // SAFETY: func and data are valid for this call per caller contract.
            unsafe { func(data.into_raw()) }
        });
        let mut state = ffi_lock!(arc);
        status_from(state.ctx.run_thread(index, job))
    })
}

/// Block until every worker is idle.
#[no_mangle]
#[allow(unsafe_code)]
pub extern "C" fn ar2s_join_thread_pool(handle: u64) -> i32 {
    ffi_guard!({
        let Some(arc) = get_context(handle) else {
            return Ar2sStatus::InvalidHandle as i32;
        };
        let mut state = ffi_lock!(arc);
        status_from(state.ctx.join_thread_pool())
    })
}

/// Stop and join every worker. The context stays usable.
#[no_mangle]
#[allow(unsafe_code)]
pub extern "C" fn ar2s_destroy_thread_pool(handle: u64) -> i32 {
    ffi_guard!({
        let Some(arc) = get_context(handle) else {
            return Ar2sStatus::InvalidHandle as i32;
        };
        let mut state = ffi_lock!(arc);
        status_from(state.ctx.destroy_thread_pool())
    })
}

//! Secure memory entry points.
//!
//! Buffers stay owned by the context that allocated them; the C side only
//! borrows the pointer. Destroying the context erases and frees anything
//! the caller did not hand back.

use std::ffi::c_void;

use ar2simple_context::ExecutionContext;

use crate::context::get_context;
use crate::status::{status_of, Ar2sStatus};

/// Allocate `count * element_size` bytes aligned to `alignment` (`0`
/// means the platform default) and write the pointer to `ptr_out`.
///
/// A zero-byte request succeeds and writes a non-null pointer that must
/// still be passed to [`ar2s_deallocate`].
#[no_mangle]
#[allow(unsafe_code)]
pub extern "C" fn ar2s_allocate(
    handle: u64,
    count: usize,
    element_size: usize,
    alignment: usize,
    ptr_out: *mut *mut c_void,
) -> i32 {
    ffi_guard!({
        if ptr_out.is_null() {
            return Ar2sStatus::NullPointer as i32;
        }
        let Some(arc) = get_context(handle) else {
            return Ar2sStatus::InvalidHandle as i32;
        };
        let mut state = ffi_lock!(arc);
        let mut buf = match state.ctx.allocate(count, element_size, alignment) {
            Ok(buf) => buf,
            Err(e) => return status_of(&e),
        };
        let ptr = buf.as_mut_ptr();
        state.live.insert(ptr as usize, buf);
        // SAFETY: ptr_out is non-null and valid per caller contract.
        unsafe { *ptr_out = ptr.cast() };
        Ar2sStatus::Ok as i32
    })
}

/// Erase and free a buffer returned by [`ar2s_allocate`] on the same
/// context. A null pointer is ignored.
#[no_mangle]
#[allow(unsafe_code)]
pub extern "C" fn ar2s_deallocate(handle: u64, ptr: *mut c_void) -> i32 {
    ffi_guard!({
        let Some(arc) = get_context(handle) else {
            return Ar2sStatus::InvalidHandle as i32;
        };
        if ptr.is_null() {
            return Ar2sStatus::Ok as i32;
        }
        let mut state = ffi_lock!(arc);
        match state.live.remove(&(ptr as usize)) {
            Some(buf) => {
                state.ctx.deallocate(buf);
                Ar2sStatus::Ok as i32
            }
            None => {
                tracing::debug!(addr = ptr as usize, "deallocate of unknown pointer");
                Ar2sStatus::InvalidArgument as i32
            }
        }
    })
}

//! Zero-fill that the optimiser may not elide.

#![allow(unsafe_code)]

use std::ptr;
use std::sync::atomic::{compiler_fence, Ordering};

/// Overwrite `bytes` with zeros.
///
/// Each byte is written with a volatile store and the sequence is closed
/// with a compiler fence, so the writes survive even when the buffer is
/// freed immediately afterwards.
pub fn erase(bytes: &mut [u8]) {
    for b in bytes.iter_mut() {
        // SAFETY: `b` is a valid, aligned, exclusive reference to one byte.
        unsafe { ptr::write_volatile(b, 0) };
    }
    compiler_fence(Ordering::SeqCst);
}

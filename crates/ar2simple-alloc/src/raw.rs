//! Low-level memory sources behind [`SecureAllocator`](crate::SecureAllocator).
//!
//! The secure layer never talks to the global allocator directly: it goes
//! through a [`RawAlloc`] so that diagnostics (see
//! `RetainingArena`) can observe what happens to memory after release.

#![allow(unsafe_code)]

use std::alloc::{self, Layout};
use std::ptr::NonNull;

/// A source of raw memory blocks.
///
/// # Safety
///
/// `allocate` must return either `None` or a pointer to a block that is
/// valid for reads and writes of `layout.size()` bytes and aligned to
/// `layout.align()`, and that stays valid until `release` is called with
/// the same pointer and layout. `layout.size()` is never zero.
pub unsafe trait RawAlloc: Send + Sync {
    /// Obtain a block for `layout`, or `None` if memory is exhausted.
    fn allocate(&self, layout: Layout) -> Option<NonNull<u8>>;

    /// Return a block previously obtained from [`allocate`](Self::allocate).
    ///
    /// # Safety
    ///
    /// `ptr` must come from `self.allocate(layout)` with the same `layout`
    /// and must not have been released already.
    unsafe fn release(&self, ptr: NonNull<u8>, layout: Layout);
}

/// The process-wide global allocator.
#[derive(Clone, Copy, Debug, Default)]
pub struct SystemAlloc;

// SAFETY: forwards to the global allocator, which upholds the contract for
// non-zero-sized layouts.
unsafe impl RawAlloc for SystemAlloc {
    fn allocate(&self, layout: Layout) -> Option<NonNull<u8>> {
        debug_assert!(layout.size() > 0);
        // SAFETY: the caller never passes a zero-sized layout.
        NonNull::new(unsafe { alloc::alloc(layout) })
    }

    unsafe fn release(&self, ptr: NonNull<u8>, layout: Layout) {
        // SAFETY: `ptr` was returned by `alloc::alloc(layout)` per the
        // trait contract.
        unsafe { alloc::dealloc(ptr.as_ptr(), layout) }
    }
}

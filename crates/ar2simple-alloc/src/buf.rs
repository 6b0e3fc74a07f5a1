//! [`SecureBuf`]: an owning, self-describing, erase-on-release buffer.

#![allow(unsafe_code)]

use std::alloc::Layout;
use std::fmt;
use std::ops::{Deref, DerefMut};
use std::ptr::NonNull;
use std::slice;
use std::sync::Arc;

use crate::erase::erase;
use crate::raw::RawAlloc;

/// A heap buffer that zero-fills itself before it is freed.
///
/// The handle privately records the exact payload length and the layout
/// it was allocated with, so releasing it never needs the size resupplied.
/// The payload is zero-initialised on allocation.
pub struct SecureBuf {
    ptr: NonNull<u8>,
    len: usize,
    layout: Layout,
    source: Arc<dyn RawAlloc>,
}

// SAFETY: `SecureBuf` owns its block exclusively; shared access only hands
// out `&[u8]`, which is `Sync`.
unsafe impl Send for SecureBuf {}
// SAFETY: see above.
unsafe impl Sync for SecureBuf {}

impl SecureBuf {
    /// Take ownership of a block obtained from `source.allocate(layout)`.
    ///
    /// # Safety
    ///
    /// `ptr` must be a live block from `source` for `layout`, not owned by
    /// anything else, and `len <= layout.size()`.
    pub(crate) unsafe fn from_raw(
        ptr: NonNull<u8>,
        len: usize,
        layout: Layout,
        source: Arc<dyn RawAlloc>,
    ) -> Self {
        debug_assert!(len <= layout.size());
        // SAFETY: the block is valid for `layout.size()` writes per the
        // caller's contract.
        unsafe { ptr.as_ptr().write_bytes(0, layout.size()) };
        Self {
            ptr,
            len,
            layout,
            source,
        }
    }

    /// Payload length in bytes.
    pub fn len(&self) -> usize {
        self.len
    }

    /// Whether the payload is empty.
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Alignment the payload pointer satisfies.
    pub fn alignment(&self) -> usize {
        self.layout.align()
    }

    /// Raw pointer to the first payload byte.
    pub fn as_ptr(&self) -> *const u8 {
        self.ptr.as_ptr()
    }

    /// Mutable raw pointer to the first payload byte.
    pub fn as_mut_ptr(&mut self) -> *mut u8 {
        self.ptr.as_ptr()
    }

    /// The payload as a byte slice.
    pub fn as_slice(&self) -> &[u8] {
        // SAFETY: `ptr` is valid for `len` initialised bytes for the
        // lifetime of `self`.
        unsafe { slice::from_raw_parts(self.ptr.as_ptr(), self.len) }
    }

    /// The payload as a mutable byte slice.
    pub fn as_mut_slice(&mut self) -> &mut [u8] {
        // SAFETY: as above, and `&mut self` guarantees exclusivity.
        unsafe { slice::from_raw_parts_mut(self.ptr.as_ptr(), self.len) }
    }
}

impl Deref for SecureBuf {
    type Target = [u8];

    fn deref(&self) -> &[u8] {
        self.as_slice()
    }
}

impl DerefMut for SecureBuf {
    fn deref_mut(&mut self) -> &mut [u8] {
        self.as_mut_slice()
    }
}

impl Drop for SecureBuf {
    fn drop(&mut self) {
        erase(self.as_mut_slice());
        // SAFETY: the block came from `source.allocate(layout)` and is
        // released exactly once, here.
        unsafe { self.source.release(self.ptr, self.layout) };
    }
}

// Contents are never printed.
impl fmt::Debug for SecureBuf {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SecureBuf")
            .field("len", &self.len)
            .field("align", &self.layout.align())
            .finish_non_exhaustive()
    }
}

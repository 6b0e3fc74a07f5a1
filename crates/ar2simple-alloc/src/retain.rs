//! A diagnostic memory source that never reuses or frees a block until the
//! arena itself is dropped.
//!
//! Released blocks stay readable, so tests can check what a buffer looked
//! like *after* it was released (it must be all zeros) and count how many
//! blocks are still live.

#![allow(unsafe_code)]

use std::alloc::{self, Layout};
use std::ptr::NonNull;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use crate::raw::RawAlloc;

struct Region {
    ptr: NonNull<u8>,
    layout: Layout,
    live: bool,
}

/// Memory source that retains every block for inspection.
#[derive(Default)]
pub struct RetainingArena {
    regions: Mutex<Vec<Region>>,
}

// SAFETY: regions are only touched under the mutex; the raw pointers are
// owned by the arena.
unsafe impl Send for RetainingArena {}
// SAFETY: see above.
unsafe impl Sync for RetainingArena {}

impl RetainingArena {
    /// A new, empty arena, shared so it can back an allocator and be
    /// inspected by the test at the same time.
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    fn regions(&self) -> MutexGuard<'_, Vec<Region>> {
        self.regions.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Number of blocks handed out and not yet released.
    pub fn live_allocations(&self) -> usize {
        self.regions().iter().filter(|r| r.live).count()
    }

    /// Number of blocks ever handed out.
    pub fn total_allocations(&self) -> usize {
        self.regions().len()
    }

    /// Copy of the full block starting at `addr`, live or released.
    pub fn region_bytes(&self, addr: *const u8) -> Option<Vec<u8>> {
        let regions = self.regions();
        let region = regions
            .iter()
            .find(|r| r.ptr.as_ptr() as *const u8 == addr)?;
        // SAFETY: the block stays allocated until the arena is dropped.
        let bytes =
            unsafe { std::slice::from_raw_parts(region.ptr.as_ptr(), region.layout.size()) };
        Some(bytes.to_vec())
    }
}

// SAFETY: blocks come from the global allocator and are only freed in
// `Drop`, after which no pointer into the arena can be used.
unsafe impl RawAlloc for RetainingArena {
    fn allocate(&self, layout: Layout) -> Option<NonNull<u8>> {
        // SAFETY: the caller never passes a zero-sized layout.
        let ptr = NonNull::new(unsafe { alloc::alloc(layout) })?;
        self.regions().push(Region {
            ptr,
            layout,
            live: true,
        });
        Some(ptr)
    }

    unsafe fn release(&self, ptr: NonNull<u8>, layout: Layout) {
        let mut regions = self.regions();
        if let Some(region) = regions
            .iter_mut()
            .find(|r| r.ptr == ptr && r.layout == layout && r.live)
        {
            region.live = false;
        }
    }
}

impl Drop for RetainingArena {
    fn drop(&mut self) {
        let regions = self.regions.get_mut().unwrap_or_else(PoisonError::into_inner);
        for region in regions.drain(..) {
            // SAFETY: each block was allocated with its recorded layout and
            // is freed exactly once.
            unsafe { alloc::dealloc(region.ptr.as_ptr(), region.layout) };
        }
    }
}

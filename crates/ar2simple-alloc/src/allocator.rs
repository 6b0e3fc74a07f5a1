//! Sized, aligned allocation with guaranteed erase on release.

use std::alloc::Layout;
use std::mem;
use std::sync::Arc;

use crate::buf::SecureBuf;
use crate::error::AllocError;
use crate::raw::{RawAlloc, SystemAlloc};

/// Hands out [`SecureBuf`]s from a [`RawAlloc`] source.
///
/// Returned payloads are aligned to at least pointer size, or to the
/// caller's larger alignment.
#[derive(Clone)]
pub struct SecureAllocator {
    source: Arc<dyn RawAlloc>,
}

impl SecureAllocator {
    /// An allocator backed by the global allocator.
    pub fn new() -> Self {
        Self::with_source(Arc::new(SystemAlloc))
    }

    /// An allocator backed by a custom memory source.
    pub fn with_source(source: Arc<dyn RawAlloc>) -> Self {
        Self { source }
    }

    /// Allocate `count * element_size` zeroed bytes.
    ///
    /// `alignment == 0` means no requirement beyond pointer alignment.
    /// A product that overflows `usize` is reported as out of memory.
    pub fn allocate(
        &self,
        count: usize,
        element_size: usize,
        alignment: usize,
    ) -> Result<SecureBuf, AllocError> {
        let len = count
            .checked_mul(element_size)
            .ok_or(AllocError::Overflow {
                count,
                element_size,
            })?;
        if alignment != 0 && !alignment.is_power_of_two() {
            return Err(AllocError::InvalidAlignment { alignment });
        }
        let align = alignment.max(mem::align_of::<usize>());
        // Zero-length requests still get a real block so the pointer is
        // aligned and unique.
        let layout = Layout::from_size_align(len.max(1), align)
            .map_err(|_| AllocError::OutOfMemory { bytes: len })?;
        let ptr = self.source.allocate(layout).ok_or_else(|| {
            tracing::debug!(bytes = len, align, "secure allocation failed");
            AllocError::OutOfMemory { bytes: len }
        })?;
        // SAFETY: `ptr` is a fresh block from `source` for `layout`, and
        // `len <= layout.size()`.
        #[allow(unsafe_code)]
        let buf = unsafe { SecureBuf::from_raw(ptr, len, layout, Arc::clone(&self.source)) };
        Ok(buf)
    }

    /// Erase and release a buffer.
    ///
    /// Equivalent to dropping it; spelled out for call sites that pair
    /// every allocation with an explicit release.
    pub fn deallocate(&self, buf: SecureBuf) {
        drop(buf);
    }
}

impl Default for SecureAllocator {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::retain::RetainingArena;

    #[test]
    fn payload_is_zeroed_and_sized() {
        let alloc = SecureAllocator::new();
        let buf = alloc.allocate(16, 8, 0).unwrap();
        assert_eq!(buf.len(), 128);
        assert!(buf.iter().all(|&b| b == 0));
    }

    #[test]
    fn minimum_alignment_is_pointer_size() {
        let alloc = SecureAllocator::new();
        let buf = alloc.allocate(3, 1, 1).unwrap();
        assert_eq!(buf.alignment(), mem::align_of::<usize>());
        assert_eq!(buf.as_ptr() as usize % mem::align_of::<usize>(), 0);
    }

    #[test]
    fn larger_alignment_is_honoured() {
        let alloc = SecureAllocator::new();
        for align in [16usize, 64, 1024] {
            let buf = alloc.allocate(1024, 1, align).unwrap();
            assert_eq!(buf.as_ptr() as usize % align, 0);
        }
    }

    #[test]
    fn overflow_is_out_of_memory() {
        let alloc = SecureAllocator::new();
        let err = alloc.allocate(usize::MAX, 2, 0).unwrap_err();
        assert_eq!(
            err,
            AllocError::Overflow {
                count: usize::MAX,
                element_size: 2
            }
        );
        assert_eq!(err.os_code(), ar2simple_core::errno::ENOMEM);
    }

    #[test]
    fn non_power_of_two_alignment_rejected() {
        let alloc = SecureAllocator::new();
        assert_eq!(
            alloc.allocate(1, 1, 24).unwrap_err(),
            AllocError::InvalidAlignment { alignment: 24 }
        );
    }

    #[test]
    fn zero_length_allocation_is_usable() {
        let alloc = SecureAllocator::new();
        let buf = alloc.allocate(0, 64, 0).unwrap();
        assert!(buf.is_empty());
        alloc.deallocate(buf);
    }

    #[test]
    fn deallocate_erases_full_payload() {
        let arena = RetainingArena::new();
        let alloc = SecureAllocator::with_source(arena.clone());
        let mut buf = alloc.allocate(4, 1000, 64).unwrap();
        buf.fill(0x5A);
        let addr = buf.as_ptr();
        assert!(arena.region_bytes(addr).unwrap().iter().all(|&b| b == 0x5A));

        alloc.deallocate(buf);
        let after = arena.region_bytes(addr).unwrap();
        assert_eq!(after.len(), 4000);
        assert!(after.iter().all(|&b| b == 0));
        assert_eq!(arena.live_allocations(), 0);
    }

    #[test]
    fn drop_erases_like_deallocate() {
        let arena = RetainingArena::new();
        let alloc = SecureAllocator::with_source(arena.clone());
        let addr = {
            let mut buf = alloc.allocate(32, 1, 0).unwrap();
            buf.copy_from_slice(b"correct horse battery staple!!!!");
            buf.as_ptr()
        };
        assert!(arena.region_bytes(addr).unwrap().iter().all(|&b| b == 0));
    }

    mod props {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            #[test]
            fn released_range_reads_all_zero(
                count in 0usize..64,
                element_size in 1usize..256,
                align_shift in 0u32..8,
                fill in any::<u8>(),
            ) {
                let arena = RetainingArena::new();
                let alloc = SecureAllocator::with_source(arena.clone());
                let mut buf = alloc.allocate(count, element_size, 1usize << align_shift).unwrap();
                prop_assert_eq!(buf.len(), count * element_size);
                buf.fill(fill);
                let addr = buf.as_ptr();
                alloc.deallocate(buf);
                let after = arena.region_bytes(addr).unwrap();
                prop_assert!(after.iter().all(|&b| b == 0));
                prop_assert_eq!(arena.live_allocations(), 0);
            }
        }
    }
}

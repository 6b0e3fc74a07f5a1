//! Allocation error types.

use std::error::Error;
use std::fmt;

use ar2simple_core::errno;

/// Errors from [`SecureAllocator::allocate`](crate::SecureAllocator::allocate).
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum AllocError {
    /// `count * element_size` does not fit in `usize`.
    Overflow {
        /// Requested element count.
        count: usize,
        /// Requested element size in bytes.
        element_size: usize,
    },
    /// Requested alignment is not a power of two.
    InvalidAlignment {
        /// The rejected alignment.
        alignment: usize,
    },
    /// The underlying allocator could not satisfy the request.
    OutOfMemory {
        /// Payload size that was requested, in bytes.
        bytes: usize,
    },
}

impl AllocError {
    /// The OS-style error number for this error.
    pub fn os_code(&self) -> i32 {
        match self {
            Self::Overflow { .. } | Self::OutOfMemory { .. } => errno::ENOMEM,
            Self::InvalidAlignment { .. } => errno::EINVAL,
        }
    }
}

impl fmt::Display for AllocError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Overflow {
                count,
                element_size,
            } => write!(
                f,
                "allocation size overflow: {count} elements of {element_size} bytes"
            ),
            Self::InvalidAlignment { alignment } => {
                write!(f, "alignment {alignment} is not a power of two")
            }
            Self::OutOfMemory { bytes } => write!(f, "out of memory allocating {bytes} bytes"),
        }
    }
}

impl Error for AllocError {}

//! Secure-erasing allocation for ar2simple.
//!
//! Every buffer that may hold password or key material is handed out as a
//! [`SecureBuf`]: an owning handle that carries its exact payload size and
//! allocation layout. Releasing a buffer, whether through
//! [`SecureAllocator::deallocate`] or by dropping it, overwrites the whole
//! payload with zeros before the memory goes back to the allocator.
//!
//! This crate is one of two that may contain `unsafe` code (along with
//! `ar2simple-ffi`). It is confined to [`raw`], the [`erase()`] primitive,
//! and the optional retaining arena.

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![deny(unsafe_code)]

pub mod allocator;
pub mod buf;
pub mod erase;
pub mod error;
pub mod raw;
#[cfg(any(test, feature = "retaining-arena"))]
pub mod retain;

pub use allocator::SecureAllocator;
pub use buf::SecureBuf;
pub use erase::erase;
pub use error::AllocError;
pub use raw::{RawAlloc, SystemAlloc};
#[cfg(any(test, feature = "retaining-arena"))]
pub use retain::RetainingArena;

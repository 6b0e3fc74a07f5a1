//! Core types and error codes for ar2simple.
//!
//! This crate holds the vocabulary shared by every other crate in the
//! workspace: Argon2 hashing parameters, the [`Job`] type that carries one
//! lane's work across a thread boundary, and the pool error taxonomy with
//! its errno-style codes.

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

pub mod errno;
pub mod error;
pub mod job;
pub mod params;

pub use error::{ParamError, PoolError, SlotFault};
pub use job::Job;
pub use params::{Argon2Params, Argon2Type, Salt, Version};

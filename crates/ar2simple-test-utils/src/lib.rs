//! Test engines, fixtures, and tracing setup for ar2simple development.
//!
//! [`LaneMixEngine`] stands in for a real Argon2 core: it drives the
//! execution context exactly as one would (pool sizing, per-segment lane
//! dispatch, barrier, teardown, buffers from the secure allocator) but
//! computes a cheap, deterministic, non-cryptographic tag.

#![forbid(unsafe_code)]
#![allow(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]

mod engine;
mod fixtures;
mod recording;

pub use ar2simple_context::FixedCpus;
pub use engine::LaneMixEngine;
pub use fixtures::{init_tracing, params, retaining_context};
pub use recording::{Call, RecordingContext};

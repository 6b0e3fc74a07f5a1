//! Benchmark profiles for the ar2simple execution context.
//!
//! - [`lane_profile`]: parameters for a given lane count, small enough that
//!   dispatch overhead dominates
//! - [`spin_jobs`]: a segment's worth of jobs doing a fixed amount of work

#![forbid(unsafe_code)]
#![deny(rustdoc::broken_intra_doc_links)]

use std::hint::black_box;

use ar2simple_core::{Argon2Params, Argon2Type, Salt, Version};

/// Argon2id parameters with `lanes` lanes and the minimum memory for them.
pub fn lane_profile(lanes: u32) -> Argon2Params {
    Argon2Params {
        kind: Argon2Type::Id,
        version: Some(Version::V13),
        m_cost: 8 * lanes,
        t_cost: 1,
        lanes,
        salt: Salt::Value(b"benchsaltbenchsalt".to_vec()),
        hash_len: 32,
        secret: None,
        associated_data: None,
    }
}

/// `count` jobs that each run `rounds` rounds of integer mixing.
pub fn spin_jobs(count: usize, rounds: u64) -> Vec<ar2simple_core::Job> {
    (0..count)
        .map(|lane| {
            ar2simple_core::Job::new(move || {
                let mut x = lane as u64;
                for i in 0..rounds {
                    x = x.rotate_left(7) ^ i.wrapping_mul(0x9E37_79B9_7F4A_7C15);
                }
                black_box(x);
            })
        })
        .collect()
}

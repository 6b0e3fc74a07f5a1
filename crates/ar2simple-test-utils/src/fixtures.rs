use std::sync::{Arc, Once};

use ar2simple_alloc::{RetainingArena, SecureAllocator};
use ar2simple_context::{Context, FixedCpus};
use ar2simple_core::{Argon2Params, Argon2Type, Salt};
use tracing_subscriber::{fmt, EnvFilter};

static TRACING: Once = Once::new();

/// Install a test-friendly subscriber once per process. The filter comes
/// from `AR2S_LOG` (default `warn`).
pub fn init_tracing() {
    TRACING.call_once(|| {
        let filter = EnvFilter::try_from_env("AR2S_LOG").unwrap_or_else(|_| EnvFilter::new("warn"));
        // Fails only if a global subscriber is already installed (by the
        // test binary itself); events then go to that one.
        let _ = fmt()
            .with_env_filter(filter)
            .with_test_writer()
            .try_init();
    });
}

/// A context on a machine with `cpus` processors whose allocations are
/// retained by the returned arena for inspection.
pub fn retaining_context(cpus: usize) -> (Context, Arc<RetainingArena>) {
    let arena = RetainingArena::new();
    let ctx = Context::default()
        .with_cpus(FixedCpus(cpus))
        .with_allocator(SecureAllocator::with_source(arena.clone()));
    (ctx, arena)
}

/// Small valid parameters with the salt `"somesalt"`.
pub fn params(kind: Argon2Type, lanes: u32) -> Argon2Params {
    let mut p = Argon2Params::new(kind, 8 * lanes.max(1), 2, lanes);
    p.salt = Salt::Value(b"somesalt".to_vec());
    p
}

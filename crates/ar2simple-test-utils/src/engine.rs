use std::sync::{Arc, Mutex};

use ar2simple_alloc::SecureBuf;
use ar2simple_context::{dispatch_lanes, Argon2Engine, EngineError, ExecutionContext};
use ar2simple_core::{Argon2Params, Job};

/// Bytes of scratch memory per lane.
const LANE_BYTES: usize = 1024;

/// Synchronisation points per pass, as in Argon2.
const SEGMENTS: u32 = 4;

/// Deterministic stand-in for an Argon2 core.
///
/// Each pass is split into four segments. In every segment each lane mixes
/// its own scratch buffer, seeded by the digests every lane produced in the
/// previous segment, so the result depends on the barrier being honoured
/// but not on which worker ran which lane.
#[derive(Clone, Debug, Default)]
pub struct LaneMixEngine {
    panic_lane: Option<u32>,
}

impl LaneMixEngine {
    pub fn new() -> Self {
        Self::default()
    }

    /// An engine whose lane `lane` panics in the first segment.
    pub fn panicking_on(lane: u32) -> Self {
        Self {
            panic_lane: Some(lane),
        }
    }

    fn run(
        &self,
        tag: &mut [u8],
        msg: &[u8],
        params: &Argon2Params,
        ctx: &mut dyn ExecutionContext,
    ) -> Result<(), EngineError> {
        let lanes = params.lanes as usize;
        let seed = initial_seed(msg, params);
        let mut digests = vec![seed; lanes];
        let mut buffers = Vec::with_capacity(lanes);
        for _ in 0..lanes {
            buffers.push(ctx.allocate(LANE_BYTES / 8, 8, 64)?);
        }

        for pass in 0..params.t_cost {
            for segment in 0..SEGMENTS {
                let snapshot: Arc<[u64]> = Arc::from(digests.as_slice());
                let returned: Arc<Mutex<Vec<Option<(u64, SecureBuf)>>>> =
                    Arc::new(Mutex::new((0..lanes).map(|_| None).collect()));
                let jobs: Vec<Job> = buffers
                    .drain(..)
                    .enumerate()
                    .map(|(lane, mut buf)| {
                        let snapshot = Arc::clone(&snapshot);
                        let returned = Arc::clone(&returned);
                        let fail = self.panic_lane == Some(lane as u32) && pass == 0 && segment == 0;
                        Job::new(move || {
                            if fail {
                                panic!("lane {lane} failed");
                            }
                            let digest = mix_lane(&mut buf, seed, lane, pass, segment, &snapshot);
                            if let Ok(mut slots) = returned.lock() {
                                slots[lane] = Some((digest, buf));
                            }
                        })
                    })
                    .collect();

                let dispatched = dispatch_lanes(ctx, jobs);

                let slots = match returned.lock() {
                    Ok(mut slots) => std::mem::take(&mut *slots),
                    Err(_) => Vec::new(),
                };
                for (lane, slot) in slots.into_iter().enumerate() {
                    if let Some((digest, buf)) = slot {
                        digests[lane] = digest;
                        buffers.push(buf);
                    }
                }
                if let Err(e) = dispatched {
                    for buf in buffers {
                        ctx.deallocate(buf);
                    }
                    return Err(e.into());
                }
            }
        }

        for buf in buffers {
            ctx.deallocate(buf);
        }

        let mut state = digests.iter().fold(seed, |acc, &d| splitmix64(acc ^ d));
        for chunk in tag[..params.hash_len].chunks_mut(8) {
            state = splitmix64(state);
            chunk.copy_from_slice(&state.to_le_bytes()[..chunk.len()]);
        }
        Ok(())
    }
}

impl Argon2Engine for LaneMixEngine {
    fn hash_buf_size(&self, params: &Argon2Params) -> usize {
        params.hash_len.div_ceil(8) * 8
    }

    fn hash(
        &self,
        tag: &mut [u8],
        msg: &mut [u8],
        params: &Argon2Params,
        ctx: &mut dyn ExecutionContext,
    ) -> Result<(), EngineError> {
        params.validate()?;
        ctx.init_thread_pool(params.lanes as usize)?;
        let result = self.run(tag, msg, params, ctx);
        let destroyed = ctx.destroy_thread_pool();
        result?;
        destroyed?;
        Ok(())
    }
}

fn splitmix64(mut x: u64) -> u64 {
    x = x.wrapping_add(0x9E37_79B9_7F4A_7C15);
    x = (x ^ (x >> 30)).wrapping_mul(0xBF58_476D_1CE4_E5B9);
    x = (x ^ (x >> 27)).wrapping_mul(0x94D0_49BB_1331_11EB);
    x ^ (x >> 31)
}

fn fnv1a(mut h: u64, bytes: &[u8]) -> u64 {
    for &b in bytes {
        h ^= u64::from(b);
        h = h.wrapping_mul(0x0000_0100_0000_01B3);
    }
    h
}

fn initial_seed(msg: &[u8], params: &Argon2Params) -> u64 {
    let mut h = 0xCBF2_9CE4_8422_2325;
    h = fnv1a(h, params.kind.as_str().as_bytes());
    for n in [
        params.effective_version().number(),
        params.m_cost,
        params.t_cost,
        params.lanes,
    ] {
        h = fnv1a(h, &n.to_le_bytes());
    }
    h = fnv1a(h, &(params.hash_len as u64).to_le_bytes());
    h = fnv1a(h, params.salt.bytes().unwrap_or_default());
    h = fnv1a(h, params.secret.as_deref().unwrap_or_default());
    h = fnv1a(h, params.associated_data.as_deref().unwrap_or_default());
    fnv1a(h, msg)
}

fn mix_lane(buf: &mut [u8], seed: u64, lane: usize, pass: u32, segment: u32, peers: &[u64]) -> u64 {
    let position = ((lane as u64) << 32) | (u64::from(pass) << 8) | u64::from(segment);
    let mut state = splitmix64(seed ^ position);
    for &d in peers {
        state = splitmix64(state ^ d);
    }
    for chunk in buf.chunks_exact_mut(8) {
        let mut word = [0u8; 8];
        word.copy_from_slice(chunk);
        state = splitmix64(state ^ u64::from_le_bytes(word));
        chunk.copy_from_slice(&state.to_le_bytes());
    }
    state
}

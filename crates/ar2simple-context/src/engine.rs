//! The contract an external Argon2 engine fulfils, and the lane-dispatch
//! loop engines share.
//!
//! The engine owns the Argon2 algorithm itself; this crate only supplies
//! the context it runs against. [`dispatch_lanes`] captures the per-segment
//! protocol (query ready workers, dispatch, barrier) so engines do not have
//! to repeat it.

use std::error::Error;
use std::fmt;
use std::panic::{self, AssertUnwindSafe};

use ar2simple_core::{Argon2Params, Job, ParamError, PoolError, SlotFault};

use crate::context::{ContextError, ExecutionContext};
use crate::pool::panic_message;

/// An Argon2 implementation that runs against an [`ExecutionContext`].
pub trait Argon2Engine {
    /// Size of the scratch buffer [`hash`](Self::hash) needs for its tag
    /// output. Defaults to the tag length.
    fn hash_buf_size(&self, params: &Argon2Params) -> usize {
        params.hash_len
    }

    /// Compute the tag for `msg` under `params` into `tag`.
    ///
    /// `tag` is at least [`hash_buf_size`](Self::hash_buf_size) bytes. The
    /// engine may overwrite `msg` as it consumes it.
    fn hash(
        &self,
        tag: &mut [u8],
        msg: &mut [u8],
        params: &Argon2Params,
        ctx: &mut dyn ExecutionContext,
    ) -> Result<(), EngineError>;
}

/// Errors an engine reports.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum EngineError {
    /// The execution context failed.
    Context(ContextError),
    /// The parameters are outside Argon2's accepted ranges.
    Params(ParamError),
    /// Engine-specific failure.
    Failed {
        /// Description of the failure.
        reason: String,
    },
}

impl EngineError {
    /// The OS-style error number for this error.
    pub fn os_code(&self) -> i32 {
        match self {
            Self::Context(e) => e.os_code(),
            Self::Params(e) => e.os_code(),
            Self::Failed { .. } => ar2simple_core::errno::EINVAL,
        }
    }
}

impl fmt::Display for EngineError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Context(e) => write!(f, "execution context: {e}"),
            Self::Params(e) => write!(f, "invalid parameters: {e}"),
            Self::Failed { reason } => write!(f, "engine failed: {reason}"),
        }
    }
}

impl Error for EngineError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Context(e) => Some(e),
            Self::Params(e) => Some(e),
            Self::Failed { .. } => None,
        }
    }
}

impl From<ContextError> for EngineError {
    fn from(e: ContextError) -> Self {
        Self::Context(e)
    }
}

impl From<ParamError> for EngineError {
    fn from(e: ParamError) -> Self {
        Self::Params(e)
    }
}

/// Run one segment: every job in `jobs` on some worker, then the barrier.
///
/// When the context has no pool, the jobs run on the calling thread in
/// order, and a panicking job is reported as a [`SlotFault::Panicked`]
/// fault, as a worker would report it. If a dispatch fails, no further
/// jobs are dispatched, the barrier still runs so in-flight lanes finish,
/// and the dispatch error is returned.
pub fn dispatch_lanes<I>(ctx: &mut dyn ExecutionContext, jobs: I) -> Result<(), ContextError>
where
    I: IntoIterator<Item = Job>,
{
    let mut jobs = jobs.into_iter().peekable();
    let mut failure = None;
    'segment: while jobs.peek().is_some() {
        let wanted = jobs.size_hint().0.max(1);
        let ready = match ctx.get_ready_threads(wanted) {
            Ok(ready) => ready,
            Err(e) => {
                failure = Some(e);
                break;
            }
        };
        if ready.is_empty() {
            if let Err(e) = run_inline(jobs.by_ref()) {
                failure = Some(e);
            }
            break;
        }
        for index in ready {
            let Some(job) = jobs.next() else {
                break 'segment;
            };
            if let Err(e) = ctx.run_thread(index, job) {
                tracing::debug!(worker = index, error = %e, "lane dispatch failed, aborting segment");
                failure = Some(e);
                break 'segment;
            }
        }
    }
    let joined = ctx.join_thread_pool();
    match failure {
        Some(e) => Err(e),
        None => joined,
    }
}

/// Run jobs on the calling thread in order, stopping at the first panic.
///
/// A panicking job is reported the way a worker reports it, with the
/// job's position in the segment as the slot index.
fn run_inline<I>(jobs: I) -> Result<(), ContextError>
where
    I: Iterator<Item = Job>,
{
    for (index, job) in jobs.enumerate() {
        if let Err(payload) = panic::catch_unwind(AssertUnwindSafe(|| job.run())) {
            let fault = SlotFault::Panicked {
                message: panic_message(payload.as_ref()),
            };
            tracing::warn!(lane = index, %fault, "inline lane panicked");
            return Err(PoolError::Slot { index, fault }.into());
        }
    }
    Ok(())
}

//! One-call hashing.

use ar2simple_alloc::erase;
use ar2simple_context::{Argon2Engine, Context, ExecutionContext};
use ar2simple_core::Argon2Params;

use crate::error::HashError;

/// Hash `msg` into `tag` with a fresh default [`Context`].
///
/// `tag` must be at least [`Argon2Engine::hash_buf_size`] bytes; the tag
/// itself occupies the first `params.hash_len` of them. `msg` is erased
/// before returning, whether or not hashing succeeded.
pub fn hash<E>(
    engine: &E,
    tag: &mut [u8],
    msg: &mut [u8],
    params: &Argon2Params,
) -> Result<(), HashError>
where
    E: Argon2Engine + ?Sized,
{
    let mut ctx = Context::default();
    hash_with(engine, &mut ctx, tag, msg, params)
}

/// Like [`hash`], with a caller-supplied execution context.
///
/// The context's worker pool is torn down before returning.
pub fn hash_with<E>(
    engine: &E,
    ctx: &mut dyn ExecutionContext,
    tag: &mut [u8],
    msg: &mut [u8],
    params: &Argon2Params,
) -> Result<(), HashError>
where
    E: Argon2Engine + ?Sized,
{
    let mut msg = EraseOnDrop(msg);
    run(engine, ctx, tag, msg.bytes(), params)
}

/// Erases the borrowed bytes when dropped, including during unwinding.
pub(crate) struct EraseOnDrop<'a>(pub(crate) &'a mut [u8]);

impl EraseOnDrop<'_> {
    pub(crate) fn bytes(&mut self) -> &mut [u8] {
        &mut *self.0
    }
}

impl Drop for EraseOnDrop<'_> {
    fn drop(&mut self) {
        erase(&mut *self.0);
    }
}

fn run<E>(
    engine: &E,
    ctx: &mut dyn ExecutionContext,
    tag: &mut [u8],
    msg: &mut [u8],
    params: &Argon2Params,
) -> Result<(), HashError>
where
    E: Argon2Engine + ?Sized,
{
    params.validate()?;
    let needed = engine.hash_buf_size(params);
    if tag.len() < needed {
        return Err(HashError::BufferTooSmall {
            needed,
            got: tag.len(),
        });
    }
    let hashed = engine.hash(tag, msg, params, ctx);
    let destroyed = ctx.destroy_thread_pool();
    hashed?;
    if let Err(e) = destroyed {
        tracing::warn!(error = %e, "thread pool teardown failed after hashing");
        return Err(e.into());
    }
    Ok(())
}

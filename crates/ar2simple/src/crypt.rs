//! crypt(3)-style hashing against a parameter string.

use ar2simple_alloc::erase;
use ar2simple_codec::{decode_with_rng, encode};
use ar2simple_context::{Argon2Engine, Context, ExecutionContext};
use rand::RngCore;

use crate::error::HashError;
use crate::hash::{hash_with, EraseOnDrop};

/// Hash `msg` under the parameters in `paramstr` and return the complete
/// parameter string with the computed tag.
///
/// `paramstr` may carry a tag or a `*N` placeholder, and its salt may be a
/// `*N` placeholder (filled from the thread-local generator). Verifying a
/// password is comparing the result with a stored string. `msg` is erased
/// before returning.
pub fn crypt<E>(engine: &E, msg: &mut [u8], paramstr: &str) -> Result<String, HashError>
where
    E: Argon2Engine + ?Sized,
{
    crypt_with_rng(engine, msg, paramstr, &mut rand::rng())
}

/// Like [`crypt`], drawing any placeholder salt from `rng`.
pub fn crypt_with_rng<E, R>(
    engine: &E,
    msg: &mut [u8],
    paramstr: &str,
    rng: &mut R,
) -> Result<String, HashError>
where
    E: Argon2Engine + ?Sized,
    R: RngCore + ?Sized,
{
    let mut msg = EraseOnDrop(msg);
    let mut ctx = Context::default();
    crypt_in(engine, &mut ctx, msg.bytes(), paramstr, rng)
}

fn crypt_in<E, R>(
    engine: &E,
    ctx: &mut Context,
    msg: &mut [u8],
    paramstr: &str,
    rng: &mut R,
) -> Result<String, HashError>
where
    E: Argon2Engine + ?Sized,
    R: RngCore + ?Sized,
{
    let decoded = decode_with_rng(paramstr, rng)?;
    let mut params = decoded.params;
    let result = if decoded.rest.is_empty() {
        hash_and_encode(engine, ctx, msg, &params)
    } else {
        Err(HashError::TrailingInput {
            offset: paramstr.len() - decoded.rest.len(),
        })
    };
    if let Some(salt) = params.salt.bytes_mut() {
        erase(salt);
    }
    result
}

fn hash_and_encode<E>(
    engine: &E,
    ctx: &mut Context,
    msg: &mut [u8],
    params: &ar2simple_core::Argon2Params,
) -> Result<String, HashError>
where
    E: Argon2Engine + ?Sized,
{
    let size = engine.hash_buf_size(params);
    let mut tag = ctx.allocate(size, 1, 0)?;
    hash_with(engine, ctx, &mut tag, msg, params)?;
    let encoded = encode(params, Some(&tag[..params.hash_len]))?;
    ctx.deallocate(tag);
    Ok(encoded)
}

#[cfg(test)]
mod tests {
    use super::*;
    use ar2simple_test_utils::LaneMixEngine;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    #[test]
    fn trailing_text_rejected_and_message_erased() {
        let engine = LaneMixEngine::new();
        let mut msg = b"pw".to_vec();
        let err = crypt(&engine, &mut msg, "$argon2i$m=8,t=1,p=1$c29tZXNhbHQ$*32 ").unwrap_err();
        assert_eq!(err, HashError::TrailingInput { offset: 36 });
        assert_eq!(err.os_code(), ar2simple_core::errno::EINVAL);
        assert!(msg.iter().all(|&b| b == 0));
    }

    #[test]
    fn placeholder_salt_drawn_from_rng() {
        let engine = LaneMixEngine::new();
        let s = "$argon2id$v=19$m=16,t=1,p=2$*16$*32";
        let a = crypt_with_rng(&engine, &mut b"pw".to_vec(), s, &mut ChaCha8Rng::seed_from_u64(9)).unwrap();
        let b = crypt_with_rng(&engine, &mut b"pw".to_vec(), s, &mut ChaCha8Rng::seed_from_u64(9)).unwrap();
        let c = crypt_with_rng(&engine, &mut b"pw".to_vec(), s, &mut ChaCha8Rng::seed_from_u64(10)).unwrap();
        assert_eq!(a, b);
        assert_ne!(a, c);
        assert!(a.starts_with("$argon2id$v=19$m=16,t=1,p=2$"));
    }
}

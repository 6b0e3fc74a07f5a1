//! Parameter-string encoding.

use ar2simple_core::{Argon2Params, Salt};
use base64::engine::general_purpose::STANDARD_NO_PAD;
use base64::Engine as _;

use crate::error::CodecError;

/// Encode the parameter part of a string, up to and including the `$`
/// that precedes the tag. Does not validate.
pub fn encode_params(params: &Argon2Params) -> String {
    let version = params
        .version
        .map(|v| format!("$v={}", v.number()))
        .unwrap_or_default();
    let mut out = format!(
        "${}{version}$m={},t={},p={}$",
        params.kind, params.m_cost, params.t_cost, params.lanes
    );
    match &params.salt {
        Salt::Value(bytes) => STANDARD_NO_PAD.encode_string(bytes, &mut out),
        Salt::Unspecified { len } => out.push_str(&format!("*{len}")),
    }
    out.push('$');
    out
}

/// Encode `params` followed by `tag`, or by `*hash_len` when no tag is
/// given.
///
/// The parameters are validated first, and a supplied tag must be exactly
/// `hash_len` bytes.
pub fn encode(params: &Argon2Params, tag: Option<&[u8]>) -> Result<String, CodecError> {
    params.validate()?;
    let mut out = encode_params(params);
    match tag {
        Some(tag) if tag.len() != params.hash_len => Err(CodecError::TagLength {
            expected: params.hash_len,
            actual: tag.len(),
        }),
        Some(tag) => {
            STANDARD_NO_PAD.encode_string(tag, &mut out);
            Ok(out)
        }
        None => {
            out.push_str(&format!("*{}", params.hash_len));
            Ok(out)
        }
    }
}

/// Base64 of a tag on its own, as it appears at the end of a full string.
pub fn encode_hash(tag: &[u8]) -> String {
    STANDARD_NO_PAD.encode(tag)
}

#[cfg(test)]
mod tests {
    use super::*;
    use ar2simple_core::{Argon2Type, ParamError, Version};

    fn params() -> Argon2Params {
        let mut p = Argon2Params::new(Argon2Type::Id, 65536, 2, 1);
        p.salt = Salt::Value(b"somesalt".to_vec());
        p
    }

    #[test]
    fn writes_version_only_when_present() {
        let mut p = params();
        assert_eq!(encode_params(&p), "$argon2id$v=19$m=65536,t=2,p=1$c29tZXNhbHQ$");
        p.version = None;
        assert_eq!(encode_params(&p), "$argon2id$m=65536,t=2,p=1$c29tZXNhbHQ$");
        p.version = Some(Version::V10);
        assert_eq!(encode_params(&p), "$argon2id$v=16$m=65536,t=2,p=1$c29tZXNhbHQ$");
    }

    #[test]
    fn placeholders_for_unknown_salt_and_tag() {
        let mut p = params();
        p.salt = Salt::Unspecified { len: 16 };
        assert_eq!(encode(&p, None).unwrap(), "$argon2id$v=19$m=65536,t=2,p=1$*16$*32");
    }

    #[test]
    fn tag_must_match_hash_len() {
        let p = params();
        assert_eq!(
            encode(&p, Some(&[0u8; 31])),
            Err(CodecError::TagLength {
                expected: 32,
                actual: 31
            })
        );
        let s = encode(&p, Some(&[0u8; 32])).unwrap();
        assert!(s.ends_with("$AAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAA"));
    }

    #[test]
    fn invalid_params_rejected() {
        let mut p = params();
        p.t_cost = 0;
        assert_eq!(encode(&p, None), Err(CodecError::Params(ParamError::TimeCostZero)));
    }

    #[test]
    fn hash_only() {
        assert_eq!(encode_hash(b"somesalt"), "c29tZXNhbHQ");
        assert_eq!(encode_hash(b""), "");
    }
}

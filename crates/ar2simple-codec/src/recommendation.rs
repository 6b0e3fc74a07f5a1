//! Recommended parameter strings.
//!
//! Both follow the first recommendation of RFC 9106 (t=1, p=4, 2 GiB of
//! memory, 128-bit salt, 256-bit tag). Environments exposed to side-channel
//! attacks get Argon2id; side-channel-free environments get Argon2d.

const SIDE_CHANNEL_FREE: &str = "$argon2d$v=19$m=2097152,t=1,p=4$*16$*32";
const SIDE_CHANNEL_EXPOSED: &str = "$argon2id$v=19$m=2097152,t=1,p=4$*16$*32";

/// A parameter string with `*` salt and tag placeholders, ready to pass
/// to a decoder (which fills in a random salt).
pub fn recommendation(side_channel_free: bool) -> &'static str {
    if side_channel_free {
        SIDE_CHANNEL_FREE
    } else {
        SIDE_CHANNEL_EXPOSED
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::decode;
    use ar2simple_core::{Argon2Type, Salt};

    #[test]
    fn recommendations_decode_and_validate() {
        for (free, kind) in [(true, Argon2Type::D), (false, Argon2Type::Id)] {
            let d = decode(recommendation(free)).unwrap();
            assert_eq!(d.params.kind, kind);
            assert_eq!(d.params.lanes, 4);
            assert_eq!(d.params.salt.len(), 16);
            assert_eq!(d.params.hash_len, 32);
            assert!(d.tag.is_none());
            assert_eq!(d.rest, "");
            d.params.validate().unwrap();

            let mut params = d.params;
            params.salt = Salt::Unspecified { len: 16 };
            assert_eq!(crate::encode(&params, None).unwrap(), recommendation(free));
        }
    }
}

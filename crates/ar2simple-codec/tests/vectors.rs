//! Reference parameter strings: decoding then re-encoding reproduces them.

use ar2simple_codec::{decode, encode, encode_hash, CodecError};
use ar2simple_core::{Argon2Type, Version};
use proptest::prelude::*;

const VECTORS: &[&str] = &[
    "$argon2d$v=16$m=8,t=1,p=1$ICAgICAgICA$Eyx1BxGazSuPQoy7osaQuo20Dw9VI97dYUOgcC3cMgw",
    "$argon2i$v=19$m=4096,t=3,p=1$fn5/f35+f38$9tqKA4WMEsSAOEUwatjxvJLSqL1j0GQkgbsfnpresDw",
    "$argon2id$v=16$m=8,t=1,p=1$ICAgICAgICA$fXq1aUbp9yhbn+EQc4AzUUE6AKnHAkvzIXsN6J4ukvE",
    "$argon2d$v=16$m=8,t=1,p=1$ICAgICAgICA$X54KZYxUSfMUihzebb70sKbheabHilo8gsUldrVU4IU",
    "$argon2d$v=16$m=8,t=1,p=1$ICAgICAgICA$NjODMrWrS7zeivNNpHsuxD9c6uDmUQ6YqPRhb8H5DSNw9n683FUCJZ3tyxgfJpYYANI+01WT/S5zp1UVs+qNRwnkdEyLKZMg+DIOXVc9z1po9ZlZG8+Gp4g5brqfza3lvkR9vw",
    "$argon2ds$v=16$m=8,t=1,p=1$ICAgICAgICA$zgdykk9ZjN5VyrW0LxGw8LmrJ1Z6fqSC+3jPQtn4n0s",
    "$argon2i$m=65536,t=2,p=1$c29tZXNhbHQ$9sTbSlTio3Biev89thdrlKKiCaYsjjYVJxGAL3swxpQ",
    "$argon2i$m=256,t=2,p=1$c29tZXNhbHQ$/U3YPXYsSb3q9XxHvc0MLxur+GP960kN9j7emXX8zwY",
    "$argon2i$m=65536,t=1,p=1$c29tZXNhbHQ$gWMFUrjzsfSM2xmSxMZ4ZD1JCytetP9sSzQ4tWIXJLI",
    "$argon2i$m=65536,t=4,p=1$c29tZXNhbHQ$8hLwFhXm6110c03D70Ct4tUdBSRo2MaUQKOh8sHChHs",
    "$argon2i$m=65536,t=2,p=1$c29tZXNhbHQ$6ckCB0tnVFMaOgvlGeW69ASzDOabPwGsO/ISKZYBCaM",
    "$argon2i$m=65536,t=2,p=1$ZGlmZnNhbHQ$eaEDuQ/orvhXDLMfyLIiWXeJFvgza3vaw4kladTxxJc",
    "$argon2i$v=16$m=256,t=2,p=1$c29tZXNhbHQ$/U3YPXYsSb3q9XxHvc0MLxur+GP960kN9j7emXX8zwY",
    "$argon2i$v=19$m=256,t=2,p=1$c29tZXNhbHQ$iekCn0Y3spW+sCcFanM2xBT63UP2sghkUoHLIUpWRS8",
    "$argon2i$v=19$m=65536,t=1,p=1$c29tZXNhbHQ$0WgHXE2YXhPr6uVgz4uUw7XYoWxRkWtvSsLaOsEbvs8",
    "$argon2i$v=19$m=65536,t=2,p=1$c29tZXNhbHQ$FK6NoBr+qHAMI1jc73xTWNkCEoK9iGY6RWL1n7dNIu4",
    "$argon2id$v=19$m=256,t=2,p=1$c29tZXNhbHQ$nf65EOgLrQMR/uIPnA4rEsF5h7TKyQwu9U1bMCHGi/4",
    "$argon2id$v=19$m=65536,t=1,p=1$c29tZXNhbHQ$9qWtwbpyPd3vm1rB1GThgPzZ3/ydHL92zKL+15XZypg",
    "$argon2id$v=19$m=65536,t=4,p=1$c29tZXNhbHQ$kCXUjmjvc5XMqQedpMTsOv+zyJEf5PhtGiUghW9jFyw",
    "$argon2id$v=19$m=65536,t=2,p=1$c29tZXNhbHQ$C4TWUs9rDEvq7w3+J4umqA32aWKB1+DSiRuBfYxFj94",
    "$argon2i$m=256,t=2,p=2$c29tZXNhbHQ$tsEVYKap1h6scGt5ovl9aLRGOqOth+AMB+KwHpDFZPs",
    "$argon2i$v=16$m=256,t=2,p=2$c29tZXNhbHQ$tsEVYKap1h6scGt5ovl9aLRGOqOth+AMB+KwHpDFZPs",
    "$argon2i$v=19$m=256,t=2,p=2$c29tZXNhbHQ$T/XOJ2mh1/TIpJHfCdQan76Q5esCFVoT5MAeIM1Oq2E",
    "$argon2id$v=19$m=256,t=2,p=2$c29tZXNhbHQ$bQk8UB/VmZZF4Oo79iDXuL5/0ttZwg2f/5U52iv1cDc",
    "$argon2id$v=19$m=2048,t=16,p=16$c29tZXNhbHQ$FRWpYzcrsos+DHNInvfsl0g8mZBdPqUdarIYh/Pnc1g",
];

#[test]
fn vectors_round_trip() {
    for &s in VECTORS {
        let d = decode(s).unwrap_or_else(|e| panic!("{s}: {e}"));
        assert_eq!(d.rest, "", "{s}");
        let tag = d.tag.as_deref().expect("vector carries a tag");
        assert_eq!(tag.len(), d.params.hash_len);
        assert_eq!(encode(&d.params, Some(tag)).unwrap(), s);
        assert!(s.ends_with(&format!("${}", encode_hash(tag))));
    }
}

#[test]
fn version_field_presence_is_preserved() {
    let legacy = decode("$argon2i$m=256,t=2,p=2$c29tZXNhbHQ$tsEVYKap1h6scGt5ovl9aLRGOqOth+AMB+KwHpDFZPs").unwrap();
    let explicit = decode("$argon2i$v=16$m=256,t=2,p=2$c29tZXNhbHQ$tsEVYKap1h6scGt5ovl9aLRGOqOth+AMB+KwHpDFZPs").unwrap();
    assert_eq!(legacy.params.version, None);
    assert_eq!(explicit.params.version, Some(Version::V10));
    assert_eq!(legacy.params.effective_version(), explicit.params.effective_version());
    assert_eq!(legacy.tag, explicit.tag);
}

#[test]
fn every_variant_name_decodes() {
    let kinds: Vec<Argon2Type> = VECTORS
        .iter()
        .map(|s| decode(s).unwrap().params.kind)
        .collect();
    for kind in Argon2Type::ALL {
        assert!(kinds.contains(&kind), "{kind} missing from vectors");
    }
}

#[test]
fn long_tag_sets_hash_len() {
    let d = decode(VECTORS[4]).unwrap();
    assert_eq!(d.params.hash_len, 128);
}

#[test]
fn truncated_vectors_fail_cleanly() {
    let s = VECTORS[1];
    for cut in 0..s.find("$9tq").unwrap_or(0) {
        assert!(decode(&s[..cut]).is_err(), "prefix {:?} decoded", &s[..cut]);
    }
}

proptest! {
    #[test]
    fn decode_never_panics(s in "\\PC{0,80}") {
        let _ = decode(&s);
    }

    #[test]
    fn decode_never_panics_on_near_misses(
        kind in prop::sample::select(vec!["argon2i", "argon2d", "argon2id", "argon2ds", "argon2x", ""]),
        nums in prop::collection::vec("[0-9]{0,12}", 4),
        salt in "[A-Za-z0-9+/*$]{0,16}",
        tag in "[A-Za-z0-9+/*$]{0,48}",
    ) {
        let s = format!("${kind}$v={}$m={},t={},p={}${salt}${tag}", nums[0], nums[1], nums[2], nums[3]);
        match decode(&s) {
            Ok(d) => prop_assert!(d.params.hash_len <= u32::MAX as usize),
            Err(CodecError::Number { .. })
            | Err(CodecError::Malformed { .. })
            | Err(CodecError::Base64 { .. })
            | Err(CodecError::UnknownType { .. })
            | Err(CodecError::UnsupportedVersion { .. }) => {}
            Err(other) => prop_assert!(false, "unexpected error {other:?}"),
        }
    }
}

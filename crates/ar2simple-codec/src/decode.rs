//! Parameter-string decoding.

use ar2simple_core::{Argon2Params, Argon2Type, Salt, Version};
use base64::engine::general_purpose::STANDARD_NO_PAD;
use base64::Engine as _;
use rand::RngCore;

use crate::error::{CodecError, NumberError};

/// A decoded parameter string.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Decoded<'a> {
    /// The hashing parameters. A `*N` salt has already been replaced with
    /// random bytes; `secret` and `associated_data` are `None`.
    pub params: Argon2Params,
    /// The tag, when the string carried one rather than `*N`.
    pub tag: Option<Vec<u8>>,
    /// Input left after the tag.
    pub rest: &'a str,
}

/// Decode `s`, drawing any random salt from the thread-local generator.
pub fn decode(s: &str) -> Result<Decoded<'_>, CodecError> {
    decode_with_rng(s, &mut rand::rng())
}

/// Decode `s`, drawing any random salt from `rng`.
pub fn decode_with_rng<'a, R>(s: &'a str, rng: &mut R) -> Result<Decoded<'a>, CodecError>
where
    R: RngCore + ?Sized,
{
    let mut cur = Cursor::new(s);

    cur.expect('$')?;
    let name = cur.field()?;
    let kind = Argon2Type::from_name(name).ok_or_else(|| CodecError::UnknownType {
        name: name.to_string(),
    })?;
    cur.expect('$')?;

    let version = if cur.eat("v=") {
        let number = cur.number("v")?;
        cur.expect('$')?;
        Some(Version::from_number(number).ok_or(CodecError::UnsupportedVersion { number })?)
    } else {
        None
    };

    cur.literal("m=")?;
    let m_cost = cur.number("m")?;
    cur.literal(",t=")?;
    let t_cost = cur.number("t")?;
    cur.literal(",p=")?;
    let lanes = cur.number("p")?;
    cur.expect('$')?;

    let salt = if cur.eat("*") {
        let len = cur.number("salt")? as usize;
        Salt::Value(random_salt(len, rng)?)
    } else {
        Salt::Value(cur.base64("salt", |c| c != '$')?)
    };
    cur.expect('$')?;

    let (tag, hash_len) = if cur.eat("*") {
        (None, cur.number("tag")? as usize)
    } else {
        let tag = cur.base64("tag", is_base64_char)?;
        if tag.is_empty() {
            return Err(cur.malformed("tag"));
        }
        let len = tag.len();
        (Some(tag), len)
    };

    Ok(Decoded {
        params: Argon2Params {
            kind,
            version,
            m_cost,
            t_cost,
            lanes,
            salt,
            hash_len,
            secret: None,
            associated_data: None,
        },
        tag,
        rest: cur.rest(),
    })
}

/// `len` random bytes; an allocation failure is an error, not an abort.
fn random_salt<R>(len: usize, rng: &mut R) -> Result<Vec<u8>, CodecError>
where
    R: RngCore + ?Sized,
{
    let mut bytes = Vec::new();
    bytes
        .try_reserve_exact(len)
        .map_err(|_| CodecError::OutOfMemory { bytes: len })?;
    bytes.resize(len, 0);
    rng.fill_bytes(&mut bytes);
    Ok(bytes)
}

fn is_base64_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '+' || c == '/'
}

/// Parse a decimal `u32` with no sign. A single leading zero is tolerated
/// (`01` is 1); a `00` prefix is not.
fn parse_u32(digits: &str) -> Result<u32, NumberError> {
    if digits.is_empty() || digits.starts_with("00") {
        return Err(NumberError::Invalid);
    }
    digits.bytes().try_fold(0u32, |acc, b| {
        acc.checked_mul(10)
            .and_then(|v| v.checked_add(u32::from(b - b'0')))
            .ok_or(NumberError::Overflow)
    })
}

struct Cursor<'a> {
    src: &'a str,
    pos: usize,
}

impl<'a> Cursor<'a> {
    fn new(src: &'a str) -> Self {
        Self { src, pos: 0 }
    }

    fn rest(&self) -> &'a str {
        &self.src[self.pos..]
    }

    fn malformed(&self, expected: &'static str) -> CodecError {
        CodecError::Malformed {
            offset: self.pos,
            expected,
        }
    }

    fn eat(&mut self, prefix: &str) -> bool {
        if self.rest().starts_with(prefix) {
            self.pos += prefix.len();
            true
        } else {
            false
        }
    }

    fn expect(&mut self, c: char) -> Result<(), CodecError> {
        let mut buf = [0u8; 4];
        if self.eat(c.encode_utf8(&mut buf)) {
            Ok(())
        } else {
            Err(self.malformed(if c == '$' { "'$'" } else { "separator" }))
        }
    }

    fn literal(&mut self, lit: &'static str) -> Result<(), CodecError> {
        if self.eat(lit) {
            Ok(())
        } else {
            Err(self.malformed(lit))
        }
    }

    /// Take characters while `keep` holds.
    fn take_while(&mut self, keep: impl Fn(char) -> bool) -> &'a str {
        let rest = self.rest();
        let len = rest.find(|c: char| !keep(c)).unwrap_or(rest.len());
        self.pos += len;
        &rest[..len]
    }

    /// A `$`-terminated field; the terminator must be present.
    fn field(&mut self) -> Result<&'a str, CodecError> {
        if !self.rest().contains('$') {
            return Err(self.malformed("'$'"));
        }
        Ok(self.take_while(|c| c != '$'))
    }

    fn number(&mut self, field: &'static str) -> Result<u32, CodecError> {
        let digits = self.take_while(|c| c.is_ascii_digit());
        parse_u32(digits).map_err(|kind| CodecError::Number { field, kind })
    }

    fn base64(
        &mut self,
        field: &'static str,
        keep: impl Fn(char) -> bool,
    ) -> Result<Vec<u8>, CodecError> {
        let text = self.take_while(keep);
        STANDARD_NO_PAD
            .decode(text)
            .map_err(|e| CodecError::Base64 {
                field,
                reason: e.to_string(),
            })
    }
}

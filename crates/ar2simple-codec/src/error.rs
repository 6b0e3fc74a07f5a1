//! Codec error types.

use std::error::Error;
use std::fmt;

use ar2simple_core::{errno, ParamError};

/// Why a decimal field was rejected.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum NumberError {
    /// No digits, or a `00` prefix.
    Invalid,
    /// Larger than `u32::MAX`.
    Overflow,
}

/// Errors from encoding or decoding parameter strings.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum CodecError {
    /// The string does not follow the `$type$...` layout.
    Malformed {
        /// Byte offset where parsing stopped.
        offset: usize,
        /// What was expected there.
        expected: &'static str,
    },
    /// The type name is not one of the Argon2 variants.
    UnknownType {
        /// The rejected name.
        name: String,
    },
    /// The `v=` field names a version other than 16 or 19.
    UnsupportedVersion {
        /// The rejected version number.
        number: u32,
    },
    /// A decimal field is invalid or out of range.
    Number {
        /// Field name (`v`, `m`, `t`, `p`, `salt`, `tag`).
        field: &'static str,
        /// The failure kind.
        kind: NumberError,
    },
    /// A base64 field could not be decoded.
    Base64 {
        /// Field name (`salt` or `tag`).
        field: &'static str,
        /// The decoder's message.
        reason: String,
    },
    /// A tag passed to the encoder does not match `hash_len`.
    TagLength {
        /// The configured tag length.
        expected: usize,
        /// The supplied tag length.
        actual: usize,
    },
    /// The parameters are outside Argon2's accepted ranges.
    Params(ParamError),
    /// A buffer for a decoded field could not be allocated.
    OutOfMemory {
        /// Requested size in bytes.
        bytes: usize,
    },
}

impl CodecError {
    /// The OS-style error number for this error.
    pub fn os_code(&self) -> i32 {
        match self {
            Self::Number {
                kind: NumberError::Overflow,
                ..
            } => errno::ERANGE,
            Self::Params(e) => e.os_code(),
            Self::OutOfMemory { .. } => errno::ENOMEM,
            _ => errno::EINVAL,
        }
    }
}

impl fmt::Display for CodecError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Malformed { offset, expected } => {
                write!(f, "malformed parameter string at byte {offset}: expected {expected}")
            }
            Self::UnknownType { name } => write!(f, "unknown Argon2 type {name:?}"),
            Self::UnsupportedVersion { number } => write!(f, "unsupported Argon2 version {number}"),
            Self::Number { field, kind } => match kind {
                NumberError::Invalid => write!(f, "invalid number in field {field}"),
                NumberError::Overflow => write!(f, "number in field {field} out of range"),
            },
            Self::Base64 { field, reason } => write!(f, "invalid base64 in {field}: {reason}"),
            Self::TagLength { expected, actual } => {
                write!(f, "tag is {actual} bytes, parameters specify {expected}")
            }
            Self::Params(e) => write!(f, "{e}"),
            Self::OutOfMemory { bytes } => write!(f, "cannot allocate {bytes} bytes"),
        }
    }
}

impl Error for CodecError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Params(e) => Some(e),
            _ => None,
        }
    }
}

impl From<ParamError> for CodecError {
    fn from(e: ParamError) -> Self {
        Self::Params(e)
    }
}

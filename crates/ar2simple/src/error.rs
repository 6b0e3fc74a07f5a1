//! Errors from [`hash`](crate::hash) and [`crypt`](crate::crypt).

use std::error::Error;
use std::fmt;

use ar2simple_codec::CodecError;
use ar2simple_context::{ContextError, EngineError};
use ar2simple_core::{errno, ParamError};

/// Everything that can go wrong computing or formatting a hash.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum HashError {
    /// The parameter string could not be decoded or encoded.
    Codec(CodecError),
    /// The parameters are outside Argon2's accepted ranges.
    Params(ParamError),
    /// The execution context failed outside the engine.
    Context(ContextError),
    /// The engine failed.
    Engine(EngineError),
    /// The output buffer is smaller than the engine requires.
    BufferTooSmall {
        /// Bytes the engine requires.
        needed: usize,
        /// Bytes supplied.
        got: usize,
    },
    /// Text follows the tag in a parameter string.
    TrailingInput {
        /// Byte offset of the first unexpected character.
        offset: usize,
    },
}

impl HashError {
    /// The OS-style error number for this error.
    pub fn os_code(&self) -> i32 {
        match self {
            Self::Codec(e) => e.os_code(),
            Self::Params(e) => e.os_code(),
            Self::Context(e) => e.os_code(),
            Self::Engine(e) => e.os_code(),
            Self::BufferTooSmall { .. } | Self::TrailingInput { .. } => errno::EINVAL,
        }
    }
}

impl fmt::Display for HashError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Codec(e) => write!(f, "parameter string: {e}"),
            Self::Params(e) => write!(f, "invalid parameters: {e}"),
            Self::Context(e) => write!(f, "execution context: {e}"),
            Self::Engine(e) => write!(f, "{e}"),
            Self::BufferTooSmall { needed, got } => {
                write!(f, "output buffer of {got} bytes, engine needs {needed}")
            }
            Self::TrailingInput { offset } => {
                write!(f, "unexpected text after tag at byte {offset}")
            }
        }
    }
}

impl Error for HashError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Codec(e) => Some(e),
            Self::Params(e) => Some(e),
            Self::Context(e) => Some(e),
            Self::Engine(e) => Some(e),
            _ => None,
        }
    }
}

impl From<CodecError> for HashError {
    fn from(e: CodecError) -> Self {
        Self::Codec(e)
    }
}

impl From<ParamError> for HashError {
    fn from(e: ParamError) -> Self {
        Self::Params(e)
    }
}

impl From<ContextError> for HashError {
    fn from(e: ContextError) -> Self {
        Self::Context(e)
    }
}

impl From<EngineError> for HashError {
    fn from(e: EngineError) -> Self {
        Self::Engine(e)
    }
}

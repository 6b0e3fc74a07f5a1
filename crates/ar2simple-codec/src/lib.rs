//! Argon2 parameter strings.
//!
//! The format is the PHC-style string used by Argon2 tools:
//!
//! ```text
//! $argon2id$v=19$m=65536,t=2,p=1$c29tZXNhbHQ$<base64 tag>
//! ```
//!
//! The `v=` field is optional (absent means version 1.0). Either the salt
//! or the tag may be replaced by `*N`, meaning "N bytes, not yet known":
//! a `*N` salt is filled with random bytes on decode, and a `*N` tag only
//! fixes the tag length. Base64 is the standard alphabet without padding.

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

pub mod decode;
pub mod encode;
pub mod error;
pub mod recommendation;

pub use decode::{decode, decode_with_rng, Decoded};
pub use encode::{encode, encode_hash, encode_params};
pub use error::{CodecError, NumberError};
pub use recommendation::recommendation;

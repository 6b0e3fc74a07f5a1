//! Simplified Argon2 hashing.
//!
//! This crate bundles everything an application needs around an external
//! Argon2 core ([`Argon2Engine`]):
//!
//! - the default execution context (CPU probing, a lane worker pool, and
//!   a secure-erasing allocator) in [`context`];
//! - PHC-style parameter strings in [`codec`];
//! - one-call [`hash`] and crypt(3)-style [`crypt`] functions.
//!
//! # Quick start
//!
//! ```ignore
//! use ar2simple::prelude::*;
//!
//! let engine = MyArgon2Core::new();
//! let stored = ar2simple::crypt(&engine, &mut password, recommendation(false))?;
//! // Later: verify by hashing against the stored string.
//! let again = ar2simple::crypt(&engine, &mut attempt, &stored)?;
//! assert_eq!(again, stored);
//! ```

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

mod crypt;
mod error;
mod hash;

pub use crypt::{crypt, crypt_with_rng};
pub use error::HashError;
pub use hash::{hash, hash_with};

pub use ar2simple_alloc as alloc;
pub use ar2simple_codec as codec;
pub use ar2simple_context as context;
pub use ar2simple_core::errno;

pub use ar2simple_context::{Argon2Engine, Context, ContextConfig, ExecutionContext};
pub use ar2simple_core::{Argon2Params, Argon2Type, Job, Salt, Version};

/// Common imports for engine authors and applications.
pub mod prelude {
    pub use ar2simple_alloc::{erase, SecureBuf};
    pub use ar2simple_codec::{decode, encode, encode_hash, recommendation, Decoded};
    pub use ar2simple_context::{
        dispatch_lanes, Argon2Engine, Context, ContextConfig, EngineError, ExecutionContext,
    };
    pub use ar2simple_core::{Argon2Params, Argon2Type, Job, Salt, Version};

    pub use crate::{crypt, hash, HashError};
}

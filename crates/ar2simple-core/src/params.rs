//! Argon2 hashing parameters.
//!
//! [`Argon2Params`] is the decoded form of a parameter string such as
//! `$argon2id$v=19$m=65536,t=2,p=1$c29tZXNhbHQ$…`. The salt may be left
//! unspecified (only its length known), in which case the codec renders
//! it as `*len` and the decoder fills it with random bytes.

use std::fmt;

use crate::error::ParamError;

/// Largest accepted lane count (`2^24 - 1`).
pub const MAX_LANES: u32 = 0x00FF_FFFF;

/// Smallest accepted tag length in bytes.
pub const MIN_HASH_LEN: usize = 4;

/// Smallest accepted salt length in bytes.
pub const MIN_SALT_LEN: usize = 8;

/// Argon2 variant.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Argon2Type {
    /// Data-dependent addressing.
    D,
    /// Data-independent addressing.
    I,
    /// Hybrid: independent for the first half pass, dependent after.
    Id,
    /// Argon2d with S-box hardening.
    Ds,
}

impl Argon2Type {
    /// All variants, in parse order.
    pub const ALL: [Argon2Type; 4] = [Self::D, Self::I, Self::Id, Self::Ds];

    /// Lower-case name as it appears in parameter strings.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::D => "argon2d",
            Self::I => "argon2i",
            Self::Id => "argon2id",
            Self::Ds => "argon2ds",
        }
    }

    /// Parse a lower-case variant name.
    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|t| t.as_str() == name)
    }
}

impl fmt::Display for Argon2Type {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Argon2 algorithm version.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[repr(u32)]
pub enum Version {
    /// Version 1.0 (`v=16`).
    V10 = 0x10,
    /// Version 1.3 (`v=19`).
    V13 = 0x13,
}

impl Version {
    /// Numeric value as written after `v=`.
    pub fn number(self) -> u32 {
        self as u32
    }

    /// Map a numeric version back to the enum.
    pub fn from_number(n: u32) -> Option<Self> {
        match n {
            0x10 => Some(Self::V10),
            0x13 => Some(Self::V13),
            _ => None,
        }
    }
}

/// The salt carried by a parameter set.
#[derive(Clone, PartialEq, Eq)]
pub enum Salt {
    /// Concrete salt bytes.
    Value(Vec<u8>),
    /// Only the length is known; encoded as `*len`.
    Unspecified {
        /// Salt length in bytes.
        len: usize,
    },
}

impl Salt {
    /// Salt length in bytes, whether or not the bytes are known.
    pub fn len(&self) -> usize {
        match self {
            Self::Value(bytes) => bytes.len(),
            Self::Unspecified { len } => *len,
        }
    }

    /// Whether the salt has zero length.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// The salt bytes, if known.
    pub fn bytes(&self) -> Option<&[u8]> {
        match self {
            Self::Value(bytes) => Some(bytes),
            Self::Unspecified { .. } => None,
        }
    }

    /// Mutable salt bytes, if known.
    pub fn bytes_mut(&mut self) -> Option<&mut [u8]> {
        match self {
            Self::Value(bytes) => Some(bytes),
            Self::Unspecified { .. } => None,
        }
    }
}

// Salt bytes are never printed.
impl fmt::Debug for Salt {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Value(bytes) => write!(f, "Salt::Value(<{} bytes>)", bytes.len()),
            Self::Unspecified { len } => write!(f, "Salt::Unspecified {{ len: {len} }}"),
        }
    }
}

/// A complete set of Argon2 hashing parameters.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Argon2Params {
    /// Argon2 variant.
    pub kind: Argon2Type,
    /// Algorithm version. `None` means the parameter string had no `v=`
    /// field; the effective version is then 1.0.
    pub version: Option<Version>,
    /// Memory cost in KiB.
    pub m_cost: u32,
    /// Time cost (number of passes).
    pub t_cost: u32,
    /// Degree of parallelism (lane count).
    pub lanes: u32,
    /// Salt bytes or salt length.
    pub salt: Salt,
    /// Tag (hash output) length in bytes.
    pub hash_len: usize,
    /// Optional secret (pepper). Never encoded in parameter strings.
    pub secret: Option<Vec<u8>>,
    /// Optional associated data. Never encoded in parameter strings.
    pub associated_data: Option<Vec<u8>>,
}

impl Argon2Params {
    /// Parameters with the given costs, a salt placeholder of 16 bytes and
    /// a 32-byte tag.
    pub fn new(kind: Argon2Type, m_cost: u32, t_cost: u32, lanes: u32) -> Self {
        Self {
            kind,
            version: Some(Version::V13),
            m_cost,
            t_cost,
            lanes,
            salt: Salt::Unspecified { len: 16 },
            hash_len: 32,
            secret: None,
            associated_data: None,
        }
    }

    /// The version the engine must run: the explicit one, or 1.0.
    pub fn effective_version(&self) -> Version {
        self.version.unwrap_or(Version::V10)
    }

    /// Check every range Argon2 imposes on the parameters.
    pub fn validate(&self) -> Result<(), ParamError> {
        if self.lanes == 0 || self.lanes > MAX_LANES {
            return Err(ParamError::LanesOutOfRange { lanes: self.lanes });
        }
        let minimum = 8 * u64::from(self.lanes);
        if u64::from(self.m_cost) < minimum {
            return Err(ParamError::MemoryTooSmall {
                m_cost: self.m_cost,
                minimum,
            });
        }
        if self.t_cost == 0 {
            return Err(ParamError::TimeCostZero);
        }
        if self.hash_len < MIN_HASH_LEN {
            return Err(ParamError::HashTooShort {
                hash_len: self.hash_len,
            });
        }
        if self.salt.len() < MIN_SALT_LEN {
            return Err(ParamError::SaltTooShort {
                salt_len: self.salt.len(),
            });
        }
        Ok(())
    }
}

//! Source platforms and salted identity hashing.
//!
//! ## Security Model
//!
//! The identity hash is computed as:
//! `HMAC-SHA256(salt, "<source>|<user>|identity_v1")`, hex encoded (64 chars).
//!
//! The raw user handle is consumed when an [`Identity`] is built and is never
//! stored, serialized or logged. Only the hash travels downstream, where it is
//! both the run identity and the registry lookup key.

use hmac::{Hmac, Mac};
use serde::{Deserialize, Serialize};
use sha2::Sha256;
use std::fmt;
use std::str::FromStr;

/// Platform a chat export was taken from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DataSource {
    /// Telegram (TDLib message records).
    Telegram,
}

/// Export names no [`DataSource`] matches.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("Unknown source platform: {0}")]
pub struct UnknownSource(pub String);

impl FromStr for DataSource {
    type Err = UnknownSource;

    /// Parse a source from its export name (case-insensitive).
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "telegram" => Ok(Self::Telegram),
            _ => Err(UnknownSource(s.to_string())),
        }
    }
}

impl DataSource {
    /// Canonical lowercase name.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Telegram => "telegram",
        }
    }
}

impl fmt::Display for DataSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Salted fingerprint of a (source, user) pair.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct IdentityHash(String);

impl IdentityHash {
    /// Version marker mixed into the HMAC message.
    const HASH_VERSION: &'static str = "identity_v1";

    /// Compute the identity hash for a source/user pair under `salt`.
    pub fn compute(source: DataSource, user: &str, salt: &str) -> Self {
        let canonical = format!("{}|{}|{}", source.as_str(), user, Self::HASH_VERSION);

        let mut mac = Hmac::<Sha256>::new_from_slice(salt.as_bytes())
            .expect("HMAC accepts any key size");
        mac.update(canonical.as_bytes());

        Self(hex::encode(mac.finalize().into_bytes()))
    }

    /// Wrap an already computed hash (e.g. read back from a registry).
    pub fn from_hex(hash: impl Into<String>) -> Self {
        Self(hash.into())
    }

    /// Get the hash as a string.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for IdentityHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// The submitter's identity as retained by the pipeline.
///
/// Holds the source platform and the salted hash only.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Identity {
    source: DataSource,
    hash: IdentityHash,
}

impl Identity {
    /// Hash `user` under `salt` and drop the raw handle.
    pub fn new(source: DataSource, user: &str, salt: &str) -> Self {
        Self {
            source,
            hash: IdentityHash::compute(source, user, salt),
        }
    }

    /// Source platform.
    pub fn source(&self) -> DataSource {
        self.source
    }

    /// Salted identity hash.
    pub fn hash(&self) -> &IdentityHash {
        &self.hash
    }
}

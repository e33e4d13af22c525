//! Historical registry backends.
//!
//! The registry holds conversations accepted by earlier proofs, keyed by
//! identity hash. The pipeline reads it exactly once per run, before
//! scoring, and treats the result as an immutable snapshot.

pub mod memory;
pub mod file;

use async_trait::async_trait;
use crate::types::{IdentityHash, RegistryEntry};

/// Error type for registry reads.
#[derive(Debug, thiserror::Error)]
pub enum RegistryError {
    /// Backend could not be reached or read.
    #[error("Registry unavailable: {0}")]
    Unavailable(String),
    /// Backend returned data that does not decode as registry records.
    #[error("Malformed registry data: {0}")]
    Malformed(String),
}

/// Read access to the historical registry.
///
/// Implementations must return entries in a stable order and must return an
/// empty list, not an error, for an identity that was never seen.
#[async_trait]
pub trait RegistryClient: Send + Sync {
    /// Fetch all previously accepted conversations for an identity.
    async fn fetch_chat_data(&self, identity: &IdentityHash) -> Result<Vec<RegistryEntry>, RegistryError>;
}

pub use memory::InMemoryRegistry;
pub use file::JsonFileRegistry;

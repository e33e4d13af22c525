//! In-memory registry for tests and local runs.

use std::collections::BTreeMap;
use async_trait::async_trait;
use parking_lot::RwLock;

use crate::types::{IdentityHash, RegistryEntry, RegistryRecord};
use super::{RegistryClient, RegistryError};

/// In-memory registry.
///
/// Uses a BTreeMap for deterministic iteration; entries per identity keep
/// insertion order.
#[derive(Debug, Default)]
pub struct InMemoryRegistry {
    entries: RwLock<BTreeMap<IdentityHash, Vec<RegistryEntry>>>,
}

impl InMemoryRegistry {
    /// Create a new empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a single entry for an identity.
    pub fn add_entry(&self, identity: IdentityHash, entry: RegistryEntry) {
        self.entries.write().entry(identity).or_default().push(entry);
    }

    /// Append every chat of an accepted proof's record.
    pub fn append_record(&self, record: RegistryRecord) {
        let identity = record.source_id.clone();
        let mut entries = self.entries.write();
        entries
            .entry(identity)
            .or_default()
            .extend(record.into_entries());
    }

    /// Number of entries stored for an identity.
    pub fn num_entries(&self, identity: &IdentityHash) -> usize {
        self.entries.read().get(identity).map(Vec::len).unwrap_or(0)
    }
}

#[async_trait]
impl RegistryClient for InMemoryRegistry {
    async fn fetch_chat_data(&self, identity: &IdentityHash) -> Result<Vec<RegistryEntry>, RegistryError> {
        Ok(self.entries.read().get(identity).cloned().unwrap_or_default())
    }
}

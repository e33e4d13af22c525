//! Registry backed by a JSON snapshot file.
//!
//! The file holds an array of `RegistryRecord`s, as produced by
//! `ProofResult::registry_record()`. It is read on every fetch, so an
//! unreadable or missing file surfaces as `RegistryError::Unavailable`
//! and the pipeline degrades instead of failing.

use std::path::{Path, PathBuf};
use async_trait::async_trait;

use crate::types::{IdentityHash, RegistryEntry, RegistryRecord};
use super::{RegistryClient, RegistryError};

/// Registry reading `RegistryRecord`s from a JSON file.
#[derive(Debug, Clone)]
pub struct JsonFileRegistry {
    path: PathBuf,
}

impl JsonFileRegistry {
    /// Create a registry over `path`.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Snapshot file path.
    pub fn path(&self) -> &Path {
        &self.path
    }
}

#[async_trait]
impl RegistryClient for JsonFileRegistry {
    async fn fetch_chat_data(&self, identity: &IdentityHash) -> Result<Vec<RegistryEntry>, RegistryError> {
        let bytes = tokio::fs::read(&self.path).await.map_err(|e| {
            RegistryError::Unavailable(format!("{}: {}", self.path.display(), e))
        })?;

        let records: Vec<RegistryRecord> = serde_json::from_slice(&bytes)
            .map_err(|e| RegistryError::Malformed(e.to_string()))?;

        Ok(records
            .into_iter()
            .filter(|record| &record.source_id == identity)
            .flat_map(RegistryRecord::into_entries)
            .collect())
    }
}

//! Text-feature collaborators: sentiment and keyword extraction.
//!
//! Extraction is the expensive step of a run (model invocations), so the
//! pipeline only calls it for conversations that pass the uniqueness gate,
//! on a bounded worker pool with a per-call timeout.

pub mod frequency;
pub mod cache;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::types::{Keyword, SentimentMap};

/// Keyword extraction method.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum KeywordMethod {
    /// Embedding-similarity keywords.
    KeyBert,
    /// Topic-model keywords.
    Lda,
}

impl fmt::Display for KeywordMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::KeyBert => write!(f, "keybert"),
            Self::Lda => write!(f, "lda"),
        }
    }
}

/// Error from a text-feature collaborator.
#[derive(Debug, Clone, thiserror::Error)]
pub enum ExtractionError {
    /// The collaborator reported a failure.
    #[error("Feature extraction failed: {0}")]
    Failed(String),
    /// The call exceeded its time budget.
    #[error("Feature extraction timed out after {0}ms")]
    Timeout(u64),
    /// The worker running the call panicked or was cancelled.
    #[error("Feature extraction worker aborted: {0}")]
    WorkerAborted(String),
}

/// Sentiment and keyword extraction.
///
/// Implementations must be deterministic for determinism of proof results.
#[async_trait]
pub trait TextFeatures: Send + Sync {
    /// Sentiment label → score for `text`.
    async fn sentiment(&self, text: &str) -> Result<SentimentMap, ExtractionError>;

    /// Up to `max_k` keywords for `text`, strongest first.
    async fn keywords(
        &self,
        text: &str,
        max_k: usize,
        method: KeywordMethod,
    ) -> Result<Vec<Keyword>, ExtractionError>;
}

pub use frequency::FrequencyTextFeatures;
pub use cache::{CacheConfig, CacheStats, CachedTextFeatures};

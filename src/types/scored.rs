//! Text-feature results for conversations that passed the uniqueness gate.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use super::conversation::ChatId;

/// Sentiment label → score. BTreeMap keeps serialization canonical.
pub type SentimentMap = BTreeMap<String, f64>;

/// One extracted keyword with its weight.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Keyword {
    /// Extracted term or phrase.
    pub term: String,
    /// Method-specific relevance weight.
    pub weight: f64,
}

impl Keyword {
    /// Create a keyword.
    pub fn new(term: impl Into<String>, weight: f64) -> Self {
        Self {
            term: term.into(),
            weight,
        }
    }
}

/// A conversation accepted for contribution, with its text features.
///
/// Only built for conversations whose uniqueness strictly exceeds the
/// acceptance threshold.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoredConversation {
    /// Chat identifier.
    pub chat_id: ChatId,
    /// Content length in characters.
    pub chat_length: u64,
    /// Sentiment distribution.
    pub sentiment: SentimentMap,
    /// Keywords from the embedding-based extractor.
    pub keywords_keybert: Vec<Keyword>,
    /// Keywords from the topic-model extractor.
    pub keywords_lda: Vec<Keyword>,
}

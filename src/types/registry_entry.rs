//! Historical registry entries and the record an accepted proof contributes.

use serde::{Deserialize, Serialize};

use super::conversation::ChatId;
use super::identity::IdentityHash;
use super::scored::{Keyword, ScoredConversation, SentimentMap};

/// A previously accepted conversation, as read back from the registry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RegistryEntry {
    /// Chat identifier.
    pub chat_id: ChatId,
    /// Content length at the time it was accepted.
    pub chat_length: u64,
    /// Recorded sentiment.
    #[serde(default)]
    pub sentiment: SentimentMap,
    /// Recorded embedding-based keywords.
    #[serde(default)]
    pub keywords_keybert: Vec<Keyword>,
    /// Recorded topic-model keywords.
    #[serde(default)]
    pub keywords_lda: Vec<Keyword>,
}

impl RegistryEntry {
    /// Entry with only the fields uniqueness scoring needs.
    pub fn new(chat_id: ChatId, chat_length: u64) -> Self {
        Self {
            chat_id,
            chat_length,
            sentiment: SentimentMap::new(),
            keywords_keybert: Vec::new(),
            keywords_lda: Vec::new(),
        }
    }
}

impl From<ScoredConversation> for RegistryEntry {
    fn from(scored: ScoredConversation) -> Self {
        Self {
            chat_id: scored.chat_id,
            chat_length: scored.chat_length,
            sentiment: scored.sentiment,
            keywords_keybert: scored.keywords_keybert,
            keywords_lda: scored.keywords_lda,
        }
    }
}

/// Metadata record written to the registry for an accepted submission.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RegistryRecord {
    /// Identity hash the record is keyed by.
    pub source_id: IdentityHash,
    /// Marketplace (DLP) identifier.
    pub dlp_id: String,
    /// Accepted conversations.
    pub chats: Vec<ScoredConversation>,
}

impl RegistryRecord {
    /// Flatten into registry entries.
    pub fn into_entries(self) -> Vec<RegistryEntry> {
        self.chats.into_iter().map(RegistryEntry::from).collect()
    }
}

//! Conversations and submissions.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeSet, HashSet};

use super::identity::Identity;

/// Chat identifier as exported by the source platform.
pub type ChatId = i64;

/// One normalized message inside a conversation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ContentEntry {
    /// Normalized message text.
    pub text: String,
    /// Content length in characters.
    pub length: u64,
    /// Age of the message at submission time, in minutes.
    pub age_minutes: f64,
    /// Sender reference, if the platform exposes one.
    pub sender: Option<String>,
}

impl ContentEntry {
    /// Create an entry; length is derived from the text.
    pub fn new(text: impl Into<String>, age_minutes: f64, sender: Option<String>) -> Self {
        let text = text.into();
        let length = text.chars().count() as u64;
        Self {
            text,
            length,
            age_minutes: age_minutes.max(0.0),
            sender,
        }
    }
}

/// One chat thread of a submission with its accumulated totals.
///
/// Built once from its entries; totals cannot drift from the content.
/// The content length is the character count of [`Conversation::text`],
/// separators included, and is the `chat_length` registry entries store.
///
/// There is no `Deserialize`; [`Conversation::from_entries`] is the only
/// constructor:
///
/// ```compile_fail
/// let conv: chat_proof_kernel::Conversation =
///     serde_json::from_str(r#"{"chat_id": 1, "entries": []}"#).unwrap();
/// ```
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Conversation {
    chat_id: ChatId,
    entries: Vec<ContentEntry>,
    participants: BTreeSet<String>,
    total_content_length: u64,
    /// Σ length_i, denominator of the length-weighted age.
    message_length: u64,
    /// Σ length_i · age_i, numerator of the length-weighted age.
    total_content_value: f64,
}

impl Conversation {
    /// Build a conversation from its ordered entries.
    pub fn from_entries(chat_id: ChatId, entries: Vec<ContentEntry>) -> Self {
        let participants = entries
            .iter()
            .filter_map(|e| e.sender.clone())
            .collect();
        let message_length: u64 = entries.iter().map(|e| e.length).sum();
        let separators = entries.len().saturating_sub(1) as u64;
        let total_content_length = message_length + separators;
        let total_content_value = entries
            .iter()
            .map(|e| e.length as f64 * e.age_minutes)
            .sum();

        Self {
            chat_id,
            entries,
            participants,
            total_content_length,
            message_length,
            total_content_value,
        }
    }

    /// Chat identifier.
    pub fn chat_id(&self) -> ChatId {
        self.chat_id
    }

    /// Ordered content entries.
    pub fn entries(&self) -> &[ContentEntry] {
        &self.entries
    }

    /// Distinct senders seen in this conversation.
    pub fn participants(&self) -> &BTreeSet<String> {
        &self.participants
    }

    /// Number of distinct participants.
    pub fn participant_count(&self) -> usize {
        self.participants.len()
    }

    /// Characters in the space-joined text.
    pub fn total_content_length(&self) -> u64 {
        self.total_content_length
    }

    /// Σ length_i · age_i over all entries.
    pub fn total_content_value(&self) -> f64 {
        self.total_content_value
    }

    /// Length-weighted average age in minutes (0 when there is no content).
    pub fn weighted_age_minutes(&self) -> f64 {
        if self.message_length == 0 {
            return 0.0;
        }
        self.total_content_value / self.message_length as f64
    }

    /// Message texts joined with single spaces, as handed to text features.
    pub fn text(&self) -> String {
        self.entries
            .iter()
            .map(|e| e.text.as_str())
            .collect::<Vec<_>>()
            .join(" ")
    }
}

/// Error building a submission.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum SubmissionError {
    /// The same chat id appears twice; registry lookups would be ambiguous.
    #[error("Duplicate chat id in submission: {0}")]
    DuplicateChatId(ChatId),
}

/// A user's normalized chat export for one pipeline run.
///
/// Only [`Submission::new`] builds one, so chat ids are always unique:
///
/// ```compile_fail
/// let submission: chat_proof_kernel::Submission =
///     serde_json::from_str("{}").unwrap();
/// ```
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Submission {
    identity: Identity,
    submitted_at: DateTime<Utc>,
    conversations: Vec<Conversation>,
}

impl Submission {
    /// Create a submission, rejecting duplicate chat ids.
    pub fn new(
        identity: Identity,
        submitted_at: DateTime<Utc>,
        conversations: Vec<Conversation>,
    ) -> Result<Self, SubmissionError> {
        let mut seen = HashSet::with_capacity(conversations.len());
        for conversation in &conversations {
            if !seen.insert(conversation.chat_id()) {
                return Err(SubmissionError::DuplicateChatId(conversation.chat_id()));
            }
        }

        Ok(Self {
            identity,
            submitted_at,
            conversations,
        })
    }

    /// Submitter identity (hash only).
    pub fn identity(&self) -> &Identity {
        &self.identity
    }

    /// Submission timestamp; message ages are relative to it.
    pub fn submitted_at(&self) -> DateTime<Utc> {
        self.submitted_at
    }

    /// Conversations in export order.
    pub fn conversations(&self) -> &[Conversation] {
        &self.conversations
    }
}

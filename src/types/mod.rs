//! Core types for the proof kernel.

pub mod identity;
pub mod conversation;
pub mod scored;
pub mod registry_entry;
pub mod proof;

pub use identity::{DataSource, Identity, IdentityHash, UnknownSource};
pub use conversation::{ChatId, ContentEntry, Conversation, Submission, SubmissionError};
pub use scored::{Keyword, ScoredConversation, SentimentMap};
pub use registry_entry::{RegistryEntry, RegistryRecord};
pub use proof::{
    ConversationSummary, ExtractionStatus, ProofAttributes, ProofMetadata,
    ProofResult, ProofResultBuilder,
};

//! # chat-proof-kernel
//!
//! Deterministic proof-of-contribution scoring for private-messaging exports.
//!
//! The kernel answers one question:
//!
//! > Is this chat export authentic, good and new enough to be rewarded?
//!
//! ## Core Contract
//!
//! 1. Gate on authenticity; an inauthentic submission scores 0 everywhere
//! 2. Score each conversation for timeliness, thoughtfulness and contextualness
//! 3. Score uniqueness against the submitter's registry history
//! 4. Combine into a composite score and a validity decision (`ProofResult`)
//!
//! ## Architecture
//!
//! ```text
//! Run dir → ProofInput → SourceNormalizer → Submission → ProofOrchestrator → ProofResult
//!                                                            ↓
//!                                  AuthenticityVerifier, RegistryClient, TextFeatures
//! ```
//!
//! ## Determinism Guarantees
//!
//! - Same export + same salt + same registry snapshot + same policy → identical result
//! - Ages are measured from the submission timestamp, never the wall clock
//! - The identity hash is stable for a (source, user, salt) triple

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod types;
pub mod policy;
pub mod registry;
pub mod features;
pub mod authenticity;
pub mod normalize;
pub mod input;
pub mod config;
pub mod pipeline;
pub mod telemetry;
pub mod canonical;

// Re-exports
pub use types::{
    ChatId, ContentEntry, Conversation, DataSource, Identity, IdentityHash, Keyword,
    ScoredConversation, SentimentMap, Submission, SubmissionError, UnknownSource,
};
pub use types::{RegistryEntry, RegistryRecord};
pub use types::proof::{
    ConversationSummary, ExtractionStatus, ProofAttributes, ProofMetadata, ProofResult,
    ProofResultBuilder,
};
pub use policy::{ScoringPolicyV1, CompositeWeights, QualityCombination, ThoughtfulnessCurve, ConversationMetrics};
pub use registry::{RegistryClient, RegistryError, InMemoryRegistry, JsonFileRegistry};
pub use features::{
    TextFeatures, KeywordMethod, ExtractionError, FrequencyTextFeatures,
    CachedTextFeatures, CacheConfig, CacheStats,
};
pub use authenticity::{
    AuthenticityProof, AuthenticityVerifier, AuthenticityError, AcceptAllVerifier,
    SubmissionCooldown, AlwaysFresh,
};
pub use normalize::{
    ChatExport, RawChat, NormalizedContent, NormalizeError, SourceNormalizer,
    TelegramNormalizer, normalize_export, normalize_text, normalizer_for,
};
pub use input::{ProofInput, InputError};
pub use config::{ProofConfig, ConfigError};
pub use pipeline::{ProofOrchestrator, ProofStage, ProofError};
pub use canonical::{to_canonical_bytes, canonical_hash, canonical_hash_hex};

/// Schema version of `ProofResult`.
/// Increment on breaking changes to the serialized result.
pub const PROOF_SCHEMA_VERSION: &str = "1.0.0";

/// Default policy version identifier.
pub const DEFAULT_POLICY_VERSION: &str = "scoring_policy_v1";

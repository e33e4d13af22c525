//! Proof results and the builder that finalizes them.
//!
//! ## Single Finalization Path
//!
//! Both the rejected and the fully scored branches of a run end in
//! [`ProofResultBuilder::finalize`]. Thresholds, composite weights and the
//! attribute layout are applied there and nowhere else, so the two branches
//! cannot drift apart. A `ProofResult` has no public constructor and no
//! setters; once finalized it is immutable.
//!
//! ## Zero-on-Reject
//!
//! If authenticity fails, ownership, authenticity, quality, uniqueness and
//! the composite score are all 0 and `valid` is false, whatever scoring data
//! was supplied to the builder.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::canonical::canonical_hash_hex;
use crate::policy::{mean_score, ConversationMetrics, ScoringPolicyV1};
use crate::PROOF_SCHEMA_VERSION;
use super::conversation::ChatId;
use super::identity::{DataSource, Identity, IdentityHash};
use super::registry_entry::RegistryRecord;
use super::scored::ScoredConversation;

/// What happened to a conversation at the text-feature stage.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "status", content = "reason")]
pub enum ExtractionStatus {
    /// Uniqueness did not exceed the acceptance threshold.
    Skipped,
    /// Features extracted; a `ScoredConversation` exists.
    Extracted,
    /// Extraction failed or timed out; the conversation contributes nothing.
    Failed(String),
}

/// Per-conversation audit record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConversationSummary {
    /// Chat identifier.
    pub chat_id: ChatId,
    /// Quality signals.
    pub metrics: ConversationMetrics,
    /// Uniqueness against the registry.
    pub uniqueness: f64,
    /// Text-feature outcome.
    pub extraction: ExtractionStatus,
}

impl ConversationSummary {
    /// Quality this conversation adds to the submission mean.
    pub fn quality_contribution(&self) -> f64 {
        match self.extraction {
            ExtractionStatus::Failed(_) => 0.0,
            _ => self.metrics.quality,
        }
    }

    /// Uniqueness this conversation adds to the submission mean.
    pub fn uniqueness_contribution(&self) -> f64 {
        match self.extraction {
            ExtractionStatus::Failed(_) => 0.0,
            _ => self.uniqueness,
        }
    }
}

/// Descriptive attributes of a proof.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProofAttributes {
    /// Source platform.
    pub source: DataSource,
    /// Identity hash of the submitter.
    pub identity: IdentityHash,
    /// Submission timestamp.
    pub timestamp: DateTime<Utc>,
    /// Authenticity verdict.
    pub proof_valid: bool,
    /// Whether content scoring ran (false on the rejected branch).
    pub did_score_content: bool,
    /// Submission freshness reported by the cooldown collaborator.
    pub freshness: f64,
    /// Registry could not be read; history was treated as empty.
    pub registry_degraded: bool,
    /// Per-conversation audit records.
    pub conversations: Vec<ConversationSummary>,
    /// Conversations accepted for contribution.
    pub scored_conversations: Vec<ScoredConversation>,
}

/// Provenance metadata of a proof.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProofMetadata {
    /// Identity hash (registry key).
    pub identity_hash: IdentityHash,
    /// Marketplace (DLP) identifier.
    pub registry_id: String,
    /// Scoring policy identifier.
    pub policy_id: String,
    /// Quantized scoring policy hash.
    pub policy_params_hash: String,
    /// Result schema version.
    pub schema_version: String,
}

/// Final, immutable judgment for one submission.
///
/// Built only by [`ProofResultBuilder::finalize`]; it serializes but cannot
/// be read back:
///
/// ```compile_fail
/// let result: chat_proof_kernel::ProofResult = serde_json::from_str("{}").unwrap();
/// ```
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProofResult {
    ownership: f64,
    authenticity: f64,
    quality: f64,
    uniqueness: f64,
    score: f64,
    valid: bool,
    attributes: ProofAttributes,
    metadata: ProofMetadata,
}

impl ProofResult {
    /// Ownership component.
    pub fn ownership(&self) -> f64 {
        self.ownership
    }

    /// Authenticity component.
    pub fn authenticity(&self) -> f64 {
        self.authenticity
    }

    /// Submission quality.
    pub fn quality(&self) -> f64 {
        self.quality
    }

    /// Submission uniqueness.
    pub fn uniqueness(&self) -> f64 {
        self.uniqueness
    }

    /// Composite score.
    pub fn score(&self) -> f64 {
        self.score
    }

    /// Whether the submission is accepted.
    pub fn is_valid(&self) -> bool {
        self.valid
    }

    /// Attributes.
    pub fn attributes(&self) -> &ProofAttributes {
        &self.attributes
    }

    /// Metadata.
    pub fn metadata(&self) -> &ProofMetadata {
        &self.metadata
    }

    /// Accepted conversations.
    pub fn scored_conversations(&self) -> &[ScoredConversation] {
        &self.attributes.scored_conversations
    }

    /// Deterministic fingerprint of the whole result.
    pub fn fingerprint(&self) -> String {
        canonical_hash_hex(self)
    }

    /// Record to append to the registry, for valid proofs only.
    pub fn registry_record(&self) -> Option<RegistryRecord> {
        if !self.valid {
            return None;
        }
        Some(RegistryRecord {
            source_id: self.metadata.identity_hash.clone(),
            dlp_id: self.metadata.registry_id.clone(),
            chats: self.attributes.scored_conversations.clone(),
        })
    }
}

/// Accumulates run outcomes and produces exactly one [`ProofResult`].
#[derive(Debug, Clone)]
pub struct ProofResultBuilder {
    identity: Identity,
    timestamp: DateTime<Utc>,
    registry_id: String,
    authentic: bool,
    freshness: f64,
    registry_degraded: bool,
    scoring: Option<(Vec<ConversationSummary>, Vec<ScoredConversation>)>,
}

impl ProofResultBuilder {
    /// Start a result for `identity`; authenticity defaults to false.
    pub fn new(identity: Identity, timestamp: DateTime<Utc>, registry_id: impl Into<String>) -> Self {
        Self {
            identity,
            timestamp,
            registry_id: registry_id.into(),
            authentic: false,
            freshness: 1.0,
            registry_degraded: false,
            scoring: None,
        }
    }

    /// Set the authenticity verdict.
    pub fn authenticity(mut self, authentic: bool) -> Self {
        self.authentic = authentic;
        self
    }

    /// Set the submission freshness.
    pub fn freshness(mut self, freshness: f64) -> Self {
        self.freshness = freshness.clamp(0.0, 1.0);
        self
    }

    /// Mark the registry snapshot as degraded.
    pub fn registry_degraded(mut self, degraded: bool) -> Self {
        self.registry_degraded = degraded;
        self
    }

    /// Attach the scoring branch outcome.
    pub fn scored(
        mut self,
        conversations: Vec<ConversationSummary>,
        scored: Vec<ScoredConversation>,
    ) -> Self {
        self.scoring = Some((conversations, scored));
        self
    }

    /// Apply the policy and produce the immutable result.
    pub fn finalize(self, policy: &ScoringPolicyV1) -> ProofResult {
        let did_score_content = self.authentic && self.scoring.is_some();
        let (conversations, scored_conversations) = match (self.authentic, self.scoring) {
            (true, Some(scoring)) => scoring,
            _ => (Vec::new(), Vec::new()),
        };

        let component = if self.authentic { 1.0 } else { 0.0 };
        let (quality, uniqueness) = if self.authentic {
            (
                mean_score(conversations.iter().map(ConversationSummary::quality_contribution)),
                mean_score(conversations.iter().map(ConversationSummary::uniqueness_contribution)),
            )
        } else {
            (0.0, 0.0)
        };

        let score = if self.authentic {
            policy.composite_score(component, component, quality, uniqueness)
        } else {
            0.0
        };
        let valid = policy.is_valid(self.authentic, quality, uniqueness);

        let identity_hash = self.identity.hash().clone();

        ProofResult {
            ownership: component,
            authenticity: component,
            quality,
            uniqueness,
            score,
            valid,
            attributes: ProofAttributes {
                source: self.identity.source(),
                identity: identity_hash.clone(),
                timestamp: self.timestamp,
                proof_valid: self.authentic,
                did_score_content,
                freshness: self.freshness,
                registry_degraded: self.registry_degraded,
                conversations,
                scored_conversations,
            },
            metadata: ProofMetadata {
                identity_hash,
                registry_id: self.registry_id,
                policy_id: policy.policy_id().to_string(),
                policy_params_hash: policy.params_hash(),
                schema_version: PROOF_SCHEMA_VERSION.to_string(),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{Keyword, SentimentMap};
    use chrono::TimeZone;

    fn identity() -> Identity {
        Identity::new(DataSource::Telegram, "alice", "s1")
    }

    fn timestamp() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).unwrap()
    }

    fn summary(chat_id: ChatId, quality: f64, uniqueness: f64, extraction: ExtractionStatus) -> ConversationSummary {
        ConversationSummary {
            chat_id,
            metrics: ConversationMetrics {
                timeliness: 1.0,
                thoughtfulness: 1.0,
                contextualness: 1.0,
                quality,
            },
            uniqueness,
            extraction,
        }
    }

    fn scored(chat_id: ChatId) -> ScoredConversation {
        ScoredConversation {
            chat_id,
            chat_length: 120,
            sentiment: SentimentMap::from([("positive".to_string(), 0.9)]),
            keywords_keybert: vec![Keyword::new("rust", 0.8)],
            keywords_lda: vec![Keyword::new("rust", 0.5)],
        }
    }

    #[test]
    fn test_rejected_result_is_all_zero() {
        let policy = ScoringPolicyV1::default();
        let result = ProofResultBuilder::new(identity(), timestamp(), "dlp-1")
            .authenticity(false)
            // Scoring data must be ignored on the rejected branch.
            .scored(vec![summary(1, 1.0, 1.0, ExtractionStatus::Extracted)], vec![scored(1)])
            .finalize(&policy);

        assert_eq!(result.ownership(), 0.0);
        assert_eq!(result.authenticity(), 0.0);
        assert_eq!(result.quality(), 0.0);
        assert_eq!(result.uniqueness(), 0.0);
        assert_eq!(result.score(), 0.0);
        assert!(!result.is_valid());
        assert!(!result.attributes().did_score_content);
        assert!(result.scored_conversations().is_empty());
        assert_eq!(result.metadata().identity_hash, *identity().hash());
        assert!(result.registry_record().is_none());
    }

    #[test]
    fn test_full_scoring_aggregates() {
        let policy = ScoringPolicyV1::default();
        let result = ProofResultBuilder::new(identity(), timestamp(), "dlp-1")
            .authenticity(true)
            .scored(
                vec![
                    summary(1, 0.8, 1.0, ExtractionStatus::Extracted),
                    summary(2, 0.6, 0.5, ExtractionStatus::Skipped),
                ],
                vec![scored(1)],
            )
            .finalize(&policy);

        assert!((result.quality() - 0.7).abs() < 1e-12);
        assert_eq!(result.uniqueness(), 0.75);
        assert!((result.score() - (0.25 + 0.25 + 0.25 * 0.7 + 0.25 * 0.75)).abs() < 1e-12);
        assert!(result.is_valid());
        assert!(result.attributes().did_score_content);

        let record = result.registry_record().unwrap();
        assert_eq!(record.dlp_id, "dlp-1");
        assert_eq!(record.chats.len(), 1);
    }

    #[test]
    fn test_failed_extraction_contributes_zero() {
        let policy = ScoringPolicyV1::default();
        let result = ProofResultBuilder::new(identity(), timestamp(), "dlp-1")
            .authenticity(true)
            .scored(
                vec![
                    summary(1, 0.8, 1.0, ExtractionStatus::Extracted),
                    summary(2, 0.8, 1.0, ExtractionStatus::Failed("timeout".to_string())),
                ],
                vec![scored(1)],
            )
            .finalize(&policy);

        assert!((result.quality() - 0.4).abs() < 1e-12);
        assert_eq!(result.uniqueness(), 0.5);
        assert!(!result.is_valid());
    }

    #[test]
    fn test_empty_scoring_is_zero_without_error() {
        let result = ProofResultBuilder::new(identity(), timestamp(), "dlp-1")
            .authenticity(true)
            .scored(Vec::new(), Vec::new())
            .finalize(&ScoringPolicyV1::default());

        assert_eq!(result.quality(), 0.0);
        assert_eq!(result.uniqueness(), 0.0);
        assert_eq!(result.score(), 0.5);
        assert!(!result.is_valid());
        assert!(result.attributes().did_score_content);
    }

    #[test]
    fn test_fingerprint_determinism() {
        let make = || {
            ProofResultBuilder::new(identity(), timestamp(), "dlp-1")
                .authenticity(true)
                .scored(vec![summary(1, 0.8, 1.0, ExtractionStatus::Extracted)], vec![scored(1)])
                .finalize(&ScoringPolicyV1::default())
        };
        assert_eq!(make().fingerprint(), make().fingerprint());
    }

    #[test]
    fn test_extraction_status_serialization() {
        let json = serde_json::to_value(ExtractionStatus::Failed("boom".to_string())).unwrap();
        assert_eq!(json["status"], "failed");
        assert_eq!(json["reason"], "boom");
    }
}

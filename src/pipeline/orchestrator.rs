//! Proof orchestrator.
//!
//! Sequences one run: authenticity gate, registry snapshot, scoring and
//! aggregation, and finalizes the result through `ProofResultBuilder`.
//! The orchestrator holds only immutable configuration and shared
//! collaborators, so one instance can serve many runs concurrently.

use std::path::Path;
use std::sync::Arc;
use std::time::{Duration, Instant};

use chrono::{DateTime, Utc};
use tracing::{info, info_span, warn, Instrument};
use uuid::Uuid;

use crate::authenticity::{
    AcceptAllVerifier, AlwaysFresh, AuthenticityProof, AuthenticityVerifier, SubmissionCooldown,
};
use crate::config::ProofConfig;
use crate::features::TextFeatures;
use crate::input::ProofInput;
use crate::normalize::normalize_export;
use crate::policy::ScoringPolicyV1;
use crate::registry::RegistryClient;
use crate::telemetry::{record_proof_metric, record_registry_fetch};
use crate::types::{ProofResult, ProofResultBuilder, RegistryEntry, Submission};

use super::scoring::{score_conversations, ExtractionPool};
use super::state::ProofStage;
use super::ProofError;

/// Default number of concurrent extraction workers.
pub const DEFAULT_MAX_CONCURRENCY: usize = 4;

/// Default per-conversation extraction timeout.
pub const DEFAULT_EXTRACTION_TIMEOUT: Duration = Duration::from_secs(30);

/// Runs the proof pipeline for submissions.
#[derive(Clone)]
pub struct ProofOrchestrator {
    policy: ScoringPolicyV1,
    registry: Arc<dyn RegistryClient>,
    features: Arc<dyn TextFeatures>,
    verifier: Arc<dyn AuthenticityVerifier>,
    cooldown: Arc<dyn SubmissionCooldown>,
    registry_id: String,
    max_concurrency: usize,
    extraction_timeout: Duration,
}

impl ProofOrchestrator {
    /// Create an orchestrator with the default policy and stub
    /// authenticity/cooldown collaborators.
    pub fn new(
        registry_id: impl Into<String>,
        registry: Arc<dyn RegistryClient>,
        features: Arc<dyn TextFeatures>,
    ) -> Self {
        Self {
            policy: ScoringPolicyV1::default(),
            registry,
            features,
            verifier: Arc::new(AcceptAllVerifier),
            cooldown: Arc::new(AlwaysFresh),
            registry_id: registry_id.into(),
            max_concurrency: DEFAULT_MAX_CONCURRENCY,
            extraction_timeout: DEFAULT_EXTRACTION_TIMEOUT,
        }
    }

    /// Create an orchestrator from runtime configuration.
    pub fn from_config(
        config: &ProofConfig,
        registry: Arc<dyn RegistryClient>,
        features: Arc<dyn TextFeatures>,
    ) -> Self {
        Self::new(config.dlp_id.clone(), registry, features)
            .with_max_concurrency(config.max_concurrency)
            .with_extraction_timeout(config.extraction_timeout)
    }

    /// Use a custom scoring policy.
    pub fn with_policy(mut self, policy: ScoringPolicyV1) -> Self {
        self.policy = policy;
        self
    }

    /// Use a custom authenticity verifier.
    pub fn with_verifier(mut self, verifier: Arc<dyn AuthenticityVerifier>) -> Self {
        self.verifier = verifier;
        self
    }

    /// Use a custom cooldown collaborator.
    pub fn with_cooldown(mut self, cooldown: Arc<dyn SubmissionCooldown>) -> Self {
        self.cooldown = cooldown;
        self
    }

    /// Bound concurrent extraction (at least 1).
    pub fn with_max_concurrency(mut self, max_concurrency: usize) -> Self {
        self.max_concurrency = max_concurrency.max(1);
        self
    }

    /// Bound each conversation's extraction time.
    pub fn with_extraction_timeout(mut self, timeout: Duration) -> Self {
        self.extraction_timeout = timeout;
        self
    }

    /// Get the scoring policy.
    pub fn policy(&self) -> &ScoringPolicyV1 {
        &self.policy
    }

    /// Load a run directory, normalize it and run the pipeline.
    pub async fn generate_from_dir(
        &self,
        dir: impl AsRef<Path>,
        salt: &str,
        submitted_at: DateTime<Utc>,
    ) -> Result<ProofResult, ProofError> {
        let input = ProofInput::load(dir).await?;
        self.generate(input, salt, submitted_at).await
    }

    /// Normalize loaded input and run the pipeline.
    pub async fn generate(
        &self,
        input: ProofInput,
        salt: &str,
        submitted_at: DateTime<Utc>,
    ) -> Result<ProofResult, ProofError> {
        let submission = normalize_export(&input.export, salt, submitted_at)?;
        Ok(self.run(&submission, &input.proof).await)
    }

    /// Run the pipeline for a normalized submission.
    ///
    /// Never fails: collaborator errors degrade (registry) or reject
    /// (authenticity), and extraction failures are isolated per conversation.
    pub async fn run(&self, submission: &Submission, proof: &AuthenticityProof) -> ProofResult {
        let span = info_span!(
            "proof_run",
            run_id = %Uuid::new_v4(),
            identity_hash = %submission.identity().hash(),
        );
        self.run_inner(submission, proof).instrument(span).await
    }

    async fn run_inner(&self, submission: &Submission, proof: &AuthenticityProof) -> ProofResult {
        let start = Instant::now();
        let identity = submission.identity();
        let mut stage = ProofStage::Init;

        info!(
            source = %identity.source(),
            conversations = submission.conversations().len(),
            "Starting proof run"
        );

        stage.advance(ProofStage::AuthenticityCheck);
        let authentic = match self.verifier.verify(submission, proof).await {
            Ok(authentic) => authentic,
            Err(e) => {
                warn!(error = %e, "Authenticity verification failed; treating as not authentic");
                false
            }
        };

        let builder = ProofResultBuilder::new(identity.clone(), submission.submitted_at(), &self.registry_id)
            .authenticity(authentic);

        let builder = if authentic {
            stage.advance(ProofStage::Scoring);
            let freshness = self.cooldown.freshness(identity.hash()).await;
            let (history, degraded) = self.fetch_history(submission).await;

            let pool = ExtractionPool::new(
                self.features.clone(),
                self.max_concurrency,
                self.extraction_timeout,
                self.policy.keyword_count,
            );
            let (summaries, scored) =
                score_conversations(submission.conversations(), &history, &self.policy, &pool).await;

            stage.advance(ProofStage::Aggregation);
            builder
                .freshness(freshness)
                .registry_degraded(degraded)
                .scored(summaries, scored)
        } else {
            stage.advance(ProofStage::Rejected);
            info!("Authenticity check failed; skipping content scoring");
            builder
        };

        stage.advance(ProofStage::Done);
        let result = builder.finalize(&self.policy);

        let latency_ms = start.elapsed().as_millis() as u64;
        record_proof_metric(&result, latency_ms);
        info!(
            valid = result.is_valid(),
            score = result.score(),
            latency_ms = latency_ms,
            "Proof run complete"
        );
        result
    }

    /// Single registry read for the run; an error yields an empty snapshot.
    async fn fetch_history(&self, submission: &Submission) -> (Vec<RegistryEntry>, bool) {
        let start = Instant::now();
        let fetched = self.registry.fetch_chat_data(submission.identity().hash()).await;
        let latency_ms = start.elapsed().as_millis() as u64;

        match fetched {
            Ok(history) => {
                record_registry_fetch(history.len(), latency_ms, false);
                (history, false)
            }
            Err(e) => {
                warn!(error = %e, "Registry unavailable; treating history as empty");
                record_registry_fetch(0, latency_ms, true);
                (Vec::new(), true)
            }
        }
    }
}

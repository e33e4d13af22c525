//! Scoring stage: metrics, uniqueness and text-feature extraction.
//!
//! ## Algorithm
//!
//! 1. Compute metrics and uniqueness for every conversation against the
//!    registry snapshot (pure, in submission order)
//! 2. Queue conversations whose uniqueness strictly exceeds the acceptance
//!    threshold for extraction
//! 3. Run extraction on a `JoinSet`, at most `max_concurrency` at a time,
//!    each conversation bounded by `timeout`
//! 4. Reassemble outcomes by submission index
//!
//! A failed, timed out or panicked extraction marks only its own
//! conversation as `Failed`; the other results are unaffected.

use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Semaphore;
use tokio::task::JoinSet;
use tracing::{debug, warn};

use crate::features::{ExtractionError, KeywordMethod, TextFeatures};
use crate::normalize::normalize_text;
use crate::policy::{conversation_uniqueness, ConversationMetrics, ScoringPolicyV1};
use crate::telemetry::{record_conversation_metric, record_extraction_failure};
use crate::types::{
    ChatId, Conversation, ConversationSummary, ExtractionStatus, RegistryEntry,
    ScoredConversation,
};

/// One conversation queued for extraction.
#[derive(Debug, Clone)]
struct ExtractionJob {
    index: usize,
    chat_id: ChatId,
    chat_length: u64,
    text: String,
}

/// Bounded pool running text-feature extraction.
#[derive(Clone)]
pub struct ExtractionPool {
    features: Arc<dyn TextFeatures>,
    max_concurrency: usize,
    timeout: Duration,
    keyword_count: usize,
}

impl ExtractionPool {
    /// Create a pool; `max_concurrency` is raised to at least 1.
    pub fn new(
        features: Arc<dyn TextFeatures>,
        max_concurrency: usize,
        timeout: Duration,
        keyword_count: usize,
    ) -> Self {
        Self {
            features,
            max_concurrency: max_concurrency.max(1),
            timeout,
            keyword_count,
        }
    }

    async fn extract_all(
        &self,
        jobs: Vec<ExtractionJob>,
        slots: usize,
    ) -> Vec<Option<Result<ScoredConversation, ExtractionError>>> {
        let mut outcomes: Vec<Option<Result<ScoredConversation, ExtractionError>>> =
            (0..slots).map(|_| None).collect();
        let semaphore = Arc::new(Semaphore::new(self.max_concurrency));
        let timeout_ms = self.timeout.as_millis() as u64;
        let queued: Vec<usize> = jobs.iter().map(|job| job.index).collect();
        let mut set = JoinSet::new();

        for job in jobs {
            let semaphore = semaphore.clone();
            let features = self.features.clone();
            let timeout = self.timeout;
            let max_k = self.keyword_count;

            set.spawn(async move {
                let outcome = match semaphore.acquire_owned().await {
                    Ok(_permit) => tokio::time::timeout(timeout, extract_one(features.as_ref(), &job, max_k))
                        .await
                        .unwrap_or(Err(ExtractionError::Timeout(timeout_ms))),
                    Err(e) => Err(ExtractionError::WorkerAborted(e.to_string())),
                };
                (job.index, outcome)
            });
        }

        let mut aborted = None;
        while let Some(joined) = set.join_next().await {
            match joined {
                Ok((index, outcome)) => outcomes[index] = Some(outcome),
                Err(e) => {
                    warn!(error = %e, "Extraction worker aborted");
                    aborted = Some(e.to_string());
                }
            }
        }

        // A panicked worker loses its index; its slot is the queued one never filled.
        if let Some(reason) = aborted {
            for index in queued {
                if outcomes[index].is_none() {
                    outcomes[index] = Some(Err(ExtractionError::WorkerAborted(reason.clone())));
                }
            }
        }
        outcomes
    }
}

async fn extract_one(
    features: &dyn TextFeatures,
    job: &ExtractionJob,
    max_k: usize,
) -> Result<ScoredConversation, ExtractionError> {
    let sentiment = features.sentiment(&job.text).await?;
    let keywords_keybert = features.keywords(&job.text, max_k, KeywordMethod::KeyBert).await?;
    let keywords_lda = features.keywords(&job.text, max_k, KeywordMethod::Lda).await?;

    Ok(ScoredConversation {
        chat_id: job.chat_id,
        chat_length: job.chat_length,
        sentiment,
        keywords_keybert,
        keywords_lda,
    })
}

/// Score every conversation of a submission.
///
/// Returns one summary per conversation in submission order, plus the
/// scored conversations (also in submission order) for those extracted
/// successfully.
pub async fn score_conversations(
    conversations: &[Conversation],
    history: &[RegistryEntry],
    policy: &ScoringPolicyV1,
    pool: &ExtractionPool,
) -> (Vec<ConversationSummary>, Vec<ScoredConversation>) {
    let scored: Vec<(ConversationMetrics, f64)> = conversations
        .iter()
        .map(|conv| {
            (
                ConversationMetrics::compute(conv, policy),
                conversation_uniqueness(conv.chat_id(), conv.total_content_length(), history),
            )
        })
        .collect();

    let jobs: Vec<ExtractionJob> = conversations
        .iter()
        .zip(&scored)
        .enumerate()
        .filter(|(_, (_, (_, uniqueness)))| policy.passes_acceptance(*uniqueness))
        .map(|(index, (conv, _))| ExtractionJob {
            index,
            chat_id: conv.chat_id(),
            chat_length: conv.total_content_length(),
            text: normalize_text(&conv.text()),
        })
        .collect();

    debug!(
        conversations = conversations.len(),
        eligible = jobs.len(),
        "Queued conversations for extraction"
    );

    let mut outcomes = pool.extract_all(jobs, conversations.len()).await;

    let mut summaries = Vec::with_capacity(conversations.len());
    let mut accepted = Vec::new();

    for ((conv, (metrics, uniqueness)), outcome) in
        conversations.iter().zip(scored).zip(outcomes.iter_mut())
    {
        let extraction = match outcome.take() {
            None => ExtractionStatus::Skipped,
            Some(Ok(scored_conversation)) => {
                accepted.push(scored_conversation);
                ExtractionStatus::Extracted
            }
            Some(Err(e)) => {
                record_extraction_failure(conv.chat_id(), &e.to_string());
                ExtractionStatus::Failed(e.to_string())
            }
        };

        let summary = ConversationSummary {
            chat_id: conv.chat_id(),
            metrics,
            uniqueness,
            extraction,
        };
        record_conversation_metric(&summary);
        summaries.push(summary);
    }

    (summaries, accepted)
}

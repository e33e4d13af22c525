//! Metric events for proof runs.
//!
//! Emitted as structured `tracing` events on target `chat_proof::metrics`
//! so they can be aggregated from logs.
//!
//! - `conversation_metric` - per-conversation scores and extraction outcome
//! - `registry_fetch_metric` - history size, latency and degradation
//! - `extraction_failure_metric` - isolated extraction failures
//! - `proof_metric` - final decision per run

use tracing::{info, warn};

use crate::types::{ChatId, ConversationSummary, ExtractionStatus, ProofResult};

/// Record one conversation's scores.
pub fn record_conversation_metric(summary: &ConversationSummary) {
    let extraction = match &summary.extraction {
        ExtractionStatus::Skipped => "skipped",
        ExtractionStatus::Extracted => "extracted",
        ExtractionStatus::Failed(_) => "failed",
    };
    info!(
        target: "chat_proof::metrics",
        metric_type = "conversation",
        chat_id = summary.chat_id,
        timeliness = summary.metrics.timeliness,
        thoughtfulness = summary.metrics.thoughtfulness,
        contextualness = summary.metrics.contextualness,
        quality = summary.metrics.quality,
        uniqueness = summary.uniqueness,
        extraction = extraction,
        "conversation_metric"
    );
}

/// Record a registry fetch.
pub fn record_registry_fetch(entries: usize, latency_ms: u64, degraded: bool) {
    if degraded {
        warn!(
            target: "chat_proof::metrics",
            metric_type = "registry_fetch",
            entries = entries,
            latency_ms = latency_ms,
            degraded = true,
            "registry_fetch_metric"
        );
    } else {
        info!(
            target: "chat_proof::metrics",
            metric_type = "registry_fetch",
            entries = entries,
            latency_ms = latency_ms,
            degraded = false,
            "registry_fetch_metric"
        );
    }
}

/// Record an extraction failure for one conversation.
pub fn record_extraction_failure(chat_id: ChatId, reason: &str) {
    warn!(
        target: "chat_proof::metrics",
        metric_type = "extraction_failure",
        chat_id = chat_id,
        reason = %reason,
        "extraction_failure_metric"
    );
}

/// Record the final decision of a run.
pub fn record_proof_metric(result: &ProofResult, latency_ms: u64) {
    info!(
        target: "chat_proof::metrics",
        metric_type = "proof",
        identity_hash = %result.metadata().identity_hash,
        valid = result.is_valid(),
        score = result.score(),
        quality = result.quality(),
        uniqueness = result.uniqueness(),
        conversations = result.attributes().conversations.len(),
        scored_conversations = result.scored_conversations().len(),
        latency_ms = latency_ms,
        "proof_metric"
    );
}

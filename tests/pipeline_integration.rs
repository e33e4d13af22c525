//! End-to-end tests: run directory → normalized submission → proof result.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use async_trait::async_trait;
use chat_proof_kernel::{
    CachedTextFeatures, ExtractionError, ExtractionStatus, FrequencyTextFeatures,
    InMemoryRegistry, InputError, JsonFileRegistry, Keyword, KeywordMethod, NormalizeError,
    ProofError, ProofOrchestrator, RegistryClient, SentimentMap, SubmissionError, TextFeatures,
};
use chrono::{DateTime, TimeZone, Utc};
use serde_json::json;

const SALT: &str = "integration_salt";

// ─────────────────────────────────────────────────────────────────────────────
// Test Helpers
// ─────────────────────────────────────────────────────────────────────────────

fn submitted_at() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).unwrap()
}

fn run_dir() -> PathBuf {
    let dir = std::env::temp_dir().join(format!("proof-run-{}", uuid::Uuid::new_v4()));
    std::fs::create_dir_all(&dir).unwrap();
    dir
}

fn message(user_id: i64, minutes_ago: i64, text: &str) -> serde_json::Value {
    json!({
        "@type": "message",
        "sender_id": {"@type": "messageSenderUser", "user_id": user_id},
        "date": submitted_at().timestamp() - minutes_ago * 60,
        "content": {"@type": "messageText", "text": {"@type": "formattedText", "text": text}}
    })
}

fn write_run(dir: &Path, chats: serde_json::Value) {
    std::fs::write(
        dir.join("zktls_proof.json"),
        json!({"zktls_proof": {"attestation": "ok"}}).to_string(),
    )
    .unwrap();
    std::fs::write(
        dir.join("chats.json"),
        json!({"source": "telegram", "user": "alice", "chats": chats}).to_string(),
    )
    .unwrap();
}

fn sample_chats() -> serde_json::Value {
    json!([
        {"chat_id": 10, "contents": [
            message(1, 5, "Great news about the release, thanks for the help"),
            message(2, 3, "Glad it worked, the rust build is fast now"),
        ]},
        {"chat_id": 11, "contents": [
            message(1, 20, "Are we meeting tomorrow?"),
            message(3, 15, "Yes, at noon"),
            {"@type": "message", "content": {"@type": "messagePhoto"}},
        ]}
    ])
}

fn orchestrator(registry: Arc<dyn RegistryClient>) -> ProofOrchestrator {
    ProofOrchestrator::new("dlp_it", registry, Arc::new(FrequencyTextFeatures::new()))
}

/// Fails on every conversation mentioning "meeting".
struct PickyFeatures;

#[async_trait]
impl TextFeatures for PickyFeatures {
    async fn sentiment(&self, text: &str) -> Result<SentimentMap, ExtractionError> {
        if text.contains("meeting") {
            return Err(ExtractionError::Failed("model rejected input".to_string()));
        }
        FrequencyTextFeatures::new().sentiment(text).await
    }

    async fn keywords(
        &self,
        text: &str,
        max_k: usize,
        method: KeywordMethod,
    ) -> Result<Vec<Keyword>, ExtractionError> {
        FrequencyTextFeatures::new().keywords(text, max_k, method).await
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Run Directory
// ─────────────────────────────────────────────────────────────────────────────

#[tokio::test]
async fn test_run_directory_end_to_end() {
    let dir = run_dir();
    write_run(&dir, sample_chats());

    let result = orchestrator(Arc::new(InMemoryRegistry::new()))
        .generate_from_dir(&dir, SALT, submitted_at())
        .await
        .unwrap();

    assert!(result.is_valid());
    assert_eq!(result.uniqueness(), 1.0);
    assert_eq!(result.attributes().conversations.len(), 2);
    assert_eq!(result.scored_conversations().len(), 2);
    assert_eq!(result.scored_conversations()[0].chat_id, 10);
    assert!(result.scored_conversations()[0].keywords_keybert.len() <= 10);

    let serialized = serde_json::to_value(&result).unwrap();
    for field in ["ownership", "authenticity", "quality", "uniqueness", "score", "valid", "attributes", "metadata"] {
        assert!(serialized.get(field).is_some(), "missing field {}", field);
    }
    assert!(!serialized.to_string().contains("alice"));
}

#[tokio::test]
async fn test_missing_artifact_is_fatal() {
    let dir = run_dir();
    std::fs::write(dir.join("chats.json"), json!({"source": "telegram", "user": "u"}).to_string()).unwrap();

    let err = orchestrator(Arc::new(InMemoryRegistry::new()))
        .generate_from_dir(&dir, SALT, submitted_at())
        .await
        .unwrap_err();

    assert!(matches!(err, ProofError::Input(InputError::MissingArtifact("zktls_proof.json"))));
}

#[tokio::test]
async fn test_duplicate_chat_id_is_fatal() {
    let dir = run_dir();
    write_run(&dir, json!([{"chat_id": 1, "contents": []}, {"chat_id": 1, "contents": []}]));

    let err = orchestrator(Arc::new(InMemoryRegistry::new()))
        .generate_from_dir(&dir, SALT, submitted_at())
        .await
        .unwrap_err();

    assert!(matches!(
        err,
        ProofError::Normalize(NormalizeError::Submission(SubmissionError::DuplicateChatId(1)))
    ));
}

// ─────────────────────────────────────────────────────────────────────────────
// Degradation and Isolation
// ─────────────────────────────────────────────────────────────────────────────

#[tokio::test]
async fn test_extraction_failure_is_isolated() {
    let dir = run_dir();
    write_run(&dir, sample_chats());

    let result = ProofOrchestrator::new("dlp_it", Arc::new(InMemoryRegistry::new()), Arc::new(PickyFeatures))
        .generate_from_dir(&dir, SALT, submitted_at())
        .await
        .unwrap();

    let conversations = &result.attributes().conversations;
    assert_eq!(conversations[0].extraction, ExtractionStatus::Extracted);
    assert!(matches!(conversations[1].extraction, ExtractionStatus::Failed(_)));
    assert_eq!(result.scored_conversations().len(), 1);
    assert_eq!(result.uniqueness(), 0.5);
}

#[tokio::test]
async fn test_missing_registry_file_degrades() {
    let dir = run_dir();
    write_run(&dir, sample_chats());
    let registry = JsonFileRegistry::new(dir.join("no-such-registry.json"));

    let result = orchestrator(Arc::new(registry))
        .generate_from_dir(&dir, SALT, submitted_at())
        .await
        .unwrap();

    assert!(result.attributes().registry_degraded);
    assert_eq!(result.uniqueness(), 1.0);
}

// ─────────────────────────────────────────────────────────────────────────────
// Registry Round Trip
// ─────────────────────────────────────────────────────────────────────────────

#[tokio::test]
async fn test_resubmission_lowers_uniqueness() {
    let dir = run_dir();
    write_run(&dir, sample_chats());
    let registry = Arc::new(InMemoryRegistry::new());
    let orchestrator = orchestrator(registry.clone());

    let first = orchestrator.generate_from_dir(&dir, SALT, submitted_at()).await.unwrap();
    registry.append_record(first.registry_record().unwrap());

    let second = orchestrator.generate_from_dir(&dir, SALT, submitted_at()).await.unwrap();
    assert_eq!(second.uniqueness(), 0.0);
    assert!(second.scored_conversations().is_empty());
    assert!(!second.is_valid());
}

#[tokio::test]
async fn test_file_registry_sees_accepted_record() {
    let dir = run_dir();
    write_run(&dir, sample_chats());

    let first = orchestrator(Arc::new(InMemoryRegistry::new()))
        .generate_from_dir(&dir, SALT, submitted_at())
        .await
        .unwrap();
    let registry_path = dir.join("registry.json");
    std::fs::write(&registry_path, serde_json::to_vec(&vec![first.registry_record().unwrap()]).unwrap()).unwrap();

    let features = Arc::new(CachedTextFeatures::new(FrequencyTextFeatures::new()));
    let second = ProofOrchestrator::new("dlp_it", Arc::new(JsonFileRegistry::new(&registry_path)), features)
        .generate_from_dir(&dir, SALT, submitted_at())
        .await
        .unwrap();

    assert!(!second.attributes().registry_degraded);
    assert_eq!(second.uniqueness(), 0.0);
}

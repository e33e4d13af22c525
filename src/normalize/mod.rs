//! Raw chat exports → normalized submissions.
//!
//! Each source platform provides a [`SourceNormalizer`] that turns one raw
//! message record into [`NormalizedContent`]. The scoring core only ever sees
//! the resulting [`Submission`]; adding a platform means adding a normalizer
//! and a `DataSource` variant.

pub mod text;
pub mod telegram;

use chrono::{DateTime, Utc};
use serde::Deserialize;
use std::fmt;

use crate::types::{
    ChatId, ContentEntry, Conversation, DataSource, Identity, Submission, SubmissionError,
};

pub use text::normalize_text;
pub use telegram::TelegramNormalizer;

/// Error turning an export into a submission.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum NormalizeError {
    /// No normalizer exists for the export's source.
    #[error("Unsupported source platform: {0}")]
    UnsupportedSource(String),
    /// The export is structurally invalid.
    #[error(transparent)]
    Submission(#[from] SubmissionError),
}

/// One message after platform-specific normalization.
#[derive(Debug, Clone, PartialEq)]
pub struct NormalizedContent {
    /// Message text as sent; lengths are measured on it.
    pub text: String,
    /// Sender reference.
    pub sender: Option<String>,
    /// When the message was sent.
    pub sent_at: Option<DateTime<Utc>>,
}

/// Platform-specific message normalization.
pub trait SourceNormalizer: Send + Sync {
    /// Platform this normalizer handles.
    fn source(&self) -> DataSource;

    /// Normalize one raw record; `None` for records that carry no text.
    fn normalize(&self, record: &serde_json::Value) -> Option<NormalizedContent>;
}

/// Normalizer for a platform.
pub fn normalizer_for(source: DataSource) -> Box<dyn SourceNormalizer> {
    match source {
        DataSource::Telegram => Box::new(TelegramNormalizer),
    }
}

/// One chat in a raw export.
#[derive(Debug, Clone, Deserialize)]
pub struct RawChat {
    /// Chat identifier.
    pub chat_id: ChatId,
    /// Raw per-platform message records.
    #[serde(default, alias = "content")]
    pub contents: Vec<serde_json::Value>,
}

/// A raw chat export as found in `chats.json`.
#[derive(Clone, Deserialize)]
pub struct ChatExport {
    /// Source platform name.
    pub source: String,
    /// User handle on the source platform.
    pub user: String,
    /// Chats in export order.
    #[serde(default)]
    pub chats: Vec<RawChat>,
}

// Never print the raw handle.
impl fmt::Debug for ChatExport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ChatExport")
            .field("source", &self.source)
            .field("user", &"<redacted>")
            .field("chats", &self.chats.len())
            .finish()
    }
}

/// Minutes between `sent_at` and `submitted_at`; 0 if unknown or in the future.
fn age_minutes(sent_at: Option<DateTime<Utc>>, submitted_at: DateTime<Utc>) -> f64 {
    sent_at
        .map(|sent| (submitted_at - sent).num_milliseconds() as f64 / 60_000.0)
        .unwrap_or(0.0)
        .max(0.0)
}

/// Normalize an export with the built-in normalizer for its source.
pub fn normalize_export(
    export: &ChatExport,
    salt: &str,
    submitted_at: DateTime<Utc>,
) -> Result<Submission, NormalizeError> {
    let source: DataSource = export
        .source
        .parse()
        .map_err(|_| NormalizeError::UnsupportedSource(export.source.clone()))?;
    normalize_with(normalizer_for(source).as_ref(), export, salt, submitted_at)
}

/// Normalize an export with an explicit normalizer.
pub fn normalize_with(
    normalizer: &dyn SourceNormalizer,
    export: &ChatExport,
    salt: &str,
    submitted_at: DateTime<Utc>,
) -> Result<Submission, NormalizeError> {
    let source = normalizer.source();
    if export.source.parse::<DataSource>().ok() != Some(source) {
        return Err(NormalizeError::UnsupportedSource(export.source.clone()));
    }

    let identity = Identity::new(source, &export.user, salt);

    let conversations = export
        .chats
        .iter()
        .map(|chat| {
            let entries = chat
                .contents
                .iter()
                .filter_map(|record| normalizer.normalize(record))
                .map(|content| {
                    ContentEntry::new(
                        content.text,
                        age_minutes(content.sent_at, submitted_at),
                        content.sender,
                    )
                })
                .collect();
            Conversation::from_entries(chat.chat_id, entries)
        })
        .collect();

    Ok(Submission::new(identity, submitted_at, conversations)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use serde_json::json;

    fn submitted_at() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).unwrap()
    }

    fn message(user_id: i64, minutes_ago: i64, text: &str) -> serde_json::Value {
        json!({
            "@type": "message",
            "sender_id": {"@type": "messageSenderUser", "user_id": user_id},
            "date": submitted_at().timestamp() - minutes_ago * 60,
            "content": {"@type": "messageText", "text": {"@type": "formattedText", "text": text}}
        })
    }

    fn export(chats: serde_json::Value) -> ChatExport {
        serde_json::from_value(json!({"source": "telegram", "user": "alice", "chats": chats})).unwrap()
    }

    #[test]
    fn test_normalize_export_builds_conversations() {
        let export = export(json!([
            {"chat_id": 1, "contents": [message(10, 30, "hello"), message(11, 90, "world!")]},
            {"chat_id": 2, "contents": []}
        ]));

        let submission = normalize_export(&export, "salt", submitted_at()).unwrap();
        assert_eq!(submission.conversations().len(), 2);

        let conv = &submission.conversations()[0];
        assert_eq!(conv.chat_id(), 1);
        assert_eq!(conv.text(), "hello world!");
        assert_eq!(conv.total_content_length(), 12);
        assert_eq!(conv.participant_count(), 2);
        assert_eq!(conv.total_content_value(), 5.0 * 30.0 + 6.0 * 90.0);
        assert_eq!(submission.conversations()[1].total_content_length(), 0);
    }

    #[test]
    fn test_length_is_measured_on_raw_joined_text() {
        let export = export(json!([{"chat_id": 7, "contents": [
            message(1, 0, "Hi  there\n"),
            message(2, 0, ""),
            message(1, 0, "ok"),
            {"@type": "message", "content": {"@type": "messagePhoto"}},
        ]}]));

        let submission = normalize_export(&export, "salt", submitted_at()).unwrap();
        let conv = &submission.conversations()[0];

        assert_eq!(conv.entries().len(), 3);
        assert_eq!(conv.text(), "Hi  there\n  ok");
        assert_eq!(conv.total_content_length(), 14);
    }

    #[test]
    fn test_identity_is_hashed() {
        let submission = normalize_export(&export(json!([])), "salt", submitted_at()).unwrap();
        assert_eq!(
            submission.identity(),
            &Identity::new(DataSource::Telegram, "alice", "salt")
        );
    }

    #[test]
    fn test_unsupported_source() {
        let export: ChatExport =
            serde_json::from_value(json!({"source": "icq", "user": "u", "chats": []})).unwrap();
        assert_eq!(
            normalize_export(&export, "salt", submitted_at()).unwrap_err(),
            NormalizeError::UnsupportedSource("icq".to_string())
        );
    }

    #[test]
    fn test_duplicate_chat_ids() {
        let export = export(json!([{"chat_id": 4}, {"chat_id": 4}]));
        assert_eq!(
            normalize_export(&export, "salt", submitted_at()).unwrap_err(),
            NormalizeError::Submission(SubmissionError::DuplicateChatId(4))
        );
    }

    #[test]
    fn test_future_messages_have_zero_age() {
        assert_eq!(
            age_minutes(Some(submitted_at() + chrono::Duration::minutes(5)), submitted_at()),
            0.0
        );
        assert_eq!(age_minutes(None, submitted_at()), 0.0);
    }

    #[test]
    fn test_debug_redacts_user() {
        let rendered = format!("{:?}", export(json!([])));
        assert!(!rendered.contains("alice"));
    }
}

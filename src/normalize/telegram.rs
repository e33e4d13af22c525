//! Telegram (TDLib) message records.
//!
//! Only `messageText` content is kept. Media, service messages and anything
//! else without a text body normalize to `None`.

use chrono::{DateTime, Utc};
use serde_json::Value;

use crate::types::DataSource;
use super::{NormalizedContent, SourceNormalizer};

const TEXT_CONTENT_TYPE: &str = "messageText";

/// Normalizer for TDLib-style Telegram exports.
#[derive(Debug, Clone, Copy, Default)]
pub struct TelegramNormalizer;

impl TelegramNormalizer {
    fn text(content: &Value) -> Option<&str> {
        match content.get("text")? {
            Value::String(text) => Some(text),
            formatted => formatted.get("text")?.as_str(),
        }
    }

    fn sender(record: &Value) -> Option<String> {
        let sender = record.get("sender_id")?;
        sender
            .get("user_id")
            .or_else(|| sender.get("chat_id"))
            .and_then(|id| match id {
                Value::Number(n) => Some(n.to_string()),
                Value::String(s) => Some(s.clone()),
                _ => None,
            })
    }

    fn sent_at(record: &Value) -> Option<DateTime<Utc>> {
        DateTime::from_timestamp(record.get("date")?.as_i64()?, 0)
    }
}

impl SourceNormalizer for TelegramNormalizer {
    fn source(&self) -> DataSource {
        DataSource::Telegram
    }

    fn normalize(&self, record: &Value) -> Option<NormalizedContent> {
        let content = record.get("content")?;
        if content.get("@type")?.as_str()? != TEXT_CONTENT_TYPE {
            return None;
        }

        Some(NormalizedContent {
            text: Self::text(content)?.to_string(),
            sender: Self::sender(record),
            sent_at: Self::sent_at(record),
        })
    }
}

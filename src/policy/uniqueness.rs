//! Duplicate detection against the historical registry.
//!
//! ```text
//! uniqueness(chat) = 0                                   if new_length == 0
//!                  = 1                                   if no entry matches chat_id
//!                  = mean((new_length - old_length) / new_length)   over matches
//! ```
//!
//! Near 0 means the conversation was already contributed at about the same
//! length; near 1 means it grew substantially since. A shorter resubmission
//! yields a negative delta and is clamped to 0.

use crate::types::{ChatId, RegistryEntry};

/// Uniqueness of one conversation against the registry snapshot.
pub fn conversation_uniqueness(chat_id: ChatId, new_length: u64, history: &[RegistryEntry]) -> f64 {
    if new_length == 0 {
        return 0.0;
    }

    let new_length = new_length as f64;
    let (total, matches) = history
        .iter()
        .filter(|entry| entry.chat_id == chat_id)
        .fold((0.0, 0usize), |(total, matches), entry| {
            let delta = (new_length - entry.chat_length as f64) / new_length;
            (total + delta, matches + 1)
        });

    if matches == 0 {
        return 1.0;
    }

    (total / matches as f64).clamp(0.0, 1.0)
}

/// Mean of per-conversation scores; 0 for an empty submission.
pub fn mean_score(scores: impl IntoIterator<Item = f64>) -> f64 {
    let (sum, count) = scores
        .into_iter()
        .fold((0.0, 0usize), |(sum, count), s| (sum + s, count + 1));
    if count == 0 {
        return 0.0;
    }
    (sum / count as f64).clamp(0.0, 1.0)
}

//! Deterministic lexicon/term-frequency text features.
//!
//! Stand-in for the model-backed collaborator so the pipeline runs and tests
//! without model access. No accuracy guarantees.

use std::collections::BTreeMap;
use async_trait::async_trait;

use crate::types::{Keyword, SentimentMap};
use super::{ExtractionError, KeywordMethod, TextFeatures};

const STOPWORDS: &[&str] = &[
    "the", "and", "for", "are", "but", "not", "you", "all", "any", "can", "had", "her",
    "was", "one", "our", "out", "has", "him", "his", "how", "its", "who", "did", "yes",
    "she", "too", "use", "that", "this", "with", "have", "from", "they", "will", "what",
    "when", "your", "just", "been", "were", "there", "then", "them", "than", "into",
];

const POSITIVE: &[&str] = &[
    "good", "great", "love", "nice", "thanks", "thank", "happy", "awesome", "excellent",
    "cool", "glad", "agree", "perfect", "fun", "best", "wonderful",
];

const NEGATIVE: &[&str] = &[
    "bad", "hate", "sad", "angry", "terrible", "awful", "worst", "sorry", "problem",
    "wrong", "annoying", "broken", "fail", "failed", "ugly", "upset",
];

/// Lexicon sentiment and term-frequency keywords.
#[derive(Debug, Clone, Copy, Default)]
pub struct FrequencyTextFeatures;

impl FrequencyTextFeatures {
    /// Create the extractor.
    pub fn new() -> Self {
        Self
    }

    fn tokens(text: &str) -> Vec<String> {
        text.split(|c: char| !c.is_alphanumeric())
            .filter(|t| !t.is_empty())
            .map(str::to_lowercase)
            .collect()
    }

    fn term_counts(text: &str) -> BTreeMap<String, usize> {
        let mut counts = BTreeMap::new();
        for token in Self::tokens(text) {
            if token.chars().count() < 3 || STOPWORDS.contains(&token.as_str()) {
                continue;
            }
            *counts.entry(token).or_insert(0) += 1;
        }
        counts
    }
}

#[async_trait]
impl TextFeatures for FrequencyTextFeatures {
    async fn sentiment(&self, text: &str) -> Result<SentimentMap, ExtractionError> {
        let tokens = Self::tokens(text);
        let positive = tokens.iter().filter(|t| POSITIVE.contains(&t.as_str())).count();
        let negative = tokens.iter().filter(|t| NEGATIVE.contains(&t.as_str())).count();

        let mut sentiment = SentimentMap::new();
        if tokens.is_empty() {
            sentiment.insert("neutral".to_string(), 1.0);
            sentiment.insert("positive".to_string(), 0.0);
            sentiment.insert("negative".to_string(), 0.0);
            return Ok(sentiment);
        }

        let total = tokens.len() as f64;
        let positive = positive as f64 / total;
        let negative = negative as f64 / total;
        sentiment.insert("positive".to_string(), positive);
        sentiment.insert("negative".to_string(), negative);
        sentiment.insert("neutral".to_string(), (1.0 - positive - negative).max(0.0));
        Ok(sentiment)
    }

    async fn keywords(
        &self,
        text: &str,
        max_k: usize,
        method: KeywordMethod,
    ) -> Result<Vec<Keyword>, ExtractionError> {
        let counts = Self::term_counts(text);
        let raw: Vec<(String, f64)> = counts
            .into_iter()
            .map(|(term, count)| {
                let weight = match method {
                    KeywordMethod::KeyBert => count as f64,
                    KeywordMethod::Lda => count as f64 * (1.0 + term.chars().count() as f64).ln(),
                };
                (term, weight)
            })
            .collect();

        let total: f64 = raw.iter().map(|(_, w)| w).sum();
        if total <= 0.0 {
            return Ok(Vec::new());
        }

        let mut keywords: Vec<Keyword> = raw
            .into_iter()
            .map(|(term, w)| Keyword::new(term, w / total))
            .collect();

        // Weight desc, then term asc for determinism
        keywords.sort_by(|a, b| {
            b.weight
                .partial_cmp(&a.weight)
                .unwrap_or(std::cmp::Ordering::Equal)
                .then_with(|| a.term.cmp(&b.term))
        });
        keywords.truncate(max_k);
        Ok(keywords)
    }
}

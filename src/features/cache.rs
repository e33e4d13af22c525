//! LRU cache in front of a text-feature collaborator.
//!
//! ## Cache Key Design
//!
//! The key holds two xxh64 digests (different seeds) over every input that
//! affects the output, plus the text's byte length:
//! - operation (`sentiment` / `keywords`)
//! - keyword method and `max_k`
//! - the full text
//!
//! A hit needs all three to agree.
//!
//! Failures are never cached; a retried call goes to the collaborator.

use std::hash::Hasher;
use std::num::NonZeroUsize;
use std::sync::atomic::{AtomicU64, Ordering};
use async_trait::async_trait;
use lru::LruCache;
use parking_lot::RwLock;
use xxhash_rust::xxh64::Xxh64;

use crate::types::{Keyword, SentimentMap};
use super::{ExtractionError, KeywordMethod, TextFeatures};

/// Configuration for the feature cache.
#[derive(Debug, Clone)]
pub struct CacheConfig {
    /// Maximum number of entries in the cache.
    pub max_entries: usize,
    /// Whether to enable the cache.
    pub enabled: bool,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            max_entries: 1024,
            enabled: true,
        }
    }
}

/// Cache statistics.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CacheStats {
    /// Current number of entries in the cache.
    pub len: usize,
    /// Maximum capacity of the cache.
    pub cap: usize,
    /// Lookups served from the cache.
    pub hits: u64,
    /// Lookups forwarded to the collaborator.
    pub misses: u64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
struct FeatureCacheKey {
    hash: u64,
    check: u64,
    text_len: usize,
}

impl FeatureCacheKey {
    const HASH_SEED: u64 = 0;
    const CHECK_SEED: u64 = 0x9E37_79B9_7F4A_7C15;

    fn digest(text: &str, prefix: impl Fn(&mut Xxh64)) -> Self {
        let hash_with = |seed: u64| {
            let mut hasher = Xxh64::new(seed);
            prefix(&mut hasher);
            hasher.write(text.as_bytes());
            hasher.finish()
        };

        Self {
            hash: hash_with(Self::HASH_SEED),
            check: hash_with(Self::CHECK_SEED),
            text_len: text.len(),
        }
    }

    fn sentiment(text: &str) -> Self {
        Self::digest(text, |hasher| hasher.write(b"sentiment"))
    }

    fn keywords(text: &str, max_k: usize, method: KeywordMethod) -> Self {
        Self::digest(text, |hasher| {
            hasher.write(b"keywords");
            hasher.write(method.to_string().as_bytes());
            hasher.write(&(max_k as u64).to_le_bytes());
        })
    }
}

#[derive(Debug, Clone)]
enum CachedFeature {
    Sentiment(SentimentMap),
    Keywords(Vec<Keyword>),
}

/// Text features with an LRU cache in front.
///
/// Thread-safe; intended to be shared through an `Arc` by many runs.
pub struct CachedTextFeatures<F: TextFeatures> {
    inner: F,
    cache: Option<RwLock<LruCache<FeatureCacheKey, CachedFeature>>>,
    hits: AtomicU64,
    misses: AtomicU64,
}

impl<F: TextFeatures> CachedTextFeatures<F> {
    /// Wrap `inner` with the default cache configuration.
    pub fn new(inner: F) -> Self {
        Self::with_config(inner, CacheConfig::default())
    }

    /// Wrap `inner` with a custom cache configuration.
    pub fn with_config(inner: F, config: CacheConfig) -> Self {
        let cache = NonZeroUsize::new(config.max_entries)
            .filter(|_| config.enabled)
            .map(|size| RwLock::new(LruCache::new(size)));

        Self {
            inner,
            cache,
            hits: AtomicU64::new(0),
            misses: AtomicU64::new(0),
        }
    }

    /// Get cache statistics. Returns `None` if caching is disabled.
    pub fn cache_stats(&self) -> Option<CacheStats> {
        self.cache.as_ref().map(|cache| {
            let cache = cache.read();
            CacheStats {
                len: cache.len(),
                cap: cache.cap().get(),
                hits: self.hits.load(Ordering::Relaxed),
                misses: self.misses.load(Ordering::Relaxed),
            }
        })
    }

    /// Clear the cache.
    pub fn clear_cache(&self) {
        if let Some(cache) = &self.cache {
            cache.write().clear();
        }
    }

    fn lookup(&self, key: &FeatureCacheKey) -> Option<CachedFeature> {
        let cache = self.cache.as_ref()?;
        let found = cache.read().peek(key).cloned();
        match found {
            Some(_) => self.hits.fetch_add(1, Ordering::Relaxed),
            None => self.misses.fetch_add(1, Ordering::Relaxed),
        };
        found
    }

    fn store(&self, key: FeatureCacheKey, value: CachedFeature) {
        if let Some(cache) = &self.cache {
            cache.write().put(key, value);
        }
    }
}

#[async_trait]
impl<F: TextFeatures> TextFeatures for CachedTextFeatures<F> {
    async fn sentiment(&self, text: &str) -> Result<SentimentMap, ExtractionError> {
        let key = FeatureCacheKey::sentiment(text);
        if let Some(CachedFeature::Sentiment(sentiment)) = self.lookup(&key) {
            return Ok(sentiment);
        }

        let sentiment = self.inner.sentiment(text).await?;
        self.store(key, CachedFeature::Sentiment(sentiment.clone()));
        Ok(sentiment)
    }

    async fn keywords(
        &self,
        text: &str,
        max_k: usize,
        method: KeywordMethod,
    ) -> Result<Vec<Keyword>, ExtractionError> {
        let key = FeatureCacheKey::keywords(text, max_k, method);
        if let Some(CachedFeature::Keywords(keywords)) = self.lookup(&key) {
            return Ok(keywords);
        }

        let keywords = self.inner.keywords(text, max_k, method).await?;
        self.store(key, CachedFeature::Keywords(keywords.clone()));
        Ok(keywords)
    }
}

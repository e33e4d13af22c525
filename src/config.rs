//! Runtime configuration from environment variables.
//!
//! | Variable | Default | Notes |
//! |---|---|---|
//! | `DLP_ID` | required | registry identifier recorded in results |
//! | `SALT` | required | non-empty identity-hash salt |
//! | `INPUT_DIR` | `/input` | run directory |
//! | `OUTPUT_DIR` | `/output` | `results.json` is written here |
//! | `MAX_CONCURRENCY` | `4` | extraction workers, at least 1 |
//! | `EXTRACTION_TIMEOUT_SECS` | `30` | per-conversation extraction timeout |
//! | `REGISTRY_PATH` | unset | JSON registry snapshot; in-memory registry if unset |
//! | `FEATURE_CACHE_SIZE` | `1024` | text feature cache entries, 0 disables |

use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use crate::features::CacheConfig;

/// Error building the configuration.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ConfigError {
    /// A required variable is unset or empty.
    #[error("Missing required environment variable: {0}")]
    Missing(&'static str),
    /// A variable is set to an unusable value.
    #[error("Invalid value for {name}: {value:?}")]
    #[allow(missing_docs)]
    Invalid { name: &'static str, value: String },
}

/// Configuration for one proof run.
#[derive(Clone)]
pub struct ProofConfig {
    /// Registry identifier (`DLP_ID`).
    pub dlp_id: String,
    /// Identity-hash salt.
    pub salt: String,
    /// Run directory.
    pub input_dir: PathBuf,
    /// Output directory.
    pub output_dir: PathBuf,
    /// Maximum concurrent extraction workers.
    pub max_concurrency: usize,
    /// Per-conversation extraction timeout.
    pub extraction_timeout: Duration,
    /// Optional JSON registry snapshot.
    pub registry_path: Option<PathBuf>,
    /// Text feature cache size.
    pub feature_cache_size: usize,
}

// The salt is a secret.
impl std::fmt::Debug for ProofConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ProofConfig")
            .field("dlp_id", &self.dlp_id)
            .field("salt", &"<redacted>")
            .field("input_dir", &self.input_dir)
            .field("output_dir", &self.output_dir)
            .field("max_concurrency", &self.max_concurrency)
            .field("extraction_timeout", &self.extraction_timeout)
            .field("registry_path", &self.registry_path)
            .field("feature_cache_size", &self.feature_cache_size)
            .finish()
    }
}

impl ProofConfig {
    /// Read the configuration from the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Read the configuration through `lookup`.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |name: &str| lookup(name).filter(|v| !v.trim().is_empty());

        let dlp_id = get("DLP_ID").ok_or(ConfigError::Missing("DLP_ID"))?;
        let salt = get("SALT").ok_or(ConfigError::Missing("SALT"))?;

        let max_concurrency: usize = parse_or(&get, "MAX_CONCURRENCY", 4)?;
        if max_concurrency == 0 {
            return Err(ConfigError::Invalid {
                name: "MAX_CONCURRENCY",
                value: "0".to_string(),
            });
        }

        Ok(Self {
            dlp_id,
            salt,
            input_dir: get("INPUT_DIR").unwrap_or_else(|| "/input".to_string()).into(),
            output_dir: get("OUTPUT_DIR").unwrap_or_else(|| "/output".to_string()).into(),
            max_concurrency,
            extraction_timeout: Duration::from_secs(parse_or(&get, "EXTRACTION_TIMEOUT_SECS", 30)?),
            registry_path: get("REGISTRY_PATH").map(PathBuf::from),
            feature_cache_size: parse_or(&get, "FEATURE_CACHE_SIZE", 1024)?,
        })
    }

    /// Feature cache settings derived from `feature_cache_size`.
    pub fn cache_config(&self) -> CacheConfig {
        CacheConfig {
            max_entries: self.feature_cache_size,
            enabled: self.feature_cache_size > 0,
        }
    }

    /// Path of the results file.
    pub fn results_path(&self) -> PathBuf {
        self.output_dir.join("results.json")
    }
}

fn parse_or<T: FromStr>(
    get: &impl Fn(&str) -> Option<String>,
    name: &'static str,
    default: T,
) -> Result<T, ConfigError> {
    match get(name) {
        None => Ok(default),
        Some(value) => value
            .trim()
            .parse()
            .map_err(|_| ConfigError::Invalid { name, value }),
    }
}

//! The proof pipeline: lifecycle, scoring stage and orchestrator.

pub mod state;
pub mod scoring;
pub mod orchestrator;

use crate::config::ConfigError;
use crate::input::InputError;
use crate::normalize::NormalizeError;

/// Fatal error of a proof run. No `ProofResult` is produced.
#[derive(Debug, thiserror::Error)]
pub enum ProofError {
    /// Run directory could not be loaded.
    #[error(transparent)]
    Input(#[from] InputError),
    /// Export could not be normalized.
    #[error(transparent)]
    Normalize(#[from] NormalizeError),
    /// Configuration is unusable.
    #[error(transparent)]
    Config(#[from] ConfigError),
}

pub use state::ProofStage;
pub use scoring::{score_conversations, ExtractionPool};
pub use orchestrator::{ProofOrchestrator, DEFAULT_EXTRACTION_TIMEOUT, DEFAULT_MAX_CONCURRENCY};

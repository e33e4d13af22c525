//! Proof run lifecycle.
//!
//! ```text
//! Init → AuthenticityCheck → Scoring → Aggregation → Done
//!                          ↘ Rejected ──────────────↗
//! ```

use serde::{Deserialize, Serialize};
use tracing::{debug, error};

/// Stage of a proof run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProofStage {
    /// Submission loaded, nothing checked yet.
    Init,
    /// Waiting on the authenticity verifier.
    AuthenticityCheck,
    /// Authenticity failed; scores are forced to zero.
    Rejected,
    /// Registry fetch, metrics, uniqueness and extraction.
    Scoring,
    /// Means and composite score.
    Aggregation,
    /// Result finalized.
    Done,
}

impl ProofStage {
    /// Valid forward transitions.
    pub fn valid_next(&self) -> &'static [ProofStage] {
        match self {
            Self::Init => &[Self::AuthenticityCheck],
            Self::AuthenticityCheck => &[Self::Rejected, Self::Scoring],
            Self::Rejected => &[Self::Done],
            Self::Scoring => &[Self::Aggregation],
            Self::Aggregation => &[Self::Done],
            Self::Done => &[],
        }
    }

    /// Check if a transition to `target` is valid.
    pub fn can_advance_to(&self, target: ProofStage) -> bool {
        self.valid_next().contains(&target)
    }

    /// Stage name as logged.
    pub fn name(&self) -> &'static str {
        match self {
            Self::Init => "init",
            Self::AuthenticityCheck => "authenticity_check",
            Self::Rejected => "rejected",
            Self::Scoring => "scoring",
            Self::Aggregation => "aggregation",
            Self::Done => "done",
        }
    }

    /// Move to `target`, logging the transition.
    ///
    /// An invalid transition is a pipeline bug: it is logged at error level
    /// and the stage is left unchanged.
    pub fn advance(&mut self, target: ProofStage) -> bool {
        if !self.can_advance_to(target) {
            error!(from = self.name(), to = target.name(), "Invalid proof stage transition");
            debug_assert!(false, "invalid transition {} → {}", self.name(), target.name());
            return false;
        }
        debug!(from = self.name(), to = target.name(), "Proof stage transition");
        *self = target;
        true
    }
}

//! Scoring policy definitions.

pub mod v1;
pub mod metrics;
pub mod uniqueness;

pub use v1::{CompositeWeights, QualityCombination, ScoringPolicyV1, ThoughtfulnessCurve};
pub use metrics::{contextualness, thoughtfulness, timeliness, round2, ConversationMetrics};
pub use uniqueness::{conversation_uniqueness, mean_score};

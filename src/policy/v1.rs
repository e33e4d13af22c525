//! ScoringPolicy v1: decay, curve and threshold constants for proof scoring.
//!
//! ## Float Normalization for Deterministic Hashing
//!
//! Floats are quantized to integers before hashing to avoid cross-platform
//! serialization differences. The quantization factor is 1e6 (multiply by
//! 1,000,000 and round to i64).

use serde::{Deserialize, Serialize};
use crate::canonical::canonical_hash_hex;
use crate::DEFAULT_POLICY_VERSION;

/// Quantization factor for float normalization.
const FLOAT_QUANTIZATION_FACTOR: f64 = 1_000_000.0;

/// Shape of the participant-count curve.
///
/// The documented intent is a Gaussian around the optimum. Previously scored
/// data used an exponent that is linear in `(n - μ)`; `LiteralLinear`
/// selects that formula.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ThoughtfulnessCurve {
    /// `exp(-(n - μ)² / 2σ²)`.
    Gaussian,
    /// `exp(-(n - μ) / 2σ²)`, clamped to [0, 1].
    LiteralLinear,
}

/// How the three conversation signals combine into quality.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum QualityCombination {
    /// `(timeliness + thoughtfulness + contextualness) / 3`.
    Balanced,
    /// `(timeliness + thoughtfulness + timeliness) / 3`, the formula previously
    /// scored data used.
    LegacyDoubleTimeliness,
}

/// Weights of the four components in the composite score.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CompositeWeights {
    /// Weight for ownership.
    pub ownership: f64,
    /// Weight for authenticity.
    pub authenticity: f64,
    /// Weight for submission quality.
    pub quality: f64,
    /// Weight for submission uniqueness.
    pub uniqueness: f64,
}

impl Default for CompositeWeights {
    fn default() -> Self {
        Self {
            ownership: 0.25,
            authenticity: 0.25,
            quality: 0.25,
            uniqueness: 0.25,
        }
    }
}

impl CompositeWeights {
    fn to_quantized(&self) -> [i64; 4] {
        [
            quantize_float(self.ownership),
            quantize_float(self.authenticity),
            quantize_float(self.quality),
            quantize_float(self.uniqueness),
        ]
    }
}

/// Quantize a float to an i64 for deterministic hashing.
fn quantize_float(value: f64) -> i64 {
    (value * FLOAT_QUANTIZATION_FACTOR).round() as i64
}

/// Quantized policy parameters for deterministic hashing.
#[derive(Debug, Clone, Serialize)]
struct QuantizedPolicyParams {
    version: String,
    timeliness_half_life_minutes: i64,
    thoughtfulness_optimum: i64,
    thoughtfulness_spread: i64,
    thoughtfulness_curve: ThoughtfulnessCurve,
    contextualness_midpoint: i64,
    contextualness_steepness: i64,
    quality_combination: QualityCombination,
    acceptance_threshold: i64,
    min_quality: i64,
    min_uniqueness: i64,
    weights: [i64; 4],
    keyword_count: usize,
}

/// Scoring policy version 1.
///
/// ## Parameters
///
/// - `timeliness_half_life_minutes`: age at which timeliness halves (60)
/// - `thoughtfulness_optimum` / `thoughtfulness_spread`: participant curve μ=2, σ=1
/// - `contextualness_midpoint` / `contextualness_steepness`: logistic m=2, k=1
/// - `acceptance_threshold`: uniqueness a conversation must strictly exceed
///   before text features are extracted (0.5)
/// - `min_quality` / `min_uniqueness`: validity gates for the submission (0.5)
/// - `weights`: composite score weights (0.25 each)
/// - `keyword_count`: keywords requested per extraction method (10)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScoringPolicyV1 {
    /// Policy version identifier.
    pub version: String,
    /// Timeliness half-life in minutes.
    pub timeliness_half_life_minutes: f64,
    /// Participant count with maximal thoughtfulness.
    pub thoughtfulness_optimum: f64,
    /// Spread of the thoughtfulness curve.
    pub thoughtfulness_spread: f64,
    /// Thoughtfulness curve shape.
    pub thoughtfulness_curve: ThoughtfulnessCurve,
    /// Content length at which contextualness is 0.5.
    pub contextualness_midpoint: f64,
    /// Logistic steepness for contextualness.
    pub contextualness_steepness: f64,
    /// Quality combination rule.
    pub quality_combination: QualityCombination,
    /// Uniqueness threshold for text-feature extraction (strict).
    pub acceptance_threshold: f64,
    /// Minimum submission quality for a valid proof.
    pub min_quality: f64,
    /// Minimum submission uniqueness for a valid proof.
    pub min_uniqueness: f64,
    /// Composite score weights.
    pub weights: CompositeWeights,
    /// Keywords per extraction method.
    pub keyword_count: usize,
}

impl ScoringPolicyV1 {
    /// Get the policy ID.
    pub fn policy_id(&self) -> &str {
        &self.version
    }

    /// Compute a hash of the policy parameters over quantized floats.
    pub fn params_hash(&self) -> String {
        canonical_hash_hex(&self.to_quantized())
    }

    fn to_quantized(&self) -> QuantizedPolicyParams {
        QuantizedPolicyParams {
            version: self.version.clone(),
            timeliness_half_life_minutes: quantize_float(self.timeliness_half_life_minutes),
            thoughtfulness_optimum: quantize_float(self.thoughtfulness_optimum),
            thoughtfulness_spread: quantize_float(self.thoughtfulness_spread),
            thoughtfulness_curve: self.thoughtfulness_curve,
            contextualness_midpoint: quantize_float(self.contextualness_midpoint),
            contextualness_steepness: quantize_float(self.contextualness_steepness),
            quality_combination: self.quality_combination,
            acceptance_threshold: quantize_float(self.acceptance_threshold),
            min_quality: quantize_float(self.min_quality),
            min_uniqueness: quantize_float(self.min_uniqueness),
            weights: self.weights.to_quantized(),
            keyword_count: self.keyword_count,
        }
    }

    /// Whether a conversation with this uniqueness goes to text extraction.
    pub fn passes_acceptance(&self, uniqueness: f64) -> bool {
        uniqueness > self.acceptance_threshold
    }

    /// Weighted composite of the four components, clamped to [0, 1].
    pub fn composite_score(
        &self,
        ownership: f64,
        authenticity: f64,
        quality: f64,
        uniqueness: f64,
    ) -> f64 {
        let w = &self.weights;
        (w.ownership * ownership
            + w.authenticity * authenticity
            + w.quality * quality
            + w.uniqueness * uniqueness)
            .clamp(0.0, 1.0)
    }

    /// Validity gate: authentic and both submission scores at or above minimum.
    pub fn is_valid(&self, authentic: bool, quality: f64, uniqueness: f64) -> bool {
        authentic && quality >= self.min_quality && uniqueness >= self.min_uniqueness
    }

    /// Policy selecting the quality formulas previously scored data used.
    ///
    /// Only the formulas are selected. Results still depend on the inputs
    /// the collaborators return, so matching earlier scores is not guaranteed.
    pub fn legacy() -> Self {
        Self {
            thoughtfulness_curve: ThoughtfulnessCurve::LiteralLinear,
            quality_combination: QualityCombination::LegacyDoubleTimeliness,
            ..Self::default()
        }
    }
}

impl Default for ScoringPolicyV1 {
    fn default() -> Self {
        Self {
            version: DEFAULT_POLICY_VERSION.to_string(),
            timeliness_half_life_minutes: 60.0,
            thoughtfulness_optimum: 2.0,
            thoughtfulness_spread: 1.0,
            thoughtfulness_curve: ThoughtfulnessCurve::Gaussian,
            contextualness_midpoint: 2.0,
            contextualness_steepness: 1.0,
            quality_combination: QualityCombination::Balanced,
            acceptance_threshold: 0.5,
            min_quality: 0.5,
            min_uniqueness: 0.5,
            weights: CompositeWeights::default(),
            keyword_count: 10,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_params_hash_determinism() {
        assert_eq!(
            ScoringPolicyV1::default().params_hash(),
            ScoringPolicyV1::default().params_hash()
        );
    }

    #[test]
    fn test_params_hash_changes() {
        let policy1 = ScoringPolicyV1::default();
        let mut policy2 = ScoringPolicyV1::default();
        policy2.timeliness_half_life_minutes = 120.0;

        assert_ne!(policy1.params_hash(), policy2.params_hash());
        assert_ne!(policy1.params_hash(), ScoringPolicyV1::legacy().params_hash());
    }

    #[test]
    fn test_acceptance_is_strict() {
        let policy = ScoringPolicyV1::default();
        assert!(!policy.passes_acceptance(0.5));
        assert!(policy.passes_acceptance(0.51));
    }

    #[test]
    fn test_composite_score_equal_weights() {
        let policy = ScoringPolicyV1::default();
        assert_eq!(policy.composite_score(1.0, 1.0, 1.0, 1.0), 1.0);
        assert_eq!(policy.composite_score(1.0, 1.0, 0.0, 0.0), 0.5);
        assert_eq!(policy.composite_score(0.0, 0.0, 0.0, 0.0), 0.0);
    }

    #[test]
    fn test_validity_requires_authenticity() {
        let policy = ScoringPolicyV1::default();
        assert!(policy.is_valid(true, 0.5, 0.5));
        assert!(!policy.is_valid(false, 1.0, 1.0));
        assert!(!policy.is_valid(true, 0.49, 1.0));
        assert!(!policy.is_valid(true, 1.0, 0.49));
    }
}

//! Per-conversation quality signals.
//!
//! Formulas:
//! ```text
//! timeliness      = exp(-ln(2) / H · tav)            tav = Σ(age·len) / Σ(len)
//! thoughtfulness  = exp(-(n - μ)² / 2σ²)              (Gaussian curve)
//! contextualness  = 1 / (1 + exp(-k · (c - m)))
//! quality         = round2((t + th + c) / 3)
//! ```
//!
//! Every signal is clamped to [0, 1].

use serde::{Deserialize, Serialize};

use crate::types::Conversation;
use super::v1::{QualityCombination, ScoringPolicyV1, ThoughtfulnessCurve};

/// Exponential decay of the length-weighted age.
///
/// Returns 1.0 at age 0 and halves every `half_life_minutes`.
pub fn timeliness(weighted_age_minutes: f64, half_life_minutes: f64) -> f64 {
    if half_life_minutes <= 0.0 {
        return 0.0;
    }
    let age = weighted_age_minutes.max(0.0);
    (-(std::f64::consts::LN_2 / half_life_minutes) * age)
        .exp()
        .clamp(0.0, 1.0)
}

/// Participant-count curve peaking at `optimum`.
pub fn thoughtfulness(
    participants: usize,
    optimum: f64,
    spread: f64,
    curve: ThoughtfulnessCurve,
) -> f64 {
    let two_var = 2.0 * spread * spread;
    if two_var <= 0.0 {
        return if participants as f64 == optimum { 1.0 } else { 0.0 };
    }
    let offset = participants as f64 - optimum;
    let exponent = match curve {
        ThoughtfulnessCurve::Gaussian => -(offset * offset) / two_var,
        ThoughtfulnessCurve::LiteralLinear => -offset / two_var,
    };
    exponent.exp().clamp(0.0, 1.0)
}

/// Logistic curve over content length; exactly 0.5 at `midpoint`.
pub fn contextualness(content_length: u64, midpoint: f64, steepness: f64) -> f64 {
    let x = content_length as f64 - midpoint;
    (1.0 / (1.0 + (-steepness * x).exp())).clamp(0.0, 1.0)
}

/// Round to two decimal places.
pub fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// The three signals and the combined quality of one conversation.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ConversationMetrics {
    /// Recency signal.
    pub timeliness: f64,
    /// Participant-count signal.
    pub thoughtfulness: f64,
    /// Content-length signal.
    pub contextualness: f64,
    /// Combined quality, rounded to 2 decimals.
    pub quality: f64,
}

impl ConversationMetrics {
    /// Compute all signals for a conversation under `policy`.
    pub fn compute(conversation: &Conversation, policy: &ScoringPolicyV1) -> Self {
        let timeliness = timeliness(
            conversation.weighted_age_minutes(),
            policy.timeliness_half_life_minutes,
        );
        let thoughtfulness = thoughtfulness(
            conversation.participant_count(),
            policy.thoughtfulness_optimum,
            policy.thoughtfulness_spread,
            policy.thoughtfulness_curve,
        );
        let contextualness = contextualness(
            conversation.total_content_length(),
            policy.contextualness_midpoint,
            policy.contextualness_steepness,
        );

        let third = match policy.quality_combination {
            QualityCombination::Balanced => contextualness,
            QualityCombination::LegacyDoubleTimeliness => timeliness,
        };
        let quality = round2((timeliness + thoughtfulness + third) / 3.0).clamp(0.0, 1.0);

        Self {
            timeliness,
            thoughtfulness,
            contextualness,
            quality,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::ContentEntry;

    #[test]
    fn test_timeliness_fresh_is_one() {
        assert_eq!(timeliness(0.0, 60.0), 1.0);
    }

    #[test]
    fn test_timeliness_half_life() {
        assert!((timeliness(60.0, 60.0) - 0.5).abs() < 1e-12);
        assert!((timeliness(120.0, 60.0) - 0.25).abs() < 1e-12);
    }

    #[test]
    fn test_timeliness_strictly_decreasing() {
        let mut previous = timeliness(0.0, 60.0);
        for age in [1.0, 5.0, 30.0, 60.0, 600.0] {
            let current = timeliness(age, 60.0);
            assert!(current < previous, "timeliness must drop at age {}", age);
            previous = current;
        }
    }

    #[test]
    fn test_thoughtfulness_peaks_at_optimum() {
        let curve = ThoughtfulnessCurve::Gaussian;
        let at_optimum = thoughtfulness(2, 2.0, 1.0, curve);
        assert_eq!(at_optimum, 1.0);
        assert!(thoughtfulness(1, 2.0, 1.0, curve) < at_optimum);
        assert!(thoughtfulness(5, 2.0, 1.0, curve) < thoughtfulness(3, 2.0, 1.0, curve));
        assert_eq!(
            thoughtfulness(1, 2.0, 1.0, curve),
            thoughtfulness(3, 2.0, 1.0, curve)
        );
    }

    #[test]
    fn test_thoughtfulness_literal_curve_is_clamped() {
        let curve = ThoughtfulnessCurve::LiteralLinear;
        // Below the optimum the literal exponent is positive.
        assert_eq!(thoughtfulness(0, 2.0, 1.0, curve), 1.0);
        assert!((thoughtfulness(4, 2.0, 1.0, curve) - (-1.0f64).exp()).abs() < 1e-12);
    }

    #[test]
    fn test_contextualness_midpoint_is_half() {
        assert_eq!(contextualness(2, 2.0, 1.0), 0.5);
        assert!(contextualness(10, 2.0, 1.0) > 0.99);
        assert!(contextualness(0, 2.0, 1.0) < 0.5);
    }

    #[test]
    fn test_round2() {
        assert_eq!(round2(0.123), 0.12);
        assert_eq!(round2(0.126), 0.13);
    }

    #[test]
    fn test_quality_combinations_differ() {
        // One participant and a long, old message: the signals disagree.
        let conversation = Conversation::from_entries(
            1,
            vec![ContentEntry::new("a".repeat(50), 60.0, Some("u1".to_string()))],
        );
        let balanced = ConversationMetrics::compute(&conversation, &ScoringPolicyV1::default());
        let mut legacy_policy = ScoringPolicyV1::default();
        legacy_policy.quality_combination = QualityCombination::LegacyDoubleTimeliness;
        let legacy = ConversationMetrics::compute(&conversation, &legacy_policy);

        assert_eq!(balanced.timeliness, legacy.timeliness);
        let expected_balanced =
            round2((balanced.timeliness + balanced.thoughtfulness + balanced.contextualness) / 3.0);
        let expected_legacy =
            round2((legacy.timeliness * 2.0 + legacy.thoughtfulness) / 3.0);
        assert_eq!(balanced.quality, expected_balanced);
        assert_eq!(legacy.quality, expected_legacy);
        assert_ne!(balanced.quality, legacy.quality);
    }
}

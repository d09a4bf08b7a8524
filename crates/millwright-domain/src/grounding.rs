//! Grounding result - aggregate evidence score over a draft answer

use serde::{Deserialize, Serialize};

/// Aggregate confidence that an answer's factual claims are backed by
/// cited source data.
///
/// The score is the mean of the best-matching-citation confidence over all
/// claims that require grounding. When there are zero groundable claims the
/// score is 1.0 by convention: there is nothing to verify.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GroundingResult {
    /// Aggregate score in [0.0, 1.0]
    pub score: f64,

    /// Text of the claims that could not be matched to any citation
    pub ungrounded_claims: Vec<String>,
}

impl GroundingResult {
    /// The score returned when a draft contains no groundable claims
    pub const NOTHING_TO_VERIFY: f64 = 1.0;

    /// Create a grounding result, clamping the score into [0, 1]
    pub fn new(score: f64, ungrounded_claims: Vec<String>) -> Self {
        Self {
            score: score.clamp(0.0, 1.0),
            ungrounded_claims,
        }
    }

    /// Result for a draft with no claims requiring grounding
    pub fn nothing_to_verify() -> Self {
        Self {
            score: Self::NOTHING_TO_VERIFY,
            ungrounded_claims: Vec::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_nothing_to_verify_is_full_score() {
        let result = GroundingResult::nothing_to_verify();
        assert_eq!(result.score, 1.0);
        assert!(result.ungrounded_claims.is_empty());
    }

    #[test]
    fn test_score_is_clamped() {
        assert_eq!(GroundingResult::new(1.3, vec![]).score, 1.0);
        assert_eq!(GroundingResult::new(-0.1, vec![]).score, 0.0);
    }

    proptest::proptest! {
        #[test]
        fn prop_score_always_in_unit_interval(raw in -10.0f64..10.0) {
            let result = GroundingResult::new(raw, vec![]);
            proptest::prop_assert!((0.0..=1.0).contains(&result.score));
        }
    }
}

//! Grounding engine - validates draft answers before delivery

use crate::{
    scorer, ClaimExtractor, GroundingConfig, GroundingError, SentenceExtractor,
};
use millwright_domain::Citation;
use serde::{Deserialize, Serialize};

/// Outcome of the threshold policy applied to a grounding score
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GroundingOutcome {
    /// Score met the deliver threshold; draft goes out unmodified
    Deliver,
    /// Score met the flag threshold only; draft goes out marked lower
    /// confidence
    DeliverFlagged,
    /// Score fell below the flag threshold; draft is replaced by the
    /// insufficient-evidence fallback
    Fallback,
}

/// A draft answer after grounding validation.
///
/// `message` is the delivered text (the original draft, or the fallback
/// when the score was too low). Citations are retained in all cases so the
/// caller can always show what was queried.
#[derive(Debug, Clone, Serialize)]
pub struct ValidatedDraft {
    /// Text to deliver
    pub message: String,
    /// Aggregate grounding score in [0, 1]
    pub grounding_score: f64,
    /// Policy outcome the score mapped to
    pub outcome: GroundingOutcome,
    /// Claims that no citation supported above the per-claim threshold
    pub ungrounded_claims: Vec<String>,
}

impl ValidatedDraft {
    /// Whether the draft should be flagged as lower confidence
    pub fn low_confidence(&self) -> bool {
        self.outcome == GroundingOutcome::DeliverFlagged
    }
}

/// Validates drafts: extract claims, score them against citations, apply
/// the threshold policy.
pub struct GroundingEngine {
    config: GroundingConfig,
    extractor: Box<dyn ClaimExtractor>,
}

impl Default for GroundingEngine {
    fn default() -> Self {
        Self::new(GroundingConfig::default())
    }
}

impl GroundingEngine {
    /// Create an engine with the default sentence extractor
    pub fn new(config: GroundingConfig) -> Self {
        Self {
            config,
            extractor: Box::new(SentenceExtractor),
        }
    }

    /// Replace the claim-extraction strategy
    pub fn with_extractor(mut self, extractor: Box<dyn ClaimExtractor>) -> Self {
        self.extractor = extractor;
        self
    }

    /// The active configuration
    pub fn config(&self) -> &GroundingConfig {
        &self.config
    }

    /// Validate a draft against the citations its tools produced.
    ///
    /// The returned draft carries the text to deliver: the original when
    /// the score clears `flag_threshold`, the configured fallback message
    /// otherwise. The fallback path is logged at warn level for review.
    pub fn validate(
        &self,
        draft: &str,
        citations: &[Citation],
    ) -> Result<ValidatedDraft, GroundingError> {
        self.config.validate()?;

        let claims = self.extractor.extract(draft)?;
        let result = scorer::score(&claims, citations, self.config.ungrounded_claim_threshold);

        let outcome = if result.score >= self.config.deliver_threshold {
            GroundingOutcome::Deliver
        } else if result.score >= self.config.flag_threshold {
            GroundingOutcome::DeliverFlagged
        } else {
            GroundingOutcome::Fallback
        };

        let message = match outcome {
            GroundingOutcome::Fallback => {
                tracing::warn!(
                    score = result.score,
                    ungrounded = result.ungrounded_claims.len(),
                    "draft failed grounding, substituting fallback"
                );
                self.config.fallback_message.clone()
            }
            _ => draft.to_string(),
        };

        Ok(ValidatedDraft {
            message,
            grounding_score: result.score,
            outcome,
            ungrounded_claims: result.ungrounded_claims,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn citation(excerpt: &str) -> Citation {
        Citation::for_query("query:test", 0, excerpt)
    }

    #[test]
    fn test_well_grounded_draft_delivers() {
        let engine = GroundingEngine::default();
        let citations = vec![citation(
            "Grinder 5 produced 847 of 900 units, downtime totalled 152 minutes",
        )];
        let draft = "Grinder 5 produced 847 of 900 units. Downtime totalled 152 minutes.";

        let validated = engine.validate(draft, &citations).unwrap();
        assert_eq!(validated.outcome, GroundingOutcome::Deliver);
        assert_eq!(validated.message, draft);
        assert!(!validated.low_confidence());
    }

    #[test]
    fn test_ungrounded_draft_falls_back() {
        let engine = GroundingEngine::default();
        let citations = vec![citation("asset metadata for Grinder 5")];
        let draft = "Scrap rate was 44.2 percent. Output reached 9999 units.";

        let validated = engine.validate(draft, &citations).unwrap();
        assert_eq!(validated.outcome, GroundingOutcome::Fallback);
        assert_eq!(validated.message, engine.config().fallback_message);
        assert_eq!(validated.ungrounded_claims.len(), 2);
    }

    #[test]
    fn test_partially_grounded_draft_is_flagged() {
        let engine = GroundingEngine::default();
        let citations = vec![
            citation("Grinder 5 produced 847 of 900 units"),
            citation("downtime totalled 152 minutes across 4 reasons"),
        ];
        // Two well-supported claims, one claim no citation backs
        let draft = "Grinder 5 produced 847 of 900 units. \
                     Downtime totalled 152 minutes. \
                     Scrap cost hit 1234 dollars.";

        let validated = engine.validate(draft, &citations).unwrap();
        assert_eq!(validated.outcome, GroundingOutcome::DeliverFlagged);
        assert!(validated.low_confidence());
        assert_eq!(validated.message, draft);
        assert_eq!(validated.ungrounded_claims, vec!["Scrap cost hit 1234 dollars."]);
    }

    #[test]
    fn test_recommendations_alone_need_no_citations() {
        let engine = GroundingEngine::default();
        let draft = "Consider scheduling maintenance during the night shift.";

        let validated = engine.validate(draft, &[]).unwrap();
        assert_eq!(validated.outcome, GroundingOutcome::Deliver);
        assert_eq!(validated.grounding_score, 1.0);
    }

    #[test]
    fn test_invalid_config_is_rejected() {
        let config = GroundingConfig {
            deliver_threshold: 0.4,
            flag_threshold: 0.9,
            ..Default::default()
        };
        let engine = GroundingEngine::new(config);
        assert!(engine.validate("Output was 847 units.", &[]).is_err());
    }
}

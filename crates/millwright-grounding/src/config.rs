//! Grounding configuration

/// Configuration for grounding validation and the threshold policy.
///
/// The thresholds are invariant regardless of which tool produced the
/// draft: `score >= deliver_threshold` delivers as-is,
/// `flag_threshold <= score < deliver_threshold` delivers with a
/// low-confidence flag, anything below replaces the response with the
/// insufficient-evidence fallback.
#[derive(Debug, Clone)]
pub struct GroundingConfig {
    /// Minimum score to deliver the draft unmodified
    pub deliver_threshold: f64,

    /// Minimum score to deliver the draft flagged as lower confidence
    pub flag_threshold: f64,

    /// Per-claim confidence below which a claim counts as ungrounded
    pub ungrounded_claim_threshold: f64,

    /// Text substituted for the draft when the score is below
    /// `flag_threshold`
    pub fallback_message: String,
}

impl Default for GroundingConfig {
    fn default() -> Self {
        Self {
            deliver_threshold: 0.8,
            flag_threshold: 0.6,
            ungrounded_claim_threshold: 0.5,
            fallback_message: "I don't have enough verified data to answer that confidently. \
                 The citations below show what was queried; please narrow the question \
                 or check the underlying records."
                .to_string(),
        }
    }
}

impl GroundingConfig {
    /// Strict policy: only near-fully-grounded answers go out unflagged
    pub fn strict() -> Self {
        Self {
            deliver_threshold: 0.9,
            flag_threshold: 0.75,
            ..Default::default()
        }
    }

    /// Validate threshold ordering
    pub fn validate(&self) -> Result<(), crate::GroundingError> {
        let ordered = (0.0..=1.0).contains(&self.flag_threshold)
            && (0.0..=1.0).contains(&self.deliver_threshold)
            && self.flag_threshold <= self.deliver_threshold;

        if ordered {
            Ok(())
        } else {
            Err(crate::GroundingError::Config(format!(
                "thresholds must satisfy 0 <= flag ({}) <= deliver ({}) <= 1",
                self.flag_threshold, self.deliver_threshold
            )))
        }
    }
}

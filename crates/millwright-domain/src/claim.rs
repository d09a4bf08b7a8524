//! Claim module - statements extracted from a draft answer
//!
//! A claim here is a sentence-level statement pulled out of a draft response
//! before citation matching. Claims are request-scoped: the orchestrator owns
//! them for the lifetime of one request and discards them afterwards.

use serde::{Deserialize, Serialize};

/// Classification of an extracted claim
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ClaimKind {
    /// States a fact about the data (must be grounded in a citation)
    Factual,

    /// Suggests an action ("consider scheduling maintenance")
    Recommendation,

    /// Draws a conclusion from cited facts; exempt from grounding
    Inference,
}

impl ClaimKind {
    /// Get the claim kind as a string
    pub fn as_str(&self) -> &'static str {
        match self {
            ClaimKind::Factual => "factual",
            ClaimKind::Recommendation => "recommendation",
            ClaimKind::Inference => "inference",
        }
    }
}

/// A claim extracted from a draft answer
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Claim {
    /// The claim text, usually a single sentence
    pub text: String,

    /// Classification of the claim
    pub kind: ClaimKind,

    /// Whether this claim must be backed by a citation
    pub requires_grounding: bool,
}

impl Claim {
    /// Create a claim; grounding is required for factual claims by default
    pub fn new(text: impl Into<String>, kind: ClaimKind) -> Self {
        Self {
            text: text.into(),
            requires_grounding: kind == ClaimKind::Factual,
            kind,
        }
    }

    /// Override whether grounding is required
    pub fn with_grounding_required(mut self, required: bool) -> Self {
        self.requires_grounding = required;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_factual_claims_require_grounding() {
        let claim = Claim::new("OEE was 72.4% last week.", ClaimKind::Factual);
        assert!(claim.requires_grounding);
    }

    #[test]
    fn test_inference_claims_exempt_by_default() {
        let claim = Claim::new(
            "This suggests the line is performance-limited.",
            ClaimKind::Inference,
        );
        assert!(!claim.requires_grounding);
    }

    #[test]
    fn test_grounding_override() {
        let claim = Claim::new("Output was 847 units.", ClaimKind::Factual)
            .with_grounding_required(false);
        assert!(!claim.requires_grounding);
    }
}

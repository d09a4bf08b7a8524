//! Claim extraction - turning a draft answer into classified claims
//!
//! The extraction algorithm is a replaceable strategy: the engine only
//! depends on the [`ClaimExtractor`] trait. The default implementation is
//! deterministic sentence segmentation plus keyword classification, which
//! keeps the core testable offline; an LLM-backed extractor can implement
//! the same trait.

use crate::GroundingError;
use millwright_domain::{Claim, ClaimKind};

/// Strategy for extracting claims from a draft answer
pub trait ClaimExtractor: Send + Sync {
    /// Extract classified claims from the draft text
    fn extract(&self, draft: &str) -> Result<Vec<Claim>, GroundingError>;
}

/// Default extractor: sentence segmentation + keyword classification.
///
/// Classification rules:
/// - sentences with recommendation verbs ("consider", "should", ...) are
///   recommendations
/// - hedged sentences ("suggests", "likely", ...) are inferences, exempt
///   from grounding
/// - everything else is factual; a factual sentence requires grounding only
///   when it states something checkable (contains a number or a metric term)
#[derive(Debug, Clone, Copy, Default)]
pub struct SentenceExtractor;

const RECOMMENDATION_MARKERS: &[&str] = &[
    "consider",
    "should",
    "recommend",
    "schedule",
    "investigate",
    "focus on",
    "prioritize",
];

const INFERENCE_MARKERS: &[&str] = &[
    "suggests",
    "likely",
    "appears",
    "indicates",
    "probably",
    "this means",
    "may be",
    "might be",
];

const METRIC_TERMS: &[&str] = &[
    "oee",
    "availability",
    "performance",
    "quality",
    "downtime",
    "uptime",
    "output",
    "units",
    "target",
    "variance",
    "cost",
    "minutes",
    "percent",
];

impl SentenceExtractor {
    fn classify(sentence: &str) -> Claim {
        let lowered = sentence.to_lowercase();

        if RECOMMENDATION_MARKERS.iter().any(|m| lowered.contains(m)) {
            return Claim::new(sentence, ClaimKind::Recommendation);
        }
        if INFERENCE_MARKERS.iter().any(|m| lowered.contains(m)) {
            return Claim::new(sentence, ClaimKind::Inference);
        }

        let checkable = lowered.chars().any(|c| c.is_ascii_digit())
            || lowered.contains('%')
            || METRIC_TERMS.iter().any(|m| lowered.contains(m));

        Claim::new(sentence, ClaimKind::Factual).with_grounding_required(checkable)
    }

    /// Split text into sentences. A terminator only ends a sentence when
    /// followed by whitespace or end-of-text, so decimals like "72.4" and
    /// abbreviations inside numbers survive.
    fn split_sentences(text: &str) -> Vec<String> {
        let mut sentences = Vec::new();
        let mut current = String::new();
        let mut chars = text.chars().peekable();

        while let Some(c) = chars.next() {
            current.push(c);
            if matches!(c, '.' | '!' | '?') {
                let boundary = match chars.peek() {
                    None => true,
                    Some(next) => next.is_whitespace(),
                };
                if boundary {
                    let trimmed = current.trim();
                    if !trimmed.is_empty() {
                        sentences.push(trimmed.to_string());
                    }
                    current.clear();
                }
            }
        }

        let trimmed = current.trim();
        if !trimmed.is_empty() {
            sentences.push(trimmed.to_string());
        }
        sentences
    }
}

impl ClaimExtractor for SentenceExtractor {
    fn extract(&self, draft: &str) -> Result<Vec<Claim>, GroundingError> {
        Ok(Self::split_sentences(draft)
            .into_iter()
            .map(|s| Self::classify(&s))
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decimal_numbers_do_not_split_sentences() {
        let sentences =
            SentenceExtractor::split_sentences("OEE was 72.4% last week. Output hit 847 units.");
        assert_eq!(sentences.len(), 2);
        assert!(sentences[0].contains("72.4%"));
    }

    #[test]
    fn test_factual_with_number_requires_grounding() {
        let claims = SentenceExtractor.extract("Grinder 5 produced 847 units.").unwrap();
        assert_eq!(claims.len(), 1);
        assert_eq!(claims[0].kind, ClaimKind::Factual);
        assert!(claims[0].requires_grounding);
    }

    #[test]
    fn test_recommendation_classified() {
        let claims = SentenceExtractor
            .extract("Consider scheduling maintenance during the night shift.")
            .unwrap();
        assert_eq!(claims[0].kind, ClaimKind::Recommendation);
        assert!(!claims[0].requires_grounding);
    }

    #[test]
    fn test_inference_exempt_from_grounding() {
        let claims = SentenceExtractor
            .extract("This suggests the line is performance-limited.")
            .unwrap();
        assert_eq!(claims[0].kind, ClaimKind::Inference);
        assert!(!claims[0].requires_grounding);
    }

    #[test]
    fn test_pleasantry_needs_no_grounding() {
        let claims = SentenceExtractor
            .extract("Great news for the crew!")
            .unwrap();
        assert_eq!(claims[0].kind, ClaimKind::Factual);
        assert!(!claims[0].requires_grounding);
    }

    #[test]
    fn test_empty_draft_yields_no_claims() {
        assert!(SentenceExtractor.extract("   ").unwrap().is_empty());
    }
}

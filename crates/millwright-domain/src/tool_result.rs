//! Tool result module - the unit returned by every capability invocation

use crate::citation::Citation;
use crate::tier::CacheTier;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

/// Metadata carried alongside every tool result
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolMetadata {
    /// TTL class for this result, decided by the producing tool
    pub cache_tier: CacheTier,

    /// TTL in seconds, derived from the tier
    pub ttl_seconds: u64,

    /// Follow-up questions the tool suggests for this result
    pub follow_up_questions: Vec<String>,
}

impl ToolMetadata {
    /// Create metadata for a tier with no follow-ups
    pub fn for_tier(tier: CacheTier) -> Self {
        Self {
            cache_tier: tier,
            ttl_seconds: tier.ttl_seconds(),
            follow_up_questions: Vec::new(),
        }
    }

    /// Attach follow-up questions
    pub fn with_follow_ups(mut self, questions: Vec<String>) -> Self {
        self.follow_up_questions = questions;
        self
    }
}

/// The structured output of one capability invocation.
///
/// Invariant: every factual field in `data` must trace to at least one entry
/// in `citations`. Tools that cannot find the requested entity return the
/// not-found shape via [`ToolResult::not_found`] - never a guessed value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolResult {
    /// Structured result data
    pub data: Value,

    /// Citations backing every factual field in `data`
    pub citations: Vec<Citation>,

    /// Cache tier, TTL, and follow-up questions
    pub metadata: ToolMetadata,
}

impl ToolResult {
    /// Maximum number of suggestions attached to a not-found result
    pub const MAX_SUGGESTIONS: usize = 5;

    /// Create a tool result
    pub fn new(data: Value, citations: Vec<Citation>, tier: CacheTier) -> Self {
        Self {
            data,
            citations,
            metadata: ToolMetadata::for_tier(tier),
        }
    }

    /// Attach follow-up questions
    pub fn with_follow_ups(mut self, questions: Vec<String>) -> Self {
        self.metadata.follow_up_questions = questions;
        self
    }

    /// Build the shared "entity not found" shape.
    ///
    /// Carries up to [`Self::MAX_SUGGESTIONS`] similarity-ranked suggestions
    /// and the citation of the lookup that failed. The caller must not issue
    /// any downstream metric queries after receiving this.
    pub fn not_found(
        requested: impl Into<String>,
        suggestions: Vec<String>,
        citation: Citation,
    ) -> Self {
        let mut suggestions = suggestions;
        suggestions.truncate(Self::MAX_SUGGESTIONS);

        let data = json!({
            "found": false,
            "requested": requested.into(),
            "suggestions": suggestions,
        });

        Self::new(data, vec![citation], CacheTier::Static)
    }

    /// Whether this is a not-found result
    pub fn is_not_found(&self) -> bool {
        self.data.get("found").and_then(Value::as_bool) == Some(false)
    }
}

//! Response and audit types - what the orchestrator hands back and logs

use crate::citation::Citation;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Unique identifier for a delivered response, based on UUIDv7 so audit
/// records sort chronologically
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ResponseId(u128);

impl ResponseId {
    /// Generate a new UUIDv7-based ResponseId
    pub fn new() -> Self {
        Self(uuid::Uuid::now_v7().as_u128())
    }

    /// Create a ResponseId from a raw u128 value
    pub fn from_value(value: u128) -> Self {
        Self(value)
    }

    /// Get the raw u128 value
    pub fn value(&self) -> u128 {
        self.0
    }
}

impl Default for ResponseId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for ResponseId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", uuid::Uuid::from_u128(self.0))
    }
}

impl Serialize for ResponseId {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_string())
    }
}

impl<'de> Deserialize<'de> for ResponseId {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        uuid::Uuid::parse_str(&s)
            .map(|u| Self(u.as_u128()))
            .map_err(serde::de::Error::custom)
    }
}

/// The final structured answer returned to the caller.
///
/// Always a complete, well-formed object - degraded sections are described
/// in `message`, never surfaced as raw errors.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AgentResponse {
    /// Unique response identifier
    pub response_id: ResponseId,

    /// The answer text
    pub message: String,

    /// Citations backing the answer
    pub citations: Vec<Citation>,

    /// Suggested follow-up questions
    pub follow_up_questions: Vec<String>,

    /// Aggregate grounding score in [0, 1]
    pub grounding_score: f64,

    /// Set when the score fell in the "deliver but flag" band
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub low_confidence: bool,
}

/// Append-only audit record produced for every delivered response
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AuditRecord {
    /// Response this record describes
    pub response_id: ResponseId,

    /// The user's query text
    pub query_text: String,

    /// The delivered response text
    pub response_text: String,

    /// Citations attached to the response
    pub citations: Vec<Citation>,

    /// Aggregate grounding score
    pub grounding_score: f64,

    /// Claims that could not be grounded
    pub ungrounded_claims: Vec<String>,

    /// Unix timestamp when grounding validation completed
    pub validated_at: u64,
}

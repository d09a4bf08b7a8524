//! Capability contract - the interface every tool implements

use crate::ToolError;
use async_trait::async_trait;
use millwright_domain::ToolResult;
use serde_json::Value;

/// A named, independently invokable unit of domain logic.
///
/// Contract rules:
/// - `invoke` must not fabricate a value: if underlying data is absent it
///   returns the not-found shape with suggestions, never a guessed number
/// - malformed arguments are [`ToolError::InvalidArgs`]; "no data" is a
///   normal successful result, not an error
/// - `description` is what the planner matches user intent against
#[async_trait]
pub trait Capability: Send + Sync {
    /// Unique tool name (registry key and cache-key component)
    fn name(&self) -> &'static str;

    /// Human-readable description used for intent matching
    fn description(&self) -> &'static str;

    /// JSON schema of the arguments `invoke` accepts
    fn input_schema(&self) -> Value;

    /// Invoke the capability with JSON arguments
    async fn invoke(&self, args: Value) -> Result<ToolResult, ToolError>;
}

/// Helper: build the standard JSON schema for tools that take an asset name
/// plus an explicit time range
pub(crate) fn asset_range_schema(description: &str) -> Value {
    serde_json::json!({
        "type": "object",
        "description": description,
        "properties": {
            "asset": { "type": "string", "description": "Asset name" },
            "start": { "type": "integer", "description": "Range start, unix seconds (inclusive)" },
            "end":   { "type": "integer", "description": "Range end, unix seconds (exclusive)" }
        },
        "required": ["asset", "start", "end"]
    })
}

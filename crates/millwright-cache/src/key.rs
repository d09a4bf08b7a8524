//! Cache key derivation

use serde_json::Value;
use std::collections::BTreeMap;

/// Cache key: tool name plus a canonical rendering of its arguments.
///
/// Arguments are canonicalized by sorting object keys at every level, so
/// `{"asset": "Grinder 5", "days": 7}` and `{"days": 7, "asset": "Grinder 5"}`
/// produce the same key.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CacheKey {
    tool: String,
    args: String,
}

impl CacheKey {
    /// Build a key for a tool invocation
    pub fn new(tool: &str, args: &Value) -> Self {
        Self {
            tool: tool.to_string(),
            args: canonicalize(args).to_string(),
        }
    }

    /// The tool name this key belongs to
    pub fn tool(&self) -> &str {
        &self.tool
    }
}

impl std::fmt::Display for CacheKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}:{}", self.tool, self.args)
    }
}

fn canonicalize(value: &Value) -> Value {
    match value {
        Value::Object(map) => {
            let sorted: BTreeMap<String, Value> = map
                .iter()
                .map(|(k, v)| (k.clone(), canonicalize(v)))
                .collect();
            Value::Object(sorted.into_iter().collect())
        }
        Value::Array(items) => Value::Array(items.iter().map(canonicalize).collect()),
        other => other.clone(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_key_ignores_argument_order() {
        let a = CacheKey::new("oee_analysis", &json!({"asset": "Grinder 5", "days": 7}));
        let b = CacheKey::new("oee_analysis", &json!({"days": 7, "asset": "Grinder 5"}));
        assert_eq!(a, b);
    }

    #[test]
    fn test_different_args_produce_different_keys() {
        let a = CacheKey::new("oee_analysis", &json!({"asset": "Grinder 5"}));
        let b = CacheKey::new("oee_analysis", &json!({"asset": "Grinder 7"}));
        assert_ne!(a, b);
    }

    #[test]
    fn test_different_tools_do_not_collide() {
        let args = json!({"asset": "Grinder 5"});
        let a = CacheKey::new("oee_analysis", &args);
        let b = CacheKey::new("downtime_analysis", &args);
        assert_ne!(a, b);
    }

    #[test]
    fn test_nested_objects_are_canonicalized() {
        let a = CacheKey::new("t", &json!({"range": {"start": 1, "end": 2}}));
        let b = CacheKey::new("t", &json!({"range": {"end": 2, "start": 1}}));
        assert_eq!(a, b);
    }
}

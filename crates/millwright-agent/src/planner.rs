//! Capability selection - mapping a query to tool invocations
//!
//! The planner is a replaceable strategy: the orchestrator only depends on
//! the [`Planner`] trait and validates every selection against the
//! registry before dispatch. The default is deterministic keyword intent
//! matching, which keeps the pipeline testable offline; an LLM-backed
//! planner can implement the same trait.

use serde_json::{json, Value};

/// One planned tool invocation
#[derive(Debug, Clone, PartialEq)]
pub struct PlannedCall {
    /// Registry name of the capability to invoke
    pub tool: String,
    /// Arguments matching the capability's input schema
    pub args: Value,
}

/// Strategy for selecting capabilities for a query
pub trait Planner: Send + Sync {
    /// Select zero or more tool invocations for `query`. `now` is the
    /// current unix timestamp, used to anchor relative date ranges.
    fn plan(&self, query: &str, now: u64) -> Vec<PlannedCall>;
}

/// Seconds in the default lookback window (7 days)
pub const DEFAULT_LOOKBACK_SECS: u64 = 7 * 86_400;

const EFFICIENCY_MARKERS: &[&str] = &["oee", "efficien", "effective", "how well"];
const DOWNTIME_MARKERS: &[&str] = &["downtime", "down time", "stoppage", "pareto", "biggest loss"];
const STATUS_MARKERS: &[&str] = &["status", "on track", "producing", "behind", "ahead of target"];
const SAFETY_MARKERS: &[&str] = &["safety", "incident", "near miss"];
const FINANCIAL_MARKERS: &[&str] = &["cost", "worth", "dollar", "financial", "expense"];
const LOOKUP_MARKERS: &[&str] = &["what is", "tell me about", "where is", "which machine"];

/// Default planner: keyword intent matching plus asset-name extraction.
///
/// A query can match several intents at once ("what did downtime on
/// Grinder 5 cost?" selects both the downtime and financial tools); the
/// orchestrator fans them all out together.
#[derive(Debug, Clone, Copy)]
pub struct KeywordPlanner {
    lookback_secs: u64,
}

impl Default for KeywordPlanner {
    fn default() -> Self {
        Self {
            lookback_secs: DEFAULT_LOOKBACK_SECS,
        }
    }
}

impl KeywordPlanner {
    /// Planner with a custom lookback window for range queries
    pub fn with_lookback_secs(lookback_secs: u64) -> Self {
        Self { lookback_secs }
    }

    /// Extract an asset name of the form "Word N" ("Grinder 5", "Press
    /// 12"). Falls back to the raw query, which the fuzzy matcher turns
    /// into ranked suggestions.
    fn extract_asset(query: &str) -> Option<String> {
        let words: Vec<&str> = query.split_whitespace().collect();
        for pair in words.windows(2) {
            let head: &str = pair[0].trim_matches(|c: char| !c.is_alphanumeric());
            let tail: &str = pair[1].trim_matches(|c: char| !c.is_alphanumeric());

            let head_is_name = head.chars().next().is_some_and(|c| c.is_uppercase())
                && head.chars().all(|c| c.is_alphabetic());
            let tail_is_number = !tail.is_empty() && tail.chars().all(|c| c.is_ascii_digit());

            if head_is_name && tail_is_number {
                return Some(format!("{} {}", head, tail));
            }
        }
        None
    }
}

impl Planner for KeywordPlanner {
    fn plan(&self, query: &str, now: u64) -> Vec<PlannedCall> {
        let lowered = query.to_lowercase();
        let matched = |markers: &[&str]| markers.iter().any(|m| lowered.contains(m));

        let extracted = Self::extract_asset(query);
        let asset = extracted
            .clone()
            .unwrap_or_else(|| query.trim().trim_end_matches(['?', '.', '!']).to_string());

        let start = now.saturating_sub(self.lookback_secs);
        let range_args = json!({"asset": asset, "start": start, "end": now});

        let mut calls = Vec::new();
        if matched(EFFICIENCY_MARKERS) {
            calls.push(PlannedCall {
                tool: "efficiency".to_string(),
                args: range_args.clone(),
            });
        }
        if matched(DOWNTIME_MARKERS) {
            calls.push(PlannedCall {
                tool: "downtime".to_string(),
                args: range_args.clone(),
            });
        }
        if matched(STATUS_MARKERS) {
            calls.push(PlannedCall {
                tool: "production_status".to_string(),
                args: json!({"asset": asset}),
            });
        }
        if matched(SAFETY_MARKERS) {
            calls.push(PlannedCall {
                tool: "safety_events".to_string(),
                args: range_args.clone(),
            });
        }
        if matched(FINANCIAL_MARKERS) {
            calls.push(PlannedCall {
                tool: "financial_impact".to_string(),
                args: range_args,
            });
        }
        if calls.is_empty() && (matched(LOOKUP_MARKERS) || extracted.is_some()) {
            calls.push(PlannedCall {
                tool: "asset_lookup".to_string(),
                args: json!({"name": asset}),
            });
        }

        calls
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const NOW: u64 = 1_704_672_000;

    fn plan(query: &str) -> Vec<PlannedCall> {
        KeywordPlanner::default().plan(query, NOW)
    }

    #[test]
    fn test_efficiency_query_selects_efficiency_tool() {
        let calls = plan("How efficient was Grinder 5 last week?");
        assert_eq!(calls.len(), 1);
        assert_eq!(calls[0].tool, "efficiency");
        assert_eq!(calls[0].args["asset"], "Grinder 5");
        assert_eq!(calls[0].args["start"], 1_704_067_200u64);
        assert_eq!(calls[0].args["end"], NOW);
    }

    #[test]
    fn test_compound_query_selects_multiple_tools() {
        let calls = plan("What did downtime on Grinder 5 cost last week?");
        let tools: Vec<&str> = calls.iter().map(|c| c.tool.as_str()).collect();
        assert!(tools.contains(&"downtime"));
        assert!(tools.contains(&"financial_impact"));
    }

    #[test]
    fn test_status_query_has_no_range() {
        let calls = plan("Is Press 12 on track today?");
        assert_eq!(calls[0].tool, "production_status");
        assert_eq!(calls[0].args["asset"], "Press 12");
        assert!(calls[0].args.get("start").is_none());
    }

    #[test]
    fn test_unrelated_query_selects_nothing() {
        assert!(plan("What's the canteen menu?").is_empty());
    }

    #[test]
    fn test_asset_mention_without_intent_becomes_lookup() {
        let calls = plan("Tell me about Packer 2");
        assert_eq!(calls.len(), 1);
        assert_eq!(calls[0].tool, "asset_lookup");
        assert_eq!(calls[0].args["name"], "Packer 2");
    }

    #[test]
    fn test_no_asset_passes_query_through_for_suggestions() {
        let calls = plan("How efficient was the grinder?");
        assert_eq!(calls[0].tool, "efficiency");
        assert_eq!(calls[0].args["asset"], "How efficient was the grinder");
    }

    #[test]
    fn test_extract_asset_forms() {
        assert_eq!(
            KeywordPlanner::extract_asset("status of Grinder 5?"),
            Some("Grinder 5".to_string())
        );
        assert_eq!(KeywordPlanner::extract_asset("status of the line"), None);
    }
}

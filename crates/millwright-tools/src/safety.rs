//! Safety events tool - safety-tagged event log entries

use crate::capability::{asset_range_schema, Capability};
use crate::lookup::{lock_data, resolve_asset, Resolved};
use crate::ToolError;
use async_trait::async_trait;
use millwright_domain::traits::DataAccess;
use millwright_domain::{CacheTier, Citation, TimeRange, ToolResult};
use serde::Deserialize;
use serde_json::{json, Value};
use std::fmt::Display;
use std::sync::{Arc, Mutex};

#[derive(Debug, Deserialize)]
struct SafetyParams {
    asset: String,
    start: u64,
    end: u64,
}

/// Lists safety-tagged events for an asset over a range.
///
/// Zero events is a normal, explicitly-stated result.
pub struct SafetyEventsTool<D> {
    data: Arc<Mutex<D>>,
}

impl<D> SafetyEventsTool<D> {
    /// Create the tool over a shared data handle
    pub fn new(data: Arc<Mutex<D>>) -> Self {
        Self { data }
    }
}

impl<D> SafetyEventsTool<D>
where
    D: DataAccess,
    D::Error: Display,
{
    fn run(data: &Arc<Mutex<D>>, params: SafetyParams) -> Result<ToolResult, ToolError> {
        if params.start >= params.end {
            return Err(ToolError::InvalidArgs(
                "start must be earlier than end".to_string(),
            ));
        }

        let guard = lock_data(data)?;

        let (asset, asset_citation) = match resolve_asset(&*guard, &params.asset)? {
            Resolved::NotFound(result) => return Ok(*result),
            Resolved::Found(asset, citation) => (asset, citation),
        };

        let range = TimeRange::new(params.start, params.end);
        let log = guard
            .get_event_log(asset.id, range)
            .map_err(|e| ToolError::Upstream(e.to_string()))?;

        let events: Vec<Value> = log
            .data
            .iter()
            .filter(|e| e.safety)
            .map(|e| {
                json!({
                    "timestamp": e.timestamp,
                    "kind": e.kind,
                    "description": e.description,
                })
            })
            .collect();

        let derived = Citation::for_query(
            "query:safety_events",
            log.citation.query_timestamp,
            format!(
                "{} logged {} safety-tagged events in this period",
                asset.name,
                events.len()
            ),
        );

        let data = json!({
            "found": true,
            "asset": asset.name,
            "count": events.len(),
            "events": events,
        });

        Ok(
            ToolResult::new(data, vec![asset_citation, log.citation, derived], CacheTier::Daily)
                .with_follow_ups(vec![format!(
                    "What downtime did safety stops cause on {}?",
                    asset.name
                )]),
        )
    }
}

#[async_trait]
impl<D> Capability for SafetyEventsTool<D>
where
    D: DataAccess + Send + 'static,
    D::Error: Display,
{
    fn name(&self) -> &'static str {
        "safety_events"
    }

    fn description(&self) -> &'static str {
        "Safety-tagged events for an asset over a date range"
    }

    fn input_schema(&self) -> Value {
        asset_range_schema("Safety event query over an explicit date range")
    }

    async fn invoke(&self, args: Value) -> Result<ToolResult, ToolError> {
        let params: SafetyParams =
            serde_json::from_value(args).map_err(|e| ToolError::InvalidArgs(e.to_string()))?;

        let data = Arc::clone(&self.data);
        tokio::task::spawn_blocking(move || Self::run(&data, params))
            .await
            .map_err(|e| ToolError::Internal(format!("task join error: {}", e)))?
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use millwright_data::SqliteDataStore;

    fn tool() -> SafetyEventsTool<SqliteDataStore> {
        let store = SqliteDataStore::open_seeded().unwrap();
        SafetyEventsTool::new(Arc::new(Mutex::new(store)))
    }

    fn week_args(asset: &str) -> Value {
        json!({"asset": asset, "start": 1704067200u64, "end": 1704672000u64})
    }

    #[tokio::test]
    async fn test_safety_events_filtered() {
        let result = tool().invoke(week_args("Grinder 5")).await.unwrap();

        assert_eq!(result.data["count"], 1);
        let events = result.data["events"].as_array().unwrap();
        assert!(events[0]["description"]
            .as_str()
            .unwrap()
            .contains("Light curtain"));
    }

    #[tokio::test]
    async fn test_no_safety_events_is_explicit_zero() {
        let result = tool().invoke(week_args("Press 12")).await.unwrap();

        assert_eq!(result.data["count"], 0);
        assert_eq!(result.citations.len(), 2);
    }
}

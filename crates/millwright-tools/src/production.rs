//! Production status tool - live counts and variance vs target

use crate::capability::Capability;
use crate::lookup::{lock_data, resolve_asset, Resolved};
use crate::ToolError;
use async_trait::async_trait;
use millwright_domain::traits::DataAccess;
use millwright_domain::{CacheTier, Citation, ToolResult};
use serde::Deserialize;
use serde_json::{json, Value};
use std::fmt::Display;
use std::sync::{Arc, Mutex};

#[derive(Debug, Deserialize)]
struct ProductionStatusParams {
    asset: String,
}

/// Reports the near-real-time production state of an asset: current count,
/// target, run state, and the variance against target.
///
/// `variance = current - target`; `variance_percent` is omitted entirely
/// when the target is zero rather than dividing by zero.
pub struct ProductionStatusTool<D> {
    data: Arc<Mutex<D>>,
}

impl<D> ProductionStatusTool<D> {
    /// Create the tool over a shared data handle
    pub fn new(data: Arc<Mutex<D>>) -> Self {
        Self { data }
    }
}

impl<D> ProductionStatusTool<D>
where
    D: DataAccess,
    D::Error: Display,
{
    fn run(data: &Arc<Mutex<D>>, params: ProductionStatusParams) -> Result<ToolResult, ToolError> {
        let guard = lock_data(data)?;

        let (asset, asset_citation) = match resolve_asset(&*guard, &params.asset)? {
            Resolved::NotFound(result) => return Ok(*result),
            Resolved::Found(asset, citation) => (asset, citation),
        };

        let status = guard
            .get_production_status(asset.id)
            .map_err(|e| ToolError::Upstream(e.to_string()))?;

        let Some(current) = status.data else {
            // Known asset without telemetry: a normal result, not an error
            let data = json!({
                "found": true,
                "asset": asset.name,
                "has_status": false,
            });
            return Ok(ToolResult::new(
                data,
                vec![asset_citation, status.citation],
                CacheTier::Live,
            ));
        };

        let variance = current.current_count - current.target_count;
        let mut payload = json!({
            "found": true,
            "asset": asset.name,
            "has_status": true,
            "current_count": current.current_count,
            "target_count": current.target_count,
            "variance": variance,
            "running": current.running,
            "updated_at": current.updated_at,
        });

        let mut excerpt = format!(
            "{} produced {:.0} of {:.0}, variance {:.0}",
            asset.name, current.current_count, current.target_count, variance
        );

        if current.target_count != 0.0 {
            let variance_percent = variance / current.target_count * 100.0;
            payload["variance_percent"] = json!(variance_percent);
            excerpt.push_str(&format!(" ({:.1}%)", variance_percent));
        }

        let derived = Citation::for_query(
            "query:production_variance",
            status.citation.query_timestamp,
            excerpt,
        );

        Ok(ToolResult::new(
            payload,
            vec![asset_citation, status.citation, derived],
            CacheTier::Live,
        )
        .with_follow_ups(vec![format!(
            "What caused downtime on {} recently?",
            asset.name
        )]))
    }
}

#[async_trait]
impl<D> Capability for ProductionStatusTool<D>
where
    D: DataAccess + Send + 'static,
    D::Error: Display,
{
    fn name(&self) -> &'static str {
        "production_status"
    }

    fn description(&self) -> &'static str {
        "Current production status of an asset: live count, target, run state, variance"
    }

    fn input_schema(&self) -> Value {
        json!({
            "type": "object",
            "properties": {
                "asset": { "type": "string", "description": "Asset name" }
            },
            "required": ["asset"]
        })
    }

    async fn invoke(&self, args: Value) -> Result<ToolResult, ToolError> {
        let params: ProductionStatusParams =
            serde_json::from_value(args).map_err(|e| ToolError::InvalidArgs(e.to_string()))?;

        let data = Arc::clone(&self.data);
        tokio::task::spawn_blocking(move || Self::run(&data, params))
            .await
            .map_err(|e| ToolError::Internal(format!("task join error: {}", e)))?
    }
}

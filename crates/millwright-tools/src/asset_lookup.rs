//! Asset lookup tool - metadata by (fuzzy) name

use crate::capability::Capability;
use crate::lookup::{lock_data, resolve_asset, Resolved};
use crate::ToolError;
use async_trait::async_trait;
use millwright_domain::traits::DataAccess;
use millwright_domain::{CacheTier, ToolResult};
use serde::Deserialize;
use serde_json::{json, Value};
use std::fmt::Display;
use std::sync::{Arc, Mutex};

/// Parameters for an asset lookup
#[derive(Debug, Deserialize)]
struct AssetLookupParams {
    /// Asset name, matched fuzzily
    name: String,
}

/// Looks up asset metadata by name.
///
/// Static metadata, so results are cached at the static tier.
pub struct AssetLookupTool<D> {
    data: Arc<Mutex<D>>,
}

impl<D> AssetLookupTool<D> {
    /// Create the tool over a shared data handle
    pub fn new(data: Arc<Mutex<D>>) -> Self {
        Self { data }
    }
}

impl<D> AssetLookupTool<D>
where
    D: DataAccess,
    D::Error: Display,
{
    fn run(data: &Arc<Mutex<D>>, params: AssetLookupParams) -> Result<ToolResult, ToolError> {
        let guard = lock_data(data)?;

        match resolve_asset(&*guard, &params.name)? {
            Resolved::NotFound(result) => Ok(*result),
            Resolved::Found(asset, citation) => {
                let data = json!({
                    "found": true,
                    "id": asset.id.to_string(),
                    "name": asset.name,
                    "area": asset.area,
                    "asset_type": asset.asset_type,
                });

                Ok(ToolResult::new(data, vec![citation], CacheTier::Static)
                    .with_follow_ups(vec![
                        format!("What is the current production status of {}?", asset.name),
                        format!("How efficient was {} last week?", asset.name),
                    ]))
            }
        }
    }
}

#[async_trait]
impl<D> Capability for AssetLookupTool<D>
where
    D: DataAccess + Send + 'static,
    D::Error: Display,
{
    fn name(&self) -> &'static str {
        "asset_lookup"
    }

    fn description(&self) -> &'static str {
        "Look up a machine or line by name: identifier, plant area, and asset type"
    }

    fn input_schema(&self) -> Value {
        json!({
            "type": "object",
            "properties": {
                "name": { "type": "string", "description": "Asset name" }
            },
            "required": ["name"]
        })
    }

    async fn invoke(&self, args: Value) -> Result<ToolResult, ToolError> {
        let params: AssetLookupParams =
            serde_json::from_value(args).map_err(|e| ToolError::InvalidArgs(e.to_string()))?;

        let data = Arc::clone(&self.data);
        tokio::task::spawn_blocking(move || Self::run(&data, params))
            .await
            .map_err(|e| ToolError::Internal(format!("task join error: {}", e)))?
    }
}

//! Financial impact tool - downtime cost estimate

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

/// Default cost of one hour of downtime when none is configured
pub const DEFAULT_COST_PER_HOUR: f64 = 450.0;

#[derive(Debug, Deserialize)]
struct FinancialParams {
    asset: String,
    start: u64,
    end: u64,
}

/// Estimates the cost of downtime over a range at a configured hourly rate.
///
/// The estimate is always cited back to the downtime query it was derived
/// from; zero downtime yields a zero-cost result, not an error.
pub struct FinancialImpactTool<D> {
    data: Arc<Mutex<D>>,
    cost_per_hour: f64,
}

impl<D> FinancialImpactTool<D> {
    /// Create the tool with the default hourly downtime cost
    pub fn new(data: Arc<Mutex<D>>) -> Self {
        Self {
            data,
            cost_per_hour: DEFAULT_COST_PER_HOUR,
        }
    }

    /// Override the hourly downtime cost
    pub fn with_cost_per_hour(mut self, cost_per_hour: f64) -> Self {
        self.cost_per_hour = cost_per_hour;
        self
    }
}

impl<D> FinancialImpactTool<D>
where
    D: DataAccess,
    D::Error: Display,
{
    fn run(
        data: &Arc<Mutex<D>>,
        cost_per_hour: f64,
        params: FinancialParams,
    ) -> Result<ToolResult, ToolError> {
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
        let downtime = guard
            .get_downtime(asset.id, range)
            .map_err(|e| ToolError::Upstream(e.to_string()))?;

        let total_seconds: f64 = downtime.data.iter().map(|e| e.seconds).sum();
        let estimated_cost = total_seconds / 3600.0 * cost_per_hour;

        let derived = Citation::for_query(
            "query:downtime_cost",
            downtime.citation.query_timestamp,
            format!(
                "{}: {:.0} minutes of downtime at {:.2}/hour = {:.2} estimated cost",
                asset.name,
                total_seconds / 60.0,
                cost_per_hour,
                estimated_cost
            ),
        );

        let data = json!({
            "found": true,
            "asset": asset.name,
            "total_downtime_minutes": total_seconds / 60.0,
            "cost_per_hour": cost_per_hour,
            "estimated_cost": estimated_cost,
        });

        Ok(ToolResult::new(
            data,
            vec![asset_citation, downtime.citation, derived],
            CacheTier::Daily,
        )
        .with_follow_ups(vec![format!(
            "Which downtime reasons on {} drive most of this cost?",
            asset.name
        )]))
    }
}

#[async_trait]
impl<D> Capability for FinancialImpactTool<D>
where
    D: DataAccess + Send + 'static,
    D::Error: Display,
{
    fn name(&self) -> &'static str {
        "financial_impact"
    }

    fn description(&self) -> &'static str {
        "Estimated cost of an asset's downtime over a date range"
    }

    fn input_schema(&self) -> Value {
        asset_range_schema("Downtime cost estimate over an explicit date range")
    }

    async fn invoke(&self, args: Value) -> Result<ToolResult, ToolError> {
        let params: FinancialParams =
            serde_json::from_value(args).map_err(|e| ToolError::InvalidArgs(e.to_string()))?;

        let data = Arc::clone(&self.data);
        let cost_per_hour = self.cost_per_hour;
        tokio::task::spawn_blocking(move || Self::run(&data, cost_per_hour, params))
            .await
            .map_err(|e| ToolError::Internal(format!("task join error: {}", e)))?
    }
}

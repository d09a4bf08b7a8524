//! Efficiency tool - OEE decomposition and opportunity analysis

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
struct EfficiencyParams {
    asset: String,
    start: u64,
    end: u64,
}

/// OEE component averages over a date range, in percent
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct OeeBreakdown {
    /// Availability percentage [0, 100]
    pub availability: f64,
    /// Performance percentage [0, 100]
    pub performance: f64,
    /// Quality percentage [0, 100]
    pub quality: f64,
}

impl OeeBreakdown {
    /// OEE recomputed from the (averaged) components, in percent.
    ///
    /// Recomputing from averaged components rather than averaging daily OEE
    /// values keeps the identity `OEE = A x P x Q` exact for the returned
    /// triple.
    pub fn oee(&self) -> f64 {
        self.availability / 100.0 * (self.performance / 100.0) * (self.quality / 100.0) * 100.0
    }

    /// The component with the largest gap to 100 and that gap's size - the
    /// quantified "biggest opportunity"
    pub fn biggest_opportunity(&self) -> (&'static str, f64) {
        let gaps = [
            ("availability", 100.0 - self.availability),
            ("performance", 100.0 - self.performance),
            ("quality", 100.0 - self.quality),
        ];

        // max_by keeps the later element on ties; iterate in reverse so the
        // earlier component wins and the choice is deterministic
        gaps.into_iter()
            .rev()
            .max_by(|(_, a), (_, b)| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal))
            .unwrap_or(("availability", 0.0))
    }
}

/// Computes OEE over a date range.
///
/// Each component is averaged across the days that have data; OEE is then
/// recomputed from the averaged components to avoid averaging drift.
pub struct EfficiencyTool<D> {
    data: Arc<Mutex<D>>,
}

impl<D> EfficiencyTool<D> {
    /// Create the tool over a shared data handle
    pub fn new(data: Arc<Mutex<D>>) -> Self {
        Self { data }
    }
}

impl<D> EfficiencyTool<D>
where
    D: DataAccess,
    D::Error: Display,
{
    fn run(data: &Arc<Mutex<D>>, params: EfficiencyParams) -> Result<ToolResult, ToolError> {
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
        let metrics = guard
            .get_daily_metrics(asset.id, range)
            .map_err(|e| ToolError::Upstream(e.to_string()))?;

        if metrics.data.is_empty() {
            let data = json!({
                "found": true,
                "asset": asset.name,
                "has_data": false,
            });
            return Ok(ToolResult::new(
                data,
                vec![asset_citation, metrics.citation],
                CacheTier::Daily,
            ));
        }

        let days = metrics.data.len() as f64;
        let breakdown = OeeBreakdown {
            availability: metrics.data.iter().map(|m| m.availability).sum::<f64>() / days,
            performance: metrics.data.iter().map(|m| m.performance).sum::<f64>() / days,
            quality: metrics.data.iter().map(|m| m.quality).sum::<f64>() / days,
        };
        let oee = breakdown.oee();
        let (component, gap) = breakdown.biggest_opportunity();

        let derived = Citation::for_query(
            "query:oee",
            metrics.citation.query_timestamp,
            format!(
                "{}: OEE {:.1}% = availability {:.1}% x performance {:.1}% x quality {:.1}% over {} days; biggest opportunity {} ({:.1} points)",
                asset.name,
                oee,
                breakdown.availability,
                breakdown.performance,
                breakdown.quality,
                metrics.data.len(),
                component,
                gap
            ),
        );

        let data = json!({
            "found": true,
            "asset": asset.name,
            "has_data": true,
            "days_with_data": metrics.data.len(),
            "availability": breakdown.availability,
            "performance": breakdown.performance,
            "quality": breakdown.quality,
            "oee": oee,
            "biggest_opportunity": {
                "component": component,
                "gap": gap,
            },
        });

        Ok(ToolResult::new(
            data,
            vec![asset_citation, metrics.citation, derived],
            CacheTier::Daily,
        )
        .with_follow_ups(vec![
            format!("What caused downtime on {} in this period?", asset.name),
            format!("What would closing the {} gap be worth?", component),
        ]))
    }
}

#[async_trait]
impl<D> Capability for EfficiencyTool<D>
where
    D: DataAccess + Send + 'static,
    D::Error: Display,
{
    fn name(&self) -> &'static str {
        "efficiency"
    }

    fn description(&self) -> &'static str {
        "OEE (availability x performance x quality) for an asset over a date range, \
         with the biggest improvement opportunity"
    }

    fn input_schema(&self) -> Value {
        asset_range_schema("OEE query over an explicit date range")
    }

    async fn invoke(&self, args: Value) -> Result<ToolResult, ToolError> {
        let params: EfficiencyParams =
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

    fn tool() -> EfficiencyTool<SqliteDataStore> {
        let store = SqliteDataStore::open_seeded().unwrap();
        EfficiencyTool::new(Arc::new(Mutex::new(store)))
    }

    fn week_args(asset: &str) -> Value {
        json!({"asset": asset, "start": 1704067200u64, "end": 1704672000u64})
    }

    #[tokio::test]
    async fn test_oee_identity_holds_for_returned_triple() {
        let result = tool().invoke(week_args("Grinder 5")).await.unwrap();

        let a = result.data["availability"].as_f64().unwrap();
        let p = result.data["performance"].as_f64().unwrap();
        let q = result.data["quality"].as_f64().unwrap();
        let oee = result.data["oee"].as_f64().unwrap();

        let recomputed = a / 100.0 * (p / 100.0) * (q / 100.0) * 100.0;
        assert!((oee - recomputed).abs() < 1e-12);
        assert_eq!(result.data["days_with_data"], 3);
    }

    #[tokio::test]
    async fn test_components_averaged_not_oee() {
        let result = tool().invoke(week_args("Grinder 5")).await.unwrap();

        // Seed availability for Grinder 5: 85.0, 82.5, 88.0
        let a = result.data["availability"].as_f64().unwrap();
        assert!((a - 85.166_666_666_666_67).abs() < 1e-9);
    }

    #[tokio::test]
    async fn test_biggest_opportunity_is_largest_gap() {
        let result = tool().invoke(week_args("Grinder 5")).await.unwrap();

        // Availability averages lowest of the three components in the seed
        assert_eq!(result.data["biggest_opportunity"]["component"], "availability");
        let gap = result.data["biggest_opportunity"]["gap"].as_f64().unwrap();
        let a = result.data["availability"].as_f64().unwrap();
        assert!((gap - (100.0 - a)).abs() < 1e-12);
    }

    #[tokio::test]
    async fn test_no_data_range_is_successful_result() {
        let args = json!({"asset": "Grinder 5", "start": 1u64, "end": 2u64});
        let result = tool().invoke(args).await.unwrap();

        assert_eq!(result.data["has_data"], false);
        assert_eq!(result.citations.len(), 2);
    }

    #[tokio::test]
    async fn test_inverted_range_rejected() {
        let args = json!({"asset": "Grinder 5", "start": 10u64, "end": 5u64});
        let err = tool().invoke(args).await.unwrap_err();
        assert!(matches!(err, ToolError::InvalidArgs(_)));
    }

    #[test]
    fn test_opportunity_tie_prefers_first_component() {
        let breakdown = OeeBreakdown {
            availability: 90.0,
            performance: 90.0,
            quality: 95.0,
        };
        assert_eq!(breakdown.biggest_opportunity().0, "availability");
    }

    proptest::proptest! {
        #[test]
        fn prop_oee_identity_for_any_triple(
            availability in 0.0f64..=100.0,
            performance in 0.0f64..=100.0,
            quality in 0.0f64..=100.0,
        ) {
            let breakdown = OeeBreakdown { availability, performance, quality };
            let oee = breakdown.oee();

            let identity =
                availability / 100.0 * (performance / 100.0) * (quality / 100.0) * 100.0;
            proptest::prop_assert!((oee - identity).abs() < 1e-12);

            // OEE never exceeds its weakest component
            let weakest = availability.min(performance).min(quality);
            proptest::prop_assert!(oee <= weakest + 1e-9);
            proptest::prop_assert!((0.0..=100.0 + 1e-9).contains(&oee));

            let (_, gap) = breakdown.biggest_opportunity();
            proptest::prop_assert!((gap - (100.0 - weakest)).abs() < 1e-9);
        }
    }
}

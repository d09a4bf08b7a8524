//! Downtime tool - Pareto analysis of downtime reasons

use crate::capability::{asset_range_schema, Capability};
use crate::lookup::{lock_data, resolve_asset, Resolved};
use crate::ToolError;
use async_trait::async_trait;
use millwright_domain::traits::DataAccess;
use millwright_domain::{CacheTier, Citation, DowntimeEntry, TimeRange, ToolResult};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::fmt::Display;
use std::sync::{Arc, Mutex};

/// Cumulative share (percent) below which a reason counts as "vital few"
const VITAL_FEW_CUTOFF: f64 = 80.0;

#[derive(Debug, Deserialize)]
struct DowntimeParams {
    asset: String,
    start: u64,
    end: u64,
}

/// One ranked row of a Pareto analysis
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ParetoRow {
    /// Reason label
    pub reason: String,
    /// Minutes of downtime attributed to this reason
    pub minutes: f64,
    /// Share of total downtime, percent
    pub percentage: f64,
    /// Running cumulative share, percent (non-decreasing)
    pub cumulative: f64,
    /// Whether this reason falls within the ~80% vital few
    pub is_vital_few: bool,
    /// Whether the reason is safety-tagged
    pub safety: bool,
}

/// Rank downtime entries by duration and compute Pareto shares.
///
/// Rows are sorted by duration descending (reason label breaks ties, so the
/// order is stable), percentages sum to 100 within floating-point
/// tolerance, and `cumulative` is non-decreasing.
pub fn pareto(entries: &[DowntimeEntry]) -> Vec<ParetoRow> {
    let total: f64 = entries.iter().map(|e| e.seconds).sum();
    if total <= 0.0 {
        return Vec::new();
    }

    let mut sorted: Vec<&DowntimeEntry> = entries.iter().collect();
    sorted.sort_by(|a, b| {
        b.seconds
            .partial_cmp(&a.seconds)
            .unwrap_or(std::cmp::Ordering::Equal)
            .then_with(|| a.reason.cmp(&b.reason))
    });

    let mut cumulative = 0.0;
    sorted
        .into_iter()
        .map(|entry| {
            let percentage = entry.seconds / total * 100.0;
            cumulative += percentage;
            ParetoRow {
                reason: entry.reason.clone(),
                minutes: entry.seconds / 60.0,
                percentage,
                cumulative,
                is_vital_few: cumulative <= VITAL_FEW_CUTOFF + 1e-9,
                safety: entry.safety,
            }
        })
        .collect()
}

/// Aggregates downtime by reason over a range and ranks the reasons.
///
/// Zero downtime is a distinct congratulatory result, not an empty list.
/// Safety-tagged reasons are surfaced in a separate list regardless of rank.
pub struct DowntimeTool<D> {
    data: Arc<Mutex<D>>,
}

impl<D> DowntimeTool<D> {
    /// Create the tool over a shared data handle
    pub fn new(data: Arc<Mutex<D>>) -> Self {
        Self { data }
    }
}

impl<D> DowntimeTool<D>
where
    D: DataAccess,
    D::Error: Display,
{
    fn run(data: &Arc<Mutex<D>>, params: DowntimeParams) -> Result<ToolResult, ToolError> {
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
        if total_seconds <= 0.0 {
            let derived = Citation::for_query(
                "query:downtime_pareto",
                downtime.citation.query_timestamp,
                format!("{} recorded zero downtime in this period", asset.name),
            );
            let data = json!({
                "found": true,
                "asset": asset.name,
                "has_downtime": false,
                "uptime_percent": 100.0,
                "message": format!(
                    "{} recorded zero downtime in this period. Congratulations to the crew!",
                    asset.name
                ),
            });
            return Ok(ToolResult::new(
                data,
                vec![asset_citation, downtime.citation, derived],
                CacheTier::Daily,
            ));
        }

        let rows = pareto(&downtime.data);
        let safety_reasons: Vec<&ParetoRow> = rows.iter().filter(|r| r.safety).collect();
        let vital_few: Vec<&str> = rows
            .iter()
            .filter(|r| r.is_vital_few)
            .map(|r| r.reason.as_str())
            .collect();

        let derived = Citation::for_query(
            "query:downtime_pareto",
            downtime.citation.query_timestamp,
            format!(
                "{}: {:.0} minutes of downtime across {} reasons; top contributors: {}",
                asset.name,
                total_seconds / 60.0,
                rows.len(),
                vital_few.join(", ")
            ),
        );

        let data = json!({
            "found": true,
            "asset": asset.name,
            "has_downtime": true,
            "total_minutes": total_seconds / 60.0,
            "reasons": rows,
            "safety_reasons": safety_reasons,
            "vital_few": vital_few,
        });

        Ok(ToolResult::new(
            data,
            vec![asset_citation, downtime.citation, derived],
            CacheTier::Daily,
        )
        .with_follow_ups(vec![format!(
            "What would the downtime on {} cost in this period?",
            asset.name
        )]))
    }
}

#[async_trait]
impl<D> Capability for DowntimeTool<D>
where
    D: DataAccess + Send + 'static,
    D::Error: Display,
{
    fn name(&self) -> &'static str {
        "downtime"
    }

    fn description(&self) -> &'static str {
        "Downtime Pareto analysis for an asset over a date range: reasons ranked by \
         duration, vital-few contributors, safety-tagged reasons"
    }

    fn input_schema(&self) -> Value {
        asset_range_schema("Downtime analysis over an explicit date range")
    }

    async fn invoke(&self, args: Value) -> Result<ToolResult, ToolError> {
        let params: DowntimeParams =
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

    fn entry(reason: &str, minutes: f64, safety: bool) -> DowntimeEntry {
        DowntimeEntry {
            reason: reason.to_string(),
            seconds: minutes * 60.0,
            safety,
        }
    }

    fn shift_entries() -> Vec<DowntimeEntry> {
        vec![
            entry("Material jam", 62.0, false),
            entry("Blade change", 47.0, false),
            entry("Break", 28.0, false),
            entry("Safety stop", 15.0, true),
        ]
    }

    #[test]
    fn test_pareto_known_breakdown() {
        // {Jam: 62, BladeChange: 47, Break: 28, SafetyStop: 15}, total 152
        let rows = pareto(&shift_entries());

        assert_eq!(rows[0].reason, "Material jam");
        assert!((rows[0].percentage - 40.789_473_684_210_53).abs() < 1e-9);
        assert!((rows[1].cumulative - 71.710_526_315_789_48).abs() < 1e-9);

        let vital: Vec<&str> = rows
            .iter()
            .filter(|r| r.is_vital_few)
            .map(|r| r.reason.as_str())
            .collect();
        assert_eq!(vital, vec!["Material jam", "Blade change"]);
    }

    #[test]
    fn test_pareto_percentages_sum_to_100() {
        let rows = pareto(&shift_entries());
        let sum: f64 = rows.iter().map(|r| r.percentage).sum();
        assert!((sum - 100.0).abs() < 1e-9);
    }

    #[test]
    fn test_pareto_cumulative_non_decreasing() {
        let rows = pareto(&shift_entries());
        for pair in rows.windows(2) {
            assert!(pair[1].cumulative >= pair[0].cumulative);
        }
    }

    proptest::proptest! {
        #[test]
        fn prop_pareto_shares_sum_to_100(
            minutes in proptest::collection::vec(0.1f64..500.0, 1..12)
        ) {
            let entries: Vec<DowntimeEntry> = minutes
                .iter()
                .enumerate()
                .map(|(i, m)| entry(&format!("Reason {}", i), *m, false))
                .collect();

            let rows = pareto(&entries);
            proptest::prop_assert_eq!(rows.len(), entries.len());

            let sum: f64 = rows.iter().map(|r| r.percentage).sum();
            proptest::prop_assert!((sum - 100.0).abs() < 1e-6);
            for pair in rows.windows(2) {
                proptest::prop_assert!(pair[1].cumulative >= pair[0].cumulative);
                proptest::prop_assert!(pair[0].minutes >= pair[1].minutes);
            }
            proptest::prop_assert!((rows.last().unwrap().cumulative - 100.0).abs() < 1e-6);
        }
    }

    #[test]
    fn test_pareto_tie_break_is_stable() {
        let entries = vec![
            entry("Zeta fault", 10.0, false),
            entry("Alpha fault", 10.0, false),
        ];
        let rows = pareto(&entries);
        assert_eq!(rows[0].reason, "Alpha fault");
    }

    #[test]
    fn test_pareto_empty_input() {
        assert!(pareto(&[]).is_empty());
    }

    fn tool() -> DowntimeTool<SqliteDataStore> {
        let store = SqliteDataStore::open_seeded().unwrap();
        DowntimeTool::new(Arc::new(Mutex::new(store)))
    }

    fn week_args(asset: &str) -> Value {
        json!({"asset": asset, "start": 1704067200u64, "end": 1704672000u64})
    }

    #[tokio::test]
    async fn test_downtime_over_seeded_week() {
        // Seeded downtime for Grinder 5, in seconds
        let result = tool().invoke(week_args("Grinder 5")).await.unwrap();

        assert_eq!(result.data["has_downtime"], true);
        assert_eq!(result.data["vital_few"][0], "Material jam");
        assert_eq!(result.data["vital_few"][1], "Blade change");

        let safety = result.data["safety_reasons"].as_array().unwrap();
        assert_eq!(safety.len(), 1);
        assert_eq!(safety[0]["reason"], "Safety stop");
    }

    #[tokio::test]
    async fn test_zero_downtime_congratulates() {
        // Packer 2 has no downtime rows in the seed
        let result = tool().invoke(week_args("Packer 2")).await.unwrap();

        assert_eq!(result.data["has_downtime"], false);
        assert_eq!(result.data["uptime_percent"], 100.0);
        assert!(result.data["message"]
            .as_str()
            .unwrap()
            .contains("Congratulations"));
        assert!(!result.citations.is_empty());
    }

    #[tokio::test]
    async fn test_safety_reason_surfaced_despite_low_rank() {
        let result = tool().invoke(week_args("Grinder 5")).await.unwrap();

        // Safety stop is the smallest contributor yet still listed
        let rows = result.data["reasons"].as_array().unwrap();
        assert_eq!(rows.last().unwrap()["reason"], "Safety stop");
        assert_eq!(rows.last().unwrap()["is_vital_few"], false);
        assert!(!result.data["safety_reasons"].as_array().unwrap().is_empty());
    }
}

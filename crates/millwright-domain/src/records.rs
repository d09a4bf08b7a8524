//! Domain records - the operational data the agent answers questions about
//!
//! These are plain read-side records. The data layer parses raw storage rows
//! into these types exactly once at the boundary, so downstream tools never
//! see untyped payloads.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Identifier for an asset (machine, line, cell)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct AssetId(pub i64);

impl fmt::Display for AssetId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "asset-{}", self.0)
    }
}

/// An explicit half-open time range in unix seconds.
///
/// Every data-access method takes a range or identifier explicitly - there
/// is no implicit "current" state - so results are reproducible and
/// cacheable by key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TimeRange {
    /// Inclusive start, unix seconds
    pub start: u64,
    /// Exclusive end, unix seconds
    pub end: u64,
}

impl TimeRange {
    /// Create a range; `start` must not exceed `end`
    pub fn new(start: u64, end: u64) -> Self {
        debug_assert!(start <= end, "TimeRange start must not exceed end");
        Self { start, end }
    }

    /// Whether a timestamp falls inside this range
    pub fn contains(&self, ts: u64) -> bool {
        ts >= self.start && ts < self.end
    }
}

/// Asset metadata
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Asset {
    /// Unique asset identifier
    pub id: AssetId,
    /// Display name (e.g. "Grinder 5")
    pub name: String,
    /// Plant area (e.g. "Machining")
    pub area: String,
    /// Asset class (e.g. "grinder", "press")
    pub asset_type: String,
}

/// One day of aggregated performance for an asset.
///
/// OEE components are stored as percentages in [0, 100].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DailyMetric {
    /// Asset the metrics belong to
    pub asset_id: AssetId,
    /// Unix timestamp of the day's midnight (UTC)
    pub day: u64,
    /// Availability percentage [0, 100]
    pub availability: f64,
    /// Performance percentage [0, 100]
    pub performance: f64,
    /// Quality percentage [0, 100]
    pub quality: f64,
    /// Units produced that day
    pub output: f64,
}

/// Near-real-time production state for an asset
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProductionStatus {
    /// Asset the status belongs to
    pub asset_id: AssetId,
    /// Units produced so far in the current period
    pub current_count: f64,
    /// Target units for the current period
    pub target_count: f64,
    /// Whether the asset is currently running
    pub running: bool,
    /// Unix timestamp of the last status update
    pub updated_at: u64,
}

/// A single entry in an asset's event log
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EventRecord {
    /// Asset the event belongs to
    pub asset_id: AssetId,
    /// Unix timestamp of the event
    pub timestamp: u64,
    /// Event kind (e.g. "downtime", "safety_stop", "changeover")
    pub kind: String,
    /// Human-readable description
    pub description: String,
    /// Whether the event is safety-tagged
    pub safety: bool,
}

/// Duration attributed to one downtime reason.
///
/// Parsed from storage exactly once at the data boundary; Pareto logic
/// downstream only ever sees this typed form.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DowntimeEntry {
    /// Reason label (e.g. "Material jam")
    pub reason: String,
    /// Total seconds of downtime attributed to this reason
    pub seconds: f64,
    /// Whether the reason is safety-tagged
    pub safety: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_time_range_contains() {
        let range = TimeRange::new(100, 200);
        assert!(range.contains(100));
        assert!(range.contains(199));
        assert!(!range.contains(200));
        assert!(!range.contains(99));
    }

    #[test]
    fn test_asset_id_display() {
        assert_eq!(AssetId(7).to_string(), "asset-7");
    }
}

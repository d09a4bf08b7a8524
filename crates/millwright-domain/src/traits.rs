//! Trait definitions for external interactions
//!
//! These traits define the boundaries between domain logic and
//! infrastructure. Infrastructure implementations live in other crates.

use crate::citation::DataResult;
use crate::records::{Asset, AssetId, DailyMetric, DowntimeEntry, EventRecord, ProductionStatus, TimeRange};

/// Read-only access to the operational datastores.
///
/// Implemented by the infrastructure layer (millwright-data). Every method
/// takes an explicit identifier or time range and returns data *plus* the
/// citation describing what was queried - even when nothing was found. The
/// trait is synchronous (the backing store is synchronous); async callers
/// bridge via `tokio::task::spawn_blocking`.
pub trait DataAccess {
    /// Error type for data-access operations
    type Error;

    /// Look up an asset by exact or normalized name
    fn get_asset_by_name(&self, name: &str) -> Result<DataResult<Option<Asset>>, Self::Error>;

    /// Similarity-ranked candidates for a name that did not match exactly
    fn get_similar_assets(
        &self,
        name: &str,
        limit: usize,
    ) -> Result<DataResult<Vec<Asset>>, Self::Error>;

    /// Daily aggregated metrics for an asset over a range
    fn get_daily_metrics(
        &self,
        asset_id: AssetId,
        range: TimeRange,
    ) -> Result<DataResult<Vec<DailyMetric>>, Self::Error>;

    /// Event log entries for an asset over a range
    fn get_event_log(
        &self,
        asset_id: AssetId,
        range: TimeRange,
    ) -> Result<DataResult<Vec<EventRecord>>, Self::Error>;

    /// Downtime durations by reason for an asset over a range, parsed into
    /// the typed form at this boundary
    fn get_downtime(
        &self,
        asset_id: AssetId,
        range: TimeRange,
    ) -> Result<DataResult<Vec<DowntimeEntry>>, Self::Error>;

    /// Latest near-real-time production status for an asset
    fn get_production_status(
        &self,
        asset_id: AssetId,
    ) -> Result<DataResult<Option<ProductionStatus>>, Self::Error>;
}

/// Source of "now", injectable so cache expiry is deterministic in tests
pub trait Clock: Send + Sync {
    /// Current unix timestamp in seconds
    fn now(&self) -> u64;
}

/// System clock backed by `SystemTime`
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> u64 {
        std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .map(|d| d.as_secs())
            .unwrap_or(0)
    }
}

/// Turns an assembled answer outline into prose.
///
/// Implemented by the infrastructure layer (millwright-llm). The default
/// implementation is a deterministic template; an LLM-backed narrator
/// implements the same trait. Synchronous for the same reason as
/// [`DataAccess`]; async callers bridge via `spawn_blocking`.
pub trait Narrator {
    /// Error type for narration operations
    type Error;

    /// Render the outline into the final answer text
    fn narrate(&self, outline: &str) -> Result<String, Self::Error>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_system_clock_advances() {
        let clock = SystemClock;
        let a = clock.now();
        assert!(a > 1_500_000_000, "system clock should be past 2017");
    }
}

//! Millwright Domain Tools
//!
//! Concrete capabilities built on the data-access boundary, plus the static
//! tool registry the orchestrator dispatches against.
//!
//! ## Capabilities
//!
//! - `asset_lookup` - asset metadata by (fuzzy) name
//! - `production_status` - live counts and variance vs target
//! - `efficiency` - OEE decomposition and opportunity analysis
//! - `downtime` - Pareto analysis of downtime reasons
//! - `safety_events` - safety-tagged event log entries
//! - `financial_impact` - downtime cost estimate
//!
//! Every capability returns a [`ToolResult`](millwright_domain::ToolResult)
//! whose factual fields trace to citations, and returns the shared
//! not-found shape (never a guessed value) when the asset does not exist.

#![warn(missing_docs)]

pub mod capability;
pub mod registry;

mod asset_lookup;
mod downtime;
mod efficiency;
mod financial;
mod lookup;
mod production;
mod safety;

pub use asset_lookup::AssetLookupTool;
pub use capability::Capability;
pub use downtime::DowntimeTool;
pub use efficiency::EfficiencyTool;
pub use financial::FinancialImpactTool;
pub use production::ProductionStatusTool;
pub use registry::ToolRegistry;
pub use safety::SafetyEventsTool;

use thiserror::Error;

/// Errors a capability invocation can produce.
///
/// "No data" is never an error: absent entities and empty ranges are normal
/// successful results carrying citations.
#[derive(Error, Debug)]
pub enum ToolError {
    /// Malformed arguments; surfaced immediately, not retried
    #[error("Invalid arguments: {0}")]
    InvalidArgs(String),

    /// The data layer failed (timeout, connection failure); the caller marks
    /// this tool's section unavailable and lets sibling tools complete
    #[error("Upstream data access failed: {0}")]
    Upstream(String),

    /// Internal invariant violation (task join failure, poisoned lock)
    #[error("Internal tool error: {0}")]
    Internal(String),
}

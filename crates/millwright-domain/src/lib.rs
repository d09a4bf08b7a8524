//! Millwright Domain Layer
//!
//! This crate contains the core domain model for Millwright: the types that
//! flow between the data layer, the domain tools, the grounding engine, and
//! the orchestrator. It has no runtime dependencies beyond serialization and
//! id generation.
//!
//! ## Key Concepts
//!
//! - **Citation**: ties a data point or claim to its source table/query and
//!   timestamp
//! - **DataResult**: data plus the citation describing what was queried,
//!   returned by every data-access call (even empty ones)
//! - **ToolResult**: the unit returned by every capability invocation, with
//!   citations and cache metadata
//! - **Claim / GroundingResult**: claims extracted from a draft answer and
//!   the aggregate evidence score over them
//! - **CacheTier**: TTL class chosen by data volatility, not by the cache
//!
//! ## Architecture
//!
//! Trait definitions for all external interactions live in [`traits`];
//! infrastructure implementations live in other crates.

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod citation;
pub mod claim;
pub mod grounding;
pub mod records;
pub mod response;
pub mod tier;
pub mod tool_result;
pub mod traits;

// Re-exports for convenience
pub use citation::Citation;
pub use citation::DataResult;
pub use claim::{Claim, ClaimKind};
pub use grounding::GroundingResult;
pub use records::{
    Asset, AssetId, DailyMetric, DowntimeEntry, EventRecord, ProductionStatus, TimeRange,
};
pub use response::{AgentResponse, AuditRecord, ResponseId};
pub use tier::CacheTier;
pub use tool_result::{ToolMetadata, ToolResult};
pub use traits::{Clock, DataAccess, Narrator, SystemClock};

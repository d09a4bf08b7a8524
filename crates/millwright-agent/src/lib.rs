//! Millwright Orchestrator
//!
//! Drives a query through the per-request pipeline: `received →
//! tool_selection → fan_out_invoke → draft_assembly → grounding_check →
//! respond | fallback`.
//!
//! The planner selects capabilities from the registry, the orchestrator
//! fans their invocations out concurrently under one timeout budget
//! (through the response cache), assembles the completed sections into a
//! draft, narrates it, and runs the grounding check before anything is
//! delivered. Every delivered response leaves an audit record.

#![warn(missing_docs)]

pub mod audit;
mod assemble;
pub mod config;
pub mod orchestrator;
pub mod planner;

pub use audit::{AuditLog, ALERT_THRESHOLD};
pub use config::AgentConfig;
pub use orchestrator::Agent;
pub use planner::{KeywordPlanner, PlannedCall, Planner};

use thiserror::Error;

/// Errors the orchestrator can surface to its caller.
///
/// Per-section failures are contained inside the response; these variants
/// cover the cases where no well-formed response exists at all.
#[derive(Error, Debug)]
pub enum AgentError {
    /// The timeout budget elapsed before any tool section completed
    #[error("No tool section completed within the {0}s budget")]
    NoSectionsCompleted(u64),

    /// Every selected tool failed upstream; there is no data to answer with
    #[error("Every tool section failed; the data layer is unavailable")]
    AllSectionsUnavailable,

    /// Grounding validation itself failed (not a low score - a broken check)
    #[error("Grounding validation failed: {0}")]
    Grounding(#[from] millwright_grounding::GroundingError),

    /// Runtime-level failure (task join, narration bridge)
    #[error("Internal error: {0}")]
    Internal(String),
}

//! Shared entity resolution for all tools
//!
//! Unknown-entity policy: when the lookup fails, the tool returns the
//! not-found shape with up to 5 similarity-ranked suggestions and does not
//! issue any downstream metric queries.

use crate::ToolError;
use millwright_domain::traits::DataAccess;
use millwright_domain::{Asset, Citation, ToolResult};
use std::fmt::Display;
use std::sync::{Arc, Mutex};

/// Outcome of resolving an asset name
pub(crate) enum Resolved {
    /// Asset found; carries the lookup citation
    Found(Asset, Citation),
    /// Asset not found; carries the complete not-found tool result
    NotFound(Box<ToolResult>),
}

/// Resolve an asset by name, building the not-found result (with
/// suggestions) when it does not exist
pub(crate) fn resolve_asset<D>(data: &D, name: &str) -> Result<Resolved, ToolError>
where
    D: DataAccess,
    D::Error: Display,
{
    let lookup = data
        .get_asset_by_name(name)
        .map_err(|e| ToolError::Upstream(e.to_string()))?;

    match lookup.data {
        Some(asset) => Ok(Resolved::Found(asset, lookup.citation)),
        None => {
            tracing::debug!("no asset matched '{}', ranking suggestions", name);
            let similar = data
                .get_similar_assets(name, ToolResult::MAX_SUGGESTIONS)
                .map_err(|e| ToolError::Upstream(e.to_string()))?;

            let suggestions = similar.data.into_iter().map(|a| a.name).collect();
            let mut result = ToolResult::not_found(name, suggestions, lookup.citation);
            // The ranked-candidates query is provenance too; its excerpt
            // names the suggestions
            result.citations.push(similar.citation);
            Ok(Resolved::NotFound(Box::new(result)))
        }
    }
}

/// Lock a shared data handle, mapping poisoning to a tool error
pub(crate) fn lock_data<D>(data: &Arc<Mutex<D>>) -> Result<std::sync::MutexGuard<'_, D>, ToolError> {
    data.lock()
        .map_err(|e| ToolError::Internal(format!("data lock poisoned: {}", e)))
}

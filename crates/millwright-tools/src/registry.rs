//! Tool registry - the static set of capabilities the agent can dispatch to
//!
//! Built once at process start from an explicit list of constructors; no
//! runtime scanning, no mutation after boot. This keeps the set of available
//! capabilities auditable and testable, and means the orchestrator can read
//! it without locking.

use crate::capability::Capability;
use crate::{
    AssetLookupTool, DowntimeTool, EfficiencyTool, FinancialImpactTool, ProductionStatusTool,
    SafetyEventsTool,
};
use millwright_domain::traits::DataAccess;
use std::collections::HashMap;
use std::fmt::Display;
use std::sync::{Arc, Mutex};

/// Immutable registry of capabilities, keyed by tool name
pub struct ToolRegistry {
    tools: Vec<Arc<dyn Capability>>,
    by_name: HashMap<&'static str, usize>,
}

impl ToolRegistry {
    /// Build a registry from an explicit list of capabilities.
    ///
    /// # Panics
    ///
    /// Panics on duplicate tool names. Registration happens once at boot,
    /// so a duplicate is a startup misconfiguration and fails fast.
    pub fn from_tools(tools: Vec<Arc<dyn Capability>>) -> Self {
        let mut by_name = HashMap::new();
        for (index, tool) in tools.iter().enumerate() {
            if by_name.insert(tool.name(), index).is_some() {
                panic!("duplicate tool registered: {}", tool.name());
            }
        }
        Self { tools, by_name }
    }

    /// Build the standard registry with all built-in tools over one shared
    /// data handle
    pub fn builtin<D>(data: Arc<Mutex<D>>) -> Self
    where
        D: DataAccess + Send + 'static,
        D::Error: Display,
    {
        Self::from_tools(vec![
            Arc::new(AssetLookupTool::new(Arc::clone(&data))),
            Arc::new(ProductionStatusTool::new(Arc::clone(&data))),
            Arc::new(EfficiencyTool::new(Arc::clone(&data))),
            Arc::new(DowntimeTool::new(Arc::clone(&data))),
            Arc::new(SafetyEventsTool::new(Arc::clone(&data))),
            Arc::new(FinancialImpactTool::new(data)),
        ])
    }

    /// All registered capabilities, in registration order
    pub fn all(&self) -> &[Arc<dyn Capability>] {
        &self.tools
    }

    /// Look up a capability by name
    pub fn get(&self, name: &str) -> Option<Arc<dyn Capability>> {
        self.by_name.get(name).map(|&i| Arc::clone(&self.tools[i]))
    }

    /// Whether a capability with this name exists
    pub fn contains(&self, name: &str) -> bool {
        self.by_name.contains_key(name)
    }

    /// Registered tool names, in registration order
    pub fn names(&self) -> Vec<&'static str> {
        self.tools.iter().map(|t| t.name()).collect()
    }

    /// Number of registered capabilities
    pub fn len(&self) -> usize {
        self.tools.len()
    }

    /// Whether the registry is empty
    pub fn is_empty(&self) -> bool {
        self.tools.is_empty()
    }
}

//! Orchestrator configuration

use std::time::Duration;

/// Default fan-out timeout budget
pub const DEFAULT_BUDGET_SECS: u64 = 20;

/// Configuration for the orchestrator.
///
/// The budget bounds the whole fan-out phase, not each tool individually:
/// all selected tools share it, and whatever has not finished when it
/// elapses is cancelled.
#[derive(Debug, Clone)]
pub struct AgentConfig {
    /// Timeout budget for the fan-out phase
    pub budget: Duration,
}

impl Default for AgentConfig {
    fn default() -> Self {
        Self {
            budget: Duration::from_secs(DEFAULT_BUDGET_SECS),
        }
    }
}

impl AgentConfig {
    /// Override the fan-out budget
    pub fn with_budget(mut self, budget: Duration) -> Self {
        self.budget = budget;
        self
    }
}

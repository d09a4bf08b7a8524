//! Cache tier module - TTL classes by data volatility
//!
//! The tier is decided by the domain tool that produced a result, carried in
//! the result's metadata, and only *read* by the cache. The cache never
//! hard-codes a TTL.

use serde::{Deserialize, Serialize};

/// TTL class chosen by data volatility, not storage mechanism
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CacheTier {
    /// Static metadata (asset names, types): 1 hour
    Static,

    /// Daily/aggregated data (OEE, Pareto over closed days): 15 minutes
    Daily,

    /// Live/near-real-time data (production counts): 1 minute
    Live,
}

impl CacheTier {
    /// Time-to-live for results in this tier, in seconds
    pub fn ttl_seconds(&self) -> u64 {
        match self {
            CacheTier::Static => 3600,
            CacheTier::Daily => 900,
            CacheTier::Live => 60,
        }
    }

    /// Get the tier name as a string
    pub fn as_str(&self) -> &'static str {
        match self {
            CacheTier::Static => "static",
            CacheTier::Daily => "daily",
            CacheTier::Live => "live",
        }
    }

    /// Parse a tier from a string
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "static" => Some(CacheTier::Static),
            "daily" => Some(CacheTier::Daily),
            "live" => Some(CacheTier::Live),
            _ => None,
        }
    }
}

impl std::str::FromStr for CacheTier {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s).ok_or_else(|| format!("Invalid cache tier: {}", s))
    }
}

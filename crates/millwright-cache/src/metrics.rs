//! Metrics collection for cache operations

/// Counters collected across the cache's lifetime
#[derive(Debug, Clone, Default)]
pub struct CacheMetrics {
    /// Lookups served from a fresh entry
    pub hits: u64,

    /// Lookups that required a computation
    pub misses: u64,

    /// Lookups that waited on an in-flight computation and were served its
    /// result
    pub coalesced: u64,

    /// Entries removed because their TTL elapsed
    pub evictions: u64,

    /// Sweep cycles completed
    pub sweep_count: u64,
}

impl CacheMetrics {
    /// Create new empty metrics
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a cache hit
    pub fn record_hit(&mut self) {
        self.hits += 1;
    }

    /// Record a cache miss
    pub fn record_miss(&mut self) {
        self.misses += 1;
    }

    /// Record a coalesced lookup
    pub fn record_coalesced(&mut self) {
        self.coalesced += 1;
    }

    /// Record expired-entry evictions
    pub fn record_evictions(&mut self, count: usize) {
        self.evictions += count as u64;
    }

    /// Record a sweep cycle completion
    pub fn record_sweep(&mut self) {
        self.sweep_count += 1;
    }

    /// Fraction of lookups served without computing, or 0.0 before any
    /// lookups
    pub fn hit_rate(&self) -> f64 {
        let served = self.hits + self.coalesced;
        let total = served + self.misses;
        if total == 0 {
            0.0
        } else {
            served as f64 / total as f64
        }
    }

    /// Reset all counters
    pub fn reset(&mut self) {
        *self = Self::default();
    }

    /// Generate a summary report of metrics
    pub fn summary(&self) -> String {
        [
            "Cache Metrics Summary".to_string(),
            "=====================".to_string(),
            format!("Hits: {}", self.hits),
            format!("Misses: {}", self.misses),
            format!("Coalesced: {}", self.coalesced),
            format!("Evictions: {}", self.evictions),
            format!("Sweep cycles: {}", self.sweep_count),
            format!("Hit rate: {:.1}%", self.hit_rate() * 100.0),
        ]
        .join("\n")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hit_rate_counts_coalesced_as_served() {
        let mut metrics = CacheMetrics::new();
        metrics.record_hit();
        metrics.record_coalesced();
        metrics.record_miss();
        metrics.record_miss();

        assert_eq!(metrics.hit_rate(), 0.5);
    }

    #[test]
    fn test_hit_rate_with_no_lookups() {
        assert_eq!(CacheMetrics::new().hit_rate(), 0.0);
    }

    #[test]
    fn test_summary_contains_counters() {
        let mut metrics = CacheMetrics::new();
        metrics.record_evictions(3);
        metrics.record_sweep();

        let summary = metrics.summary();
        assert!(summary.contains("Evictions: 3"));
        assert!(summary.contains("Sweep cycles: 1"));
    }

    #[test]
    fn test_reset() {
        let mut metrics = CacheMetrics::new();
        metrics.record_hit();
        metrics.record_evictions(5);
        metrics.reset();

        assert_eq!(metrics.hits, 0);
        assert_eq!(metrics.evictions, 0);
    }
}

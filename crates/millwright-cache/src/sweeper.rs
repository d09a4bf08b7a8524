//! Background worker that evicts expired cache entries

use crate::ResponseCache;
use std::sync::Arc;
use tokio::time::{interval, Duration};

/// Background worker that sweeps the cache on a schedule.
///
/// Expired entries are already refused at read time; the sweeper exists so
/// entries nobody asks for again still get reclaimed.
pub struct CacheSweeper {
    cache: Arc<ResponseCache>,
    interval: Duration,
}

impl CacheSweeper {
    /// Create a sweeper over `cache` running every `interval`
    pub fn new(cache: Arc<ResponseCache>, interval: Duration) -> Self {
        Self { cache, interval }
    }

    /// Run the sweeper until a shutdown signal (Ctrl+C) is received
    pub async fn run(&self) {
        let mut ticker = interval(self.interval);

        tracing::info!("Cache sweeper started (interval: {:?})", self.interval);

        loop {
            tokio::select! {
                _ = ticker.tick() => {
                    let evicted = self.cache.evict_expired();
                    if evicted > 0 {
                        tracing::info!("Sweep completed: {} expired entries evicted", evicted);
                    } else {
                        tracing::debug!("Sweep completed: nothing to evict");
                    }
                }
                _ = tokio::signal::ctrl_c() => {
                    tracing::info!("Shutdown signal received, stopping sweeper");
                    break;
                }
            }
        }

        tracing::info!("Sweeper stopped. Final metrics:\n{}", self.cache.metrics().summary());
    }

    /// Run for a specific number of cycles (useful for testing)
    pub async fn run_cycles(&self, cycles: usize) -> usize {
        let mut ticker = interval(self.interval);
        let mut total = 0;

        for _ in 0..cycles {
            ticker.tick().await;
            total += self.cache.evict_expired();
        }

        total
    }
}

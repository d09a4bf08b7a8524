//! TTL response cache with singleflight coalescing

use crate::{CacheKey, CacheMetrics};
use millwright_domain::{Clock, SystemClock, ToolResult};
use std::collections::HashMap;
use std::future::Future;
use std::sync::{Arc, Mutex, MutexGuard};

/// A cached tool result and its expiry bounds
#[derive(Debug, Clone)]
struct CacheEntry {
    result: ToolResult,
    expires_at: u64,
}

/// TTL cache for tool results.
///
/// Each entry's TTL comes from the `CacheTier` the tool declared on its
/// result. An entry is never served at or past its expiry, no matter how
/// recently it was stored. [`ResponseCache::get_or_compute`] additionally
/// coalesces concurrent requests for the same key: one caller computes,
/// the rest wait and are served the stored result.
pub struct ResponseCache {
    entries: Mutex<HashMap<CacheKey, CacheEntry>>,
    inflight: tokio::sync::Mutex<HashMap<CacheKey, Arc<tokio::sync::Mutex<()>>>>,
    metrics: Mutex<CacheMetrics>,
    clock: Arc<dyn Clock>,
}

impl Default for ResponseCache {
    fn default() -> Self {
        Self::new()
    }
}

impl ResponseCache {
    /// Create a cache on the system clock
    pub fn new() -> Self {
        Self::with_clock(Arc::new(SystemClock))
    }

    /// Create a cache on an injected clock (deterministic expiry in tests)
    pub fn with_clock(clock: Arc<dyn Clock>) -> Self {
        Self {
            entries: Mutex::new(HashMap::new()),
            inflight: tokio::sync::Mutex::new(HashMap::new()),
            metrics: Mutex::new(CacheMetrics::new()),
            clock,
        }
    }

    /// Look up a fresh entry, recording a hit or miss
    pub fn get(&self, key: &CacheKey) -> Option<ToolResult> {
        let found = self.lookup(key);
        let mut metrics = lock_ignore_poison(&self.metrics);
        match found {
            Some(_) => metrics.record_hit(),
            None => metrics.record_miss(),
        }
        found
    }

    /// Store a result under `key`, with expiry taken from the result's tier
    pub fn insert(&self, key: CacheKey, result: ToolResult) {
        let expires_at = self
            .clock
            .now()
            .saturating_add(result.metadata.ttl_seconds);
        let entry = CacheEntry { result, expires_at };
        lock_ignore_poison(&self.entries).insert(key, entry);
    }

    /// Serve `key` from cache, or run `compute` and cache its result.
    ///
    /// Concurrent callers for the same key are coalesced: one runs the
    /// computation while the rest wait and are served the stored result. A
    /// failed computation caches nothing, so the next caller retries.
    pub async fn get_or_compute<F, Fut, E>(
        &self,
        key: CacheKey,
        compute: F,
    ) -> Result<ToolResult, E>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<ToolResult, E>>,
    {
        if let Some(result) = self.lookup(&key) {
            lock_ignore_poison(&self.metrics).record_hit();
            return Ok(result);
        }

        let gate = {
            let mut inflight = self.inflight.lock().await;
            inflight
                .entry(key.clone())
                .or_insert_with(|| Arc::new(tokio::sync::Mutex::new(())))
                .clone()
        };
        let _leader = gate.lock().await;

        // A leader may have filled the entry while we waited on the gate
        if let Some(result) = self.lookup(&key) {
            lock_ignore_poison(&self.metrics).record_coalesced();
            tracing::debug!(key = %key, "request coalesced with in-flight computation");
            return Ok(result);
        }

        lock_ignore_poison(&self.metrics).record_miss();
        let outcome = compute().await;

        // The entry must be visible before the key's in-flight slot is
        // released; a caller arriving between the two would otherwise
        // build a fresh gate and recompute
        if let Ok(result) = &outcome {
            self.insert(key.clone(), result.clone());
        }

        {
            let mut inflight = self.inflight.lock().await;
            inflight.remove(&key);
        }

        outcome
    }

    /// Remove every expired entry, returning how many were evicted
    pub fn evict_expired(&self) -> usize {
        let now = self.clock.now();
        let mut entries = lock_ignore_poison(&self.entries);
        let before = entries.len();
        entries.retain(|_, entry| now < entry.expires_at);
        let evicted = before - entries.len();
        drop(entries);

        let mut metrics = lock_ignore_poison(&self.metrics);
        metrics.record_evictions(evicted);
        metrics.record_sweep();
        evicted
    }

    /// Number of stored entries, expired or not
    pub fn len(&self) -> usize {
        lock_ignore_poison(&self.entries).len()
    }

    /// Whether the cache holds no entries
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Snapshot of the metrics counters
    pub fn metrics(&self) -> CacheMetrics {
        lock_ignore_poison(&self.metrics).clone()
    }

    fn lookup(&self, key: &CacheKey) -> Option<ToolResult> {
        let mut entries = lock_ignore_poison(&self.entries);
        match entries.get(key) {
            Some(entry) if self.clock.now() < entry.expires_at => Some(entry.result.clone()),
            Some(_) => {
                // Expired, drop it now rather than waiting for the sweeper
                entries.remove(key);
                drop(entries);
                lock_ignore_poison(&self.metrics).record_evictions(1);
                None
            }
            None => None,
        }
    }
}

fn lock_ignore_poison<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

#[cfg(test)]
mod tests {
    use super::*;
    use millwright_domain::{CacheTier, Citation};
    use serde_json::json;
    use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};

    struct ManualClock(AtomicU64);

    impl ManualClock {
        fn at(secs: u64) -> Arc<Self> {
            Arc::new(Self(AtomicU64::new(secs)))
        }

        fn advance(&self, secs: u64) {
            self.0.fetch_add(secs, Ordering::SeqCst);
        }
    }

    impl Clock for ManualClock {
        fn now(&self) -> u64 {
            self.0.load(Ordering::SeqCst)
        }
    }

    fn result(tier: CacheTier) -> ToolResult {
        ToolResult::new(
            json!({"value": 1}),
            vec![Citation::for_query("query:test", 0, "test")],
            tier,
        )
    }

    fn key(name: &str) -> CacheKey {
        CacheKey::new(name, &json!({"asset": "Grinder 5"}))
    }

    #[test]
    fn test_fresh_entry_is_served() {
        let clock = ManualClock::at(1_000);
        let cache = ResponseCache::with_clock(clock);

        cache.insert(key("oee"), result(CacheTier::Daily));
        assert!(cache.get(&key("oee")).is_some());
        assert_eq!(cache.metrics().hits, 1);
    }

    #[test]
    fn test_expired_entry_is_never_served() {
        let clock = ManualClock::at(1_000);
        let cache = ResponseCache::with_clock(clock.clone());

        cache.insert(key("status"), result(CacheTier::Live));
        clock.advance(60); // exactly at expiry
        assert!(cache.get(&key("status")).is_none());

        let metrics = cache.metrics();
        assert_eq!(metrics.misses, 1);
        assert_eq!(metrics.evictions, 1);
    }

    #[test]
    fn test_tier_controls_ttl() {
        let clock = ManualClock::at(0);
        let cache = ResponseCache::with_clock(clock.clone());

        cache.insert(key("live"), result(CacheTier::Live));
        cache.insert(key("daily"), result(CacheTier::Daily));
        cache.insert(key("static"), result(CacheTier::Static));

        clock.advance(61);
        assert!(cache.get(&key("live")).is_none());
        assert!(cache.get(&key("daily")).is_some());

        clock.advance(900);
        assert!(cache.get(&key("daily")).is_none());
        assert!(cache.get(&key("static")).is_some());
    }

    #[test]
    fn test_evict_expired_removes_only_stale_entries() {
        let clock = ManualClock::at(0);
        let cache = ResponseCache::with_clock(clock.clone());

        cache.insert(key("live"), result(CacheTier::Live));
        cache.insert(key("static"), result(CacheTier::Static));

        clock.advance(120);
        assert_eq!(cache.evict_expired(), 1);
        assert_eq!(cache.len(), 1);
        assert_eq!(cache.metrics().sweep_count, 1);
    }

    #[tokio::test]
    async fn test_get_or_compute_caches_the_result() {
        let cache = ResponseCache::with_clock(ManualClock::at(0));
        let calls = AtomicUsize::new(0);

        for _ in 0..3 {
            let out: Result<ToolResult, String> = cache
                .get_or_compute(key("oee"), || async {
                    calls.fetch_add(1, Ordering::SeqCst);
                    Ok(result(CacheTier::Daily))
                })
                .await;
            assert!(out.is_ok());
        }

        assert_eq!(calls.load(Ordering::SeqCst), 1);
        let metrics = cache.metrics();
        assert_eq!(metrics.misses, 1);
        assert_eq!(metrics.hits, 2);
    }

    #[tokio::test]
    async fn test_concurrent_requests_coalesce() {
        let cache = Arc::new(ResponseCache::with_clock(ManualClock::at(0)));
        let calls = Arc::new(AtomicUsize::new(0));

        let a = {
            let cache = cache.clone();
            let calls = calls.clone();
            async move {
                cache
                    .get_or_compute(key("oee"), || async move {
                        calls.fetch_add(1, Ordering::SeqCst);
                        tokio::time::sleep(std::time::Duration::from_millis(20)).await;
                        Ok::<_, String>(result(CacheTier::Daily))
                    })
                    .await
            }
        };
        let b = {
            let cache = cache.clone();
            let calls = calls.clone();
            async move {
                cache
                    .get_or_compute(key("oee"), || async move {
                        calls.fetch_add(1, Ordering::SeqCst);
                        Ok::<_, String>(result(CacheTier::Daily))
                    })
                    .await
            }
        };

        let (ra, rb) = tokio::join!(a, b);
        assert!(ra.is_ok() && rb.is_ok());
        assert_eq!(calls.load(Ordering::SeqCst), 1, "only the leader computes");
        assert_eq!(cache.metrics().coalesced, 1);
    }

    #[tokio::test]
    async fn test_stored_result_visible_before_gate_clears() {
        let cache = Arc::new(ResponseCache::with_clock(ManualClock::at(0)));
        let calls = Arc::new(AtomicUsize::new(0));

        // Repeated waves of callers arriving right as the previous wave
        // finishes; any gap between storing the result and clearing the
        // in-flight slot shows up as a second computation
        for _ in 0..8 {
            let mut tasks = Vec::new();
            for _ in 0..4 {
                let cache = Arc::clone(&cache);
                let calls = Arc::clone(&calls);
                tasks.push(tokio::spawn(async move {
                    cache
                        .get_or_compute(key("oee"), || async move {
                            calls.fetch_add(1, Ordering::SeqCst);
                            tokio::task::yield_now().await;
                            Ok::<_, String>(result(CacheTier::Daily))
                        })
                        .await
                }));
            }
            for task in tasks {
                assert!(task.await.unwrap().is_ok());
            }
        }

        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_failed_computation_caches_nothing() {
        let cache = ResponseCache::with_clock(ManualClock::at(0));

        let failed: Result<ToolResult, String> = cache
            .get_or_compute(key("oee"), || async { Err("upstream down".to_string()) })
            .await;
        assert!(failed.is_err());
        assert!(cache.is_empty());

        // The next caller retries rather than seeing a cached failure
        let ok: Result<ToolResult, String> = cache
            .get_or_compute(key("oee"), || async { Ok(result(CacheTier::Daily)) })
            .await;
        assert!(ok.is_ok());
    }
}

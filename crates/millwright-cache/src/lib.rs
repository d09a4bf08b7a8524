//! Millwright Response Cache
//!
//! TTL cache for tool results, keyed by tool name plus canonicalized
//! arguments. TTLs come from the [`millwright_domain::CacheTier`] each tool
//! declared for its result, so volatile data expires quickly and static
//! data lingers. Concurrent requests for the same key are coalesced into a
//! single computation (singleflight), and a background sweeper evicts
//! expired entries so the map does not grow without bound.
//!
//! Expiry is driven by an injectable [`millwright_domain::Clock`], which
//! keeps the tests deterministic.

#![warn(missing_docs)]

pub mod key;
pub mod metrics;
pub mod store;
pub mod sweeper;

pub use key::CacheKey;
pub use metrics::CacheMetrics;
pub use store::ResponseCache;
pub use sweeper::CacheSweeper;

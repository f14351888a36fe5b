//! # Rate limit
//!
//! Fixed-window request quotas keyed by user identifier.
//!
//! [`RateLimiter`] owns the policy (limit, window, key format). Counting is delegated to a
//! [`CounterStore`], whose `increment` must bump the counter and set the window expiry as one
//! atomic step: expiry is set exactly once, on the first increment of a window.
//!
//! - [`RedisCounterStore`]: server-side Lua script over a Redis connection manager.
//! - [`InMemoryCounterStore`]: a single async mutex serializes every access; for tests and
//!   single-process deployments.

use std::time::Duration;

use async_trait::async_trait;

mod error;
mod limiter;
mod memory_store;
mod redis_store;

pub use error::RateLimitError;
pub use limiter::{RateLimitDecision, RateLimiter, DEFAULT_WINDOW, KEY_PREFIX};
pub use memory_store::InMemoryCounterStore;
pub use redis_store::RedisCounterStore;

/// Atomic fixed-window counter storage.
#[async_trait]
pub trait CounterStore: Send + Sync {
    /// Increments `key` and returns `(count, ttl)`. When the increment creates the key, the
    /// store sets its expiry to `window` in the same atomic step; later increments leave it alone.
    async fn increment(&self, key: &str, window: Duration) -> Result<(u64, Duration), RateLimitError>;

    /// Current count without mutation; a missing or expired key reads as zero.
    async fn get(&self, key: &str) -> Result<u64, RateLimitError>;

    /// Removes the counter for `key`.
    async fn delete(&self, key: &str) -> Result<(), RateLimitError>;
}

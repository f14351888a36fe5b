//! Fixed-window policy on top of a [`CounterStore`].

use std::sync::Arc;
use std::time::Duration;

use tracing::{debug, info, instrument};

use crate::{CounterStore, RateLimitError};

/// Length of one quota window.
pub const DEFAULT_WINDOW: Duration = Duration::from_secs(60);

/// Prefix of every counter key: `rate_limit:{user_id}`.
pub const KEY_PREFIX: &str = "rate_limit:";

/// Outcome of one quota check. Denial is a normal outcome, not an error.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RateLimitDecision {
    pub allowed: bool,
    /// `max(0, limit - count)`.
    pub remaining: u64,
    /// Live TTL of the current window.
    pub reset_in: Duration,
}

/// Per-user fixed-window limiter. Holds no local state; every call goes to the store.
#[derive(Clone)]
pub struct RateLimiter {
    store: Arc<dyn CounterStore>,
    limit: u64,
    window: Duration,
}

impl RateLimiter {
    pub fn new(store: Arc<dyn CounterStore>, limit: u64) -> Self {
        Self {
            store,
            limit,
            window: DEFAULT_WINDOW,
        }
    }

    pub fn with_window(mut self, window: Duration) -> Self {
        self.window = window;
        self
    }

    pub fn limit(&self) -> u64 {
        self.limit
    }

    pub fn window(&self) -> Duration {
        self.window
    }

    fn key(user_id: &str) -> String {
        format!("{KEY_PREFIX}{user_id}")
    }

    /// Counts one request for `user_id`. The `limit`-th request in a window is allowed, the next is denied.
    ///
    /// Store failures are returned as errors; the caller decides whether to fail open or closed.
    #[instrument(skip(self))]
    pub async fn check_and_consume(&self, user_id: &str) -> Result<RateLimitDecision, RateLimitError> {
        let (count, ttl) = self.store.increment(&Self::key(user_id), self.window).await?;
        let allowed = count <= self.limit;
        let remaining = self.limit.saturating_sub(count);
        let reset_in = if ttl.is_zero() { self.window } else { ttl };

        if allowed {
            debug!(user_id = %user_id, count, remaining, "step: rate limit allowed");
        } else {
            info!(
                user_id = %user_id,
                count,
                limit = self.limit,
                reset_in_secs = reset_in.as_secs(),
                "step: rate limit denied"
            );
        }

        Ok(RateLimitDecision {
            allowed,
            remaining,
            reset_in,
        })
    }

    /// Clears the counter for `user_id`.
    pub async fn reset(&self, user_id: &str) -> Result<(), RateLimitError> {
        info!(user_id = %user_id, "Resetting rate limit counter");
        self.store.delete(&Self::key(user_id)).await
    }

    /// Requests counted in the current window, without consuming one.
    pub async fn get_count(&self, user_id: &str) -> Result<u64, RateLimitError> {
        self.store.get(&Self::key(user_id)).await
    }
}

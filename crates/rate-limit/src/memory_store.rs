//! In-process counter store. One async mutex serializes every operation, which makes
//! increment-and-set-expiry atomic without an external server.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use tokio::sync::Mutex;
use tokio::time::Instant;
use tracing::debug;

use crate::{CounterStore, RateLimitError};

/// Minimum spacing between sweeps of expired windows.
const SWEEP_INTERVAL: Duration = Duration::from_secs(60);

#[derive(Debug, Clone, Copy)]
struct Window {
    count: u64,
    expires_at: Instant,
}

#[derive(Debug, Default)]
struct Windows {
    by_key: HashMap<String, Window>,
    last_sweep: Option<Instant>,
}

impl Windows {
    /// Drops every expired window, at most once per [`SWEEP_INTERVAL`].
    fn sweep_expired(&mut self, now: Instant) {
        if self
            .last_sweep
            .is_some_and(|at| now.saturating_duration_since(at) < SWEEP_INTERVAL)
        {
            return;
        }
        let before = self.by_key.len();
        self.by_key.retain(|_, w| w.expires_at > now);
        self.last_sweep = Some(now);
        let removed = before - self.by_key.len();
        if removed > 0 {
            debug!(removed, remaining = self.by_key.len(), "Swept expired rate-limit windows");
        }
    }
}

/// Counter store kept in process memory. Data is lost on restart. Expired windows are swept
/// during increments, so memory tracks recently active users only.
#[derive(Debug, Clone, Default)]
pub struct InMemoryCounterStore {
    windows: Arc<Mutex<Windows>>,
}

impl InMemoryCounterStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of live (unexpired) keys.
    pub async fn len(&self) -> usize {
        let now = Instant::now();
        let windows = self.windows.lock().await;
        windows.by_key.values().filter(|w| w.expires_at > now).count()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }
}

#[async_trait]
impl CounterStore for InMemoryCounterStore {
    async fn increment(&self, key: &str, window: Duration) -> Result<(u64, Duration), RateLimitError> {
        let now = Instant::now();
        let mut windows = self.windows.lock().await;
        windows.sweep_expired(now);

        let entry = windows.by_key.entry(key.to_string()).or_insert(Window {
            count: 0,
            expires_at: now + window,
        });
        if entry.expires_at <= now {
            // Window elapsed: the key counts as absent, so this increment starts a new one.
            *entry = Window {
                count: 0,
                expires_at: now + window,
            };
        }
        entry.count += 1;

        Ok((entry.count, entry.expires_at.saturating_duration_since(now)))
    }

    async fn get(&self, key: &str) -> Result<u64, RateLimitError> {
        let now = Instant::now();
        let windows = self.windows.lock().await;
        Ok(windows
            .by_key
            .get(key)
            .filter(|w| w.expires_at > now)
            .map(|w| w.count)
            .unwrap_or(0))
    }

    async fn delete(&self, key: &str) -> Result<(), RateLimitError> {
        self.windows.lock().await.by_key.remove(key);
        Ok(())
    }
}

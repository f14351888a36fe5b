//! Redis counter store. Increment and first-increment expiry run as one server-side script.

use std::time::Duration;

use async_trait::async_trait;
use redis::aio::ConnectionManager;
use redis::{AsyncCommands, Script};
use tracing::{error, info};

use crate::{CounterStore, RateLimitError};

/// INCR, set EXPIRE only when the key was just created, then report the live TTL.
const INCREMENT_SCRIPT: &str = r#"
local current = redis.call('INCR', KEYS[1])
if current == 1 then
    redis.call('EXPIRE', KEYS[1], ARGV[1])
end
local ttl = redis.call('TTL', KEYS[1])
return {current, ttl}
"#;

/// Counter store backed by Redis. Cloning shares the underlying connection manager.
#[derive(Clone)]
pub struct RedisCounterStore {
    manager: ConnectionManager,
    script: Script,
}

impl RedisCounterStore {
    /// Connects to `redis_url` (e.g. `redis://127.0.0.1:6379`).
    pub async fn connect(redis_url: &str) -> Result<Self, RateLimitError> {
        let client = redis::Client::open(redis_url)?;
        let manager = ConnectionManager::new(client).await.map_err(|e| {
            error!(error = %e, "Failed to connect to Redis");
            e
        })?;
        info!("Connected to Redis counter store");
        Ok(Self {
            manager,
            script: Script::new(INCREMENT_SCRIPT),
        })
    }
}

#[async_trait]
impl CounterStore for RedisCounterStore {
    async fn increment(&self, key: &str, window: Duration) -> Result<(u64, Duration), RateLimitError> {
        let mut conn = self.manager.clone();
        let (count, ttl): (i64, i64) = self
            .script
            .key(key)
            .arg(window.as_secs().max(1))
            .invoke_async(&mut conn)
            .await?;

        let count = u64::try_from(count)
            .map_err(|_| RateLimitError::Store(format!("negative counter for {key}: {count}")))?;
        // TTL is -1 (no expiry) or -2 (missing) in degenerate cases; report zero and let the limiter fall back.
        let ttl = u64::try_from(ttl).map(Duration::from_secs).unwrap_or(Duration::ZERO);
        Ok((count, ttl))
    }

    async fn get(&self, key: &str) -> Result<u64, RateLimitError> {
        let mut conn = self.manager.clone();
        let value: Option<u64> = conn.get(key).await?;
        Ok(value.unwrap_or(0))
    }

    async fn delete(&self, key: &str) -> Result<(), RateLimitError> {
        let mut conn = self.manager.clone();
        let _: () = conn.del(key).await?;
        Ok(())
    }
}

//! Shared window logs in Redis sorted sets.

use crate::{WindowBackend, WindowOutcome};
use async_trait::async_trait;
use chrono::{DateTime, TimeZone, Utc};
use herald_error::{RateLimitError, RateLimitErrorKind};
use redis::aio::ConnectionManager;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;
use tracing::{info, instrument};

/// Prune, count, conditionally add and report the oldest score atomically.
const SLIDING_WINDOW: &str = r"
local key = KEYS[1]
local now = tonumber(ARGV[1])
local window = tonumber(ARGV[2])
local limit = tonumber(ARGV[3])
redis.call('ZREMRANGEBYSCORE', key, '-inf', now - window)
local count = redis.call('ZCARD', key)
local allowed = 0
if count < limit then
  redis.call('ZADD', key, now, ARGV[4])
  count = count + 1
  allowed = 1
end
redis.call('PEXPIRE', key, window)
local oldest = redis.call('ZRANGE', key, 0, 0, 'WITHSCORES')
local oldest_score = -1
if oldest[2] then
  oldest_score = tonumber(oldest[2])
end
return {allowed, count, oldest_score}
";

/// Window logs shared by every process connected to the same Redis.
#[derive(Clone)]
pub struct RedisWindow {
    connection: ConnectionManager,
    script: redis::Script,
    sequence: std::sync::Arc<AtomicU64>,
}

impl std::fmt::Debug for RedisWindow {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RedisWindow").finish_non_exhaustive()
    }
}

fn unavailable(e: redis::RedisError) -> RateLimitError {
    RateLimitError::new(RateLimitErrorKind::BackendUnavailable(e.to_string()))
}

impl RedisWindow {
    /// Connect to the Redis server at `url`.
    ///
    /// # Errors
    ///
    /// Returns [`RateLimitErrorKind::BackendUnavailable`] if the URL is
    /// invalid or the server cannot be reached.
    #[instrument(skip(url))]
    pub async fn connect(url: &str) -> Result<Self, RateLimitError> {
        let client = redis::Client::open(url).map_err(unavailable)?;
        let connection = ConnectionManager::new(client).await.map_err(unavailable)?;
        info!("Connected to Redis rate limit backend");
        Ok(Self {
            connection,
            script: redis::Script::new(SLIDING_WINDOW),
            sequence: std::sync::Arc::new(AtomicU64::new(0)),
        })
    }
}

#[async_trait]
impl WindowBackend for RedisWindow {
    async fn check_and_record(
        &self,
        key: &str,
        limit: u32,
        window: Duration,
        now: DateTime<Utc>,
    ) -> Result<WindowOutcome, RateLimitError> {
        let now_ms = now.timestamp_millis();
        let window_ms = i64::try_from(window.as_millis()).unwrap_or(i64::MAX);
        let member = format!(
            "{now_ms}-{}",
            self.sequence.fetch_add(1, Ordering::Relaxed)
        );

        let mut connection = self.connection.clone();
        let reply: Vec<i64> = self
            .script
            .key(key)
            .arg(now_ms)
            .arg(window_ms)
            .arg(limit)
            .arg(member)
            .invoke_async(&mut connection)
            .await
            .map_err(unavailable)?;

        let [allowed, count, oldest] = reply.as_slice() else {
            return Err(RateLimitError::new(RateLimitErrorKind::InvalidReply(
                format!("{reply:?}"),
            )));
        };

        Ok(WindowOutcome {
            allowed: *allowed == 1,
            count: u32::try_from(*count).unwrap_or(u32::MAX),
            oldest: (*oldest >= 0)
                .then(|| Utc.timestamp_millis_opt(*oldest).single())
                .flatten(),
        })
    }
}

//! Time-bounded store access.

use crate::{ConfigStore, ConfigWrite, StatsStore, StoreResult};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use herald_core::{EventKind, GuildConfig, GuildId, GuildStats, HistoryEntry, Period};
use herald_error::{StoreError, StoreErrorKind};
use std::future::Future;
use std::time::Duration;
use tracing::warn;

/// Store timeout used when none is configured.
pub const DEFAULT_STORE_TIMEOUT: Duration = Duration::from_secs(5);

/// Await a store future for at most `limit`.
///
/// # Errors
///
/// Returns [`StoreErrorKind::Timeout`] when the limit elapses, otherwise the
/// future's own result.
pub async fn with_timeout<T, F>(limit: Duration, future: F) -> StoreResult<T>
where
    F: Future<Output = StoreResult<T>>,
{
    match tokio::time::timeout(limit, future).await {
        Ok(result) => result,
        Err(_) => {
            let millis = u64::try_from(limit.as_millis()).unwrap_or(u64::MAX);
            warn!(timeout_ms = millis, "Store operation timed out");
            Err(StoreError::new(StoreErrorKind::Timeout(millis)))
        }
    }
}

/// Decorator bounding every call of the wrapped store.
#[derive(Debug, Clone)]
pub struct TimeoutStore<S> {
    inner: S,
    limit: Duration,
}

impl<S> TimeoutStore<S> {
    /// Wrap `inner`, failing calls that take longer than `limit`.
    pub fn new(inner: S, limit: Duration) -> Self {
        Self { inner, limit }
    }

    /// Configured limit.
    pub fn limit(&self) -> Duration {
        self.limit
    }

    /// Wrapped store.
    pub fn inner(&self) -> &S {
        &self.inner
    }
}

#[async_trait]
impl<S: ConfigStore> ConfigStore for TimeoutStore<S> {
    async fn get(&self, guild_id: GuildId) -> StoreResult<Option<GuildConfig>> {
        with_timeout(self.limit, self.inner.get(guild_id)).await
    }

    async fn save(&self, guild_id: GuildId, write: ConfigWrite) -> StoreResult<GuildConfig> {
        with_timeout(self.limit, self.inner.save(guild_id, write)).await
    }

    async fn list_all(&self) -> StoreResult<Vec<(GuildId, GuildConfig)>> {
        with_timeout(self.limit, self.inner.list_all()).await
    }
}

#[async_trait]
impl<S: StatsStore> StatsStore for TimeoutStore<S> {
    async fn ensure(&self, guild_id: GuildId, now: DateTime<Utc>) -> StoreResult<()> {
        with_timeout(self.limit, self.inner.ensure(guild_id, now)).await
    }

    async fn increment(
        &self,
        guild_id: GuildId,
        kind: EventKind,
        at: DateTime<Utc>,
    ) -> StoreResult<()> {
        with_timeout(self.limit, self.inner.increment(guild_id, kind, at)).await
    }

    async fn push_history(
        &self,
        guild_id: GuildId,
        kind: EventKind,
        entry: HistoryEntry,
    ) -> StoreResult<()> {
        with_timeout(self.limit, self.inner.push_history(guild_id, kind, entry)).await
    }

    async fn get(&self, guild_id: GuildId) -> StoreResult<Option<GuildStats>> {
        with_timeout(self.limit, self.inner.get(guild_id)).await
    }

    async fn reset_period(
        &self,
        period: Period,
        stale_before: Option<DateTime<Utc>>,
    ) -> StoreResult<u64> {
        with_timeout(self.limit, self.inner.reset_period(period, stale_before)).await
    }

    async fn list_all(&self) -> StoreResult<Vec<GuildStats>> {
        with_timeout(self.limit, self.inner.list_all()).await
    }
}

//! In-memory statistics store.

use crate::{StatsStore, StoreResult};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use herald_core::{EventKind, GuildId, GuildStats, HISTORY_CAPACITY, HistoryEntry, Period};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::{debug, instrument};

/// Statistics held in process memory.
///
/// Used when persistence is disabled and as the fallback when the primary
/// store fails. Every method takes the write lock once, so each call is atomic.
///
/// # Examples
///
/// ```
/// use chrono::Utc;
/// use herald_core::{EventKind, GuildId};
/// use herald_storage::{InMemoryStatsStore, StatsStore};
///
/// # tokio::runtime::Runtime::new().unwrap().block_on(async {
/// let store = InMemoryStatsStore::new();
/// store.ensure(GuildId(1), Utc::now()).await.unwrap();
/// store.increment(GuildId(1), EventKind::Join, Utc::now()).await.unwrap();
/// let stats = store.get(GuildId(1)).await.unwrap().unwrap();
/// assert_eq!(stats.joins().total, 1);
/// # });
/// ```
#[derive(Debug, Clone)]
pub struct InMemoryStatsStore {
    stats: Arc<RwLock<HashMap<GuildId, GuildStats>>>,
    history_capacity: usize,
}

impl InMemoryStatsStore {
    /// Empty store with the standard history capacity.
    pub fn new() -> Self {
        Self::with_history_capacity(HISTORY_CAPACITY)
    }

    /// Empty store whose histories hold `capacity` entries.
    pub fn with_history_capacity(capacity: usize) -> Self {
        Self {
            stats: Arc::new(RwLock::new(HashMap::new())),
            history_capacity: capacity,
        }
    }

    /// Number of guilds with statistics.
    pub async fn len(&self) -> usize {
        self.stats.read().await.len()
    }

    /// Whether no guild has statistics.
    pub async fn is_empty(&self) -> bool {
        self.stats.read().await.is_empty()
    }

    fn fresh(&self, guild_id: GuildId, now: DateTime<Utc>) -> GuildStats {
        GuildStats::with_history_capacity(guild_id, now, self.history_capacity)
    }
}

impl Default for InMemoryStatsStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl StatsStore for InMemoryStatsStore {
    async fn ensure(&self, guild_id: GuildId, now: DateTime<Utc>) -> StoreResult<()> {
        let mut stats = self.stats.write().await;
        if !stats.contains_key(&guild_id) {
            debug!(guild_id = %guild_id, "Creating zeroed statistics");
            stats.insert(guild_id, self.fresh(guild_id, now));
        }
        Ok(())
    }

    async fn increment(
        &self,
        guild_id: GuildId,
        kind: EventKind,
        at: DateTime<Utc>,
    ) -> StoreResult<()> {
        let mut stats = self.stats.write().await;
        stats
            .entry(guild_id)
            .or_insert_with(|| self.fresh(guild_id, at))
            .increment(kind, at);
        Ok(())
    }

    async fn push_history(
        &self,
        guild_id: GuildId,
        kind: EventKind,
        entry: HistoryEntry,
    ) -> StoreResult<()> {
        let mut stats = self.stats.write().await;
        let at = entry.timestamp;
        stats
            .entry(guild_id)
            .or_insert_with(|| self.fresh(guild_id, at))
            .push_history(kind, entry);
        Ok(())
    }

    async fn get(&self, guild_id: GuildId) -> StoreResult<Option<GuildStats>> {
        Ok(self.stats.read().await.get(&guild_id).cloned())
    }

    #[instrument(skip(self))]
    async fn reset_period(
        &self,
        period: Period,
        stale_before: Option<DateTime<Utc>>,
    ) -> StoreResult<u64> {
        let mut stats = self.stats.write().await;
        let mut reset = 0;
        for entry in stats.values_mut() {
            if stale_before.is_none_or(|start| entry.is_stale(start)) {
                entry.reset(period);
                reset += 1;
            }
        }
        debug!(reset, "Reset in-memory period counters");
        Ok(reset)
    }

    async fn list_all(&self) -> StoreResult<Vec<GuildStats>> {
        Ok(self.stats.read().await.values().cloned().collect())
    }
}
